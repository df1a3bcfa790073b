use super::*;

#[test]
fn blank_line_is_ignored() {
    assert_eq!(parse_line("   "), Ok(None));
    assert_eq!(parse_line(""), Ok(None));
}

#[test]
fn plain_text_is_sent_as_typed() {
    assert_eq!(parse_line("  hi there \n"), Ok(Some(Command::Send("  hi there ".to_owned()))));
}

#[test]
fn model_parses_tag() {
    assert_eq!(parse_line("/model llama3.1"), Ok(Some(Command::Model(Model::Llama31))));
    assert_eq!(parse_line("/model"), Err(CommandError::MissingArgument("model")));
    assert!(matches!(parse_line("/model gpt-9"), Err(CommandError::UnknownModel(_))));
}

#[test]
fn history_takes_optional_limit() {
    assert_eq!(parse_line("/history"), Ok(Some(Command::History(DEFAULT_HISTORY_LIMIT))));
    assert_eq!(parse_line("/history 3"), Ok(Some(Command::History(3))));
    assert_eq!(parse_line("/history many"), Err(CommandError::InvalidLimit("many".to_owned())));
}

#[test]
fn feedback_keeps_whole_argument() {
    assert_eq!(
        parse_line("/feedback  more  recipes please "),
        Ok(Some(Command::Feedback("more  recipes please".to_owned())))
    );
    assert_eq!(parse_line("/feedback"), Err(CommandError::MissingArgument("feedback")));
}

#[test]
fn simple_commands() {
    assert_eq!(parse_line("/models"), Ok(Some(Command::Models)));
    assert_eq!(parse_line("/plan"), Ok(Some(Command::Plan)));
    assert_eq!(parse_line("/quit"), Ok(Some(Command::Quit)));
    assert_eq!(parse_line("/exit"), Ok(Some(Command::Quit)));
    assert_eq!(parse_line("/help"), Ok(Some(Command::Help)));
}

#[test]
fn unknown_command_is_reported() {
    assert_eq!(parse_line("/dance"), Err(CommandError::Unknown("dance".to_owned())));
}
