//! Parsing of chat-prompt input lines.
//!
//! A line that does not start with `/` is a message for the assistant.

#[cfg(test)]
#[path = "commands_test.rs"]
mod commands_test;

use ptclient::Model;
use ptclient::net::types::UnknownModel;

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

pub const HELP_TEXT: &str = "\
commands:
  /model <tag>      choose the model for the next messages
  /models           list available models
  /plan             show the current meal plan
  /history [n]      show the last n stored rounds (default 10)
  /feedback <text>  send feedback about the assistant
  /quit             end the session and return to the name prompt
  /help             show this help
anything else is sent to the assistant";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    Model(Model),
    Models,
    Plan,
    History(usize),
    Feedback(String),
    Quit,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command `/{0}`; try /help")]
    Unknown(String),
    #[error("`/{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error(transparent)]
    UnknownModel(#[from] UnknownModel),
    #[error("invalid history limit `{0}`")]
    InvalidLimit(String),
}

/// Parse one line typed at the chat prompt.
///
/// Returns `Ok(None)` for a blank line.
///
/// # Errors
///
/// Returns a [`CommandError`] for an unknown command or a bad argument.
pub fn parse_line(line: &str) -> Result<Option<Command>, CommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Ok(Some(Command::Send(line.trim_end_matches(['\r', '\n']).to_owned())));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let command = match name {
        "model" => {
            if arg.is_empty() {
                return Err(CommandError::MissingArgument("model"));
            }
            Command::Model(arg.parse()?)
        }
        "models" => Command::Models,
        "plan" => Command::Plan,
        "history" => {
            if arg.is_empty() {
                Command::History(DEFAULT_HISTORY_LIMIT)
            } else {
                let limit = arg.parse().map_err(|_| CommandError::InvalidLimit(arg.to_owned()))?;
                Command::History(limit)
            }
        }
        "feedback" => {
            if arg.is_empty() {
                return Err(CommandError::MissingArgument("feedback"));
            }
            Command::Feedback(arg.to_owned())
        }
        "quit" | "exit" => Command::Quit,
        "help" | "?" => Command::Help,
        other => return Err(CommandError::Unknown(other.to_owned())),
    };
    Ok(Some(command))
}
