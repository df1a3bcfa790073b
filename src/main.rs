mod commands;
mod render;

use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use ptclient::config::ConfigError;
use ptclient::net::api::ApiError;
use ptclient::net::types::ChatResponse;
use ptclient::pages::chat::{self, ExchangeOutcome};
use ptclient::{App, ClientConfig, HttpBackend, Model};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::task::JoinHandle;
use tracing::Level;

use commands::{Command, HELP_TEXT};

/// How long a departing process waits for the close call to go out.
const TEARDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("backend setup failed: {0}")]
    Backend(#[from] ApiError),
    #[error("terminal i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "ptchat", about = "Terminal client for the PT nutrition assistant")]
struct Cli {
    /// Backend origin; overrides `PT_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    /// Model for the first message; overrides `PT_MODEL`.
    #[arg(long)]
    model: Option<Model>,

    #[arg(long)]
    first_name: Option<String>,

    #[arg(long)]
    last_name: Option<String>,

    /// Seconds to wait for a reply before giving up; overrides `PT_EXCHANGE_TIMEOUT_SECS`.
    #[arg(long)]
    exchange_timeout_secs: Option<u64>,

    /// Log debug output to stderr.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

type Input = Lines<BufReader<Stdin>>;

enum Flow {
    Continue,
    Quit,
    Eof,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.base_url {
        config.set_base_url(url);
    }
    if let Some(model) = cli.model {
        config.default_model = model;
    }
    if let Some(secs) = cli.exchange_timeout_secs {
        config.timeouts.exchange_secs = secs;
    }

    let backend = Arc::new(HttpBackend::new(&config)?);
    tracing::info!(base_url = %config.base_url, model = %config.default_model, "ptchat starting");
    let mut app = App::new(backend, config);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    let mut first_name = cli.first_name;
    let mut last_name = cli.last_name;
    loop {
        if !run_landing(&mut app, &mut input, first_name.take(), last_name.take()).await? {
            return Ok(());
        }
        let flow = run_chat(&mut app, &mut input).await?;
        let teardown = app.end_session();
        if matches!(flow, Flow::Eof) {
            let _ = tokio::time::timeout(TEARDOWN_GRACE, teardown).await;
            return Ok(());
        }
        println!("Session ended.");
    }
}

/// Ask for a name until the session starts. `Ok(false)` on end of input.
async fn run_landing(
    app: &mut App,
    input: &mut Input,
    mut first_name: Option<String>,
    mut last_name: Option<String>,
) -> Result<bool, CliError> {
    println!("Welcome to PT, your personal nutrition assistant.");
    app.landing_mut().open_dialog();

    loop {
        let first = match first_name.take() {
            Some(name) => name,
            None => match prompt(input, "first name: ").await? {
                Some(name) => name,
                None => return Ok(false),
            },
        };
        let last = match last_name.take() {
            Some(name) => name,
            None => match prompt(input, "last name: ").await? {
                Some(name) => name,
                None => return Ok(false),
            },
        };

        let landing = app.landing_mut();
        landing.first_name = first;
        landing.last_name = last;
        match app.start_session().await {
            Ok(()) => return Ok(true),
            Err(e) => {
                let message = app.landing().info.clone().unwrap_or_else(|| e.to_string());
                println!("{message}");
            }
        }
    }
}

async fn run_chat(app: &mut App, input: &mut Input) -> Result<Flow, CliError> {
    println!(
        "Signed in as {}. Type /help for commands.",
        app.session().identity().display_name()
    );
    if !app.session().transcript().is_empty() {
        println!("{}", render::transcript(app.session().transcript()));
    }
    println!("{}", render::document(app.session().document()));

    loop {
        let Some(line) = prompt(input, "> ").await? else {
            return Ok(Flow::Eof);
        };
        let command = match commands::parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match command {
            Command::Send(text) => {
                app.chat_mut().input = text;
                match exchange_interactively(app, input).await? {
                    Flow::Continue => {}
                    flow => return Ok(flow),
                }
            }
            Command::Model(model) => {
                app.chat_mut().select_model(model);
                println!("model: {model}");
            }
            Command::Models => println!("{}", render::models(app.chat().model)),
            Command::Plan => println!("{}", render::document(app.session().document())),
            Command::History(limit) => match app.history(limit).await {
                Ok(history) => println!("{}", render::history(&history)),
                Err(e) => println!("could not load history: {e}"),
            },
            Command::Feedback(text) => match app.send_feedback(&text).await {
                Ok(response) if response.status.is_empty() => println!("feedback sent"),
                Ok(response) => println!("{}", response.status),
                Err(e) => println!("could not send feedback: {e}"),
            },
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => println!("{HELP_TEXT}"),
        }
    }
}

/// Run one exchange while still reading stdin, so `/quit` can cut it short.
async fn exchange_interactively(app: &mut App, input: &mut Input) -> Result<Flow, CliError> {
    let pending = match app.begin_send() {
        Ok(pending) => pending,
        Err(e) => {
            println!("{e}");
            return Ok(Flow::Continue);
        }
    };

    let backend = app.backend();
    let request = pending.request.clone();
    let timeout = app.config().timeouts.exchange();
    let mut task: JoinHandle<Result<ChatResponse, ApiError>> =
        tokio::spawn(async move { chat::exchange(backend.as_ref(), &request, timeout).await });
    println!("(waiting for {}...)", pending.request.model);

    let result = loop {
        tokio::select! {
            joined = &mut task => {
                break joined.unwrap_or_else(|e| Err(ApiError::Request(format!("exchange task failed: {e}"))));
            }
            line = input.next_line() => {
                match line? {
                    None => {
                        task.abort();
                        return Ok(Flow::Eof);
                    }
                    Some(line) if matches!(commands::parse_line(&line), Ok(Some(Command::Quit))) => {
                        task.abort();
                        return Ok(Flow::Quit);
                    }
                    Some(_) => println!("still waiting for a reply; /quit to leave"),
                }
            }
        }
    };

    let outcome = app.finish_send(pending, result);
    print_outcome(app, &outcome);
    Ok(Flow::Continue)
}

fn print_outcome(app: &App, outcome: &ExchangeOutcome) {
    if matches!(outcome, ExchangeOutcome::Abandoned) {
        return;
    }
    let last_reply = app.session().transcript().rounds().last().and_then(|round| round.reply.as_ref());
    if let Some(turn) = last_reply {
        println!("{}", render::turn(turn));
    }
    if matches!(outcome, ExchangeOutcome::Replied { document_updated: true }) {
        println!("(meal plan updated; /plan to view)");
    }
}

async fn prompt(input: &mut Input, label: &str) -> Result<Option<String>, CliError> {
    print!("{label}");
    std::io::stdout().flush()?;
    Ok(input.next_line().await?)
}
