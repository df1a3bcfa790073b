//! Plain-text rendering of session state for the terminal.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::fmt::Write as _;

use ptclient::Model;
use ptclient::net::types::HistoryResponse;
use ptclient::state::session::GeneratedDocument;
use ptclient::state::transcript::{Speaker, Transcript, Turn};

const HUMAN_LABEL: &str = "you";
const ASSISTANT_LABEL: &str = "pt";

#[must_use]
pub fn turn(turn: &Turn) -> String {
    let label = match turn.speaker {
        Speaker::Human => HUMAN_LABEL,
        Speaker::Assistant => ASSISTANT_LABEL,
    };
    if turn.is_error {
        format!("{label} (error)> {}", turn.text)
    } else {
        format!("{label}> {}", turn.text)
    }
}

/// Every turn in transcript order, one per line.
#[must_use]
pub fn transcript(transcript: &Transcript) -> String {
    transcript.turns().map(turn).collect::<Vec<_>>().join("\n")
}

#[must_use]
pub fn document(document: &GeneratedDocument) -> String {
    format!("--- meal plan ---\n{}\n-----------------", document.display_text())
}

#[must_use]
pub fn models(selected: Model) -> String {
    Model::ALL
        .iter()
        .map(|model| {
            let marker = if *model == selected { '*' } else { ' ' };
            format!("{marker} {model}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[must_use]
pub fn history(history: &HistoryResponse) -> String {
    let mut out = String::new();
    if history.history.is_empty() {
        out.push_str("(no stored history)");
    }
    for (i, entry) in history.history.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{HUMAN_LABEL}> {}\n{ASSISTANT_LABEL}> {}", entry.message, entry.response);
    }
    if !history.summary.is_empty() {
        let _ = write!(out, "\nsummary: {}", history.summary);
    }
    out
}
