//! Client-side session state.
//!
//! DESIGN
//! ======
//! `session` holds the single shared `SessionState` (identity, transcript,
//! generated document) that the `App` controller owns and lends to pages by
//! `&mut`. `transcript` models the conversation as ordered rounds of paired
//! human/assistant turns.

pub mod session;
pub mod transcript;

use transcript::RoundId;

/// Rejections raised before any state change or network call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("first name is required")]
    MissingFirstName,
    #[error("last name is required")]
    MissingLastName,
    #[error("message is empty")]
    EmptyMessage,
    #[error("session identity is not set")]
    IdentityNotSet,
    #[error("round {0} is still awaiting a reply")]
    ExchangeInFlight(RoundId),
    #[error("round {0} is not awaiting a reply")]
    RoundNotPending(RoundId),
}
