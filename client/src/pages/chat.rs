//! Chat page: message exchange with the assistant and session teardown.
//!
//! DESIGN
//! ======
//! An exchange is split in three so a UI loop can keep handling input while
//! the request is outstanding:
//!
//! 1. `begin_send` validates, appends the optimistic human turn and marks the
//!    round in flight. A second `begin_send` before step 3 is refused.
//! 2. `exchange` performs the bounded network call. It borrows nothing from
//!    the page or the session.
//! 3. `finish_send` appends the reply (or the apology turn on failure),
//!    replaces the meal plan if one came back, and clears the in-flight mark.
//!
//! `send` runs all three in sequence for callers that simply await.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::net::api::{ApiError, Backend};
use crate::net::types::{ChatRequest, ChatResponse, Model};
use crate::state::StateError;
use crate::state::session::SessionState;
use crate::state::transcript::RoundId;

/// Assistant turn substituted for a reply that never arrived.
pub const APOLOGY_TEXT: &str =
    "I apologize, but I'm having trouble processing your request right now. Please try again later.";

/// An exchange between `begin_send` and `finish_send`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingExchange {
    pub round: RoundId,
    pub request: ChatRequest,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// The assistant replied; `document_updated` when a new meal plan came with it.
    Replied { document_updated: bool },
    /// The call failed and the apology turn was appended in its place.
    Failed(ApiError),
    /// The round was cancelled before the call finished; nothing was appended.
    Abandoned,
}

/// View state of the chat page.
#[derive(Clone, Debug, Default)]
pub struct ChatPage {
    /// Text in the message box.
    pub input: String,
    /// Model tag sent with the next message.
    pub model: Model,
    in_flight: Option<RoundId>,
}

impl ChatPage {
    #[must_use]
    pub fn new(model: Model) -> Self {
        Self { input: String::new(), model, in_flight: None }
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Mirrors the "Send" button: some text typed and nothing in flight.
    #[must_use]
    pub fn can_send(&self) -> bool {
        self.in_flight.is_none() && !self.input.trim().is_empty()
    }

    pub fn select_model(&mut self, model: Model) {
        self.model = model;
    }

    /// Take the typed message, append it optimistically and mark it in flight.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::ExchangeInFlight`], [`StateError::EmptyMessage`]
    /// or [`StateError::IdentityNotSet`]; in every case nothing changes and
    /// no request should be sent.
    pub fn begin_send(&mut self, session: &mut SessionState) -> Result<PendingExchange, StateError> {
        if let Some(round) = self.in_flight {
            return Err(StateError::ExchangeInFlight(round));
        }
        if self.input.trim().is_empty() {
            return Err(StateError::EmptyMessage);
        }
        let identity = session.identity();
        if !identity.is_initialized() {
            return Err(StateError::IdentityNotSet);
        }
        let request = ChatRequest {
            message: self.input.clone(),
            userfname: identity.first_name().to_owned(),
            userlname: identity.last_name().to_owned(),
            model: self.model,
        };

        let round = session.transcript_mut().begin_round(&request.message)?;
        self.in_flight = Some(round);
        self.input.clear();
        debug!(round, model = %request.model, "chat: exchange started");
        Ok(PendingExchange { round, request })
    }

    /// Record the result of `pending` and clear the in-flight mark.
    pub fn finish_send(
        &mut self,
        session: &mut SessionState,
        pending: PendingExchange,
        result: Result<ChatResponse, ApiError>,
    ) -> ExchangeOutcome {
        let round = pending.round;
        if self.in_flight == Some(round) {
            self.in_flight = None;
        }

        match result {
            Ok(response) => {
                if let Err(e) = session.transcript_mut().complete_round(round, &response.response, false) {
                    debug!(round, error = %e, "chat: dropping reply for abandoned round");
                    return ExchangeOutcome::Abandoned;
                }
                let document_updated = match response.document() {
                    Some(plan) => {
                        session.set_document(plan);
                        true
                    }
                    None => false,
                };
                debug!(round, document_updated, "chat: exchange completed");
                ExchangeOutcome::Replied { document_updated }
            }
            Err(error) => {
                if let Err(e) = session.transcript_mut().complete_round(round, APOLOGY_TEXT, true) {
                    debug!(round, error = %e, "chat: dropping failure for abandoned round");
                    return ExchangeOutcome::Abandoned;
                }
                warn!(round, code = error.error_code(), error = %error, "chat: exchange failed");
                ExchangeOutcome::Failed(error)
            }
        }
    }

    /// Validate, call the backend and record the result.
    ///
    /// If this future is dropped before it completes, call
    /// [`ChatPage::abandon`] to release the pending round.
    ///
    /// # Errors
    ///
    /// Returns the [`StateError`] from `begin_send`; backend failures are
    /// reported through [`ExchangeOutcome::Failed`] instead.
    pub async fn send(
        &mut self,
        session: &mut SessionState,
        backend: &dyn Backend,
        timeout: Duration,
    ) -> Result<ExchangeOutcome, StateError> {
        let pending = self.begin_send(session)?;
        let result = exchange(backend, &pending.request, timeout).await;
        Ok(self.finish_send(session, pending, result))
    }

    /// Cancel the exchange in flight, removing its optimistic human turn.
    pub fn abandon(&mut self, session: &mut SessionState) -> Option<RoundId> {
        let round = self.in_flight.take()?;
        if let Err(e) = session.transcript_mut().cancel_round(round) {
            debug!(round, error = %e, "chat: abandoned round was already gone");
        }
        info!(round, "chat: exchange abandoned");
        Some(round)
    }
}

/// Send `request`, taking the failure path once `timeout` elapses.
///
/// # Errors
///
/// Returns the backend's [`ApiError`], or [`ApiError::Timeout`].
pub async fn exchange(backend: &dyn Backend, request: &ChatRequest, timeout: Duration) -> Result<ChatResponse, ApiError> {
    tokio::time::timeout(timeout, backend.chat(request))
        .await
        .unwrap_or(Err(ApiError::Timeout))
}

/// Fire `GET /close` on a detached task.
///
/// The result is logged and otherwise discarded; nothing waits on it and it
/// is never cancelled. The handle is returned only so a process about to
/// exit can give it a moment to go out.
pub fn spawn_teardown(backend: Arc<dyn Backend>) -> JoinHandle<()> {
    tokio::spawn(async move {
        match backend.close().await {
            Ok(()) => debug!("teardown: backend acknowledged close"),
            Err(e) => debug!(error = %e, "teardown: close failed, ignoring"),
        }
    })
}
