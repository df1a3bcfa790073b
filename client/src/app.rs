//! Top-level controller: owns the session and routes between pages.
//!
//! DESIGN
//! ======
//! `App` plays the role of the root component. It holds the one
//! `SessionState`, the backend handle and both page controllers, and decides
//! which route is shown. Navigation only happens here:
//!
//! - `start_session` moves Landing -> Chat after a successful bootstrap.
//! - `end_session` abandons any exchange, fires teardown, clears the session
//!   and moves back to Landing without waiting for the backend.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use serde_json::json;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::ClientConfig;
use crate::net::api::{ApiError, Backend};
use crate::net::types::{ChatResponse, FeedbackResponse, HistoryResponse};
use crate::pages::chat::{self, ChatPage, ExchangeOutcome, PendingExchange};
use crate::pages::landing::{BootstrapError, LandingPage};
use crate::state::StateError;
use crate::state::session::SessionState;

/// Which page is shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Route {
    #[default]
    Landing,
    Chat,
}

/// Failures of the auxiliary history and feedback calls.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct App {
    backend: Arc<dyn Backend>,
    config: ClientConfig,
    route: Route,
    session: SessionState,
    landing: LandingPage,
    chat: ChatPage,
}

impl App {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, config: ClientConfig) -> Self {
        let chat = ChatPage::new(config.default_model);
        Self {
            backend,
            config,
            route: Route::Landing,
            session: SessionState::default(),
            landing: LandingPage::default(),
            chat,
        }
    }

    #[must_use]
    pub fn route(&self) -> Route {
        self.route
    }

    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    #[must_use]
    pub fn landing(&self) -> &LandingPage {
        &self.landing
    }

    pub fn landing_mut(&mut self) -> &mut LandingPage {
        &mut self.landing
    }

    #[must_use]
    pub fn chat(&self) -> &ChatPage {
        &self.chat
    }

    pub fn chat_mut(&mut self) -> &mut ChatPage {
        &mut self.chat
    }

    #[must_use]
    pub fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.backend)
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Submit the landing dialog and navigate to chat on success.
    ///
    /// # Errors
    ///
    /// Returns the bootstrap failure; the route stays on Landing.
    pub async fn start_session(&mut self) -> Result<(), BootstrapError> {
        self.landing.submit(&mut self.session, self.backend.as_ref()).await?;
        self.route = Route::Chat;
        info!(user = %self.session.identity().display_name(), "app: navigated to chat");
        Ok(())
    }

    /// Start an exchange from the chat input. See [`ChatPage::begin_send`].
    ///
    /// # Errors
    ///
    /// Returns the [`StateError`] that kept the message from being sent.
    pub fn begin_send(&mut self) -> Result<PendingExchange, StateError> {
        self.chat.begin_send(&mut self.session)
    }

    /// Record the result of an exchange started with [`App::begin_send`].
    pub fn finish_send(&mut self, pending: PendingExchange, result: Result<ChatResponse, ApiError>) -> ExchangeOutcome {
        self.chat.finish_send(&mut self.session, pending, result)
    }

    /// Send the chat input and wait for the reply, bounded by the configured
    /// exchange timeout.
    ///
    /// # Errors
    ///
    /// Returns the [`StateError`] that kept the message from being sent.
    pub async fn send_message(&mut self) -> Result<ExchangeOutcome, StateError> {
        let timeout = self.config.timeouts.exchange();
        self.chat.send(&mut self.session, self.backend.as_ref(), timeout).await
    }

    /// Leave the chat: abandon any exchange, fire teardown, clear the session
    /// and go back to Landing.
    ///
    /// Local state is cleared immediately. The returned handle belongs to the
    /// detached teardown call and may be ignored.
    pub fn end_session(&mut self) -> JoinHandle<()> {
        if let Some(round) = self.chat.abandon(&mut self.session) {
            info!(round, "app: abandoned exchange on session end");
        }
        let teardown = chat::spawn_teardown(self.backend());
        self.session.reset();
        self.chat.input.clear();
        self.route = Route::Landing;
        info!("app: session ended");
        teardown
    }

    /// Fetch the most recent `limit` rounds stored for this user.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::IdentityNotSet`] before bootstrap, or the
    /// backend failure.
    pub async fn history(&self, limit: usize) -> Result<HistoryResponse, AppError> {
        let identity = self.session.identity();
        if !identity.is_initialized() {
            return Err(StateError::IdentityNotSet.into());
        }
        Ok(self.backend.history(identity, limit).await?)
    }

    /// Submit free-text feedback for this user.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::EmptyMessage`] for blank text,
    /// [`StateError::IdentityNotSet`] before bootstrap, or the backend failure.
    pub async fn send_feedback(&self, text: &str) -> Result<FeedbackResponse, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StateError::EmptyMessage.into());
        }
        let identity = self.session.identity();
        if !identity.is_initialized() {
            return Err(StateError::IdentityNotSet.into());
        }
        let body = json!({ "comment": text });
        Ok(self.backend.feedback(identity, &body).await?)
    }
}
