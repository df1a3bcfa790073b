//! Landing page: collect a name and bootstrap the session.

#[cfg(test)]
#[path = "landing_test.rs"]
mod landing_test;

use tracing::{info, warn};

use crate::net::api::{ApiError, Backend};
use crate::net::types::InitRequest;
use crate::state::StateError;
use crate::state::session::{Identity, SessionState};

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Invalid(#[from] StateError),
    #[error("backend rejected session init (status `{status}`)")]
    Rejected { status: String },
    #[error("session init failed: {0}")]
    Api(#[from] ApiError),
}

impl BootstrapError {
    /// Whether the landing dialog should offer to try again as is.
    #[must_use]
    pub fn retryable(&self) -> bool {
        match self {
            Self::Invalid(_) => false,
            Self::Rejected { .. } => true,
            Self::Api(e) => e.retryable(),
        }
    }
}

/// Validate the name dialog fields.
///
/// # Errors
///
/// Returns the first missing name.
pub fn validate_identity_input(first_name: &str, last_name: &str) -> Result<Identity, StateError> {
    Identity::new(first_name, last_name)
}

/// Exchange `identity` for the server-held session and populate `session`.
///
/// State is only touched once the backend reports success; on any failure
/// `session` is left exactly as it was.
///
/// # Errors
///
/// Returns [`BootstrapError::Rejected`] for a non-success status and
/// [`BootstrapError::Api`] for transport or decoding failures.
pub async fn bootstrap(session: &mut SessionState, backend: &dyn Backend, identity: Identity) -> Result<(), BootstrapError> {
    let request = InitRequest {
        userfname: identity.first_name().to_owned(),
        userlname: identity.last_name().to_owned(),
    };
    let response = backend.init(&request).await?;
    if !response.is_success() {
        warn!(status = %response.status, "bootstrap: backend rejected session init");
        return Err(BootstrapError::Rejected { status: response.status });
    }

    info!(
        user = %identity.display_name(),
        rounds = response.human_messages.len(),
        has_plan = !response.meal_plan.is_empty(),
        "bootstrap: session initialized"
    );
    session.set_identity(identity);
    session.seed(&response.human_messages, &response.ai_responses);
    session.set_document(response.meal_plan);
    Ok(())
}

/// View state of the landing page's name dialog.
#[derive(Clone, Debug, Default)]
pub struct LandingPage {
    pub first_name: String,
    pub last_name: String,
    pub dialog_open: bool,
    /// Message for the user after a failed attempt.
    pub info: Option<String>,
}

impl LandingPage {
    pub fn open_dialog(&mut self) {
        self.dialog_open = true;
    }

    pub fn close_dialog(&mut self) {
        self.dialog_open = false;
        self.info = None;
    }

    /// Mirrors the "Continue" button: enabled once both names are present.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        validate_identity_input(&self.first_name, &self.last_name).is_ok()
    }

    /// Validate the dialog and bootstrap the session.
    ///
    /// On success the dialog closes and the caller should navigate to chat.
    /// On failure the dialog stays open with `info` set so the user can retry.
    ///
    /// # Errors
    ///
    /// Returns the validation or bootstrap failure. Validation failures make
    /// no network call.
    pub async fn submit(&mut self, session: &mut SessionState, backend: &dyn Backend) -> Result<(), BootstrapError> {
        let identity = validate_identity_input(&self.first_name, &self.last_name)?;
        self.info = None;

        match bootstrap(session, backend, identity).await {
            Ok(()) => {
                self.dialog_open = false;
                self.first_name.clear();
                self.last_name.clear();
                Ok(())
            }
            Err(e) => {
                self.info = Some(failure_message(&e));
                Err(e)
            }
        }
    }
}

fn failure_message(error: &BootstrapError) -> String {
    if error.retryable() {
        format!("Could not start your session ({error}). Please try again.")
    } else {
        format!("Could not start your session: {error}")
    }
}
