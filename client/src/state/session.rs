#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use super::StateError;
use super::transcript::Transcript;

/// Shown in place of the meal plan until the backend produces one.
pub const NO_DOCUMENT_PLACEHOLDER: &str = "No meal plan generated yet.";

/// The user's name as given on the landing page.
///
/// The default (empty) identity means the session is not initialized yet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Identity {
    first_name: String,
    last_name: String,
}

impl Identity {
    /// Build an identity from raw input, trimming both names.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::MissingFirstName`] or
    /// [`StateError::MissingLastName`] when a name is blank.
    pub fn new(first_name: &str, last_name: &str) -> Result<Self, StateError> {
        let first_name = first_name.trim();
        let last_name = last_name.trim();
        if first_name.is_empty() {
            return Err(StateError::MissingFirstName);
        }
        if last_name.is_empty() {
            return Err(StateError::MissingLastName);
        }
        Ok(Self { first_name: first_name.to_owned(), last_name: last_name.to_owned() })
    }

    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        !self.first_name.is_empty() && !self.last_name.is_empty()
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The generated meal plan. Always replaced wholesale, never appended to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeneratedDocument(String);

impl GeneratedDocument {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_produced(&self) -> bool {
        !self.0.is_empty()
    }

    /// The document text, or [`NO_DOCUMENT_PLACEHOLDER`] when none exists.
    #[must_use]
    pub fn display_text(&self) -> &str {
        if self.is_produced() { &self.0 } else { NO_DOCUMENT_PLACEHOLDER }
    }
}

/// Shared source of truth for one browser-style session.
///
/// Owned by [`crate::app::App`] and lent to the page controllers by `&mut`,
/// so every update is a single synchronous replace with no interleaving.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    identity: Identity,
    transcript: Transcript,
    document: GeneratedDocument,
}

impl SessionState {
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn set_identity(&mut self, identity: Identity) {
        self.identity = identity;
    }

    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    /// Replace the human side of the transcript.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::ExchangeInFlight`] while an exchange is pending.
    pub fn set_human_turns(&mut self, human: Vec<String>) -> Result<(), StateError> {
        self.transcript.replace_human_turns(&human)
    }

    /// Replace the assistant side of the transcript.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::ExchangeInFlight`] while an exchange is pending.
    pub fn set_assistant_turns(&mut self, assistant: Vec<String>) -> Result<(), StateError> {
        self.transcript.replace_assistant_turns(&assistant)
    }

    /// Replace both sides at once from index-paired history.
    pub fn seed(&mut self, human: &[String], assistant: &[String]) {
        self.transcript.reseed(human, assistant);
    }

    #[must_use]
    pub fn document(&self) -> &GeneratedDocument {
        &self.document
    }

    pub fn set_document(&mut self, text: impl Into<String>) {
        self.document = GeneratedDocument(text.into());
    }

    /// Discard identity, transcript and document.
    ///
    /// The transcript keeps its round counter, so an exchange begun before
    /// the reset can never complete a round begun after it.
    pub fn reset(&mut self) {
        self.identity = Identity::default();
        self.transcript.clear();
        self.document = GeneratedDocument::default();
    }
}
