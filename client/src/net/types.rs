//! Wire DTOs for the PT backend.
//!
//! DESIGN
//! ======
//! Field names mirror the backend JSON exactly (`userfname`, `ai_responses`,
//! `meal_plan`, ...) so request/response bodies serialize without renames.
//! Optional or nullable fields decode to empty values instead of failing.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// MODEL SELECTION
// =============================================================================

/// Model tag forwarded to the backend with every chat request.
///
/// The backend alone interprets the tag; the client only restricts the choice
/// to this fixed set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum Model {
    #[default]
    Gpt35Turbo,
    Gpt4oMini,
    Gemini15Flash,
    Llama32,
    Llama31,
    Llama2,
}

impl Model {
    pub const ALL: [Model; 6] = [
        Model::Gpt35Turbo,
        Model::Gpt4oMini,
        Model::Gemini15Flash,
        Model::Llama32,
        Model::Llama31,
        Model::Llama2,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gpt35Turbo => "gpt-3.5-turbo",
            Self::Gpt4oMini => "gpt-4o-mini",
            Self::Gemini15Flash => "gemini-1.5-flash",
            Self::Llama32 => "llama3.2",
            Self::Llama31 => "llama3.1",
            Self::Llama2 => "llama2",
        }
    }
}

impl From<Model> for &'static str {
    fn from(model: Model) -> Self {
        model.as_str()
    }
}

impl TryFrom<String> for Model {
    type Error = UnknownModel;

    /// Wire tags must match exactly.
    fn try_from(tag: String) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|model| model.as_str() == tag)
            .ok_or(UnknownModel(tag))
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown model `{0}`")]
pub struct UnknownModel(pub String);

impl FromStr for Model {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|model| model.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownModel(wanted.to_owned()))
    }
}

// =============================================================================
// INIT
// =============================================================================

/// Body of `POST /init`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitRequest {
    pub userfname: String,
    pub userlname: String,
}

/// Response of `POST /init`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitResponse {
    /// `"success"` when the backend initialized the session.
    pub status: String,
    /// Prior human turns, oldest first.
    #[serde(default, deserialize_with = "null_as_default")]
    pub human_messages: Vec<String>,
    /// Prior assistant turns, index-paired with `human_messages`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub ai_responses: Vec<String>,
    /// Previously generated meal plan; empty when none exists yet.
    #[serde(default, deserialize_with = "null_as_default")]
    pub meal_plan: String,
}

impl InitResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

// =============================================================================
// CHAT
// =============================================================================

/// Body of `POST /chat`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub userfname: String,
    pub userlname: String,
    pub model: Model,
}

/// Response of `POST /chat`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_plan: Option<String>,
}

impl ChatResponse {
    /// The updated meal plan, if the response carries a non-empty one.
    #[must_use]
    pub fn document(&self) -> Option<&str> {
        self.meal_plan.as_deref().filter(|plan| !plan.is_empty())
    }
}

// =============================================================================
// HISTORY / FEEDBACK
// =============================================================================

/// One stored exchange returned by `GET /history/{fname}/{lname}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub message: String,
    pub response: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub history: Vec<HistoryEntry>,
    /// Backend-maintained rolling summary of the conversation.
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    #[serde(default)]
    pub status: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
