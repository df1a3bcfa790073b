//! REST client for the PT backend.
//!
//! DESIGN
//! ======
//! `Backend` is the async seam the page controllers talk to, so tests can
//! substitute a scripted mock. `HttpBackend` is the real implementation over
//! a shared `reqwest::Client` with request/connect timeouts from
//! [`ClientConfig`].
//!
//! ERROR HANDLING
//! ==============
//! Every failure is mapped into [`ApiError`]. Callers decide what a failure
//! means: bootstrap reports it, exchange substitutes an apology turn,
//! teardown ignores it.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use reqwest::Url;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{ChatRequest, ChatResponse, FeedbackResponse, HistoryResponse, InitRequest, InitResponse};
use crate::config::ClientConfig;
use crate::state::session::Identity;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The configured base URL cannot carry endpoint paths.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Request(String),

    /// No response arrived within the configured bound.
    #[error("request timed out")]
    Timeout,

    /// The backend answered with a non-success HTTP status.
    #[error("response error: status {status}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("response parse failed: {0}")]
    Decode(String),
}

impl ApiError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidBaseUrl(_) => "E_INVALID_BASE_URL",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::Request(_) => "E_REQUEST",
            Self::Timeout => "E_TIMEOUT",
            Self::Status { .. } => "E_STATUS",
            Self::Decode(_) => "E_DECODE",
        }
    }

    /// Whether repeating the same call could plausibly succeed.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Timeout | Self::Status { status: 429 | 500..=599, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() { Self::Timeout } else { Self::Request(e.to_string()) }
    }
}

// =============================================================================
// BACKEND TRAIT
// =============================================================================

/// The backend endpoints the client depends on. Enables mocking in tests.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// `POST /init`: exchange a name for server-held session state.
    async fn init(&self, request: &InitRequest) -> Result<InitResponse, ApiError>;

    /// `POST /chat`: send one human turn, receive one assistant turn.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError>;

    /// `GET /close`: tell the backend the session is ending.
    async fn close(&self) -> Result<(), ApiError>;

    /// `GET /history/{fname}/{lname}?limit=N`: the stored exchanges for a user.
    async fn history(&self, identity: &Identity, limit: usize) -> Result<HistoryResponse, ApiError>;

    /// `POST /feedback/{fname}/{lname}`: free-form feedback on recommendations.
    async fn feedback(&self, identity: &Identity, body: &serde_json::Value) -> Result<FeedbackResponse, ApiError>;
}

// =============================================================================
// HTTP BACKEND
// =============================================================================

pub struct HttpBackend {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    /// Build a backend client from config.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse or the HTTP client
    /// fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(&config.base_url).map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(config.base_url.clone()));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    /// Resolve `segments` under the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post_json<T: DeserializeOwned>(&self, url: Url, body: &impl Serialize) -> Result<T, ApiError> {
        debug!(%url, "backend: POST");
        let response = self.http.post(url).json(body).send().await?;
        decode(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!(%url, "backend: GET");
        let response = self.http.get(url).send().await?;
        decode(response).await
    }
}

async fn read_body(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::Status { status: status.as_u16(), body: text });
    }
    Ok(text)
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let text = read_body(response).await?;
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn init(&self, request: &InitRequest) -> Result<InitResponse, ApiError> {
        let url = self.endpoint(&["init"])?;
        self.post_json(url, request).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        let url = self.endpoint(&["chat"])?;
        self.post_json(url, request).await
    }

    async fn close(&self) -> Result<(), ApiError> {
        let url = self.endpoint(&["close"])?;
        debug!(%url, "backend: GET");
        let response = self.http.get(url).send().await?;
        read_body(response).await.map(|_| ())
    }

    async fn history(&self, identity: &Identity, limit: usize) -> Result<HistoryResponse, ApiError> {
        let mut url = self.endpoint(&["history", identity.first_name(), identity.last_name()])?;
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        self.get_json(url).await
    }

    async fn feedback(&self, identity: &Identity, body: &serde_json::Value) -> Result<FeedbackResponse, ApiError> {
        let url = self.endpoint(&["feedback", identity.first_name(), identity.last_name()])?;
        self.post_json(url, body).await
    }
}
