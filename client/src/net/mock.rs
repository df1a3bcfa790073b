//! Scripted in-memory [`Backend`] for controller tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::api::{ApiError, Backend};
use super::types::{ChatRequest, ChatResponse, FeedbackResponse, HistoryEntry, HistoryResponse, InitRequest, InitResponse};
use crate::state::session::Identity;

#[derive(Default)]
pub(crate) struct MockBackend {
    init_results: Mutex<Vec<Result<InitResponse, ApiError>>>,
    chat_results: Mutex<Vec<Result<ChatResponse, ApiError>>>,
    close_error: Option<ApiError>,
    chat_delay: Option<Duration>,
    pub chat_requests: Mutex<Vec<ChatRequest>>,
    pub feedback_bodies: Mutex<Vec<serde_json::Value>>,
    pub init_calls: AtomicUsize,
    pub chat_calls: AtomicUsize,
    pub close_calls: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_init(self, result: Result<InitResponse, ApiError>) -> Self {
        self.init_results.lock().unwrap().push(result);
        self
    }

    pub fn with_chat(self, result: Result<ChatResponse, ApiError>) -> Self {
        self.chat_results.lock().unwrap().push(result);
        self
    }

    pub fn with_chat_delay(mut self, delay: Duration) -> Self {
        self.chat_delay = Some(delay);
        self
    }

    pub fn with_close_error(mut self, error: ApiError) -> Self {
        self.close_error = Some(error);
        self
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

pub(crate) fn success_init(human: &[&str], ai: &[&str], meal_plan: &str) -> InitResponse {
    InitResponse {
        status: "success".to_owned(),
        human_messages: human.iter().map(|s| (*s).to_owned()).collect(),
        ai_responses: ai.iter().map(|s| (*s).to_owned()).collect(),
        meal_plan: meal_plan.to_owned(),
    }
}

pub(crate) fn reply(text: &str, meal_plan: Option<&str>) -> ChatResponse {
    ChatResponse { response: text.to_owned(), meal_plan: meal_plan.map(str::to_owned) }
}

#[async_trait::async_trait]
impl Backend for MockBackend {
    async fn init(&self, _request: &InitRequest) -> Result<InitResponse, ApiError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        let mut results = self.init_results.lock().unwrap();
        if results.is_empty() {
            Err(ApiError::Request("no scripted init response".into()))
        } else {
            results.remove(0)
        }
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        self.chat_requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.chat_delay {
            tokio::time::sleep(delay).await;
        }
        let mut results = self.chat_results.lock().unwrap();
        if results.is_empty() { Ok(reply("done", None)) } else { results.remove(0) }
    }

    async fn close(&self) -> Result<(), ApiError> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        match &self.close_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn history(&self, identity: &Identity, limit: usize) -> Result<HistoryResponse, ApiError> {
        let entry = HistoryEntry { message: format!("hi from {}", identity.first_name()), response: "hello".to_owned() };
        Ok(HistoryResponse { history: vec![entry; limit.min(1)], summary: "mock summary".to_owned() })
    }

    async fn feedback(&self, _identity: &Identity, body: &serde_json::Value) -> Result<FeedbackResponse, ApiError> {
        self.feedback_bodies.lock().unwrap().push(body.clone());
        Ok(FeedbackResponse { status: "Feedback submitted successfully".to_owned() })
    }
}
