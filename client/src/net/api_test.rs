use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use super::*;
use crate::net::types::Model;

// =========================================================================
// Helpers
// =========================================================================

async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn backend_for(base_url: &str) -> HttpBackend {
    HttpBackend::new(&ClientConfig::with_base_url(base_url)).unwrap()
}

fn ada() -> Identity {
    Identity::new("Ada", "Lovelace").unwrap()
}

// =========================================================================
// endpoint
// =========================================================================

#[test]
fn endpoint_appends_segments_to_root() {
    let backend = backend_for("http://127.0.0.1:5000");
    assert_eq!(backend.endpoint(&["init"]).unwrap().as_str(), "http://127.0.0.1:5000/init");
}

#[test]
fn endpoint_keeps_base_path_prefix() {
    let backend = backend_for("http://127.0.0.1:5000/api/");
    assert_eq!(backend.endpoint(&["chat"]).unwrap().as_str(), "http://127.0.0.1:5000/api/chat");
}

#[test]
fn endpoint_percent_encodes_names() {
    let backend = backend_for("http://127.0.0.1:5000");
    let url = backend.endpoint(&["history", "Mary Ann", "O/Brien"]).unwrap();
    assert_eq!(url.as_str(), "http://127.0.0.1:5000/history/Mary%20Ann/O%2FBrien");
}

#[test]
fn new_rejects_unparsable_base_url() {
    let err = HttpBackend::new(&ClientConfig::with_base_url("not a url")).err().unwrap();
    assert!(matches!(err, ApiError::InvalidBaseUrl(_)));
}

// =========================================================================
// ApiError
// =========================================================================

#[test]
fn api_error_retryable_classification() {
    assert!(ApiError::Timeout.retryable());
    assert!(ApiError::Request("reset".into()).retryable());
    assert!(ApiError::Status { status: 503, body: String::new() }.retryable());
    assert!(ApiError::Status { status: 429, body: String::new() }.retryable());
    assert!(!ApiError::Status { status: 404, body: String::new() }.retryable());
    assert!(!ApiError::Decode("bad".into()).retryable());
}

#[test]
fn api_error_codes_are_stable() {
    assert_eq!(ApiError::Timeout.error_code(), "E_TIMEOUT");
    assert_eq!(ApiError::Decode(String::new()).error_code(), "E_DECODE");
}

// =========================================================================
// HttpBackend against a live router
// =========================================================================

#[tokio::test]
async fn init_posts_identity_and_decodes_history() {
    let seen = Arc::new(Mutex::new(None::<Value>));
    let seen_in_handler = seen.clone();
    let router = Router::new().route(
        "/init",
        post(move |Json(body): Json<Value>| {
            let seen = seen_in_handler.clone();
            async move {
                *seen.lock().unwrap() = Some(body);
                Json(json!({
                    "status": "success",
                    "human_messages": ["hi"],
                    "ai_responses": ["hello"],
                    "meal_plan": "## Plan"
                }))
            }
        }),
    );
    let backend = backend_for(&spawn_server(router).await);

    let resp = backend
        .init(&InitRequest { userfname: "Ada".into(), userlname: "Lovelace".into() })
        .await
        .unwrap();

    assert!(resp.is_success());
    assert_eq!(resp.meal_plan, "## Plan");
    assert_eq!(seen.lock().unwrap().clone(), Some(json!({ "userfname": "Ada", "userlname": "Lovelace" })));
}

#[tokio::test]
async fn chat_sends_model_tag_and_decodes_reply() {
    let router = Router::new().route(
        "/chat",
        post(|Json(body): Json<Value>| async move {
            let model = body["model"].as_str().unwrap_or_default().to_owned();
            Json(json!({ "response": format!("via {model}"), "meal_plan": "# Plan" }))
        }),
    );
    let backend = backend_for(&spawn_server(router).await);

    let resp = backend
        .chat(&ChatRequest {
            message: "hello".into(),
            userfname: "Ada".into(),
            userlname: "Lovelace".into(),
            model: Model::Gemini15Flash,
        })
        .await
        .unwrap();

    assert_eq!(resp.response, "via gemini-1.5-flash");
    assert_eq!(resp.document(), Some("# Plan"));
}

#[tokio::test]
async fn close_ignores_body() {
    let router = Router::new().route("/close", get(|| async { "closed, not json" }));
    let backend = backend_for(&spawn_server(router).await);
    assert!(backend.close().await.is_ok());
}

#[tokio::test]
async fn server_error_maps_to_status() {
    let router = Router::new().route(
        "/chat",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "Error processing message") }),
    );
    let backend = backend_for(&spawn_server(router).await);

    let err = backend
        .chat(&ChatRequest {
            message: "hello".into(),
            userfname: "Ada".into(),
            userlname: "Lovelace".into(),
            model: Model::default(),
        })
        .await
        .unwrap_err();

    assert_eq!(err, ApiError::Status { status: 500, body: "Error processing message".into() });
    assert!(err.retryable());
}

#[tokio::test]
async fn malformed_body_maps_to_decode() {
    let router = Router::new().route("/init", post(|| async { Json(json!({ "unexpected": true })) }));
    let backend = backend_for(&spawn_server(router).await);

    let err = backend
        .init(&InitRequest { userfname: "Ada".into(), userlname: "Lovelace".into() })
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn unreachable_server_maps_to_request_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let backend = backend_for(&format!("http://{addr}"));

    let err = backend.close().await.unwrap_err();
    assert!(matches!(err, ApiError::Request(_)));
}

#[tokio::test]
async fn history_uses_name_path_and_limit_query() {
    let router = Router::new().route(
        "/history/{fname}/{lname}",
        get(
            |Path((fname, lname)): Path<(String, String)>, Query(query): Query<HashMap<String, String>>| async move {
                Json(json!({
                    "history": [{ "message": format!("{fname} {lname}"), "response": query["limit"].clone() }],
                    "summary": "likes oats"
                }))
            },
        ),
    );
    let backend = backend_for(&spawn_server(router).await);

    let resp = backend.history(&ada(), 5).await.unwrap();

    assert_eq!(resp.history.len(), 1);
    assert_eq!(resp.history[0].message, "Ada Lovelace");
    assert_eq!(resp.history[0].response, "5");
    assert_eq!(resp.summary, "likes oats");
}

#[tokio::test]
async fn feedback_posts_body_under_name_path() {
    let router = Router::new().route(
        "/feedback/{fname}/{lname}",
        post(|Path((fname, _lname)): Path<(String, String)>, Json(body): Json<Value>| async move {
            Json(json!({ "status": format!("{fname}: {}", body["comment"].as_str().unwrap_or_default()) }))
        }),
    );
    let backend = backend_for(&spawn_server(router).await);

    let resp = backend
        .feedback(&ada(), &json!({ "comment": "more protein" }))
        .await
        .unwrap();

    assert_eq!(resp.status, "Ada: more protein");
}
