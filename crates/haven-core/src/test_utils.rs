//! Test utilities for haven-core
//!
//! A mock OpenAI-compatible + Whisper server for integration tests. It
//! answers chat completions with canned analysis JSON or companion replies,
//! records what it was sent, and can be told to fail every request with a
//! fixed status to exercise upstream error handling.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// What the mock server saw for one chat completion
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub referer: Option<String>,
    pub title: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u64>,
    pub message_count: usize,
}

#[derive(Clone, Default)]
struct MockState {
    failure: Option<u16>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Mock LLM server for testing and development
pub struct MockLlmServer {
    addr: SocketAddr,
    state: MockState,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockLlmServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        Self::spawn(MockState::default()).await
    }

    /// Start a server that answers every request with `status`
    pub async fn failing(status: u16) -> Self {
        Self::spawn(MockState {
            failure: Some(status),
            ..MockState::default()
        })
        .await
    }

    async fn spawn(state: MockState) -> Self {
        let app = Router::new()
            .route("/models", get(handle_models))
            .route("/chat/completions", post(handle_chat_completion))
            .route("/whisper", post(handle_whisper))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL, usable as `OPENROUTER_BASE_URL`
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Chat completion requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockLlmServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn failure_response(status: u16) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({"error": {"message": "mock upstream failure", "code": status.as_u16()}})),
    )
        .into_response()
}

async fn handle_models(State(state): State<MockState>) -> Response {
    if let Some(status) = state.failure {
        return failure_response(status);
    }
    Json(json!({"data": [{"id": "test-model", "object": "model"}]})).into_response()
}

async fn handle_chat_completion(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    let messages = request["messages"].as_array().cloned().unwrap_or_default();

    state.requests.lock().unwrap().push(RecordedRequest {
        authorization: header("authorization"),
        referer: header("http-referer"),
        title: header("x-title"),
        model: request["model"].as_str().map(String::from),
        max_tokens: request["max_tokens"].as_u64(),
        message_count: messages.len(),
    });

    if let Some(status) = state.failure {
        return failure_response(status);
    }

    let system = messages
        .first()
        .and_then(|m| m["content"].as_str())
        .unwrap_or_default();
    let last = messages
        .last()
        .and_then(|m| m["content"].as_str())
        .unwrap_or_default()
        .to_lowercase();

    let content = if system.contains("Analyze the user's") {
        analysis_reply(&last)
    } else {
        "That sounds like a lot to hold. What has helped you feel even a little steadier before?"
            .to_string()
    };

    Json(json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "model": request["model"],
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    }))
    .into_response()
}

/// Analysis JSON wrapped in prose, the way hosted models often answer
fn analysis_reply(text: &str) -> String {
    let (mood, stress, anxiety) = if text.contains("worried") || text.contains("anxious") {
        ("anxious", 60, 82)
    } else if text.contains("deadline") || text.contains("overwhelmed") {
        ("stressed", 85, 55)
    } else if text.contains("sad") {
        ("sad", 40, 35)
    } else {
        ("calm", 15, 10)
    };
    format!(
        "Here is my analysis:\n```json\n{}\n```",
        json!({
            "mood": mood,
            "insight": "Thank you for sharing this. Be gentle with yourself today.",
            "stressScore": stress,
            "anxietyScore": anxiety
        })
    )
}

async fn handle_whisper(State(state): State<MockState>) -> Response {
    if let Some(status) = state.failure {
        return failure_response(status);
    }
    Json(json!({"text": " I have been feeling worried about work "})).into_response()
}
