//! Test utilities for wimpi-core
//!
//! Provides a mock Gemini server so the HTTP backend can be exercised in
//! unit and integration tests without network access or an API key.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// How the mock server answers every generateContent call
#[derive(Debug, Clone)]
pub enum MockReply {
    /// 200 with a single candidate containing this text
    Text(String),
    /// 429 with Gemini's quota exhaustion message
    QuotaExceeded,
    /// 429 without a quota message
    RateLimited,
    /// 200 with an empty candidate list
    NoCandidates,
}

/// A request captured by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Path segment after `/models/`, e.g. `gemini-2.5-flash:generateContent`
    pub model_call: String,
    pub api_key: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct ServerState {
    reply: MockReply,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Mock Gemini server for testing
pub struct MockGeminiServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockGeminiServer {
    /// Start the mock server on an available port
    pub async fn start(reply: MockReply) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = ServerState {
            reply,
            requests: requests.clone(),
        };

        let app = Router::new()
            .route("/models/:call", post(handle_generate))
            .with_state(state);

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
            requests,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server (use as `GEMINI_API_URL`)
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockGeminiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_generate(
    State(state): State<ServerState>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.requests.lock().unwrap().push(RecordedRequest {
        model_call: call,
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        body,
    });

    match state.reply {
        MockReply::Text(text) => Json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        }))
        .into_response(),
        MockReply::QuotaExceeded => error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "You exceeded your current quota, please check your plan and billing details.",
            "RESOURCE_EXHAUSTED",
        ),
        MockReply::RateLimited => error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests, please slow down.",
            "RESOURCE_EXHAUSTED",
        ),
        MockReply::NoCandidates => Json(json!({ "candidates": [] })).into_response(),
    }
}

fn error_response(status: StatusCode, message: &str, code: &str) -> Response {
    (
        status,
        Json(json!({
            "error": { "code": status.as_u16(), "message": message, "status": code }
        })),
    )
        .into_response()
}
