//! Test utilities for spendlens-core
//!
//! This module provides testing infrastructure including a mock Gemini
//! server that can be used for development and integration tests.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// Mock Gemini server for testing and development
///
/// Replies are scripted per test: queue text or function-call turns, then
/// inspect the recorded requests afterwards. An empty queue yields an
/// empty report so incidental calls stay cheap.
pub struct MockModelServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    state: ServerState,
}

#[derive(Clone, Default)]
struct ServerState {
    replies: Arc<Mutex<VecDeque<Value>>>,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl MockModelServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let state = ServerState::default();
        let app = Router::new()
            .route(
                "/v1beta/models/:model",
                get(handle_model_info).post(handle_generate),
            )
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
            shutdown_tx: Some(shutdown_tx),
            state,
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Queue a plain text reply
    pub fn enqueue_text(&self, text: &str) {
        self.state
            .replies
            .lock()
            .unwrap()
            .push_back(text_reply(text));
    }

    /// Queue a function-call reply
    pub fn enqueue_function_call(&self, name: &str, args: Value) {
        self.state
            .replies
            .lock()
            .unwrap()
            .push_back(function_call_reply(name, args));
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockModelServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn text_reply(text: &str) -> Value {
    json!({
        "candidates": [
            { "content": { "role": "model", "parts": [ { "text": text } ] } }
        ]
    })
}

fn function_call_reply(name: &str, args: Value) -> Value {
    json!({
        "candidates": [
            { "content": { "role": "model", "parts": [
                { "functionCall": { "name": name, "args": args } }
            ] } }
        ]
    })
}

/// Model metadata endpoint (health checks)
async fn handle_model_info(Path(model): Path<String>) -> Json<Value> {
    Json(json!({
        "name": format!("models/{}", model),
        "supportedGenerationMethods": ["generateContent"]
    }))
}

/// generateContent endpoint
async fn handle_generate(
    State(state): State<ServerState>,
    Path(_model): Path<String>,
    Json(request): Json<Value>,
) -> Json<Value> {
    state.requests.lock().unwrap().push(request);

    let reply = state
        .replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| text_reply(r#"{"keyInsights": [], "alerts": [], "suggestions": []}"#));
    Json(reply)
}
