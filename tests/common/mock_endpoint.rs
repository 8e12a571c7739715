//! Mock remote execution endpoint
//!
//! An axum server on a random port that records every invocation and answers
//! with canned responses. Behaviour can be changed while it runs.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use gas_mcp_bridge::remote::{RemoteClient, RemoteEndpointConfig};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// One invocation received by the mock endpoint
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub tool: String,
    pub args: Value,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct MockInner {
    requests: Vec<RecordedRequest>,
    responses: HashMap<String, Value>,
    expected_token: Option<String>,
    status_override: Option<u16>,
    delay: Option<Duration>,
}

type SharedState = Arc<Mutex<MockInner>>;

/// Mock endpoint instance
///
/// When dropped, the server shuts down.
pub struct MockEndpoint {
    /// Invocation URL (e.g., "http://127.0.0.1:12345/exec")
    pub url: String,
    state: SharedState,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MockEndpoint {
    /// Spawns a new mock endpoint on a random port
    pub async fn spawn() -> Self {
        let state: SharedState = Arc::new(Mutex::new(MockInner::default()));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let app = Router::new()
            .route("/exec", post(handle_exec))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Mock endpoint failed");
        });

        Self {
            url: format!("http://127.0.0.1:{}/exec", port),
            state,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Answer calls to `tool` with `body` instead of the default success.
    pub fn set_response(&self, tool: &str, body: Value) {
        self.state
            .lock()
            .unwrap()
            .responses
            .insert(tool.to_string(), body);
    }

    /// Reject calls that don't carry `Authorization: Bearer <token>`.
    pub fn require_token(&self, token: &str) {
        self.state.lock().unwrap().expected_token = Some(token.to_string());
    }

    /// Answer every call with `status`.
    pub fn set_status(&self, status: u16) {
        self.state.lock().unwrap().status_override = Some(status);
    }

    /// Wait `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().unwrap().delay = Some(delay);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    pub fn endpoint_config(&self) -> RemoteEndpointConfig {
        RemoteEndpointConfig::new(self.url.clone()).with_timeout_ms(5000)
    }

    /// A client for this endpoint that doesn't wait between retries.
    pub fn client_with(&self, config: RemoteEndpointConfig) -> RemoteClient {
        RemoteClient::new(&config)
            .expect("Failed to build remote client")
            .with_delay(|_| async {})
    }

    pub fn client(&self) -> RemoteClient {
        self.client_with(self.endpoint_config())
    }
}

async fn handle_exec(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let tool = body["tool"].as_str().unwrap_or_default().to_string();
    let args = body.get("args").cloned().unwrap_or(Value::Null);

    let (delay, status, reply) = {
        let mut inner = state.lock().unwrap();
        inner.requests.push(RecordedRequest {
            tool: tool.clone(),
            args: args.clone(),
            authorization: authorization.clone(),
        });

        let authorized = match &inner.expected_token {
            Some(token) => authorization.as_deref() == Some(format!("Bearer {}", token).as_str()),
            None => true,
        };

        let reply = if !authorized {
            json!({ "ok": false, "message": "unauthorized" })
        } else if let Some(canned) = inner.responses.get(&tool) {
            canned.clone()
        } else {
            json!({
                "ok": true,
                "result": { "tool": tool, "args": args, "message": "mock execution" }
            })
        };

        (inner.delay, inner.status_override, reply)
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let status = status
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::OK);
    (status, Json(reply)).into_response()
}
