use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Body sent to the remote endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvocationRequest {
    pub tool: String,
    pub args: Value,
}

/// Body returned by the remote endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvocationResponse {
    /// `false` signals a logical failure. A missing flag counts as failure.
    #[serde(default)]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Classification of a failed remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorType {
    Http,    // Non-2xx status
    Remote,  // 2xx with ok=false
    Timeout, // Attempt exceeded the configured timeout
    Network, // Connection failure or undecodable body
}

impl RemoteErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteErrorType::Http => "http",
            RemoteErrorType::Remote => "remote",
            RemoteErrorType::Timeout => "timeout",
            RemoteErrorType::Network => "network",
        }
    }
}

/// Error returned once every attempt of a remote call has failed.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RemoteCallError {
    pub error_type: RemoteErrorType,
    pub message: String,
    /// HTTP status of the failing response, when one was received.
    pub status: Option<u16>,
    /// Decoded remote response, for logical failures.
    pub response: Option<InvocationResponse>,
}

impl RemoteCallError {
    pub fn new(error_type: RemoteErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
            status: None,
            response: None,
        }
    }

    pub fn http(status: u16, reason: &str) -> Self {
        Self {
            status: Some(status),
            ..Self::new(RemoteErrorType::Http, format!("HTTP {}: {}", status, reason))
        }
    }

    pub fn remote(status: u16, response: InvocationResponse) -> Self {
        let message = response
            .message
            .clone()
            .unwrap_or_else(|| "Remote execution failed".to_string());
        Self {
            status: Some(status),
            response: Some(response),
            ..Self::new(RemoteErrorType::Remote, message)
        }
    }

    pub fn timeout(timeout_ms: u64) -> Self {
        Self::new(
            RemoteErrorType::Timeout,
            format!("Request timeout after {}ms", timeout_ms),
        )
    }

    pub fn network(detail: impl std::fmt::Display) -> Self {
        Self::new(RemoteErrorType::Network, format!("Network error: {}", detail))
    }
}
