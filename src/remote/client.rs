//! HTTP client for the remote execution endpoint.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, warn};

use super::endpoint::RemoteEndpointConfig;
use super::models::{InvocationRequest, InvocationResponse, RemoteCallError};
use super::retry_policy::RetryPolicy;

/// Suspension used between retry attempts.
pub type DelayFn = Arc<dyn Fn(Duration) -> BoxFuture<'static, ()> + Send + Sync>;

/// Something that can execute a tool remotely.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    async fn call_tool(&self, tool: &str, args: Value) -> Result<Value, RemoteCallError>;
}

/// Client for the remote execution endpoint.
///
/// Holds no per-call state, so one instance serves concurrent invocations.
#[derive(Clone)]
pub struct RemoteClient {
    client: Client,
    endpoint_url: String,
    access_token: Option<String>,
    timeout_ms: u64,
    retry_policy: RetryPolicy,
    delay: DelayFn,
}

impl RemoteClient {
    pub fn new(config: &RemoteEndpointConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            endpoint_url: config.endpoint_url.clone(),
            access_token: config.access_token.clone(),
            timeout_ms: config.timeout_ms,
            retry_policy: RetryPolicy::new(config.max_retries),
            delay: Arc::new(|duration| tokio::time::sleep(duration).boxed()),
        })
    }

    /// Replace the delay used between attempts.
    pub fn with_delay<F, Fut>(mut self, delay: F) -> Self
    where
        F: Fn(Duration) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.delay = Arc::new(move |duration| delay(duration).boxed());
        self
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Invoke `tool` remotely, retrying every failure until attempts run out.
    pub async fn call_tool(&self, tool: &str, args: Value) -> Result<Value, RemoteCallError> {
        let request = InvocationRequest {
            tool: tool.to_string(),
            args,
        };
        let max_attempts = self.retry_policy.max_attempts();
        let mut attempt = 0;

        loop {
            debug!(
                tool = %tool,
                attempt = attempt + 1,
                max_attempts,
                "Calling remote endpoint"
            );

            let err = match self.attempt(&request).await {
                Ok(result) => return Ok(result),
                Err(err) => err,
            };

            if !self.retry_policy.should_retry(attempt) {
                error!(
                    tool = %tool,
                    error_type = err.error_type.as_str(),
                    "Remote call failed after {} attempt(s): {}",
                    attempt + 1,
                    err
                );
                return Err(err);
            }

            let backoff = self.retry_policy.backoff(attempt);
            warn!(
                tool = %tool,
                error_type = err.error_type.as_str(),
                "Remote call attempt {}/{} failed: {}. Retrying in {}ms",
                attempt + 1,
                max_attempts,
                err,
                backoff.as_millis()
            );
            (self.delay)(backoff).await;
            attempt += 1;
        }
    }

    /// A single HTTP round trip.
    async fn attempt(&self, request: &InvocationRequest) -> Result<Value, RemoteCallError> {
        let mut req_builder = self.client.post(&self.endpoint_url).json(request);

        if let Some(token) = &self.access_token {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", token));
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteCallError::http(
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
            ));
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        let decoded: InvocationResponse = serde_json::from_slice(&body)
            .map_err(|e| RemoteCallError::network(format!("invalid response body: {}", e)))?;

        if !decoded.ok {
            return Err(RemoteCallError::remote(status.as_u16(), decoded));
        }

        Ok(decoded.result.unwrap_or(Value::Null))
    }

    fn classify(&self, e: reqwest::Error) -> RemoteCallError {
        if e.is_timeout() {
            RemoteCallError::timeout(self.timeout_ms)
        } else {
            RemoteCallError::network(e)
        }
    }
}

#[async_trait]
impl ToolInvoker for RemoteClient {
    async fn call_tool(&self, tool: &str, args: Value) -> Result<Value, RemoteCallError> {
        RemoteClient::call_tool(self, tool, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::RemoteErrorType;
    use serde_json::json;
    use std::sync::Mutex;

    /// URL of a loopback port that was bound and then released.
    async fn closed_endpoint_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{}/exec", port)
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let config = RemoteEndpointConfig::new(closed_endpoint_url().await).with_timeout_ms(2000);
        let client = RemoteClient::new(&config).unwrap();

        let err = client.call_tool("anything", json!({})).await.unwrap_err();
        assert!(matches!(
            err.error_type,
            RemoteErrorType::Network | RemoteErrorType::Timeout
        ));
        assert!(err.status.is_none());
    }

    #[tokio::test]
    async fn test_no_delay_after_final_attempt() {
        let delays = Arc::new(Mutex::new(Vec::new()));
        let recorded = delays.clone();
        let config = RemoteEndpointConfig::new(closed_endpoint_url().await)
            .with_timeout_ms(2000)
            .with_max_retries(3);
        let client = RemoteClient::new(&config)
            .unwrap()
            .with_delay(move |duration| {
                recorded.lock().unwrap().push(duration.as_millis() as u64);
                async {}
            });

        assert!(client.call_tool("anything", json!({})).await.is_err());
        assert_eq!(*delays.lock().unwrap(), vec![1000, 2000, 4000]);
    }

    #[test]
    fn test_retry_policy_from_config() {
        let config = RemoteEndpointConfig::new("http://localhost/exec").with_max_retries(2);
        let client = RemoteClient::new(&config).unwrap();
        assert_eq!(client.retry_policy().max_attempts(), 3);
        assert_eq!(client.endpoint_url(), "http://localhost/exec");
    }
}
