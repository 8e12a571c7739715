//! Remote execution endpoint client.
//!
//! Forwards tool invocations to a single HTTP endpoint as
//! `POST {tool, args}` and decodes `{ok, result?, message?}` replies.

mod client;
mod endpoint;
mod models;
mod retry_policy;

pub use client::{DelayFn, RemoteClient, ToolInvoker};
pub use endpoint::{ClientSettings, EndpointConfigFile, RemoteEndpointConfig};
pub use models::{InvocationRequest, InvocationResponse, RemoteCallError, RemoteErrorType};
pub use retry_policy::RetryPolicy;
