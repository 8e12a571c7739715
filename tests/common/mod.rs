//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::MockEndpoint;
//!
//! #[tokio::test]
//! async fn test_call() {
//!     let endpoint = MockEndpoint::spawn().await;
//!     let client = endpoint.client();
//!     let result = client.call_tool("tool", serde_json::json!({})).await.unwrap();
//! }
//! ```

mod bridge;
mod fixtures;
mod mock_endpoint;

// Public API - this is what tests import
#[allow(unused_imports)]
pub use bridge::BridgeClient;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use mock_endpoint::{MockEndpoint, RecordedRequest};
