//! MCP (Model Context Protocol) Server
//!
//! Publishes the compiled tool registry to MCP clients and dispatches each
//! invocation to the built-in echo tool or the remote endpoint.
//!
//! ## Architecture
//!
//! - Transport: JSON-RPC 2.0, one message per line over stdio
//! - Tools: one registered tool per compiled definition
//! - Remote tools: forwarded through a [`crate::remote::ToolInvoker`]

pub mod handler;
pub mod protocol;
pub mod registry;
pub mod tools;

pub use handler::{BridgeServer, CONFIGURATION_MISSING_MESSAGE};
pub use protocol::{McpError, McpRequest, McpResponse};
pub use registry::{McpRegistry, RegisteredTool, ToolHandler};
