//! GAS MCP Bridge Library
//!
//! Discovers `@mcp` tool annotations in source files, compiles them into a
//! tool registry and serves that registry over MCP, forwarding calls to a
//! remote HTTP execution endpoint.

pub mod annotations;
pub mod config;
pub mod mcp;
pub mod registry;
pub mod remote;

// Re-export commonly used types for convenience
pub use annotations::{scan_directory, RawToolDeclaration};
pub use mcp::BridgeServer;
pub use registry::{compile, CompileError, CompileOptions, Registry, ToolDefinition};
pub use remote::{RemoteCallError, RemoteClient, RemoteEndpointConfig, RemoteErrorType};
