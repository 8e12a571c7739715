//! MCP Tools
//!
//! Tools answered in-process by the bridge.

pub mod echo;
