//! Tool registry: the compiled, immutable set of tool definitions.

mod compiler;
mod model;

pub use compiler::{check_schema, compile, process_declarations, CompileError, CompileOptions};
pub use model::{
    echo_tool, HandlerKind, Registry, ToolDefinition, ECHO_ROUTING_KEY, ECHO_TOOL_NAME,
};
