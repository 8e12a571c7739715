//! MCP Tool Registry
//!
//! Registered tools published by the bridge, built from a compiled registry.

use std::collections::HashMap;

use serde_json::{json, Value};

use super::protocol::ToolDefinition;
use crate::registry::{HandlerKind, Registry};

/// How an invocation of a registered tool is served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolHandler {
    /// Built-in echo, answered in-process.
    Local,
    /// Forwarded to the remote endpoint under `routing_key`.
    Remote { routing_key: String },
}

/// A registered tool with metadata and handler
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredTool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub handler: ToolHandler,
}

/// Published input schema: object schemas as declared, anything else permissive.
pub fn input_schema_for(schema: &Value) -> Value {
    match schema.get("type") {
        Some(Value::String(t)) if t == "object" => schema.clone(),
        _ => json!({ "type": "object" }),
    }
}

/// Registry for MCP tools, in publication order
#[derive(Debug, Default)]
pub struct McpRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl McpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_registry(registry: &Registry) -> Self {
        let mut mcp_registry = Self::new();
        for definition in registry {
            let handler = match definition.handler_kind() {
                HandlerKind::Local => ToolHandler::Local,
                HandlerKind::Remote => ToolHandler::Remote {
                    routing_key: definition.routing_key.clone(),
                },
            };
            mcp_registry.register_tool(RegisteredTool {
                name: definition.name.clone(),
                description: definition.description.clone(),
                input_schema: input_schema_for(&definition.schema),
                handler,
            });
        }
        mcp_registry
    }

    /// Register a tool, replacing any tool with the same name in place
    pub fn register_tool(&mut self, tool: RegisteredTool) {
        match self.index.get(&tool.name) {
            Some(&position) => self.tools[position] = tool,
            None => {
                self.index.insert(tool.name.clone(), self.tools.len());
                self.tools.push(tool);
            }
        }
    }

    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|tool| ToolDefinition {
                name: tool.name.clone(),
                title: tool.name.clone(),
                description: tool.description.clone(),
                input_schema: tool.input_schema.clone(),
            })
            .collect()
    }

    pub fn get_tool(&self, name: &str) -> Option<&RegisteredTool> {
        self.index.get(name).map(|&position| &self.tools[position])
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    pub fn remote_tool_count(&self) -> usize {
        self.tools
            .iter()
            .filter(|tool| matches!(tool.handler, ToolHandler::Remote { .. }))
            .count()
    }
}
