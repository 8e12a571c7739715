use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Name of the built-in fallback tool.
pub const ECHO_TOOL_NAME: &str = "echo";

/// Routing key that marks the built-in fallback tool as local.
pub const ECHO_ROUTING_KEY: &str = "echo";

/// A validated tool definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Identifier used to address the tool at the remote endpoint.
    #[serde(rename = "path", alias = "routingKey")]
    pub routing_key: String,
    /// JSON Schema describing the tool input. Always a JSON object.
    pub schema: Value,
}

/// How an invocation of a tool is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// Answered in-process, never touches the network.
    Local,
    /// Forwarded to the remote execution endpoint.
    Remote,
}

impl ToolDefinition {
    pub fn handler_kind(&self) -> HandlerKind {
        if self.name == ECHO_TOOL_NAME && self.routing_key == ECHO_ROUTING_KEY {
            HandlerKind::Local
        } else {
            HandlerKind::Remote
        }
    }
}

/// The built-in `echo` tool, used whenever a registry would otherwise be empty.
pub fn echo_tool() -> ToolDefinition {
    ToolDefinition {
        name: ECHO_TOOL_NAME.to_string(),
        description: "A simple tool that echoes back the input. Used as a default when no other tools are defined.".to_string(),
        routing_key: ECHO_ROUTING_KEY.to_string(),
        schema: serde_json::json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "The message to echo back."
                }
            },
            "required": ["message"]
        }),
    }
}

/// On-disk form of a registry.
#[derive(Debug, Serialize, Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    tools: Vec<ToolDefinition>,
}

/// Ordered mapping from tool name to definition.
///
/// Inserting a name that is already present replaces the definition but
/// keeps the position of the first occurrence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    tools: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding only the built-in `echo` tool.
    pub fn echo_only() -> Self {
        let mut registry = Self::new();
        registry.insert(echo_tool());
        registry
    }

    /// Insert a definition, returning the one it replaced, if any.
    pub fn insert(&mut self, tool: ToolDefinition) -> Option<ToolDefinition> {
        match self.index.get(&tool.name) {
            Some(&position) => Some(std::mem::replace(&mut self.tools[position], tool)),
            None => {
                self.index.insert(tool.name.clone(), self.tools.len());
                self.tools.push(tool);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.index.get(name).map(|&position| &self.tools[position])
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    /// Serialize to the `{ "tools": [...] }` document.
    pub fn to_json(&self) -> Result<String> {
        let document = RegistryDocument {
            tools: self.tools.clone(),
        };
        serde_json::to_string_pretty(&document).context("Failed to serialize tool registry")
    }

    /// Parse a `{ "tools": [...] }` document.
    pub fn from_json(content: &str) -> Result<Self> {
        let document: RegistryDocument =
            serde_json::from_str(content).context("Failed to parse tool registry")?;
        let mut registry = Self::new();
        for tool in document.tools {
            registry.insert(tool);
        }
        Ok(registry)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write tool registry to {:?}", path))
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read tool registry from {:?}", path))?;
        Self::from_json(&content)
    }

    /// Load a registry, falling back to the `echo`-only registry on any failure.
    pub async fn load_or_echo(path: &Path) -> Self {
        match Self::load(path).await {
            Ok(registry) => registry,
            Err(e) => {
                warn!("{:#}. Using default echo tool.", e);
                Self::echo_only()
            }
        }
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a ToolDefinition;
    type IntoIter = std::slice::Iter<'a, ToolDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.tools.iter()
    }
}
