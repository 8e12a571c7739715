//! Registry compiler.
//!
//! Validates raw declarations, resolves duplicates (last one wins) and applies
//! the empty-registry policy.

use jsonschema::JSONSchema;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use super::model::{Registry, ToolDefinition};
use crate::annotations::RawToolDeclaration;

/// Errors that abort compilation.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Strict mode is enabled and no tool definitions were found")]
    NoToolDefinitions,
}

/// Policy applied when no valid declaration survives validation.
///
/// `strict` takes priority over `allow_empty`; with neither set the registry
/// is repaired with the built-in `echo` tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub strict: bool,
    pub allow_empty: bool,
}

/// Advisory structural check of a schema against the JSON Schema meta-schema.
pub fn check_schema(schema: &Value) -> Result<(), String> {
    JSONSchema::compile(schema)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

fn validate(declaration: RawToolDeclaration) -> Option<ToolDefinition> {
    let source = declaration.source_location;

    let name = match declaration.name {
        Some(Value::String(name)) if !name.is_empty() => name,
        _ => {
            warn!("Skipping tool in {} due to missing or invalid name", source);
            return None;
        }
    };

    let schema = match declaration.schema {
        Some(schema @ Value::Object(_)) => schema,
        _ => {
            warn!(
                "Skipping tool \"{}\" in {} due to missing or invalid schema",
                name, source
            );
            return None;
        }
    };

    if let Err(e) = check_schema(&schema) {
        // Advisory only, the tool is kept
        warn!("Invalid JSON Schema for tool \"{}\" in {}: {}", name, source, e);
    }

    let routing_key = match declaration.path {
        Some(Value::String(path)) if !path.is_empty() => path,
        _ => source,
    };

    let description = match declaration.description {
        Some(Value::String(description)) => description,
        _ => String::new(),
    };

    Some(ToolDefinition {
        name,
        description,
        routing_key,
        schema,
    })
}

/// Validate declarations in scan order into a registry, without the empty policy.
pub fn process_declarations(declarations: Vec<RawToolDeclaration>) -> Registry {
    let mut registry = Registry::new();

    for tool in declarations.into_iter().filter_map(validate) {
        if let Some(previous) = registry.insert(tool) {
            info!(
                "Duplicate tool \"{}\", replacing earlier definition routed to {}",
                previous.name, previous.routing_key
            );
        }
    }

    info!("Processed {} valid tool definitions", registry.len());
    registry
}

/// Compile declarations into a registry, applying the empty-registry policy.
pub fn compile(
    declarations: Vec<RawToolDeclaration>,
    options: CompileOptions,
) -> Result<Registry, CompileError> {
    let registry = process_declarations(declarations);
    if !registry.is_empty() {
        return Ok(registry);
    }

    warn!("No valid tool definitions found in project");

    if options.strict {
        return Err(CompileError::NoToolDefinitions);
    }
    if options.allow_empty {
        info!("Empty mode enabled, generating empty tools file");
        return Ok(registry);
    }

    info!("No tools found, creating default \"echo\" tool");
    Ok(Registry::echo_only())
}
