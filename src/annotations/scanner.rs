//! Source tree scanning.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use super::declaration::RawToolDeclaration;
use super::extract::{extract_blocks, normalize_block};

/// File extensions that are scanned for annotations.
pub const SOURCE_EXTENSIONS: &[&str] = &["js", "ts", "gs"];

/// Directory names that are never descended into.
pub const EXCLUDED_DIRS: &[&str] = &["node_modules", "dist", "build", ".git"];

/// Errors that can occur while scanning. None of them abort a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Empty annotation block")]
    EmptyBlock,

    #[error("Invalid YAML payload: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn is_excluded(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| EXCLUDED_DIRS.contains(&name))
            .unwrap_or(false)
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SOURCE_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

/// List the source files under `root`, sorted by name at every level.
pub fn source_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable path during scan: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && has_source_extension(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

/// Parse one extracted payload into a declaration.
pub fn parse_block(payload: &str, source_location: &str) -> Result<RawToolDeclaration, ScanError> {
    let normalized = normalize_block(payload);
    if normalized.trim().is_empty() {
        return Err(ScanError::EmptyBlock);
    }
    let value: Value = serde_yaml::from_str(&normalized)?;
    Ok(RawToolDeclaration::from_payload(value, source_location))
}

/// Extract every declaration from one file's text.
///
/// Blocks that fail to parse are skipped with a warning.
pub fn parse_file_contents(content: &str, source_location: &str) -> Vec<RawToolDeclaration> {
    extract_blocks(content)
        .into_iter()
        .enumerate()
        .filter_map(|(index, payload)| match parse_block(payload, source_location) {
            Ok(declaration) => Some(declaration),
            Err(e) => {
                warn!(
                    "Skipping annotation block #{} in {}: {}",
                    index + 1,
                    source_location,
                    e
                );
                None
            }
        })
        .collect()
}

/// Scan a source tree and return every raw tool declaration found.
///
/// Order is file enumeration order, then block order within each file.
pub async fn scan_directory(root: &Path) -> Vec<RawToolDeclaration> {
    let files = source_files(root);
    info!("Found {} source files to scan in {:?}", files.len(), root);

    let mut declarations = Vec::new();
    for file in files {
        let source_location = file.display().to_string();
        match tokio::fs::read(&file).await {
            Ok(bytes) => {
                let content = String::from_utf8_lossy(&bytes);
                if matches!(content, Cow::Owned(_)) {
                    debug!("Replaced invalid UTF-8 sequences in {}", source_location);
                }
                let found = parse_file_contents(&content, &source_location);
                if !found.is_empty() {
                    debug!("{} annotation block(s) in {}", found.len(), source_location);
                }
                declarations.extend(found);
            }
            Err(e) => {
                warn!("Could not read file {}: {}", source_location, ScanError::from(e));
            }
        }
    }

    info!("Found {} raw tool definitions", declarations.len());
    declarations
}
