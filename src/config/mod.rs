mod file_config;

pub use file_config::{BridgeConfig, BuildConfig, FileConfig};

use crate::registry::CompileOptions;
use crate::remote::{ClientSettings, RemoteEndpointConfig};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_TOOLS_FILE: &str = "mcp.tools.json";
pub const DEFAULT_ENDPOINT_CONFIG: &str = ".mcp-gas.json";

/// What `build` produces when no tool definition is found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum RegistryMode {
    /// Publish the built-in echo tool.
    #[default]
    Fallback,
    /// Publish an empty registry.
    Empty,
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub tools_file: PathBuf,
    pub root: PathBuf,
    pub strict: bool,
    pub mode: RegistryMode,
    pub endpoint_config: PathBuf,
    pub api_token: Option<String>,
    pub timeout_ms: u64,
    pub max_retries: u32,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            tools_file: PathBuf::from(DEFAULT_TOOLS_FILE),
            root: PathBuf::from("."),
            strict: false,
            mode: RegistryMode::Fallback,
            endpoint_config: PathBuf::from(DEFAULT_ENDPOINT_CONFIG),
            api_token: None,
            timeout_ms: RemoteEndpointConfig::DEFAULT_TIMEOUT_MS,
            max_retries: RemoteEndpointConfig::DEFAULT_MAX_RETRIES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub tools_file: PathBuf,
    pub build: BuildSettings,
    pub bridge: BridgeSettings,
}

#[derive(Debug, Clone)]
pub struct BuildSettings {
    pub root: PathBuf,
    pub compile_options: CompileOptions,
}

impl BuildSettings {
    /// Check that the project root is an existing directory. Only `build` scans it.
    pub fn validate_root(&self) -> Result<()> {
        if !self.root.exists() {
            bail!("Project root does not exist: {:?}", self.root);
        }
        if !self.root.is_dir() {
            bail!("Project root is not a directory: {:?}", self.root);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct BridgeSettings {
    pub endpoint_config: PathBuf,
    pub client: ClientSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let tools_file = file
            .tools_file
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.tools_file.clone());

        // Build settings
        let build_file = file.build.unwrap_or_default();
        let root = build_file
            .root
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.root.clone());

        let mode = match build_file.mode {
            Some(mode) => parse_registry_mode(&mode)?,
            None => cli.mode,
        };
        let compile_options = CompileOptions {
            strict: build_file.strict.unwrap_or(cli.strict),
            allow_empty: mode == RegistryMode::Empty,
        };

        // Bridge settings
        let bridge_file = file.bridge.unwrap_or_default();
        let endpoint_config = bridge_file
            .endpoint_config
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.endpoint_config.clone());
        let access_token = bridge_file
            .api_token
            .or_else(|| cli.api_token.clone())
            .filter(|token| !token.is_empty());
        let timeout_ms = bridge_file.timeout_ms.unwrap_or(cli.timeout_ms);
        if timeout_ms == 0 {
            bail!("timeout_ms must be greater than zero");
        }
        let max_retries = bridge_file.max_retries.unwrap_or(cli.max_retries);

        Ok(AppConfig {
            tools_file,
            build: BuildSettings {
                root,
                compile_options,
            },
            bridge: BridgeSettings {
                endpoint_config,
                client: ClientSettings {
                    access_token,
                    timeout_ms,
                    max_retries,
                },
            },
        })
    }
}

fn parse_registry_mode(s: &str) -> Result<RegistryMode> {
    match RegistryMode::from_str(s, true) {
        Ok(mode) => Ok(mode),
        Err(_) => bail!("Invalid registry mode {:?}, expected \"fallback\" or \"empty\"", s),
    }
}
