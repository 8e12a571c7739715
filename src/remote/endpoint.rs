use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// On-disk endpoint configuration, as written by the deploy tooling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<String>,
    #[serde(alias = "endpointUrl")]
    pub gas_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

impl EndpointConfigFile {
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read endpoint config from {:?}", path))?;
        let file: EndpointConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse endpoint config from {:?}", path))?;
        if file.gas_url.trim().is_empty() {
            bail!("Endpoint config {:?} has an empty gasUrl", path);
        }
        Ok(file)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize endpoint config")?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write endpoint config to {:?}", path))
    }
}

/// Client-side settings that are not part of the endpoint file.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    /// Takes precedence over the file's `apiToken`.
    pub access_token: Option<String>,
    pub timeout_ms: u64,
    pub max_retries: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            access_token: None,
            timeout_ms: RemoteEndpointConfig::DEFAULT_TIMEOUT_MS,
            max_retries: RemoteEndpointConfig::DEFAULT_MAX_RETRIES,
        }
    }
}

/// Resolved configuration of the remote execution endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteEndpointConfig {
    pub endpoint_url: String,
    pub access_token: Option<String>,
    pub timeout_ms: u64,
    pub max_retries: u32,
}

impl RemoteEndpointConfig {
    pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
    pub const DEFAULT_MAX_RETRIES: u32 = 0;

    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            access_token: None,
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
            max_retries: Self::DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn from_file(file: EndpointConfigFile, settings: &ClientSettings) -> Self {
        let access_token = settings
            .access_token
            .clone()
            .or(file.api_token)
            .filter(|token| !token.is_empty());
        Self {
            endpoint_url: file.gas_url,
            access_token,
            timeout_ms: settings.timeout_ms,
            max_retries: settings.max_retries,
        }
    }

    /// Load the endpoint configuration, returning `None` when it is unavailable.
    pub async fn load(path: &Path, settings: &ClientSettings) -> Option<Self> {
        match EndpointConfigFile::load(path).await {
            Ok(file) => {
                let config = Self::from_file(file, settings);
                info!(
                    "Loaded endpoint config from {:?}: url={}, token={}, timeout={}ms, max_retries={}",
                    path,
                    config.endpoint_url,
                    if config.access_token.is_some() { "set" } else { "none" },
                    config.timeout_ms,
                    config.max_retries
                );
                Some(config)
            }
            Err(e) => {
                warn!(
                    "{:#}. Remote tools will fail until the endpoint is configured.",
                    e
                );
                None
            }
        }
    }
}
