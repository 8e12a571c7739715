use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub tools_file: Option<String>,

    // Per-command sections
    pub build: Option<BuildConfig>,
    pub bridge: Option<BridgeConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct BuildConfig {
    pub root: Option<String>,
    pub strict: Option<bool>,
    /// Empty-registry policy: "fallback" or "empty"
    pub mode: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct BridgeConfig {
    pub endpoint_config: Option<String>,
    pub api_token: Option<String>,
    pub timeout_ms: Option<u64>,
    pub max_retries: Option<u32>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_full_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bridge.toml");
        std::fs::write(
            &path,
            r#"
tools_file = "out/tools.json"

[build]
root = "src"
strict = true
mode = "empty"

[bridge]
endpoint_config = "deploy/.mcp-gas.json"
api_token = "secret"
timeout_ms = 5000
max_retries = 2
"#,
        )
        .unwrap();

        let config = FileConfig::load(&path).unwrap();
        assert_eq!(config.tools_file.as_deref(), Some("out/tools.json"));

        let build = config.build.unwrap();
        assert_eq!(build.root.as_deref(), Some("src"));
        assert_eq!(build.strict, Some(true));
        assert_eq!(build.mode.as_deref(), Some("empty"));

        let bridge = config.bridge.unwrap();
        assert_eq!(bridge.endpoint_config.as_deref(), Some("deploy/.mcp-gas.json"));
        assert_eq!(bridge.api_token.as_deref(), Some("secret"));
        assert_eq!(bridge.timeout_ms, Some(5000));
        assert_eq!(bridge.max_retries, Some(2));
    }

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bridge.toml");
        std::fs::write(&path, "[bridge]\nmax_retries = 1\n").unwrap();

        let config = FileConfig::load(&path).unwrap();
        assert!(config.tools_file.is_none());
        assert!(config.build.is_none());
        let bridge = config.bridge.unwrap();
        assert_eq!(bridge.max_retries, Some(1));
        assert!(bridge.timeout_ms.is_none());
    }

    #[test]
    fn test_load_errors() {
        let dir = TempDir::new().unwrap();
        assert!(FileConfig::load(&dir.path().join("missing.toml")).is_err());

        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[bridge]\ntimeout_ms = \"soon\"\n").unwrap();
        let err = FileConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }
}
