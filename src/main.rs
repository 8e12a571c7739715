use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gas_mcp_bridge::config::{
    AppConfig, CliConfig, FileConfig, RegistryMode, DEFAULT_ENDPOINT_CONFIG, DEFAULT_TOOLS_FILE,
};
use gas_mcp_bridge::{compile, scan_directory, BridgeServer, RemoteEndpointConfig};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[clap(name = "gas-mcp-bridge", version)]
struct CliArgs {
    /// Path to a TOML config file. Its values override command line arguments.
    #[clap(long, value_parser = parse_path)]
    pub config_file: Option<PathBuf>,

    /// Path of the compiled tools file.
    #[clap(long, env = "MCP_TOOLS_FILE", default_value = DEFAULT_TOOLS_FILE)]
    pub tools_file: PathBuf,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan annotated sources and write the tools file.
    Build {
        /// Project directory to scan.
        #[clap(long, default_value = ".", value_parser = parse_path)]
        root: PathBuf,

        /// Fail when no tool definition is found.
        #[clap(long, env = "MCP_STRICT")]
        strict: bool,

        /// What to publish when no tool definition is found.
        #[clap(long, env = "MCP_MODE", value_enum, default_value = "fallback")]
        mode: RegistryMode,
    },

    /// Serve the tools file over MCP on stdin/stdout.
    Start {
        /// Path to the remote endpoint configuration.
        #[clap(long, env = "MCP_GAS_CONFIG_PATH", default_value = DEFAULT_ENDPOINT_CONFIG)]
        config: PathBuf,

        /// Bearer token for the remote endpoint. Overrides the endpoint file's apiToken.
        #[clap(long, env = "GAS_API_TOKEN", hide_env_values = true)]
        api_token: Option<String>,

        /// Timeout of a single remote attempt, in milliseconds.
        #[clap(long, env = "MCP_TIMEOUT_MS", default_value_t = RemoteEndpointConfig::DEFAULT_TIMEOUT_MS)]
        timeout_ms: u64,

        /// Retries after a failed remote attempt.
        #[clap(long, env = "MCP_RETRY", default_value_t = RemoteEndpointConfig::DEFAULT_MAX_RETRIES)]
        max_retries: u32,
    },
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        let mut cli = CliConfig {
            tools_file: self.tools_file.clone(),
            ..CliConfig::default()
        };
        match &self.command {
            Command::Build { root, strict, mode } => {
                cli.root = root.clone();
                cli.strict = *strict;
                cli.mode = *mode;
            }
            Command::Start {
                config,
                api_token,
                timeout_ms,
                max_retries,
            } => {
                cli.endpoint_config = config.clone();
                cli.api_token = api_token.clone();
                cli.timeout_ms = *timeout_ms;
                cli.max_retries = *max_retries;
            }
        }
        cli
    }
}

async fn run_build(config: &AppConfig) -> Result<()> {
    config.build.validate_root()?;
    info!("Scanning {:?} for @mcp annotations...", config.build.root);
    let declarations = scan_directory(&config.build.root).await;

    let registry = compile(declarations, config.build.compile_options)?;
    registry.save(&config.tools_file).await?;

    info!(
        "Wrote {} tool definitions to {:?}",
        registry.len(),
        config.tools_file
    );
    Ok(())
}

async fn run_start(config: &AppConfig) -> Result<()> {
    let server = BridgeServer::load(
        &config.tools_file,
        &config.bridge.endpoint_config,
        &config.bridge.client,
    )
    .await?;

    info!("MCP bridge ready on stdio");
    server
        .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;
    info!("MCP bridge stopped");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    // Stdout carries the protocol, logs go to stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config_file {
        Some(path) => {
            info!("Loading config file {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    match cli_args.command {
        Command::Build { .. } => run_build(&config).await,
        Command::Start { .. } => run_start(&config).await,
    }
}
