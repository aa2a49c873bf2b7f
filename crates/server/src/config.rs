//! Command-line + file configuration.
//!
//! Precedence: CLI flags / environment variables, then the optional YAML file, then defaults.

use crate::error::{Result, ServerError};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use snap_store_client::{SnapStoreClient, StoreConfig};
use snap_store_client::client::{
    DEFAULT_ARCHITECTURE, DEFAULT_SERIES, DEFAULT_STORE_URL, DEFAULT_TIMEOUT,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// MCP over stdin/stdout.
    #[default]
    Stdio,
    /// MCP streamable HTTP at `/mcp`.
    Http,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "snap-store-mcp",
    version,
    about = "MCP server for searching and inspecting Snap Store packages"
)]
pub struct Cli {
    /// Optional YAML config file.
    #[arg(long, env = "SNAP_MCP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Snap Store API base URL.
    #[arg(long, env = "SNAP_STORE_URL")]
    pub store_url: Option<String>,

    /// `Snap-Device-Series` header value.
    #[arg(long, env = "SNAP_STORE_SERIES")]
    pub series: Option<String>,

    /// Architecture used to filter channel releases in `snap_info`.
    #[arg(long, env = "SNAP_STORE_ARCH")]
    pub architecture: Option<String>,

    /// Per-request timeout for store calls, in seconds.
    #[arg(long, env = "SNAP_STORE_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    #[arg(long, value_enum, env = "SNAP_MCP_TRANSPORT")]
    pub transport: Option<TransportKind>,

    /// Listen address for the `http` transport.
    #[arg(long, env = "SNAP_MCP_BIND")]
    pub bind: Option<SocketAddr>,

    /// Log level (overridden by `RUST_LOG`).
    #[arg(long, env = "SNAP_MCP_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, value_enum, env = "SNAP_MCP_LOG_FORMAT", default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// The YAML config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub store_url: Option<String>,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub architecture: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub transport: Option<TransportKind>,
    #[serde(default)]
    pub bind: Option<SocketAddr>,
}

/// Fully-resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub store: StoreConfig,
    pub transport: TransportKind,
    pub bind: SocketAddr,
}

impl ServerConfig {
    /// Resolve the effective configuration from CLI/env and the optional config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or a value is invalid.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => load_file_config(path)?,
            None => FileConfig::default(),
        };
        Self::merge(cli, file)
    }

    /// # Errors
    ///
    /// Returns [`ServerError::Config`] if the merged values are invalid.
    pub fn merge(cli: &Cli, file: FileConfig) -> Result<Self> {
        let timeout_secs = cli.timeout_secs.or(file.timeout_secs);
        let timeout = match timeout_secs {
            Some(0) => {
                return Err(ServerError::Config(
                    "timeoutSecs must be greater than zero".to_string(),
                ));
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_TIMEOUT,
        };

        let store = StoreConfig {
            base_url: pick(&cli.store_url, file.store_url, DEFAULT_STORE_URL),
            series: pick(&cli.series, file.series, DEFAULT_SERIES),
            architecture: pick(&cli.architecture, file.architecture, DEFAULT_ARCHITECTURE),
            timeout,
        };
        snap_store_client::safety::parse_base_url(&store.base_url)
            .map_err(|e| ServerError::Config(e.to_string()))?;
        if store.series.trim().is_empty() || store.architecture.trim().is_empty() {
            return Err(ServerError::Config(
                "series and architecture must not be empty".to_string(),
            ));
        }

        let bind = match cli.bind.or(file.bind) {
            Some(b) => b,
            None => DEFAULT_BIND
                .parse()
                .map_err(|e| ServerError::Config(format!("invalid default bind address: {e}")))?,
        };

        Ok(Self {
            store,
            transport: cli.transport.or(file.transport).unwrap_or_default(),
            bind,
        })
    }

    /// Build the store client for this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Store`] if the client rejects the store settings.
    pub fn build_client(&self) -> Result<SnapStoreClient> {
        Ok(SnapStoreClient::new(self.store.clone())?)
    }
}

fn pick(cli: &Option<String>, file: Option<String>, default: &str) -> String {
    cli.clone()
        .or(file)
        .unwrap_or_else(|| default.to_string())
}

/// Read and parse a YAML config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid config document.
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        ServerError::Config(format!("failed to read config {}: {e}", path.display()))
    })?;
    if text.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    let cfg: FileConfig = serde_yaml::from_str(&text)?;
    Ok(cfg)
}
