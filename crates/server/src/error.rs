//! Error types for the MCP server.

use snap_store_client::StoreError;
use thiserror::Error;

/// Process-level errors: configuration and transport setup.
///
/// Per-call failures never use this type; they are rendered into tool results.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration errors (invalid YAML, bad values, conflicts)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Startup errors (port bind, transport handshake)
    #[error("Startup error: {0}")]
    Startup(String),

    /// Runtime errors (transport terminated abnormally)
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Store client construction errors
    #[error("Store client error: {0}")]
    Store(#[from] StoreError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;
