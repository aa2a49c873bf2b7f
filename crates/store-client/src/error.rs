//! Error types for `snap-store-client`.

use thiserror::Error;

/// Every way a store operation can fail.
///
/// The set is closed: transport and decoding failures are converted at the client boundary so
/// callers never see a raw `reqwest` error or a partially-decoded payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Caller input was rejected before any request was made.
    #[error("invalid argument: {0}")]
    Validation(String),

    /// The store has no package with this name.
    #[error("package not found: {name}")]
    NotFound { name: String },

    /// The store answered HTTP 429.
    #[error("rate limited by the snap store")]
    RateLimited,

    /// Timeout, DNS failure, refused connection, cancelled request.
    #[error("network error: {0}")]
    Network(String),

    /// A 2xx response whose body could not be decoded into the expected shape.
    #[error("malformed store response: {0}")]
    Malformed(String),

    /// Any other non-success status.
    #[error("unexpected store response status {status}")]
    Unknown { status: u16 },
}

impl StoreError {
    /// Short machine-readable tag, used in logs and structured tool output.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound { .. } => "not_found",
            Self::RateLimited => "rate_limited",
            Self::Network(_) => "network",
            Self::Malformed(_) => "malformed",
            Self::Unknown { .. } => "unknown",
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(value: reqwest::Error) -> Self {
        Self::Network(crate::safety::sanitize_reqwest_error(&value))
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
