//! Error types for batch resolution and per-item extraction

use crate::outcome::ErrorKind;
use thiserror::Error;

/// Result type for batch-level operations
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Errors that fail a whole batch call.
///
/// Individual URLs never produce one of these; their failures are reported
/// through [`FetchOutcome::error_kind`](crate::FetchOutcome).
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Configuration rejected by [`ResolverConfig::validate`](crate::ResolverConfig::validate)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A network session could not be opened
    #[error("Transport error: {0}")]
    Transport(String),

    /// The caller's shutdown signal fired before the batch finished
    #[error("Batch cancelled before completion")]
    Cancelled,

    /// IO error while reading or writing a config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config could not be serialized
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

/// Errors raised while fetching or extracting a single URL
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Network error during fetch
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP error response
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Response body exceeded the configured cap
    #[error("Content too large: {size} bytes exceeds max {max} bytes")]
    ContentTooLarge { size: usize, max: usize },

    /// Deadline exceeded
    #[error("Request timeout after {0} ms")]
    Timeout(u64),

    /// Markup could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// PDF extraction error
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Transcript could not be retrieved
    #[error("Transcript error: {0}")]
    Transcript(String),

    /// Extractor ran but found no text
    #[error("No extractable content")]
    Empty,

    /// Blocking extraction task failed to complete
    #[error("Extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ExtractError {
    /// Classify this error into the per-item taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractError::Timeout(_) => ErrorKind::Timeout,
            ExtractError::Network(_)
            | ExtractError::Http { .. }
            | ExtractError::InvalidUrl(_)
            | ExtractError::ContentTooLarge { .. } => ErrorKind::TransportError,
            ExtractError::Parse(_)
            | ExtractError::Pdf(_)
            | ExtractError::Transcript(_)
            | ExtractError::Empty
            | ExtractError::Join(_)
            | ExtractError::Other(_) => ErrorKind::ExtractError,
        }
    }

    /// Map a reqwest failure, attributing timeouts to the given deadline
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            ExtractError::Timeout(timeout_ms)
        } else if let Some(status) = err.status() {
            ExtractError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_builder() {
            ExtractError::InvalidUrl(err.to_string())
        } else {
            ExtractError::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for ExtractError {
    fn from(err: url::ParseError) -> Self {
        ExtractError::InvalidUrl(err.to_string())
    }
}

#[cfg(feature = "pdf")]
impl From<lopdf::Error> for ExtractError {
    fn from(err: lopdf::Error) -> Self {
        ExtractError::Pdf(err.to_string())
    }
}

impl From<serde_json::Error> for ExtractError {
    fn from(err: serde_json::Error) -> Self {
        ExtractError::Parse(err.to_string())
    }
}
