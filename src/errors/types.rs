//! Error type definitions for the favicon resolver
//!
//! A small hierarchy: component errors (`ProbeError`, `CacheError`,
//! `PublishError`) roll up into `AppError` for callers that want a single type.

use thiserror::Error;

use crate::utils::UrlUtils;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Candidate probing errors
    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    /// Icon cache errors
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Remote icon store errors
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem errors outside the icon cache
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while fetching or measuring a candidate icon
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Transport level failure (DNS, TLS, connection reset, timeout)
    #[error("Request failed for {url}: {message}")]
    Request { url: String, message: String },

    /// The server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The body exceeded the configured limit
    #[error("Icon too large: {size} bytes (max: {max_size})")]
    TooLarge { size: u64, max_size: u64 },

    /// The body could not be decoded as an image
    #[error("Undecodable image from {url}: {message}")]
    Decode { url: String, message: String },

    /// The image decoded to zero width or height
    #[error("Empty image from {url}")]
    EmptyImage { url: String },
}

/// Errors raised by a persistent icon store
#[derive(Error, Debug)]
pub enum CacheError {
    /// Underlying filesystem failure
    #[error("Storage I/O failed for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Sidecar metadata could not be (de)serialized
    #[error("Metadata for {key} is corrupt: {source}")]
    Metadata {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The store could not be opened
    #[error("Store unavailable: {message}")]
    Unavailable { message: String },
}

/// Errors raised while publishing an icon to the remote store
#[derive(Error, Debug)]
pub enum PublishError {
    /// Domain or source URL was empty
    #[error("Missing publish input: domain={domain:?} source_url={source_url:?}")]
    MissingInput { domain: String, source_url: String },

    /// The upload request failed in transit
    #[error("Upload request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store rejected the upload
    #[error("Upload rejected: {message}")]
    Rejected { message: String },

    /// The store answered with something that was not an upload receipt
    #[error("Unexpected upload response: {message}")]
    InvalidResponse { message: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl ProbeError {
    pub fn request<U: Into<String>, M: ToString>(url: U, message: M) -> Self {
        Self::Request {
            url: url.into(),
            message: message.to_string(),
        }
    }
}

impl CacheError {
    /// Keys are URLs, so they are masked before landing in the message
    pub fn io<K: AsRef<str>>(key: K, source: std::io::Error) -> Self {
        Self::Io {
            key: UrlUtils::obfuscate_credentials(key.as_ref()),
            source,
        }
    }
}
