//! Sidecar metadata written next to each cached icon blob

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Describes one cached blob; the blob itself is stored separately
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedIconMetadata {
    /// The cache key (remote store delivery URL)
    pub key: String,
    pub size: u64,
    /// MIME type sniffed from the blob, when recognizable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub cached_at: DateTime<Utc>,
}

impl CachedIconMetadata {
    pub fn describe(key: &str, blob: &[u8]) -> Self {
        Self {
            key: key.to_string(),
            size: blob.len() as u64,
            content_type: infer::get(blob).map(|kind| kind.mime_type().to_string()),
            cached_at: Utc::now(),
        }
    }
}
