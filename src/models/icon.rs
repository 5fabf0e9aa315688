use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Origin of a candidate icon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IconSource {
    /// The remote image store's optimized copy for the domain
    RemoteStore,
    /// Google's high-resolution favicon service
    Google,
    /// DuckDuckGo's favicon service
    #[serde(rename = "duckduckgo")]
    #[strum(serialize = "duckduckgo")]
    DuckDuckGo,
}

impl IconSource {
    pub fn is_remote_store(self) -> bool {
        matches!(self, Self::RemoteStore)
    }
}

/// A successfully probed icon with its natural dimensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconCandidate {
    pub source: IconSource,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl IconCandidate {
    pub fn new(source: IconSource, url: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            source,
            url: url.into(),
            width,
            height,
        }
    }
}
