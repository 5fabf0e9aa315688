//! Bookmark export files, read only for their URLs and titles

use serde::Deserialize;

/// A bookmark as it appears in an export, in either the current or legacy shape
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Exports name the title `name`
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl BookmarkRecord {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.name.as_deref())
            .unwrap_or_default()
    }

    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or_default()
    }
}

/// Either a versioned export object or a bare legacy array of bookmarks
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BookmarkExport {
    Versioned {
        #[serde(default)]
        version: Option<serde_json::Value>,
        #[serde(default)]
        bookmarks: Vec<BookmarkRecord>,
    },
    Legacy(Vec<BookmarkRecord>),
}

impl BookmarkExport {
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    /// Format version of a versioned export
    pub fn version(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Versioned { version, .. } => version.as_ref(),
            Self::Legacy(_) => None,
        }
    }

    pub fn into_bookmarks(self) -> Vec<BookmarkRecord> {
        match self {
            Self::Versioned { bookmarks, .. } | Self::Legacy(bookmarks) => bookmarks,
        }
    }
}
