//! Per-display resolution state and the directive handed to renderers

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::Serialize;

use super::icon::{IconCandidate, IconSource};
use crate::utils::{HslColor, color_for_domain};

/// A displayable icon
#[derive(Debug, Clone, PartialEq)]
pub enum IconImage {
    /// A probed candidate, displayed straight from its URL
    Remote(IconCandidate),
    /// Bytes served from the local icon cache
    Cached { key: String, bytes: Bytes },
}

impl IconImage {
    /// Something an `<img src>` accepts: the candidate URL, or a `data:` URI for cached bytes
    pub fn src(&self) -> String {
        match self {
            Self::Remote(candidate) => candidate.url.clone(),
            Self::Cached { bytes, .. } => {
                let mime = infer::get(bytes)
                    .map(|kind| kind.mime_type())
                    .unwrap_or("application/octet-stream");
                format!("data:{mime};base64,{}", STANDARD.encode(bytes))
            }
        }
    }
}

/// Letter-and-color placeholder shown when no icon candidate is usable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FallbackTile {
    pub letter: String,
    pub color: HslColor,
}

impl FallbackTile {
    /// First character of the domain, else of the title, else `?`; uppercased
    pub fn for_input(domain: &str, title: &str) -> Self {
        let letter = domain
            .chars()
            .next()
            .or_else(|| title.chars().next())
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "?".to_string());

        Self {
            letter,
            color: color_for_domain(domain),
        }
    }
}

/// Resolution state of one display instance
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DisplayState {
    #[default]
    Loading,
    Resolved(IconImage),
    Fallback(FallbackTile),
}

impl DisplayState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn directive(&self) -> DisplayDirective {
        DisplayDirective::from(self)
    }
}

/// What happened to a finished resolution
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome {
    /// The result became the instance's displayed state
    Applied(DisplayState),
    /// A newer resolution or a teardown happened first; the result was dropped
    Superseded,
}

impl ResolutionOutcome {
    pub fn state(&self) -> Option<&DisplayState> {
        match self {
            Self::Applied(state) => Some(state),
            Self::Superseded => None,
        }
    }
}

/// Serializable rendering instruction derived from a `DisplayState`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DisplayDirective {
    Loading,
    Image {
        src: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        source: Option<IconSource>,
        #[serde(skip_serializing_if = "Option::is_none")]
        width: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        height: Option<u32>,
        cached: bool,
    },
    Fallback {
        letter: String,
        color: HslColor,
    },
}

impl From<&DisplayState> for DisplayDirective {
    fn from(state: &DisplayState) -> Self {
        match state {
            DisplayState::Loading => Self::Loading,
            DisplayState::Resolved(image @ IconImage::Remote(candidate)) => Self::Image {
                src: image.src(),
                source: Some(candidate.source),
                width: Some(candidate.width),
                height: Some(candidate.height),
                cached: false,
            },
            DisplayState::Resolved(image @ IconImage::Cached { .. }) => Self::Image {
                src: image.src(),
                source: None,
                width: None,
                height: None,
                cached: true,
            },
            DisplayState::Fallback(tile) => Self::Fallback {
                letter: tile.letter.clone(),
                color: tile.color,
            },
        }
    }
}
