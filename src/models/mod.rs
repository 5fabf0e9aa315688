//! Data models shared across the resolution pipeline

pub mod bookmark;
pub mod display;
pub mod icon;

pub use bookmark::{BookmarkExport, BookmarkRecord};
pub use display::{DisplayDirective, DisplayState, FallbackTile, IconImage, ResolutionOutcome};
pub use icon::{IconCandidate, IconSource};
