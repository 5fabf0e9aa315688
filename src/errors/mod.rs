//! Centralized error handling for the favicon resolver
//!
//! Every failure inside the resolution pipeline is soft: probes, cache I/O and
//! publish-back errors are converted into "skip this candidate", "treat as a
//! miss" or "log and move on" by the component that observes them. These types
//! exist so that the boundaries between components stay typed and so the
//! binary can report configuration and I/O problems properly.
//!
//! # Error Categories
//!
//! - **Probe Errors**: fetching or decoding a candidate icon
//! - **Cache Errors**: persistent icon store I/O and metadata
//! - **Publish Errors**: uploads to the remote icon store
//! - **Configuration Errors**: invalid or unreadable settings
//!
//! # Usage
//!
//! ```rust
//! use favicon_resolver::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::configuration("cloud_name must not be empty"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for icon store Results
pub type CacheResult<T> = Result<T, CacheError>;

/// Convenience type alias for remote store upload Results
pub type PublishResult<T> = Result<T, PublishError>;
