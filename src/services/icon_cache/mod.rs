//! Persistent icon cache
//!
//! Keyed by the remote store's delivery URL for a domain, valued by the raw
//! icon bytes. The cache is purely an optimization:
//!
//! - `IconStore` implementations report failures faithfully
//! - `IconCache` turns read failures into misses and write failures into log lines
//! - There is no eviction, TTL or size cap; entries live until removed externally

pub mod file_store;
pub mod metadata;
pub mod service;
pub mod store;

pub use file_store::{FileIconStore, IconCacheStats};
pub use metadata::CachedIconMetadata;
pub use service::IconCache;
pub use store::{IconStore, MemoryIconStore};
