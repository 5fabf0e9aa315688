//! Service layer for icon resolution
//!
//! # Architecture
//!
//! - `providers`: URL builders for the public favicon services
//! - `remote_store`: the remote image store (delivery URLs and uploads)
//! - `prober`: loads a candidate URL and measures it
//! - `icon_ranker`: runs the three probes and picks a winner
//! - `icon_cache`: persistent bytes cache keyed by remote store URL
//! - `favicon`: per-display orchestration and background side effects
//!
//! Network-facing collaborators sit behind traits (`ImageProber`,
//! `ImageFetcher`, `RemoteIconStore`, `IconProvider`, `IconStore`) so the
//! orchestration can be driven with synthetic doubles.
//!
//! # Usage
//!
//! ```rust,no_run
//! use favicon_resolver::config::Config;
//! use favicon_resolver::services::FaviconService;
//!
//! async fn example() -> favicon_resolver::errors::AppResult<()> {
//!     let service = FaviconService::from_config(&Config::default()).await?;
//!     let resolver = service.resolver();
//!     let outcome = resolver.resolve("https://www.github.com/rust-lang", "Rust").await;
//!     resolver.flush().await;
//!     println!("{:?}", outcome.state().map(|s| s.directive()));
//!     Ok(())
//! }
//! ```

pub mod favicon;
pub mod icon_cache;
pub mod icon_ranker;
pub mod prober;
pub mod providers;
pub mod remote_store;

pub use favicon::{FaviconResolver, FaviconService};
pub use icon_cache::{
    CachedIconMetadata, FileIconStore, IconCache, IconCacheStats, IconStore, MemoryIconStore,
};
pub use icon_ranker::{IconRanker, RankingPolicy};
pub use prober::{HttpImageClient, ImageFetcher, ImageProber, measure_image};
pub use providers::{DuckDuckGoProvider, GoogleFaviconProvider, IconProvider};
pub use remote_store::{CloudinaryStore, RemoteIconStore, UploadReceipt};
