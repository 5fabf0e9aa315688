//! Favicon resolution orchestration
//!
//! `FaviconService` owns the shared collaborators and is built once per
//! process. Each display instance gets its own `FaviconResolver`, which walks
//! `Loading -> Resolved | Fallback` for its current input:
//!
//! 1. Cache fast path keyed by the remote store URL for the domain
//! 2. Otherwise rank the three probes
//! 3. Remote store winners are cached locally in the background, large public
//!    provider winners are published back to the remote store
//!
//! Every resolution carries a generation number. A result is only committed if
//! its generation is still current, so a superseded or torn-down resolution
//! never touches the displayed state and schedules no side effects.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::icon_cache::{FileIconStore, IconCache};
use super::icon_ranker::{IconRanker, RankingPolicy};
use super::prober::{HttpImageClient, ImageFetcher};
use super::providers::{DuckDuckGoProvider, GoogleFaviconProvider};
use super::remote_store::{CloudinaryStore, UploadReceipt};
use crate::config::Config;
use crate::errors::{AppResult, PublishError, PublishResult};
use crate::models::{DisplayState, FallbackTile, IconCandidate, IconImage, ResolutionOutcome};
use crate::utils::UrlUtils;

/// Shared collaborators for every display instance
pub struct FaviconService {
    cache: IconCache,
    ranker: IconRanker,
    fetcher: Arc<dyn ImageFetcher>,
}

impl FaviconService {
    pub fn new(cache: IconCache, ranker: IconRanker, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self {
            cache,
            ranker,
            fetcher,
        }
    }

    /// Wire the HTTP prober, Cloudinary, the public providers and the file cache
    pub async fn from_config(config: &Config) -> AppResult<Arc<Self>> {
        let http = HttpImageClient::new(&config.probe)?;
        let remote_store = Arc::new(CloudinaryStore::new(
            config.remote_store.clone(),
            http.client().clone(),
        ));
        let http = Arc::new(http);

        let store = FileIconStore::open(&config.cache.path).await?;
        let ranker = IconRanker::new(
            http.clone(),
            remote_store,
            Arc::new(GoogleFaviconProvider::new(config.providers.google_size)),
            Arc::new(DuckDuckGoProvider),
            RankingPolicy::from(&config.ranking),
        );

        info!(
            "Favicon service ready (cache: {}, cloud: {})",
            config.cache.path.display(),
            config.remote_store.cloud_name
        );
        Ok(Arc::new(Self::new(
            IconCache::new(Arc::new(store)),
            ranker,
            http,
        )))
    }

    pub fn cache(&self) -> &IconCache {
        &self.cache
    }

    pub fn ranker(&self) -> &IconRanker {
        &self.ranker
    }

    /// A fresh per-display controller sharing this service
    pub fn resolver(self: &Arc<Self>) -> FaviconResolver {
        FaviconResolver::new(Arc::clone(self))
    }

    /// Publish the high resolution provider icon for a newly added bookmark
    pub async fn seed_remote(&self, bookmark_url: &str) -> PublishResult<UploadReceipt> {
        let domain = UrlUtils::get_domain(bookmark_url);
        if domain.is_empty() {
            return Err(PublishError::MissingInput {
                domain,
                source_url: UrlUtils::obfuscate_credentials(bookmark_url),
            });
        }

        let source_url = self.ranker.primary().icon_url(&domain);
        self.ranker.remote_store().publish(&domain, &source_url).await
    }
}

impl std::fmt::Debug for FaviconService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaviconService")
            .field("cache", &self.cache)
            .field("ranker", &self.ranker)
            .finish_non_exhaustive()
    }
}

/// Resolution controller for one display instance
pub struct FaviconResolver {
    service: Arc<FaviconService>,
    generation: AtomicU64,
    state: RwLock<DisplayState>,
    background: Mutex<JoinSet<()>>,
}

impl FaviconResolver {
    pub fn new(service: Arc<FaviconService>) -> Self {
        Self {
            service,
            generation: AtomicU64::new(0),
            state: RwLock::new(DisplayState::Loading),
            background: Mutex::new(JoinSet::new()),
        }
    }

    pub async fn state(&self) -> DisplayState {
        self.state.read().await.clone()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Resolve `url` for display, superseding any resolution still in flight
    pub async fn resolve(&self, url: &str, title: &str) -> ResolutionOutcome {
        let generation = self.begin().await;
        let domain = UrlUtils::get_domain(url);
        let remote_url =
            (!domain.is_empty()).then(|| self.service.ranker.remote_store().fetch_url(&domain));

        if let Some(key) = &remote_url
            && let Some(bytes) = self.service.cache.get(key).await
        {
            debug!("Cache hit for {}", domain);
            let image = IconImage::Cached {
                key: key.clone(),
                bytes,
            };
            return self.commit(generation, DisplayState::Resolved(image)).await;
        }

        match self.service.ranker.find_best_icon(url).await {
            Some(winner) => {
                let outcome = self
                    .commit(generation, DisplayState::Resolved(IconImage::Remote(winner.clone())))
                    .await;
                if let (ResolutionOutcome::Applied(_), Some(key)) = (&outcome, remote_url) {
                    self.schedule_side_effects(domain, key, winner).await;
                }
                outcome
            }
            None => {
                let tile = FallbackTile::for_input(&domain, title);
                self.commit(generation, DisplayState::Fallback(tile)).await
            }
        }
    }

    /// Discard whatever is in flight; later completions become `Superseded`
    pub async fn teardown(&self) {
        let _state = self.state.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Wait for every pending background side effect
    pub async fn flush(&self) {
        let mut pending = std::mem::take(&mut *self.background.lock().await);
        while let Some(result) = pending.join_next().await {
            if let Err(e) = result
                && e.is_panic()
            {
                warn!("Background icon task panicked: {}", e);
            }
        }
    }

    /// Abort every pending background side effect
    pub async fn abandon(&self) {
        let mut pending = std::mem::take(&mut *self.background.lock().await);
        pending.shutdown().await;
    }

    pub async fn pending_tasks(&self) -> usize {
        self.background.lock().await.len()
    }

    async fn begin(&self) -> u64 {
        let mut state = self.state.write().await;
        *state = DisplayState::Loading;
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn commit(&self, generation: u64, next: DisplayState) -> ResolutionOutcome {
        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding superseded resolution (generation {})", generation);
            return ResolutionOutcome::Superseded;
        }
        *state = next.clone();
        ResolutionOutcome::Applied(next)
    }

    async fn schedule_side_effects(&self, domain: String, remote_url: String, winner: IconCandidate) {
        if winner.source.is_remote_store() {
            let cache = self.service.cache.clone();
            let fetcher = Arc::clone(&self.service.fetcher);
            self.spawn_background(async move {
                match fetcher.fetch(&winner.url).await {
                    Ok(bytes) => cache.set(&remote_url, bytes).await,
                    Err(e) => debug!("Skipping cache population for {}: {}", domain, e),
                }
            })
            .await;
        } else if self.service.ranker.policy().should_publish(&winner) {
            let remote_store = Arc::clone(self.service.ranker.remote_store());
            self.spawn_background(async move {
                match remote_store.publish(&domain, &winner.url).await {
                    Ok(receipt) => debug!(
                        "Published {} icon for {}: {}",
                        winner.source, domain, receipt.public_id
                    ),
                    Err(e) => warn!("Publishing icon for {} failed: {}", domain, e),
                }
            })
            .await;
        }
    }

    async fn spawn_background<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut background = self.background.lock().await;
        while background.try_join_next().is_some() {}
        background.spawn(task);
    }
}

impl Drop for FaviconResolver {
    fn drop(&mut self) {
        // Outstanding cache writes and uploads still complete after the display goes away
        self.background.get_mut().detach_all();
    }
}

impl std::fmt::Debug for FaviconResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaviconResolver")
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}
