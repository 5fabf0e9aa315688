//! Candidate ranking
//!
//! Three probes run concurrently for every lookup and are joined, never raced:
//! the remote store's delivery URL and two public providers. Survivors are
//! ordered by width with the remote store winning ties.

use std::sync::Arc;
use tracing::{debug, info};

use super::prober::ImageProber;
use super::providers::IconProvider;
use super::remote_store::RemoteIconStore;
use crate::config::RankingConfig;
use crate::models::{IconCandidate, IconSource};
use crate::utils::UrlUtils;

/// Width thresholds applied to probed candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingPolicy {
    /// Candidates at or below this width are generic placeholders
    pub placeholder_max_width: u32,
    /// Provider winners at or above this width are published back
    pub publish_min_width: u32,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self::from(&RankingConfig::default())
    }
}

impl From<&RankingConfig> for RankingPolicy {
    fn from(config: &RankingConfig) -> Self {
        Self {
            placeholder_max_width: config.placeholder_max_width,
            publish_min_width: config.publish_min_width,
        }
    }
}

impl RankingPolicy {
    /// Pick the top candidate from probe outcomes given in probe order
    pub fn select_best<I>(&self, outcomes: I) -> Option<IconCandidate>
    where
        I: IntoIterator<Item = Option<IconCandidate>>,
    {
        let mut survivors: Vec<IconCandidate> = outcomes
            .into_iter()
            .flatten()
            .filter(|c| c.width > self.placeholder_max_width)
            .collect();

        // Stable sort keeps input order between equally ranked providers
        survivors.sort_by(|a, b| {
            b.width
                .cmp(&a.width)
                .then_with(|| b.source.is_remote_store().cmp(&a.source.is_remote_store()))
        });

        survivors.into_iter().next()
    }

    pub fn should_publish(&self, winner: &IconCandidate) -> bool {
        !winner.source.is_remote_store() && winner.width >= self.publish_min_width
    }
}

pub struct IconRanker {
    prober: Arc<dyn ImageProber>,
    remote_store: Arc<dyn RemoteIconStore>,
    primary: Arc<dyn IconProvider>,
    secondary: Arc<dyn IconProvider>,
    policy: RankingPolicy,
}

impl IconRanker {
    pub fn new(
        prober: Arc<dyn ImageProber>,
        remote_store: Arc<dyn RemoteIconStore>,
        primary: Arc<dyn IconProvider>,
        secondary: Arc<dyn IconProvider>,
        policy: RankingPolicy,
    ) -> Self {
        Self {
            prober,
            remote_store,
            primary,
            secondary,
            policy,
        }
    }

    pub fn remote_store(&self) -> &Arc<dyn RemoteIconStore> {
        &self.remote_store
    }

    /// The high resolution public provider
    pub fn primary(&self) -> &Arc<dyn IconProvider> {
        &self.primary
    }

    pub fn policy(&self) -> RankingPolicy {
        self.policy
    }

    /// Probe every source for `page_url`'s domain and return the best icon
    pub async fn find_best_icon(&self, page_url: &str) -> Option<IconCandidate> {
        let domain = UrlUtils::get_domain(page_url);
        if domain.is_empty() {
            debug!("No domain for {}, skipping probes", UrlUtils::obfuscate_credentials(page_url));
            return None;
        }

        let remote_url = self.remote_store.fetch_url(&domain);
        let primary_url = self.primary.icon_url(&domain);
        let secondary_url = self.secondary.icon_url(&domain);

        let (remote, primary, secondary) = tokio::join!(
            self.prober.probe(&remote_url, IconSource::RemoteStore),
            self.prober.probe(&primary_url, self.primary.source()),
            self.prober.probe(&secondary_url, self.secondary.source()),
        );

        let best = self.policy.select_best([remote, primary, secondary]);
        match &best {
            Some(c) => info!("Best icon for {}: {} {}x{}", domain, c.source, c.width, c.height),
            None => debug!("No usable icon for {}", domain),
        }
        best
    }
}

impl std::fmt::Debug for IconRanker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IconRanker")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
