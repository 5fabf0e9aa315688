use bytes::Bytes;
use std::sync::Arc;
use tracing::{trace, warn};

use super::store::{IconStore, MemoryIconStore};
use crate::utils::UrlUtils;

/// Failure-tolerant front of an `IconStore`
///
/// Reads that fail behave as misses and writes that fail are logged and
/// dropped. Callers never see a cache error.
#[derive(Clone)]
pub struct IconCache {
    store: Arc<dyn IconStore>,
}

impl IconCache {
    pub fn new(store: Arc<dyn IconStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryIconStore::new()))
    }

    pub async fn get(&self, key: &str) -> Option<Bytes> {
        match self.store.load(key).await {
            Ok(Some(blob)) => {
                trace!("Icon cache hit for {}", UrlUtils::obfuscate_credentials(key));
                Some(blob)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(
                    "Icon cache read failed for {}: {}",
                    UrlUtils::obfuscate_credentials(key),
                    e
                );
                None
            }
        }
    }

    pub async fn set(&self, key: &str, blob: Bytes) {
        if let Err(e) = self.store.save(key, blob).await {
            warn!(
                "Icon cache write failed for {}: {}",
                UrlUtils::obfuscate_credentials(key),
                e
            );
        }
    }
}

impl std::fmt::Debug for IconCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IconCache").finish_non_exhaustive()
    }
}
