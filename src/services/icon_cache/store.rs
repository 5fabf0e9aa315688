use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::errors::CacheResult;

/// Keyed blob storage with last-writer-wins overwrite semantics
#[async_trait]
pub trait IconStore: Send + Sync {
    /// `Ok(None)` when nothing is stored under `key`
    async fn load(&self, key: &str) -> CacheResult<Option<Bytes>>;

    async fn save(&self, key: &str, blob: Bytes) -> CacheResult<()>;
}

/// Process-local store for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryIconStore {
    entries: RwLock<HashMap<String, Bytes>>,
}

impl MemoryIconStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl IconStore for MemoryIconStore {
    async fn load(&self, key: &str) -> CacheResult<Option<Bytes>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, blob: Bytes) -> CacheResult<()> {
        self.entries.write().await.insert(key.to_string(), blob);
        Ok(())
    }
}
