//! Filesystem-backed icon store
//!
//! Layout under the cache directory, per key:
//!
//! - `{sha256(key)}.bin` holds the raw icon bytes
//! - `{sha256(key)}.json` holds `CachedIconMetadata`
//!
//! Writes land in a uniquely named temp file and are renamed into place, so
//! concurrent writers of one key resolve last-writer-wins and readers never
//! observe a partially written blob.

use async_trait::async_trait;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tracing::{debug, trace};

use super::metadata::CachedIconMetadata;
use super::store::IconStore;
use crate::errors::{CacheError, CacheResult};
use crate::utils::UrlUtils;

const BLOB_EXTENSION: &str = "bin";
const METADATA_EXTENSION: &str = "json";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Aggregate size of the on-disk cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IconCacheStats {
    pub entries: usize,
    pub total_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct FileIconStore {
    root: PathBuf,
}

impl FileIconStore {
    /// Open (creating if needed) a store rooted at `root`
    pub async fn open(root: impl Into<PathBuf>) -> CacheResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| CacheError::Unavailable {
                message: format!("cannot create {}: {e}", root.display()),
            })?;
        debug!("Icon cache opened at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stable file stem for a key
    pub fn cache_id(key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn path_for(&self, cache_id: &str, extension: &str) -> PathBuf {
        self.root.join(format!("{cache_id}.{extension}"))
    }

    async fn write_atomically(&self, key: &str, target: &Path, contents: &[u8]) -> CacheResult<()> {
        let temp = target.with_extension(format!(
            "{}.{}.tmp",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        if let Err(e) = fs::write(&temp, contents).await {
            let _ = fs::remove_file(&temp).await;
            return Err(CacheError::io(key, e));
        }
        if let Err(e) = fs::rename(&temp, target).await {
            let _ = fs::remove_file(&temp).await;
            return Err(CacheError::io(key, e));
        }
        Ok(())
    }

    /// Count and size of stored blobs
    pub async fn stats(&self) -> CacheResult<IconCacheStats> {
        let mut stats = IconCacheStats::default();
        let mut dir = fs::read_dir(&self.root)
            .await
            .map_err(|e| CacheError::io(self.root.display().to_string(), e))?;

        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| CacheError::io(self.root.display().to_string(), e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(BLOB_EXTENSION) {
                continue;
            }
            match entry.metadata().await {
                Ok(metadata) => {
                    stats.entries += 1;
                    stats.total_bytes += metadata.len();
                }
                Err(e) => debug!("Failed to stat {}: {}", path.display(), e),
            }
        }

        Ok(stats)
    }

    /// Sidecar metadata of every entry; unreadable sidecars are skipped
    pub async fn entries(&self) -> CacheResult<Vec<CachedIconMetadata>> {
        let mut entries = Vec::new();
        let mut dir = fs::read_dir(&self.root)
            .await
            .map_err(|e| CacheError::io(self.root.display().to_string(), e))?;

        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| CacheError::io(self.root.display().to_string(), e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(METADATA_EXTENSION) {
                continue;
            }
            let parsed = fs::read(&path)
                .await
                .map_err(|e| e.to_string())
                .and_then(|raw| {
                    serde_json::from_slice::<CachedIconMetadata>(&raw).map_err(|e| e.to_string())
                });
            match parsed {
                Ok(metadata) => entries.push(metadata),
                Err(e) => debug!("Skipping unreadable icon metadata {}: {}", path.display(), e),
            }
        }

        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }
}

#[async_trait]
impl IconStore for FileIconStore {
    async fn load(&self, key: &str) -> CacheResult<Option<Bytes>> {
        let path = self.path_for(&Self::cache_id(key), BLOB_EXTENSION);
        match fs::read(&path).await {
            Ok(bytes) => {
                trace!("Icon cache file hit: {}", path.display());
                Ok(Some(Bytes::from(bytes)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::io(key, e)),
        }
    }

    async fn save(&self, key: &str, blob: Bytes) -> CacheResult<()> {
        let cache_id = Self::cache_id(key);
        let metadata = CachedIconMetadata::describe(key, &blob);
        let metadata_json = serde_json::to_vec_pretty(&metadata).map_err(|e| CacheError::Metadata {
            key: UrlUtils::obfuscate_credentials(key),
            source: e,
        })?;

        self.write_atomically(key, &self.path_for(&cache_id, BLOB_EXTENSION), &blob)
            .await?;
        self.write_atomically(key, &self.path_for(&cache_id, METADATA_EXTENSION), &metadata_json)
            .await?;

        debug!("Cached {} bytes for {} as {}", blob.len(), key, cache_id);
        Ok(())
    }
}
