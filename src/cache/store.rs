//! Asset Cache Module
//!
//! Best-effort TTL cache over the durable asset database. Storage failures
//! never reach callers of the plain methods: they are logged and collapsed
//! into a miss (`None`, `false`, `0` or empty stats). The `try_*` variants
//! expose the underlying [`CacheError`] for callers that want it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::cache::{
    AssetDb, AssetInfo, CacheEntry, CacheStats, Clock, StorageLocation, SystemClock,
    DEFAULT_ASSET_TYPE, DEFAULT_MAX_AGE, MAX_ASSET_SIZE, MAX_KEY_LENGTH,
};
use crate::error::{CacheError, Result};

// == Asset Cache ==
/// Durable key/value cache for binary assets.
///
/// The database is opened lazily on first use. Concurrent first callers
/// share one open attempt; a failed open is retried on the next call.
#[derive(Debug)]
pub struct AssetCache {
    location: StorageLocation,
    db: OnceCell<AssetDb>,
    clock: Arc<dyn Clock>,
}

impl AssetCache {
    // == Constructors ==
    /// Creates a cache backed by `location`, stamped with wall-clock time.
    pub fn new(location: StorageLocation) -> Self {
        Self::with_clock(location, Arc::new(SystemClock))
    }

    /// Creates a cache with an explicit time source.
    pub fn with_clock(location: StorageLocation, clock: Arc<dyn Clock>) -> Self {
        Self {
            location,
            db: OnceCell::new(),
            clock,
        }
    }

    /// Creates a non-durable cache, mostly for tests.
    pub fn in_memory() -> Self {
        Self::new(StorageLocation::Memory)
    }

    // == Initialize ==
    /// Opens the database if it is not open yet. Idempotent.
    pub async fn initialize(&self) -> Result<()> {
        self.db().await.map(|_| ())
    }

    pub fn is_initialized(&self) -> bool {
        self.db.initialized()
    }

    async fn db(&self) -> Result<&AssetDb> {
        self.db
            .get_or_try_init(|| AssetDb::open(&self.location))
            .await
    }

    // == Store ==
    /// Stores `data` under `key`, replacing any previous entry.
    ///
    /// Returns `false` if the write could not be performed.
    pub async fn store(&self, key: &str, data: Vec<u8>, asset_type: &str, max_age: Duration) -> bool {
        match self.try_store(key, data, asset_type, max_age).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "failed to cache asset");
                false
            }
        }
    }

    /// Stores with the default type and a seven day max age.
    pub async fn store_default(&self, key: &str, data: Vec<u8>) -> bool {
        self.store(key, data, DEFAULT_ASSET_TYPE, DEFAULT_MAX_AGE).await
    }

    pub async fn try_store(
        &self,
        key: &str,
        data: Vec<u8>,
        asset_type: &str,
        max_age: Duration,
    ) -> Result<()> {
        validate_key(key)?;
        if data.len() > MAX_ASSET_SIZE {
            return Err(CacheError::InvalidRequest(format!(
                "Asset exceeds maximum size of {} bytes",
                MAX_ASSET_SIZE
            )));
        }

        let db = self.db().await?;
        let entry = CacheEntry::new(key, data, asset_type, max_age, self.clock.now_ms());
        db.put(entry).await
    }

    // == Get ==
    /// Returns the payload for `key` if present and live.
    ///
    /// An expired entry is deleted before reporting the miss.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        match self.try_get(key).await {
            Ok(data) => data,
            Err(e) => {
                warn!(key, error = %e, "failed to read cached asset");
                None
            }
        }
    }

    pub async fn try_get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let db = self.db().await?;
        let Some(entry) = db.fetch(key).await? else {
            return Ok(None);
        };

        if entry.is_expired_at(self.clock.now_ms()) {
            // Eviction failure does not change the answer
            if let Err(e) = db.remove_version(key, entry.timestamp).await {
                warn!(key, error = %e, "failed to evict expired asset");
            } else {
                debug!(key, "evicted expired asset on read");
            }
            return Ok(None);
        }

        Ok(Some(entry.data))
    }

    // == Delete ==
    /// Removes `key`. Succeeds whether or not it was present.
    pub async fn delete(&self, key: &str) -> bool {
        match self.try_delete(key).await {
            Ok(_) => true,
            Err(e) => {
                warn!(key, error = %e, "failed to delete cached asset");
                false
            }
        }
    }

    /// Returns whether an entry was removed.
    pub async fn try_delete(&self, key: &str) -> Result<bool> {
        self.db().await?.remove(key).await
    }

    // == Clear ==
    /// Removes every entry.
    pub async fn clear(&self) -> bool {
        match self.try_clear().await {
            Ok(removed) => {
                debug!(removed, "asset cache cleared");
                true
            }
            Err(e) => {
                warn!(error = %e, "failed to clear asset cache");
                false
            }
        }
    }

    pub async fn try_clear(&self) -> Result<usize> {
        self.db().await?.remove_all().await
    }

    // == Stats ==
    /// Count, total size and per-type count of stored assets.
    pub async fn cache_stats(&self) -> CacheStats {
        self.try_cache_stats().await.unwrap_or_else(|e| {
            warn!(error = %e, "failed to collect asset cache stats");
            CacheStats::default()
        })
    }

    pub async fn try_cache_stats(&self) -> Result<CacheStats> {
        self.db().await?.stats().await
    }

    // == Cleanup Expired ==
    /// Deletes every entry expired right now and returns how many.
    pub async fn cleanup_expired_assets(&self) -> usize {
        self.try_cleanup_expired_assets().await.unwrap_or_else(|e| {
            warn!(error = %e, "failed to clean up expired assets");
            0
        })
    }

    pub async fn try_cleanup_expired_assets(&self) -> Result<usize> {
        let db = self.db().await?;
        db.remove_expired(self.clock.now_ms()).await
    }

    // == List ==
    /// Metadata of stored assets, optionally of a single type.
    pub async fn list(&self, asset_type: Option<&str>) -> Vec<AssetInfo> {
        self.try_list(asset_type).await.unwrap_or_else(|e| {
            warn!(error = %e, "failed to list cached assets");
            Vec::new()
        })
    }

    pub async fn try_list(&self, asset_type: Option<&str>) -> Result<Vec<AssetInfo>> {
        let db = self.db().await?;
        db.list(asset_type.map(str::to_string), self.clock.now_ms())
            .await
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidRequest("Key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidRequest(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}
