//! Asset Loader
//!
//! Cache-aside loading: serve from the cache when possible, otherwise fetch
//! from the origin and populate the cache in the background.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{StatusCode, Url};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{AssetCache, LOGO_ASSET_TYPE, LOGO_MAX_AGE};
use crate::error::{CacheError, Result};

/// Where a loaded asset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

/// An asset returned by [`AssetLoader::load`].
#[derive(Debug)]
pub struct LoadedAsset {
    pub data: Vec<u8>,
    pub status: CacheStatus,
    /// Background write populating the cache after a miss
    pub store_task: Option<JoinHandle<bool>>,
}

// == Asset Loader ==
/// Loads assets through the cache from an HTTP origin.
#[derive(Debug, Clone)]
pub struct AssetLoader {
    cache: Arc<AssetCache>,
    client: reqwest::Client,
    origin: Url,
}

impl AssetLoader {
    /// Creates a loader fetching misses from `origin` with the given timeout.
    pub fn new(cache: Arc<AssetCache>, origin: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CacheError::Internal(format!("failed to build HTTP client: {}", e)))?;
        Self::with_client(cache, origin, client)
    }

    /// Fails when `origin` is not an absolute URL that can carry a path.
    pub fn with_client(
        cache: Arc<AssetCache>,
        origin: impl AsRef<str>,
        client: reqwest::Client,
    ) -> Result<Self> {
        let origin = origin.as_ref();
        let parsed = Url::parse(origin)
            .map_err(|e| CacheError::Internal(format!("invalid origin URL {}: {}", origin, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(CacheError::Internal(format!(
                "origin URL {} cannot carry a path",
                origin
            )));
        }

        Ok(Self {
            cache,
            client,
            origin: parsed,
        })
    }

    /// URL an asset is fetched from on a miss.
    ///
    /// The key is appended as a single percent-encoded path segment, so
    /// `/`, `?` and `#` inside a key never reach another origin resource.
    pub fn origin_url(&self, key: &str) -> Result<Url> {
        if matches!(key, "." | "..") {
            return Err(CacheError::InvalidRequest(format!(
                "key '{}' cannot be fetched from the origin",
                key
            )));
        }

        let mut url = self.origin.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| {
                CacheError::Internal(format!("origin URL {} cannot carry a path", self.origin))
            })?
            .pop_if_empty()
            .push(key);
        Ok(url)
    }

    // == Load ==
    /// Returns the cached asset, or fetches it from the origin.
    ///
    /// On a miss the fetched payload is returned immediately; writing it to
    /// the cache happens on a spawned task.
    pub async fn load(&self, key: &str, asset_type: &str, max_age: Duration) -> Result<LoadedAsset> {
        if let Some(data) = self.cache.get(key).await {
            debug!(key, "asset served from cache");
            return Ok(LoadedAsset {
                data,
                status: CacheStatus::Hit,
                store_task: None,
            });
        }

        let data = self.fetch_origin(key).await?;
        info!(key, size = data.len(), "asset fetched from origin");

        let cache = self.cache.clone();
        let key = key.to_string();
        let asset_type = asset_type.to_string();
        let payload = data.clone();
        let store_task = tokio::spawn(async move {
            cache.store(&key, payload, &asset_type, max_age).await
        });

        Ok(LoadedAsset {
            data,
            status: CacheStatus::Miss,
            store_task: Some(store_task),
        })
    }

    /// Loads a logo, cached for thirty days.
    pub async fn load_logo(&self, key: &str) -> Result<LoadedAsset> {
        self.load(key, LOGO_ASSET_TYPE, LOGO_MAX_AGE).await
    }

    async fn fetch_origin(&self, key: &str) -> Result<Vec<u8>> {
        let url = self.origin_url(key)?;
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(response.bytes().await?.to_vec())
        } else if status == StatusCode::NOT_FOUND {
            Err(CacheError::NotFound(key.to_string()))
        } else {
            warn!(key, %status, "origin rejected asset request");
            Err(CacheError::Origin(format!("{} returned {}", url, status)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader(origin: &str) -> AssetLoader {
        AssetLoader::new(
            Arc::new(AssetCache::in_memory()),
            origin,
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[test]
    fn test_origin_url_joins_cleanly() {
        assert_eq!(
            loader("http://cdn.local/assets/")
                .origin_url("elra-logo-v2")
                .unwrap()
                .as_str(),
            "http://cdn.local/assets/elra-logo-v2"
        );
        assert_eq!(
            loader("http://cdn.local/assets")
                .origin_url("elra-logo-v2")
                .unwrap()
                .as_str(),
            "http://cdn.local/assets/elra-logo-v2"
        );
        assert_eq!(
            loader("http://cdn.local").origin_url("elra-logo-v2").unwrap().as_str(),
            "http://cdn.local/elra-logo-v2"
        );
    }

    #[test]
    fn test_origin_url_keeps_key_in_one_segment() {
        let loader = loader("http://cdn.local/assets/");

        let url = loader.origin_url("elra-logo-v2?evil#frag").unwrap();
        assert_eq!(url.as_str(), "http://cdn.local/assets/elra-logo-v2%3Fevil%23frag");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);

        let url = loader.origin_url("x/../elra-logo-v2").unwrap();
        assert_eq!(url.path(), "/assets/x%2F..%2Felra-logo-v2");
    }

    #[test]
    fn test_origin_url_rejects_dot_segments() {
        let loader = loader("http://cdn.local/assets/");
        assert!(matches!(loader.origin_url(".."), Err(CacheError::InvalidRequest(_))));
        assert!(matches!(loader.origin_url("."), Err(CacheError::InvalidRequest(_))));
    }

    #[test]
    fn test_invalid_origin_is_rejected() {
        let cache = Arc::new(AssetCache::in_memory());
        assert!(AssetLoader::new(cache.clone(), "cdn.local/assets", Duration::from_secs(1)).is_err());
        assert!(AssetLoader::new(cache, "mailto:ops@cdn.local", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_cache_status_header_values() {
        assert_eq!(CacheStatus::Hit.as_str(), "HIT");
        assert_eq!(CacheStatus::Miss.as_str(), "MISS");
    }

    #[tokio::test]
    async fn test_hit_skips_origin() {
        // Nothing listens on this port, so any origin request would fail
        let cache = Arc::new(AssetCache::in_memory());
        let loader = AssetLoader::new(cache.clone(), "http://127.0.0.1:9", Duration::from_secs(1))
            .unwrap();
        cache
            .store("cached", b"local".to_vec(), "image", LOGO_MAX_AGE)
            .await;

        let asset = loader.load("cached", "image", LOGO_MAX_AGE).await.unwrap();
        assert_eq!(asset.status, CacheStatus::Hit);
        assert_eq!(asset.data, b"local");
        assert!(asset.store_task.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_origin_is_origin_error() {
        let loader = loader("http://127.0.0.1:9");
        let result = loader.load("missing", "image", LOGO_MAX_AGE).await;
        assert!(matches!(result, Err(CacheError::Origin(_))));
    }
}
