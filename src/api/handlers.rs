//! API Handlers
//!
//! HTTP request handlers for each asset cache endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::cache::{AssetCache, CacheStats, DEFAULT_MAX_AGE};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::loader::{AssetLoader, CacheStatus};
use crate::models::{
    AssetParams, CleanupResponse, ClearResponse, DeleteResponse, HealthResponse, ListParams,
    ListResponse, StoreResponse,
};

/// Header reporting whether an asset came from the cache.
pub const CACHE_STATUS_HEADER: &str = "x-cache";

/// Application state shared across all handlers.
///
/// The cache needs no lock: its storage engine serializes access.
#[derive(Clone)]
pub struct AppState {
    /// Shared asset cache
    pub cache: Arc<AssetCache>,
    /// Origin loader used on misses, if an origin is configured
    pub loader: Option<AssetLoader>,
    /// Max age applied when a request does not carry one
    pub default_max_age: Duration,
}

impl AppState {
    /// Creates a new AppState serving only what is already cached.
    pub fn new(cache: Arc<AssetCache>) -> Self {
        Self {
            cache,
            loader: None,
            default_max_age: DEFAULT_MAX_AGE,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds the origin loader when `origin_url` is set.
    pub fn from_config(cache: Arc<AssetCache>, config: &Config) -> Result<Self> {
        let loader = config
            .origin_url
            .as_ref()
            .map(|origin| {
                AssetLoader::new(
                    cache.clone(),
                    origin.as_str(),
                    Duration::from_secs(config.origin_timeout),
                )
            })
            .transpose()?;

        Ok(Self {
            cache,
            loader,
            default_max_age: config.default_max_age(),
        })
    }

    pub fn with_loader(mut self, loader: AssetLoader) -> Self {
        self.loader = Some(loader);
        self
    }
}

/// Handler for GET /assets/:key
///
/// Serves the asset bytes, going to the origin on a miss when one is configured.
pub async fn get_asset_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<AssetParams>,
) -> Result<Response> {
    if let Some(error_msg) = params.validate(&key) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let (data, status) = match &state.loader {
        Some(loader) => {
            let max_age = params.max_age_or(state.default_max_age);
            let asset = loader.load(&key, params.asset_type(), max_age).await?;
            (asset.data, asset.status)
        }
        None => {
            let data = state
                .cache
                .get(&key)
                .await
                .ok_or_else(|| CacheError::NotFound(key.clone()))?;
            (data, CacheStatus::Hit)
        }
    };

    debug!(key = %key, cache = status.as_str(), "serving asset");
    let mut response = data.into_response();
    response.headers_mut().insert(
        CACHE_STATUS_HEADER,
        HeaderValue::from_static(status.as_str()),
    );
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    Ok(response)
}

/// Handler for PUT /assets/:key
///
/// Stores the raw request body under `key`.
pub async fn put_asset_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<AssetParams>,
    body: Bytes,
) -> Result<Json<StoreResponse>> {
    if let Some(error_msg) = params.validate(&key) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let max_age = params.max_age_or(state.default_max_age);
    state
        .cache
        .try_store(&key, body.to_vec(), params.asset_type(), max_age)
        .await?;

    Ok(Json(StoreResponse::new(key)))
}

/// Handler for DELETE /assets/:key
pub async fn delete_asset_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let existed = state.cache.try_delete(&key).await?;
    Ok(Json(DeleteResponse::new(key, existed)))
}

/// Handler for GET /assets
///
/// Lists asset metadata, optionally filtered by `type`.
pub async fn list_assets_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>> {
    let assets = state.cache.try_list(params.asset_type.as_deref()).await?;
    Ok(Json(ListResponse { assets }))
}

/// Handler for DELETE /assets
pub async fn clear_handler(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    let cleared = state.cache.try_clear().await?;
    Ok(Json(ClearResponse { cleared }))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<CacheStats>> {
    Ok(Json(state.cache.try_cache_stats().await?))
}

/// Handler for POST /cleanup
///
/// Sweeps expired assets immediately.
pub async fn cleanup_handler(State(state): State<AppState>) -> Result<Json<CleanupResponse>> {
    let cleaned = state.cache.try_cleanup_expired_assets().await?;
    Ok(Json(CleanupResponse { cleaned }))
}

/// Handler for GET /health
///
/// Reports whether the asset database can be opened.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let storage = state.cache.initialize().await.is_ok();
    Json(HealthResponse::from_storage(storage))
}
