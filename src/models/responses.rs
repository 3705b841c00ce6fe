//! Response DTOs for the asset cache API
//!
//! Defines the structure of outgoing JSON response bodies.

use serde::Serialize;

use crate::cache::AssetInfo;

/// Response body for `PUT /assets/:key`
#[derive(Debug, Clone, Serialize)]
pub struct StoreResponse {
    /// The key that was stored
    pub key: String,
    pub stored: bool,
}

impl StoreResponse {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            stored: true,
        }
    }
}

/// Response body for `DELETE /assets/:key`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// The key that was deleted
    pub key: String,
    /// Whether an entry existed
    pub existed: bool,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>, existed: bool) -> Self {
        Self {
            key: key.into(),
            existed,
        }
    }
}

/// Response body for `DELETE /assets`
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Number of assets removed
    pub cleared: usize,
}

/// Response body for `POST /cleanup`
#[derive(Debug, Clone, Serialize)]
pub struct CleanupResponse {
    /// Number of expired assets removed
    pub cleaned: usize,
}

/// Response body for `GET /assets`
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    pub assets: Vec<AssetInfo>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status ("healthy" or "degraded")
    pub status: String,
    /// Whether the asset database is open
    pub storage: bool,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Reports health given whether storage could be opened.
    ///
    /// A cache without storage still serves through the origin, so it is
    /// degraded rather than down.
    pub fn from_storage(storage: bool) -> Self {
        Self {
            status: if storage { "healthy" } else { "degraded" }.to_string(),
            storage,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
