//! Error types for the asset cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tokio_rusqlite::rusqlite;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the asset cache and its HTTP surface.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The durable storage could not be opened or migrated
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A single storage transaction failed
    #[error("Transaction failed: {0}")]
    TransactionFailure(String),

    /// Asset not found in cache or at the origin
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The origin could not serve the asset
    #[error("Origin fetch failed: {0}")]
    Origin(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for CacheError {
    fn from(err: rusqlite::Error) -> Self {
        CacheError::TransactionFailure(err.to_string())
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for CacheError {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        CacheError::TransactionFailure(err.to_string())
    }
}

impl From<reqwest::Error> for CacheError {
    fn from(err: reqwest::Error) -> Self {
        CacheError::Origin(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::StorageUnavailable(_) | CacheError::TransactionFailure(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            CacheError::Origin(_) => StatusCode::BAD_GATEWAY,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the asset cache.
pub type Result<T> = std::result::Result<T, CacheError>;
