//! Request DTOs for the asset cache API
//!
//! Defines the query parameters accepted by the asset endpoints.

use std::time::Duration;

use serde::Deserialize;

use crate::cache::{DEFAULT_ASSET_TYPE, MAX_KEY_LENGTH};

/// Query parameters for storing or loading an asset
/// (`PUT /assets/:key`, `GET /assets/:key`)
///
/// # Fields
/// - `type`: Classification tag (defaults to "asset")
/// - `max_age`: Max age in milliseconds (uses the configured default if not specified)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetParams {
    /// Asset type tag
    #[serde(default, rename = "type")]
    pub asset_type: Option<String>,
    /// Optional max age in milliseconds
    #[serde(default)]
    pub max_age: Option<u64>,
}

impl AssetParams {
    /// Validates the request data for `key`
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self, key: &str) -> Option<String> {
        if key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} characters",
                MAX_KEY_LENGTH
            ));
        }
        if matches!(&self.asset_type, Some(t) if t.trim().is_empty()) {
            return Some("Type cannot be empty".to_string());
        }
        None
    }

    pub fn asset_type(&self) -> &str {
        self.asset_type.as_deref().unwrap_or(DEFAULT_ASSET_TYPE)
    }

    pub fn max_age_or(&self, default: Duration) -> Duration {
        self.max_age.map(Duration::from_millis).unwrap_or(default)
    }
}

/// Query parameters for listing assets (`GET /assets`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    /// Only list assets with this type
    #[serde(default, rename = "type")]
    pub asset_type: Option<String>,
}
