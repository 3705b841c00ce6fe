//! Cache Statistics Module
//!
//! Aggregates the stored assets by count, size and type.

use std::collections::BTreeMap;

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of what the cache currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Number of stored assets
    pub total_assets: u64,
    /// Sum of payload sizes in bytes
    pub total_size: u64,
    /// Asset count per type tag
    pub by_type: BTreeMap<String, u64>,
}

impl CacheStats {
    // == Constructor ==
    /// Creates empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Type ==
    /// Folds one type group into the totals.
    pub fn record_type(&mut self, asset_type: impl Into<String>, count: u64, size: u64) {
        self.total_assets += count;
        self.total_size += size;
        *self.by_type.entry(asset_type.into()).or_insert(0) += count;
    }

    /// Number of assets carrying `asset_type`.
    pub fn count_of(&self, asset_type: &str) -> u64 {
        self.by_type.get(asset_type).copied().unwrap_or(0)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.total_assets, 0);
        assert_eq!(stats.total_size, 0);
        assert!(stats.by_type.is_empty());
    }

    #[test]
    fn test_record_type() {
        let mut stats = CacheStats::new();
        stats.record_type("logo", 1, 5120);
        stats.record_type("image", 3, 300);

        assert_eq!(stats.total_assets, 4);
        assert_eq!(stats.total_size, 5420);
        assert_eq!(stats.count_of("logo"), 1);
        assert_eq!(stats.count_of("image"), 3);
        assert_eq!(stats.count_of("asset"), 0);
    }

    #[test]
    fn test_serialized_shape() {
        let mut stats = CacheStats::new();
        stats.record_type("logo", 1, 5120);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "totalAssets": 1,
                "totalSize": 5120,
                "byType": { "logo": 1 }
            })
        );
    }
}
