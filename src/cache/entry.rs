//! Cache Entry Module
//!
//! Defines the structure for individual cached assets with TTL support.

use std::time::Duration;

use serde::Serialize;

// == Cache Entry ==
/// A single cached asset with its payload and metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Unique key of the asset
    pub key: String,
    /// The stored payload
    pub data: Vec<u8>,
    /// Classification tag, e.g. "logo"
    pub asset_type: String,
    /// Creation timestamp (Unix milliseconds)
    pub timestamp: u64,
    /// Staleness threshold in milliseconds
    pub max_age: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped at `now`.
    ///
    /// # Arguments
    /// * `key` - Asset key
    /// * `data` - Asset payload
    /// * `asset_type` - Classification tag
    /// * `max_age` - How long the entry stays live
    /// * `now` - Current Unix time in milliseconds
    pub fn new(
        key: impl Into<String>,
        data: Vec<u8>,
        asset_type: impl Into<String>,
        max_age: Duration,
        now: u64,
    ) -> Self {
        Self {
            key: key.into(),
            data,
            asset_type: asset_type.into(),
            timestamp: now,
            max_age: duration_to_ms(max_age),
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is expired at `now`.
    pub fn is_expired_at(&self, now: u64) -> bool {
        is_expired(self.timestamp, self.max_age, now)
    }
}

// == Asset Info ==
/// Metadata of a stored asset, without its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInfo {
    pub key: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub size: u64,
    pub timestamp: u64,
    pub max_age: u64,
    pub expired: bool,
    /// Remaining lifetime in milliseconds, zero once expired
    pub ttl_remaining: u64,
}

impl AssetInfo {
    /// Metadata of an entry stored at `timestamp`, as seen at `now`.
    pub fn new(
        key: String,
        asset_type: String,
        size: u64,
        timestamp: u64,
        max_age: u64,
        now: u64,
    ) -> Self {
        Self {
            key,
            asset_type,
            size,
            timestamp,
            max_age,
            expired: is_expired(timestamp, max_age, now),
            ttl_remaining: ttl_remaining_ms(timestamp, max_age, now),
        }
    }
}

// == Utility Functions ==
/// An entry is live while `now - timestamp <= max_age`. A zero max age is
/// never live.
pub fn is_expired(timestamp: u64, max_age: u64, now: u64) -> bool {
    max_age == 0 || now.saturating_sub(timestamp) > max_age
}

/// Remaining lifetime in milliseconds at `now`, zero once expired.
pub fn ttl_remaining_ms(timestamp: u64, max_age: u64, now: u64) -> u64 {
    if is_expired(timestamp, max_age, now) {
        return 0;
    }
    max_age - now.saturating_sub(timestamp)
}

pub(crate) fn duration_to_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000_000;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(
            "elra-logo-v2",
            vec![1, 2, 3],
            "logo",
            Duration::from_secs(60),
            NOW,
        );

        assert_eq!(entry.key, "elra-logo-v2");
        assert_eq!(entry.asset_type, "logo");
        assert_eq!(entry.timestamp, NOW);
        assert_eq!(entry.max_age, 60_000);
        assert_eq!(entry.data.len(), 3);
        assert!(!entry.is_expired_at(NOW));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new("k", vec![], "asset", Duration::from_millis(1000), NOW);

        // Exactly max_age old is still live
        assert!(!entry.is_expired_at(NOW + 1000));
        assert!(entry.is_expired_at(NOW + 1001));
    }

    #[test]
    fn test_zero_max_age_is_never_live() {
        let entry = CacheEntry::new("tmp", vec![0], "asset", Duration::ZERO, NOW);
        assert!(entry.is_expired_at(NOW));
    }

    #[test]
    fn test_clock_behind_timestamp_is_live() {
        let entry = CacheEntry::new("k", vec![], "asset", Duration::from_millis(10), NOW);
        assert!(!entry.is_expired_at(NOW - 5_000));
    }

    #[test]
    fn test_ttl_remaining_ms() {
        assert_eq!(ttl_remaining_ms(NOW, 10_000, NOW), 10_000);
        assert_eq!(ttl_remaining_ms(NOW, 10_000, NOW + 4_000), 6_000);
        assert_eq!(ttl_remaining_ms(NOW, 10_000, NOW + 20_000), 0);
        assert_eq!(ttl_remaining_ms(NOW, 0, NOW), 0);
    }

    #[test]
    fn test_info_serializes_type_field() {
        let info = AssetInfo::new("k".into(), "image".into(), 4, NOW, 1000, NOW + 400);
        let json = serde_json::to_value(info).unwrap();

        assert_eq!(json["type"], "image");
        assert_eq!(json["size"], 4);
        assert_eq!(json["maxAge"], 1000);
        assert_eq!(json["expired"], false);
        assert_eq!(json["ttlRemaining"], 600);
    }

    #[test]
    fn test_duration_to_ms_saturates() {
        assert_eq!(duration_to_ms(Duration::MAX), u64::MAX);
    }
}
