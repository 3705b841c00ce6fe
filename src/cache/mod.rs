//! Cache Module
//!
//! Provides durable asset caching with per-entry TTL expiration.

mod clock;
mod entry;
mod migrations;
mod stats;
mod storage;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{is_expired, ttl_remaining_ms, AssetInfo, CacheEntry};
pub use stats::CacheStats;
pub use storage::{AssetDb, StorageLocation};
pub use store::AssetCache;

use std::time::Duration;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed asset size in bytes
pub const MAX_ASSET_SIZE: usize = 10 * 1024 * 1024; // 10 MB

/// Type tag applied when the caller does not supply one
pub const DEFAULT_ASSET_TYPE: &str = "asset";

/// Max age applied when the caller does not supply one
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Type tag used for logos
pub const LOGO_ASSET_TYPE: &str = "logo";

/// Logos change rarely and are kept for a month
pub const LOGO_MAX_AGE: Duration = Duration::from_secs(30 * 24 * 60 * 60);
