//! Expired Asset Cleanup Task
//!
//! Background task that periodically sweeps expired assets out of the cache.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::AssetCache;

/// Spawns a background task that periodically removes expired assets.
///
/// The first sweep runs immediately so entries that expired while the
/// application was down are dropped at start-up; later sweeps follow every
/// `cleanup_interval_secs`. Reads evict expired entries on their own, so
/// the sweep only matters for assets nobody has asked for lately.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(AssetCache::in_memory());
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), 3600);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(cache: Arc<AssetCache>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let period = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting expired asset cleanup task with interval of {} seconds",
            period.as_secs()
        );

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let removed = cache.cleanup_expired_assets().await;

            if removed > 0 {
                info!("Asset cleanup: removed {} expired assets", removed);
            } else {
                debug!("Asset cleanup: no expired assets found");
            }
        }
    })
}
