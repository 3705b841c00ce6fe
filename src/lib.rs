//! Asset Cache - A durable TTL cache for binary assets
//!
//! Stores images, logos and other static assets with a per-entry max age,
//! loads misses from an origin, and exposes the cache over HTTP.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::AssetCache;
pub use config::Config;
pub use error::CacheError;
pub use loader::AssetLoader;
pub use tasks::spawn_cleanup_task;
