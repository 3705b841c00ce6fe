//! API Module
//!
//! HTTP handlers and routing for the asset cache REST API.
//!
//! # Endpoints
//! - `GET|DELETE /assets` - List or clear assets
//! - `GET|PUT|DELETE /assets/:key` - Fetch, store or delete one asset
//! - `GET /stats` - Get cache statistics
//! - `POST /cleanup` - Sweep expired assets
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
