//! API Routes
//!
//! Configures the Axum router with all asset cache endpoints.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cleanup_handler, clear_handler, delete_asset_handler, get_asset_handler, health_handler,
    list_assets_handler, put_asset_handler, stats_handler, AppState,
};
use crate::cache::MAX_ASSET_SIZE;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /assets` - List asset metadata
/// - `DELETE /assets` - Remove every asset
/// - `GET /assets/:key` - Fetch an asset, through the origin on a miss
/// - `PUT /assets/:key` - Store the request body as an asset
/// - `DELETE /assets/:key` - Delete an asset
/// - `GET /stats` - Get cache statistics
/// - `POST /cleanup` - Sweep expired assets
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - Body limit: request bodies up to the maximum asset size
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/assets", get(list_assets_handler).delete(clear_handler))
        .route(
            "/assets/:key",
            get(get_asset_handler)
                .put(put_asset_handler)
                .delete(delete_asset_handler),
        )
        .route("/stats", get(stats_handler))
        .route("/cleanup", post(cleanup_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(MAX_ASSET_SIZE))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
