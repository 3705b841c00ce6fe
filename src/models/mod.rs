//! Request and Response models for the asset cache API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! deserializing query strings and serializing JSON response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{AssetParams, ListParams};
pub use responses::{
    CleanupResponse, ClearResponse, DeleteResponse, ErrorResponse, HealthResponse, ListResponse,
    StoreResponse,
};
