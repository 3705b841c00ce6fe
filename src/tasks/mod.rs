//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Asset cleanup: sweeps expired assets at start-up and at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
