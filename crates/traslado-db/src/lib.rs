//! Traslado Database Layer
//!
//! This crate provides PostgreSQL database access and repository implementations
//! for the transfer pricing catalog. It includes:
//!
//! - Connection pool management with sqlx
//! - Repository implementations for zones, locations, vehicles and routes
//! - Upsert-based idempotent writes keyed on natural identifiers
//! - Transaction support for multi-row rate and override mutations

pub mod pool;
pub mod repositories;

pub use pool::{create_pool, run_migrations};
pub use repositories::*;

// Re-export commonly used types
pub use sqlx::{PgPool, Postgres, Transaction};
pub use traslado_core::{AppError, AppResult};
