//! Traslado Core Library
//!
//! Foundational types for the transfer route pricing and quote resolution
//! engine:
//!
//! - Domain models (Zone, Location, Vehicle, Route, prices, overrides)
//! - Zone-pair canonicalization and the override precedence walk
//! - The legacy fallback rate table
//! - Repository traits for the catalog store
//! - Unified error handling with HTTP response mapping
//! - Application configuration

pub mod config;
pub mod error;
pub mod legacy;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use error::AppError;
pub use legacy::LegacyRateTable;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
