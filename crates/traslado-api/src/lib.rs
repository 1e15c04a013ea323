//! API layer for Traslado
//!
//! HTTP handlers and DTOs for the transfer quote and catalog endpoints.

#![forbid(unsafe_code)]

pub mod dto;
pub mod handlers;

// Re-export DTOs (common types)
pub use dto::{ApiResponse, PaginationParams};

// Re-export handler configuration functions
pub use handlers::{configure_catalog, configure_quote};
