//! Data Transfer Objects for the HTTP API

pub mod catalog;
pub mod common;
pub mod quote;

pub use common::{ApiResponse, PaginationParams};
