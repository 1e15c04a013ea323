//! HTTP handlers

pub mod catalog;
pub mod quote;

pub use catalog::configure as configure_catalog;
pub use quote::configure as configure_quote;
