//! Business logic services for Traslado
//!
//! This crate contains the two services that orchestrate the transfer
//! pricing engine:
//!
//! - `QuoteService` - origin/destination/passenger quote resolution over the
//!   dynamic catalog with legacy-table fallback
//! - `CatalogService` - idempotent catalog mutations (zones, locations,
//!   vehicles, routes, rates, overrides, bulk import)
//!
//! Services are generic over the repository traits in `traslado-core` and
//! are wrapped in `Arc` for sharing across async tasks. All operations are
//! instrumented with tracing and fail with `AppError`.

pub mod catalog;
pub mod quote;

pub use catalog::{
    CatalogService, ImportFailure, ImportReport, LocationImportRow, LocationUpsert,
    OverrideUpsert, RateUpsert, VehicleUpsert, ZoneUpsert,
};
pub use quote::{Quote, QuoteService, VehicleQuote};
