//! Quote DTOs

use serde::Deserialize;
use validator::Validate;

/// Quote request body
///
/// Origin and destination are location slugs; the response ranks every
/// eligible vehicle by price.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuoteRequest {
    /// Origin location slug
    #[validate(length(min = 1, message = "origin is required"))]
    pub origin: String,

    /// Destination location slug
    #[validate(length(min = 1, message = "destination is required"))]
    pub destination: String,

    /// Passenger count
    #[validate(range(min = 1, message = "passenger count must be at least 1"))]
    pub passengers: i32,
}
