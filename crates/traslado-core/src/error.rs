//! Unified error handling for the transfer pricing engine
//!
//! This module provides a single error type covering the quote resolution
//! taxonomy, catalog mutation validation, and infrastructure failures, with
//! automatic HTTP response mapping.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Main application error type
///
/// All errors in the engine should be converted to this type.
/// It implements `ResponseError` for automatic HTTP response generation.
///
/// `RouteNotConfigured` and `NoVehicleForPassengerCount` are expected,
/// user-facing outcomes; storage variants are unexpected and their details
/// are logged instead of leaking into the response body.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Database Errors ====================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    // ==================== Quote Resolution Errors ====================
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Location has no zone assigned: {0}")]
    LocationUnzoned(String),

    #[error("No route configured between zones {origin_zone} and {destination_zone}")]
    RouteNotConfigured {
        origin_zone: String,
        destination_zone: String,
    },

    #[error("No vehicle available for {passengers} passengers")]
    NoVehicleForPassengerCount { passengers: i32 },

    // ==================== Catalog Lookup Errors ====================
    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    #[error("Vehicle not found: {0}")]
    VehicleNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // ==================== Validation Errors ====================
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Convenience constructor for structured validation errors
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. } | AppError::MissingField(_) | AppError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }

            // 404 Not Found
            AppError::LocationNotFound(_)
            | AppError::RouteNotConfigured { .. }
            | AppError::NoVehicleForPassengerCount { .. }
            | AppError::ZoneNotFound(_)
            | AppError::VehicleNotFound(_)
            | AppError::NotFound(_) => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::Conflict(_) => StatusCode::CONFLICT,

            // 422 Unprocessable Entity: the location exists but cannot be priced
            AppError::LocationUnzoned(_) => StatusCode::UNPROCESSABLE_ENTITY,

            // 500 Internal Server Error
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::Transaction(_) => "transaction_error",
            AppError::LocationNotFound(_) => "location_not_found",
            AppError::LocationUnzoned(_) => "location_unzoned",
            AppError::RouteNotConfigured { .. } => "route_not_configured",
            AppError::NoVehicleForPassengerCount { .. } => "no_vehicle_for_passenger_count",
            AppError::ZoneNotFound(_) => "zone_not_found",
            AppError::VehicleNotFound(_) => "vehicle_not_found",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Validation { .. } => "validation_error",
            AppError::MissingField(_) => "missing_field",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }

    /// Whether this error is an infrastructure failure whose detail must
    /// stay out of the response body
    fn is_internal(&self) -> bool {
        self.status_code() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let body = if self.is_internal() {
            error!("Internal error surfaced to caller: {}", self);
            json!({
                "error": self.error_code(),
                "message": "An internal error occurred",
                "status": status.as_u16(),
            })
        } else if let AppError::Validation { field, reason } = self {
            json!({
                "error": self.error_code(),
                "message": reason,
                "field": field,
                "status": status.as_u16(),
            })
        } else if let AppError::MissingField(field) = self {
            json!({
                "error": self.error_code(),
                "message": self.to_string(),
                "field": field,
                "status": status.as_u16(),
            })
        } else {
            json!({
                "error": self.error_code(),
                "message": self.to_string(),
                "status": status.as_u16(),
            })
        };

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let field = err
            .field_errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "payload".to_string());
        AppError::Validation {
            field,
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::LocationNotFound("hotel-x".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::LocationUnzoned("hotel-x".to_string()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::NoVehicleForPassengerCount { passengers: 12 }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::validation("slug", "must not be blank").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Database("connection reset".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_expected_outcomes_have_distinct_codes() {
        let route = AppError::RouteNotConfigured {
            origin_zone: "A".to_string(),
            destination_zone: "B".to_string(),
        };
        let pax = AppError::NoVehicleForPassengerCount { passengers: 9 };
        let storage = AppError::Database("boom".to_string());

        assert_eq!(route.error_code(), "route_not_configured");
        assert_eq!(pax.error_code(), "no_vehicle_for_passenger_count");
        assert_ne!(route.error_code(), storage.error_code());
        assert_ne!(pax.error_code(), storage.error_code());
    }

    #[test]
    fn test_validation_from_validator_errors_carries_field() {
        use validator::Validate;

        #[derive(Validate)]
        struct Probe {
            #[validate(length(min = 1))]
            slug: String,
        }

        let err = Probe {
            slug: String::new(),
        }
        .validate()
        .unwrap_err();

        match AppError::from(err) {
            AppError::Validation { field, .. } => assert_eq!(field, "slug"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
