//! Catalog DTOs
//!
//! Request bodies for the catalog mutation endpoints and response shapes
//! for the operator listing reads. Category maps travel as plain JSON
//! objects (`{"SEDAN": 60}`); the services expand them into per-vehicle
//! rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use traslado_core::models::{Location, RouteSummary, Vehicle, Zone};
use traslado_services::{
    LocationImportRow, LocationUpsert, OverrideUpsert, RateUpsert, VehicleUpsert, ZoneUpsert,
};
use validator::Validate;

/// Zone upsert request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ZoneUpsertRequest {
    /// Existing zone id for updates; omitted on create (slug becomes the id)
    pub id: Option<String>,

    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "slug is required"))]
    pub slug: String,

    #[validate(length(min = 2, max = 2, message = "country_code must be 2 letters"))]
    pub country_code: String,

    pub description: Option<String>,

    #[serde(default)]
    pub microzones: Vec<String>,

    #[serde(default)]
    pub featured_hotels: Vec<String>,
}

impl From<ZoneUpsertRequest> for ZoneUpsert {
    fn from(req: ZoneUpsertRequest) -> Self {
        Self {
            id: req.id,
            name: req.name,
            slug: req.slug,
            country_code: req.country_code,
            description: req.description,
            microzones: req.microzones,
            featured_hotels: req.featured_hotels,
        }
    }
}

/// Location upsert request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LocationUpsertRequest {
    pub id: Option<String>,

    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "slug is required"))]
    pub slug: String,

    /// HOTEL, AIRPORT or PLACE; defaults to HOTEL
    #[serde(default = "default_location_type")]
    pub location_type: String,

    #[validate(length(min = 1, message = "zone_id is required"))]
    pub zone_id: String,

    pub address: Option<String>,

    pub description: Option<String>,

    /// Category-keyed destination overrides, e.g. `{"SEDAN": 70}`
    #[serde(default)]
    pub pricing_overrides: HashMap<String, Decimal>,
}

fn default_location_type() -> String {
    "HOTEL".to_string()
}

impl LocationUpsertRequest {
    /// Translate into the service command; the category names inside
    /// `pricing_overrides` are validated by the service
    pub fn into_command(
        self,
        location_type: traslado_core::models::LocationType,
    ) -> LocationUpsert {
        LocationUpsert {
            id: self.id,
            name: self.name,
            slug: self.slug,
            location_type,
            zone_id: self.zone_id,
            address: self.address,
            description: self.description,
            pricing_overrides: self.pricing_overrides,
        }
    }
}

/// Zone-pair rate upsert request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RateUpsertRequest {
    #[validate(length(min = 1, message = "origin_zone_id is required"))]
    pub origin_zone_id: String,

    #[validate(length(min = 1, message = "destination_zone_id is required"))]
    pub destination_zone_id: String,

    #[validate(length(min = 2, max = 2, message = "country_code must be 2 letters"))]
    pub country_code: String,

    /// Category amounts; explicit null leaves a category untouched
    pub prices: HashMap<String, Option<Decimal>>,
}

impl From<RateUpsertRequest> for RateUpsert {
    fn from(req: RateUpsertRequest) -> Self {
        Self {
            origin_zone_id: req.origin_zone_id,
            destination_zone_id: req.destination_zone_id,
            country_code: req.country_code,
            prices: req.prices,
        }
    }
}

/// Vehicle upsert request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VehicleUpsertRequest {
    pub id: Option<String>,

    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "slug is required"))]
    pub slug: String,

    #[validate(length(min = 1, message = "category is required"))]
    pub category: String,

    #[validate(range(min = 1, message = "min_pax must be at least 1"))]
    pub min_pax: i32,

    #[validate(range(min = 1, message = "max_pax must be at least 1"))]
    pub max_pax: i32,

    pub image_url: Option<String>,
}

impl From<VehicleUpsertRequest> for VehicleUpsert {
    fn from(req: VehicleUpsertRequest) -> Self {
        Self {
            id: req.id,
            name: req.name,
            slug: req.slug,
            category: req.category,
            min_pax: req.min_pax,
            max_pax: req.max_pax,
            image_url: req.image_url,
        }
    }
}

/// Route upsert request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RouteUpsertRequest {
    #[validate(length(min = 1, message = "zone_a_id is required"))]
    pub zone_a_id: String,

    #[validate(length(min = 1, message = "zone_b_id is required"))]
    pub zone_b_id: String,
}

/// Route price upsert request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RoutePriceRequest {
    #[validate(length(min = 1, message = "vehicle_id is required"))]
    pub vehicle_id: String,

    pub price: Decimal,
}

/// Price override upsert request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OverrideUpsertRequest {
    #[validate(length(min = 1, message = "vehicle_id is required"))]
    pub vehicle_id: String,

    pub origin_location_id: Option<String>,

    pub destination_location_id: Option<String>,

    pub price: Decimal,

    pub notes: Option<String>,
}

impl From<OverrideUpsertRequest> for OverrideUpsert {
    fn from(req: OverrideUpsertRequest) -> Self {
        Self {
            vehicle_id: req.vehicle_id,
            origin_location_id: req.origin_location_id,
            destination_location_id: req.destination_location_id,
            price: req.price,
            notes: req.notes,
        }
    }
}

/// Active flag toggle request
#[derive(Debug, Clone, Deserialize)]
pub struct ActiveToggleRequest {
    pub active: bool,
}

/// Bulk location import request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LocationImportRequest {
    #[validate(length(min = 1, message = "rows must not be empty"))]
    pub rows: Vec<LocationImportRow>,

    pub default_zone_id: Option<String>,
}

/// Listing filters for zones and vehicles
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActiveFilterParams {
    pub active: Option<bool>,
}

/// Listing filters for locations
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationFilterParams {
    pub active: Option<bool>,
    pub zone_id: Option<String>,
}

/// Zone response
#[derive(Debug, Clone, Serialize)]
pub struct ZoneResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub country_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub microzones: Vec<String>,
    pub featured_hotels: Vec<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Zone> for ZoneResponse {
    fn from(zone: Zone) -> Self {
        Self {
            id: zone.id,
            name: zone.name,
            slug: zone.slug,
            country_code: zone.country_code,
            description: zone.description,
            microzones: zone.meta.microzones,
            featured_hotels: zone.meta.featured_hotels,
            active: zone.active,
            created_at: zone.created_at,
            updated_at: zone.updated_at,
        }
    }
}

/// Location response
#[derive(Debug, Clone, Serialize)]
pub struct LocationResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    pub name: String,
    pub slug: String,
    pub location_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub country_code: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Location> for LocationResponse {
    fn from(location: Location) -> Self {
        Self {
            id: location.id,
            zone_id: location.zone_id,
            name: location.name,
            slug: location.slug,
            location_type: location.location_type.to_string(),
            address: location.address,
            description: location.description,
            country_code: location.country_code,
            active: location.active,
            created_at: location.created_at,
            updated_at: location.updated_at,
        }
    }
}

/// Vehicle response
#[derive(Debug, Clone, Serialize)]
pub struct VehicleResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub category: String,
    pub min_pax: i32,
    pub max_pax: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Vehicle> for VehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            id: vehicle.id,
            name: vehicle.name,
            slug: vehicle.slug,
            category: vehicle.category.to_string(),
            min_pax: vehicle.min_pax,
            max_pax: vehicle.max_pax,
            image_url: vehicle.image_url,
            active: vehicle.active,
            created_at: vehicle.created_at,
            updated_at: vehicle.updated_at,
        }
    }
}

/// Route listing response with aggregate pricing
#[derive(Debug, Clone, Serialize)]
pub struct RouteSummaryResponse {
    pub id: String,
    pub zone_a_id: String,
    pub zone_b_id: String,
    pub country_code: String,
    pub active: bool,
    pub vehicle_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Decimal>,
}

impl From<RouteSummary> for RouteSummaryResponse {
    fn from(summary: RouteSummary) -> Self {
        Self {
            id: summary.route.id,
            zone_a_id: summary.route.zone_a_id,
            zone_b_id: summary.route.zone_b_id,
            country_code: summary.route.country_code,
            active: summary.route.active,
            vehicle_count: summary.vehicle_count,
            min_price: summary.min_price,
        }
    }
}
