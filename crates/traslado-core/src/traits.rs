//! Repository traits for the catalog store
//!
//! Each trait lists exactly the operations the quote and catalog services
//! consume. Implementations must keep multi-row mutations individually
//! atomic; concurrent same-key upserts resolve last-writer-wins at the
//! storage layer.

use crate::error::AppError;
use crate::models::{
    Location, PriceOverride, Route, RouteDetail, RoutePrice, RouteSummary, Vehicle,
    VehicleCategory, Zone,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

/// Zone repository
#[async_trait]
pub trait ZoneRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Zone>, AppError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Zone>, AppError>;

    /// List zones with an optional active filter
    async fn list(
        &self,
        active: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Zone>, i64), AppError>;

    /// Idempotent create-or-update keyed by id
    async fn upsert(&self, zone: &Zone) -> Result<Zone, AppError>;

    /// Delete a zone; returns false when no row matched
    async fn delete(&self, id: &str) -> Result<bool, AppError>;

    /// Number of locations and routes still referencing the zone
    async fn count_references(&self, id: &str) -> Result<i64, AppError>;
}

/// Location repository
#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Location>, AppError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Location>, AppError>;

    /// List locations with optional active and zone filters
    async fn list(
        &self,
        active: Option<bool>,
        zone_id: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Location>, i64), AppError>;

    /// Idempotent create-or-update keyed by slug
    ///
    /// `destination_overrides` holds pre-resolved `(vehicle_id, amount)`
    /// pairs to be written as destination-keyed price overrides for this
    /// location inside the same transaction as the location row.
    async fn upsert(
        &self,
        location: &Location,
        destination_overrides: &[(String, Decimal)],
    ) -> Result<Location, AppError>;

    /// Flip the active flag; locations are deactivated, never deleted
    async fn set_active(&self, id: &str, active: bool) -> Result<Location, AppError>;
}

/// Vehicle repository
#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Vehicle>, AppError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Vehicle>, AppError>;

    /// List vehicles with an optional active filter
    async fn list(
        &self,
        active: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Vehicle>, i64), AppError>;

    /// Active vehicles of one category
    async fn find_active_by_category(
        &self,
        category: VehicleCategory,
    ) -> Result<Vec<Vehicle>, AppError>;

    /// Idempotent create-or-update keyed by id
    async fn upsert(&self, vehicle: &Vehicle) -> Result<Vehicle, AppError>;

    /// Flip the active flag
    async fn set_active(&self, id: &str, active: bool) -> Result<Vehicle, AppError>;
}

/// Route repository
///
/// Pair arguments are expected in canonical order; callers canonicalize
/// through `canonical_zone_pair` before every lookup or write.
#[async_trait]
pub trait RouteRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Route>, AppError>;

    async fn find_by_zone_pair(
        &self,
        zone_a_id: &str,
        zone_b_id: &str,
    ) -> Result<Option<Route>, AppError>;

    /// Load an active route with its priced (active) vehicles and the
    /// overrides relevant to the given origin/destination locations
    async fn load_detail(
        &self,
        zone_a_id: &str,
        zone_b_id: &str,
        origin_location_id: &str,
        destination_location_id: &str,
    ) -> Result<Option<RouteDetail>, AppError>;

    /// List routes with aggregate price summaries
    async fn list_summaries(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<RouteSummary>, i64), AppError>;

    /// Find-or-create the route for a canonical pair, reactivating it
    async fn upsert(
        &self,
        zone_a_id: &str,
        zone_b_id: &str,
        country_code: &str,
    ) -> Result<Route, AppError>;

    /// Create-or-update one base price keyed by `(route, vehicle)`
    async fn upsert_price(
        &self,
        route_id: &str,
        vehicle_id: &str,
        price: Decimal,
    ) -> Result<RoutePrice, AppError>;

    /// Find-or-create the route for a canonical pair and write the given
    /// `(vehicle_id, amount)` base prices, all in one transaction
    async fn upsert_rate(
        &self,
        zone_a_id: &str,
        zone_b_id: &str,
        country_code: &str,
        prices: &[(String, Decimal)],
    ) -> Result<Route, AppError>;

    /// Create-or-update an override keyed by
    /// `(vehicle, origin_location?, destination_location?)`
    async fn upsert_override(
        &self,
        entry: &PriceOverride,
    ) -> Result<PriceOverride, AppError>;
}

/// Pagination parameters
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 1000),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };

        Self {
            total,
            page,
            per_page,
            total_pages,
        }
    }
}
