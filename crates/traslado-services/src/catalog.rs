//! Catalog mutation service
//!
//! Every operation is an idempotent upsert validated up front; a validation
//! failure applies nothing. Multi-row writes stay atomic inside the
//! repository transaction. Category keys arriving as JSON maps are expanded
//! here into per-vehicle rows, so the store only ever holds the normalized
//! representation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use traslado_core::{
    models::{
        canonical_zone_pair, Location, LocationType, PriceOverride, Route, RoutePrice, Vehicle,
        VehicleCategory, Zone, ZoneMeta,
    },
    traits::{LocationRepository, RouteRepository, VehicleRepository, ZoneRepository},
    AppError, AppResult,
};
use uuid::Uuid;

/// Zone upsert command
#[derive(Debug, Clone, Default)]
pub struct ZoneUpsert {
    pub id: Option<String>,
    pub name: String,
    pub slug: String,
    pub country_code: String,
    pub description: Option<String>,
    pub microzones: Vec<String>,
    pub featured_hotels: Vec<String>,
}

/// Location upsert command
///
/// `pricing_overrides` maps a category name to an amount; each entry expands
/// into destination-keyed overrides for every active vehicle of the
/// category, written in the same transaction as the location row.
#[derive(Debug, Clone, Default)]
pub struct LocationUpsert {
    pub id: Option<String>,
    pub name: String,
    pub slug: String,
    pub location_type: LocationType,
    pub zone_id: String,
    pub address: Option<String>,
    pub description: Option<String>,
    pub pricing_overrides: HashMap<String, Decimal>,
}

/// Zone-pair rate upsert command
///
/// `prices` maps a category name to an optional amount; omitted or null
/// categories are left untouched (partial update).
#[derive(Debug, Clone, Default)]
pub struct RateUpsert {
    pub origin_zone_id: String,
    pub destination_zone_id: String,
    pub country_code: String,
    pub prices: HashMap<String, Option<Decimal>>,
}

/// Vehicle upsert command
#[derive(Debug, Clone, Default)]
pub struct VehicleUpsert {
    pub id: Option<String>,
    pub name: String,
    pub slug: String,
    pub category: String,
    pub min_pax: i32,
    pub max_pax: i32,
    pub image_url: Option<String>,
}

/// Price override upsert command
#[derive(Debug, Clone, Default)]
pub struct OverrideUpsert {
    pub vehicle_id: String,
    pub origin_location_id: Option<String>,
    pub destination_location_id: Option<String>,
    pub price: Decimal,
    pub notes: Option<String>,
}

/// One row of a bulk location import
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationImportRow {
    pub name: String,
    pub slug: String,
    pub location_type: Option<String>,
    pub zone_slug: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
}

/// One failed import row
#[derive(Debug, Clone, Serialize)]
pub struct ImportFailure {
    pub row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub reason: String,
}

/// Outcome of a bulk import; failures never abort the surviving rows
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub failures: Vec<ImportFailure>,
}

/// Catalog mutation service
pub struct CatalogService<Z, L, V, R>
where
    Z: ZoneRepository,
    L: LocationRepository,
    V: VehicleRepository,
    R: RouteRepository,
{
    zone_repo: Arc<Z>,
    location_repo: Arc<L>,
    vehicle_repo: Arc<V>,
    route_repo: Arc<R>,
}

impl<Z, L, V, R> CatalogService<Z, L, V, R>
where
    Z: ZoneRepository,
    L: LocationRepository,
    V: VehicleRepository,
    R: RouteRepository,
{
    /// Create a new catalog service
    pub fn new(
        zone_repo: Arc<Z>,
        location_repo: Arc<L>,
        vehicle_repo: Arc<V>,
        route_repo: Arc<R>,
    ) -> Self {
        Self {
            zone_repo,
            location_repo,
            vehicle_repo,
            route_repo,
        }
    }

    /// Create or update a zone
    ///
    /// Without an id the slug becomes the id, so zones carry a natural key
    /// that legacy-table identifiers can line up with.
    #[instrument(skip(self, input))]
    pub async fn upsert_zone(&self, input: ZoneUpsert) -> AppResult<Zone> {
        let name = non_blank("name", &input.name)?;
        let slug = non_blank("slug", &input.slug)?;
        let country_code = non_blank("country_code", &input.country_code)?.to_uppercase();

        let id = match &input.id {
            Some(id) => {
                let id = non_blank("id", id)?;
                if self.zone_repo.find_by_id(&id).await?.is_none() {
                    return Err(AppError::ZoneNotFound(id));
                }
                id
            }
            None => slug.clone(),
        };

        if let Some(existing) = self.zone_repo.find_by_slug(&slug).await? {
            if existing.id != id {
                warn!("Zone slug {} already taken by {}", slug, existing.id);
                return Err(AppError::Conflict(format!(
                    "Zone slug '{}' is already in use",
                    slug
                )));
            }
        }

        let zone = Zone {
            id,
            name,
            slug,
            country_code,
            description: trimmed_opt(input.description),
            meta: ZoneMeta::sanitized(input.microzones, input.featured_hotels),
            ..Default::default()
        };

        info!("Upserting zone {}", zone.id);
        self.zone_repo.upsert(&zone).await
    }

    /// Create or update a location, expanding category overrides
    #[instrument(skip(self, input))]
    pub async fn upsert_location(&self, input: LocationUpsert) -> AppResult<Location> {
        let name = non_blank("name", &input.name)?;
        let slug = non_blank("slug", &input.slug)?;
        let zone_id = non_blank("zone_id", &input.zone_id)?;

        let zone = self
            .zone_repo
            .find_by_id(&zone_id)
            .await?
            .ok_or_else(|| AppError::validation("zone_id", "unknown zone"))?;

        let overrides = self
            .expand_categories(&input.pricing_overrides, "pricing_overrides")
            .await?;

        let location = Location {
            id: input.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            zone_id: Some(zone.id),
            name,
            slug,
            location_type: input.location_type,
            address: trimmed_opt(input.address),
            description: trimmed_opt(input.description),
            country_code: zone.country_code,
            ..Default::default()
        };

        info!(
            "Upserting location {} with {} destination overrides",
            location.slug,
            overrides.len()
        );
        self.location_repo.upsert(&location, &overrides).await
    }

    /// Write base prices for a zone pair, one category grid at a time
    #[instrument(skip(self, input))]
    pub async fn upsert_rate(&self, input: RateUpsert) -> AppResult<Route> {
        let origin_zone_id = non_blank("origin_zone_id", &input.origin_zone_id)?;
        let destination_zone_id = non_blank("destination_zone_id", &input.destination_zone_id)?;
        let country_code = non_blank("country_code", &input.country_code)?.to_uppercase();

        if origin_zone_id == destination_zone_id {
            return Err(AppError::validation(
                "destination_zone_id",
                "origin and destination zones must differ",
            ));
        }

        let origin_zone = self
            .zone_repo
            .find_by_id(&origin_zone_id)
            .await?
            .ok_or_else(|| AppError::validation("origin_zone_id", "unknown zone"))?;
        let destination_zone = self
            .zone_repo
            .find_by_id(&destination_zone_id)
            .await?
            .ok_or_else(|| AppError::validation("destination_zone_id", "unknown zone"))?;

        if origin_zone.country_code != country_code
            || destination_zone.country_code != country_code
        {
            return Err(AppError::validation(
                "country_code",
                "both zones must belong to the given country",
            ));
        }

        // Omitted or null categories stay untouched
        let given: HashMap<String, Decimal> = input
            .prices
            .iter()
            .filter_map(|(category, amount)| amount.map(|a| (category.clone(), a)))
            .collect();

        let prices = self.expand_categories(&given, "prices").await?;
        if prices.is_empty() {
            return Err(AppError::validation(
                "prices",
                "at least one category amount is required",
            ));
        }

        let (zone_a, zone_b) = canonical_zone_pair(&origin_zone.id, &destination_zone.id);
        info!(
            "Upserting rate for pair ({}, {}) across {} vehicles",
            zone_a,
            zone_b,
            prices.len()
        );
        self.route_repo
            .upsert_rate(zone_a, zone_b, &country_code, &prices)
            .await
    }

    /// Create or update a vehicle
    #[instrument(skip(self, input))]
    pub async fn upsert_vehicle(&self, input: VehicleUpsert) -> AppResult<Vehicle> {
        let name = non_blank("name", &input.name)?;
        let slug = non_blank("slug", &input.slug)?;
        let category = VehicleCategory::parse(&input.category)
            .ok_or_else(|| AppError::validation("category", "unknown vehicle category"))?;

        if input.min_pax < 1 {
            return Err(AppError::validation(
                "min_pax",
                "minimum capacity must be at least 1",
            ));
        }
        if input.max_pax < input.min_pax {
            return Err(AppError::validation(
                "max_pax",
                "maximum capacity must not be below the minimum",
            ));
        }

        let id = match &input.id {
            Some(id) => {
                let id = non_blank("id", id)?;
                if self.vehicle_repo.find_by_id(&id).await?.is_none() {
                    return Err(AppError::VehicleNotFound(id));
                }
                id
            }
            None => Uuid::new_v4().to_string(),
        };

        if let Some(existing) = self.vehicle_repo.find_by_slug(&slug).await? {
            if existing.id != id {
                return Err(AppError::Conflict(format!(
                    "Vehicle slug '{}' is already in use",
                    slug
                )));
            }
        }

        let vehicle = Vehicle {
            id,
            name,
            slug,
            category,
            min_pax: input.min_pax,
            max_pax: input.max_pax,
            image_url: trimmed_opt(input.image_url),
            ..Default::default()
        };

        info!("Upserting vehicle {}", vehicle.slug);
        self.vehicle_repo.upsert(&vehicle).await
    }

    /// Find-or-create a route for a zone pair, reactivating it
    #[instrument(skip(self))]
    pub async fn upsert_route(&self, zone_a_id: &str, zone_b_id: &str) -> AppResult<Route> {
        let zone_a_id = non_blank("zone_a_id", zone_a_id)?;
        let zone_b_id = non_blank("zone_b_id", zone_b_id)?;

        if zone_a_id == zone_b_id {
            return Err(AppError::validation(
                "zone_b_id",
                "a route connects two distinct zones",
            ));
        }

        let zone_a = self
            .zone_repo
            .find_by_id(&zone_a_id)
            .await?
            .ok_or_else(|| AppError::validation("zone_a_id", "unknown zone"))?;
        let zone_b = self
            .zone_repo
            .find_by_id(&zone_b_id)
            .await?
            .ok_or_else(|| AppError::validation("zone_b_id", "unknown zone"))?;

        if zone_a.country_code != zone_b.country_code {
            return Err(AppError::validation(
                "zone_b_id",
                "both zones must belong to the same country",
            ));
        }

        let (first, second) = canonical_zone_pair(&zone_a.id, &zone_b.id);
        self.route_repo
            .upsert(first, second, &zone_a.country_code)
            .await
    }

    /// Create or update one base price on a route
    #[instrument(skip(self))]
    pub async fn upsert_route_price(
        &self,
        route_id: &str,
        vehicle_id: &str,
        price: Decimal,
    ) -> AppResult<RoutePrice> {
        if price <= Decimal::ZERO {
            return Err(AppError::validation("price", "price must be positive"));
        }

        if self.route_repo.find_by_id(route_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Route {} not found", route_id)));
        }
        if self.vehicle_repo.find_by_id(vehicle_id).await?.is_none() {
            return Err(AppError::VehicleNotFound(vehicle_id.to_string()));
        }

        self.route_repo
            .upsert_price(route_id, vehicle_id, price)
            .await
    }

    /// Create or update a location-specific price override
    #[instrument(skip(self, input))]
    pub async fn upsert_override(&self, input: OverrideUpsert) -> AppResult<PriceOverride> {
        let vehicle_id = non_blank("vehicle_id", &input.vehicle_id)?;

        if input.price <= Decimal::ZERO {
            return Err(AppError::validation("price", "price must be positive"));
        }

        let origin = trimmed_opt(input.origin_location_id);
        let destination = trimmed_opt(input.destination_location_id);
        if origin.is_none() && destination.is_none() {
            return Err(AppError::validation(
                "origin_location_id",
                "at least one of origin or destination must be set",
            ));
        }

        if self.vehicle_repo.find_by_id(&vehicle_id).await?.is_none() {
            return Err(AppError::VehicleNotFound(vehicle_id));
        }
        for (field, location_id) in [
            ("origin_location_id", &origin),
            ("destination_location_id", &destination),
        ] {
            if let Some(id) = location_id {
                if self.location_repo.find_by_id(id).await?.is_none() {
                    return Err(AppError::validation(field, "unknown location"));
                }
            }
        }

        let entry = PriceOverride {
            id: Uuid::new_v4().to_string(),
            vehicle_id,
            origin_location_id: origin,
            destination_location_id: destination,
            price: input.price,
            notes: trimmed_opt(input.notes),
            ..Default::default()
        };

        self.route_repo.upsert_override(&entry).await
    }

    /// Deactivate or reactivate a location
    #[instrument(skip(self))]
    pub async fn set_location_active(&self, id: &str, active: bool) -> AppResult<Location> {
        self.location_repo.set_active(id, active).await
    }

    /// Deactivate or reactivate a vehicle
    #[instrument(skip(self))]
    pub async fn set_vehicle_active(&self, id: &str, active: bool) -> AppResult<Vehicle> {
        self.vehicle_repo.set_active(id, active).await
    }

    /// Delete a zone, refused while anything still references it
    #[instrument(skip(self))]
    pub async fn delete_zone(&self, id: &str) -> AppResult<()> {
        let references = self.zone_repo.count_references(id).await?;
        if references > 0 {
            return Err(AppError::Conflict(format!(
                "Zone {} is still referenced by {} locations or routes",
                id, references
            )));
        }

        if !self.zone_repo.delete(id).await? {
            return Err(AppError::ZoneNotFound(id.to_string()));
        }
        info!("Deleted zone {}", id);
        Ok(())
    }

    /// Bulk upsert of locations with per-row failure reporting
    ///
    /// Rows are independent: a bad row is reported and skipped, the rest
    /// proceed. A slug repeated inside the batch imports once; later
    /// occurrences fail.
    #[instrument(skip(self, rows))]
    pub async fn import_locations(
        &self,
        rows: Vec<LocationImportRow>,
        default_zone_id: Option<String>,
    ) -> AppResult<ImportReport> {
        let default_zone = match &default_zone_id {
            Some(id) => Some(
                self.zone_repo
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| AppError::validation("default_zone_id", "unknown zone"))?,
            ),
            None => None,
        };

        let mut seen_slugs: HashSet<String> = HashSet::new();
        let mut imported = 0usize;
        let mut failures = Vec::new();

        for (index, row) in rows.into_iter().enumerate() {
            let row_number = index + 1;
            let slug = row.slug.trim().to_string();
            let slug_opt = (!slug.is_empty()).then(|| slug.clone());

            match self
                .import_row(row, &slug, &mut seen_slugs, default_zone.as_ref())
                .await
            {
                Ok(()) => imported += 1,
                Err(e) => failures.push(ImportFailure {
                    row: row_number,
                    slug: slug_opt,
                    reason: e.to_string(),
                }),
            }
        }

        info!(
            "Imported {} locations, {} failures",
            imported,
            failures.len()
        );
        Ok(ImportReport { imported, failures })
    }

    async fn import_row(
        &self,
        row: LocationImportRow,
        slug: &str,
        seen_slugs: &mut HashSet<String>,
        default_zone: Option<&Zone>,
    ) -> AppResult<()> {
        let name = non_blank("name", &row.name)?;
        let slug = non_blank("slug", slug)?;
        if !seen_slugs.insert(slug.clone()) {
            return Err(AppError::validation("slug", "duplicate slug in batch"));
        }

        let location_type = match row.location_type.as_deref() {
            Some(s) if !s.trim().is_empty() => LocationType::parse(s)
                .ok_or_else(|| AppError::validation("location_type", "unknown location type"))?,
            _ => LocationType::Hotel,
        };

        let zone = match row.zone_slug.as_deref().map(str::trim) {
            Some(zone_slug) if !zone_slug.is_empty() => self
                .zone_repo
                .find_by_slug(zone_slug)
                .await?
                .ok_or_else(|| AppError::validation("zone_slug", "unknown zone"))?,
            _ => default_zone
                .cloned()
                .ok_or_else(|| AppError::validation("zone_slug", "row has no zone"))?,
        };

        let location = Location {
            id: Uuid::new_v4().to_string(),
            zone_id: Some(zone.id.clone()),
            name,
            slug,
            location_type,
            address: trimmed_opt(row.address),
            description: trimmed_opt(row.description),
            country_code: zone.country_code.clone(),
            ..Default::default()
        };

        self.location_repo.upsert(&location, &[]).await?;
        Ok(())
    }

    /// Expand `{category -> amount}` into `(vehicle_id, amount)` pairs over
    /// the active vehicles of each category. A category with no active
    /// vehicle fails the whole expansion.
    async fn expand_categories(
        &self,
        amounts: &HashMap<String, Decimal>,
        field: &str,
    ) -> AppResult<Vec<(String, Decimal)>> {
        let mut pairs = Vec::new();
        for (category_name, amount) in amounts {
            let category = VehicleCategory::parse(category_name).ok_or_else(|| {
                AppError::validation(field, format!("unknown category '{}'", category_name))
            })?;
            if *amount <= Decimal::ZERO {
                return Err(AppError::validation(
                    field,
                    format!("amount for {} must be positive", category),
                ));
            }

            let vehicles = self.vehicle_repo.find_active_by_category(category).await?;
            if vehicles.is_empty() {
                debug!("Category {} has no active vehicle", category);
                return Err(AppError::validation(
                    field,
                    format!("category {} has no active vehicle", category),
                ));
            }
            for vehicle in vehicles {
                pairs.push((vehicle.id, *amount));
            }
        }
        Ok(pairs)
    }
}

fn non_blank(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::MissingField(field.to_string()));
    }
    Ok(trimmed.to_string())
}

fn trimmed_opt(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;
    use traslado_core::models::{RouteDetail, RouteSummary};

    #[derive(Default)]
    struct MockZoneRepository {
        zones: Mutex<Vec<Zone>>,
        references: i64,
    }

    impl MockZoneRepository {
        fn with_zones(zones: Vec<Zone>) -> Self {
            Self {
                zones: Mutex::new(zones),
                references: 0,
            }
        }
    }

    #[async_trait]
    impl ZoneRepository for MockZoneRepository {
        async fn find_by_id(&self, id: &str) -> AppResult<Option<Zone>> {
            Ok(self.zones.lock().unwrap().iter().find(|z| z.id == id).cloned())
        }

        async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Zone>> {
            Ok(self
                .zones
                .lock()
                .unwrap()
                .iter()
                .find(|z| z.slug == slug)
                .cloned())
        }

        async fn list(
            &self,
            _active: Option<bool>,
            _limit: i64,
            _offset: i64,
        ) -> AppResult<(Vec<Zone>, i64)> {
            let zones = self.zones.lock().unwrap().clone();
            let total = zones.len() as i64;
            Ok((zones, total))
        }

        async fn upsert(&self, zone: &Zone) -> AppResult<Zone> {
            let mut zones = self.zones.lock().unwrap();
            zones.retain(|z| z.id != zone.id);
            zones.push(zone.clone());
            Ok(zone.clone())
        }

        async fn delete(&self, id: &str) -> AppResult<bool> {
            let mut zones = self.zones.lock().unwrap();
            let before = zones.len();
            zones.retain(|z| z.id != id);
            Ok(zones.len() < before)
        }

        async fn count_references(&self, _id: &str) -> AppResult<i64> {
            Ok(self.references)
        }
    }

    #[derive(Default)]
    struct MockLocationRepository {
        locations: Mutex<Vec<Location>>,
        override_writes: Mutex<Vec<(String, Vec<(String, Decimal)>)>>,
    }

    #[async_trait]
    impl LocationRepository for MockLocationRepository {
        async fn find_by_id(&self, id: &str) -> AppResult<Option<Location>> {
            Ok(self
                .locations
                .lock()
                .unwrap()
                .iter()
                .find(|l| l.id == id)
                .cloned())
        }

        async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Location>> {
            Ok(self
                .locations
                .lock()
                .unwrap()
                .iter()
                .find(|l| l.slug == slug)
                .cloned())
        }

        async fn list(
            &self,
            _active: Option<bool>,
            _zone_id: Option<&str>,
            _limit: i64,
            _offset: i64,
        ) -> AppResult<(Vec<Location>, i64)> {
            let locations = self.locations.lock().unwrap().clone();
            let total = locations.len() as i64;
            Ok((locations, total))
        }

        async fn upsert(
            &self,
            location: &Location,
            destination_overrides: &[(String, Decimal)],
        ) -> AppResult<Location> {
            let mut locations = self.locations.lock().unwrap();
            locations.retain(|l| l.slug != location.slug);
            locations.push(location.clone());
            self.override_writes
                .lock()
                .unwrap()
                .push((location.slug.clone(), destination_overrides.to_vec()));
            Ok(location.clone())
        }

        async fn set_active(&self, id: &str, active: bool) -> AppResult<Location> {
            let mut locations = self.locations.lock().unwrap();
            let location = locations
                .iter_mut()
                .find(|l| l.id == id)
                .ok_or_else(|| AppError::NotFound(format!("Location {} not found", id)))?;
            location.active = active;
            Ok(location.clone())
        }
    }

    #[derive(Default)]
    struct MockVehicleRepository {
        vehicles: Mutex<Vec<Vehicle>>,
    }

    impl MockVehicleRepository {
        fn with_vehicles(vehicles: Vec<Vehicle>) -> Self {
            Self {
                vehicles: Mutex::new(vehicles),
            }
        }
    }

    #[async_trait]
    impl VehicleRepository for MockVehicleRepository {
        async fn find_by_id(&self, id: &str) -> AppResult<Option<Vehicle>> {
            Ok(self
                .vehicles
                .lock()
                .unwrap()
                .iter()
                .find(|v| v.id == id)
                .cloned())
        }

        async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Vehicle>> {
            Ok(self
                .vehicles
                .lock()
                .unwrap()
                .iter()
                .find(|v| v.slug == slug)
                .cloned())
        }

        async fn list(
            &self,
            _active: Option<bool>,
            _limit: i64,
            _offset: i64,
        ) -> AppResult<(Vec<Vehicle>, i64)> {
            let vehicles = self.vehicles.lock().unwrap().clone();
            let total = vehicles.len() as i64;
            Ok((vehicles, total))
        }

        async fn find_active_by_category(
            &self,
            category: VehicleCategory,
        ) -> AppResult<Vec<Vehicle>> {
            Ok(self
                .vehicles
                .lock()
                .unwrap()
                .iter()
                .filter(|v| v.active && v.category == category)
                .cloned()
                .collect())
        }

        async fn upsert(&self, vehicle: &Vehicle) -> AppResult<Vehicle> {
            let mut vehicles = self.vehicles.lock().unwrap();
            vehicles.retain(|v| v.id != vehicle.id);
            vehicles.push(vehicle.clone());
            Ok(vehicle.clone())
        }

        async fn set_active(&self, id: &str, active: bool) -> AppResult<Vehicle> {
            let mut vehicles = self.vehicles.lock().unwrap();
            let vehicle = vehicles
                .iter_mut()
                .find(|v| v.id == id)
                .ok_or_else(|| AppError::VehicleNotFound(id.to_string()))?;
            vehicle.active = active;
            Ok(vehicle.clone())
        }
    }

    /// In-memory route store keyed the way the real tables are
    #[derive(Default)]
    struct MockRouteRepository {
        routes: Mutex<Vec<Route>>,
        prices: Mutex<HashMap<(String, String), Decimal>>,
        overrides: Mutex<Vec<PriceOverride>>,
    }

    #[async_trait]
    impl RouteRepository for MockRouteRepository {
        async fn find_by_id(&self, id: &str) -> AppResult<Option<Route>> {
            Ok(self.routes.lock().unwrap().iter().find(|r| r.id == id).cloned())
        }

        async fn find_by_zone_pair(
            &self,
            zone_a_id: &str,
            zone_b_id: &str,
        ) -> AppResult<Option<Route>> {
            Ok(self
                .routes
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.zone_a_id == zone_a_id && r.zone_b_id == zone_b_id)
                .cloned())
        }

        async fn load_detail(
            &self,
            _zone_a_id: &str,
            _zone_b_id: &str,
            _origin_location_id: &str,
            _destination_location_id: &str,
        ) -> AppResult<Option<RouteDetail>> {
            Ok(None)
        }

        async fn list_summaries(
            &self,
            _limit: i64,
            _offset: i64,
        ) -> AppResult<(Vec<RouteSummary>, i64)> {
            Ok((vec![], 0))
        }

        async fn upsert(
            &self,
            zone_a_id: &str,
            zone_b_id: &str,
            country_code: &str,
        ) -> AppResult<Route> {
            let mut routes = self.routes.lock().unwrap();
            if let Some(route) = routes
                .iter_mut()
                .find(|r| r.zone_a_id == zone_a_id && r.zone_b_id == zone_b_id)
            {
                route.active = true;
                return Ok(route.clone());
            }
            let route = Route {
                id: format!("route-{}", routes.len() + 1),
                zone_a_id: zone_a_id.to_string(),
                zone_b_id: zone_b_id.to_string(),
                country_code: country_code.to_string(),
                ..Default::default()
            };
            routes.push(route.clone());
            Ok(route)
        }

        async fn upsert_price(
            &self,
            route_id: &str,
            vehicle_id: &str,
            price: Decimal,
        ) -> AppResult<RoutePrice> {
            self.prices
                .lock()
                .unwrap()
                .insert((route_id.to_string(), vehicle_id.to_string()), price);
            Ok(RoutePrice {
                id: "price-1".to_string(),
                route_id: route_id.to_string(),
                vehicle_id: vehicle_id.to_string(),
                price,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        }

        async fn upsert_rate(
            &self,
            zone_a_id: &str,
            zone_b_id: &str,
            country_code: &str,
            prices: &[(String, Decimal)],
        ) -> AppResult<Route> {
            let route = self.upsert(zone_a_id, zone_b_id, country_code).await?;
            for (vehicle_id, amount) in prices {
                self.prices
                    .lock()
                    .unwrap()
                    .insert((route.id.clone(), vehicle_id.clone()), *amount);
            }
            Ok(route)
        }

        async fn upsert_override(&self, entry: &PriceOverride) -> AppResult<PriceOverride> {
            let mut overrides = self.overrides.lock().unwrap();
            overrides.retain(|o| {
                !(o.vehicle_id == entry.vehicle_id
                    && o.origin_location_id == entry.origin_location_id
                    && o.destination_location_id == entry.destination_location_id)
            });
            overrides.push(entry.clone());
            Ok(entry.clone())
        }
    }

    fn zone(id: &str, slug: &str, country: &str) -> Zone {
        Zone {
            id: id.to_string(),
            name: slug.to_string(),
            slug: slug.to_string(),
            country_code: country.to_string(),
            ..Default::default()
        }
    }

    fn vehicle(id: &str, category: VehicleCategory) -> Vehicle {
        Vehicle {
            id: id.to_string(),
            name: id.to_string(),
            slug: id.to_string(),
            category,
            min_pax: 1,
            max_pax: 8,
            ..Default::default()
        }
    }

    type TestService = CatalogService<
        MockZoneRepository,
        MockLocationRepository,
        MockVehicleRepository,
        MockRouteRepository,
    >;

    fn service(
        zones: Vec<Zone>,
        vehicles: Vec<Vehicle>,
    ) -> (
        TestService,
        Arc<MockLocationRepository>,
        Arc<MockRouteRepository>,
    ) {
        let location_repo = Arc::new(MockLocationRepository::default());
        let route_repo = Arc::new(MockRouteRepository::default());
        let svc = CatalogService::new(
            Arc::new(MockZoneRepository::with_zones(zones)),
            location_repo.clone(),
            Arc::new(MockVehicleRepository::with_vehicles(vehicles)),
            route_repo.clone(),
        );
        (svc, location_repo, route_repo)
    }

    #[tokio::test]
    async fn test_upsert_zone_uses_slug_as_id() {
        let (svc, _, _) = service(vec![], vec![]);

        let zone = svc
            .upsert_zone(ZoneUpsert {
                name: "Bávaro".to_string(),
                slug: "bavaro".to_string(),
                country_code: "rd".to_string(),
                microzones: vec!["Cap Cana".to_string(), " ".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(zone.id, "bavaro");
        assert_eq!(zone.country_code, "RD");
        assert_eq!(zone.meta.microzones, vec!["Cap Cana"]);
    }

    #[tokio::test]
    async fn test_upsert_zone_blank_name_rejected() {
        let (svc, _, _) = service(vec![], vec![]);

        let err = svc
            .upsert_zone(ZoneUpsert {
                name: "  ".to_string(),
                slug: "bavaro".to_string(),
                country_code: "RD".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingField(f) if f == "name"));
    }

    #[tokio::test]
    async fn test_upsert_zone_slug_conflict() {
        let (svc, _, _) = service(vec![zone("other-id", "bavaro", "RD")], vec![]);

        let err = svc
            .upsert_zone(ZoneUpsert {
                name: "Bávaro".to_string(),
                slug: "bavaro".to_string(),
                country_code: "RD".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_upsert_location_expands_category_overrides() {
        let (svc, location_repo, _) = service(
            vec![zone("bavaro", "bavaro", "RD")],
            vec![
                vehicle("sedan-1", VehicleCategory::Sedan),
                vehicle("sedan-2", VehicleCategory::Sedan),
            ],
        );

        svc.upsert_location(LocationUpsert {
            name: "Hotel X".to_string(),
            slug: "hotel-x".to_string(),
            zone_id: "bavaro".to_string(),
            pricing_overrides: HashMap::from([("SEDAN".to_string(), dec!(70))]),
            ..Default::default()
        })
        .await
        .unwrap();

        let writes = location_repo.override_writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        let (slug, overrides) = &writes[0];
        assert_eq!(slug, "hotel-x");
        // One row per active vehicle of the category
        assert_eq!(overrides.len(), 2);
        assert!(overrides.iter().all(|(_, amount)| *amount == dec!(70)));
    }

    #[tokio::test]
    async fn test_upsert_location_category_without_vehicle_fails_whole_upsert() {
        let (svc, location_repo, _) = service(vec![zone("bavaro", "bavaro", "RD")], vec![]);

        let err = svc
            .upsert_location(LocationUpsert {
                name: "Hotel X".to_string(),
                slug: "hotel-x".to_string(),
                zone_id: "bavaro".to_string(),
                pricing_overrides: HashMap::from([("SEDAN".to_string(), dec!(70))]),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
        // Nothing was applied
        assert!(location_repo.override_writes.lock().unwrap().is_empty());
        assert!(location_repo.locations.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_location_unknown_zone() {
        let (svc, _, _) = service(vec![], vec![]);

        let err = svc
            .upsert_location(LocationUpsert {
                name: "Hotel X".to_string(),
                slug: "hotel-x".to_string(),
                zone_id: "atlantis".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "zone_id"));
    }

    #[tokio::test]
    async fn test_upsert_rate_twice_keeps_latest_amount() {
        let (svc, _, route_repo) = service(
            vec![zone("bavaro", "bavaro", "RD"), zone("puj", "puj", "RD")],
            vec![vehicle("sedan-1", VehicleCategory::Sedan)],
        );

        let rate = |amount| RateUpsert {
            origin_zone_id: "puj".to_string(),
            destination_zone_id: "bavaro".to_string(),
            country_code: "RD".to_string(),
            prices: HashMap::from([("SEDAN".to_string(), Some(amount))]),
        };

        svc.upsert_rate(rate(dec!(60))).await.unwrap();
        svc.upsert_rate(rate(dec!(65))).await.unwrap();

        let prices = route_repo.prices.lock().unwrap();
        assert_eq!(prices.len(), 1);
        assert_eq!(
            prices.get(&("route-1".to_string(), "sedan-1".to_string())),
            Some(&dec!(65))
        );
        // Still a single route row for the pair
        assert_eq!(route_repo.routes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_rate_canonicalizes_pair() {
        let (svc, _, route_repo) = service(
            vec![zone("bavaro", "bavaro", "RD"), zone("puj", "puj", "RD")],
            vec![vehicle("sedan-1", VehicleCategory::Sedan)],
        );

        svc.upsert_rate(RateUpsert {
            origin_zone_id: "puj".to_string(),
            destination_zone_id: "bavaro".to_string(),
            country_code: "RD".to_string(),
            prices: HashMap::from([("SEDAN".to_string(), Some(dec!(60)))]),
        })
        .await
        .unwrap();

        let routes = route_repo.routes.lock().unwrap();
        assert_eq!(routes[0].zone_a_id, "bavaro");
        assert_eq!(routes[0].zone_b_id, "puj");
    }

    #[tokio::test]
    async fn test_upsert_rate_null_categories_untouched() {
        let (svc, _, route_repo) = service(
            vec![zone("bavaro", "bavaro", "RD"), zone("puj", "puj", "RD")],
            vec![
                vehicle("sedan-1", VehicleCategory::Sedan),
                vehicle("van-1", VehicleCategory::Van),
            ],
        );

        svc.upsert_rate(RateUpsert {
            origin_zone_id: "puj".to_string(),
            destination_zone_id: "bavaro".to_string(),
            country_code: "RD".to_string(),
            prices: HashMap::from([
                ("SEDAN".to_string(), Some(dec!(60))),
                ("VAN".to_string(), None),
            ]),
        })
        .await
        .unwrap();

        let prices = route_repo.prices.lock().unwrap();
        assert_eq!(prices.len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_rate_rejects_same_zone_and_country_mismatch() {
        let (svc, _, _) = service(
            vec![zone("bavaro", "bavaro", "RD"), zone("cancun", "cancun", "MX")],
            vec![vehicle("sedan-1", VehicleCategory::Sedan)],
        );

        let err = svc
            .upsert_rate(RateUpsert {
                origin_zone_id: "bavaro".to_string(),
                destination_zone_id: "bavaro".to_string(),
                country_code: "RD".to_string(),
                prices: HashMap::from([("SEDAN".to_string(), Some(dec!(60)))]),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));

        let err = svc
            .upsert_rate(RateUpsert {
                origin_zone_id: "bavaro".to_string(),
                destination_zone_id: "cancun".to_string(),
                country_code: "RD".to_string(),
                prices: HashMap::from([("SEDAN".to_string(), Some(dec!(60)))]),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "country_code"));
    }

    #[tokio::test]
    async fn test_upsert_rate_without_amounts_rejected() {
        let (svc, _, _) = service(
            vec![zone("bavaro", "bavaro", "RD"), zone("puj", "puj", "RD")],
            vec![],
        );

        let err = svc
            .upsert_rate(RateUpsert {
                origin_zone_id: "puj".to_string(),
                destination_zone_id: "bavaro".to_string(),
                country_code: "RD".to_string(),
                prices: HashMap::from([("SEDAN".to_string(), None)]),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "prices"));
    }

    #[tokio::test]
    async fn test_upsert_vehicle_validates_capacity_range() {
        let (svc, _, _) = service(vec![], vec![]);

        let err = svc
            .upsert_vehicle(VehicleUpsert {
                name: "Van".to_string(),
                slug: "van".to_string(),
                category: "VAN".to_string(),
                min_pax: 0,
                max_pax: 8,
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "min_pax"));

        let err = svc
            .upsert_vehicle(VehicleUpsert {
                name: "Van".to_string(),
                slug: "van".to_string(),
                category: "VAN".to_string(),
                min_pax: 5,
                max_pax: 4,
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "max_pax"));
    }

    #[tokio::test]
    async fn test_upsert_vehicle_unknown_id_rejected() {
        let (svc, _, _) = service(vec![], vec![]);

        let err = svc
            .upsert_vehicle(VehicleUpsert {
                id: Some("ghost".to_string()),
                name: "Van".to_string(),
                slug: "van".to_string(),
                category: "VAN".to_string(),
                min_pax: 1,
                max_pax: 8,
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::VehicleNotFound(_)));
    }

    #[tokio::test]
    async fn test_upsert_override_requires_one_side() {
        let (svc, _, _) = service(vec![], vec![vehicle("sedan-1", VehicleCategory::Sedan)]);

        let err = svc
            .upsert_override(OverrideUpsert {
                vehicle_id: "sedan-1".to_string(),
                price: dec!(70),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_upsert_override_idempotent_key() {
        let (svc, location_repo, route_repo) =
            service(vec![], vec![vehicle("sedan-1", VehicleCategory::Sedan)]);
        location_repo.locations.lock().unwrap().push(Location {
            id: "loc-hotel-x".to_string(),
            slug: "hotel-x".to_string(),
            ..Default::default()
        });

        let entry = |price| OverrideUpsert {
            vehicle_id: "sedan-1".to_string(),
            destination_location_id: Some("loc-hotel-x".to_string()),
            price,
            ..Default::default()
        };
        svc.upsert_override(entry(dec!(70))).await.unwrap();
        svc.upsert_override(entry(dec!(75))).await.unwrap();

        let overrides = route_repo.overrides.lock().unwrap();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0].price, dec!(75));
    }

    #[tokio::test]
    async fn test_delete_zone_refused_while_referenced() {
        let zone_repo = Arc::new(MockZoneRepository {
            zones: Mutex::new(vec![zone("bavaro", "bavaro", "RD")]),
            references: 3,
        });
        let svc = CatalogService::new(
            zone_repo,
            Arc::new(MockLocationRepository::default()),
            Arc::new(MockVehicleRepository::default()),
            Arc::new(MockRouteRepository::default()),
        );

        let err = svc.delete_zone("bavaro").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_zone_unknown_id() {
        let (svc, _, _) = service(vec![], vec![]);

        let err = svc.delete_zone("atlantis").await.unwrap_err();
        assert!(matches!(err, AppError::ZoneNotFound(_)));
    }

    #[tokio::test]
    async fn test_import_locations_reports_row_failures() {
        let (svc, location_repo, _) = service(vec![zone("bavaro", "bavaro", "RD")], vec![]);

        let rows = vec![
            LocationImportRow {
                name: "Hotel X".to_string(),
                slug: "hotel-x".to_string(),
                zone_slug: Some("bavaro".to_string()),
                ..Default::default()
            },
            LocationImportRow {
                name: "Hotel Y".to_string(),
                slug: "hotel-y".to_string(),
                zone_slug: Some("atlantis".to_string()),
                ..Default::default()
            },
            LocationImportRow {
                name: String::new(),
                slug: "hotel-z".to_string(),
                zone_slug: Some("bavaro".to_string()),
                ..Default::default()
            },
        ];

        let report = svc.import_locations(rows, None).await.unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].row, 2);
        assert_eq!(report.failures[1].row, 3);
        assert_eq!(location_repo.locations.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_import_locations_duplicate_slug_fails_later_rows() {
        let (svc, _, _) = service(vec![zone("bavaro", "bavaro", "RD")], vec![]);

        let row = |name: &str| LocationImportRow {
            name: name.to_string(),
            slug: "hotel-x".to_string(),
            zone_slug: Some("bavaro".to_string()),
            ..Default::default()
        };

        let report = svc
            .import_locations(vec![row("Hotel X"), row("Hotel X bis")], None)
            .await
            .unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].row, 2);
    }

    #[tokio::test]
    async fn test_import_locations_uses_default_zone() {
        let (svc, location_repo, _) = service(vec![zone("bavaro", "bavaro", "RD")], vec![]);

        let report = svc
            .import_locations(
                vec![LocationImportRow {
                    name: "Hotel X".to_string(),
                    slug: "hotel-x".to_string(),
                    ..Default::default()
                }],
                Some("bavaro".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(report.imported, 1);
        let locations = location_repo.locations.lock().unwrap();
        assert_eq!(locations[0].zone_id.as_deref(), Some("bavaro"));
        assert_eq!(locations[0].country_code, "RD");
    }
}
