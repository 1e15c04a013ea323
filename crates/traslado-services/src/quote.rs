//! Quote resolution service
//!
//! Resolves a transfer quote from an origin slug, a destination slug and a
//! passenger count: locations to zones, zones to a canonical pair, pair to
//! an active route with prices and overrides, falling back to the legacy
//! rate table when no route is configured. The response never reveals which
//! source answered.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use traslado_core::{
    legacy::LegacyRateTable,
    models::{canonical_zone_pair, Location, RouteMatch, Vehicle},
    traits::{LocationRepository, RouteRepository, VehicleRepository},
    AppError, AppResult,
};

use rust_decimal::Decimal;

/// One priced vehicle option in a quote
#[derive(Debug, Clone, Serialize)]
pub struct VehicleQuote {
    pub vehicle_id: String,
    pub name: String,
    pub category: String,
    pub min_pax: i32,
    pub max_pax: i32,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl VehicleQuote {
    fn new(vehicle: Vehicle, price: Decimal) -> Self {
        Self {
            vehicle_id: vehicle.id,
            name: vehicle.name,
            category: vehicle.category.to_string(),
            min_pax: vehicle.min_pax,
            max_pax: vehicle.max_pax,
            price,
            image_url: vehicle.image_url,
        }
    }
}

/// A resolved quote: every eligible vehicle with its effective price,
/// cheapest first
#[derive(Debug, Clone, Serialize)]
pub struct Quote {
    pub currency: String,
    pub vehicles: Vec<VehicleQuote>,
}

/// Quote resolution service
pub struct QuoteService<L, R, V>
where
    L: LocationRepository,
    R: RouteRepository,
    V: VehicleRepository,
{
    location_repo: Arc<L>,
    route_repo: Arc<R>,
    vehicle_repo: Arc<V>,
    legacy: Arc<LegacyRateTable>,
    currency: String,
}

impl<L, R, V> QuoteService<L, R, V>
where
    L: LocationRepository,
    R: RouteRepository,
    V: VehicleRepository,
{
    /// Create a new quote service
    pub fn new(
        location_repo: Arc<L>,
        route_repo: Arc<R>,
        vehicle_repo: Arc<V>,
        legacy: Arc<LegacyRateTable>,
        currency: String,
    ) -> Self {
        Self {
            location_repo,
            route_repo,
            vehicle_repo,
            legacy,
            currency,
        }
    }

    /// Resolve a quote for one trip
    #[instrument(skip(self))]
    pub async fn quote(
        &self,
        origin_slug: &str,
        destination_slug: &str,
        passengers: i32,
    ) -> AppResult<Quote> {
        if passengers < 1 {
            return Err(AppError::validation(
                "passengers",
                "passenger count must be at least 1",
            ));
        }
        if origin_slug == destination_slug {
            return Err(AppError::validation(
                "destination",
                "origin and destination must differ",
            ));
        }

        let origin = self.resolve_location(origin_slug).await?;
        let destination = self.resolve_location(destination_slug).await?;

        let origin_zone = require_zone(&origin)?;
        let destination_zone = require_zone(&destination)?;

        let (zone_a, zone_b) = canonical_zone_pair(&origin_zone, &destination_zone);
        debug!(
            "Resolving quote {} -> {} ({} pax) over pair ({}, {})",
            origin_slug, destination_slug, passengers, zone_a, zone_b
        );

        let detail = self
            .route_repo
            .load_detail(zone_a, zone_b, &origin.id, &destination.id)
            .await?;

        // A route with zero price rows is unconfigured in practice
        let mut quotes = match detail.filter(|d| !d.vehicles.is_empty()) {
            Some(detail) => RouteMatch {
                route: detail.route,
                vehicles: detail.vehicles,
                overrides: detail.overrides,
                origin,
                destination,
            }
            .eligible_quotes(passengers),
            None => {
                self.legacy_quotes(&origin_zone, &destination_zone, passengers)
                    .await?
            }
        };

        if quotes.is_empty() {
            debug!("No vehicle covers {} passengers", passengers);
            return Err(AppError::NoVehicleForPassengerCount { passengers });
        }

        quotes.sort_by(|(va, pa), (vb, pb)| pa.cmp(pb).then_with(|| va.name.cmp(&vb.name)));

        Ok(Quote {
            currency: self.currency.clone(),
            vehicles: quotes
                .into_iter()
                .map(|(vehicle, price)| VehicleQuote::new(vehicle, price))
                .collect(),
        })
    }

    /// Load an active location by slug
    async fn resolve_location(&self, slug: &str) -> AppResult<Location> {
        match self.location_repo.find_by_slug(slug).await? {
            Some(location) if location.active => Ok(location),
            Some(_) => {
                warn!("Location {} is inactive", slug);
                Err(AppError::LocationNotFound(slug.to_string()))
            }
            None => Err(AppError::LocationNotFound(slug.to_string())),
        }
    }

    /// Materialize legacy rates through the vehicle catalog
    ///
    /// Each category amount applies to every active catalog vehicle of that
    /// category; the capacity filter applies here exactly as it does on the
    /// dynamic path. Categories with no catalog vehicle are skipped. An
    /// absent legacy pair leaves the route-not-configured outcome standing.
    async fn legacy_quotes(
        &self,
        origin_zone: &str,
        destination_zone: &str,
        passengers: i32,
    ) -> AppResult<Vec<(Vehicle, Decimal)>> {
        let Some(rates) = self.legacy.pair_rates(origin_zone, destination_zone) else {
            debug!(
                "No legacy rates for pair ({}, {})",
                origin_zone, destination_zone
            );
            return Err(AppError::RouteNotConfigured {
                origin_zone: origin_zone.to_string(),
                destination_zone: destination_zone.to_string(),
            });
        };

        let mut quotes = Vec::new();
        for (category, amount) in rates {
            let vehicles = self.vehicle_repo.find_active_by_category(*category).await?;
            for vehicle in vehicles {
                if vehicle.fits(passengers) {
                    quotes.push((vehicle, *amount));
                }
            }
        }
        Ok(quotes)
    }
}

fn require_zone(location: &Location) -> AppResult<String> {
    location
        .zone_id
        .clone()
        .ok_or_else(|| AppError::LocationUnzoned(location.slug.clone()))
}
