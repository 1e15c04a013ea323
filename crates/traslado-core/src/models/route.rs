//! Route, price, and override models
//!
//! A route is an undirected pairing of two distinct zones, stored in
//! canonical order. Its tradable offering is the set of vehicles with a
//! base price entry; location-specific overrides take precedence over the
//! base price during quote resolution.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::location::Location;
use super::vehicle::Vehicle;

/// Route entity
///
/// Invariant: `zone_a_id < zone_b_id`, and a single row exists per pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    /// Unique identifier
    pub id: String,

    /// First zone of the canonical pair
    pub zone_a_id: String,

    /// Second zone of the canonical pair
    pub zone_b_id: String,

    /// Country the pair belongs to
    pub country_code: String,

    /// Whether the route is offered
    pub active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Default for Route {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            zone_a_id: String::new(),
            zone_b_id: String::new(),
            country_code: String::new(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Base price of one vehicle on one route
///
/// Exactly one row exists per `(route, vehicle)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePrice {
    /// Unique identifier
    pub id: String,

    /// Route the price belongs to
    pub route_id: String,

    /// Vehicle the price applies to
    pub vehicle_id: String,

    /// Base monetary amount
    pub price: Decimal,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Location-specific price exception
///
/// Keyed by `(vehicle, origin_location?, destination_location?)` with at
/// least one location side set. Lets an operator price one named hotel
/// differently from the rest of its zone without a dedicated route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceOverride {
    /// Unique identifier
    pub id: String,

    /// Vehicle the override applies to
    pub vehicle_id: String,

    /// Exact origin location, if the override is origin-specific
    pub origin_location_id: Option<String>,

    /// Exact destination location, if the override is destination-specific
    pub destination_location_id: Option<String>,

    /// Overriding monetary amount
    pub price: Decimal,

    /// Operator notes
    pub notes: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Default for PriceOverride {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            vehicle_id: String::new(),
            origin_location_id: None,
            destination_location_id: None,
            price: Decimal::ZERO,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A vehicle together with its base price on a route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricedVehicle {
    pub vehicle: Vehicle,
    pub price: Decimal,
}

/// A route loaded with its priced vehicles and the overrides relevant to
/// one origin/destination pair
#[derive(Debug, Clone)]
pub struct RouteDetail {
    pub route: Route,
    pub vehicles: Vec<PricedVehicle>,
    pub overrides: Vec<PriceOverride>,
}

/// Route row with aggregate pricing counts for operator listings
#[derive(Debug, Clone, Serialize)]
pub struct RouteSummary {
    pub route: Route,
    pub vehicle_count: i64,
    pub min_price: Option<Decimal>,
}

/// Fully resolved route context for one quote
///
/// Carries the route, its priced vehicles, the overrides relevant to the
/// two resolved locations, and the locations themselves.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Route,
    pub vehicles: Vec<PricedVehicle>,
    pub overrides: Vec<PriceOverride>,
    pub origin: Location,
    pub destination: Location,
}

/// Resolve the effective price for one vehicle
///
/// Precedence, first match wins:
/// 1. override with exact origin and exact destination,
/// 2. override with exact origin only,
/// 3. override with exact destination only,
/// 4. the base price.
///
/// Specificity dominates: a price negotiated for one named hotel beats a
/// zone-wide default, and an origin-specific override outranks a
/// destination-only one when both could apply.
pub fn effective_price(
    overrides: &[PriceOverride],
    vehicle_id: &str,
    origin_id: &str,
    destination_id: &str,
    base_price: Decimal,
) -> Decimal {
    let for_vehicle = || overrides.iter().filter(|o| o.vehicle_id == vehicle_id);

    let exact = for_vehicle().find(|o| {
        o.origin_location_id.as_deref() == Some(origin_id)
            && o.destination_location_id.as_deref() == Some(destination_id)
    });
    if let Some(o) = exact {
        return o.price;
    }

    let origin_only = for_vehicle().find(|o| {
        o.origin_location_id.as_deref() == Some(origin_id) && o.destination_location_id.is_none()
    });
    if let Some(o) = origin_only {
        return o.price;
    }

    let destination_only = for_vehicle().find(|o| {
        o.destination_location_id.as_deref() == Some(destination_id)
            && o.origin_location_id.is_none()
    });
    if let Some(o) = destination_only {
        return o.price;
    }

    base_price
}

impl RouteMatch {
    /// Priced vehicles whose capacity range covers the passenger count,
    /// each with its effective price resolved
    pub fn eligible_quotes(&self, passengers: i32) -> Vec<(Vehicle, Decimal)> {
        self.vehicles
            .iter()
            .filter(|pv| pv.vehicle.fits(passengers))
            .map(|pv| {
                let price = effective_price(
                    &self.overrides,
                    &pv.vehicle.id,
                    &self.origin.id,
                    &self.destination.id,
                    pv.price,
                );
                (pv.vehicle.clone(), price)
            })
            .collect()
    }
}
