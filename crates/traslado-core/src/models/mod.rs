//! Domain models for the transfer pricing engine

pub mod location;
pub mod route;
pub mod vehicle;
pub mod zone;

pub use location::{Location, LocationType};
pub use route::{
    effective_price, PriceOverride, PricedVehicle, Route, RouteDetail, RouteMatch, RoutePrice,
    RouteSummary,
};
pub use vehicle::{Vehicle, VehicleCategory};
pub use zone::{canonical_zone_pair, Zone, ZoneMeta};
