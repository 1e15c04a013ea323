//! Location model
//!
//! A location is a physical pickup or dropoff point: a hotel, an airport
//! terminal, or a named place. Locations belong to at most one zone and are
//! deactivated rather than deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Location type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum LocationType {
    #[default]
    Hotel,
    Airport,
    Place,
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationType::Hotel => write!(f, "HOTEL"),
            LocationType::Airport => write!(f, "AIRPORT"),
            LocationType::Place => write!(f, "PLACE"),
        }
    }
}

impl LocationType {
    /// Parse from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "HOTEL" => Some(LocationType::Hotel),
            "AIRPORT" => Some(LocationType::Airport),
            "PLACE" => Some(LocationType::Place),
            _ => None,
        }
    }
}

/// Location entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    /// Unique identifier
    pub id: String,

    /// Zone membership; a location may stay unzoned until an operator
    /// assigns it, and cannot be priced until then
    pub zone_id: Option<String>,

    /// Display name
    pub name: String,

    /// URL-safe unique slug
    pub slug: String,

    /// Location type
    pub location_type: LocationType,

    /// Street address
    pub address: Option<String>,

    /// Optional description
    pub description: Option<String>,

    /// Country code, denormalized from the zone at upsert time
    pub country_code: String,

    /// Whether the location is offered; inactive locations never resolve
    pub active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Default for Location {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            zone_id: None,
            name: String::new(),
            slug: String::new(),
            location_type: LocationType::Hotel,
            address: None,
            description: None,
            country_code: String::new(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
