//! Vehicle model
//!
//! Vehicles are global categories with a passenger capacity range; a route
//! offers the subset of vehicles that carry a price entry on it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Vehicle category enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VehicleCategory {
    Sedan,
    Van,
    Suv,
    Vip,
    Bus,
}

impl VehicleCategory {
    /// All known categories, in display order
    pub const ALL: [VehicleCategory; 5] = [
        VehicleCategory::Sedan,
        VehicleCategory::Van,
        VehicleCategory::Suv,
        VehicleCategory::Vip,
        VehicleCategory::Bus,
    ];

    /// Parse from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "SEDAN" => Some(VehicleCategory::Sedan),
            "VAN" => Some(VehicleCategory::Van),
            "SUV" => Some(VehicleCategory::Suv),
            "VIP" => Some(VehicleCategory::Vip),
            "BUS" => Some(VehicleCategory::Bus),
            _ => None,
        }
    }
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleCategory::Sedan => write!(f, "SEDAN"),
            VehicleCategory::Van => write!(f, "VAN"),
            VehicleCategory::Suv => write!(f, "SUV"),
            VehicleCategory::Vip => write!(f, "VIP"),
            VehicleCategory::Bus => write!(f, "BUS"),
        }
    }
}

/// Vehicle entity
///
/// Capacity bounds are inclusive on both ends; `min_pax <= max_pax` always
/// holds for persisted rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    /// Unique identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// URL-safe unique slug
    pub slug: String,

    /// Category
    pub category: VehicleCategory,

    /// Minimum passenger count served
    pub min_pax: i32,

    /// Maximum passenger count served
    pub max_pax: i32,

    /// Optional image URL for display
    pub image_url: Option<String>,

    /// Whether the vehicle is offered
    pub active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Whether this vehicle can serve the requested passenger count
    #[inline]
    pub fn fits(&self, passengers: i32) -> bool {
        self.min_pax <= passengers && passengers <= self.max_pax
    }
}

impl Default for Vehicle {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            name: String::new(),
            slug: String::new(),
            category: VehicleCategory::Sedan,
            min_pax: 1,
            max_pax: 1,
            image_url: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
