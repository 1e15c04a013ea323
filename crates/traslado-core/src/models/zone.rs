//! Zone model
//!
//! A zone is the pricing granularity of the catalog: a geographic grouping
//! of locations within one country. Routes connect zone pairs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display-only zone metadata
///
/// Micro-zones and featured hotel names are shown on landing pages; they are
/// never an input to route or price resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ZoneMeta {
    #[serde(default)]
    pub microzones: Vec<String>,

    #[serde(default)]
    pub featured_hotels: Vec<String>,
}

impl ZoneMeta {
    /// Build metadata from operator input, dropping blank entries
    pub fn sanitized(microzones: Vec<String>, featured_hotels: Vec<String>) -> Self {
        let keep = |items: Vec<String>| -> Vec<String> {
            items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };
        Self {
            microzones: keep(microzones),
            featured_hotels: keep(featured_hotels),
        }
    }
}

/// Zone entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    /// Unique identifier; zones created without an explicit id use their
    /// slug as the natural key
    pub id: String,

    /// Display name
    pub name: String,

    /// URL-safe unique slug
    pub slug: String,

    /// ISO country code
    pub country_code: String,

    /// Optional description
    pub description: Option<String>,

    /// Display-only metadata
    pub meta: ZoneMeta,

    /// Whether the zone participates in resolution
    pub active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Default for Zone {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            name: String::new(),
            slug: String::new(),
            country_code: String::new(),
            description: None,
            meta: ZoneMeta::default(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Canonical ordering of a zone pair
///
/// A route between zones A and B is stored once regardless of travel
/// direction, so both write and read paths must order the pair the same
/// way. Plain byte comparison of the zone identifiers is the total, stable
/// ordering used everywhere.
pub fn canonical_zone_pair<'a>(zone_a: &'a str, zone_b: &'a str) -> (&'a str, &'a str) {
    if zone_a <= zone_b {
        (zone_a, zone_b)
    } else {
        (zone_b, zone_a)
    }
}
