//! Legacy fallback rate table
//!
//! A read-only price index built from historical data, consulted only when
//! no dynamic route answers a zone pair. It carries at most one amount per
//! vehicle category and has no override concept. Same-zone pairs are legal
//! here even though dynamic routes require two distinct zones.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::error::AppError;
use crate::models::{canonical_zone_pair, VehicleCategory};
use crate::AppResult;

const EMBEDDED_TABLE: &str = include_str!("../data/legacy_rates.json");

/// One zone node of the source document
#[derive(Debug, Clone, Deserialize)]
struct LegacyNode {
    id: String,
    name: String,
    #[serde(default)]
    microzones: Vec<String>,
    #[serde(default)]
    featured_hotels: Vec<String>,
    #[serde(default)]
    transfers: HashMap<String, HashMap<VehicleCategory, Decimal>>,
}

#[derive(Debug, Deserialize)]
struct LegacyDocument {
    nodes: Vec<LegacyNode>,
}

/// Display metadata for a legacy zone
#[derive(Debug, Clone)]
pub struct LegacyZoneInfo {
    pub id: String,
    pub name: String,
    pub microzones: Vec<String>,
    pub featured_hotels: Vec<String>,
}

/// In-memory legacy rate index
///
/// Rates are keyed by the canonical zone pair at load time; the source
/// document lists both travel directions with identical amounts, and the
/// first direction encountered wins.
#[derive(Debug, Clone, Default)]
pub struct LegacyRateTable {
    zones: Vec<LegacyZoneInfo>,
    rates: HashMap<(String, String), HashMap<VehicleCategory, Decimal>>,
}

impl LegacyRateTable {
    /// Parse a rate table from a JSON document
    pub fn from_json(json: &str) -> AppResult<Self> {
        let doc: LegacyDocument = serde_json::from_str(json)?;

        let mut zones = Vec::with_capacity(doc.nodes.len());
        let mut rates: HashMap<(String, String), HashMap<VehicleCategory, Decimal>> =
            HashMap::new();

        for node in doc.nodes {
            for (destination, amounts) in &node.transfers {
                let (first, second) = canonical_zone_pair(&node.id, destination);
                rates
                    .entry((first.to_string(), second.to_string()))
                    .or_insert_with(|| amounts.clone());
            }
            zones.push(LegacyZoneInfo {
                id: node.id,
                name: node.name,
                microzones: node.microzones,
                featured_hotels: node.featured_hotels,
            });
        }

        Ok(Self { zones, rates })
    }

    /// Load the table embedded in the binary
    pub fn embedded() -> AppResult<Self> {
        Self::from_json(EMBEDDED_TABLE)
    }

    /// Load from an operator-supplied file, or the embedded table when no
    /// path is given
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        match path {
            Some(p) => {
                let json = std::fs::read_to_string(p).map_err(|e| {
                    AppError::Config(format!(
                        "Failed to read legacy rate table {}: {}",
                        p.display(),
                        e
                    ))
                })?;
                Self::from_json(&json)
            }
            None => Self::embedded(),
        }
    }

    /// All category amounts for a zone pair, direction-independent
    pub fn pair_rates(
        &self,
        zone_x: &str,
        zone_y: &str,
    ) -> Option<&HashMap<VehicleCategory, Decimal>> {
        let (first, second) = canonical_zone_pair(zone_x, zone_y);
        self.rates.get(&(first.to_string(), second.to_string()))
    }

    /// Amount for one category on a zone pair; absent categories return
    /// `None`, never a zero sentinel
    pub fn lookup(&self, zone_x: &str, zone_y: &str, category: VehicleCategory) -> Option<Decimal> {
        self.pair_rates(zone_x, zone_y)
            .and_then(|amounts| amounts.get(&category).copied())
    }

    /// Display metadata for a legacy zone id
    pub fn zone(&self, id: &str) -> Option<&LegacyZoneInfo> {
        self.zones.iter().find(|z| z.id == id)
    }

    /// All legacy zones
    pub fn zones(&self) -> &[LegacyZoneInfo] {
        &self.zones
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_embedded_table_parses() {
        let table = LegacyRateTable::embedded().unwrap();
        assert_eq!(table.zones().len(), 7);
        assert!(table.zone("PUJ_BAVARO").is_some());
        assert!(table.zone("ATLANTIS").is_none());
    }

    #[test]
    fn test_lookup_is_direction_independent() {
        let table = LegacyRateTable::embedded().unwrap();
        let forward = table.lookup("PUJ_BAVARO", "SANTO_DOMINGO", VehicleCategory::Sedan);
        let backward = table.lookup("SANTO_DOMINGO", "PUJ_BAVARO", VehicleCategory::Sedan);
        assert_eq!(forward, Some(dec!(175)));
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_lookup_same_zone_pair() {
        let table = LegacyRateTable::embedded().unwrap();
        assert_eq!(
            table.lookup("SAMANA", "SAMANA", VehicleCategory::Van),
            Some(dec!(95))
        );
    }

    #[test]
    fn test_absent_category_returns_none() {
        let table = LegacyRateTable::from_json(
            r#"{"nodes":[{"id":"A","name":"A","transfers":{"B":{"SEDAN":55}}},
                         {"id":"B","name":"B","transfers":{}}]}"#,
        )
        .unwrap();
        assert_eq!(table.lookup("A", "B", VehicleCategory::Sedan), Some(dec!(55)));
        assert_eq!(table.lookup("A", "B", VehicleCategory::Van), None);
        assert_eq!(table.lookup("A", "C", VehicleCategory::Sedan), None);
    }

    #[test]
    fn test_pair_rates_absent_pair() {
        let table = LegacyRateTable::embedded().unwrap();
        assert!(table.pair_rates("PUJ_BAVARO", "NOWHERE").is_none());
    }
}
