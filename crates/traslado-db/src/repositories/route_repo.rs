//! Route repository implementation
//!
//! Routes are stored once per canonical zone pair. Callers canonicalize
//! before every call; the table's CHECK constraint rejects any write that
//! slipped through unordered.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use traslado_core::{
    models::{
        PriceOverride, PricedVehicle, Route, RouteDetail, RoutePrice, RouteSummary, Vehicle,
    },
    traits::RouteRepository,
    AppError, AppResult,
};
use uuid::Uuid;

use super::map_db_error;
use super::vehicle_repo::VehicleRow;

/// PostgreSQL implementation of RouteRepository
pub struct PgRouteRepository {
    pool: PgPool,
}

impl PgRouteRepository {
    /// Create a new route repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const ROUTE_COLUMNS: &str =
    "id, zone_a_id, zone_b_id, country_code, active, created_at, updated_at";

const OVERRIDE_COLUMNS: &str = "id, vehicle_id, origin_location_id, destination_location_id, \
                                price, notes, created_at, updated_at";

const ROUTE_UPSERT: &str = r#"
    INSERT INTO transfer_routes (id, zone_a_id, zone_b_id, country_code, active)
    VALUES ($1, $2, $3, $4, TRUE)
    ON CONFLICT (zone_a_id, zone_b_id) DO UPDATE SET
        country_code = EXCLUDED.country_code,
        active = TRUE,
        updated_at = NOW()
    RETURNING id, zone_a_id, zone_b_id, country_code, active, created_at, updated_at
"#;

const PRICE_UPSERT: &str = r#"
    INSERT INTO transfer_route_prices (id, route_id, vehicle_id, price)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (route_id, vehicle_id) DO UPDATE SET
        price = EXCLUDED.price,
        updated_at = NOW()
    RETURNING id, route_id, vehicle_id, price, created_at, updated_at
"#;

#[async_trait]
impl RouteRepository for PgRouteRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Route>> {
        let row = sqlx::query_as::<sqlx::Postgres, RouteRow>(&format!(
            "SELECT {ROUTE_COLUMNS} FROM transfer_routes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding route {}: {}", id, e);
            AppError::Database(format!("Failed to find route: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_by_zone_pair(
        &self,
        zone_a_id: &str,
        zone_b_id: &str,
    ) -> AppResult<Option<Route>> {
        debug!("Finding route for pair ({}, {})", zone_a_id, zone_b_id);

        let row = sqlx::query_as::<sqlx::Postgres, RouteRow>(&format!(
            "SELECT {ROUTE_COLUMNS} FROM transfer_routes WHERE zone_a_id = $1 AND zone_b_id = $2"
        ))
        .bind(zone_a_id)
        .bind(zone_b_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Database error finding route ({}, {}): {}",
                zone_a_id, zone_b_id, e
            );
            AppError::Database(format!("Failed to find route: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn load_detail(
        &self,
        zone_a_id: &str,
        zone_b_id: &str,
        origin_location_id: &str,
        destination_location_id: &str,
    ) -> AppResult<Option<RouteDetail>> {
        debug!(
            "Loading route detail for pair ({}, {})",
            zone_a_id, zone_b_id
        );

        let route = sqlx::query_as::<sqlx::Postgres, RouteRow>(&format!(
            r#"
            SELECT {ROUTE_COLUMNS} FROM transfer_routes
            WHERE zone_a_id = $1 AND zone_b_id = $2 AND active = TRUE
            "#
        ))
        .bind(zone_a_id)
        .bind(zone_b_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error loading route detail: {}", e);
            AppError::Database(format!("Failed to load route: {}", e))
        })?;

        let Some(route) = route else {
            return Ok(None);
        };

        // Priced offering: vehicles with a base price row, inactive ones excluded
        let price_rows = sqlx::query_as::<sqlx::Postgres, PricedVehicleRow>(
            r#"
            SELECT
                p.price,
                v.id, v.name, v.slug, v.category, v.min_pax, v.max_pax,
                v.image_url, v.active, v.created_at, v.updated_at
            FROM transfer_route_prices p
            JOIN transfer_vehicles v ON v.id = p.vehicle_id
            WHERE p.route_id = $1 AND v.active = TRUE
            ORDER BY p.price
            "#,
        )
        .bind(&route.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error loading route prices: {}", e);
            AppError::Database(format!("Failed to load route prices: {}", e))
        })?;

        // Overrides relevant to this origin/destination pair: exact-pair,
        // origin-only, and destination-only rows
        let override_rows = sqlx::query_as::<sqlx::Postgres, OverrideRow>(&format!(
            r#"
            SELECT {OVERRIDE_COLUMNS}
            FROM transfer_price_overrides
            WHERE (origin_location_id = $1 OR origin_location_id IS NULL)
              AND (destination_location_id = $2 OR destination_location_id IS NULL)
              AND (origin_location_id IS NOT NULL OR destination_location_id IS NOT NULL)
            "#
        ))
        .bind(origin_location_id)
        .bind(destination_location_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error loading overrides: {}", e);
            AppError::Database(format!("Failed to load overrides: {}", e))
        })?;

        Ok(Some(RouteDetail {
            route: route.into(),
            vehicles: price_rows.into_iter().map(Into::into).collect(),
            overrides: override_rows.into_iter().map(Into::into).collect(),
        }))
    }

    #[instrument(skip(self))]
    async fn list_summaries(
        &self,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<RouteSummary>, i64)> {
        let rows = sqlx::query_as::<sqlx::Postgres, RouteSummaryRow>(
            r#"
            SELECT
                r.id, r.zone_a_id, r.zone_b_id, r.country_code, r.active,
                r.created_at, r.updated_at,
                COUNT(p.id) AS vehicle_count,
                MIN(p.price) AS min_price
            FROM transfer_routes r
            LEFT JOIN transfer_route_prices p ON p.route_id = r.id
            GROUP BY r.id
            ORDER BY r.zone_a_id, r.zone_b_id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing routes: {}", e);
            AppError::Database(format!("Failed to list routes: {}", e))
        })?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transfer_routes")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting routes: {}", e);
                AppError::Database(format!("Failed to count routes: {}", e))
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }

    #[instrument(skip(self))]
    async fn upsert(
        &self,
        zone_a_id: &str,
        zone_b_id: &str,
        country_code: &str,
    ) -> AppResult<Route> {
        debug!("Upserting route ({}, {})", zone_a_id, zone_b_id);

        let row = sqlx::query_as::<sqlx::Postgres, RouteRow>(ROUTE_UPSERT)
            .bind(Uuid::new_v4().to_string())
            .bind(zone_a_id)
            .bind(zone_b_id)
            .bind(country_code)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to upsert route", e))?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn upsert_price(
        &self,
        route_id: &str,
        vehicle_id: &str,
        price: Decimal,
    ) -> AppResult<RoutePrice> {
        debug!("Upserting price for route {} vehicle {}", route_id, vehicle_id);

        let row = sqlx::query_as::<sqlx::Postgres, RoutePriceRow>(PRICE_UPSERT)
            .bind(Uuid::new_v4().to_string())
            .bind(route_id)
            .bind(vehicle_id)
            .bind(price)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to upsert route price", e))?;

        Ok(row.into())
    }

    #[instrument(skip(self, prices))]
    async fn upsert_rate(
        &self,
        zone_a_id: &str,
        zone_b_id: &str,
        country_code: &str,
        prices: &[(String, Decimal)],
    ) -> AppResult<Route> {
        debug!(
            "Upserting rate for pair ({}, {}) with {} price entries",
            zone_a_id,
            zone_b_id,
            prices.len()
        );

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        let route = sqlx::query_as::<sqlx::Postgres, RouteRow>(ROUTE_UPSERT)
            .bind(Uuid::new_v4().to_string())
            .bind(zone_a_id)
            .bind(zone_b_id)
            .bind(country_code)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_db_error("Failed to upsert route", e))?;

        for (vehicle_id, amount) in prices {
            sqlx::query(PRICE_UPSERT)
                .bind(Uuid::new_v4().to_string())
                .bind(&route.id)
                .bind(vehicle_id)
                .bind(amount)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_db_error("Failed to upsert route price", e))?;
        }

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        Ok(route.into())
    }

    #[instrument(skip(self, entry))]
    async fn upsert_override(&self, entry: &PriceOverride) -> AppResult<PriceOverride> {
        debug!(
            "Upserting override for vehicle {} ({:?} -> {:?})",
            entry.vehicle_id, entry.origin_location_id, entry.destination_location_id
        );

        let row = sqlx::query_as::<sqlx::Postgres, OverrideRow>(&format!(
            r#"
            INSERT INTO transfer_price_overrides
                (id, vehicle_id, origin_location_id, destination_location_id, price, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (vehicle_id, COALESCE(origin_location_id, ''), COALESCE(destination_location_id, ''))
            DO UPDATE SET
                price = EXCLUDED.price,
                notes = EXCLUDED.notes,
                updated_at = NOW()
            RETURNING {OVERRIDE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(&entry.vehicle_id)
        .bind(&entry.origin_location_id)
        .bind(&entry.destination_location_id)
        .bind(entry.price)
        .bind(&entry.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to upsert override", e))?;

        Ok(row.into())
    }
}

/// Helper struct for mapping route rows
#[derive(Debug, sqlx::FromRow)]
struct RouteRow {
    id: String,
    zone_a_id: String,
    zone_b_id: String,
    country_code: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RouteRow> for Route {
    fn from(row: RouteRow) -> Self {
        Self {
            id: row.id,
            zone_a_id: row.zone_a_id,
            zone_b_id: row.zone_b_id,
            country_code: row.country_code,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RoutePriceRow {
    id: String,
    route_id: String,
    vehicle_id: String,
    price: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RoutePriceRow> for RoutePrice {
    fn from(row: RoutePriceRow) -> Self {
        Self {
            id: row.id,
            route_id: row.route_id,
            vehicle_id: row.vehicle_id,
            price: row.price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Price row joined with its vehicle
#[derive(Debug, sqlx::FromRow)]
struct PricedVehicleRow {
    price: Decimal,
    #[sqlx(flatten)]
    vehicle: VehicleRow,
}

impl From<PricedVehicleRow> for PricedVehicle {
    fn from(row: PricedVehicleRow) -> Self {
        Self {
            vehicle: Vehicle::from(row.vehicle),
            price: row.price,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OverrideRow {
    id: String,
    vehicle_id: String,
    origin_location_id: Option<String>,
    destination_location_id: Option<String>,
    price: Decimal,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OverrideRow> for PriceOverride {
    fn from(row: OverrideRow) -> Self {
        Self {
            id: row.id,
            vehicle_id: row.vehicle_id,
            origin_location_id: row.origin_location_id,
            destination_location_id: row.destination_location_id,
            price: row.price,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RouteSummaryRow {
    id: String,
    zone_a_id: String,
    zone_b_id: String,
    country_code: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    vehicle_count: i64,
    min_price: Option<Decimal>,
}

impl From<RouteSummaryRow> for RouteSummary {
    fn from(row: RouteSummaryRow) -> Self {
        Self {
            route: Route {
                id: row.id,
                zone_a_id: row.zone_a_id,
                zone_b_id: row.zone_b_id,
                country_code: row.country_code,
                active: row.active,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            vehicle_count: row.vehicle_count,
            min_price: row.min_price,
        }
    }
}
