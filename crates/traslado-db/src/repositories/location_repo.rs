//! Location repository implementation
//!
//! Locations upsert by slug; the pricing-override shortcut accepted by the
//! mutation API is written as destination-keyed override rows in the same
//! transaction as the location row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use traslado_core::{
    models::{Location, LocationType},
    traits::LocationRepository,
    AppError, AppResult,
};
use uuid::Uuid;

use super::map_db_error;

/// PostgreSQL implementation of LocationRepository
pub struct PgLocationRepository {
    pool: PgPool,
}

impl PgLocationRepository {
    /// Create a new location repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const LOCATION_COLUMNS: &str = "id, zone_id, name, slug, location_type, address, description, \
                                country_code, active, created_at, updated_at";

#[async_trait]
impl LocationRepository for PgLocationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Location>> {
        let row = sqlx::query_as::<sqlx::Postgres, LocationRow>(&format!(
            "SELECT {LOCATION_COLUMNS} FROM transfer_locations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding location {}: {}", id, e);
            AppError::Database(format!("Failed to find location: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Location>> {
        debug!("Finding location by slug: {}", slug);

        let row = sqlx::query_as::<sqlx::Postgres, LocationRow>(&format!(
            "SELECT {LOCATION_COLUMNS} FROM transfer_locations WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding location by slug {}: {}", slug, e);
            AppError::Database(format!("Failed to find location: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        active: Option<bool>,
        zone_id: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Location>, i64)> {
        debug!(
            "Listing locations active={:?} zone={:?} limit={} offset={}",
            active, zone_id, limit, offset
        );

        let rows = sqlx::query_as::<sqlx::Postgres, LocationRow>(&format!(
            r#"
            SELECT {LOCATION_COLUMNS}
            FROM transfer_locations
            WHERE ($1::boolean IS NULL OR active = $1)
              AND ($2::text IS NULL OR zone_id = $2)
            ORDER BY name
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(active)
        .bind(zone_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing locations: {}", e);
            AppError::Database(format!("Failed to list locations: {}", e))
        })?;

        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM transfer_locations
            WHERE ($1::boolean IS NULL OR active = $1)
              AND ($2::text IS NULL OR zone_id = $2)
            "#,
        )
        .bind(active)
        .bind(zone_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting locations: {}", e);
            AppError::Database(format!("Failed to count locations: {}", e))
        })?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }

    #[instrument(skip(self, location, destination_overrides))]
    async fn upsert(
        &self,
        location: &Location,
        destination_overrides: &[(String, Decimal)],
    ) -> AppResult<Location> {
        debug!(
            "Upserting location {} with {} destination overrides",
            location.slug,
            destination_overrides.len()
        );

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        let row = sqlx::query_as::<sqlx::Postgres, LocationRow>(&format!(
            r#"
            INSERT INTO transfer_locations
                (id, zone_id, name, slug, location_type, address, description, country_code, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE)
            ON CONFLICT (slug) DO UPDATE SET
                zone_id = EXCLUDED.zone_id,
                name = EXCLUDED.name,
                location_type = EXCLUDED.location_type,
                address = EXCLUDED.address,
                description = EXCLUDED.description,
                country_code = EXCLUDED.country_code,
                active = TRUE,
                updated_at = NOW()
            RETURNING {LOCATION_COLUMNS}
            "#
        ))
        .bind(&location.id)
        .bind(&location.zone_id)
        .bind(&location.name)
        .bind(&location.slug)
        .bind(location.location_type.to_string())
        .bind(&location.address)
        .bind(&location.description)
        .bind(&location.country_code)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_error("Failed to upsert location", e))?;

        // The JSON-map shortcut expands into normalized override rows keyed
        // by destination = this location, one row per vehicle
        for (vehicle_id, amount) in destination_overrides {
            sqlx::query(
                r#"
                INSERT INTO transfer_price_overrides
                    (id, vehicle_id, origin_location_id, destination_location_id, price)
                VALUES ($1, $2, NULL, $3, $4)
                ON CONFLICT (vehicle_id, COALESCE(origin_location_id, ''), COALESCE(destination_location_id, ''))
                DO UPDATE SET price = EXCLUDED.price, updated_at = NOW()
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(vehicle_id)
            .bind(&row.id)
            .bind(amount)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error("Failed to upsert location override", e))?;
        }

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn set_active(&self, id: &str, active: bool) -> AppResult<Location> {
        debug!("Setting location {} active={}", id, active);

        let row = sqlx::query_as::<sqlx::Postgres, LocationRow>(&format!(
            r#"
            UPDATE transfer_locations
            SET active = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {LOCATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error toggling location {}: {}", id, e);
            AppError::Database(format!("Failed to update location: {}", e))
        })?;

        row.map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("location {id}")))
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct LocationRow {
    id: String,
    zone_id: Option<String>,
    name: String,
    slug: String,
    location_type: String,
    address: Option<String>,
    description: Option<String>,
    country_code: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Self {
            id: row.id,
            zone_id: row.zone_id,
            name: row.name,
            slug: row.slug,
            location_type: LocationType::parse(&row.location_type).unwrap_or_default(),
            address: row.address,
            description: row.description,
            country_code: row.country_code,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
