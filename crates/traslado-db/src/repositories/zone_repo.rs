//! Zone repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use traslado_core::{
    models::{Zone, ZoneMeta},
    traits::ZoneRepository,
    AppError, AppResult,
};

use super::map_db_error;

/// PostgreSQL implementation of ZoneRepository
pub struct PgZoneRepository {
    pool: PgPool,
}

impl PgZoneRepository {
    /// Create a new zone repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const ZONE_COLUMNS: &str =
    "id, name, slug, country_code, description, meta, active, created_at, updated_at";

#[async_trait]
impl ZoneRepository for PgZoneRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Zone>> {
        debug!("Finding zone by id: {}", id);

        let row = sqlx::query_as::<sqlx::Postgres, ZoneRow>(&format!(
            "SELECT {ZONE_COLUMNS} FROM transfer_zones WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding zone {}: {}", id, e);
            AppError::Database(format!("Failed to find zone: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Zone>> {
        let row = sqlx::query_as::<sqlx::Postgres, ZoneRow>(&format!(
            "SELECT {ZONE_COLUMNS} FROM transfer_zones WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding zone by slug {}: {}", slug, e);
            AppError::Database(format!("Failed to find zone: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        active: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Zone>, i64)> {
        debug!("Listing zones active={:?} limit={} offset={}", active, limit, offset);

        let rows = sqlx::query_as::<sqlx::Postgres, ZoneRow>(&format!(
            r#"
            SELECT {ZONE_COLUMNS}
            FROM transfer_zones
            WHERE ($1::boolean IS NULL OR active = $1)
            ORDER BY name
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(active)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing zones: {}", e);
            AppError::Database(format!("Failed to list zones: {}", e))
        })?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM transfer_zones WHERE ($1::boolean IS NULL OR active = $1)",
        )
        .bind(active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting zones: {}", e);
            AppError::Database(format!("Failed to count zones: {}", e))
        })?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }

    #[instrument(skip(self, zone))]
    async fn upsert(&self, zone: &Zone) -> AppResult<Zone> {
        debug!("Upserting zone: {}", zone.id);

        let meta = serde_json::to_value(&zone.meta)?;

        let row = sqlx::query_as::<sqlx::Postgres, ZoneRow>(&format!(
            r#"
            INSERT INTO transfer_zones (id, name, slug, country_code, description, meta, active)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                slug = EXCLUDED.slug,
                country_code = EXCLUDED.country_code,
                description = EXCLUDED.description,
                meta = EXCLUDED.meta,
                active = TRUE,
                updated_at = NOW()
            RETURNING {ZONE_COLUMNS}
            "#
        ))
        .bind(&zone.id)
        .bind(&zone.name)
        .bind(&zone.slug)
        .bind(&zone.country_code)
        .bind(&zone.description)
        .bind(meta)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to upsert zone", e))?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> AppResult<bool> {
        debug!("Deleting zone: {}", id);

        let result = sqlx::query("DELETE FROM transfer_zones WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting zone {}: {}", id, e);
                AppError::Database(format!("Failed to delete zone: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn count_references(&self, id: &str) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM transfer_locations WHERE zone_id = $1)
              + (SELECT COUNT(*) FROM transfer_routes WHERE zone_a_id = $1 OR zone_b_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting zone references {}: {}", id, e);
            AppError::Database(format!("Failed to count zone references: {}", e))
        })?;

        Ok(result.0)
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct ZoneRow {
    id: String,
    name: String,
    slug: String,
    country_code: String,
    description: Option<String>,
    meta: serde_json::Value,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ZoneRow> for Zone {
    fn from(row: ZoneRow) -> Self {
        let meta: ZoneMeta = serde_json::from_value(row.meta).unwrap_or_default();
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            country_code: row.country_code,
            description: row.description,
            meta,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
