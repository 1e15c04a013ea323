//! Vehicle repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use traslado_core::{
    models::{Vehicle, VehicleCategory},
    traits::VehicleRepository,
    AppError, AppResult,
};

use super::map_db_error;

/// PostgreSQL implementation of VehicleRepository
pub struct PgVehicleRepository {
    pool: PgPool,
}

impl PgVehicleRepository {
    /// Create a new vehicle repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const VEHICLE_COLUMNS: &str =
    "id, name, slug, category, min_pax, max_pax, image_url, active, created_at, updated_at";

#[async_trait]
impl VehicleRepository for PgVehicleRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Vehicle>> {
        let row = sqlx::query_as::<sqlx::Postgres, VehicleRow>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM transfer_vehicles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding vehicle {}: {}", id, e);
            AppError::Database(format!("Failed to find vehicle: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Vehicle>> {
        let row = sqlx::query_as::<sqlx::Postgres, VehicleRow>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM transfer_vehicles WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding vehicle by slug {}: {}", slug, e);
            AppError::Database(format!("Failed to find vehicle: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        active: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Vehicle>, i64)> {
        debug!("Listing vehicles active={:?} limit={} offset={}", active, limit, offset);

        let rows = sqlx::query_as::<sqlx::Postgres, VehicleRow>(&format!(
            r#"
            SELECT {VEHICLE_COLUMNS}
            FROM transfer_vehicles
            WHERE ($1::boolean IS NULL OR active = $1)
            ORDER BY category, min_pax
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(active)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing vehicles: {}", e);
            AppError::Database(format!("Failed to list vehicles: {}", e))
        })?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM transfer_vehicles WHERE ($1::boolean IS NULL OR active = $1)",
        )
        .bind(active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting vehicles: {}", e);
            AppError::Database(format!("Failed to count vehicles: {}", e))
        })?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }

    #[instrument(skip(self))]
    async fn find_active_by_category(
        &self,
        category: VehicleCategory,
    ) -> AppResult<Vec<Vehicle>> {
        debug!("Finding active vehicles of category {}", category);

        let rows = sqlx::query_as::<sqlx::Postgres, VehicleRow>(&format!(
            r#"
            SELECT {VEHICLE_COLUMNS}
            FROM transfer_vehicles
            WHERE category = $1 AND active = TRUE
            ORDER BY min_pax
            "#
        ))
        .bind(category.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding vehicles by category {}: {}", category, e);
            AppError::Database(format!("Failed to find vehicles: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, vehicle))]
    async fn upsert(&self, vehicle: &Vehicle) -> AppResult<Vehicle> {
        debug!("Upserting vehicle: {}", vehicle.slug);

        let row = sqlx::query_as::<sqlx::Postgres, VehicleRow>(&format!(
            r#"
            INSERT INTO transfer_vehicles
                (id, name, slug, category, min_pax, max_pax, image_url, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                slug = EXCLUDED.slug,
                category = EXCLUDED.category,
                min_pax = EXCLUDED.min_pax,
                max_pax = EXCLUDED.max_pax,
                image_url = EXCLUDED.image_url,
                updated_at = NOW()
            RETURNING {VEHICLE_COLUMNS}
            "#
        ))
        .bind(&vehicle.id)
        .bind(&vehicle.name)
        .bind(&vehicle.slug)
        .bind(vehicle.category.to_string())
        .bind(vehicle.min_pax)
        .bind(vehicle.max_pax)
        .bind(&vehicle.image_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to upsert vehicle", e))?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn set_active(&self, id: &str, active: bool) -> AppResult<Vehicle> {
        debug!("Setting vehicle {} active={}", id, active);

        let row = sqlx::query_as::<sqlx::Postgres, VehicleRow>(&format!(
            r#"
            UPDATE transfer_vehicles
            SET active = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {VEHICLE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error toggling vehicle {}: {}", id, e);
            AppError::Database(format!("Failed to update vehicle: {}", e))
        })?;

        row.map(Into::into)
            .ok_or_else(|| AppError::VehicleNotFound(id.to_string()))
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct VehicleRow {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub category: String,
    pub min_pax: i32,
    pub max_pax: i32,
    pub image_url: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VehicleRow> for Vehicle {
    fn from(row: VehicleRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            category: VehicleCategory::parse(&row.category).unwrap_or(VehicleCategory::Sedan),
            min_pax: row.min_pax,
            max_pax: row.max_pax,
            image_url: row.image_url,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_row_conversion() {
        let row = VehicleRow {
            id: "van-1".to_string(),
            name: "Van Estándar".to_string(),
            slug: "van-estandar".to_string(),
            category: "VAN".to_string(),
            min_pax: 4,
            max_pax: 8,
            image_url: None,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let vehicle: Vehicle = row.into();
        assert_eq!(vehicle.category, VehicleCategory::Van);
        assert!(vehicle.fits(8));
        assert!(!vehicle.fits(9));
    }
}
