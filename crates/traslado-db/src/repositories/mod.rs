//! Repository implementations for the catalog store

pub mod location_repo;
pub mod route_repo;
pub mod vehicle_repo;
pub mod zone_repo;

pub use location_repo::PgLocationRepository;
pub use route_repo::PgRouteRepository;
pub use vehicle_repo::PgVehicleRepository;
pub use zone_repo::PgZoneRepository;

use traslado_core::AppError;

/// PostgreSQL unique-violation SQLSTATE
const UNIQUE_VIOLATION: &str = "23505";

/// Map an sqlx error to `AppError`, turning unique violations into
/// conflicts so slug/key collisions surface as 409 instead of 500
pub(crate) fn map_db_error(context: &str, err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return AppError::Conflict(format!("{context}: duplicate key"));
        }
    }
    AppError::Database(format!("{context}: {err}"))
}
