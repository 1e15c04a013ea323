//! Catalog handlers
//!
//! HTTP handlers for the catalog mutation and listing endpoints. Mutations
//! delegate to `CatalogService`; listings read through the repositories
//! directly.

use crate::dto::catalog::{
    ActiveFilterParams, ActiveToggleRequest, LocationFilterParams, LocationImportRequest,
    LocationResponse, LocationUpsertRequest, OverrideUpsertRequest, RateUpsertRequest,
    RoutePriceRequest, RouteSummaryResponse, RouteUpsertRequest, VehicleResponse,
    VehicleUpsertRequest, ZoneResponse, ZoneUpsertRequest,
};
use crate::dto::{ApiResponse, PaginationParams};
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use traslado_core::{models::LocationType, traits::{LocationRepository, RouteRepository, VehicleRepository, ZoneRepository}, AppError};
use traslado_db::{
    PgLocationRepository, PgRouteRepository, PgVehicleRepository, PgZoneRepository,
};
use traslado_services::CatalogService;
use validator::Validate;

type PgCatalogService = CatalogService<
    PgZoneRepository,
    PgLocationRepository,
    PgVehicleRepository,
    PgRouteRepository,
>;

fn catalog_service(pool: &PgPool) -> PgCatalogService {
    CatalogService::new(
        Arc::new(PgZoneRepository::new(pool.clone())),
        Arc::new(PgLocationRepository::new(pool.clone())),
        Arc::new(PgVehicleRepository::new(pool.clone())),
        Arc::new(PgRouteRepository::new(pool.clone())),
    )
}

fn validated<T: Validate>(req: &T, what: &str) -> Result<(), AppError> {
    req.validate().map_err(|e| {
        warn!("{} validation failed: {}", what, e);
        AppError::from(e)
    })
}

/// Upsert a zone
///
/// POST /api/v1/catalog/zones
#[instrument(skip(pool, req))]
pub async fn upsert_zone(
    pool: web::Data<PgPool>,
    req: web::Json<ZoneUpsertRequest>,
) -> Result<HttpResponse, AppError> {
    validated(&*req, "Zone upsert")?;
    debug!(slug = %req.slug, "Upserting zone");

    let zone = catalog_service(pool.get_ref())
        .upsert_zone(req.into_inner().into())
        .await?;

    info!(id = %zone.id, "Zone upserted");
    Ok(HttpResponse::Ok().json(ApiResponse::success(ZoneResponse::from(zone))))
}

/// List zones
///
/// GET /api/v1/catalog/zones
#[instrument(skip(pool))]
pub async fn list_zones(
    pool: web::Data<PgPool>,
    query: web::Query<PaginationParams>,
    filters: web::Query<ActiveFilterParams>,
) -> Result<HttpResponse, AppError> {
    validated(&*query, "Pagination")?;

    let repo = PgZoneRepository::new(pool.get_ref().clone());
    let (zones, total) = repo
        .list(filters.active, query.limit(), query.offset())
        .await?;

    let data: Vec<ZoneResponse> = zones.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(query.paginate(data, total)))
}

/// Delete a zone
///
/// DELETE /api/v1/catalog/zones/{id}
#[instrument(skip(pool))]
pub async fn delete_zone(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let zone_id = path.into_inner();
    catalog_service(pool.get_ref()).delete_zone(&zone_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Upsert a location
///
/// POST /api/v1/catalog/locations
#[instrument(skip(pool, req))]
pub async fn upsert_location(
    pool: web::Data<PgPool>,
    req: web::Json<LocationUpsertRequest>,
) -> Result<HttpResponse, AppError> {
    validated(&*req, "Location upsert")?;
    debug!(slug = %req.slug, "Upserting location");

    let req = req.into_inner();
    let location_type = LocationType::parse(&req.location_type)
        .ok_or_else(|| AppError::validation("location_type", "unknown location type"))?;

    let location = catalog_service(pool.get_ref())
        .upsert_location(req.into_command(location_type))
        .await?;

    info!(slug = %location.slug, "Location upserted");
    Ok(HttpResponse::Ok().json(ApiResponse::success(LocationResponse::from(location))))
}

/// List locations
///
/// GET /api/v1/catalog/locations
#[instrument(skip(pool))]
pub async fn list_locations(
    pool: web::Data<PgPool>,
    query: web::Query<PaginationParams>,
    filters: web::Query<LocationFilterParams>,
) -> Result<HttpResponse, AppError> {
    validated(&*query, "Pagination")?;

    let repo = PgLocationRepository::new(pool.get_ref().clone());
    let (locations, total) = repo
        .list(
            filters.active,
            filters.zone_id.as_deref(),
            query.limit(),
            query.offset(),
        )
        .await?;

    let data: Vec<LocationResponse> = locations.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(query.paginate(data, total)))
}

/// Bulk import locations
///
/// POST /api/v1/catalog/locations/import
#[instrument(skip(pool, req))]
pub async fn import_locations(
    pool: web::Data<PgPool>,
    req: web::Json<LocationImportRequest>,
) -> Result<HttpResponse, AppError> {
    validated(&*req, "Location import")?;
    debug!(rows = req.rows.len(), "Importing locations");

    let req = req.into_inner();
    let report = catalog_service(pool.get_ref())
        .import_locations(req.rows, req.default_zone_id)
        .await?;

    info!(
        imported = report.imported,
        failures = report.failures.len(),
        "Location import finished"
    );
    Ok(HttpResponse::Ok().json(ApiResponse::success(report)))
}

/// Toggle a location's active flag
///
/// PATCH /api/v1/catalog/locations/{id}/active
#[instrument(skip(pool, req))]
pub async fn set_location_active(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    req: web::Json<ActiveToggleRequest>,
) -> Result<HttpResponse, AppError> {
    let location_id = path.into_inner();
    let location = catalog_service(pool.get_ref())
        .set_location_active(&location_id, req.active)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(LocationResponse::from(location))))
}

/// Upsert a vehicle
///
/// POST /api/v1/catalog/vehicles
#[instrument(skip(pool, req))]
pub async fn upsert_vehicle(
    pool: web::Data<PgPool>,
    req: web::Json<VehicleUpsertRequest>,
) -> Result<HttpResponse, AppError> {
    validated(&*req, "Vehicle upsert")?;
    debug!(slug = %req.slug, "Upserting vehicle");

    let vehicle = catalog_service(pool.get_ref())
        .upsert_vehicle(req.into_inner().into())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(VehicleResponse::from(vehicle))))
}

/// List vehicles
///
/// GET /api/v1/catalog/vehicles
#[instrument(skip(pool))]
pub async fn list_vehicles(
    pool: web::Data<PgPool>,
    query: web::Query<PaginationParams>,
    filters: web::Query<ActiveFilterParams>,
) -> Result<HttpResponse, AppError> {
    validated(&*query, "Pagination")?;

    let repo = PgVehicleRepository::new(pool.get_ref().clone());
    let (vehicles, total) = repo
        .list(filters.active, query.limit(), query.offset())
        .await?;

    let data: Vec<VehicleResponse> = vehicles.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(query.paginate(data, total)))
}

/// Toggle a vehicle's active flag
///
/// PATCH /api/v1/catalog/vehicles/{id}/active
#[instrument(skip(pool, req))]
pub async fn set_vehicle_active(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    req: web::Json<ActiveToggleRequest>,
) -> Result<HttpResponse, AppError> {
    let vehicle_id = path.into_inner();
    let vehicle = catalog_service(pool.get_ref())
        .set_vehicle_active(&vehicle_id, req.active)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(VehicleResponse::from(vehicle))))
}

/// Upsert a route for a zone pair
///
/// POST /api/v1/catalog/routes
#[instrument(skip(pool, req))]
pub async fn upsert_route(
    pool: web::Data<PgPool>,
    req: web::Json<RouteUpsertRequest>,
) -> Result<HttpResponse, AppError> {
    validated(&*req, "Route upsert")?;

    let route = catalog_service(pool.get_ref())
        .upsert_route(&req.zone_a_id, &req.zone_b_id)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(route)))
}

/// List routes with pricing summaries
///
/// GET /api/v1/catalog/routes
#[instrument(skip(pool))]
pub async fn list_routes(
    pool: web::Data<PgPool>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    validated(&*query, "Pagination")?;

    let repo = PgRouteRepository::new(pool.get_ref().clone());
    let (summaries, total) = repo.list_summaries(query.limit(), query.offset()).await?;

    let data: Vec<RouteSummaryResponse> = summaries.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(query.paginate(data, total)))
}

/// Upsert one base price on a route
///
/// POST /api/v1/catalog/routes/{id}/prices
#[instrument(skip(pool, req))]
pub async fn upsert_route_price(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    req: web::Json<RoutePriceRequest>,
) -> Result<HttpResponse, AppError> {
    validated(&*req, "Route price upsert")?;

    let route_id = path.into_inner();
    let price = catalog_service(pool.get_ref())
        .upsert_route_price(&route_id, &req.vehicle_id, req.price)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(price)))
}

/// Upsert a zone-pair rate grid
///
/// POST /api/v1/catalog/rates
#[instrument(skip(pool, req))]
pub async fn upsert_rate(
    pool: web::Data<PgPool>,
    req: web::Json<RateUpsertRequest>,
) -> Result<HttpResponse, AppError> {
    validated(&*req, "Rate upsert")?;
    debug!(
        origin = %req.origin_zone_id,
        destination = %req.destination_zone_id,
        "Upserting rate"
    );

    let route = catalog_service(pool.get_ref())
        .upsert_rate(req.into_inner().into())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(route, "Rate upserted")))
}

/// Upsert a price override
///
/// POST /api/v1/catalog/overrides
#[instrument(skip(pool, req))]
pub async fn upsert_override(
    pool: web::Data<PgPool>,
    req: web::Json<OverrideUpsertRequest>,
) -> Result<HttpResponse, AppError> {
    validated(&*req, "Override upsert")?;

    let entry = catalog_service(pool.get_ref())
        .upsert_override(req.into_inner().into())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(entry)))
}

/// Configure catalog routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/catalog")
            .service(
                web::scope("/zones")
                    .route("", web::get().to(list_zones))
                    .route("", web::post().to(upsert_zone))
                    .route("/{id}", web::delete().to(delete_zone)),
            )
            .service(
                web::scope("/locations")
                    .route("", web::get().to(list_locations))
                    .route("", web::post().to(upsert_location))
                    .route("/import", web::post().to(import_locations))
                    .route("/{id}/active", web::patch().to(set_location_active)),
            )
            .service(
                web::scope("/vehicles")
                    .route("", web::get().to(list_vehicles))
                    .route("", web::post().to(upsert_vehicle))
                    .route("/{id}/active", web::patch().to(set_vehicle_active)),
            )
            .service(
                web::scope("/routes")
                    .route("", web::get().to(list_routes))
                    .route("", web::post().to(upsert_route))
                    .route("/{id}/prices", web::post().to(upsert_route_price)),
            )
            .route("/rates", web::post().to(upsert_rate))
            .route("/overrides", web::post().to(upsert_override)),
    );
}
