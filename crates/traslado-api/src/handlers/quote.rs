//! Quote handlers
//!
//! HTTP handlers for transfer quote resolution.

use crate::dto::quote::QuoteRequest;
use crate::dto::ApiResponse;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use traslado_core::{config::PricingConfig, legacy::LegacyRateTable, AppError};
use traslado_db::{PgLocationRepository, PgRouteRepository, PgVehicleRepository};
use traslado_services::QuoteService;
use validator::Validate;

/// Resolve a transfer quote
///
/// POST /api/v1/transfers/quote
#[instrument(skip(pool, legacy, pricing, req))]
pub async fn create_quote(
    pool: web::Data<PgPool>,
    legacy: web::Data<LegacyRateTable>,
    pricing: web::Data<PricingConfig>,
    req: web::Json<QuoteRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Quote request validation failed: {}", e);
        AppError::from(e)
    })?;

    debug!(
        origin = %req.origin,
        destination = %req.destination,
        passengers = req.passengers,
        "Resolving quote"
    );

    let service = QuoteService::new(
        Arc::new(PgLocationRepository::new(pool.get_ref().clone())),
        Arc::new(PgRouteRepository::new(pool.get_ref().clone())),
        Arc::new(PgVehicleRepository::new(pool.get_ref().clone())),
        legacy.into_inner(),
        pricing.currency.clone(),
    );

    let quote = service
        .quote(&req.origin, &req.destination, req.passengers)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(quote)))
}

/// Configure quote routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/transfers").route("/quote", web::post().to(create_quote)));
}
