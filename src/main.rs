//! Traslado Engine Server
//!
//! Transfer route pricing and quote resolution backend: location/zone/route
//! catalog management plus quote resolution with a legacy fallback table.

use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpResponse, HttpServer};
use std::env;
use std::path::Path;
use traslado_api::{configure_catalog, configure_quote};
use traslado_core::{config::AppConfig, legacy::LegacyRateTable};
use traslado_db::{create_pool, run_migrations};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Health check endpoint
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "traslado-engine",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Configure API routes
fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            // Health check
            .route("/health", web::get().to(health_check))
            // Quote resolution
            .configure(configure_quote)
            // Catalog management
            .configure(configure_catalog),
    );
}

/// Initialize tracing/logging
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "traslado_engine={},traslado_api={},traslado_services={},traslado_db={},actix_web=info,sqlx=warn",
            log_level, log_level, log_level, log_level
        ))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    init_tracing();

    info!("Starting Traslado Engine v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load().expect("Failed to load configuration");

    // Load the legacy rate table once; it is read-only for the process
    let legacy = LegacyRateTable::load(config.pricing.legacy_table_path.as_deref().map(Path::new))
        .expect("Failed to load legacy rate table");
    info!(
        "Legacy rate table loaded with {} zones",
        legacy.zones().len()
    );

    // CORS configuration
    let cors_origins = env::var("CORS_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    info!("Connecting to database...");
    let pool = create_pool(&config.database.url, Some(config.database.max_connections))
        .await
        .expect("Failed to create database pool");

    if config.database.run_migrations {
        run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
    }

    let bind_addr = config.server_addr();
    let workers = config.server.workers;
    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, workers
    );

    let legacy_data = web::Data::new(legacy);
    let pricing_data = web::Data::new(config.pricing.clone());

    // Create and run server
    HttpServer::new(move || {
        // Configure CORS - clone cors_origins for each worker
        let cors_origins_inner = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req_head| {
                let origins: Vec<&str> = cors_origins_inner.split(',').collect();
                if let Ok(origin_str) = origin.to_str() {
                    origins.iter().any(|o| o.trim() == origin_str)
                } else {
                    false
                }
            })
            .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            // Shared state: pool, legacy table, pricing settings
            .app_data(web::Data::new(pool.clone()))
            .app_data(legacy_data.clone())
            .app_data(pricing_data.clone())
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                let error_message = err.to_string();
                actix_web::error::InternalError::from_response(
                    err,
                    HttpResponse::BadRequest().json(serde_json::json!({
                        "error": "invalid_query",
                        "message": error_message
                    })),
                )
                .into()
            }))
            // Middleware
            .wrap(cors)
            .wrap(middleware::Logger::new("%a \"%r\" %s %b %Dms"))
            .wrap(middleware::Compress::default())
            .wrap(middleware::NormalizePath::trim())
            // Configure routes
            .configure(configure_routes)
            // Root redirect to health
            .route(
                "/",
                web::get().to(|| async {
                    HttpResponse::Found()
                        .append_header(("Location", "/api/v1/health"))
                        .finish()
                }),
            )
    })
    .workers(workers)
    .bind(&bind_addr)?
    .run()
    .await
}
