use actix_cors::Cors;
use actix_web::{error, middleware, web, App, HttpServer};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

use ember_match::config::Settings;
use ember_match::models::ErrorResponse;
use ember_match::routes::{self, AppState};
use ember_match::services::{
    CacheManager, CandidateService, DailyService, MatchingService, RelationshipService,
    UndoService,
};
use ember_match::storage::PgStore;

/// Handle JSON payload errors with the shared error body.
fn handle_json_payload_error(
    err: error::JsonPayloadError,
    req: &actix_web::HttpRequest,
) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    error::InternalError::from_response(
        err.to_string(),
        actix_web::HttpResponse::BadRequest().json(ErrorResponse {
            error: "invalid_json".to_string(),
            message: err.to_string(),
            status_code: 400,
        }),
    )
    .into()
}

/// Handle query payload errors.
fn handle_query_payload_error(
    err: error::QueryPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    error::InternalError::from_response(
        err.to_string(),
        actix_web::HttpResponse::BadRequest().json(ErrorResponse {
            error: "invalid_query".to_string(),
            message: err.to_string(),
            status_code: 400,
        }),
    )
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {e}");
        panic!("Configuration error: {e}");
    });

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.logging.level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);
    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Ember Match service...");

    // Initialize PostgreSQL-backed store (runs migrations)
    let store = Arc::new(
        PgStore::from_settings(
            &settings.database.url,
            settings.database.max_connections,
            settings.database.min_connections,
        )
        .await
        .unwrap_or_else(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            panic!("PostgreSQL connection error: {e}");
        }),
    );

    info!("PostgreSQL store initialized");

    // Cache is optional: without Redis the service runs uncached.
    let cache = match &settings.cache.redis_url {
        Some(url) => {
            let ttl = settings.cache.ttl_secs.unwrap_or(60);
            let l1_size = settings.cache.l1_cache_size.unwrap_or(1000);
            match CacheManager::new(url, l1_size, ttl).await {
                Ok(c) => {
                    info!("Cache initialized (L1: {} entries, TTL: {}s)", l1_size, ttl);
                    Some(Arc::new(c))
                }
                Err(e) => {
                    warn!("Redis unavailable ({}), running without cache", e);
                    None
                }
            }
        }
        None => None,
    };

    // Wire up the engines
    let daily = DailyService::new(Arc::clone(&store), settings.matching.clone());
    let undo = UndoService::new(Arc::clone(&store), settings.matching.undo_window_secs);
    let matching = MatchingService::new(Arc::clone(&store), daily.clone(), undo.clone());
    let relationships = RelationshipService::new(Arc::clone(&store));
    let candidates = CandidateService::new(Arc::clone(&store));

    // Periodic sweep: expired undo slots and aged daily-pick view rows.
    {
        let undo = undo.clone();
        let daily = daily.clone();
        let interval_secs = settings.matching.sweep_interval_secs.max(1);
        actix_web::rt::spawn(async move {
            let mut ticker =
                tokio::time::interval(std::time::Duration::from_secs(interval_secs));
            loop {
                ticker.tick().await;
                match undo.sweep_expired(Utc::now()).await {
                    Ok(removed) if removed > 0 => {
                        tracing::debug!("swept {} expired undo slots", removed)
                    }
                    Ok(_) => {}
                    Err(e) => warn!("undo sweep failed: {}", e),
                }
                if let Err(e) = daily.sweep_pick_views().await {
                    warn!("daily pick view sweep failed: {}", e);
                }
            }
        });
    }

    let app_state = web::Data::new(AppState {
        store,
        matching,
        undo,
        relationships,
        daily,
        candidates,
        cache,
        default_candidate_limit: settings.matching.default_candidate_limit,
        max_candidate_limit: settings.matching.max_candidate_limit,
    });

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(app_state.clone())
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure::<PgStore>)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
