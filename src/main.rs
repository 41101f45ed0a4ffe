mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use crate::config::Settings;
use crate::core::MatchEngine;
use crate::models::ScoringWeights;
use crate::routes::matches::AppState;
use crate::services::{AiProvider, AiRanker, DirectoryClient, RateLimiter, ResultCache};
use std::sync::Arc;
use tracing::{error, info, warn};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap_or_default())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(
    err: error::JsonPayloadError,
    req: &actix_web::HttpRequest,
) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(
    err: error::QueryPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Cognimatch matching service...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Initialize directory client
    let directory = Arc::new(DirectoryClient::new(
        settings.directory.endpoint,
        settings.directory.api_key,
    ));

    info!("Directory client initialized");

    // Initialize result cache (Redis optional; L1-only otherwise)
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(3600);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = match &settings.cache.redis_url {
        Some(redis_url) => {
            match ResultCache::with_redis(redis_url, l1_cache_size, cache_ttl).await {
                Ok(cache) => {
                    info!(
                        "Result cache initialized with Redis L2 (L1: {} entries, TTL: {}s)",
                        l1_cache_size, cache_ttl
                    );
                    Arc::new(cache)
                }
                Err(e) => {
                    warn!("Failed to connect to Redis ({}), running with in-process cache only", e);
                    Arc::new(ResultCache::in_memory(l1_cache_size, cache_ttl))
                }
            }
        }
        None => {
            info!(
                "Result cache initialized in-process (L1: {} entries, TTL: {}s)",
                l1_cache_size, cache_ttl
            );
            Arc::new(ResultCache::in_memory(l1_cache_size, cache_ttl))
        }
    };

    // Initialize rate limiter
    let limiter = Arc::new(RateLimiter::new(
        settings.rate_limit.max_requests,
        settings.rate_limit.window_secs,
    ));

    info!(
        "Rate limiter initialized ({} requests per {}s window)",
        settings.rate_limit.max_requests, settings.rate_limit.window_secs
    );

    // Initialize AI ranker when a key is configured
    let ai = match &settings.ai.api_key {
        Some(_) => {
            let provider = AiProvider::from_setting(&settings.ai.provider);
            info!("AI ranker initialized (provider: {:?})", provider);
            Some(Arc::new(AiRanker::new(
                provider,
                settings.ai.api_key.clone(),
                settings.ai.endpoint.clone(),
                settings.ai.model.clone(),
                settings.ai.max_tokens,
                settings.ai.timeout_secs,
            )))
        }
        None => {
            warn!("No AI API key configured; serving rule-based rankings only");
            None
        }
    };

    // Initialize match engine with configured weights
    let weights = ScoringWeights {
        cognitive: settings.scoring.weights.cognitive,
        subject: settings.scoring.weights.subject,
    };

    let shortlist_size = settings.matching.shortlist_size.unwrap_or(10);

    let engine = Arc::new(MatchEngine::new(
        weights,
        shortlist_size,
        cache,
        limiter,
        ai,
    ));

    info!("Match engine initialized with weights: {:?}", weights);

    // Build application state
    let app_state = AppState { directory, engine };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
