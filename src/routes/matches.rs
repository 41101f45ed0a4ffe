use crate::core::{MatchEngine, MatchError};
use crate::models::{ErrorResponse, FindMatchesRequest, FindMatchesResponse, HealthResponse};
use crate::services::{DirectoryClient, DirectoryError};
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<DirectoryClient>,
    pub engine: Arc<MatchEngine>,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/matches/find", web::post().to(find_matches));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find tutor matches endpoint
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "learnerId": "string"
/// }
/// ```
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_matches request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "validation_failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
            retry_after: None,
        });
    }

    let learner_id = &req.learner_id;
    let request_id = uuid::Uuid::new_v4();
    tracing::info!("Finding matches for learner: {} (request {})", learner_id, request_id);

    let learner = match state.directory.get_learner(learner_id).await {
        Ok(learner) => learner,
        Err(DirectoryError::NotFound(message)) => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "learner_not_found".to_string(),
                message,
                status_code: 404,
                retry_after: None,
            });
        }
        Err(e) => {
            tracing::error!("Failed to fetch learner {}: {}", learner_id, e);
            return internal_error();
        }
    };

    let assessment = match state.directory.get_assessment(learner_id).await {
        Ok(assessment) => assessment,
        Err(e) => {
            tracing::error!("Failed to fetch assessment for {}: {}", learner_id, e);
            return internal_error();
        }
    };

    let tutors = match state.directory.get_qualified_tutors().await {
        Ok(tutors) => tutors,
        Err(e) => {
            tracing::error!("Failed to query qualified tutors: {}", e);
            return internal_error();
        }
    };

    let outcome = state
        .engine
        .find_matches(learner_id, &learner.subjects, assessment.as_ref(), tutors)
        .await;

    match outcome {
        Ok(outcome) => {
            tracing::info!(
                "Returning {} matches for learner {} in {}ms (cache_hit: {})",
                outcome.matches.len(),
                learner_id,
                outcome.processing_time_ms,
                outcome.cache_hit
            );

            HttpResponse::Ok().json(FindMatchesResponse {
                matches: outcome.matches,
                processing_time_ms: outcome.processing_time_ms,
                cache_hit: outcome.cache_hit,
                total_candidates: outcome.total_candidates,
            })
        }
        Err(e @ MatchError::MissingAssessment) => HttpResponse::BadRequest().json(ErrorResponse {
            error: "assessment_required".to_string(),
            message: e.to_string(),
            status_code: 400,
            retry_after: None,
        }),
        Err(e @ MatchError::NoCandidates) => HttpResponse::NotFound().json(ErrorResponse {
            error: "no_qualified_tutors".to_string(),
            message: e.to_string(),
            status_code: 404,
            retry_after: None,
        }),
        Err(MatchError::RateLimited { retry_after_secs }) => {
            let message = MatchError::RateLimited { retry_after_secs }.to_string();
            HttpResponse::TooManyRequests()
                .insert_header(("Retry-After", retry_after_secs.to_string()))
                .json(ErrorResponse {
                    error: "rate_limited".to_string(),
                    message,
                    status_code: 429,
                    retry_after: Some(retry_after_secs),
                })
        }
    }
}

/// Generic, detail-free 500 used for any unexpected failure
fn internal_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: "internal_error".to_string(),
        message: "Unable to complete matching request".to_string(),
        status_code: 500,
        retry_after: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_check_response() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
        };

        assert_eq!(response.status, "healthy");
    }
}
