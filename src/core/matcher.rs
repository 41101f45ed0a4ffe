use crate::core::scoring::{rank_rule_based, score_all};
use crate::models::{CognitiveProfile, MatchResult, ScoredCandidate, ScoringWeights, TutorCandidate};
use crate::services::{AiRanker, Fingerprint, RateLimiter, ResultCache};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Number of matches returned to the caller.
pub const RESULT_LIMIT: usize = 3;

/// Request-level failures surfaced to the transport layer.
///
/// AI-layer failures are deliberately absent: they are absorbed inside
/// `find_matches` by the fallback path and never reach the caller.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Cognitive assessment required before matching")]
    MissingAssessment,

    #[error("No qualified tutors available")]
    NoCandidates,

    #[error("Too many matching requests; retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
}

/// Result of a completed matching request.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub matches: Vec<MatchResult>,
    pub processing_time_ms: u64,
    pub cache_hit: bool,
    pub ai_ranked: bool,
    pub total_candidates: usize,
}

/// Match orchestrator
///
/// Runs each request through the pipeline
/// rate check -> cache lookup -> score -> AI rank (or fallback) -> cache store
/// and returns at most `RESULT_LIMIT` ranked matches. All scoring state is
/// per-request; the cache and the rate limiter are the only shared
/// resources.
pub struct MatchEngine {
    weights: ScoringWeights,
    shortlist_size: usize,
    cache: Arc<ResultCache>,
    limiter: Arc<RateLimiter>,
    ai: Option<Arc<AiRanker>>,
}

impl MatchEngine {
    pub fn new(
        weights: ScoringWeights,
        shortlist_size: usize,
        cache: Arc<ResultCache>,
        limiter: Arc<RateLimiter>,
        ai: Option<Arc<AiRanker>>,
    ) -> Self {
        Self {
            weights,
            shortlist_size: shortlist_size.max(RESULT_LIMIT),
            cache,
            limiter,
            ai,
        }
    }

    /// Find the top tutor matches for a learner.
    ///
    /// The caller supplies the learner's requested subjects, the finalized
    /// cognitive assessment if one exists, and the fresh qualified tutor
    /// pool. The pool is consumed; nothing about it is retained between
    /// requests.
    pub async fn find_matches(
        &self,
        learner_id: &str,
        requested_subjects: &[String],
        cognitive: Option<&CognitiveProfile>,
        pool: Vec<TutorCandidate>,
    ) -> Result<MatchOutcome, MatchError> {
        let started = Instant::now();

        // Rate check gates the request before any other work, independent
        // of whether the result would come from cache
        let decision = self.limiter.allow(learner_id);
        if !decision.allowed {
            tracing::warn!("Rate limit exceeded for learner {}", learner_id);
            return Err(MatchError::RateLimited {
                retry_after_secs: decision.retry_after_secs,
            });
        }

        // Preconditions; the fingerprint depends on both inputs, so these
        // come ahead of the cache lookup
        let cognitive = cognitive.ok_or(MatchError::MissingAssessment)?;
        if pool.is_empty() {
            return Err(MatchError::NoCandidates);
        }

        let total_candidates = pool.len();
        let fingerprint = Fingerprint::compute(learner_id, cognitive, &pool);

        if let Some(matches) = self.cache.get(&fingerprint).await {
            tracing::debug!("Cache hit for fingerprint {}", fingerprint);
            return Ok(MatchOutcome {
                matches,
                processing_time_ms: started.elapsed().as_millis() as u64,
                cache_hit: true,
                ai_ranked: false,
                total_candidates,
            });
        }

        let mut scored = score_all(requested_subjects, cognitive, pool, &self.weights);
        rank_rule_based(&mut scored);

        let shortlist = &scored[..scored.len().min(self.shortlist_size)];

        let (matches, ai_ranked) = match &self.ai {
            Some(ai) => match ai.refine(requested_subjects, shortlist).await {
                Ok(matches) => (matches, true),
                Err(e) => {
                    // Graceful degradation: the rule-based order stands and
                    // the caller never sees the AI failure
                    tracing::warn!("AI ranking failed, using rule-based fallback: {}", e);
                    (fallback_results(&scored), false)
                }
            },
            None => (fallback_results(&scored), false),
        };

        if let Err(e) = self.cache.put(&fingerprint, &matches).await {
            tracing::warn!("Failed to cache match results: {}", e);
        }

        tracing::info!(
            "Matched learner {}: {} results from {} candidates (ai_ranked: {})",
            learner_id,
            matches.len(),
            total_candidates,
            ai_ranked
        );

        Ok(MatchOutcome {
            matches,
            processing_time_ms: started.elapsed().as_millis() as u64,
            cache_hit: false,
            ai_ranked,
            total_candidates,
        })
    }
}

/// Rule-based ranking truncated to the result limit.
fn fallback_results(scored: &[ScoredCandidate]) -> Vec<MatchResult> {
    scored
        .iter()
        .take(RESULT_LIMIT)
        .map(MatchResult::from_scored)
        .collect()
}
