//! Cognimatch - cognitive-compatibility tutor matching service
//!
//! This library implements the matching engine that pairs learners with
//! compatible tutors. Two independent signals, pedagogy trait compatibility
//! and subject overlap, feed a rule-based ranking that an LLM provider can
//! refine and explain; when the provider is unavailable the rule-based
//! ranking stands.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{MatchEngine, MatchError, MatchOutcome, RESULT_LIMIT};
pub use crate::models::{
    CognitiveProfile, MatchResult, PedagogyProfile, ScoringWeights, Support, TutorCandidate,
};
pub use crate::services::{AiProvider, AiRanker, Fingerprint, RateLimiter, ResultCache};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        assert_eq!(RESULT_LIMIT, 3);
        let weights = ScoringWeights::default();
        assert!(weights.cognitive > weights.subject);
    }
}
