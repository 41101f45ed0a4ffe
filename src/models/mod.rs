// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    round_score, CognitiveProfile, LearnerRecord, MatchResult, PedagogyProfile, ScoredCandidate,
    ScoringWeights, Support, TutorCandidate,
};
pub use requests::FindMatchesRequest;
pub use responses::{ErrorResponse, FindMatchesResponse, HealthResponse};
