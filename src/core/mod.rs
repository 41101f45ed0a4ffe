// Core algorithm exports
pub mod matcher;
pub mod scoring;
pub mod subjects;
pub mod traits;

pub use matcher::{MatchEngine, MatchError, MatchOutcome, RESULT_LIMIT};
pub use scoring::{rank_rule_based, score_all};
pub use subjects::score_subjects;
pub use traits::{derive_support_need, score_traits, TRAIT_PAIRINGS};
