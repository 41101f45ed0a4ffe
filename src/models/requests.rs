use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to find tutor matches for a learner
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindMatchesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "learner_id", rename = "learnerId")]
    pub learner_id: String,
}
