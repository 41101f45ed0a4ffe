use serde::{Deserialize, Serialize};

/// Learner cognitive assessment result.
///
/// All ten parameters are on a 0-100 scale and are immutable once the
/// assessment is finalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CognitiveProfile {
    pub confidence: f64,
    pub anxiety: f64,
    #[serde(rename = "processingSpeed")]
    pub processing_speed: f64,
    #[serde(rename = "workingMemory")]
    pub working_memory: f64,
    pub precision: f64,
    #[serde(rename = "errorCorrection")]
    pub error_correction: f64,
    pub exploration: f64,
    pub impulsivity: f64,
    #[serde(rename = "logicalReasoning")]
    pub logical_reasoning: f64,
    #[serde(rename = "hypotheticalReasoning")]
    pub hypothetical_reasoning: f64,
}

impl CognitiveProfile {
    /// Composite reasoning value used by the TRD pairing.
    pub fn reasoning_composite(&self) -> f64 {
        (self.logical_reasoning + self.hypothetical_reasoning) / 2.0
    }

    /// Parameter values in declaration order, for fingerprint hashing.
    pub fn parameter_values(&self) -> [f64; 10] {
        [
            self.confidence,
            self.anxiety,
            self.processing_speed,
            self.working_memory,
            self.precision,
            self.error_correction,
            self.exploration,
            self.impulsivity,
            self.logical_reasoning,
            self.hypothetical_reasoning,
        ]
    }
}

/// Support level a tutor's teaching style provides on one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Support {
    High,
    Low,
}

impl Support {
    pub fn as_str(&self) -> &'static str {
        match self {
            Support::High => "HIGH",
            Support::Low => "LOW",
        }
    }
}

/// Tutor pedagogy trait strengths.
///
/// Each field states whether the tutor emphasizes HIGH or LOW support for the
/// corresponding cognitive dimension. Tutors without a complete profile are
/// filtered out by the directory before they reach the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PedagogyProfile {
    pub tcs: Support,
    pub tspi: Support,
    pub twmls: Support,
    pub tpo: Support,
    pub tecp: Support,
    pub tet: Support,
    pub tics: Support,
    pub trd: Support,
}

impl PedagogyProfile {
    /// Compact "TCS:HIGH,TSPI:LOW,..." rendering used for content hashing.
    pub fn summary(&self) -> String {
        format!(
            "TCS:{},TSPI:{},TWMLS:{},TPO:{},TECP:{},TET:{},TICS:{},TRD:{}",
            self.tcs.as_str(),
            self.tspi.as_str(),
            self.twmls.as_str(),
            self.tpo.as_str(),
            self.tecp.as_str(),
            self.tet.as_str(),
            self.tics.as_str(),
            self.trd.as_str(),
        )
    }
}

/// Learner record as supplied by the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnerRecord {
    pub id: String,
    #[serde(default)]
    pub subjects: Vec<String>,
}

/// A tutor in the qualified candidate pool.
///
/// The pool is supplied fresh per request by the directory; the engine never
/// persists it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorCandidate {
    pub id: String,
    pub name: String,
    #[serde(rename = "lessonPrice")]
    pub price: f64,
    #[serde(default)]
    pub subjects: Vec<String>,
    pub pedagogy: PedagogyProfile,
}

/// Per-request scoring output for a single candidate. Never shared across
/// requests.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: TutorCandidate,
    pub cognitive_match_count: u8,
    pub cognitive_score: f64,
    pub subject_overlap_ratio: f64,
    pub subject_score: f64,
    pub compatibility_score: f64,
    pub reasoning: String,
    pub subject_explanation: String,
}

/// One ranked match exposed to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "tutorId")]
    pub tutor_id: String,
    pub name: String,
    #[serde(rename = "lessonPrice")]
    pub price: f64,
    #[serde(rename = "compatibilityScore")]
    pub compatibility_score: f64,
    #[serde(rename = "cognitiveMatchCount")]
    pub cognitive_match_count: u8,
    #[serde(rename = "subjectOverlap")]
    pub subject_overlap_ratio: f64,
    pub reasoning: String,
    #[serde(rename = "subjectExplanation")]
    pub subject_explanation: String,
}

impl MatchResult {
    /// Builds a result from a scored candidate, keeping the rule-based
    /// blended score rounded to one decimal.
    pub fn from_scored(scored: &ScoredCandidate) -> Self {
        Self {
            tutor_id: scored.candidate.id.clone(),
            name: scored.candidate.name.clone(),
            price: scored.candidate.price,
            compatibility_score: round_score(scored.compatibility_score),
            cognitive_match_count: scored.cognitive_match_count,
            subject_overlap_ratio: scored.subject_overlap_ratio,
            reasoning: scored.reasoning.clone(),
            subject_explanation: scored.subject_explanation.clone(),
        }
    }
}

/// Rounds a 0-100 score to one decimal place for caller-visible output.
pub fn round_score(score: f64) -> f64 {
    (score * 10.0).round() / 10.0
}

/// Blend weights for combining the cognitive and subject scores.
///
/// Cognitive compatibility is the primary signal, subject overlap secondary.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub cognitive: f64,
    pub subject: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            cognitive: 0.70,
            subject: 0.30,
        }
    }
}
