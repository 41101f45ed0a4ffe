use crate::models::{CognitiveProfile, PedagogyProfile, Support};

/// Pedagogy trait tags, one per scored dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PedagogyTrait {
    Tcs,
    Tspi,
    Twmls,
    Tpo,
    Tecp,
    Tet,
    Tics,
    Trd,
}

/// Cognitive parameter feeding each pairing. `Reasoning` is the composite of
/// logical and hypothetical reasoning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CognitiveParam {
    Confidence,
    ProcessingSpeed,
    WorkingMemory,
    Precision,
    ErrorCorrection,
    Exploration,
    Impulsivity,
    Reasoning,
}

/// One trait↔parameter pairing in the compatibility table.
#[derive(Debug, Clone, Copy)]
pub struct TraitPairing {
    pub trait_tag: PedagogyTrait,
    pub param: CognitiveParam,
    pub label: &'static str,
}

/// The fixed trait↔parameter mapping, in scoring order.
pub const TRAIT_PAIRINGS: [TraitPairing; 8] = [
    TraitPairing {
        trait_tag: PedagogyTrait::Tcs,
        param: CognitiveParam::Confidence,
        label: "confidence",
    },
    TraitPairing {
        trait_tag: PedagogyTrait::Tspi,
        param: CognitiveParam::ProcessingSpeed,
        label: "processing speed",
    },
    TraitPairing {
        trait_tag: PedagogyTrait::Twmls,
        param: CognitiveParam::WorkingMemory,
        label: "working memory",
    },
    TraitPairing {
        trait_tag: PedagogyTrait::Tpo,
        param: CognitiveParam::Precision,
        label: "precision",
    },
    TraitPairing {
        trait_tag: PedagogyTrait::Tecp,
        param: CognitiveParam::ErrorCorrection,
        label: "error correction",
    },
    TraitPairing {
        trait_tag: PedagogyTrait::Tet,
        param: CognitiveParam::Exploration,
        label: "exploration",
    },
    TraitPairing {
        trait_tag: PedagogyTrait::Tics,
        param: CognitiveParam::Impulsivity,
        label: "impulsivity",
    },
    TraitPairing {
        trait_tag: PedagogyTrait::Trd,
        param: CognitiveParam::Reasoning,
        label: "reasoning",
    },
];

/// Derive the learner's support need from a parameter value.
///
/// Values at or below 40 indicate a clear need for HIGH support; values in
/// the 40-70 band still benefit from HIGH support; only 70 and above map to
/// LOW support.
#[inline]
pub fn derive_support_need(value: f64) -> Support {
    if value >= 70.0 {
        Support::Low
    } else {
        Support::High
    }
}

/// Look up the parameter value a pairing reads from the profile.
#[inline]
pub fn parameter_value(cognitive: &CognitiveProfile, param: CognitiveParam) -> f64 {
    match param {
        CognitiveParam::Confidence => cognitive.confidence,
        CognitiveParam::ProcessingSpeed => cognitive.processing_speed,
        CognitiveParam::WorkingMemory => cognitive.working_memory,
        CognitiveParam::Precision => cognitive.precision,
        CognitiveParam::ErrorCorrection => cognitive.error_correction,
        CognitiveParam::Exploration => cognitive.exploration,
        CognitiveParam::Impulsivity => cognitive.impulsivity,
        CognitiveParam::Reasoning => cognitive.reasoning_composite(),
    }
}

/// Look up the tutor's strength for a pairing.
#[inline]
pub fn trait_strength(pedagogy: &PedagogyProfile, trait_tag: PedagogyTrait) -> Support {
    match trait_tag {
        PedagogyTrait::Tcs => pedagogy.tcs,
        PedagogyTrait::Tspi => pedagogy.tspi,
        PedagogyTrait::Twmls => pedagogy.twmls,
        PedagogyTrait::Tpo => pedagogy.tpo,
        PedagogyTrait::Tecp => pedagogy.tecp,
        PedagogyTrait::Tet => pedagogy.tet,
        PedagogyTrait::Tics => pedagogy.tics,
        PedagogyTrait::Trd => pedagogy.trd,
    }
}

/// Score trait compatibility between a learner and a tutor.
///
/// Walks the pairing table in order, counting every dimension where the
/// tutor's strength equals the learner's derived support need, and collects a
/// short justification for each matched dimension. Purely functional; stable
/// for identical inputs.
pub fn score_traits(
    cognitive: &CognitiveProfile,
    pedagogy: &PedagogyProfile,
) -> (u8, Vec<String>) {
    let mut match_count: u8 = 0;
    let mut justifications = Vec::new();

    for pairing in &TRAIT_PAIRINGS {
        let value = parameter_value(cognitive, pairing.param);
        let need = derive_support_need(value);
        let strength = trait_strength(pedagogy, pairing.trait_tag);

        if strength == need {
            match_count += 1;
            let text = match need {
                Support::High => format!(
                    "High-support teaching suits {} at {:.0}",
                    pairing.label, value
                ),
                Support::Low => format!(
                    "Light-touch teaching fits strong {} ({:.0})",
                    pairing.label, value
                ),
            };
            justifications.push(text);
        }
    }

    (match_count, justifications)
}
