use crate::core::{subjects::score_subjects, traits::score_traits};
use crate::models::{CognitiveProfile, ScoredCandidate, ScoringWeights, TutorCandidate};
use std::cmp::Ordering;

/// Maximum trait match count, mirrored by the 0-100 cognitive score scale.
const MAX_TRAIT_MATCHES: f64 = 8.0;

/// Score every candidate in the pool against the learner.
///
/// Computes the trait compatibility and subject overlap signals for each
/// tutor and blends them into one `compatibility_score`:
///
/// score = clamp(0, 100, cognitive_score * w.cognitive + subject_score * w.subject)
///
/// The pool is consumed by value and never mutated in place; the returned
/// order is the input order (see `rank_rule_based`).
pub fn score_all(
    requested_subjects: &[String],
    cognitive: &CognitiveProfile,
    pool: Vec<TutorCandidate>,
    weights: &ScoringWeights,
) -> Vec<ScoredCandidate> {
    pool.into_iter()
        .map(|candidate| {
            let (match_count, justifications) = score_traits(cognitive, &candidate.pedagogy);
            let cognitive_score = (match_count as f64 / MAX_TRAIT_MATCHES) * 100.0;

            let (overlap_ratio, subject_explanation) =
                score_subjects(requested_subjects, &candidate.subjects);
            let subject_score = overlap_ratio * 100.0;

            let compatibility_score = (cognitive_score * weights.cognitive
                + subject_score * weights.subject)
                .clamp(0.0, 100.0);

            let reasoning = if justifications.is_empty() {
                format!("Cognitive compatibility {match_count}/8: no pedagogy alignment with the learner's profile")
            } else {
                format!(
                    "Cognitive compatibility {match_count}/8: {}",
                    justifications.join(". ")
                )
            };

            ScoredCandidate {
                candidate,
                cognitive_match_count: match_count,
                cognitive_score,
                subject_overlap_ratio: overlap_ratio,
                subject_score,
                compatibility_score,
                reasoning,
                subject_explanation,
            }
        })
        .collect()
}

/// Sort candidates into the rule-based total order.
///
/// Tie-break chain: cognitive match count descending, subject overlap ratio
/// descending, price ascending (cheaper preferred). This order is both the
/// fallback ranking and the shortlist fed to the AI ranker.
pub fn rank_rule_based(scored: &mut [ScoredCandidate]) {
    scored.sort_by(|a, b| {
        b.cognitive_match_count
            .cmp(&a.cognitive_match_count)
            .then_with(|| {
                b.subject_overlap_ratio
                    .partial_cmp(&a.subject_overlap_ratio)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| {
                a.candidate
                    .price
                    .partial_cmp(&b.candidate.price)
                    .unwrap_or(Ordering::Equal)
            })
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PedagogyProfile, Support};

    fn cognitive_all(value: f64) -> CognitiveProfile {
        CognitiveProfile {
            confidence: value,
            anxiety: value,
            processing_speed: value,
            working_memory: value,
            precision: value,
            error_correction: value,
            exploration: value,
            impulsivity: value,
            logical_reasoning: value,
            hypothetical_reasoning: value,
        }
    }

    fn pedagogy_all(support: Support) -> PedagogyProfile {
        PedagogyProfile {
            tcs: support,
            tspi: support,
            twmls: support,
            tpo: support,
            tecp: support,
            tet: support,
            tics: support,
            trd: support,
        }
    }

    fn tutor(id: &str, price: f64, subjects: &[&str], support: Support) -> TutorCandidate {
        TutorCandidate {
            id: id.to_string(),
            name: format!("Tutor {id}"),
            price,
            subjects: subjects.iter().map(|s| s.to_string()).collect(),
            pedagogy: pedagogy_all(support),
        }
    }

    #[test]
    fn test_score_all_blends_and_clamps() {
        let cognitive = cognitive_all(20.0);
        let weights = ScoringWeights::default();
        let requested = vec!["Math".to_string()];

        let scored = score_all(
            &requested,
            &cognitive,
            vec![tutor("a", 500.0, &["Mathematics"], Support::High)],
            &weights,
        );

        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].cognitive_match_count, 8);
        assert_eq!(scored[0].cognitive_score, 100.0);
        assert_eq!(scored[0].subject_overlap_ratio, 1.0);
        assert_eq!(scored[0].compatibility_score, 100.0);
        assert!(scored[0].reasoning.contains("8/8"));
    }

    #[test]
    fn test_zero_alignment_scores_zero() {
        let cognitive = cognitive_all(20.0);
        let weights = ScoringWeights::default();
        let requested = vec!["History".to_string()];

        let scored = score_all(
            &requested,
            &cognitive,
            vec![tutor("a", 500.0, &["Mathematics"], Support::Low)],
            &weights,
        );

        assert_eq!(scored[0].cognitive_match_count, 0);
        assert_eq!(scored[0].compatibility_score, 0.0);
        assert!(scored[0].reasoning.contains("0/8"));
    }

    #[test]
    fn test_rule_order_cognitive_dominates_price() {
        let cognitive = cognitive_all(20.0);
        let weights = ScoringWeights::default();
        let requested = vec!["Math".to_string()];

        // 8-match at 800, partial at 600, 0-match at 400
        let mut pedagogy_partial = pedagogy_all(Support::High);
        pedagogy_partial.tcs = Support::Low;
        pedagogy_partial.tspi = Support::Low;
        pedagogy_partial.twmls = Support::Low;
        pedagogy_partial.tet = Support::Low;

        let pool = vec![
            TutorCandidate {
                pedagogy: pedagogy_partial,
                ..tutor("good", 600.0, &["Mathematics"], Support::High)
            },
            tutor("poor", 400.0, &["Mathematics"], Support::Low),
            tutor("perfect", 800.0, &["Mathematics"], Support::High),
        ];

        let mut scored = score_all(&requested, &cognitive, pool, &weights);
        rank_rule_based(&mut scored);

        let ids: Vec<&str> = scored.iter().map(|s| s.candidate.id.as_str()).collect();
        assert_eq!(ids, vec!["perfect", "good", "poor"]);
        assert_eq!(scored[0].cognitive_match_count, 8);
        assert_eq!(scored[1].cognitive_match_count, 4);
        assert_eq!(scored[2].cognitive_match_count, 0);
    }

    #[test]
    fn test_price_breaks_ties() {
        let cognitive = cognitive_all(20.0);
        let weights = ScoringWeights::default();
        let requested = vec!["Math".to_string()];

        let pool = vec![
            tutor("expensive", 900.0, &["Mathematics"], Support::High),
            tutor("cheap", 300.0, &["Mathematics"], Support::High),
        ];

        let mut scored = score_all(&requested, &cognitive, pool, &weights);
        rank_rule_based(&mut scored);

        assert_eq!(scored[0].candidate.id, "cheap");
        assert_eq!(scored[1].candidate.id, "expensive");
    }

    #[test]
    fn test_subject_breaks_cognitive_ties() {
        let cognitive = cognitive_all(20.0);
        let weights = ScoringWeights::default();
        let requested = vec!["Math".to_string(), "Physics".to_string()];

        let pool = vec![
            tutor("partial", 300.0, &["Mathematics"], Support::High),
            tutor("full", 900.0, &["Mathematics", "Physics"], Support::High),
        ];

        let mut scored = score_all(&requested, &cognitive, pool, &weights);
        rank_rule_based(&mut scored);

        // Full subject coverage wins despite the higher price
        assert_eq!(scored[0].candidate.id, "full");
    }
}
