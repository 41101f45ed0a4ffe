use std::collections::BTreeSet;

/// Synonym table mapping spelling variants to a canonical subject name.
const SYNONYMS: &[(&str, &str)] = &[("math", "mathematics"), ("maths", "mathematics")];

/// Category table: a subject on the left covers every subject on the right.
const CATEGORIES: &[(&str, &[&str])] = &[("science", &["physics", "chemistry", "biology"])];

/// Normalize a raw subject string: trim, lowercase, collapse synonyms.
#[inline]
fn canonical(subject: &str) -> String {
    let lowered = subject.trim().to_lowercase();
    for (variant, canon) in SYNONYMS {
        if lowered == *variant {
            return (*canon).to_string();
        }
    }
    lowered
}

/// Expand a canonical subject into its equivalence set.
///
/// A category name expands to itself plus its members; a member expands to
/// itself plus its category, so "Science" and "Physics" satisfy each other.
fn expand(subject: &str) -> BTreeSet<String> {
    let mut set = BTreeSet::new();
    set.insert(subject.to_string());

    for (category, members) in CATEGORIES {
        if subject == *category {
            for member in *members {
                set.insert((*member).to_string());
            }
        } else if members.contains(&subject) {
            set.insert((*category).to_string());
        }
    }

    set
}

/// Check whether one requested subject is satisfied by any offered subject.
#[inline]
fn is_satisfied(requested: &str, offered: &[BTreeSet<String>]) -> bool {
    let wanted = expand(requested);
    offered.iter().any(|o| !wanted.is_disjoint(o))
}

/// Score subject overlap between requested and offered subjects.
///
/// Returns the overlap ratio in [0,1] together with an explanation that
/// names the covered subjects and distinguishes full, partial, and zero
/// overlap.
pub fn score_subjects(requested: &[String], offered: &[String]) -> (f64, String) {
    // Pair each surviving subject with its canonical form so blank entries
    // never skew the ratio
    let requested_pairs: Vec<(String, String)> = requested
        .iter()
        .filter_map(|raw| {
            let canon = canonical(raw);
            if canon.is_empty() {
                None
            } else {
                Some((raw.trim().to_string(), canon))
            }
        })
        .collect();

    if requested_pairs.is_empty() {
        return (0.0, "No subjects requested".to_string());
    }

    let offered_expanded: Vec<BTreeSet<String>> = offered
        .iter()
        .map(|s| canonical(s))
        .filter(|s| !s.is_empty())
        .map(|s| expand(&s))
        .collect();

    let mut covered = Vec::new();
    for (raw, canon) in &requested_pairs {
        if is_satisfied(canon, &offered_expanded) {
            covered.push(raw.clone());
        }
    }

    let ratio = (covered.len() as f64 / requested_pairs.len() as f64).clamp(0.0, 1.0);

    let explanation = if covered.is_empty() {
        "No overlap with the requested subjects".to_string()
    } else if covered.len() == requested_pairs.len() {
        format!("Covers all requested subjects: {}", covered.join(", "))
    } else {
        format!(
            "Covers {} of {} requested subjects: {}",
            covered.len(),
            requested_pairs.len(),
            covered.join(", ")
        )
    };

    (ratio, explanation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subjects(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_math_synonym_full_overlap() {
        let (ratio, explanation) =
            score_subjects(&subjects(&["Math"]), &subjects(&["Mathematics"]));

        assert_eq!(ratio, 1.0);
        assert!(explanation.contains("all requested"));
        assert!(explanation.contains("Math"));
    }

    #[test]
    fn test_maths_variant_matches() {
        let (ratio, _) = score_subjects(&subjects(&["Maths"]), &subjects(&["mathematics"]));
        assert_eq!(ratio, 1.0);
    }

    #[test]
    fn test_no_overlap() {
        let (ratio, explanation) = score_subjects(
            &subjects(&["Biology"]),
            &subjects(&["Mathematics", "Physics"]),
        );

        assert_eq!(ratio, 0.0);
        assert!(explanation.contains("No overlap"));
    }

    #[test]
    fn test_science_covers_members() {
        // An offered "Science" satisfies a requested member subject
        let (ratio, _) = score_subjects(&subjects(&["Physics"]), &subjects(&["Science"]));
        assert_eq!(ratio, 1.0);

        // And a member satisfies a requested "Science"
        let (ratio, _) = score_subjects(&subjects(&["Science"]), &subjects(&["Chemistry"]));
        assert_eq!(ratio, 1.0);
    }

    #[test]
    fn test_partial_overlap_names_covered() {
        let (ratio, explanation) = score_subjects(
            &subjects(&["Math", "History"]),
            &subjects(&["Mathematics"]),
        );

        assert_eq!(ratio, 0.5);
        assert!(explanation.contains("1 of 2"));
        assert!(explanation.contains("Math"));
        assert!(!explanation.contains("History"));
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        let (ratio, _) = score_subjects(&subjects(&["  ENGLISH "]), &subjects(&["english"]));
        assert_eq!(ratio, 1.0);
    }

    #[test]
    fn test_empty_requested() {
        let (ratio, explanation) = score_subjects(&[], &subjects(&["Mathematics"]));
        assert_eq!(ratio, 0.0);
        assert!(explanation.contains("No subjects requested"));
    }

    #[test]
    fn test_empty_offered() {
        let (ratio, _) = score_subjects(&subjects(&["Math"]), &[]);
        assert_eq!(ratio, 0.0);
    }
}
