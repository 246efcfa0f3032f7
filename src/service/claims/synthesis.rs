//! Claim synthesis and deduplication

use crate::model::ClaimDraft;
use crate::service::text::jaccard;

/// Word-overlap above which two claims are treated as the same assertion
const DUPLICATE_THRESHOLD: f64 = 0.6;

/// Merge near-duplicate claims, keeping the more assertive wording.
///
/// The surviving claim stays at the position of the first member of its
/// group, so extraction order is preserved. Harm and urgency are raised
/// to the group maximum.
pub fn synthesize_claims(claims: Vec<ClaimDraft>) -> Vec<ClaimDraft> {
    let mut groups: Vec<Vec<ClaimDraft>> = Vec::new();

    for claim in claims {
        let group_index = groups
            .iter()
            .position(|group| are_near_duplicates(&claim, &group[0]));

        match group_index {
            Some(idx) => groups[idx].push(claim),
            None => groups.push(vec![claim]),
        }
    }

    groups.into_iter().filter_map(merge_claim_group).collect()
}

fn are_near_duplicates(a: &ClaimDraft, b: &ClaimDraft) -> bool {
    jaccard(&a.claim_text, &b.claim_text) > DUPLICATE_THRESHOLD
}

fn merge_claim_group(group: Vec<ClaimDraft>) -> Option<ClaimDraft> {
    let max_harm = group.iter().map(|c| c.potential_harm).max()?;
    let max_urgency = group.iter().map(|c| c.urgency_hint).max()?;

    // Stable: on equal certainty the earliest claim wins
    let mut best = group
        .into_iter()
        .reduce(|best, next| {
            if next.certainty_in_text > best.certainty_in_text {
                next
            } else {
                best
            }
        })?;

    best.potential_harm = max_harm;
    best.urgency_hint = max_urgency;
    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClaimType, UrgencyHint};

    fn draft(text: &str, certainty: u8, harm: u8) -> ClaimDraft {
        ClaimDraft {
            claim_text: text.to_string(),
            claim_type: ClaimType::TreatmentClaim,
            topic: "antibiotics".to_string(),
            target_population: "general".to_string(),
            urgency_hint: UrgencyHint::Medium,
            potential_harm: harm,
            certainty_in_text: certainty,
        }
    }

    #[test]
    fn test_near_duplicates_merge_to_most_certain() {
        let merged = synthesize_claims(vec![
            draft("Antibiotics cure colds", 72, 65),
            draft("Vaccines cause autism", 60, 60),
            draft("Antibiotics always cure a cold", 84, 60),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].claim_text, "Antibiotics always cure a cold");
        assert_eq!(merged[0].potential_harm, 65);
        assert_eq!(merged[1].claim_text, "Vaccines cause autism");
    }

    #[test]
    fn test_distinct_claims_untouched() {
        let input = vec![
            draft("Antibiotics cure colds", 72, 65),
            draft("Vitamin C prevents flu", 60, 30),
        ];
        assert_eq!(synthesize_claims(input.clone()), input);
    }

    #[test]
    fn test_empty() {
        assert!(synthesize_claims(vec![]).is_empty());
    }
}
