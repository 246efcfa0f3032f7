//! Claim filtering logic

use crate::model::ClaimDraft;

use super::lexicon;

const MIN_CLAIM_WORDS: usize = 3;
const MAX_CLAIM_CHARS: usize = 400;

/// Patterns that mark a span as personal narrative or chatter rather than a claim
const NOISE_PATTERNS: &[&str] = &[
    "i feel",
    "i felt",
    "i'm feeling",
    "my day",
    "click here",
    "subscribe",
    "follow us",
    "share this",
    "sponsored",
];

/// Filter out questions, fragments and noise spans
pub fn filter_weak_claims(claims: Vec<ClaimDraft>) -> Vec<ClaimDraft> {
    claims.into_iter().filter(is_checkable_claim).collect()
}

fn is_checkable_claim(claim: &ClaimDraft) -> bool {
    let text = claim.claim_text.trim();

    if text.ends_with('?') {
        tracing::debug!(claim = %text, "Filtering out question");
        return false;
    }

    if text.split_whitespace().count() < MIN_CLAIM_WORDS {
        tracing::debug!(claim = %text, "Filtering out fragment");
        return false;
    }

    if text.chars().count() > MAX_CLAIM_CHARS {
        tracing::debug!(
            claim_preview = text.chars().take(100).collect::<String>(),
            "Filtering out over-long span"
        );
        return false;
    }

    // Noise is only dropped when nothing in the span asserts anything
    let lower = text.to_lowercase();
    let is_noise = NOISE_PATTERNS.iter().any(|pattern| lower.contains(pattern));
    if is_noise && !lexicon::has_assertion_cue(text) {
        tracing::debug!(claim = %text, "Filtering out noise span");
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClaimType, UrgencyHint};

    fn draft(text: &str) -> ClaimDraft {
        ClaimDraft {
            claim_text: text.to_string(),
            claim_type: ClaimType::TreatmentClaim,
            topic: "infections".to_string(),
            target_population: "general".to_string(),
            urgency_hint: UrgencyHint::Low,
            potential_harm: 35,
            certainty_in_text: 60,
        }
    }

    #[test]
    fn test_filters_questions_and_fragments() {
        let kept = filter_weak_claims(vec![
            draft("Do antibiotics cure colds?"),
            draft("Cure colds"),
            draft("Antibiotics cure colds"),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].claim_text, "Antibiotics cure colds");
    }

    #[test]
    fn test_noise_with_assertion_is_kept() {
        let kept = filter_weak_claims(vec![
            draft("I feel like sharing my day with a cold"),
            draft("I feel that garlic cures the flu"),
        ]);
        assert_eq!(kept.len(), 1);
        assert!(kept[0].claim_text.contains("garlic"));
    }
}
