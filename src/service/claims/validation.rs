//! Validation logic for LLM-extracted claims
//!
//! Ensures that extracted claims are grounded in the submitted text
//! and carry usable metadata.

use crate::model::claims::ExtractedClaims;
use crate::service::text::normalize_whitespace;

use super::lexicon;

/// Result of claim validation
#[derive(Debug)]
pub struct ClaimValidationResult {
    /// Whether all claims passed validation
    pub is_valid: bool,
    /// Critical errors that indicate invalid output
    pub errors: Vec<String>,
    /// Warnings that indicate potential quality issues
    pub warnings: Vec<String>,
}

impl ClaimValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

/// At least this share of claim words must appear in the input, in order
const WORD_SUBSEQUENCE_RATIO: f32 = 0.70;

/// Validate extracted claims against the input text
///
/// Checks:
/// 1. Claim text exists in the input (verbatim or in-order word match)
/// 2. Topic is non-empty
/// 3. Claim text names a known health topic (warning only)
/// 4. Scores are within 0-100
pub fn validate_extracted_claims(
    extracted: &ExtractedClaims,
    input_text: &str,
) -> ClaimValidationResult {
    let mut result = ClaimValidationResult::valid();

    if extracted.claims.is_empty() {
        return result;
    }

    let normalized_input = normalize_whitespace(input_text).to_lowercase();

    for (i, claim) in extracted.claims.iter().enumerate() {
        let claim_text = claim.claim_text.trim();

        if claim_text.is_empty() {
            result.add_error(format!("Claim {} has empty claim_text", i + 1));
            continue;
        }

        let normalized_claim = normalize_whitespace(claim_text).to_lowercase();
        let normalized_claim = normalized_claim.trim_end_matches(['.', '!']);
        if !normalized_input.contains(normalized_claim)
            && !words_in_order_present(claim_text, input_text, WORD_SUBSEQUENCE_RATIO)
        {
            result.add_error(format!(
                "Claim {} not found in input: '{}'",
                i + 1,
                claim_text.chars().take(100).collect::<String>()
            ));
        }

        if claim.topic.trim().is_empty() {
            result.add_error(format!("Claim {} missing topic", i + 1));
        }

        if lexicon::matched_topics(claim_text).is_empty() {
            result.add_warning(format!(
                "Claim {} names no known health topic: '{}'",
                i + 1,
                claim_text.chars().take(80).collect::<String>()
            ));
        }

        if claim.certainty > 100 || claim.potential_harm > 100 {
            result.add_warning(format!(
                "Claim {} has out-of-range scores (certainty {}, harm {}); clamping",
                i + 1,
                claim.certainty,
                claim.potential_harm
            ));
        }
    }

    result
}

/// Normalize a word for comparison (lowercase, strip leading/trailing punctuation)
fn normalize_word(w: &str) -> String {
    w.trim_matches(|c: char| c.is_ascii_punctuation())
        .to_lowercase()
}

fn words_in_order_present(excerpt: &str, document: &str, min_ratio: f32) -> bool {
    let excerpt_words: Vec<String> = excerpt
        .split_whitespace()
        .map(normalize_word)
        .filter(|w| !w.is_empty())
        .collect();
    if excerpt_words.is_empty() {
        return false;
    }

    let doc_words: Vec<String> = document
        .split_whitespace()
        .map(normalize_word)
        .filter(|w| !w.is_empty())
        .collect();

    let mut doc_idx = 0;
    let mut matched = 0;
    for ew in &excerpt_words {
        while doc_idx < doc_words.len() {
            if doc_words[doc_idx] == *ew {
                matched += 1;
                doc_idx += 1;
                break;
            }
            doc_idx += 1;
        }
    }

    let ratio = matched as f32 / excerpt_words.len() as f32;
    ratio >= min_ratio
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClaimType;
    use crate::model::claims::ExtractedClaim;

    fn extracted(text: &str, topic: &str) -> ExtractedClaims {
        ExtractedClaims {
            claims: vec![ExtractedClaim {
                claim_text: text.to_string(),
                claim_type: ClaimType::TreatmentClaim,
                topic: topic.to_string(),
                target_population: "general".to_string(),
                certainty: 70,
                potential_harm: 60,
            }],
        }
    }

    #[test]
    fn test_verbatim_claim_is_valid() {
        let result = validate_extracted_claims(
            &extracted("Antibiotics cure colds.", "antibiotics"),
            "My aunt swears that antibiotics   cure colds. She is wrong.",
        );
        assert!(result.is_valid, "{:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_claim_not_in_input() {
        let result = validate_extracted_claims(
            &extracted("Vaccines cause autism", "vaccines"),
            "Antibiotics cure colds.",
        );
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("not found"));
    }

    #[test]
    fn test_light_paraphrase_passes_word_subsequence() {
        let result = validate_extracted_claims(
            &extracted("drinking bleach cures covid quickly", "infections"),
            "They say drinking a little bleach cures covid, and quickly too.",
        );
        assert!(result.is_valid, "{:?}", result.errors);
    }

    #[test]
    fn test_unknown_topic_is_warning_only() {
        let result = validate_extracted_claims(
            &extracted("Crystals realign your aura", "wellness"),
            "Crystals realign your aura.",
        );
        assert!(result.is_valid);
        assert!(result.warnings[0].contains("no known health topic"));
    }

    #[test]
    fn test_empty_claims_is_valid() {
        let result = validate_extracted_claims(&ExtractedClaims { claims: vec![] }, "text");
        assert!(result.is_valid);
        assert!(result.warnings.is_empty());
    }
}
