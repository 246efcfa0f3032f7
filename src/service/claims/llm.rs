//! LLM-backed claim extraction using rig-core structured output

use async_trait::async_trait;
use rig::providers::openai;

use super::heuristic::urgency_hint;
use super::lexicon::TREATMENT_DELAY_CUE;
use super::prompts::{EXTRACTION_SYSTEM_PROMPT, build_extraction_prompt};
use super::validation::validate_extracted_claims;
use super::{ClaimExtractionError, ClaimExtractor};
use crate::model::ClaimDraft;
use crate::model::claims::{ExtractedClaim, ExtractedClaims, GENERAL_POPULATION};
use crate::service::cache_keys::hash_string;
use crate::service::llm::LlmClient;
use crate::service::text::normalize_whitespace;

/// Environment variable for claim extraction model (defaults to gpt-4o if not set)
const ENV_CLAIM_EXTRACTION_MODEL: &str = "CLAIM_EXTRACTION_MODEL";

const DEFAULT_MODEL: &str = openai::GPT_4O;

pub struct LlmClaimExtractor {
    llm_client: LlmClient,
    model: String,
    id: String,
}

impl LlmClaimExtractor {
    /// Uses CLAIM_EXTRACTION_MODEL when set, gpt-4o otherwise
    pub fn new(llm_client: LlmClient) -> Self {
        let model = std::env::var(ENV_CLAIM_EXTRACTION_MODEL)
            .unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::with_model(llm_client, model)
    }

    pub fn with_model(llm_client: LlmClient, model: String) -> Self {
        let prompt_version = hash_string(EXTRACTION_SYSTEM_PROMPT);
        let id = format!("llm:{}:{}", model, &prompt_version[..12]);
        tracing::info!(model = %model, "LLM claim extractor initialized");
        Self {
            llm_client,
            model,
            id,
        }
    }
}

#[async_trait]
impl ClaimExtractor for LlmClaimExtractor {
    fn id(&self) -> &str {
        &self.id
    }

    async fn extract(&self, text: &str) -> Result<Vec<ClaimDraft>, ClaimExtractionError> {
        let prompt = build_extraction_prompt(text);
        let prompt_length = prompt.len();

        tracing::debug!(
            model = %self.model,
            prompt_length = prompt_length,
            "Initiating OpenAI API call for claim extraction"
        );

        let start_time = std::time::Instant::now();

        // temperature 0 and a fixed seed keep repeated extractions stable
        let extractor = self
            .llm_client
            .openai_client()
            .extractor::<ExtractedClaims>(&self.model)
            .preamble(EXTRACTION_SYSTEM_PROMPT)
            .additional_params(serde_json::json!({
                "temperature": 0.0,
                "seed": 42
            }))
            .build();

        let extracted = match extractor.extract(&prompt).await {
            Ok(result) => {
                tracing::info!(
                    model = %self.model,
                    elapsed_ms = start_time.elapsed().as_millis(),
                    claims_extracted = result.claims.len(),
                    "OpenAI API call completed successfully"
                );
                result
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model,
                    elapsed_ms = start_time.elapsed().as_millis(),
                    prompt_length = prompt_length,
                    error = %e,
                    "OpenAI API call failed"
                );
                return Err(ClaimExtractionError::ExtractionFailed(e.to_string()));
            }
        };

        let validation = validate_extracted_claims(&extracted, text);
        if !validation.is_valid {
            tracing::error!(
                errors = ?validation.errors,
                "Claim extraction validation failed - claims not grounded in input"
            );
            return Err(ClaimExtractionError::Validation(validation.errors.join("; ")));
        }
        if !validation.warnings.is_empty() {
            tracing::warn!(
                warnings = ?validation.warnings,
                "Claim extraction produced quality warnings"
            );
        }

        Ok(extracted.claims.into_iter().map(into_draft).collect())
    }
}

/// Normalize model output into the same shape the heuristic extractor produces
fn into_draft(extracted: ExtractedClaim) -> ClaimDraft {
    let claim_text = normalize_whitespace(&extracted.claim_text)
        .trim_end_matches(['.', '!'])
        .to_string();

    let topic = extracted.topic.trim().to_lowercase().replace([' ', '-'], "_");

    let target_population = match extracted.target_population.trim().to_lowercase() {
        p if p.is_empty() || p == "everyone" || p == "adults" => GENERAL_POPULATION.to_string(),
        p => p,
    };
    let vulnerable = target_population != GENERAL_POPULATION;

    let potential_harm = extracted.potential_harm.min(100);
    let delays_treatment = TREATMENT_DELAY_CUE.is_match(&claim_text);

    ClaimDraft {
        urgency_hint: urgency_hint(potential_harm, vulnerable, delays_treatment),
        claim_text,
        claim_type: extracted.claim_type,
        topic,
        target_population,
        potential_harm,
        certainty_in_text: extracted.certainty.min(100),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClaimType, UrgencyHint};

    #[test]
    fn test_into_draft_normalizes_fields() {
        let draft = into_draft(ExtractedClaim {
            claim_text: "Stop taking   insulin and use cinnamon.".to_string(),
            claim_type: ClaimType::MedicalAdvice,
            topic: "Blood Sugar".to_string(),
            target_population: "".to_string(),
            certainty: 140,
            potential_harm: 95,
        });
        assert_eq!(draft.claim_text, "Stop taking insulin and use cinnamon");
        assert_eq!(draft.topic, "blood_sugar");
        assert_eq!(draft.target_population, "general");
        assert_eq!(draft.certainty_in_text, 100);
        assert_eq!(draft.urgency_hint, UrgencyHint::High);
    }

    #[tokio::test]
    #[ignore] // requires OPENAI_API_KEY and network access
    async fn test_live_extraction() {
        let client = LlmClient::from_env()
            .expect("OPENAI_API_KEY must be set")
            .unwrap();
        let extractor = LlmClaimExtractor::new(client);
        let drafts = extractor
            .extract("Antibiotics cure colds. I feel tired today.")
            .await
            .unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].topic, "antibiotics");
    }
}
