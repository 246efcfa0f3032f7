//! Claim extraction service
//!
//! Turns canonical text into ordered claim drafts. The extractor itself is
//! pluggable (`HeuristicClaimExtractor` by default, `LlmClaimExtractor`
//! when an OpenAI key is configured); this service adds noise filtering,
//! near-duplicate synthesis and an optional Redis cache in front of it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::model::ClaimDraft;
use crate::service::cache::AnalysisCache;
use crate::service::cache_keys::generate_claims_cache_key;
use crate::service::claims::filters::filter_weak_claims;
use crate::service::claims::synthesis::synthesize_claims;

pub mod error;
pub mod filters;
pub mod heuristic;
pub mod lexicon;
pub mod llm;
pub mod prompts;
pub mod synthesis;
pub mod validation;

pub use error::ClaimExtractionError;
pub use heuristic::HeuristicClaimExtractor;
pub use llm::LlmClaimExtractor;

/// Source of raw claim drafts for a canonical text
#[async_trait]
pub trait ClaimExtractor: Send + Sync {
    /// Stable identifier; part of the claim cache key
    fn id(&self) -> &str;

    async fn extract(&self, text: &str) -> Result<Vec<ClaimDraft>, ClaimExtractionError>;
}

/// Service for extracting claims from canonical input text
pub struct ClaimExtractionService {
    extractor: Arc<dyn ClaimExtractor>,
    cache: Option<AnalysisCache>,
}

impl ClaimExtractionService {
    pub fn new(extractor: Arc<dyn ClaimExtractor>, cache: Option<AnalysisCache>) -> Self {
        tracing::info!(
            extractor = %extractor.id(),
            cache_enabled = cache.is_some(),
            "Claim extraction service initialized"
        );
        Self { extractor, cache }
    }

    pub fn extractor_id(&self) -> &str {
        self.extractor.id()
    }

    /// Extract, filter and de-duplicate claims. Zero claims is a valid result.
    pub async fn extract_claims(
        &self,
        canonical_text: &str,
    ) -> Result<Vec<ClaimDraft>, ClaimExtractionError> {
        if canonical_text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let cache_key = generate_claims_cache_key(self.extractor.id(), canonical_text);
        if let Some(cached) = self.get_cached_claims(&cache_key).await {
            tracing::debug!(
                claim_count = cached.len(),
                "Cache hit for extracted claims"
            );
            return Ok(cached);
        }

        let raw = self.extractor.extract(canonical_text).await?;
        let raw_claim_count = raw.len();
        let filtered = filter_weak_claims(raw);
        let filtered_claim_count = filtered.len();
        let claims = synthesize_claims(filtered);

        tracing::info!(
            extractor = %self.extractor.id(),
            raw_claim_count = raw_claim_count,
            filtered_claim_count = filtered_claim_count,
            claim_count = claims.len(),
            "Claim extraction complete"
        );

        self.cache_claims(&cache_key, &claims).await;
        Ok(claims)
    }

    async fn get_cached_claims(&self, key: &str) -> Option<Vec<ClaimDraft>> {
        let cache = self.cache.as_ref()?;
        cache.get_claims::<Vec<ClaimDraft>>(key).await.ok()
    }

    async fn cache_claims(&self, key: &str, claims: &[ClaimDraft]) {
        if let Some(ref cache) = self.cache
            && let Err(e) = cache.set_claims(key, &claims.to_vec()).await
        {
            tracing::warn!(error = %e, "Failed to cache extracted claims");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> ClaimExtractionService {
        ClaimExtractionService::new(Arc::new(HeuristicClaimExtractor::new()), None)
    }

    #[tokio::test]
    async fn test_mixed_text_yields_only_checkable_claims() {
        let claims = service()
            .extract_claims(
                "Antibiotics cure colds. I feel tired today. Antibiotics always cure a cold!",
            )
            .await
            .unwrap();
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].topic, "antibiotics");
        assert_eq!(claims[0].claim_text, "Antibiotics always cure a cold");
    }

    #[tokio::test]
    async fn test_no_claims_is_ok() {
        let claims = service().extract_claims("I feel tired today.").await.unwrap();
        assert!(claims.is_empty());
        assert!(service().extract_claims("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_extractor_errors_propagate() {
        struct Failing;

        #[async_trait]
        impl ClaimExtractor for Failing {
            fn id(&self) -> &str {
                "failing"
            }
            async fn extract(&self, _: &str) -> Result<Vec<ClaimDraft>, ClaimExtractionError> {
                Err(ClaimExtractionError::ExtractionFailed("model offline".to_string()))
            }
        }

        let service = ClaimExtractionService::new(Arc::new(Failing), None);
        let err = service.extract_claims("Antibiotics cure colds").await.unwrap_err();
        assert!(matches!(err, ClaimExtractionError::ExtractionFailed(_)));
    }
}
