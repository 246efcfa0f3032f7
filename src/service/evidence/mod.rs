//! Evidence matching and stance classification
//!
//! For each claim: rank corpus documents, turn the kept ones into
//! citations, derive a stance from the citation verdicts, then rate
//! severity from stance and harm.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::model::{Citation, Claim, PipelineConfig, Severity, Stance};
use crate::service::text::{is_negated, terms};

pub mod corpus;
pub mod matcher;
pub mod severity;
pub mod stance;

pub use corpus::{EvidenceCorpus, EvidenceError, StaticCorpus};
pub use matcher::CorpusIndex;
pub use severity::{RiskSummary, summarize_risk};

use stance::{CitationEvidence, verdict};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MatchError {
    #[error("evidence corpus unavailable after {attempts} attempts: {source}")]
    EvidenceUnavailable {
        attempts: u32,
        #[source]
        source: EvidenceError,
    },
}

/// Everything the risk step writes back for one claim
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimAssessment {
    pub stance: Stance,
    pub confidence: u8,
    pub explanation: String,
    pub severity: Severity,
    pub risk_reason: String,
    pub red_flags: Vec<String>,
    /// Relevance descending, then document id
    pub citations: Vec<Citation>,
}

impl ClaimAssessment {
    /// Enrich the claim in place and hand back its citations
    pub fn apply_to(self, claim: &mut Claim) -> Vec<Citation> {
        claim.stance = Some(self.stance);
        claim.stance_confidence = Some(self.confidence);
        claim.stance_explanation = Some(self.explanation);
        claim.severity = Some(self.severity);
        claim.risk_reason = Some(self.risk_reason);
        claim.red_flags = self.red_flags;
        self.citations
    }
}

/// Classifies claims against an Evidence Corpus
pub struct EvidenceMatcher {
    corpus: Arc<dyn EvidenceCorpus>,
    config: PipelineConfig,
}

impl EvidenceMatcher {
    pub fn new(corpus: Arc<dyn EvidenceCorpus>, config: PipelineConfig) -> Self {
        Self { corpus, config }
    }

    pub fn corpus(&self) -> &Arc<dyn EvidenceCorpus> {
        &self.corpus
    }

    /// Query the corpus and classify one claim
    pub async fn assess(&self, claim: &Claim) -> Result<ClaimAssessment, MatchError> {
        let index = self.load_index().await?;
        Ok(self.assess_with_index(claim, &index))
    }

    /// Fetch a corpus snapshot, retrying transient failures with exponential backoff
    pub async fn load_index(&self) -> Result<CorpusIndex, MatchError> {
        let max_attempts = self.config.corpus_max_attempts.max(1);
        let mut last_error = None;

        for attempt in 0..max_attempts {
            match self.corpus.documents().await {
                Ok(documents) => {
                    if attempt > 0 {
                        tracing::info!(
                            corpus = %self.corpus.name(),
                            attempt = attempt + 1,
                            "Evidence corpus query succeeded after retry"
                        );
                    }
                    return Ok(CorpusIndex::build(documents));
                }
                Err(e) => {
                    last_error = Some(e);
                    if attempt + 1 < max_attempts {
                        let delay_ms = retry_delay_ms(self.config.corpus_retry_delay_ms, attempt);
                        tracing::warn!(
                            corpus = %self.corpus.name(),
                            attempt = attempt + 1,
                            max_attempts = max_attempts,
                            delay_ms = delay_ms,
                            "Evidence corpus query failed, retrying"
                        );
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    }
                }
            }
        }

        let source = last_error.unwrap_or_else(|| {
            EvidenceError::CorpusUnavailable("no attempt was made".to_string())
        });
        tracing::error!(
            corpus = %self.corpus.name(),
            attempts = max_attempts,
            error = %source,
            "Evidence corpus unavailable"
        );
        Err(MatchError::EvidenceUnavailable {
            attempts: max_attempts,
            source,
        })
    }

    /// Pure classification against a loaded index
    pub fn assess_with_index(&self, claim: &Claim, index: &CorpusIndex) -> ClaimAssessment {
        let claim_terms = terms(&claim.claim_text);
        let claim_negated = is_negated(&claim.claim_text);

        let ranked = index.rank(
            &claim_terms,
            &claim.topic,
            self.config.min_relevance,
            self.config.top_k,
        );

        let evidence: Vec<CitationEvidence<'_>> = ranked
            .iter()
            .map(|scored| CitationEvidence {
                verdict: verdict(
                    claim_terms.len(),
                    claim_negated,
                    scored.snippet.as_deref(),
                    scored.snippet_overlap,
                ),
                relevance: scored.relevance,
                organization: &scored.document.organization,
                snippet: scored.snippet.as_deref(),
            })
            .collect();
        let judgment = stance::judge(&evidence);

        let harm = severity::effective_harm(claim.potential_harm, claim.is_vulnerable_population());
        let rated = severity::severity(judgment.stance, harm);

        let citations = ranked
            .iter()
            .map(|scored| Citation {
                id: Uuid::new_v4(),
                claim_id: claim.id,
                source_document_id: scored.document.id.clone(),
                source_org: scored.document.organization.clone(),
                source_title: scored.document.title.clone(),
                source_url: scored.document.url.clone(),
                snippet: scored.snippet.clone(),
                relevance: scored.relevance,
            })
            .collect();

        tracing::debug!(
            claim_id = %claim.id,
            stance = %judgment.stance.as_str(),
            confidence = judgment.confidence,
            severity = %rated.as_str(),
            citation_count = ranked.len(),
            "Claim classified"
        );

        ClaimAssessment {
            stance: judgment.stance,
            confidence: judgment.confidence,
            red_flags: severity::red_flags(claim, judgment.stance, rated),
            risk_reason: severity::risk_reason(claim, judgment.stance, rated, harm),
            explanation: judgment.explanation,
            severity: rated,
            citations,
        }
    }
}

/// Upper bound for a single backoff sleep
const MAX_RETRY_DELAY_MS: u64 = 30_000;

/// Exponential backoff after the zero-based `attempt`, saturating at the cap
fn retry_delay_ms(base_ms: u64, attempt: u32) -> u64 {
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    base_ms.saturating_mul(factor).min(MAX_RETRY_DELAY_MS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClaimDraft;
    use crate::service::claims::HeuristicClaimExtractor;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn claims_from(text: &str) -> Vec<Claim> {
        let analysis_id = Uuid::new_v4();
        HeuristicClaimExtractor::new()
            .extract_drafts(text)
            .into_iter()
            .enumerate()
            .map(|(i, d): (usize, ClaimDraft)| Claim::from_draft(analysis_id, i as i32, d))
            .collect()
    }

    fn matcher() -> EvidenceMatcher {
        EvidenceMatcher::new(
            Arc::new(StaticCorpus::builtin().unwrap()),
            PipelineConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_antibiotics_cure_colds_is_contradicted() {
        let claim = &claims_from("Antibiotics cure colds.")[0];
        let assessment = matcher().assess(claim).await.unwrap();

        assert_eq!(assessment.stance, Stance::Contradicted);
        assert!(assessment.severity >= Severity::High);
        assert!(!assessment.citations.is_empty());
        assert!(
            assessment
                .citations
                .iter()
                .any(|c| c.source_org == "CDC" || c.source_org == "WHO")
        );
        assert!(
            assessment
                .citations
                .windows(2)
                .all(|w| w[0].relevance >= w[1].relevance)
        );
        assert!(assessment.red_flags.contains(&"antibiotic_misuse".to_string()));
    }

    #[tokio::test]
    async fn test_vaccines_autism_is_contradicted() {
        let claim = &claims_from("Vaccines cause autism.")[0];
        let assessment = matcher().assess(claim).await.unwrap();
        assert_eq!(assessment.stance, Stance::Contradicted);
        assert!(assessment.citations.iter().any(|c| c.source_org == "CDC"));
        assert!(assessment.red_flags.contains(&"vaccine_misinformation".to_string()));
    }

    #[test]
    fn test_unknown_topic_is_uncertain_without_citations() {
        let claim = &claims_from("Quantum crystals cure cancer.")[0];
        let assessment = matcher()
            .assess_with_index(claim, &CorpusIndex::build(Vec::new()));
        assert_eq!(assessment.stance, Stance::Uncertain);
        assert_eq!(assessment.confidence, 10);
        assert!(assessment.citations.is_empty());
    }

    #[tokio::test]
    async fn test_apply_to_enriches_claim() {
        let mut claim = claims_from("Antibiotics cure colds.").remove(0);
        let assessment = matcher().assess(&claim).await.unwrap();
        let citations = assessment.apply_to(&mut claim);
        assert!(claim.is_classified());
        assert!(citations.iter().all(|c| c.claim_id == claim.id));
    }

    struct FlakyCorpus {
        failures_before_success: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl EvidenceCorpus for FlakyCorpus {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn documents(&self) -> Result<Vec<crate::model::SourceDocument>, EvidenceError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                Err(EvidenceError::CorpusUnavailable("connection reset".to_string()))
            } else {
                StaticCorpus::builtin()?.documents().await
            }
        }
    }

    #[test]
    fn test_retry_delay_saturates() {
        assert_eq!(retry_delay_ms(200, 0), 200);
        assert_eq!(retry_delay_ms(200, 2), 800);
        assert_eq!(retry_delay_ms(200, 64), MAX_RETRY_DELAY_MS);
        assert_eq!(retry_delay_ms(u64::MAX, 3), MAX_RETRY_DELAY_MS);
        assert_eq!(retry_delay_ms(0, 200), 0);
    }

    fn fast_config(attempts: u32) -> PipelineConfig {
        PipelineConfig {
            corpus_max_attempts: attempts,
            corpus_retry_delay_ms: 1,
            ..PipelineConfig::default()
        }
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let corpus = Arc::new(FlakyCorpus {
            failures_before_success: 2,
            calls: AtomicU32::new(0),
        });
        let matcher = EvidenceMatcher::new(corpus.clone(), fast_config(3));
        let claim = &claims_from("Antibiotics cure colds.")[0];
        assert!(matcher.assess(claim).await.is_ok());
        assert_eq!(corpus.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_persistent_failure_surfaces_after_bounded_attempts() {
        let corpus = Arc::new(FlakyCorpus {
            failures_before_success: u32::MAX,
            calls: AtomicU32::new(0),
        });
        let matcher = EvidenceMatcher::new(corpus.clone(), fast_config(3));
        let claim = &claims_from("Antibiotics cure colds.")[0];
        let err = matcher.assess(claim).await.unwrap_err();
        assert!(matches!(err, MatchError::EvidenceUnavailable { attempts: 3, .. }));
        assert_eq!(corpus.calls.load(Ordering::SeqCst), 3);
    }
}
