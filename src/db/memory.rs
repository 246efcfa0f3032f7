//! In-process `AnalysisStore` backing the pipeline and API tests

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::DbError;
use super::store::{AnalysisStore, sort_citations};
use crate::model::{
    Analysis, AnalysisReport, AnalysisStatus, Citation, Claim, ClaimWithCitations, Feedback,
    GeneratedOutput,
};

#[derive(Default)]
struct Tables {
    analyses: HashMap<Uuid, Analysis>,
    /// Keyed by analysis id
    claims: HashMap<Uuid, Vec<Claim>>,
    /// Keyed by claim id
    citations: HashMap<Uuid, Vec<Citation>>,
    /// Keyed by analysis id
    outputs: HashMap<Uuid, Vec<GeneratedOutput>>,
    feedback: Vec<Feedback>,
}

#[derive(Default)]
pub struct MemoryAnalysisStore {
    tables: RwLock<Tables>,
}

impl MemoryAnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn feedback_for(&self, analysis_id: Uuid) -> Vec<Feedback> {
        self.tables
            .read()
            .await
            .feedback
            .iter()
            .filter(|f| f.analysis_id == analysis_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AnalysisStore for MemoryAnalysisStore {
    async fn create_analysis(&self, analysis: &Analysis) -> Result<(), DbError> {
        self.tables
            .write()
            .await
            .analyses
            .insert(analysis.id, analysis.clone());
        Ok(())
    }

    async fn get_analysis(&self, id: Uuid) -> Result<Option<Analysis>, DbError> {
        Ok(self.tables.read().await.analyses.get(&id).cloned())
    }

    async fn try_start(&self, id: Uuid) -> Result<bool, DbError> {
        let mut tables = self.tables.write().await;
        match tables.analyses.get_mut(&id) {
            Some(analysis) if analysis.status == AnalysisStatus::Pending => {
                analysis.status = AnalysisStatus::Running;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn save_analysis(&self, analysis: &Analysis) -> Result<(), DbError> {
        let mut tables = self.tables.write().await;
        match tables.analyses.get_mut(&analysis.id) {
            Some(existing) => {
                *existing = analysis.clone();
                Ok(())
            }
            None => Err(DbError::NotFound(analysis.id.to_string())),
        }
    }

    async fn replace_claims(&self, analysis_id: Uuid, claims: &[Claim]) -> Result<(), DbError> {
        let mut tables = self.tables.write().await;
        if let Some(previous) = tables.claims.remove(&analysis_id) {
            for claim in previous {
                tables.citations.remove(&claim.id);
            }
        }
        tables.claims.insert(analysis_id, claims.to_vec());
        Ok(())
    }

    async fn save_classification(&self, claim: &Claim, citations: &[Citation]) -> Result<(), DbError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .claims
            .get_mut(&claim.analysis_id)
            .and_then(|claims| claims.iter_mut().find(|c| c.id == claim.id))
            .ok_or_else(|| DbError::NotFound(claim.id.to_string()))?;
        *stored = claim.clone();
        tables.citations.insert(claim.id, citations.to_vec());
        Ok(())
    }

    async fn replace_outputs(
        &self,
        analysis_id: Uuid,
        outputs: &[GeneratedOutput],
    ) -> Result<(), DbError> {
        self.tables
            .write()
            .await
            .outputs
            .insert(analysis_id, outputs.to_vec());
        Ok(())
    }

    async fn get_report(&self, id: Uuid) -> Result<Option<AnalysisReport>, DbError> {
        let tables = self.tables.read().await;
        let Some(analysis) = tables.analyses.get(&id) else {
            return Ok(None);
        };

        let mut claims = tables.claims.get(&id).cloned().unwrap_or_default();
        claims.sort_by_key(|c| c.position);
        let claims = claims
            .into_iter()
            .map(|claim| {
                let mut citations = tables.citations.get(&claim.id).cloned().unwrap_or_default();
                sort_citations(&mut citations);
                ClaimWithCitations { claim, citations }
            })
            .collect();

        let mut outputs = tables.outputs.get(&id).cloned().unwrap_or_default();
        outputs.sort_by_key(|o| (o.format, o.length));

        Ok(Some(AnalysisReport {
            analysis: analysis.clone(),
            claims,
            outputs,
        }))
    }

    async fn add_feedback(&self, feedback: &Feedback) -> Result<(), DbError> {
        let mut tables = self.tables.write().await;
        if !tables.analyses.contains_key(&feedback.analysis_id) {
            return Err(DbError::NotFound(feedback.analysis_id.to_string()));
        }
        tables.feedback.push(feedback.clone());
        Ok(())
    }

    async fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnalysisRequest, ClaimDraft, ClaimType, UrgencyHint};
    use chrono::Utc;

    fn draft(text: &str) -> ClaimDraft {
        ClaimDraft {
            claim_text: text.to_string(),
            claim_type: ClaimType::TreatmentClaim,
            topic: "antibiotics".to_string(),
            target_population: "general".to_string(),
            urgency_hint: UrgencyHint::Medium,
            potential_harm: 55,
            certainty_in_text: 70,
        }
    }

    fn citation(claim_id: Uuid, doc: &str, relevance: u8) -> Citation {
        Citation {
            id: Uuid::new_v4(),
            claim_id,
            source_document_id: doc.to_string(),
            source_org: "CDC".to_string(),
            source_title: "Guidance".to_string(),
            source_url: None,
            snippet: None,
            relevance,
        }
    }

    #[tokio::test]
    async fn test_try_start_only_once() {
        let store = MemoryAnalysisStore::new();
        let analysis = AnalysisRequest::text("Antibiotics cure colds").into_analysis().unwrap();
        store.create_analysis(&analysis).await.unwrap();

        assert!(store.try_start(analysis.id).await.unwrap());
        assert!(!store.try_start(analysis.id).await.unwrap());
        assert!(!store.try_start(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_report_ordering_and_replacement() {
        let store = MemoryAnalysisStore::new();
        let analysis = AnalysisRequest::text("x").into_analysis().unwrap();
        store.create_analysis(&analysis).await.unwrap();

        let first = Claim::from_draft(analysis.id, 1, draft("Second claim"));
        let zeroth = Claim::from_draft(analysis.id, 0, draft("First claim"));
        store
            .replace_claims(analysis.id, &[first.clone(), zeroth.clone()])
            .await
            .unwrap();
        store
            .save_classification(
                &zeroth,
                &[
                    citation(zeroth.id, "b-doc", 50),
                    citation(zeroth.id, "a-doc", 50),
                    citation(zeroth.id, "c-doc", 90),
                ],
            )
            .await
            .unwrap();

        let report = store.get_report(analysis.id).await.unwrap().unwrap();
        assert_eq!(report.claims[0].claim.claim_text, "First claim");
        let docs: Vec<_> = report.claims[0]
            .citations
            .iter()
            .map(|c| c.source_document_id.as_str())
            .collect();
        assert_eq!(docs, vec!["c-doc", "a-doc", "b-doc"]);

        // re-running extraction replaces rather than appends
        store.replace_claims(analysis.id, &[zeroth]).await.unwrap();
        let report = store.get_report(analysis.id).await.unwrap().unwrap();
        assert_eq!(report.claims.len(), 1);
    }

    #[tokio::test]
    async fn test_feedback_requires_known_analysis() {
        let store = MemoryAnalysisStore::new();
        let feedback = Feedback {
            id: Uuid::new_v4(),
            analysis_id: Uuid::new_v4(),
            rating: 4,
            comment: None,
            created_at: Utc::now(),
        };
        assert!(matches!(
            store.add_feedback(&feedback).await,
            Err(DbError::NotFound(_))
        ));
    }
}
