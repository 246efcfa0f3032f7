//! Storage seam for analysis records

use async_trait::async_trait;
use uuid::Uuid;

use super::DbError;
use crate::model::{Analysis, AnalysisReport, Citation, Claim, Feedback, GeneratedOutput};

/// Durable store for analyses and everything the pipeline writes for them.
///
/// Reports are assembled in a fixed order: claims by extraction position,
/// citations by relevance then source document id, outputs by format then
/// length. Polling a finished analysis therefore returns identical bytes.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn create_analysis(&self, analysis: &Analysis) -> Result<(), DbError>;

    async fn get_analysis(&self, id: Uuid) -> Result<Option<Analysis>, DbError>;

    /// Atomically move a pending analysis to running.
    /// Returns false when the analysis is unknown or not pending.
    async fn try_start(&self, id: Uuid) -> Result<bool, DbError>;

    async fn save_analysis(&self, analysis: &Analysis) -> Result<(), DbError>;

    /// Replace all claims (and their citations) of an analysis
    async fn replace_claims(&self, analysis_id: Uuid, claims: &[Claim]) -> Result<(), DbError>;

    /// Persist one claim's classification and replace its citations
    async fn save_classification(&self, claim: &Claim, citations: &[Citation]) -> Result<(), DbError>;

    async fn replace_outputs(
        &self,
        analysis_id: Uuid,
        outputs: &[GeneratedOutput],
    ) -> Result<(), DbError>;

    async fn get_report(&self, id: Uuid) -> Result<Option<AnalysisReport>, DbError>;

    /// Fails with `NotFound` when the analysis does not exist
    async fn add_feedback(&self, feedback: &Feedback) -> Result<(), DbError>;

    /// Readiness check
    async fn ping(&self) -> Result<(), DbError>;
}

pub(crate) fn sort_citations(citations: &mut [Citation]) {
    citations.sort_by(|a, b| {
        b.relevance
            .cmp(&a.relevance)
            .then_with(|| a.source_document_id.cmp(&b.source_document_id))
    });
}
