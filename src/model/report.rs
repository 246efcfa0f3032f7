use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::analysis::Analysis;
use super::claims::ClaimWithCitations;
use super::outputs::GeneratedOutput;

/// Polling view of an analysis with everything persisted so far
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisReport {
    #[serde(flatten)]
    pub analysis: Analysis,
    pub claims: Vec<ClaimWithCitations>,
    pub outputs: Vec<GeneratedOutput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Feedback {
    pub id: Uuid,
    pub analysis_id: Uuid,
    /// 1-5
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
