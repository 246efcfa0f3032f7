use uuid::Uuid;

use crate::db::DbError;
use crate::model::{InputError, PipelineStep, TransitionError};
use crate::service::claims::ClaimExtractionError;
use crate::service::evidence::MatchError;
use crate::service::ingest::IngestError;
use crate::service::response::GenerationError;

/// Failure of a single pipeline step; terminates the run
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StageError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Claims(#[from] ClaimExtractionError),

    #[error(transparent)]
    Risk(#[from] MatchError),

    #[error(transparent)]
    Response(#[from] GenerationError),

    #[error("storage failure during {step}: {source}")]
    Store {
        step: PipelineStep,
        #[source]
        source: DbError,
    },
}

impl StageError {
    pub fn step(&self, current: PipelineStep) -> PipelineStep {
        match self {
            StageError::Ingest(_) => PipelineStep::Ingest,
            StageError::Claims(_) => PipelineStep::Claims,
            StageError::Risk(_) => PipelineStep::Risk,
            StageError::Response(_) => PipelineStep::Response,
            StageError::Store { .. } => current,
        }
    }

    /// Stage-tagged message safe to show to the submitter
    pub fn user_message(&self) -> String {
        match self {
            StageError::Ingest(e) => match e {
                IngestError::EmptyInput => "ingest: the input contains no readable text".to_string(),
                IngestError::Fetch { url, .. } => format!("ingest: could not fetch {url}"),
                IngestError::Extraction(url) => format!("ingest: no readable content found at {url}"),
                IngestError::Blocked(url) => format!("ingest: fetching {url} is not allowed"),
            },
            StageError::Claims(_) => "claims: claim extraction is currently unavailable".to_string(),
            StageError::Risk(MatchError::EvidenceUnavailable { attempts, .. }) => format!(
                "risk: the evidence corpus is unavailable (gave up after {attempts} attempts)"
            ),
            StageError::Response(_) => {
                "response: the full set of responses could not be generated".to_string()
            }
            StageError::Store { step, .. } => format!("{step}: internal storage error"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    #[error("analysis not found: {0}")]
    NotFound(Uuid),

    #[error("analysis {0} has already been started")]
    AlreadyStarted(Uuid),

    #[error("invalid step transition: {0}")]
    Transition(#[from] TransitionError),

    #[error("store error: {0}")]
    Store(#[from] DbError),
}
