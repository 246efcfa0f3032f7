//! Error types for claim extraction

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClaimExtractionError {
    #[error("LLM extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Extracted claims failed validation: {0}")]
    Validation(String),
}
