//! Evidence Corpus access
//!
//! The corpus is read-only to the pipeline. The built-in seed lives in
//! `corpus/sources.yaml` and is shared by the in-memory corpus and the
//! PostgreSQL seeding path.

use async_trait::async_trait;

use crate::model::SourceDocument;
use crate::model::source::CorpusFile;

/// Built-in curated seed
pub const BUILTIN_CORPUS_YAML: &str = include_str!("../../../corpus/sources.yaml");

#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum EvidenceError {
    #[error("evidence corpus unavailable: {0}")]
    CorpusUnavailable(String),

    #[error("invalid corpus seed: {0}")]
    InvalidSeed(String),
}

/// Queryable set of trusted source documents
#[async_trait]
pub trait EvidenceCorpus: Send + Sync {
    /// Human-readable backend name for logs and health output
    fn name(&self) -> &str;

    async fn documents(&self) -> Result<Vec<SourceDocument>, EvidenceError>;
}

/// Parse the YAML seed layout into documents
pub fn parse_corpus(yaml: &str) -> Result<Vec<SourceDocument>, EvidenceError> {
    let file: CorpusFile =
        serde_yaml::from_str(yaml).map_err(|e| EvidenceError::InvalidSeed(e.to_string()))?;

    let mut seen = std::collections::HashSet::new();
    for doc in &file.documents {
        if !seen.insert(doc.id.as_str()) {
            return Err(EvidenceError::InvalidSeed(format!(
                "duplicate document id {}",
                doc.id
            )));
        }
        if doc.content.trim().is_empty() {
            return Err(EvidenceError::InvalidSeed(format!(
                "document {} has no content",
                doc.id
            )));
        }
    }

    Ok(file.documents)
}

/// In-process corpus
#[derive(Debug, Clone)]
pub struct StaticCorpus {
    documents: Vec<SourceDocument>,
}

impl StaticCorpus {
    pub fn new(documents: Vec<SourceDocument>) -> Self {
        Self { documents }
    }

    /// The built-in curated corpus
    pub fn builtin() -> Result<Self, EvidenceError> {
        Ok(Self::new(parse_corpus(BUILTIN_CORPUS_YAML)?))
    }
}

#[async_trait]
impl EvidenceCorpus for StaticCorpus {
    fn name(&self) -> &str {
        "static"
    }

    async fn documents(&self) -> Result<Vec<SourceDocument>, EvidenceError> {
        Ok(self.documents.clone())
    }
}
