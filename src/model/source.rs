use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Trusted reference document in the Evidence Corpus. Read-only to the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SourceDocument {
    pub id: String,
    pub title: String,
    pub organization: String,
    pub url: Option<String>,
    pub content: String,
    pub category: String,
}

/// Seed file layout for the built-in corpus
#[derive(Debug, Clone, Deserialize)]
pub struct CorpusFile {
    pub documents: Vec<SourceDocument>,
}
