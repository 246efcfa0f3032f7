//! Ingest step: raw input to canonical text

use std::sync::Arc;

use url::Url;

use crate::model::{Analysis, InputType};
use crate::retriever::{PageRetriever, RetrieverError};
use crate::service::text::truncate_on_word_boundary;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum IngestError {
    #[error("input is empty")]
    EmptyInput,

    #[error("could not fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("no readable content at {0}")]
    Extraction(String),

    #[error("URL not allowed by configuration: {0}")]
    Blocked(String),
}

pub struct Ingestor {
    retriever: Arc<dyn PageRetriever>,
    max_input_chars: usize,
}

impl Ingestor {
    pub fn new(retriever: Arc<dyn PageRetriever>, max_input_chars: usize) -> Self {
        Self {
            retriever,
            max_input_chars,
        }
    }

    /// Canonical text for an analysis, capped at `max_input_chars`
    pub async fn ingest(&self, analysis: &Analysis) -> Result<String, IngestError> {
        let text = match analysis.input_type {
            InputType::Text => canonicalize(&analysis.input_text),
            InputType::Url => {
                let url = analysis.input_url.as_deref().unwrap_or_default();
                self.fetch(url).await?
            }
        };

        if text.is_empty() {
            return Err(IngestError::EmptyInput);
        }

        let original_chars = text.chars().count();
        let text = truncate_on_word_boundary(&text, self.max_input_chars);
        if text.chars().count() < original_chars {
            tracing::info!(
                analysis_id = %analysis.id,
                original_chars = original_chars,
                max_input_chars = self.max_input_chars,
                "Canonical text truncated"
            );
        }
        Ok(text)
    }

    async fn fetch(&self, raw_url: &str) -> Result<String, IngestError> {
        let url = Url::parse(raw_url.trim()).map_err(|e| IngestError::Fetch {
            url: raw_url.to_string(),
            reason: e.to_string(),
        })?;

        let page = self.retriever.retrieve(&url).await.map_err(|e| match e {
            RetrieverError::Blocked(u) => IngestError::Blocked(u),
            RetrieverError::NoReadableContent(u) => IngestError::Extraction(u),
            other => IngestError::Fetch {
                url: url.to_string(),
                reason: other.to_string(),
            },
        })?;

        let text = canonicalize(&page.text);
        if text.is_empty() {
            return Err(IngestError::Extraction(url.to_string()));
        }
        Ok(text)
    }
}

/// Trim, collapse whitespace within lines and drop blank lines
pub fn canonicalize(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
