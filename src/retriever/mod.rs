//! Page retrieval for URL inputs

mod web;

use async_trait::async_trait;
use url::Url;

use crate::model::RetrieverConfig;

pub use web::{WebPageRetriever, extract_readable_text};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RetrieverError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Rate limited")]
    RateLimited,

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("URL blocked by configuration: {0}")]
    Blocked(String),

    #[error("No readable content at {0}")]
    NoReadableContent(String),
}

/// Kind of body a page was served as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageContentType {
    Html,
    PlainText,
    Markdown,
}

impl PageContentType {
    /// Map a `Content-Type` header; `None` for non-text bodies
    pub fn from_header(header: &str) -> Option<Self> {
        let mime = header
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        match mime.as_str() {
            "text/html" | "application/xhtml+xml" => Some(PageContentType::Html),
            "text/plain" => Some(PageContentType::PlainText),
            "text/markdown" | "text/x-markdown" => Some(PageContentType::Markdown),
            _ => None,
        }
    }
}

/// Readable content of a fetched page
#[derive(Debug, Clone)]
pub struct RetrievedPage {
    pub url: Url,
    pub content_type: PageContentType,
    pub title: Option<String>,
    /// Readable text, one block per line
    pub text: String,
}

/// Trait for page retrievers
#[async_trait]
pub trait PageRetriever: Send + Sync {
    async fn retrieve(&self, url: &Url) -> Result<RetrievedPage, RetrieverError>;
}

/// Applies the allow/deny configuration in front of the web retriever
pub struct RetrieverDispatcher {
    config: RetrieverConfig,
    web: WebPageRetriever,
}

impl RetrieverDispatcher {
    pub fn new(config: RetrieverConfig, web: WebPageRetriever) -> Self {
        if !config.allow.is_empty() {
            tracing::info!(allow = ?config.allow, "Retriever whitelist configured");
        }
        if !config.deny.is_empty() {
            tracing::info!(deny = ?config.deny, "Retriever blacklist configured");
        }
        Self { config, web }
    }
}

#[async_trait]
impl PageRetriever for RetrieverDispatcher {
    async fn retrieve(&self, url: &Url) -> Result<RetrievedPage, RetrieverError> {
        if !self.config.is_url_allowed(url) {
            tracing::debug!(url = %url, "URL blocked by configuration");
            return Err(RetrieverError::Blocked(url.to_string()));
        }
        self.web.retrieve(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_mapping() {
        assert_eq!(
            PageContentType::from_header("text/html; charset=utf-8"),
            Some(PageContentType::Html)
        );
        assert_eq!(
            PageContentType::from_header("TEXT/PLAIN"),
            Some(PageContentType::PlainText)
        );
        assert_eq!(PageContentType::from_header("application/pdf"), None);
        assert_eq!(PageContentType::from_header("image/png"), None);
    }

    #[tokio::test]
    async fn test_denied_host_is_blocked_before_fetch() {
        let dispatcher = RetrieverDispatcher::new(
            RetrieverConfig {
                allow: vec![],
                deny: vec!["blocked.example".to_string()],
            },
            WebPageRetriever::new(std::time::Duration::from_secs(1)),
        );
        let url = Url::parse("https://blocked.example/post").unwrap();
        assert!(matches!(
            dispatcher.retrieve(&url).await,
            Err(RetrieverError::Blocked(_))
        ));
    }
}
