//! Web page retriever with readable-content extraction

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{PageContentType, PageRetriever, RetrievedPage, RetrieverError};

/// Subtrees that never hold primary content
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "aside", "form", "noscript",
];

/// Elements whose text becomes one line of readable content
const BLOCK_ELEMENTS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "blockquote",
];

pub struct WebPageRetriever {
    client: Client,
}

impl WebPageRetriever {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .user_agent("medclaim-intel/1.0")
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }
}

#[async_trait]
impl PageRetriever for WebPageRetriever {
    async fn retrieve(&self, url: &Url) -> Result<RetrievedPage, RetrieverError> {
        tracing::debug!(url = %url, "Fetching web page");

        let response = self.client.get(url.as_str()).send().await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!(url = %url, "Web request rate limited");
            return Err(RetrieverError::RateLimited);
        }

        if !response.status().is_success() {
            return Err(RetrieverError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let content_type_header = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_else(|| "text/html".to_string());

        let content_type = PageContentType::from_header(&content_type_header)
            .ok_or_else(|| RetrieverError::UnsupportedContentType(content_type_header.clone()))?;

        let raw_content = response.text().await?;

        let (title, text) = match content_type {
            PageContentType::Html => extract_readable_text(&raw_content),
            PageContentType::PlainText | PageContentType::Markdown => {
                (None, raw_content.trim().to_string())
            }
        };

        if text.trim().is_empty() {
            return Err(RetrieverError::NoReadableContent(url.to_string()));
        }

        tracing::debug!(
            url = %url,
            content_type = ?content_type,
            text_length = text.len(),
            "Fetched readable content"
        );

        Ok(RetrievedPage {
            url: url.clone(),
            content_type,
            title,
            text,
        })
    }
}

/// Title and primary readable text of an HTML document.
///
/// Content is taken from `<article>`, else `<main>`, else `<body>`, one
/// block element per line, skipping navigation and scripting subtrees.
pub fn extract_readable_text(html: &str) -> (Option<String>, String) {
    let document = Html::parse_document(html);
    let title = extract_title(&document);

    let root = ["article", "main", "body"]
        .iter()
        .filter_map(|tag| Selector::parse(tag).ok())
        .find_map(|selector| document.select(&selector).next());

    let Some(root) = root else {
        return (title, String::new());
    };

    let mut lines: Vec<String> = Vec::new();
    if let Ok(selector) = Selector::parse(&BLOCK_ELEMENTS.join(", ")) {
        for element in root.select(&selector) {
            if is_within(&element, SKIPPED_ELEMENTS) || is_within(&element, BLOCK_ELEMENTS) {
                continue;
            }
            let line = collapse(&element.text().collect::<Vec<_>>().join(" "));
            if !line.is_empty() {
                lines.push(line);
            }
        }
    }

    // Pages without block markup: fall back to the root's own text
    if lines.is_empty() {
        let line = collapse(&visible_text(root));
        if !line.is_empty() {
            lines.push(line);
        }
    }

    // a title alone is not readable content
    if lines.is_empty() {
        return (title, String::new());
    }

    if let Some(ref t) = title
        && lines.first() != Some(t)
    {
        lines.insert(0, t.clone());
    }

    (title, lines.join("\n"))
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let title = collapse(&document.select(&selector).next()?.text().collect::<String>());
    (!title.is_empty()).then_some(title)
}

/// Whether any ancestor of `element` is one of `tags`
fn is_within(element: &ElementRef<'_>, tags: &[&str]) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .is_some_and(|e| tags.contains(&e.name()))
    })
}

fn visible_text(root: ElementRef<'_>) -> String {
    root.descendants()
        .filter_map(|node| node.value().as_text().map(|t| (node, t)))
        .filter(|(node, _)| {
            !node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| SKIPPED_ELEMENTS.contains(&e.name()))
            })
        })
        .map(|(_, t)| t.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_content_preferred() {
        let html = r#"<html><head><title>Cold cures</title><script>var x = 1;</script></head>
            <body>
              <nav><a href="/">Home</a><p>Menu item</p></nav>
              <header><p>Site banner</p></header>
              <article>
                <h1>Cold cures that work</h1>
                <p>Antibiotics   cure colds.</p>
                <ul><li><p>Vitamin C prevents flu.</p></li></ul>
              </article>
              <footer><p>Copyright</p></footer>
            </body></html>"#;
        let (title, text) = extract_readable_text(html);
        assert_eq!(title.as_deref(), Some("Cold cures"));
        assert_eq!(
            text,
            "Cold cures\nCold cures that work\nAntibiotics cure colds.\nVitamin C prevents flu."
        );
    }

    #[test]
    fn test_body_fallback_skips_chrome() {
        let html = r#"<html><body>
              <nav><p>Menu</p></nav>
              <p>Detox teas remove toxins.</p>
              <aside><p>Ad</p></aside>
            </body></html>"#;
        let (title, text) = extract_readable_text(html);
        assert!(title.is_none());
        assert_eq!(text, "Detox teas remove toxins.");
    }

    #[test]
    fn test_unstructured_body_text() {
        let html = "<html><body><div>Garlic cures  everything</div><script>x()</script></body></html>";
        let (_, text) = extract_readable_text(html);
        assert_eq!(text, "Garlic cures everything");
    }

    #[test]
    fn test_title_only_is_not_content() {
        let html = "<html><head><title>Empty</title></head><body><nav>x</nav></body></html>";
        let (title, text) = extract_readable_text(html);
        assert_eq!(title.as_deref(), Some("Empty"));
        assert!(text.is_empty());
    }
}
