use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use super::analysis::{Analysis, InputType};
use super::options::{Audience, Platform, Region, Tone};

/// Submission rejected before any analysis is created
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum InputError {
    #[error("input_text must not be empty for text input")]
    EmptyText,

    #[error("input_url must not be empty for url input")]
    EmptyUrl,

    #[error("input_url is not a valid http(s) URL: {0}")]
    InvalidUrl(String),
}

/// A new analysis submission
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalysisRequest {
    pub input_type: InputType,
    #[serde(default)]
    pub input_text: Option<String>,
    #[serde(default)]
    pub input_url: Option<String>,
    #[serde(default)]
    pub region: Region,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub audience: Audience,
    #[serde(default)]
    pub platform: Platform,
}

impl AnalysisRequest {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            input_type: InputType::Text,
            input_text: Some(text.into()),
            input_url: None,
            region: Region::default(),
            tone: Tone::default(),
            audience: Audience::default(),
            platform: Platform::default(),
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self {
            input_type: InputType::Url,
            input_text: None,
            input_url: Some(url.into()),
            region: Region::default(),
            tone: Tone::default(),
            audience: Audience::default(),
            platform: Platform::default(),
        }
    }

    /// Validate the submission and build the pending analysis record
    pub fn into_analysis(self) -> Result<Analysis, InputError> {
        let (input_text, input_url) = match self.input_type {
            InputType::Text => {
                let text = self.input_text.unwrap_or_default();
                if text.trim().is_empty() {
                    return Err(InputError::EmptyText);
                }
                (text, None)
            }
            InputType::Url => {
                let raw = self.input_url.unwrap_or_default();
                let raw = raw.trim();
                if raw.is_empty() {
                    return Err(InputError::EmptyUrl);
                }
                let url = Url::parse(raw).map_err(|_| InputError::InvalidUrl(raw.to_string()))?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(InputError::InvalidUrl(raw.to_string()));
                }
                (self.input_text.unwrap_or_default(), Some(url.to_string()))
            }
        };

        Ok(Analysis::new(
            self.input_type,
            input_text,
            input_url,
            self.region,
            self.tone,
            self.audience,
            self.platform,
        ))
    }
}
