//! Shared LLM client
//!
//! Wraps the OpenAI provider so the claim extractor and any later
//! LLM-backed step share one configured client.

use rig::providers::openai;

/// Environment variable holding the OpenAI API key
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Shared LLM client wrapper
#[derive(Clone)]
pub struct LlmClient {
    client: openai::Client,
}

impl LlmClient {
    /// Create a new LLM client with the provided API key
    pub fn new(api_key: &str) -> Result<Self, String> {
        let client = openai::Client::new(api_key)
            .map_err(|e| format!("Failed to create OpenAI client: {}", e))?;

        Ok(Self { client })
    }

    /// Build a client from `OPENAI_API_KEY`, or `None` when it is unset or blank
    pub fn from_env() -> Option<Result<Self, String>> {
        let key = std::env::var(ENV_OPENAI_API_KEY).ok()?;
        if key.trim().is_empty() {
            return None;
        }
        Some(Self::new(key.trim()))
    }

    /// Get a reference to the underlying OpenAI client
    pub fn openai_client(&self) -> &openai::Client {
        &self.client
    }
}
