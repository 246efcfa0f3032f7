//! Utilities for generating cache keys for extracted claims

use sha2::{Digest, Sha256};

use crate::service::text::normalize_whitespace;

/// Generate cache key hash for a claim extraction
///
/// The key is based on:
/// - extractor_id (heuristic version, or LLM model + prompt hash)
/// - canonical text with whitespace collapsed
pub fn generate_claims_cache_key(extractor_id: &str, canonical_text: &str) -> String {
    let key_components = format!("{}|{}", extractor_id, normalize_whitespace(canonical_text));
    hash_string(&key_components)
}

/// Hash a string to a hex string using SHA256
pub fn hash_string(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    format!("{:x}", hasher.finalize())
}
