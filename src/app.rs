//! Application state and service initialization
//!
//! This module centralizes all service initialization and dependency injection,
//! making it easier to manage the application lifecycle and test services.

use std::sync::Arc;

use crate::db::{AnalysisStore, PgAnalysisStore, PgEvidenceCorpus};
use crate::model::Config;
use crate::retriever::{RetrieverDispatcher, WebPageRetriever};
use crate::service::claims::{ClaimExtractor, HeuristicClaimExtractor, LlmClaimExtractor};
use crate::service::evidence::corpus::{BUILTIN_CORPUS_YAML, parse_corpus};
use crate::service::evidence::EvidenceCorpus;
use crate::service::llm::LlmClient;
use crate::service::{
    AnalysisCache, AnalysisPipeline, ClaimExtractionService, EvidenceMatcher, Ingestor,
};

/// Application state containing all services and shared resources
pub struct AppState {
    /// Redis cache (optional)
    pub cache: Option<AnalysisCache>,
    /// Claim analysis orchestrator; owns the store and the evidence corpus
    pub pipeline: Arc<AnalysisPipeline>,
}

impl AppState {
    /// Initialize all services and build application state
    ///
    /// This performs:
    /// 1. Database connection, schema initialization and corpus seeding
    /// 2. Redis cache initialization (optional)
    /// 3. Claim extractor selection (LLM when OPENAI_API_KEY is set)
    /// 4. Pipeline dependency graph construction
    pub async fn new(config: Config) -> Result<Self, AppError> {
        let seed = parse_corpus(BUILTIN_CORPUS_YAML)
            .map_err(|e| AppError::InvalidConfig(format!("built-in corpus: {e}")))?;

        // Initialize PostgreSQL database
        let db_pool = crate::db::create_pool()
            .await
            .map_err(|e| AppError::DatabaseInit(e.to_string()))?;

        crate::db::init_schema(&db_pool, &seed)
            .await
            .map_err(|e| AppError::DatabaseInit(e.to_string()))?;

        // Initialize Redis cache (optional - will log warning if Redis is unavailable)
        let cache = match AnalysisCache::new().await {
            Ok(cache) => {
                tracing::info!("Redis cache enabled");
                Some(cache)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis cache unavailable, running without cache");
                None
            }
        };

        let extractor = Self::build_extractor()?;

        Ok(Self::with_components(
            config,
            Arc::new(PgAnalysisStore::new(db_pool.clone())),
            Arc::new(PgEvidenceCorpus::new(db_pool)),
            extractor,
            cache,
        ))
    }

    /// Assemble the pipeline from already constructed backends
    pub fn with_components(
        config: Config,
        store: Arc<dyn AnalysisStore>,
        corpus: Arc<dyn EvidenceCorpus>,
        extractor: Arc<dyn ClaimExtractor>,
        cache: Option<AnalysisCache>,
    ) -> Self {
        let retriever = RetrieverDispatcher::new(
            config.retrievers.clone(),
            WebPageRetriever::new(config.pipeline.fetch_timeout()),
        );

        let pipeline = AnalysisPipeline::new(
            store,
            Ingestor::new(Arc::new(retriever), config.pipeline.max_input_chars),
            ClaimExtractionService::new(extractor, cache.clone()),
            EvidenceMatcher::new(corpus, config.pipeline.clone()),
            config.pipeline,
        );

        Self {
            cache,
            pipeline: Arc::new(pipeline),
        }
    }

    /// LLM extractor when an OpenAI key is configured, heuristic otherwise
    fn build_extractor() -> Result<Arc<dyn ClaimExtractor>, AppError> {
        match LlmClient::from_env() {
            Some(Ok(client)) => {
                let extractor = LlmClaimExtractor::new(client);
                tracing::info!(extractor = %extractor.id(), "Using LLM claim extractor");
                Ok(Arc::new(extractor))
            }
            Some(Err(e)) => Err(AppError::InvalidConfig(format!("OPENAI_API_KEY: {e}"))),
            None => {
                tracing::info!("OPENAI_API_KEY not set, using heuristic claim extractor");
                Ok(Arc::new(HeuristicClaimExtractor::new()))
            }
        }
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Database initialization failed
    #[error("Database initialization failed: {0}")]
    DatabaseInit(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
