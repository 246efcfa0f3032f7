//! Database module for PostgreSQL persistence

pub mod memory;
pub mod models;
pub mod repository;
pub mod store;

pub use memory::MemoryAnalysisStore;
pub use repository::{PgAnalysisStore, PgEvidenceCorpus, SourceDocumentRepository};
pub use store::AnalysisStore;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::env;

use crate::model::SourceDocument;

// Environment variable names
const ENV_POSTGRES_HOST: &str = "MEDCLAIM_POSTGRES_HOST";
const ENV_POSTGRES_PORT: &str = "MEDCLAIM_POSTGRES_PORT";
const ENV_POSTGRES_USER: &str = "MEDCLAIM_POSTGRES_USER";
const ENV_POSTGRES_PASSWORD: &str = "MEDCLAIM_POSTGRES_PASSWORD";
const ENV_POSTGRES_DB: &str = "MEDCLAIM_POSTGRES_DB";

// Default values
const DEFAULT_POSTGRES_HOST: &str = "127.0.0.1";
const DEFAULT_POSTGRES_PORT: &str = "5432";
const DEFAULT_POSTGRES_USER: &str = "medclaim";
const DEFAULT_POSTGRES_PASSWORD: &str = "medclaim";
const DEFAULT_POSTGRES_DB: &str = "medclaim";

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Create a new database connection pool
pub async fn create_pool() -> Result<PgPool, DbError> {
    let host = env::var(ENV_POSTGRES_HOST).unwrap_or_else(|_| DEFAULT_POSTGRES_HOST.to_string());
    let port = env::var(ENV_POSTGRES_PORT).unwrap_or_else(|_| DEFAULT_POSTGRES_PORT.to_string());
    let user = env::var(ENV_POSTGRES_USER).unwrap_or_else(|_| DEFAULT_POSTGRES_USER.to_string());
    let password =
        env::var(ENV_POSTGRES_PASSWORD).unwrap_or_else(|_| DEFAULT_POSTGRES_PASSWORD.to_string());
    let database = env::var(ENV_POSTGRES_DB).unwrap_or_else(|_| DEFAULT_POSTGRES_DB.to_string());

    let database_url = format!(
        "postgres://{}:{}@{}:{}/{}",
        user, password, host, port, database
    );

    tracing::debug!(host = %host, port = %port, database = %database, "Connecting to PostgreSQL");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;

    tracing::info!(host = %host, port = %port, "PostgreSQL connection established");

    Ok(pool)
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS analyses (
        id UUID PRIMARY KEY,
        input_type VARCHAR(8) NOT NULL,
        input_text TEXT NOT NULL,
        input_url TEXT,
        region VARCHAR(8) NOT NULL,
        tone VARCHAR(16) NOT NULL,
        audience VARCHAR(16) NOT NULL,
        platform VARCHAR(16) NOT NULL,
        status VARCHAR(16) NOT NULL,
        current_step VARCHAR(16),
        completed_steps TEXT[] NOT NULL DEFAULT '{}',
        canonical_text TEXT,
        overall_severity VARCHAR(16),
        red_flags_detected BOOLEAN NOT NULL DEFAULT FALSE,
        red_flags TEXT[] NOT NULL DEFAULT '{}',
        topics TEXT[] NOT NULL DEFAULT '{}',
        disclaimer TEXT,
        what_is_wrong TEXT,
        what_we_know TEXT,
        what_to_do TEXT,
        when_to_seek_care TEXT,
        error_message TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        completed_at TIMESTAMPTZ
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS claims (
        id UUID PRIMARY KEY,
        analysis_id UUID NOT NULL REFERENCES analyses(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        claim_text TEXT NOT NULL,
        claim_type VARCHAR(32) NOT NULL,
        topic VARCHAR(64) NOT NULL,
        target_population VARCHAR(64) NOT NULL,
        urgency_hint VARCHAR(16) NOT NULL,
        potential_harm SMALLINT NOT NULL,
        certainty_in_text SMALLINT NOT NULL,
        stance VARCHAR(16),
        stance_confidence SMALLINT,
        stance_explanation TEXT,
        severity VARCHAR(16),
        risk_reason TEXT,
        red_flags TEXT[] NOT NULL DEFAULT '{}'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS citations (
        id UUID PRIMARY KEY,
        claim_id UUID NOT NULL REFERENCES claims(id) ON DELETE CASCADE,
        source_document_id VARCHAR(128) NOT NULL,
        source_org VARCHAR(64) NOT NULL,
        source_title TEXT NOT NULL,
        source_url TEXT,
        snippet TEXT,
        relevance SMALLINT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS generated_outputs (
        id UUID PRIMARY KEY,
        analysis_id UUID NOT NULL REFERENCES analyses(id) ON DELETE CASCADE,
        format VARCHAR(32) NOT NULL,
        length VARCHAR(16) NOT NULL,
        content TEXT NOT NULL,
        UNIQUE (analysis_id, format, length)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS feedback (
        id UUID PRIMARY KEY,
        analysis_id UUID NOT NULL REFERENCES analyses(id) ON DELETE CASCADE,
        rating SMALLINT NOT NULL,
        comment TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS source_documents (
        id VARCHAR(128) PRIMARY KEY,
        title TEXT NOT NULL,
        organization VARCHAR(64) NOT NULL,
        url TEXT,
        content TEXT NOT NULL,
        category VARCHAR(64) NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_claims_analysis_id ON claims(analysis_id)",
    "CREATE INDEX IF NOT EXISTS idx_citations_claim_id ON citations(claim_id)",
    "CREATE INDEX IF NOT EXISTS idx_feedback_analysis_id ON feedback(analysis_id)",
];

/// Initialize database schema and seed the evidence corpus
pub async fn init_schema(pool: &PgPool, seed: &[SourceDocument]) -> Result<(), DbError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    let seeded = SourceDocumentRepository::new(pool.clone())
        .seed(seed)
        .await?;

    tracing::info!(seeded_sources = seeded, "Database schema initialized");

    Ok(())
}
