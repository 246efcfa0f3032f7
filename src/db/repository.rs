//! PostgreSQL repositories for analyses and the evidence corpus

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::DbError;
use super::models::{AnalysisRow, CitationRow, ClaimRow, GeneratedOutputRow, SourceDocumentRow};
use super::store::{AnalysisStore, sort_citations};
use crate::model::{
    Analysis, AnalysisReport, Citation, Claim, ClaimWithCitations, Feedback, GeneratedOutput,
    SourceDocument,
};
use crate::service::evidence::{EvidenceCorpus, EvidenceError};

/// `AnalysisStore` backed by PostgreSQL
#[derive(Clone)]
pub struct PgAnalysisStore {
    pool: PgPool,
}

impl PgAnalysisStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn citations_for(&self, claim_ids: &[Uuid]) -> Result<Vec<Citation>, DbError> {
        let rows: Vec<CitationRow> = sqlx::query_as(
            r#"
            SELECT * FROM citations WHERE claim_id = ANY($1)
            "#,
        )
        .bind(claim_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(CitationRow::into_domain).collect())
    }
}

async fn insert_citations(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    citations: &[Citation],
) -> Result<(), DbError> {
    for citation in citations {
        sqlx::query(
            r#"
            INSERT INTO citations (
                id, claim_id, source_document_id, source_org, source_title,
                source_url, snippet, relevance
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(citation.id)
        .bind(citation.claim_id)
        .bind(&citation.source_document_id)
        .bind(&citation.source_org)
        .bind(&citation.source_title)
        .bind(&citation.source_url)
        .bind(&citation.snippet)
        .bind(citation.relevance as i16)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

#[async_trait]
impl AnalysisStore for PgAnalysisStore {
    async fn create_analysis(&self, analysis: &Analysis) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO analyses (
                id, input_type, input_text, input_url, region, tone, audience,
                platform, status, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(analysis.id)
        .bind(analysis.input_type.as_str())
        .bind(&analysis.input_text)
        .bind(&analysis.input_url)
        .bind(analysis.region.as_str())
        .bind(analysis.tone.as_str())
        .bind(analysis.audience.as_str())
        .bind(analysis.platform.as_str())
        .bind(analysis.status.as_str())
        .bind(analysis.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(analysis_id = %analysis.id, "Created analysis");
        Ok(())
    }

    async fn get_analysis(&self, id: Uuid) -> Result<Option<Analysis>, DbError> {
        let row: Option<AnalysisRow> = sqlx::query_as(
            r#"
            SELECT * FROM analyses WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_domain().map_err(DbError::Serialization))
            .transpose()
    }

    async fn try_start(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE analyses SET status = 'running' WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn save_analysis(&self, analysis: &Analysis) -> Result<(), DbError> {
        let completed_steps: Vec<&str> = analysis.completed_steps.iter().map(|s| s.as_str()).collect();

        let result = sqlx::query(
            r#"
            UPDATE analyses SET
                status = $2,
                current_step = $3,
                completed_steps = $4,
                canonical_text = $5,
                overall_severity = $6,
                red_flags_detected = $7,
                red_flags = $8,
                topics = $9,
                disclaimer = $10,
                what_is_wrong = $11,
                what_we_know = $12,
                what_to_do = $13,
                when_to_seek_care = $14,
                error_message = $15,
                completed_at = $16
            WHERE id = $1
            "#,
        )
        .bind(analysis.id)
        .bind(analysis.status.as_str())
        .bind(analysis.current_step.map(|s| s.as_str()))
        .bind(&completed_steps)
        .bind(&analysis.canonical_text)
        .bind(analysis.overall_severity.map(|s| s.as_str()))
        .bind(analysis.red_flags_detected)
        .bind(&analysis.red_flags)
        .bind(&analysis.topics)
        .bind(&analysis.disclaimer)
        .bind(&analysis.what_is_wrong)
        .bind(&analysis.what_we_know)
        .bind(&analysis.what_to_do)
        .bind(&analysis.when_to_seek_care)
        .bind(&analysis.error_message)
        .bind(analysis.completed_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(analysis.id.to_string()));
        }
        Ok(())
    }

    async fn replace_claims(&self, analysis_id: Uuid, claims: &[Claim]) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        // citations go with their claims via ON DELETE CASCADE
        sqlx::query("DELETE FROM claims WHERE analysis_id = $1")
            .bind(analysis_id)
            .execute(&mut *tx)
            .await?;

        for claim in claims {
            sqlx::query(
                r#"
                INSERT INTO claims (
                    id, analysis_id, position, claim_text, claim_type, topic,
                    target_population, urgency_hint, potential_harm, certainty_in_text,
                    stance, stance_confidence, stance_explanation, severity,
                    risk_reason, red_flags
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
                "#,
            )
            .bind(claim.id)
            .bind(analysis_id)
            .bind(claim.position)
            .bind(&claim.claim_text)
            .bind(claim.claim_type.as_str())
            .bind(&claim.topic)
            .bind(&claim.target_population)
            .bind(claim.urgency_hint.as_str())
            .bind(claim.potential_harm as i16)
            .bind(claim.certainty_in_text as i16)
            .bind(claim.stance.map(|s| s.as_str()))
            .bind(claim.stance_confidence.map(|c| c as i16))
            .bind(&claim.stance_explanation)
            .bind(claim.severity.map(|s| s.as_str()))
            .bind(&claim.risk_reason)
            .bind(&claim.red_flags)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(analysis_id = %analysis_id, claim_count = claims.len(), "Replaced claims");
        Ok(())
    }

    async fn save_classification(&self, claim: &Claim, citations: &[Citation]) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE claims SET
                stance = $2,
                stance_confidence = $3,
                stance_explanation = $4,
                severity = $5,
                risk_reason = $6,
                red_flags = $7
            WHERE id = $1
            "#,
        )
        .bind(claim.id)
        .bind(claim.stance.map(|s| s.as_str()))
        .bind(claim.stance_confidence.map(|c| c as i16))
        .bind(&claim.stance_explanation)
        .bind(claim.severity.map(|s| s.as_str()))
        .bind(&claim.risk_reason)
        .bind(&claim.red_flags)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(claim.id.to_string()));
        }

        sqlx::query("DELETE FROM citations WHERE claim_id = $1")
            .bind(claim.id)
            .execute(&mut *tx)
            .await?;
        insert_citations(&mut tx, citations).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn replace_outputs(
        &self,
        analysis_id: Uuid,
        outputs: &[GeneratedOutput],
    ) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM generated_outputs WHERE analysis_id = $1")
            .bind(analysis_id)
            .execute(&mut *tx)
            .await?;

        for output in outputs {
            sqlx::query(
                r#"
                INSERT INTO generated_outputs (id, analysis_id, format, length, content)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(output.id)
            .bind(analysis_id)
            .bind(output.format.as_str())
            .bind(output.length.as_str())
            .bind(&output.content)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_report(&self, id: Uuid) -> Result<Option<AnalysisReport>, DbError> {
        let Some(analysis) = self.get_analysis(id).await? else {
            return Ok(None);
        };

        let claim_rows: Vec<ClaimRow> = sqlx::query_as(
            r#"
            SELECT * FROM claims WHERE analysis_id = $1 ORDER BY position ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        let claims = claim_rows
            .into_iter()
            .map(ClaimRow::into_domain)
            .collect::<Result<Vec<_>, _>>()
            .map_err(DbError::Serialization)?;

        let claim_ids: Vec<Uuid> = claims.iter().map(|c| c.id).collect();
        let mut citations = self.citations_for(&claim_ids).await?;
        sort_citations(&mut citations);

        let claims = claims
            .into_iter()
            .map(|claim| {
                let own = citations
                    .iter()
                    .filter(|c| c.claim_id == claim.id)
                    .cloned()
                    .collect();
                ClaimWithCitations {
                    claim,
                    citations: own,
                }
            })
            .collect();

        let output_rows: Vec<GeneratedOutputRow> = sqlx::query_as(
            r#"
            SELECT * FROM generated_outputs WHERE analysis_id = $1
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        let mut outputs = output_rows
            .into_iter()
            .map(GeneratedOutputRow::into_domain)
            .collect::<Result<Vec<_>, _>>()
            .map_err(DbError::Serialization)?;
        outputs.sort_by_key(|o| (o.format, o.length));

        Ok(Some(AnalysisReport {
            analysis,
            claims,
            outputs,
        }))
    }

    async fn add_feedback(&self, feedback: &Feedback) -> Result<(), DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO feedback (id, analysis_id, rating, comment, created_at)
            SELECT $1, $2, $3, $4, $5
            WHERE EXISTS (SELECT 1 FROM analyses WHERE id = $2)
            "#,
        )
        .bind(feedback.id)
        .bind(feedback.analysis_id)
        .bind(feedback.rating as i16)
        .bind(&feedback.comment)
        .bind(feedback.created_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(feedback.analysis_id.to_string()));
        }
        tracing::debug!(analysis_id = %feedback.analysis_id, rating = feedback.rating, "Stored feedback");
        Ok(())
    }

    async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Repository for the curated source documents table
#[derive(Clone)]
pub struct SourceDocumentRepository {
    pool: PgPool,
}

impl SourceDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert seed documents that are not present yet; returns how many were added
    pub async fn seed(&self, documents: &[SourceDocument]) -> Result<u64, DbError> {
        let mut inserted = 0;
        for doc in documents {
            let result = sqlx::query(
                r#"
                INSERT INTO source_documents (id, title, organization, url, content, category)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(&doc.id)
            .bind(&doc.title)
            .bind(&doc.organization)
            .bind(&doc.url)
            .bind(&doc.content)
            .bind(&doc.category)
            .execute(&self.pool)
            .await?;
            inserted += result.rows_affected();
        }
        Ok(inserted)
    }

    pub async fn list(&self) -> Result<Vec<SourceDocument>, DbError> {
        let rows: Vec<SourceDocumentRow> = sqlx::query_as(
            r#"
            SELECT * FROM source_documents ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(SourceDocument::from).collect())
    }
}

/// Evidence corpus read from the `source_documents` table
pub struct PgEvidenceCorpus {
    repository: SourceDocumentRepository,
}

impl PgEvidenceCorpus {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: SourceDocumentRepository::new(pool),
        }
    }
}

#[async_trait]
impl EvidenceCorpus for PgEvidenceCorpus {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn documents(&self) -> Result<Vec<SourceDocument>, EvidenceError> {
        self.repository
            .list()
            .await
            .map_err(|e| EvidenceError::CorpusUnavailable(e.to_string()))
    }
}
