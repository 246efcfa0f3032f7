//! Database row types for analyses and their children

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::model::{
    Analysis, AnalysisStatus, Audience, Citation, Claim, ClaimType, GeneratedOutput, InputType,
    OutputFormat, OutputLength, PipelineStep, Platform, Region, Severity, SourceDocument, Stance,
    Tone, UrgencyHint,
};

fn parse_field<T>(value: &str, field: &str, parse: impl Fn(&str) -> Option<T>) -> Result<T, String> {
    parse(value).ok_or_else(|| format!("Invalid {}: {}", field, value))
}

fn parse_optional<T>(
    value: Option<&str>,
    field: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, String> {
    value.map(|v| parse_field(v, field, parse)).transpose()
}

/// Scores are stored as SMALLINT and always lie in 0-100
fn score(value: i16) -> u8 {
    value.clamp(0, 100) as u8
}

/// Database representation of an analysis
#[derive(Debug, Clone, FromRow)]
pub struct AnalysisRow {
    pub id: Uuid,
    pub input_type: String,
    pub input_text: String,
    pub input_url: Option<String>,
    pub region: String,
    pub tone: String,
    pub audience: String,
    pub platform: String,
    pub status: String,
    pub current_step: Option<String>,
    pub completed_steps: Vec<String>,
    pub canonical_text: Option<String>,
    pub overall_severity: Option<String>,
    pub red_flags_detected: bool,
    pub red_flags: Vec<String>,
    pub topics: Vec<String>,
    pub disclaimer: Option<String>,
    pub what_is_wrong: Option<String>,
    pub what_we_know: Option<String>,
    pub what_to_do: Option<String>,
    pub when_to_seek_care: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl AnalysisRow {
    /// Convert database row to domain model
    pub fn into_domain(self) -> Result<Analysis, String> {
        let completed_steps = self
            .completed_steps
            .iter()
            .map(|s| parse_field(s, "pipeline step", PipelineStep::parse))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Analysis {
            id: self.id,
            input_type: parse_field(&self.input_type, "input type", InputType::parse)?,
            input_text: self.input_text,
            input_url: self.input_url,
            region: parse_field(&self.region, "region", Region::parse)?,
            tone: parse_field(&self.tone, "tone", Tone::parse)?,
            audience: parse_field(&self.audience, "audience", Audience::parse)?,
            platform: parse_field(&self.platform, "platform", Platform::parse)?,
            status: parse_field(&self.status, "status", AnalysisStatus::parse)?,
            current_step: parse_optional(
                self.current_step.as_deref(),
                "pipeline step",
                PipelineStep::parse,
            )?,
            completed_steps,
            canonical_text: self.canonical_text,
            overall_severity: parse_optional(
                self.overall_severity.as_deref(),
                "severity",
                Severity::parse,
            )?,
            red_flags_detected: self.red_flags_detected,
            red_flags: self.red_flags,
            topics: self.topics,
            disclaimer: self.disclaimer,
            what_is_wrong: self.what_is_wrong,
            what_we_know: self.what_we_know,
            what_to_do: self.what_to_do,
            when_to_seek_care: self.when_to_seek_care,
            error_message: self.error_message,
            created_at: self.created_at,
            completed_at: self.completed_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ClaimRow {
    pub id: Uuid,
    pub analysis_id: Uuid,
    pub position: i32,
    pub claim_text: String,
    pub claim_type: String,
    pub topic: String,
    pub target_population: String,
    pub urgency_hint: String,
    pub potential_harm: i16,
    pub certainty_in_text: i16,
    pub stance: Option<String>,
    pub stance_confidence: Option<i16>,
    pub stance_explanation: Option<String>,
    pub severity: Option<String>,
    pub risk_reason: Option<String>,
    pub red_flags: Vec<String>,
}

impl ClaimRow {
    pub fn into_domain(self) -> Result<Claim, String> {
        Ok(Claim {
            id: self.id,
            analysis_id: self.analysis_id,
            position: self.position,
            claim_text: self.claim_text,
            claim_type: parse_field(&self.claim_type, "claim type", ClaimType::parse)?,
            topic: self.topic,
            target_population: self.target_population,
            urgency_hint: parse_field(&self.urgency_hint, "urgency hint", UrgencyHint::parse)?,
            potential_harm: score(self.potential_harm),
            certainty_in_text: score(self.certainty_in_text),
            stance: parse_optional(self.stance.as_deref(), "stance", Stance::parse)?,
            stance_confidence: self.stance_confidence.map(score),
            stance_explanation: self.stance_explanation,
            severity: parse_optional(self.severity.as_deref(), "severity", Severity::parse)?,
            risk_reason: self.risk_reason,
            red_flags: self.red_flags,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CitationRow {
    pub id: Uuid,
    pub claim_id: Uuid,
    pub source_document_id: String,
    pub source_org: String,
    pub source_title: String,
    pub source_url: Option<String>,
    pub snippet: Option<String>,
    pub relevance: i16,
}

impl CitationRow {
    pub fn into_domain(self) -> Citation {
        Citation {
            id: self.id,
            claim_id: self.claim_id,
            source_document_id: self.source_document_id,
            source_org: self.source_org,
            source_title: self.source_title,
            source_url: self.source_url,
            snippet: self.snippet,
            relevance: score(self.relevance),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct GeneratedOutputRow {
    pub id: Uuid,
    pub analysis_id: Uuid,
    pub format: String,
    pub length: String,
    pub content: String,
}

impl GeneratedOutputRow {
    pub fn into_domain(self) -> Result<GeneratedOutput, String> {
        Ok(GeneratedOutput {
            id: self.id,
            analysis_id: self.analysis_id,
            format: parse_field(&self.format, "output format", OutputFormat::parse)?,
            length: parse_field(&self.length, "output length", OutputLength::parse)?,
            content: self.content,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct SourceDocumentRow {
    pub id: String,
    pub title: String,
    pub organization: String,
    pub url: Option<String>,
    pub content: String,
    pub category: String,
}

impl From<SourceDocumentRow> for SourceDocument {
    fn from(row: SourceDocumentRow) -> Self {
        SourceDocument {
            id: row.id,
            title: row.title,
            organization: row.organization,
            url: row.url,
            content: row.content,
            category: row.category,
        }
    }
}
