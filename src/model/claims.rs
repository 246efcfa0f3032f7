use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::analysis::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    MedicalAdvice,
    CausalClaim,
    TreatmentClaim,
    PreventionClaim,
    SafetyClaim,
    StatisticalClaim,
}

impl ClaimType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimType::MedicalAdvice => "medical_advice",
            ClaimType::CausalClaim => "causal_claim",
            ClaimType::TreatmentClaim => "treatment_claim",
            ClaimType::PreventionClaim => "prevention_claim",
            ClaimType::SafetyClaim => "safety_claim",
            ClaimType::StatisticalClaim => "statistical_claim",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "medical_advice" => Some(ClaimType::MedicalAdvice),
            "causal_claim" => Some(ClaimType::CausalClaim),
            "treatment_claim" => Some(ClaimType::TreatmentClaim),
            "prevention_claim" => Some(ClaimType::PreventionClaim),
            "safety_claim" => Some(ClaimType::SafetyClaim),
            "statistical_claim" => Some(ClaimType::StatisticalClaim),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyHint {
    Low,
    Medium,
    High,
}

impl UrgencyHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyHint::Low => "low",
            UrgencyHint::Medium => "medium",
            UrgencyHint::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(UrgencyHint::Low),
            "medium" => Some(UrgencyHint::Medium),
            "high" => Some(UrgencyHint::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    Supported,
    Contradicted,
    Uncertain,
}

impl Stance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stance::Supported => "supported",
            Stance::Contradicted => "contradicted",
            Stance::Uncertain => "uncertain",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "supported" => Some(Stance::Supported),
            "contradicted" => Some(Stance::Contradicted),
            "uncertain" => Some(Stance::Uncertain),
            _ => None,
        }
    }
}

/// Population term used when no specific group is named
pub const GENERAL_POPULATION: &str = "general";

/// A claim as produced by an extractor, before it is attached to an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimDraft {
    pub claim_text: String,
    pub claim_type: ClaimType,
    pub topic: String,
    pub target_population: String,
    pub urgency_hint: UrgencyHint,
    /// 0-100 hint; see `service::claims::heuristic` for the derivation
    pub potential_harm: u8,
    /// 0-100 hint of how assertively the source states the claim
    pub certainty_in_text: u8,
}

/// An extracted claim, enriched in place by the risk step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Claim {
    pub id: Uuid,
    pub analysis_id: Uuid,
    /// Extraction order within the analysis
    pub position: i32,
    pub claim_text: String,
    pub claim_type: ClaimType,
    pub topic: String,
    pub target_population: String,
    pub urgency_hint: UrgencyHint,
    pub potential_harm: u8,
    pub certainty_in_text: u8,
    pub stance: Option<Stance>,
    pub stance_confidence: Option<u8>,
    pub stance_explanation: Option<String>,
    pub severity: Option<Severity>,
    pub risk_reason: Option<String>,
    pub red_flags: Vec<String>,
}

impl Claim {
    pub fn from_draft(analysis_id: Uuid, position: i32, draft: ClaimDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            analysis_id,
            position,
            claim_text: draft.claim_text,
            claim_type: draft.claim_type,
            topic: draft.topic,
            target_population: draft.target_population,
            urgency_hint: draft.urgency_hint,
            potential_harm: draft.potential_harm,
            certainty_in_text: draft.certainty_in_text,
            stance: None,
            stance_confidence: None,
            stance_explanation: None,
            severity: None,
            risk_reason: None,
            red_flags: Vec::new(),
        }
    }

    pub fn is_vulnerable_population(&self) -> bool {
        self.target_population != GENERAL_POPULATION
    }

    pub fn is_classified(&self) -> bool {
        self.stance.is_some() && self.severity.is_some()
    }
}

/// Evidence-corpus excerpt backing a claim's stance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Citation {
    pub id: Uuid,
    pub claim_id: Uuid,
    pub source_document_id: String,
    pub source_org: String,
    pub source_title: String,
    pub source_url: Option<String>,
    pub snippet: Option<String>,
    /// 0-100
    pub relevance: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClaimWithCitations {
    #[serde(flatten)]
    pub claim: Claim,
    pub citations: Vec<Citation>,
}

// ============================================================================
// LLM-extractable claim schema
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedClaims {
    pub claims: Vec<ExtractedClaim>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedClaim {
    /// Verbatim or near-verbatim span of the input text
    #[schemars(description = "The assertion, quoted verbatim (or near-verbatim) from the input")]
    pub claim_text: String,
    pub claim_type: ClaimType,
    #[schemars(description = "Short health topic, e.g. antibiotics, vaccines, cancer, diabetes")]
    pub topic: String,
    #[schemars(description = "Population the claim targets, or 'general'")]
    pub target_population: String,
    #[schemars(description = "How assertively the text states the claim, 0-100")]
    pub certainty: u8,
    #[schemars(description = "Harm if someone acted on the claim, 0-100")]
    pub potential_harm: u8,
}
