//! Harm-weighted severity and red-flag tagging

use crate::model::{Claim, ClaimType, Severity, Stance};
use crate::service::claims::lexicon::TREATMENT_DELAY_CUE;

/// Added to potential harm when the claim targets a vulnerable population
const VULNERABLE_HARM_BIAS: u16 = 15;
const HIGH_HARM: u8 = 75;
const MODERATE_HARM: u8 = 45;

pub const FLAG_DELAYS_PROVEN_TREATMENT: &str = "delays_proven_treatment";
pub const FLAG_UNPROVEN_CURE: &str = "unproven_cure";
pub const FLAG_ANTIBIOTIC_MISUSE: &str = "antibiotic_misuse";
pub const FLAG_VACCINE_MISINFORMATION: &str = "vaccine_misinformation";
pub const FLAG_VULNERABLE_POPULATION: &str = "vulnerable_population";
pub const FLAG_CONTRADICTS_TRUSTED_GUIDANCE: &str = "contradicts_trusted_guidance";

pub fn effective_harm(potential_harm: u8, vulnerable: bool) -> u8 {
    let bias = if vulnerable { VULNERABLE_HARM_BIAS } else { 0 };
    (potential_harm as u16 + bias).min(100) as u8
}

/// Severity from stance and effective harm. Confidence is not an input;
/// critical is only reachable by contradicted claims.
pub fn severity(stance: Stance, effective_harm: u8) -> Severity {
    match stance {
        Stance::Contradicted if effective_harm >= HIGH_HARM => Severity::Critical,
        Stance::Contradicted if effective_harm >= MODERATE_HARM => Severity::High,
        Stance::Contradicted => Severity::Medium,
        Stance::Uncertain if effective_harm >= HIGH_HARM => Severity::High,
        Stance::Uncertain if effective_harm >= MODERATE_HARM => Severity::Medium,
        Stance::Uncertain => Severity::Low,
        Stance::Supported if effective_harm >= HIGH_HARM => Severity::Medium,
        Stance::Supported => Severity::Low,
    }
}

/// Tags explaining why a high or critical claim was flagged; empty below high
pub fn red_flags(claim: &Claim, stance: Stance, severity: Severity) -> Vec<String> {
    if !severity.is_red_flag() {
        return Vec::new();
    }

    let mut flags = Vec::new();
    if TREATMENT_DELAY_CUE.is_match(&claim.claim_text) {
        flags.push(FLAG_DELAYS_PROVEN_TREATMENT);
    }
    if claim.claim_type == ClaimType::TreatmentClaim && stance != Stance::Supported {
        flags.push(FLAG_UNPROVEN_CURE);
    }
    if claim.topic == "antibiotics" {
        flags.push(FLAG_ANTIBIOTIC_MISUSE);
    }
    if claim.topic == "vaccines" && stance == Stance::Contradicted {
        flags.push(FLAG_VACCINE_MISINFORMATION);
    }
    if claim.is_vulnerable_population() {
        flags.push(FLAG_VULNERABLE_POPULATION);
    }
    if stance == Stance::Contradicted {
        flags.push(FLAG_CONTRADICTS_TRUSTED_GUIDANCE);
    }
    flags.into_iter().map(String::from).collect()
}

pub fn risk_reason(claim: &Claim, stance: Stance, severity: Severity, effective_harm: u8) -> String {
    let stance_phrase = match stance {
        Stance::Contradicted => "Contradicted by trusted guidance",
        Stance::Supported => "Consistent with trusted guidance",
        Stance::Uncertain => "Not settled by trusted guidance",
    };
    let mut reason = format!(
        "{}; {} severity at potential harm {}/100",
        stance_phrase,
        severity.as_str(),
        effective_harm
    );
    if claim.is_vulnerable_population() {
        reason.push_str(&format!(
            " (raised because it targets {})",
            claim.target_population
        ));
    }
    if TREATMENT_DELAY_CUE.is_match(&claim.claim_text) {
        reason.push_str("; it could lead someone to delay or replace proven treatment");
    }
    reason.push('.');
    reason
}

/// Analysis-level rollup computed once the risk step completes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RiskSummary {
    /// `None` when there are no claims
    pub overall_severity: Option<Severity>,
    pub red_flags_detected: bool,
    /// Distinct tags in first-seen claim order
    pub red_flags: Vec<String>,
    /// Distinct topics in claim order
    pub topics: Vec<String>,
}

pub fn summarize_risk(claims: &[Claim]) -> RiskSummary {
    let overall_severity = claims.iter().filter_map(|c| c.severity).max();

    let mut red_flags: Vec<String> = Vec::new();
    let mut topics: Vec<String> = Vec::new();
    for claim in claims {
        for flag in &claim.red_flags {
            if !red_flags.contains(flag) {
                red_flags.push(flag.clone());
            }
        }
        if !topics.contains(&claim.topic) {
            topics.push(claim.topic.clone());
        }
    }

    RiskSummary {
        overall_severity,
        red_flags_detected: claims
            .iter()
            .any(|c| c.severity.is_some_and(|s| s.is_red_flag())),
        red_flags,
        topics,
    }
}
