//! Patient-facing summary fields

use std::collections::BTreeSet;

use crate::model::{Analysis, Audience, ClaimWithCitations, Region, Severity, Stance, Tone};
use crate::service::text::{normalize_whitespace, truncate_on_word_boundary};

use super::CitationRegistry;

pub const DISCLAIMER: &str = "This information is for general education and is not medical advice. \
Talk to a qualified health professional about your own situation.";

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub what_is_wrong: Option<String>,
    pub what_we_know: Option<String>,
    pub what_to_do: String,
    /// Only present when some claim is high or critical
    pub when_to_seek_care: Option<String>,
    pub disclaimer: String,
}

impl Summary {
    pub fn apply_to(&self, analysis: &mut Analysis) {
        analysis.what_is_wrong = self.what_is_wrong.clone();
        analysis.what_we_know = self.what_we_know.clone();
        analysis.what_to_do = Some(self.what_to_do.clone());
        analysis.when_to_seek_care = self.when_to_seek_care.clone();
        analysis.disclaimer = Some(self.disclaimer.clone());
    }
}

pub(super) fn compose(
    analysis: &Analysis,
    claims: &[ClaimWithCitations],
    citations: &CitationRegistry<'_>,
) -> Summary {
    Summary {
        what_is_wrong: Some(what_is_wrong(claims)),
        what_we_know: Some(what_we_know(analysis.region, claims, citations)),
        what_to_do: what_to_do(analysis.region, analysis.audience, analysis.tone, claims),
        when_to_seek_care: when_to_seek_care(analysis.region, claims),
        disclaimer: DISCLAIMER.to_string(),
    }
}

fn what_is_wrong(claims: &[ClaimWithCitations]) -> String {
    if claims.is_empty() {
        return "We did not find any specific health claims to check in this text.".to_string();
    }

    let flagged: Vec<String> = claims
        .iter()
        .filter(|c| matches!(c.claim.stance, Some(Stance::Contradicted | Stance::Uncertain)))
        .map(|c| {
            let explanation = c
                .claim
                .stance_explanation
                .as_deref()
                .map(plain)
                .unwrap_or_else(|| "Trusted sources do not back this claim.".to_string());
            format!("\"{}\": {}", quote(&c.claim.claim_text, 160), explanation)
        })
        .collect();

    if flagged.is_empty() {
        "The claims we checked are consistent with trusted health guidance.".to_string()
    } else {
        flagged.join("\n")
    }
}

fn what_we_know(
    region: Region,
    claims: &[ClaimWithCitations],
    citations: &CitationRegistry<'_>,
) -> String {
    if claims.is_empty() {
        return format!("Reliable health guidance is published by {}.", region.authority());
    }

    let mut used_documents = BTreeSet::new();
    let statements: Vec<String> = claims
        .iter()
        .filter_map(|c| c.citations.iter().find(|cit| cit.snippet.is_some()))
        .filter(|cit| used_documents.insert(cit.source_document_id.as_str()))
        .filter_map(|cit| {
            let number = citations.number_of(cit)?;
            let snippet = cit.snippet.as_deref()?;
            Some(format!(
                "{}: {} [{}]",
                cit.source_org,
                sentence(&plain(snippet)),
                number
            ))
        })
        .collect();

    if statements.is_empty() {
        "No source in our trusted evidence library directly addresses these claims yet.".to_string()
    } else {
        statements.join(" ")
    }
}

pub(super) fn what_to_do(
    region: Region,
    audience: Audience,
    tone: Tone,
    claims: &[ClaimWithCitations],
) -> String {
    let authority = region.authority();
    let mut parts = vec![what_to_do_lead(authority, audience, tone)];

    let topics: BTreeSet<&str> = claims
        .iter()
        .filter(|c| c.claim.stance != Some(Stance::Supported))
        .filter(|c| c.claim.severity >= Some(Severity::Medium))
        .map(|c| c.claim.topic.as_str())
        .collect();
    parts.extend(topics.into_iter().filter_map(|t| topic_advice(t, authority)));

    if claims
        .iter()
        .any(|c| c.claim.stance == Some(Stance::Contradicted))
    {
        parts.push(
            "Do not start, stop or change a treatment because of this claim without speaking to a doctor or pharmacist."
                .to_string(),
        );
    }

    parts.join(" ")
}

/// Opening instruction, worded for the reader and the requested tone
fn what_to_do_lead(authority: &str, audience: Audience, tone: Tone) -> String {
    match (tone, audience) {
        (Tone::Direct, Audience::Clinician) => {
            format!("Correct the claim and cite current guidance from {authority}.")
        }
        (Tone::Direct, Audience::Patient) => {
            format!("Check with {authority} or your doctor before you act on this.")
        }
        (Tone::Direct, Audience::General) => format!(
            "Do not act on or share this until you have checked it with {authority} or a qualified health professional."
        ),
        (Tone::Empathetic, Audience::Clinician) => format!(
            "Patients who raise this are usually trying to look after themselves; acknowledge that, then correct the claim with current guidance from {authority}."
        ),
        (Tone::Empathetic, Audience::Patient) => format!(
            "It is completely reasonable to have questions about this. Your doctor or {authority} can help you decide what is right for you."
        ),
        (Tone::Empathetic, Audience::General) => format!(
            "Wanting to share something that might help others is natural. Before you do, it is worth checking it with {authority} or a qualified health professional."
        ),
        (Tone::Neutral, Audience::Clinician) => format!(
            "Acknowledge the concern, correct the specific claim and point to current guidance from {authority}."
        ),
        (Tone::Neutral, Audience::Patient) => format!(
            "Check this information with {authority} or your own doctor before acting on it."
        ),
        (Tone::Neutral, Audience::General) => format!(
            "Before acting on or sharing health information, check it with {authority} or a qualified health professional."
        ),
    }
}

fn topic_advice(topic: &str, authority: &str) -> Option<String> {
    let advice = match topic {
        "antibiotics" => {
            "Antibiotics only work against bacterial infections; take them only when a health professional prescribes them.".to_string()
        }
        "vaccines" => format!("Follow the vaccination schedule recommended by {authority}."),
        "cancer" => "Keep to the treatment plan agreed with your cancer care team.".to_string(),
        "diabetes" => "Never stop insulin or other diabetes medicines without medical advice.".to_string(),
        "medications" => "Do not stop a prescribed medicine without talking to the prescriber.".to_string(),
        "heart_health" => "Keep taking prescribed heart medicines and ask your doctor before changing them.".to_string(),
        "pregnancy" => "Check any remedy or supplement with your midwife or doctor before using it in pregnancy.".to_string(),
        "mental_health" => "Talk to your care team before changing any mental health treatment.".to_string(),
        _ => return None,
    };
    Some(advice)
}

pub(super) fn when_to_seek_care(region: Region, claims: &[ClaimWithCitations]) -> Option<String> {
    let serious: Vec<&ClaimWithCitations> = claims
        .iter()
        .filter(|c| c.claim.severity.is_some_and(|s| s.is_red_flag()))
        .collect();
    if serious.is_empty() {
        return None;
    }

    let mut parts = vec![
        "Get medical advice promptly if symptoms get worse or do not improve, or if a prescribed treatment was stopped or delayed because of this claim."
            .to_string(),
    ];
    let populations: BTreeSet<&str> = serious
        .iter()
        .map(|c| c.claim.target_population.as_str())
        .collect();
    for population in populations {
        let line = match population {
            "infants" | "children" => {
                "Babies and children with a high fever, difficulty breathing or unusual drowsiness need urgent assessment."
            }
            "pregnant women" => {
                "In pregnancy, seek care urgently for bleeding, severe pain or reduced baby movements."
            }
            "people with diabetes" => {
                "People with diabetes should seek urgent care for very high or very low blood sugar readings."
            }
            _ => continue,
        };
        parts.push(line.to_string());
    }
    parts.push(format!("In an emergency, {}.", region.emergency_advice()));
    Some(parts.join(" "))
}

/// Single-line text with square brackets neutralised so it cannot carry `[n]` markers
pub(super) fn plain(text: &str) -> String {
    normalize_whitespace(&text.replace('[', "(").replace(']', ")"))
}

/// Claim text for quoting, capped at `max_chars`
pub(super) fn quote(text: &str, max_chars: usize) -> String {
    let text = plain(text);
    let trimmed = text.trim_end_matches(['.', '!', ';', ',']);
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    format!("{}...", truncate_on_word_boundary(trimmed, max_chars.saturating_sub(3)))
}

/// Ensure terminal punctuation
pub(super) fn sentence(text: &str) -> String {
    let text = text.trim();
    if text.ends_with(['.', '!', '?']) {
        text.to_string()
    } else {
        format!("{text}.")
    }
}
