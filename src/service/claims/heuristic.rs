//! Deterministic lexicon-driven claim extraction
//!
//! A sentence is a checkable claim when it names a health topic and
//! carries an assertion cue. Metadata hints are derived from the same
//! lexicon so that identical text always yields identical drafts.

use async_trait::async_trait;

use super::lexicon::{
    self, CAUSAL_CUE, CERTAINTY_BOOSTER, CERTAINTY_HEDGE, DIRECTIVE_CUE, PREVENTION_CUE,
    SAFETY_CUE, STATISTICAL_CUE, TREATMENT_CUE, TREATMENT_DELAY_CUE, Topic,
};
use super::{ClaimExtractionError, ClaimExtractor};
use crate::model::claims::GENERAL_POPULATION;
use crate::model::{ClaimDraft, ClaimType, UrgencyHint};
use crate::service::text::{normalize_whitespace, split_sentences_keep_questions};

/// Bump when lexicon or scoring changes so cached extractions are not reused
pub const HEURISTIC_EXTRACTOR_ID: &str = "heuristic-v1";

const MIN_CLAIM_WORDS: usize = 3;
const CERTAINTY_BASELINE: i32 = 60;
const CERTAINTY_BOOST: i32 = 12;
const CERTAINTY_HEDGE_PENALTY: i32 = 15;

#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClaimExtractor;

impl HeuristicClaimExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Drafts for every checkable sentence, in text order
    pub fn extract_drafts(&self, text: &str) -> Vec<ClaimDraft> {
        split_sentences_keep_questions(text)
            .into_iter()
            .filter(|(_, is_question)| !is_question)
            .filter_map(|(sentence, _)| analyze_sentence(&sentence))
            .collect()
    }
}

#[async_trait]
impl ClaimExtractor for HeuristicClaimExtractor {
    fn id(&self) -> &str {
        HEURISTIC_EXTRACTOR_ID
    }

    async fn extract(&self, text: &str) -> Result<Vec<ClaimDraft>, ClaimExtractionError> {
        Ok(self.extract_drafts(text))
    }
}

/// Build a draft from one sentence, or `None` when it is not checkable
pub fn analyze_sentence(sentence: &str) -> Option<ClaimDraft> {
    let sentence = normalize_whitespace(&sentence.replace(['\u{2019}', '\u{2018}'], "'"));
    if sentence.split_whitespace().count() < MIN_CLAIM_WORDS {
        return None;
    }

    let topics = lexicon::matched_topics(&sentence);
    let primary = topics.first()?;
    let claim_type = classify_claim_type(&sentence)?;

    let target_population = lexicon::target_population(&sentence)
        .unwrap_or(GENERAL_POPULATION)
        .to_string();
    let vulnerable = target_population != GENERAL_POPULATION;
    let certainty = certainty_in_text(&sentence);
    let delays_treatment = TREATMENT_DELAY_CUE.is_match(&sentence);
    let harm = potential_harm(&topics, &sentence, certainty);

    Some(ClaimDraft {
        claim_text: sentence,
        claim_type,
        topic: primary.name.to_string(),
        target_population,
        urgency_hint: urgency_hint(harm, vulnerable, delays_treatment),
        potential_harm: harm,
        certainty_in_text: certainty,
    })
}

/// First matching cue family wins; `None` means no assertion at all
pub fn classify_claim_type(sentence: &str) -> Option<ClaimType> {
    if DIRECTIVE_CUE.is_match(sentence) {
        Some(ClaimType::MedicalAdvice)
    } else if CAUSAL_CUE.is_match(sentence) {
        Some(ClaimType::CausalClaim)
    } else if TREATMENT_CUE.is_match(sentence) {
        Some(ClaimType::TreatmentClaim)
    } else if PREVENTION_CUE.is_match(sentence) {
        Some(ClaimType::PreventionClaim)
    } else if SAFETY_CUE.is_match(sentence) {
        Some(ClaimType::SafetyClaim)
    } else if STATISTICAL_CUE.is_match(sentence) {
        Some(ClaimType::StatisticalClaim)
    } else {
        None
    }
}

pub fn certainty_in_text(sentence: &str) -> u8 {
    let boosters = CERTAINTY_BOOSTER.find_iter(sentence).count() as i32;
    let hedges = CERTAINTY_HEDGE.find_iter(sentence).count() as i32;
    let score =
        CERTAINTY_BASELINE + CERTAINTY_BOOST * boosters - CERTAINTY_HEDGE_PENALTY * hedges;
    score.clamp(0, 100) as u8
}

/// Highest topic weight, raised for cure claims, treatment delay and
/// assertive wording
pub fn potential_harm(topics: &[&Topic], sentence: &str, certainty: u8) -> u8 {
    let mut harm = topics.iter().map(|t| t.base_harm as u32).max().unwrap_or(0);
    if TREATMENT_CUE.is_match(sentence) {
        harm += 10;
    }
    if TREATMENT_DELAY_CUE.is_match(sentence) {
        harm += 25;
    }
    if certainty >= 80 {
        harm += 10;
    }
    harm.min(100) as u8
}

pub fn urgency_hint(harm: u8, vulnerable: bool, delays_treatment: bool) -> UrgencyHint {
    if delays_treatment || (vulnerable && harm >= 60) {
        UrgencyHint::High
    } else if harm >= 40 {
        UrgencyHint::Medium
    } else {
        UrgencyHint::Low
    }
}
