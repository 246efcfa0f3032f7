//! Stance assignment from per-citation verdicts

use crate::model::Stance;
use crate::service::text::is_negated;

/// How one citation's snippet bears on the claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Affirms,
    Refutes,
    /// Topical, but the snippet does not address the claim directly
    Neutral,
}

/// What the stance step needs to know about one kept citation
#[derive(Debug, Clone)]
pub struct CitationEvidence<'a> {
    pub verdict: Verdict,
    pub relevance: u8,
    pub organization: &'a str,
    pub snippet: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StanceJudgment {
    pub stance: Stance,
    /// 0-100; agreement and coverage only, never claim importance
    pub confidence: u8,
    pub explanation: String,
}

const NO_EVIDENCE_CONFIDENCE: u8 = 10;
const MAX_UNCERTAIN_CONFIDENCE: f64 = 40.0;

/// Snippets must share two claim terms (or every term of a one-term
/// claim) to count; polarity then decides between affirm and refute.
pub fn verdict(
    claim_term_count: usize,
    claim_negated: bool,
    snippet: Option<&str>,
    snippet_overlap: usize,
) -> Verdict {
    let Some(snippet) = snippet else {
        return Verdict::Neutral;
    };
    let required = claim_term_count.min(2);
    if required == 0 || snippet_overlap < required {
        return Verdict::Neutral;
    }
    if is_negated(snippet) == claim_negated {
        Verdict::Affirms
    } else {
        Verdict::Refutes
    }
}

/// Majority of verdict-bearing citations decides; ties and silence are uncertain
pub fn judge(evidence: &[CitationEvidence<'_>]) -> StanceJudgment {
    let affirming: Vec<&CitationEvidence<'_>> = evidence
        .iter()
        .filter(|e| e.verdict == Verdict::Affirms)
        .collect();
    let refuting: Vec<&CitationEvidence<'_>> = evidence
        .iter()
        .filter(|e| e.verdict == Verdict::Refutes)
        .collect();

    let (stance, majority) = if refuting.len() > affirming.len() {
        (Stance::Contradicted, refuting)
    } else if affirming.len() > refuting.len() {
        (Stance::Supported, affirming)
    } else {
        return uncertain(evidence, !refuting.is_empty());
    };

    let bearing = evidence
        .iter()
        .filter(|e| e.verdict != Verdict::Neutral)
        .collect::<Vec<_>>();
    let agreement = majority.len() as f64 / bearing.len() as f64;
    let mean_relevance =
        bearing.iter().map(|e| e.relevance as f64).sum::<f64>() / bearing.len() as f64;
    let coverage = bearing.len().min(3) as f64 / 3.0;
    let confidence =
        (50.0 * agreement + 30.0 * mean_relevance / 100.0 + 20.0 * coverage).round() as u8;

    let organizations = distinct_organizations(&majority);
    let verb = match stance {
        Stance::Contradicted => "contradict",
        _ => "support",
    };
    let mut explanation = format!(
        "{} of {} directly relevant trusted sources {} this claim ({}).",
        majority.len(),
        bearing.len(),
        verb,
        organizations
    );
    if let Some(snippet) = majority.first().and_then(|e| e.snippet) {
        explanation.push_str(&format!(" {}: \"{}.\"", majority[0].organization, snippet));
    }

    StanceJudgment {
        stance,
        confidence: confidence.min(100),
        explanation,
    }
}

fn uncertain(evidence: &[CitationEvidence<'_>], split: bool) -> StanceJudgment {
    if evidence.is_empty() {
        return StanceJudgment {
            stance: Stance::Uncertain,
            confidence: NO_EVIDENCE_CONFIDENCE,
            explanation: "No trusted source in the evidence corpus addresses this claim."
                .to_string(),
        };
    }

    let mean_relevance =
        evidence.iter().map(|e| e.relevance as f64).sum::<f64>() / evidence.len() as f64;
    let confidence = (15.0 + 25.0 * mean_relevance / 100.0)
        .round()
        .min(MAX_UNCERTAIN_CONFIDENCE) as u8;

    let explanation = if split {
        "Trusted sources are split on this claim, so it cannot be confirmed or ruled out."
            .to_string()
    } else {
        format!(
            "Trusted sources discuss this topic ({}) but do not directly confirm or contradict the claim.",
            distinct_organizations(&evidence.iter().collect::<Vec<_>>())
        )
    };

    StanceJudgment {
        stance: Stance::Uncertain,
        confidence,
        explanation,
    }
}

fn distinct_organizations(evidence: &[&CitationEvidence<'_>]) -> String {
    let mut organizations: Vec<&str> = Vec::new();
    for e in evidence {
        if !organizations.contains(&e.organization) {
            organizations.push(e.organization);
        }
    }
    organizations.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evidence(verdict: Verdict, relevance: u8, org: &'static str) -> CitationEvidence<'static> {
        CitationEvidence {
            verdict,
            relevance,
            organization: org,
            snippet: Some("Antibiotics will not cure a cold"),
        }
    }

    #[test]
    fn test_verdict_polarity() {
        let snippet = Some("Antibiotics will not cure a cold");
        assert_eq!(verdict(3, false, snippet, 3), Verdict::Refutes);
        assert_eq!(verdict(3, true, snippet, 3), Verdict::Affirms);
        assert_eq!(verdict(3, false, Some("Antibiotics cure infections"), 2), Verdict::Affirms);
    }

    #[test]
    fn test_verdict_requires_overlap() {
        let snippet = Some("Antibiotics will not cure a cold");
        assert_eq!(verdict(3, false, snippet, 1), Verdict::Neutral);
        assert_eq!(verdict(1, false, snippet, 1), Verdict::Refutes);
        assert_eq!(verdict(3, false, None, 0), Verdict::Neutral);
    }

    #[test]
    fn test_majority_refutes_is_contradicted() {
        let j = judge(&[
            evidence(Verdict::Refutes, 100, "CDC"),
            evidence(Verdict::Refutes, 81, "WHO"),
            evidence(Verdict::Refutes, 66, "NHS"),
            evidence(Verdict::Neutral, 34, "FDA"),
        ]);
        assert_eq!(j.stance, Stance::Contradicted);
        // 50 + 30 * 0.8233 + 20
        assert_eq!(j.confidence, 95);
        assert!(j.explanation.starts_with("3 of 3 directly relevant trusted sources contradict"));
        assert!(j.explanation.contains("CDC, WHO, NHS"));
    }

    #[test]
    fn test_no_evidence_is_low_confidence_uncertain() {
        let j = judge(&[]);
        assert_eq!(j.stance, Stance::Uncertain);
        assert_eq!(j.confidence, 10);
    }

    #[test]
    fn test_tie_is_uncertain() {
        let j = judge(&[
            evidence(Verdict::Refutes, 90, "CDC"),
            evidence(Verdict::Affirms, 90, "WHO"),
        ]);
        assert_eq!(j.stance, Stance::Uncertain);
        assert!(j.confidence <= 40);
        assert!(j.explanation.contains("split"));
    }

    #[test]
    fn test_only_neutral_citations_is_uncertain() {
        let j = judge(&[evidence(Verdict::Neutral, 100, "CDC")]);
        assert_eq!(j.stance, Stance::Uncertain);
        assert_eq!(j.confidence, 40);
    }

    #[test]
    fn test_support_with_partial_agreement() {
        let j = judge(&[
            evidence(Verdict::Affirms, 80, "WHO"),
            evidence(Verdict::Affirms, 60, "CDC"),
            evidence(Verdict::Refutes, 40, "NHS"),
        ]);
        assert_eq!(j.stance, Stance::Supported);
        // 50 * 2/3 + 30 * 0.6 + 20 = 71.33
        assert_eq!(j.confidence, 71);
    }
}
