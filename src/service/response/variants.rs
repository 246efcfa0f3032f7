//! Templates for the format × length matrix

use crate::model::{
    Audience, ClaimWithCitations, OutputFormat, OutputLength, Platform, Severity, Stance, Tone,
};
use crate::service::text::truncate_on_word_boundary;

use super::ResponseContext;
use super::summary::{plain, quote, sentence, what_to_do, when_to_seek_care};

const SOCIAL_SHORT_MAX_CHARS: usize = 280;
const SHORT_QUOTE_CHARS: usize = 100;
const MEDIUM_FINDINGS: usize = 3;
const SOCIAL_PLATFORM_FINDINGS: usize = 2;

pub(super) fn render(ctx: &ResponseContext<'_>, format: OutputFormat, length: OutputLength) -> String {
    match format {
        OutputFormat::SocialReply => social_reply(ctx, length),
        OutputFormat::Handout => handout(ctx, length),
        OutputFormat::ClinicianNote => clinician_note(ctx, length),
    }
}

fn social_reply(ctx: &ResponseContext<'_>, length: OutputLength) -> String {
    match length {
        OutputLength::Short => {
            let text = format!("{}{}", short_opening(ctx.analysis.tone), headline(ctx));
            if text.chars().count() <= SOCIAL_SHORT_MAX_CHARS {
                text
            } else {
                truncate_on_word_boundary(&headline(ctx), SOCIAL_SHORT_MAX_CHARS)
            }
        }
        OutputLength::Medium => {
            let mut body = vec![format!("{}{}", opening(ctx.analysis.tone), headline(ctx))];
            let findings = plain_findings(ctx, medium_findings(ctx), false);
            if !findings.is_empty() {
                body.push(findings);
            }
            body.push(first_sentence(&ctx.summary.what_to_do));
            frame(ctx, body)
        }
        OutputLength::Long => {
            let mut body = vec![format!("{}{}", opening(ctx.analysis.tone), headline(ctx))];
            let findings = plain_findings(ctx, usize::MAX, true);
            if !findings.is_empty() {
                body.push(findings);
            }
            if let Some(ref known) = ctx.summary.what_we_know {
                body.push(format!("What we know: {known}"));
            }
            body.push(format!("What to do: {}", ctx.summary.what_to_do));
            if let Some(ref seek) = ctx.summary.when_to_seek_care {
                body.push(format!("When to get help: {seek}"));
            }
            body.push(source_list(ctx, "Sources:"));
            frame(ctx, body)
        }
    }
}

fn handout(ctx: &ResponseContext<'_>, length: OutputLength) -> String {
    let lead = format!("{}{}", opening(ctx.analysis.tone), headline(ctx));
    match length {
        OutputLength::Short => lead,
        OutputLength::Medium => {
            let mut body = vec!["Health fact check".to_string(), lead];
            let findings = plain_findings(ctx, medium_findings(ctx), false);
            if !findings.is_empty() {
                body.push(format!("What we found:\n{findings}"));
            }
            body.push(format!("What you can do: {}", ctx.summary.what_to_do));
            frame(ctx, body)
        }
        OutputLength::Long => {
            let mut body = vec!["Health fact check".to_string(), lead];
            let findings = plain_findings(ctx, usize::MAX, true);
            if !findings.is_empty() {
                body.push(format!("What we found:\n{findings}"));
            }
            if let Some(ref known) = ctx.summary.what_we_know {
                body.push(format!("What we know:\n{known}"));
            }
            body.push(format!("What you can do:\n{}", ctx.summary.what_to_do));
            if let Some(ref seek) = ctx.summary.when_to_seek_care {
                body.push(format!("When to seek care:\n{seek}"));
            }
            body.push(source_list(ctx, "Sources:"));
            body.push(ctx.summary.disclaimer.clone());
            frame(ctx, body)
        }
    }
}

/// Clinical register regardless of tone, audience or platform
fn clinician_note(ctx: &ResponseContext<'_>, length: OutputLength) -> String {
    let mut body = vec![clinical_summary(ctx)];
    if length == OutputLength::Short {
        return body.remove(0);
    }

    let limit = match length {
        OutputLength::Medium => MEDIUM_FINDINGS,
        _ => usize::MAX,
    };
    let findings: Vec<String> = ctx
        .claims
        .iter()
        .take(limit)
        .map(|c| clinical_finding(ctx, c, length == OutputLength::Long))
        .collect();
    if !findings.is_empty() {
        body.push(format!("Findings:\n{}", findings.join("\n")));
    }

    if length == OutputLength::Long {
        if let Some(ref known) = ctx.summary.what_we_know {
            body.push(format!("Evidence: {known}"));
        }
        body.push(format!(
            "Counselling points: {}",
            what_to_do(ctx.analysis.region, Audience::Clinician, Tone::Neutral, ctx.claims)
        ));
        if let Some(seek) = when_to_seek_care(ctx.analysis.region, ctx.claims) {
            body.push(format!("Safety-netting: {seek}"));
        }
        body.push(source_list(ctx, "References:"));
    }
    body.join("\n\n")
}

fn clinical_summary(ctx: &ResponseContext<'_>) -> String {
    let Some(primary) = ctx.primary() else {
        return "Clinical summary: no checkable health claims identified in the submitted text; no misinformation risk detected."
            .to_string();
    };
    let highest = primary
        .claim
        .severity
        .map(|s| s.as_str())
        .unwrap_or("unrated");
    format!(
        "Clinical summary: {} claim(s) assessed; highest severity {}. Primary concern: \"{}\" ({}, confidence {}/100){}.",
        ctx.claims.len(),
        highest,
        quote(&primary.claim.claim_text, SHORT_QUOTE_CHARS),
        stance_word(primary),
        primary.claim.stance_confidence.unwrap_or(0),
        ctx.refs_for(primary, 2)
    )
}

fn clinical_finding(ctx: &ResponseContext<'_>, claim: &ClaimWithCitations, detailed: bool) -> String {
    let c = &claim.claim;
    let mut line = format!(
        "- \"{}\" | type: {} | topic: {} | population: {} | stance: {} ({}/100) | severity: {}{}",
        quote(&c.claim_text, 160),
        c.claim_type.as_str(),
        c.topic,
        c.target_population,
        stance_word(claim),
        c.stance_confidence.unwrap_or(0),
        c.severity.map(|s| s.as_str()).unwrap_or("unrated"),
        ctx.refs_for(claim, 3)
    );
    if detailed {
        if let Some(ref reason) = c.risk_reason {
            line.push_str(&format!("\n  Risk: {}", plain(reason)));
        }
        if !c.red_flags.is_empty() {
            line.push_str(&format!("\n  Red flags: {}", c.red_flags.join(", ")));
        }
    }
    line
}

/// Lead sentence about the most severe claim, in the reader's vocabulary
fn headline(ctx: &ResponseContext<'_>) -> String {
    let audience = ctx.analysis.audience;
    let authority = ctx.analysis.region.authority();
    let Some(primary) = ctx.primary() else {
        return match audience {
            Audience::General => format!(
                "We did not find a specific health claim to check here. {} is a reliable place to confirm health information.",
                capitalize(authority)
            ),
            Audience::Patient => format!(
                "We could not find a specific health claim here. If something you read worries you, ask your doctor or check {authority}."
            ),
            Audience::Clinician => format!(
                "No checkable health claim identified; refer to current guidance from {authority}."
            ),
        };
    };

    let claim_text = quote(&primary.claim.claim_text, SHORT_QUOTE_CHARS);
    let refs = ctx.refs_for(primary, 1);
    match audience {
        Audience::General => format!(
            "The claim \"{claim_text}\" is {}{refs}.",
            stance_phrase(primary, audience)
        ),
        Audience::Patient => format!(
            "You may have read that \"{claim_text}\". This is {}{refs}.",
            stance_phrase(primary, audience)
        ),
        Audience::Clinician => format!(
            "Circulating {} \"{claim_text}\" is {}; {}{refs}.",
            primary.claim.claim_type.as_str().replace('_', " "),
            stance_phrase(primary, audience),
            risk_phrase(primary, audience)
        ),
    }
}

fn plain_findings(ctx: &ResponseContext<'_>, limit: usize, detailed: bool) -> String {
    let audience = ctx.analysis.audience;
    ctx.claims
        .iter()
        .take(limit)
        .map(|c| {
            let mut line = format!(
                "- \"{}\": {} ({}){}.",
                quote(&c.claim.claim_text, 160),
                stance_phrase(c, audience),
                risk_phrase(c, audience),
                ctx.refs_for(c, 2)
            );
            if detailed && let Some(ref explanation) = c.claim.stance_explanation {
                line.push(' ');
                line.push_str(&sentence(&plain(explanation)));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn source_list(ctx: &ResponseContext<'_>, heading: &str) -> String {
    if ctx.citations.is_empty() {
        return format!("{heading}\nNo sources were cited because no claim matched our evidence library.");
    }
    let entries: Vec<String> = ctx
        .citations
        .iter()
        .map(|(n, c)| match c.source_url {
            Some(ref url) => format!("[{n}] {}. {}. {url}", c.source_org, plain(&c.source_title)),
            None => format!("[{n}] {}. {}.", c.source_org, plain(&c.source_title)),
        })
        .collect();
    format!("{heading}\n{}", entries.join("\n"))
}

fn medium_findings(ctx: &ResponseContext<'_>) -> usize {
    match ctx.analysis.platform {
        Platform::Social => SOCIAL_PLATFORM_FINDINGS,
        _ => MEDIUM_FINDINGS,
    }
}

/// Email gets a greeting and sign-off; other platforms none
fn frame(ctx: &ResponseContext<'_>, body: Vec<String>) -> String {
    let body = body.join("\n\n");
    match ctx.analysis.platform {
        Platform::Email => format!("Hello,\n\n{body}\n\nKind regards"),
        Platform::General | Platform::Social => body,
    }
}

fn opening(tone: Tone) -> &'static str {
    match tone {
        Tone::Neutral => "",
        Tone::Empathetic => "It's understandable to want clear answers about your health, and it's good to check before acting. ",
        Tone::Direct => "Bottom line: ",
    }
}

fn short_opening(tone: Tone) -> &'static str {
    match tone {
        Tone::Neutral => "",
        Tone::Empathetic => "It's understandable to want answers. ",
        Tone::Direct => "Bottom line: ",
    }
}

fn stance_phrase(claim: &ClaimWithCitations, audience: Audience) -> String {
    let stance = claim.claim.stance;
    match audience {
        Audience::General => match stance {
            Some(Stance::Contradicted) => "contradicted by trusted health guidance",
            Some(Stance::Supported) => "consistent with trusted health guidance",
            Some(Stance::Uncertain) | None => "not backed by clear evidence",
        }
        .to_string(),
        Audience::Patient => match stance {
            Some(Stance::Contradicted) => "not true, according to doctors and health agencies",
            Some(Stance::Supported) => "in line with what doctors and health agencies advise",
            Some(Stance::Uncertain) | None => "not proven",
        }
        .to_string(),
        Audience::Clinician => format!(
            "{} by current guidance (confidence {}/100)",
            match stance {
                Some(Stance::Contradicted) => "contradicted",
                Some(Stance::Supported) => "supported",
                Some(Stance::Uncertain) | None => "not established",
            },
            claim.claim.stance_confidence.unwrap_or(0)
        ),
    }
}

fn risk_phrase(claim: &ClaimWithCitations, audience: Audience) -> String {
    let Some(severity) = claim.claim.severity else {
        return "risk not rated".to_string();
    };
    match audience {
        Audience::General => format!("{} risk", severity.as_str()),
        Audience::Patient => match severity {
            Severity::Low => "unlikely to cause harm",
            Severity::Medium => "could cause some harm",
            Severity::High => "could cause harm",
            Severity::Critical => "could cause serious harm",
        }
        .to_string(),
        Audience::Clinician => format!("misinformation severity {}", severity.as_str()),
    }
}

fn stance_word(claim: &ClaimWithCitations) -> &'static str {
    claim.claim.stance.map(|s| s.as_str()).unwrap_or("unclassified")
}

fn first_sentence(text: &str) -> String {
    match text.find(". ") {
        Some(i) => text[..=i].to_string(),
        None => text.to_string(),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize_authority() {
        assert_eq!(capitalize("the NHS"), "The NHS");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_first_sentence() {
        assert_eq!(first_sentence("Check first. Then act."), "Check first.");
        assert_eq!(first_sentence("Only one"), "Only one");
    }
}
