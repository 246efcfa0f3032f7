//! Response step: patient summary and the format × length variant matrix
//!
//! Generation is deterministic templating over the classified claims.
//! Citations are numbered once per analysis (claim order, then relevance)
//! and every inline `[n]` must resolve to one of them; `ensure_complete`
//! enforces that together with one output per matrix cell.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use crate::model::{
    Analysis, Citation, ClaimWithCitations, GeneratedOutput, OutputFormat, OutputLength,
    variant_matrix,
};

mod summary;
mod variants;

pub use summary::{DISCLAIMER, Summary};

static CITATION_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)\]").expect("valid citation regex"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("variant matrix incomplete: expected 9 outputs, missing {missing:?}, duplicated {duplicated:?}")]
    IncompleteMatrix {
        missing: Vec<String>,
        duplicated: Vec<String>,
    },

    #[error("{location} references [{reference}] but only {available} citations exist")]
    UnresolvedCitation {
        location: String,
        reference: usize,
        available: usize,
    },
}

/// Summary fields plus the nine variants for one analysis
#[derive(Debug, Clone)]
pub struct GeneratedResponse {
    pub summary: Summary,
    pub outputs: Vec<GeneratedOutput>,
}

/// Citations numbered 1..N across the analysis
pub(crate) struct CitationRegistry<'a> {
    entries: Vec<&'a Citation>,
}

impl<'a> CitationRegistry<'a> {
    fn build(claims: &'a [ClaimWithCitations]) -> Self {
        Self {
            entries: claims.iter().flat_map(|c| c.citations.iter()).collect(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn number_of(&self, citation: &Citation) -> Option<usize> {
        self.entries
            .iter()
            .position(|c| c.id == citation.id)
            .map(|i| i + 1)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, &'a Citation)> + '_ {
        self.entries.iter().enumerate().map(|(i, c)| (i + 1, *c))
    }
}

/// Everything a template can read
pub(crate) struct ResponseContext<'a> {
    pub analysis: &'a Analysis,
    pub claims: &'a [ClaimWithCitations],
    pub citations: CitationRegistry<'a>,
    pub summary: &'a Summary,
}

impl<'a> ResponseContext<'a> {
    /// Most severe claim; the earliest wins ties
    pub(crate) fn primary(&self) -> Option<&'a ClaimWithCitations> {
        self.claims
            .iter()
            .rev()
            .max_by_key(|c| c.claim.severity)
    }

    /// Inline references to the claim's top `limit` citations, e.g. " [1][2]"
    pub(crate) fn refs_for(&self, claim: &ClaimWithCitations, limit: usize) -> String {
        let refs: String = claim
            .citations
            .iter()
            .take(limit)
            .filter_map(|c| self.citations.number_of(c))
            .map(|n| format!("[{n}]"))
            .collect();
        if refs.is_empty() {
            refs
        } else {
            format!(" {refs}")
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseGenerator;

impl ResponseGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Build the summary and all nine variants, then check completeness
    pub fn generate(
        &self,
        analysis: &Analysis,
        claims: &[ClaimWithCitations],
    ) -> Result<GeneratedResponse, GenerationError> {
        let citations = CitationRegistry::build(claims);
        let summary = summary::compose(analysis, claims, &citations);

        let ctx = ResponseContext {
            analysis,
            claims,
            citations,
            summary: &summary,
        };

        let outputs: Vec<GeneratedOutput> = variant_matrix()
            .map(|(format, length)| GeneratedOutput {
                id: Uuid::new_v4(),
                analysis_id: analysis.id,
                format,
                length,
                content: variants::render(&ctx, format, length),
            })
            .collect();

        ensure_complete(&outputs, ctx.citations.len())?;
        if let Some(ref what_we_know) = summary.what_we_know {
            check_references("what_we_know", what_we_know, ctx.citations.len())?;
        }

        tracing::debug!(
            analysis_id = %analysis.id,
            output_count = outputs.len(),
            citation_count = ctx.citations.len(),
            "Response variants generated"
        );

        Ok(GeneratedResponse { summary, outputs })
    }
}

/// Exactly one output per (format, length) and every inline reference resolvable
pub fn ensure_complete(
    outputs: &[GeneratedOutput],
    citation_count: usize,
) -> Result<(), GenerationError> {
    let mut seen: HashSet<(OutputFormat, OutputLength)> = HashSet::new();
    let mut duplicated = Vec::new();
    for output in outputs {
        if !seen.insert((output.format, output.length)) {
            duplicated.push(cell_name(output.format, output.length));
        }
    }
    let missing: Vec<String> = variant_matrix()
        .filter(|cell| !seen.contains(cell))
        .map(|(f, l)| cell_name(f, l))
        .collect();
    if !missing.is_empty() || !duplicated.is_empty() {
        return Err(GenerationError::IncompleteMatrix {
            missing,
            duplicated,
        });
    }

    for output in outputs {
        check_references(
            &cell_name(output.format, output.length),
            &output.content,
            citation_count,
        )?;
    }
    Ok(())
}

fn check_references(location: &str, text: &str, available: usize) -> Result<(), GenerationError> {
    for capture in CITATION_REF.captures_iter(text) {
        let reference: usize = capture[1].parse().unwrap_or(0);
        if reference == 0 || reference > available {
            return Err(GenerationError::UnresolvedCitation {
                location: location.to_string(),
                reference,
                available,
            });
        }
    }
    Ok(())
}

fn cell_name(format: OutputFormat, length: OutputLength) -> String {
    format!("{}/{}", format.as_str(), length.as_str())
}
