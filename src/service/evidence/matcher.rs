//! Lexical retrieval over the Evidence Corpus
//!
//! Relevance is the IDF-weighted share of claim terms covered by a
//! document, plus a fixed bonus when the document's category equals the
//! claim topic. The snippet is the document sentence with the highest
//! weighted overlap.

use std::collections::{HashMap, HashSet};

use crate::model::SourceDocument;
use crate::service::text::{split_sentences, term_set, truncate_on_word_boundary};

const CATEGORY_BONUS: f64 = 15.0;
pub const MAX_SNIPPET_CHARS: usize = 300;

struct IndexedSentence {
    text: String,
    terms: HashSet<String>,
}

struct IndexedDocument {
    document: SourceDocument,
    terms: HashSet<String>,
    sentences: Vec<IndexedSentence>,
}

/// Term statistics over one corpus snapshot
pub struct CorpusIndex {
    documents: Vec<IndexedDocument>,
    document_frequency: HashMap<String, usize>,
}

/// A document kept for a claim, before it becomes a `Citation`
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument<'a> {
    pub document: &'a SourceDocument,
    /// 0-100
    pub relevance: u8,
    pub snippet: Option<String>,
    /// Claim terms present in the snippet
    pub snippet_overlap: usize,
}

impl CorpusIndex {
    pub fn build(documents: Vec<SourceDocument>) -> Self {
        let mut document_frequency: HashMap<String, usize> = HashMap::new();

        let documents: Vec<IndexedDocument> = documents
            .into_iter()
            .map(|document| {
                let terms = term_set(&format!("{} {}", document.title, document.content));
                for term in &terms {
                    *document_frequency.entry(term.clone()).or_default() += 1;
                }
                let sentences = split_sentences(&document.content)
                    .into_iter()
                    .map(|text| IndexedSentence {
                        terms: term_set(&text),
                        text,
                    })
                    .collect();
                IndexedDocument {
                    document,
                    terms,
                    sentences,
                }
            })
            .collect();

        Self {
            documents,
            document_frequency,
        }
    }

    /// Smoothed inverse document frequency; rarer terms weigh more
    pub fn weight(&self, term: &str) -> f64 {
        let n = self.documents.len() as f64;
        let df = self.document_frequency.get(term).copied().unwrap_or(0) as f64;
        ((n + 1.0) / (df + 1.0)).ln() + 1.0
    }

    /// Documents at or above `min_relevance`, best first (ties by id), at most `top_k`
    pub fn rank(
        &self,
        claim_terms: &[String],
        topic: &str,
        min_relevance: u8,
        top_k: usize,
    ) -> Vec<ScoredDocument<'_>> {
        let total_weight: f64 = claim_terms.iter().map(|t| self.weight(t)).sum();
        if claim_terms.is_empty() || total_weight <= 0.0 {
            return Vec::new();
        }

        let mut scored: Vec<ScoredDocument<'_>> = self
            .documents
            .iter()
            .filter_map(|indexed| {
                let covered: f64 = claim_terms
                    .iter()
                    .filter(|t| indexed.terms.contains(*t))
                    .map(|t| self.weight(t))
                    .sum();
                if covered <= 0.0 {
                    return None;
                }

                let mut relevance = covered / total_weight * 100.0;
                if indexed.document.category == topic {
                    relevance += CATEGORY_BONUS;
                }
                let relevance = relevance.round().min(100.0) as u8;
                if relevance < min_relevance {
                    return None;
                }

                let (snippet, snippet_overlap) = self.best_sentence(indexed, claim_terms);
                Some(ScoredDocument {
                    document: &indexed.document,
                    relevance,
                    snippet,
                    snippet_overlap,
                })
            })
            .collect();

        scored.sort_by(|a, b| {
            b.relevance
                .cmp(&a.relevance)
                .then_with(|| a.document.id.cmp(&b.document.id))
        });
        scored.truncate(top_k);
        scored
    }

    /// Highest weighted-overlap sentence; the earliest wins ties
    fn best_sentence(
        &self,
        indexed: &IndexedDocument,
        claim_terms: &[String],
    ) -> (Option<String>, usize) {
        let mut best: Option<(&IndexedSentence, f64, usize)> = None;

        for sentence in &indexed.sentences {
            let shared: Vec<&String> = claim_terms
                .iter()
                .filter(|t| sentence.terms.contains(*t))
                .collect();
            if shared.is_empty() {
                continue;
            }
            let score: f64 = shared.iter().map(|t| self.weight(t)).sum();
            match best {
                Some((_, best_score, _)) if score <= best_score => {}
                _ => best = Some((sentence, score, shared.len())),
            }
        }

        match best {
            Some((sentence, _, overlap)) => (
                Some(truncate_on_word_boundary(&sentence.text, MAX_SNIPPET_CHARS)),
                overlap,
            ),
            None => (None, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::evidence::corpus::{BUILTIN_CORPUS_YAML, parse_corpus};
    use crate::service::text::terms;

    fn doc(id: &str, category: &str, content: &str) -> SourceDocument {
        SourceDocument {
            id: id.to_string(),
            title: String::new(),
            organization: "Org".to_string(),
            url: None,
            content: content.to_string(),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_antibiotics_claim_ranks_guidance_first() {
        let index = CorpusIndex::build(parse_corpus(BUILTIN_CORPUS_YAML).unwrap());
        let ranked = index.rank(&terms("Antibiotics cure colds"), "antibiotics", 25, 5);

        assert!(!ranked.is_empty() && ranked.len() <= 5);
        assert_eq!(ranked[0].document.id, "cdc-antibiotics-colds");
        assert_eq!(ranked[0].relevance, 100);
        assert_eq!(
            ranked[0].snippet.as_deref(),
            Some("Antibiotics will not cure a cold or help you feel better faster")
        );
        assert!(ranked.windows(2).all(|w| w[0].relevance >= w[1].relevance));
        assert!(ranked.iter().all(|r| r.relevance >= 25));
    }

    #[test]
    fn test_threshold_and_top_k() {
        let index = CorpusIndex::build(vec![
            doc("a", "x", "Garlic lowers blood pressure."),
            doc("b", "x", "Garlic is a vegetable."),
            doc("c", "x", "Unrelated text about walking."),
        ]);
        let claim = terms("garlic lowers blood pressure");

        let all = index.rank(&claim, "none", 1, 10);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].document.id, "a");

        let top1 = index.rank(&claim, "none", 1, 1);
        assert_eq!(top1.len(), 1);

        let strict = index.rank(&claim, "none", 100, 10);
        assert_eq!(strict.len(), 1);
        assert_eq!(strict[0].document.id, "a");
    }

    #[test]
    fn test_ties_break_on_document_id() {
        let index = CorpusIndex::build(vec![
            doc("zeta", "x", "Honey soothes coughs."),
            doc("alpha", "x", "Honey soothes coughs."),
        ]);
        let ranked = index.rank(&terms("honey soothes coughs"), "x", 0, 5);
        assert_eq!(ranked[0].document.id, "alpha");
        assert_eq!(ranked[1].document.id, "zeta");
    }

    #[test]
    fn test_category_bonus_is_capped() {
        let index = CorpusIndex::build(vec![doc("a", "nutrition", "Honey soothes coughs.")]);
        let ranked = index.rank(&terms("honey soothes coughs"), "nutrition", 0, 5);
        assert_eq!(ranked[0].relevance, 100);
    }

    #[test]
    fn test_empty_claim_terms() {
        let index = CorpusIndex::build(vec![doc("a", "x", "Honey soothes coughs.")]);
        assert!(index.rank(&[], "x", 0, 5).is_empty());
    }

    #[test]
    fn test_snippet_capped() {
        let long_sentence = format!("Honey {} soothes coughs", "very ".repeat(100));
        let index = CorpusIndex::build(vec![doc("a", "x", &long_sentence)]);
        let ranked = index.rank(&terms("honey"), "x", 0, 5);
        assert!(ranked[0].snippet.as_ref().unwrap().chars().count() <= MAX_SNIPPET_CHARS);
    }
}
