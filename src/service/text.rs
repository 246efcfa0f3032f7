//! Text normalization shared by claim extraction and evidence matching

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Sentence terminators followed by whitespace, or hard line breaks
static SENTENCE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+[\s]+|[\r\n]+").expect("valid sentence regex"));

const STOPWORDS: &[&str] = &[
    "a", "about", "after", "again", "all", "also", "am", "an", "and", "any", "are", "as", "at",
    "be", "because", "been", "before", "being", "but", "by", "can", "could", "did", "do",
    "does", "doing", "for", "from", "get", "gets", "got", "had", "has", "have", "having", "he",
    "her", "here", "him", "his", "how", "i", "if", "in", "into", "is", "it", "its", "just",
    "me", "more", "most", "much", "my", "of", "on", "once", "one", "only", "or", "other",
    "our", "out", "over", "own", "really", "same", "she", "should", "so", "some", "such",
    "than", "that", "the", "their", "them", "then", "there", "these", "they", "this", "those",
    "to", "too", "up", "us", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "why", "will", "with", "would", "you", "your", "yours", "even", "every",
    "people", "thing", "things", "way", "ways", "make", "makes", "use", "using", "used", "may",
    "might", "must", "need", "needs", "like", "well", "many", "lot", "lots",
    // negations are tracked separately by `is_negated`
    "not", "no", "never", "nor", "dont", "doesnt", "didnt", "wont", "cant", "cannot", "isnt",
    "arent", "wasnt", "werent", "havent", "hasnt", "shouldnt",
];

/// Single-word negation and refutation markers
const NEGATION_WORDS: &[&str] = &[
    "not", "no", "never", "nor", "neither", "cannot", "can't", "cant", "don't", "dont",
    "doesn't", "doesnt", "didn't", "didnt", "won't", "wont", "isn't", "isnt", "aren't", "arent",
    "wasn't", "wasnt", "haven't", "havent", "hasn't", "hasnt", "shouldn't", "shouldnt",
    "ineffective", "myth", "myths", "false", "untrue", "unproven", "debunked", "disproven",
    "fraudulent", "fraud", "hoax", "scam",
];

/// Canonical forms for words the corpus and claims phrase differently
const SYNONYMS: &[(&str, &str)] = &[
    ("jab", "vaccine"),
    ("shot", "vaccine"),
    ("vaccination", "vaccine"),
    ("vaccinated", "vaccine"),
    ("vaccinate", "vaccine"),
    ("immunization", "vaccine"),
    ("immunisation", "vaccine"),
    ("influenza", "flu"),
    ("cured", "cure"),
    ("curing", "cure"),
    ("caused", "cause"),
    ("causing", "cause"),
    ("treated", "treat"),
    ("treating", "treat"),
    ("treatment", "treat"),
    ("prevented", "prevent"),
    ("preventing", "prevent"),
    ("prevention", "prevent"),
    ("tumour", "tumor"),
    ("baby", "infant"),
    ("newborn", "infant"),
    ("kid", "child"),
    ("children", "child"),
    ("chemo", "chemotherapy"),
    ("pregnant", "pregnancy"),
    ("unsafe", "dangerous"),
    ("harmful", "dangerous"),
    ("medicine", "medication"),
    ("drug", "medication"),
    ("heal", "cure"),
    ("healed", "cure"),
    ("heals", "cure"),
    ("diabetic", "diabete"),
];

/// Split text into trimmed, non-empty sentences without their terminators
pub fn split_sentences(text: &str) -> Vec<String> {
    SENTENCE_BOUNDARY
        .split(text)
        .map(|s| s.trim().trim_end_matches(['.', '!', '?']).trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Same as [`split_sentences`] but keeps a trailing `?` so questions can be told apart
pub fn split_sentences_keep_questions(text: &str) -> Vec<(String, bool)> {
    let mut sentences = Vec::new();
    let mut last = 0;
    for m in SENTENCE_BOUNDARY.find_iter(text) {
        let is_question = m.as_str().contains('?');
        push_sentence(&mut sentences, &text[last..m.start()], is_question);
        last = m.end();
    }
    let tail = &text[last..];
    let tail_question = tail.trim_end().ends_with('?');
    push_sentence(&mut sentences, tail, tail_question);
    sentences
}

fn push_sentence(out: &mut Vec<(String, bool)>, raw: &str, is_question: bool) {
    let cleaned = raw.trim().trim_end_matches(['.', '!', '?']).trim();
    if !cleaned.is_empty() {
        out.push((cleaned.to_string(), is_question));
    }
}

/// Lowercased word tokens with typographic apostrophes normalized
pub fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace(['\u{2019}', '\u{2018}'], "'")
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|w| w.trim_matches('\'').to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Whether the text carries a negation or refutation marker
pub fn is_negated(text: &str) -> bool {
    words(text)
        .iter()
        .any(|w| NEGATION_WORDS.contains(&w.as_str()))
}

/// Light plural stemming
fn stem(word: &str) -> String {
    let len = word.chars().count();
    if len > 4 && word.ends_with("ies") {
        return format!("{}y", &word[..word.len() - 3]);
    }
    if len > 4
        && (word.ends_with("ses")
            || word.ends_with("xes")
            || word.ends_with("zes")
            || word.ends_with("ches")
            || word.ends_with("shes"))
    {
        return word[..word.len() - 2].to_string();
    }
    if len > 3
        && word.ends_with('s')
        && !word.ends_with("ss")
        && !word.ends_with("us")
        && !word.ends_with("is")
    {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Normalize one word into its matching term, or `None` for stopwords
pub fn normalize_term(word: &str) -> Option<String> {
    let word = word.trim_end_matches("'s").replace('\'', "");
    if word.chars().count() < 2 || STOPWORDS.contains(&word.as_str()) {
        return None;
    }
    if word.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let stemmed = match SYNONYMS.iter().find(|(from, _)| *from == word) {
        Some((_, to)) => to.to_string(),
        None => stem(&word),
    };
    let canonical = SYNONYMS
        .iter()
        .find(|(from, _)| *from == stemmed)
        .map(|(_, to)| to.to_string())
        .unwrap_or(stemmed);
    if STOPWORDS.contains(&canonical.as_str()) {
        return None;
    }
    Some(canonical)
}

/// Ordered, de-duplicated content terms of a text
pub fn terms(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    words(text)
        .iter()
        .filter_map(|w| normalize_term(w))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

pub fn term_set(text: &str) -> HashSet<String> {
    terms(text).into_iter().collect()
}

/// Word-level Jaccard similarity of two texts' content terms
pub fn jaccard(a: &str, b: &str) -> f64 {
    let a = term_set(a);
    let b = term_set(b);
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

/// Collapse whitespace runs into single spaces
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max_chars` characters, backing off to the last
/// whitespace before the cut when there is one
pub fn truncate_on_word_boundary(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut = text
        .char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let head = &text[..cut];
    match head.rfind(char::is_whitespace) {
        Some(ws) if ws > 0 => head[..ws].trim_end().to_string(),
        _ => head.to_string(),
    }
}
