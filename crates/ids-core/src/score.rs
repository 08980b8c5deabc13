use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Scorer
// ---------------------------------------------------------------------------

/// Relevance of an entity's searchable text to an intent, in `[0, 1]`.
///
/// Implementations must be pure: the same inputs always produce the same
/// score, since ranking and tie-breaking depend on it.
pub trait Scorer: Send + Sync {
    fn score(&self, intent: &str, entity_text: &str) -> f64;
}

/// Token-overlap scorer.
///
/// `coverage_weight` of the score comes from the share of intent terms found
/// anywhere in the text; the rest from the share of adjacent intent term
/// pairs that also appear adjacently, so phrase matches outrank scattered
/// ones.
#[derive(Debug, Clone)]
pub struct LexicalScorer {
    coverage_weight: f64,
}

impl LexicalScorer {
    pub fn new(coverage_weight: f64) -> Self {
        Self {
            coverage_weight: coverage_weight.clamp(0.0, 1.0),
        }
    }
}

impl Default for LexicalScorer {
    fn default() -> Self {
        Self::new(0.75)
    }
}

impl Scorer for LexicalScorer {
    fn score(&self, intent: &str, entity_text: &str) -> f64 {
        let intent_stems: Vec<String> = terms(intent).into_iter().map(|t| t.stem).collect();
        let unique: Vec<&str> = dedup(intent_stems.iter().map(String::as_str));
        if unique.is_empty() {
            return 0.0;
        }

        let text_stems: Vec<String> = terms(entity_text).into_iter().map(|t| t.stem).collect();
        let text_set: HashSet<&str> = text_stems.iter().map(String::as_str).collect();

        let covered = unique.iter().filter(|s| text_set.contains(*s)).count();
        let coverage = covered as f64 / unique.len() as f64;

        let intent_pairs: Vec<(&str, &str)> = dedup(
            intent_stems
                .windows(2)
                .map(|w| (w[0].as_str(), w[1].as_str())),
        );
        if intent_pairs.is_empty() {
            return coverage;
        }
        let text_pairs: HashSet<(&str, &str)> = text_stems
            .windows(2)
            .map(|w| (w[0].as_str(), w[1].as_str()))
            .collect();
        let phrased = intent_pairs
            .iter()
            .filter(|p| text_pairs.contains(*p))
            .count();
        let phrase = phrased as f64 / intent_pairs.len() as f64;

        (self.coverage_weight * coverage + (1.0 - self.coverage_weight) * phrase).clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Terms
// ---------------------------------------------------------------------------

/// A significant word: its lowercase surface form and its stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub word: String,
    pub stem: String,
}

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "against", "as", "at", "be", "by", "for", "from", "in", "into", "is",
    "it", "its", "of", "on", "or", "that", "the", "this", "to", "via", "with",
];

static WORD_RE: OnceLock<Regex> = OnceLock::new();

fn word_re() -> &'static Regex {
    WORD_RE.get_or_init(|| Regex::new(r"[a-z0-9]+").unwrap())
}

/// Split `text` into significant terms, in order, stop words removed.
pub fn terms(text: &str) -> Vec<Term> {
    let lower = text.to_lowercase();
    word_re()
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|w| !STOP_WORDS.contains(w))
        .map(|w| Term {
            word: w.to_string(),
            stem: stem(w),
        })
        .collect()
}

/// Intent words whose stem occurs in `text`, first occurrence order.
pub fn matched_terms(intent: &str, text: &str) -> Vec<String> {
    partition_terms(intent, text).0
}

/// Intent words whose stem does not occur in `text`.
pub fn uncovered_terms(intent: &str, text: &str) -> Vec<String> {
    partition_terms(intent, text).1
}

fn partition_terms(intent: &str, text: &str) -> (Vec<String>, Vec<String>) {
    let text_stems: HashSet<String> = terms(text).into_iter().map(|t| t.stem).collect();
    let mut seen = HashSet::new();
    let mut matched = Vec::new();
    let mut uncovered = Vec::new();
    for t in terms(intent) {
        if !seen.insert(t.stem.clone()) {
            continue;
        }
        if text_stems.contains(&t.stem) {
            matched.push(t.word);
        } else {
            uncovered.push(t.word);
        }
    }
    (matched, uncovered)
}

fn dedup<T: Eq + std::hash::Hash + Copy>(items: impl Iterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items.filter(|i| seen.insert(*i)).collect()
}

/// Light suffix stripping so "validates", "validation" and "validating"
/// share a stem. Input is lowercase ASCII.
fn stem(word: &str) -> String {
    let mut w = word.to_string();

    if w.len() > 4 && w.ends_with("ies") {
        w.truncate(w.len() - 3);
        w.push('y');
    } else if w.ends_with("sses") {
        w.truncate(w.len() - 2);
    } else if w.len() > 3
        && w.ends_with('s')
        && !w.ends_with("ss")
        && !w.ends_with("us")
        && !w.ends_with("is")
    {
        w.pop();
    }

    if w.len() > 6 && w.ends_with("ation") {
        w.truncate(w.len() - 5);
        w.push_str("at");
    } else if w.len() > 5 && w.ends_with("ing") {
        w.truncate(w.len() - 3);
    } else if w.len() > 4 && w.ends_with("ed") {
        w.truncate(w.len() - 2);
    }

    if w.len() > 3 && w.ends_with('e') {
        w.pop();
    }
    w
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stems_collapse_inflections() {
        for w in ["validate", "validates", "validated", "validating", "validation"] {
            assert_eq!(stem(w), "validat", "{w}");
        }
        assert_eq!(stem("stories"), "story");
        assert_eq!(stem("drafts"), "draft");
        assert_eq!(stem("rendering"), "render");
        assert_eq!(stem("process"), "process");
        assert_eq!(stem("status"), "status");
    }

    #[test]
    fn terms_drop_stop_words_and_punctuation() {
        let words: Vec<String> = terms("Validate THE story-drafts, against schema!")
            .into_iter()
            .map(|t| t.word)
            .collect();
        assert_eq!(words, vec!["validate", "story", "drafts", "schema"]);
    }

    #[test]
    fn full_phrase_overlap_scores_one() {
        let s = LexicalScorer::default();
        let score = s.score(
            "validate story drafts",
            "validates story draft markdown against schema",
        );
        assert!((score - 1.0).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn no_overlap_scores_zero() {
        let s = LexicalScorer::default();
        assert_eq!(
            s.score("deploy kubernetes cluster", "validates story draft markdown"),
            0.0
        );
    }

    #[test]
    fn phrase_overlap_beats_scattered_overlap() {
        let s = LexicalScorer::default();
        let phrase = s.score("template rendering engine", "template rendering engine for docs");
        let scattered = s.score("template rendering engine", "engine that loads a template before rendering");
        assert!(phrase > scattered, "{phrase} <= {scattered}");
        assert!(scattered >= 0.75 - 1e-9);
    }

    #[test]
    fn score_is_monotonic_in_coverage() {
        let s = LexicalScorer::default();
        let intent = "parse yaml config files";
        let one = s.score(intent, "yaml");
        let two = s.score(intent, "yaml config");
        let three = s.score(intent, "parse yaml config");
        assert!(one < two && two < three, "{one} {two} {three}");
    }

    #[test]
    fn score_is_stable() {
        let s = LexicalScorer::default();
        let a = s.score("database migration", "runs database migrations in order");
        let b = s.score("database migration", "runs database migrations in order");
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn single_term_intent_uses_coverage_only() {
        let s = LexicalScorer::default();
        assert_eq!(s.score("migrations", "database migration runner"), 1.0);
    }

    #[test]
    fn stop_word_only_intent_scores_zero() {
        let s = LexicalScorer::default();
        assert_eq!(s.score("the of and", "anything at all"), 0.0);
    }

    #[test]
    fn matched_and_uncovered_partition_intent() {
        let text = "validates story draft markdown";
        assert_eq!(
            matched_terms("validate story drafts quickly", text),
            vec!["validate", "story", "drafts"]
        );
        assert_eq!(
            uncovered_terms("validate story drafts quickly", text),
            vec!["quickly"]
        );
    }
}
