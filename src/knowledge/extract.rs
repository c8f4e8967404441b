//! Shallow concept extraction.
//!
//! This is pattern matching, not language understanding: capitalized runs,
//! quoted spans and medium-length sentences are taken in that priority
//! order. The caps and the sentence window are part of the output contract.

use std::ops::RangeInclusive;
use std::sync::LazyLock;

use regex::Regex;

use super::graph::NodeCategory;
use super::message::Message;

pub const MAX_CAPITALIZED_PHRASES: usize = 2;
pub const MAX_QUOTED_PHRASES: usize = 2;
pub const MAX_SENTENCES: usize = 2;
pub const SENTENCE_LENGTH: RangeInclusive<usize> = 16..=99;
/// Candidates this short or shorter are dropped.
pub const MAX_DISCARDED_LENGTH: usize = 3;
pub const MAX_CONCEPTS: usize = 3;

static CAPITALIZED_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    // ASCII word boundaries: a run stops at the first non-ASCII letter.
    Regex::new(r"(?-u:\b)[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*(?-u:\b)")
        .expect("capitalized phrase pattern")
});
static QUOTED_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)""#).expect("quoted phrase pattern"));
static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("sentence break pattern"));

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConceptDescriptor {
    /// `{message_id}-concept-{ordinal}`
    pub id: String,
    pub label: String,
    pub category: NodeCategory,
    pub ordinal: usize,
}

pub fn concept_id(message_id: &str, ordinal: usize) -> String {
    format!("{message_id}-concept-{ordinal}")
}

fn capitalized_phrases(text: &str) -> impl Iterator<Item = &str> {
    CAPITALIZED_PHRASE
        .find_iter(text)
        .map(|found| found.as_str())
        .take(MAX_CAPITALIZED_PHRASES)
}

fn quoted_phrases(text: &str) -> impl Iterator<Item = &str> {
    QUOTED_PHRASE
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|inner| inner.as_str())
        .take(MAX_QUOTED_PHRASES)
}

fn qualifying_sentences(text: &str) -> impl Iterator<Item = &str> {
    SENTENCE_BREAK
        .split(text)
        .map(str::trim)
        .filter(|sentence| SENTENCE_LENGTH.contains(&sentence.chars().count()))
        .take(MAX_SENTENCES)
}

/// Candidate labels in priority order, before the length filter and cap.
pub fn candidate_phrases(text: &str) -> Vec<&str> {
    capitalized_phrases(text)
        .chain(quoted_phrases(text))
        .chain(qualifying_sentences(text))
        .collect()
}

pub fn extract_concepts(message: &Message) -> Vec<ConceptDescriptor> {
    let category = message.role.category();

    candidate_phrases(&message.content)
        .into_iter()
        .filter(|phrase| phrase.chars().count() > MAX_DISCARDED_LENGTH)
        .take(MAX_CONCEPTS)
        .enumerate()
        .map(|(ordinal, phrase)| ConceptDescriptor {
            id: concept_id(&message.id, ordinal),
            label: phrase.to_string(),
            category,
            ordinal,
        })
        .collect()
}
