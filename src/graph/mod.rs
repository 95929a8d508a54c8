//! Word graph: the canonical vocabulary of a lexicon.
//!
//! A [`WordGraph`] owns a forward [`Dawg`] and, when one was imported, a
//! back-to-front copy used to speed up suffix-anchored patterns. The reverse
//! copy is an internal detail: every answer is spelled front to back.
//!
//! ## Modules
//!
//! - [`dawg`] - Arena-backed graph with suffix sharing
//! - [`search`] - Pattern and rack matchers driven along graph edges
//! - [`codec`] - Serialized graph format and checksum

pub mod codec;
pub mod dawg;
pub mod search;

pub use codec::checksum;
pub use dawg::{Dawg, Edge, NodeId};
pub use search::{GraphQuery, LetterSet, Pattern, Rack, RackMode};

use crate::error::{LexiconError, Result};
use crate::query::{SearchCondition, ValueRange};
use search::Walker;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct WordGraph {
    forward: Dawg,
    reverse: Option<Dawg>,
}

impl WordGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact membership
    pub fn contains_word(&self, word: &str) -> bool {
        self.forward.contains(word.to_ascii_uppercase().as_bytes())
    }

    /// Insert one word; returns false if it was already present
    pub fn add_word(&mut self, word: &str) -> bool {
        let upper = word.to_ascii_uppercase();
        let added = self.forward.insert(upper.as_bytes());
        if added {
            if let Some(reverse) = self.reverse.as_mut() {
                let mut reversed = upper.into_bytes();
                reversed.reverse();
                reverse.insert(&reversed);
            }
        }
        added
    }

    /// Number of distinct words
    pub fn word_count(&self) -> usize {
        self.forward.word_count()
    }

    pub fn has_reverse(&self) -> bool {
        self.reverse.is_some()
    }

    pub fn dawg(&self) -> &Dawg {
        &self.forward
    }

    /// Bulk insert followed by minimization; returns the number of new words
    pub fn import_words<I, S>(&mut self, words: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = 0;
        for word in words {
            if self.add_word(word.as_ref()) {
                added += 1;
            }
        }
        self.minimize();
        added
    }

    /// Share every common suffix
    pub fn minimize(&mut self) {
        self.forward.minimize();
        if let Some(reverse) = self.reverse.as_mut() {
            reverse.minimize();
        }
    }

    /// Replace the graph with a serialized image.
    ///
    /// The checksum, if given, is verified before decoding. A reversed image
    /// spells words back to front; it is kept for suffix searches and a forward
    /// graph is rebuilt from it. On error the graph is left untouched.
    pub fn import_serialized(
        &mut self,
        bytes: &[u8],
        reversed: bool,
        expected_checksum: Option<u16>,
    ) -> Result<()> {
        if let Some(expected) = expected_checksum {
            let actual = checksum(bytes);
            if actual != expected {
                return Err(LexiconError::Format(format!(
                    "checksum mismatch: expected {:04x}, found {:04x}",
                    expected, actual
                )));
            }
        }

        let decoded = codec::decode(bytes)?;

        if reversed {
            let mut forward = Dawg::new();
            decoded.for_each_word(|word| {
                let mut letters = word.to_vec();
                letters.reverse();
                forward.insert(&letters);
            });
            forward.minimize();
            self.forward = forward;
            self.reverse = Some(decoded);
        } else {
            self.forward = decoded;
            self.reverse = None;
        }

        debug!(
            words = self.forward.word_count(),
            reversed, "imported serialized graph"
        );
        Ok(())
    }

    /// Serialize the forward graph
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut canonical = self.forward.clone();
        canonical.minimize();
        codec::encode(&canonical)
    }

    /// Every word in alphabetical order
    pub fn words(&self) -> Vec<String> {
        self.forward.words()
    }

    /// Words matching the graph conditions of `conditions`.
    ///
    /// Patterns, racks and length ranges are applied; anything else is left to
    /// the caller. Results are sorted and free of duplicates. A malformed
    /// pattern or rack matches nothing.
    pub fn search(&self, conditions: &[SearchCondition]) -> Vec<String> {
        match graph_query(conditions) {
            Some(query) => self.run(&query),
            None => {
                debug!("malformed graph condition, no matches");
                Vec::new()
            }
        }
    }

    /// Like [`search`](Self::search), but letters filled in by `?`, `*`,
    /// blanks or classes come back lower case. Order is still alphabetical,
    /// ignoring case.
    pub fn search_marked(&self, conditions: &[SearchCondition]) -> Vec<String> {
        let Some(query) = graph_query(conditions) else {
            debug!("malformed graph condition, no matches");
            return Vec::new();
        };
        self.run(&query)
            .iter()
            .map(|word| query.mark_wildcards(word))
            .collect()
    }

    fn run(&self, query: &GraphQuery) -> Vec<String> {
        if let Some(reverse) = self.reverse.as_ref().filter(|_| query.prefers_reverse()) {
            let reversed = query.reversed();
            let mut results = Walker::new(reverse, &reversed, true).run();
            results.sort_unstable();
            return results;
        }

        Walker::new(&self.forward, query, false).run()
    }
}

/// Collect the graph-evaluable part of a condition list
pub fn graph_query(conditions: &[SearchCondition]) -> Option<GraphQuery> {
    let mut query = GraphQuery::default();
    let mut length: Option<ValueRange> = None;

    for condition in conditions {
        match condition {
            SearchCondition::PatternMatch { pattern, negated } => {
                let parsed = Pattern::parse(pattern)?;
                if *negated {
                    query.excluded_patterns.push(parsed);
                } else {
                    query.patterns.push(parsed);
                }
            }
            SearchCondition::AnagramMatch { letters, negated } => {
                push_rack(&mut query, letters, RackMode::Anagram, *negated)?;
            }
            SearchCondition::SubanagramMatch { letters, negated } => {
                push_rack(&mut query, letters, RackMode::Subanagram, *negated)?;
            }
            SearchCondition::ConsistOf {
                letters,
                min,
                max,
                negated,
            } => {
                let mode = RackMode::ConsistOf {
                    min: (*min).max(1) as usize,
                    max: *max as usize,
                };
                push_rack(&mut query, letters, mode, *negated)?;
            }
            SearchCondition::Length(range) => {
                length = match length {
                    None => Some(*range),
                    Some(existing) => Some(existing.intersect(range).unwrap_or(ValueRange::new(1, 0))),
                };
            }
            _ => {}
        }
    }

    if let Some(range) = length {
        query.min_length = range.min as usize;
        query.max_length = Some(range.max as usize);
    }
    Some(query)
}

fn push_rack(query: &mut GraphQuery, letters: &str, mode: RackMode, negated: bool) -> Option<()> {
    let rack = Rack::parse(letters)?;
    if negated {
        query.excluded_racks.push((rack, mode));
    } else {
        query.racks.push((rack, mode));
    }
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(words: &[&str]) -> WordGraph {
        let mut graph = WordGraph::new();
        graph.import_words(words.iter().copied());
        graph
    }

    #[test]
    fn test_contains_and_count() {
        let mut g = graph(&["CAT", "cats", "COT"]);
        assert!(g.contains_word("CATS"));
        assert!(g.contains_word("cat"));
        assert!(!g.contains_word("CA"));
        assert_eq!(g.word_count(), 3);
        assert!(!g.add_word("CAT"));
        assert_eq!(g.word_count(), 3);
    }

    #[test]
    fn test_search_marked_lowercases_wildcards() {
        let g = graph(&["CAT", "COT", "CATS", "EAT"]);
        assert_eq!(
            g.search_marked(&[SearchCondition::pattern("C?T")]),
            vec!["CaT", "CoT"]
        );
        assert_eq!(
            g.search_marked(&[SearchCondition::anagram("AT?")]),
            vec!["cAT", "eAT"]
        );
        assert!(g.search_marked(&[SearchCondition::pattern("C[AT")]).is_empty());
    }

    #[test]
    fn test_search_pattern() {
        let g = graph(&["CAT", "COT", "CUT", "CATS"]);
        let found = g.search(&[SearchCondition::pattern("C?T")]);
        assert_eq!(found, vec!["CAT", "COT", "CUT"]);

        let wide = g.search(&[SearchCondition::pattern("*AT*")]);
        assert_eq!(wide, vec!["CAT", "CATS"]);
    }

    #[test]
    fn test_search_anagram() {
        let g = graph(&["EAT", "ATE", "TEA", "EATS"]);
        let found = g.search(&[SearchCondition::anagram("TEA")]);
        assert_eq!(found, vec!["ATE", "EAT", "TEA"]);
    }

    #[test]
    fn test_search_ignores_non_graph_conditions() {
        let g = graph(&["CAT", "COT"]);
        let found = g.search(&[
            SearchCondition::pattern("C?T"),
            SearchCondition::NumVowels(ValueRange::exact(9)),
        ]);
        assert_eq!(found, vec!["CAT", "COT"]);
    }

    #[test]
    fn test_search_malformed_is_empty() {
        let g = graph(&["CAT"]);
        assert!(g.search(&[SearchCondition::pattern("C[AT")]).is_empty());
    }

    #[test]
    fn test_length_only_enumerates() {
        let g = graph(&["A", "AT", "CAT", "CATS"]);
        assert_eq!(g.search(&[SearchCondition::length(2, 3)]), vec!["AT", "CAT"]);
    }

    #[test]
    fn test_serialized_roundtrip() {
        let g = graph(&["CAT", "CATS", "DOG"]);
        let bytes = g.to_bytes().unwrap();
        let sum = checksum(&bytes);

        let mut loaded = WordGraph::new();
        loaded.import_serialized(&bytes, false, Some(sum)).unwrap();
        assert_eq!(loaded.words(), g.words());
        assert_eq!(loaded.word_count(), g.word_count());
    }

    #[test]
    fn test_checksum_mismatch_leaves_graph() {
        let g = graph(&["CAT"]);
        let bytes = g.to_bytes().unwrap();

        let mut target = graph(&["DOG"]);
        let err = target
            .import_serialized(&bytes, false, Some(checksum(&bytes) ^ 1))
            .unwrap_err();
        assert!(matches!(err, LexiconError::Format(_)));
        assert!(target.contains_word("DOG"));
        assert!(!target.contains_word("CAT"));
    }

    #[test]
    fn test_reversed_import() {
        let reversed = graph(&["GNIOD", "GNIK", "TAC"]);
        let bytes = reversed.to_bytes().unwrap();

        let mut g = WordGraph::new();
        g.import_serialized(&bytes, true, None).unwrap();
        assert!(g.has_reverse());
        assert_eq!(g.words(), vec!["CAT", "DOING", "KING"]);

        let found = g.search(&[SearchCondition::pattern("*ING")]);
        assert_eq!(found, vec!["DOING", "KING"]);

        g.add_word("RING");
        assert_eq!(
            g.search(&[SearchCondition::pattern("*ING")]),
            vec!["DOING", "KING", "RING"]
        );
    }
}
