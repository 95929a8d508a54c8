//! Lexicons and the engine that holds them.
//!
//! A [`Lexicon`] bundles everything known about one named word list: the word
//! graph, an optional attribute index, stems, anagram counts, definitions and
//! the per-search attribute cache. The [`WordEngine`] keeps lexicons by name.
//!
//! ## Modules
//!
//! - [`registry`] - Named lexicons and the lookup API
//! - [`import`] - Word-list and stem-list file readers
//! - [`definitions`] - Senses by part of speech and link resolution
//! - [`groups`] - Stem index and study-set classifier

pub mod definitions;
pub mod groups;
pub mod import;
pub mod registry;

pub use definitions::Definitions;
pub use groups::{GroupClassifier, StemIndex};
pub use import::WordEntry;
pub use registry::WordEngine;

use crate::error::Result;
use crate::graph::WordGraph;
use crate::index::{AttributeIndex, WordInfo, WordInfoCache};
use crate::query::{SearchExecutor, SearchSet, SearchSpec};
use crate::utils::{EngineConfig, LetterBag, alphagram, normalize_word};
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// All state of one named word list
pub struct Lexicon {
    name: String,
    graph: WordGraph,
    index: Option<Arc<dyn AttributeIndex>>,
    stems: StemIndex,
    anagram_counts: FxHashMap<String, u32>,
    definitions: Definitions,
    cache: Mutex<WordInfoCache>,
    bag: LetterBag,
    classifier: GroupClassifier,
    alphabet: String,
    max_word_length: usize,
}

impl std::fmt::Debug for Lexicon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexicon")
            .field("name", &self.name)
            .field("words", &self.graph.word_count())
            .field("indexed", &self.index.is_some())
            .finish()
    }
}

impl Lexicon {
    /// Empty lexicon using the tile bag and classifier settings of `config`
    pub fn new(name: &str, config: &EngineConfig) -> Result<Self> {
        let bag = config.letter_bag()?;
        Ok(Self {
            name: name.to_string(),
            graph: WordGraph::new(),
            index: None,
            stems: StemIndex::new(),
            anagram_counts: FxHashMap::default(),
            definitions: Definitions::new(),
            cache: Mutex::new(WordInfoCache::new()),
            classifier: GroupClassifier::new(config, &bag),
            bag,
            alphabet: config.alphabet.clone(),
            max_word_length: config.max_word_length,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn graph(&self) -> &WordGraph {
        &self.graph
    }

    pub fn bag(&self) -> &LetterBag {
        &self.bag
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    pub fn stems(&self) -> &StemIndex {
        &self.stems
    }

    pub fn index(&self) -> Option<&dyn AttributeIndex> {
        self.index.as_deref()
    }

    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }

    pub fn attach_index(&mut self, index: Arc<dyn AttributeIndex>) {
        self.index = Some(index);
        self.cache().clear();
    }

    pub fn detach_index(&mut self) {
        self.index = None;
        self.cache().clear();
    }

    fn cache(&self) -> MutexGuard<'_, WordInfoCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add word-list entries; returns how many lines were imported.
    ///
    /// Words outside the alphabet or longer than the configured maximum are
    /// skipped. Anagram counts grow only for words not already present.
    pub fn import_entries<I>(&mut self, entries: I, load_definitions: bool) -> usize
    where
        I: IntoIterator<Item = WordEntry>,
    {
        let mut imported = 0;
        for entry in entries {
            let Some(word) = normalize_word(&entry.word, &self.alphabet) else {
                warn!(word = %entry.word, "skipping word outside the alphabet");
                continue;
            };
            if word.len() > self.max_word_length {
                warn!(%word, "skipping over-long word");
                continue;
            }

            if self.graph.add_word(&word) {
                *self.anagram_counts.entry(alphagram(&word)).or_insert(0) += 1;
            }
            if load_definitions && let Some(definition) = &entry.definition {
                self.definitions.add(&word, definition);
            }
            imported += 1;
        }
        self.graph.minimize();
        info!(lexicon = %self.name, imported, words = self.graph.word_count(), "imported word list");
        imported
    }

    /// Add bare words
    pub fn import_words<I, S>(&mut self, words: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.import_entries(
            words.into_iter().map(|word| WordEntry {
                word: word.into(),
                definition: None,
            }),
            false,
        )
    }

    /// Replace the graph with a serialized image; anagram counts are rebuilt
    pub fn import_serialized(
        &mut self,
        bytes: &[u8],
        reversed: bool,
        expected_checksum: Option<u16>,
    ) -> Result<()> {
        self.graph.import_serialized(bytes, reversed, expected_checksum)?;

        self.anagram_counts.clear();
        self.graph.dawg().for_each_word(|word| {
            let word = String::from_utf8_lossy(word);
            *self.anagram_counts.entry(alphagram(&word)).or_insert(0) += 1;
        });
        self.cache().clear();
        info!(lexicon = %self.name, words = self.graph.word_count(), "imported serialized graph");
        Ok(())
    }

    /// Add a stem list; returns how many stems were kept
    pub fn import_stems<I, S>(&mut self, stems: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let kept = self.stems.add(stems);
        debug!(lexicon = %self.name, kept, "imported stems");
        kept
    }

    pub fn is_acceptable(&self, word: &str) -> bool {
        self.graph.contains_word(word)
    }

    pub fn num_words(&self) -> usize {
        self.graph.word_count()
    }

    /// Words outside the alphabet belong to no set
    pub fn is_set_member(&self, word: &str, set: SearchSet) -> bool {
        normalize_word(word, &self.alphabet)
            .is_some_and(|word| self.classifier.is_member(set, &word, &self.graph, &self.stems))
    }

    /// Run a search and refresh the attribute cache with its results
    pub fn search(&self, spec: &SearchSpec, all_caps: bool) -> Vec<String> {
        let results = SearchExecutor::new(self).execute(spec, all_caps);
        if !results.is_empty() {
            self.refresh_cache(&results);
        }
        results
    }

    /// Clear the cache and load attribute rows for `words` in one lookup
    pub fn refresh_cache(&self, words: &[String]) {
        let mut cache = self.cache();
        cache.clear();
        let Some(index) = self.index() else {
            return;
        };
        if let Err(e) = cache.populate(index, words) {
            warn!(lexicon = %self.name, error = %e, "could not populate attribute cache");
        }
    }

    /// Attribute row for a word; invalid when there is no index or no row
    pub fn word_info(&self, word: &str) -> WordInfo {
        let upper = word.to_ascii_uppercase();
        if upper.is_empty() {
            return WordInfo::default();
        }
        if let Some(info) = self.cache().get(&upper) {
            return info.clone();
        }

        let Some(index) = self.index() else {
            return WordInfo::default();
        };
        match index.word_info(&upper) {
            Ok(Some(info)) => {
                self.cache().insert(info.clone());
                info
            }
            Ok(None) => WordInfo::default(),
            Err(e) => {
                warn!(lexicon = %self.name, error = %e, "attribute lookup failed");
                WordInfo::default()
            }
        }
    }

    /// Number of words sharing `word`'s letters
    pub fn num_anagrams(&self, word: &str) -> u32 {
        let info = self.word_info(word);
        if info.is_valid() {
            return info.num_anagrams;
        }
        self.anagram_counts
            .get(&alphagram(word))
            .copied()
            .unwrap_or(0)
    }

    /// Letters that can go in front of `word`, lower-case and sorted
    pub fn front_hook_letters(&self, word: &str) -> String {
        let info = self.word_info(word);
        if info.is_valid() {
            return info.front_hooks;
        }
        crate::index::build::front_hooks(&self.graph, word)
    }

    /// Letters that can go after `word`, lower-case and sorted
    pub fn back_hook_letters(&self, word: &str) -> String {
        let info = self.word_info(word);
        if info.is_valid() {
            return info.back_hooks;
        }
        crate::index::build::back_hooks(&self.graph, word)
    }

    /// Definition from the index row if there is one, otherwise from the
    /// imported definitions
    pub fn definition(&self, word: &str, replace_links: bool) -> Option<String> {
        let info = self.word_info(word);
        if info.is_valid() {
            if info.definition.is_empty() {
                return None;
            }
            return Some(if replace_links {
                self.definitions.resolve_links(&info.definition)
            } else {
                info.definition
            });
        }
        self.definitions.render(word, replace_links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexBuilder, SqliteIndex};
    use crate::query::SearchCondition;

    fn lexicon(words: &[&str]) -> Lexicon {
        let mut lexicon = Lexicon::new("TEST", &EngineConfig::default()).unwrap();
        lexicon.import_words(words.iter().copied());
        lexicon
    }

    #[test]
    fn test_import_counts_anagrams_once() {
        let mut lex = lexicon(&["EAT", "TEA", "EAT"]);
        assert_eq!(lex.num_words(), 2);
        assert_eq!(lex.num_anagrams("ATE"), 2);
        lex.import_words(["TEA", "ATE"]);
        assert_eq!(lex.num_anagrams("eta"), 3);
    }

    #[test]
    fn test_import_skips_bad_words() {
        let lex = lexicon(&["CAT", "C4T", "ÉTÉ", "ABCDEFGHIJKLMNOP"]);
        assert_eq!(lex.num_words(), 1);
    }

    #[test]
    fn test_serialized_import_rebuilds_anagram_counts() {
        let source = lexicon(&["EAT", "TEA", "ATE", "CAT"]);
        let bytes = source.graph().to_bytes().unwrap();

        let mut lex = lexicon(&[]);
        lex.import_serialized(&bytes, false, None).unwrap();
        assert_eq!(lex.num_words(), 4);
        assert_eq!(lex.num_anagrams("TEA"), 3);
        assert_eq!(lex.num_anagrams("ACT"), 1);
    }

    #[test]
    fn test_graph_only_lookups() {
        let lex = lexicon(&["AT", "CAT", "BAT", "CATS"]);
        assert!(!lex.word_info("CAT").is_valid());
        assert_eq!(lex.front_hook_letters("AT"), "bc");
        assert_eq!(lex.back_hook_letters("CAT"), "s");
    }

    #[test]
    fn test_search_refreshes_cache() {
        let mut lex = lexicon(&["CAT", "COT", "CUT", "CATS"]);
        let index = SqliteIndex::open_in_memory().unwrap();
        IndexBuilder::new(lex.graph(), lex.bag().clone())
            .write_to(&index)
            .unwrap();
        let index = Arc::new(index);
        lex.attach_index(index.clone());

        let results = lex.search(&SearchSpec::new().with(SearchCondition::pattern("C?T")), false);
        assert_eq!(results, vec!["CaT", "CoT", "CuT"]);

        let cache = lex.cache();
        assert_eq!(cache.len(), 3);
        for word in &results {
            let direct = index.word_info(word).unwrap().unwrap();
            assert_eq!(cache.get(&word.to_ascii_uppercase()), Some(&direct));
        }
    }

    #[test]
    fn test_definition_fallback() {
        let mut lex = Lexicon::new("TEST", &EngineConfig::default()).unwrap();
        lex.import_entries(
            vec![WordEntry {
                word: "cat".to_string(),
                definition: Some("a feline [n CATS] / to vomit [v CATTED]".to_string()),
            }],
            true,
        );
        assert_eq!(
            lex.definition("CAT", false).unwrap(),
            "a feline [n CATS] / to vomit [v CATTED]"
        );
        assert_eq!(
            lex.definition("CAT", true).unwrap(),
            "a feline [n CATS]\nto vomit [v CATTED]"
        );
        assert!(lex.definition("DOG", false).is_none());
    }
}
