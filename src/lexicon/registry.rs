use crate::error::{LexiconError, Result};
use crate::index::{SqliteIndex, WordInfo};
use crate::lexicon::{Lexicon, import};
use crate::query::{SearchCondition, SearchSet, SearchSpec, ValueRange};
use crate::utils::{EngineConfig, alphagrams, num_unique_letters, num_vowels};
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

type SharedLexicon = Arc<RwLock<Lexicon>>;

/// Named lexicons and every query that can be put to them.
///
/// Lookups against a lexicon that is not loaded return empty, zero or false
/// values. Imports take the lexicon's write lock; everything else reads.
#[derive(Debug, Default)]
pub struct WordEngine {
    config: EngineConfig,
    lexicons: RwLock<FxHashMap<String, SharedLexicon>>,
}

fn read(lexicon: &SharedLexicon) -> RwLockReadGuard<'_, Lexicon> {
    lexicon.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(lexicon: &SharedLexicon) -> RwLockWriteGuard<'_, Lexicon> {
    lexicon.write().unwrap_or_else(PoisonError::into_inner)
}

impl WordEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            lexicons: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn get(&self, name: &str) -> Option<SharedLexicon> {
        self.lexicons
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Existing lexicon, or a new empty one registered under `name`
    fn get_or_create(&self, name: &str) -> Result<SharedLexicon> {
        let mut lexicons = self.lexicons.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = lexicons.get(name) {
            return Ok(existing.clone());
        }
        let lexicon = Arc::new(RwLock::new(Lexicon::new(name, &self.config)?));
        lexicons.insert(name.to_string(), lexicon.clone());
        debug!(lexicon = name, "created lexicon");
        Ok(lexicon)
    }

    /// Run `f` against a loaded lexicon, or return `default`
    fn with<T>(&self, name: &str, default: T, f: impl FnOnce(&Lexicon) -> T) -> T {
        match self.get(name) {
            Some(lexicon) => f(&read(&lexicon)),
            None => default,
        }
    }

    // Lifecycle

    pub fn lexicon_is_loaded(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names of all loaded lexicons, sorted
    pub fn lexicon_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .lexicons
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Drop a lexicon; returns false if it was not loaded
    pub fn unload(&self, name: &str) -> bool {
        let removed = self
            .lexicons
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some();
        if removed {
            info!(lexicon = name, "unloaded lexicon");
        }
        removed
    }

    // Imports

    /// Import a word list file, creating the lexicon on first use. Returns
    /// the number of lines imported.
    pub fn import_text_file(&self, name: &str, path: &Path, load_definitions: bool) -> Result<usize> {
        let entries = import::read_word_list(path)?;
        let lexicon = self.get_or_create(name)?;
        let imported = write(&lexicon).import_entries(entries, load_definitions);
        Ok(imported)
    }

    /// Import bare words, creating the lexicon on first use
    pub fn import_words<I, S>(&self, name: &str, words: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lexicon = self.get_or_create(name)?;
        let imported = write(&lexicon).import_words(words);
        Ok(imported)
    }

    /// Load a serialized graph, creating the lexicon on first use.
    ///
    /// On a checksum or format error the lexicon keeps its previous graph.
    pub fn import_serialized(
        &self,
        name: &str,
        bytes: &[u8],
        reversed: bool,
        expected_checksum: Option<u16>,
    ) -> Result<()> {
        let lexicon = self.get_or_create(name)?;
        write(&lexicon).import_serialized(bytes, reversed, expected_checksum)
    }

    pub fn import_serialized_file(
        &self,
        name: &str,
        path: &Path,
        reversed: bool,
        expected_checksum: Option<u16>,
    ) -> Result<()> {
        let bytes = import::read_bytes(path)?;
        self.import_serialized(name, &bytes, reversed, expected_checksum)
    }

    /// Add a stem list to a loaded lexicon; returns 0 for an unknown lexicon
    pub fn import_stems(&self, name: &str, path: &Path) -> Result<usize> {
        let Some(lexicon) = self.get(name) else {
            return Ok(0);
        };
        let stems = import::read_stems(path)?;
        Ok(write(&lexicon).import_stems(stems))
    }

    /// Serialized image of a lexicon's graph
    pub fn export_graph(&self, name: &str) -> Result<Vec<u8>> {
        let lexicon = self
            .get(name)
            .ok_or_else(|| LexiconError::NotFound(name.to_string()))?;
        let bytes = read(&lexicon).graph().to_bytes()?;
        Ok(bytes)
    }

    // Attribute database

    /// Attach the attribute database at `path` to a loaded lexicon
    pub fn connect_database(&self, name: &str, path: &Path) -> Result<()> {
        let lexicon = self
            .get(name)
            .ok_or_else(|| LexiconError::NotFound(name.to_string()))?;
        let index = SqliteIndex::open(path)?;
        write(&lexicon).attach_index(Arc::new(index));
        info!(lexicon = name, path = %path.display(), "connected attribute database");
        Ok(())
    }

    pub fn disconnect_database(&self, name: &str) {
        if let Some(lexicon) = self.get(name) {
            write(&lexicon).detach_index();
        }
    }

    pub fn database_is_connected(&self, name: &str) -> bool {
        self.with(name, false, |lex| lex.has_index())
    }

    // Searching

    /// Planned search; see [`Lexicon::search`]
    pub fn search(&self, name: &str, spec: &SearchSpec, all_caps: bool) -> Vec<String> {
        self.with(name, Vec::new(), |lex| lex.search(spec, all_caps))
    }

    /// Search driven by word lists alone, without the graph walk or the index.
    ///
    /// Acceptable words from the `InWordList` conditions are intersected, or
    /// united when the spec is disjunctive, then narrowed by any anagram
    /// count, vowel, unique-letter and point-value ranges. Results are sorted.
    pub fn word_list_search(&self, name: &str, spec: &SearchSpec) -> Vec<String> {
        self.with(name, Vec::new(), |lex| {
            let mut found: Option<FxHashSet<String>> = None;
            let mut anagrams = ValueRange::at_least(0);
            let mut vowels = ValueRange::at_least(0);
            let mut unique = ValueRange::at_least(0);
            let mut points = ValueRange::at_least(0);

            for condition in &spec.conditions {
                let (bound, range) = match condition {
                    SearchCondition::NumAnagrams(range) => (&mut anagrams, range),
                    SearchCondition::NumVowels(range) => (&mut vowels, range),
                    SearchCondition::NumUniqueLetters(range) => (&mut unique, range),
                    SearchCondition::PointValue(range) => (&mut points, range),
                    SearchCondition::InWordList { words, .. } => {
                        let listed: FxHashSet<String> = words
                            .iter()
                            .map(|w| w.to_ascii_uppercase())
                            .filter(|w| lex.is_acceptable(w))
                            .collect();
                        found = Some(match found.take() {
                            None => listed,
                            Some(prev) if spec.conjunction => prev.intersection(&listed).cloned().collect(),
                            Some(prev) => prev.union(&listed).cloned().collect(),
                        });
                        continue;
                    }
                    _ => continue,
                };
                match bound.intersect(range) {
                    Some(merged) => *bound = merged,
                    None => return Vec::new(),
                }
            }

            let mut results: Vec<String> = found
                .unwrap_or_default()
                .into_iter()
                .filter(|word| {
                    anagrams.contains(lex.num_anagrams(word))
                        && vowels.contains(num_vowels(word))
                        && unique.contains(num_unique_letters(word))
                        && points.contains(lex.bag().point_value(word))
                })
                .collect();
            results.sort_unstable();
            results
        })
    }

    // Word lookups

    pub fn is_acceptable(&self, name: &str, word: &str) -> bool {
        self.with(name, false, |lex| lex.is_acceptable(word))
    }

    pub fn num_words(&self, name: &str) -> usize {
        self.with(name, 0, |lex| lex.num_words())
    }

    /// Attribute row, invalid when no database row is available
    pub fn word_info(&self, name: &str, word: &str) -> WordInfo {
        self.with(name, WordInfo::default(), |lex| lex.word_info(word))
    }

    pub fn definition(&self, name: &str, word: &str, replace_links: bool) -> Option<String> {
        self.with(name, None, |lex| lex.definition(word, replace_links))
    }

    pub fn front_hook_letters(&self, name: &str, word: &str) -> String {
        self.with(name, String::new(), |lex| lex.front_hook_letters(word))
    }

    pub fn back_hook_letters(&self, name: &str, word: &str) -> String {
        self.with(name, String::new(), |lex| lex.back_hook_letters(word))
    }

    pub fn num_anagrams(&self, name: &str, word: &str) -> u32 {
        self.with(name, 0, |lex| lex.num_anagrams(word))
    }

    /// Probability rank within the word's length; `None` without a database row
    pub fn probability_order(&self, name: &str, word: &str) -> Option<u32> {
        self.info_field(name, word, |info| info.probability_order)
    }

    pub fn min_probability_order(&self, name: &str, word: &str) -> Option<u32> {
        self.info_field(name, word, |info| info.min_probability_order)
    }

    pub fn max_probability_order(&self, name: &str, word: &str) -> Option<u32> {
        self.info_field(name, word, |info| info.max_probability_order)
    }

    pub fn num_vowels(&self, name: &str, word: &str) -> u32 {
        self.info_field(name, word, |info| info.num_vowels)
            .unwrap_or_else(|| num_vowels(word))
    }

    pub fn num_unique_letters(&self, name: &str, word: &str) -> u32 {
        self.info_field(name, word, |info| info.num_unique_letters)
            .unwrap_or_else(|| num_unique_letters(word))
    }

    pub fn point_value(&self, name: &str, word: &str) -> u32 {
        self.with(name, 0, |lex| {
            let info = lex.word_info(word);
            if info.is_valid() {
                info.point_value
            } else {
                lex.bag().point_value(word)
            }
        })
    }

    /// Whether dropping the first letter leaves a word
    pub fn is_front_hook(&self, name: &str, word: &str) -> bool {
        self.info_field(name, word, |info| info.is_front_hook)
            .unwrap_or_else(|| self.is_set_member(name, word, SearchSet::FrontHooks))
    }

    /// Whether dropping the last letter leaves a word
    pub fn is_back_hook(&self, name: &str, word: &str) -> bool {
        self.info_field(name, word, |info| info.is_back_hook)
            .unwrap_or_else(|| self.is_set_member(name, word, SearchSet::BackHooks))
    }

    pub fn lexicon_symbols(&self, name: &str, word: &str) -> String {
        self.info_field(name, word, |info| info.lexicon_symbols)
            .unwrap_or_default()
    }

    pub fn is_set_member(&self, name: &str, word: &str, set: SearchSet) -> bool {
        self.with(name, false, |lex| lex.is_set_member(word, set))
    }

    /// Alphagrams of the given strings, duplicates removed
    pub fn alphagrams<S: AsRef<str>>(&self, words: &[S]) -> Vec<String> {
        alphagrams(words)
    }

    fn info_field<T>(&self, name: &str, word: &str, field: impl FnOnce(WordInfo) -> T) -> Option<T> {
        let info = self.word_info(name, word);
        info.is_valid().then(|| field(info))
    }
}
