use crate::error::Result;
use crate::index::{AttributeIndex, WordInfo};
use rustc_hash::FxHashMap;

/// Per-lexicon memo of attribute rows.
///
/// Cleared and repopulated in bulk after every search; there is no other
/// eviction.
#[derive(Debug, Default)]
pub struct WordInfoCache {
    entries: FxHashMap<String, WordInfo>,
}

impl WordInfoCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Fetch rows for `words` in one lookup; returns how many were found
    pub fn populate(&mut self, index: &dyn AttributeIndex, words: &[String]) -> Result<usize> {
        let infos = index.word_infos(words)?;
        let found = infos.len();
        for info in infos {
            self.entries.insert(info.word.clone(), info);
        }
        Ok(found)
    }

    pub fn insert(&mut self, info: WordInfo) {
        self.entries.insert(info.word.to_ascii_uppercase(), info);
    }

    /// Cached row, keyed by upper-case word
    pub fn get(&self, word: &str) -> Option<&WordInfo> {
        self.entries.get(word)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
