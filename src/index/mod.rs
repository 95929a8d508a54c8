//! Attribute index: precomputed per-word attributes consulted by the planner.
//!
//! The index answers range, `LIKE` and membership predicates over the
//! `words` table. It is never the authority on whether a word exists; the
//! word graph is.

pub mod build;
pub mod cache;
pub mod sqlite;
pub mod types;

pub use build::IndexBuilder;
pub use cache::WordInfoCache;
pub use sqlite::SqliteIndex;
pub use types::*;

use crate::error::Result;

/// Query interface of an attribute store
pub trait AttributeIndex: Send + Sync {
    /// Words satisfying every predicate, optionally restricted to `candidates`
    /// (compared case-insensitively), in alphabetical order
    fn search(&self, query: &IndexQuery, candidates: Option<&[String]>) -> Result<Vec<String>>;

    /// Rows for the given words; words without a row are omitted
    fn word_infos(&self, words: &[String]) -> Result<Vec<WordInfo>>;

    /// Row for a single word
    fn word_info(&self, word: &str) -> Result<Option<WordInfo>> {
        Ok(self.word_infos(&[word.to_string()])?.into_iter().next())
    }
}
