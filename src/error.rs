//! Error types for lexdex

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for lexicon operations
#[derive(Debug, Error)]
pub enum LexiconError {
    /// A file could not be opened or read during an import
    #[error("Can't open file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A serialized word graph failed its checksum or could not be decoded
    #[error("Format error: {0}")]
    Format(String),

    /// No lexicon is loaded under the given name
    #[error("Lexicon not loaded: {0}")]
    NotFound(String),

    /// The attribute index is missing or failed to answer
    #[error("Attribute index unavailable: {0}")]
    IndexUnavailable(String),

    /// A textual search expression could not be parsed
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Engine configuration is malformed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LexiconError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LexiconError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<rusqlite::Error> for LexiconError {
    fn from(err: rusqlite::Error) -> Self {
        LexiconError::IndexUnavailable(err.to_string())
    }
}

/// Result type alias for lexicon operations
pub type Result<T> = std::result::Result<T, LexiconError>;
