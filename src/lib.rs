//! # lexdex - Lexicon Search Engine
//!
//! lexdex answers membership, attribute and structured search queries over
//! word-game lexicons of hundreds of thousands of words.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`graph`] - DAWG word graph with pattern and rack matching
//! - [`index`] - Attribute index (SQLite) and per-search cache
//! - [`query`] - Search specs, parsing, phase planning and the rank window
//! - [`lexicon`] - Named lexicons, imports, definitions and study sets
//! - [`output`] - Terminal formatting
//! - [`utils`] - Letters, tile bag, encoding and configuration
//!
//! ## Quick Start
//!
//! ```no_run
//! use lexdex::lexicon::WordEngine;
//! use lexdex::query::parse_search;
//! use lexdex::utils::EngineConfig;
//! use std::path::Path;
//!
//! let engine = WordEngine::new(EngineConfig::default());
//! engine.import_text_file("TWL", Path::new("words.txt"), true)?;
//!
//! let spec = parse_search("pattern:C?T -set:back-hooks")?;
//! for word in engine.search("TWL", &spec, true) {
//!     println!("{}", word);
//! }
//! # Ok::<(), lexdex::LexiconError>(())
//! ```
//!
//! ## Search phases
//!
//! A search is split into up to three phases run in order:
//!
//! 1. **Graph** - patterns and racks walk the word graph
//! 2. **Index** - numeric and set conditions become parameterized SQL,
//!    restricted to the graph results when there are any
//! 3. **Local** - prefix, suffix and study-set checks per word
//!
//! An optional probability window then keeps a slice of the results by draw
//! likelihood.

pub mod error;
pub mod graph;
pub mod index;
pub mod lexicon;
pub mod output;
pub mod query;
pub mod utils;

pub use error::{LexiconError, Result};
