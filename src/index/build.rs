use crate::error::Result;
use crate::graph::WordGraph;
use crate::index::{SqliteIndex, WordInfo};
use crate::lexicon::Definitions;
use crate::query::ProbabilityKey;
use crate::utils::{LetterBag, alphagram, num_unique_letters, num_vowels};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::info;

/// Computes the `words` table for a lexicon
pub struct IndexBuilder<'a> {
    graph: &'a WordGraph,
    bag: LetterBag,
    definitions: Option<&'a Definitions>,
    references: Vec<(String, &'a WordGraph)>,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(graph: &'a WordGraph, bag: LetterBag) -> Self {
        Self {
            graph,
            bag,
            definitions: None,
            references: Vec::new(),
        }
    }

    pub fn with_definitions(mut self, definitions: &'a Definitions) -> Self {
        self.definitions = Some(definitions);
        self
    }

    /// Words missing from `reference` get `symbol` in their lexicon symbols
    pub fn with_reference(mut self, symbol: &str, reference: &'a WordGraph) -> Self {
        self.references.push((symbol.to_string(), reference));
        self
    }

    /// One row per word, in alphabetical order
    pub fn build(&self) -> Vec<WordInfo> {
        let words = self.graph.words();

        let mut anagrams: FxHashMap<String, u32> = FxHashMap::default();
        for word in &words {
            *anagrams.entry(alphagram(word)).or_insert(0) += 1;
        }

        let mut infos: Vec<WordInfo> = words
            .par_iter()
            .map(|word| self.row(word, &anagrams))
            .collect();

        self.assign_probability_order(&mut infos);
        infos
    }

    /// Build every row and store it in `index`; returns the row count
    pub fn write_to(&self, index: &SqliteIndex) -> Result<usize> {
        let infos = self.build();
        index.insert(&infos)?;
        info!(rows = infos.len(), "attribute index built");
        Ok(infos.len())
    }

    fn row(&self, word: &str, anagrams: &FxHashMap<String, u32>) -> WordInfo {
        let len = word.len();
        let symbols: String = self
            .references
            .iter()
            .filter(|(_, reference)| !reference.contains_word(word))
            .map(|(symbol, _)| symbol.as_str())
            .collect();

        WordInfo {
            word: word.to_string(),
            length: len as u32,
            num_vowels: num_vowels(word),
            num_unique_letters: num_unique_letters(word),
            num_anagrams: anagrams.get(&alphagram(word)).copied().unwrap_or(1),
            point_value: self.bag.point_value(word),
            front_hooks: front_hooks(self.graph, word),
            back_hooks: back_hooks(self.graph, word),
            is_front_hook: len > 1 && self.graph.contains_word(&word[1..]),
            is_back_hook: len > 1 && self.graph.contains_word(&word[..len - 1]),
            lexicon_symbols: symbols,
            definition: self
                .definitions
                .and_then(|d| d.text(word))
                .unwrap_or_default(),
            ..Default::default()
        }
    }

    /// Rank words of each length by probability; ties share a min/max range
    fn assign_probability_order(&self, infos: &mut [WordInfo]) {
        let mut by_length: FxHashMap<u32, Vec<usize>> = FxHashMap::default();
        for (i, info) in infos.iter().enumerate() {
            by_length.entry(info.length).or_default().push(i);
        }

        for group in by_length.into_values() {
            let mut keyed: Vec<(ProbabilityKey, usize)> = group
                .into_iter()
                .map(|i| (ProbabilityKey::new(&infos[i].word, &self.bag, false), i))
                .collect();
            keyed.sort_by(|a, b| a.0.cmp(&b.0));

            let mut start = 0;
            while start < keyed.len() {
                let mut end = start + 1;
                while end < keyed.len() && keyed[end].0.ties_with(&keyed[start].0) {
                    end += 1;
                }
                for (rank, (_, i)) in keyed[start..end].iter().enumerate() {
                    let info = &mut infos[*i];
                    info.probability_order = (start + rank + 1) as u32;
                    info.min_probability_order = (start + 1) as u32;
                    info.max_probability_order = end as u32;
                }
                start = end;
            }
        }
    }
}

/// Letters that can be put in front of `word`, lower-case and sorted
pub fn front_hooks(graph: &WordGraph, word: &str) -> String {
    let mut candidate = String::with_capacity(word.len() + 1);
    (b'A'..=b'Z')
        .filter(|&letter| {
            candidate.clear();
            candidate.push(letter as char);
            candidate.push_str(word);
            graph.contains_word(&candidate)
        })
        .map(|letter| letter.to_ascii_lowercase() as char)
        .collect()
}

/// Letters that can be put after `word`, lower-case and sorted
pub fn back_hooks(graph: &WordGraph, word: &str) -> String {
    let dawg = graph.dawg();
    let Some(node) = dawg.walk(word.to_ascii_uppercase().as_bytes()) else {
        return String::new();
    };
    dawg.edges(node)
        .iter()
        .filter(|edge| dawg.is_terminal(edge.target))
        .map(|edge| edge.letter.to_ascii_lowercase() as char)
        .collect()
}
