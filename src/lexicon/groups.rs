//! Word categories for study lists: hook words, high fives and the
//! stem-based seven and eight letter classes.

use crate::graph::WordGraph;
use crate::query::SearchSet;
use crate::utils::{EngineConfig, LetterBag, alphagram, is_sub_multiset};
use rustc_hash::{FxHashMap, FxHashSet};

/// Imported stems and their alphagrams, by stem length
#[derive(Debug, Clone, Default)]
pub struct StemIndex {
    stems: FxHashMap<usize, Vec<String>>,
    alphagrams: FxHashMap<usize, FxHashSet<String>>,
}

impl StemIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one stem list. The first stem fixes the length; stems of any other
    /// length are discarded. Returns how many stems were kept.
    pub fn add<I, S>(&mut self, stems: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut length = 0;
        let mut kept = Vec::new();
        for stem in stems {
            let stem = stem.as_ref().to_ascii_uppercase();
            if stem.is_empty() {
                continue;
            }
            if length == 0 {
                length = stem.len();
            }
            if stem.len() == length {
                kept.push(stem);
            }
        }
        if kept.is_empty() {
            return 0;
        }

        let alphagrams = self.alphagrams.entry(length).or_default();
        alphagrams.extend(kept.iter().map(|stem| alphagram(stem)));
        let count = kept.len();
        self.stems.entry(length).or_default().extend(kept);
        count
    }

    /// Stems of one length, in import order
    pub fn stems(&self, length: usize) -> &[String] {
        self.stems.get(&length).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn has_length(&self, length: usize) -> bool {
        self.alphagrams.contains_key(&length)
    }

    pub fn contains_alphagram(&self, length: usize, alphagram: &str) -> bool {
        self.alphagrams
            .get(&length)
            .is_some_and(|set| set.contains(alphagram))
    }

    pub fn alphagrams(&self, length: usize) -> impl Iterator<Item = &String> {
        self.alphagrams.get(&length).into_iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.stems.is_empty()
    }
}

/// Decides set membership for words already known to be acceptable
#[derive(Debug, Clone)]
pub struct GroupClassifier {
    bag: LetterBag,
    type_two_pool: String,
    type_three_seven: u64,
    type_three_eight: u64,
}

impl GroupClassifier {
    /// Thresholds come from the configured reference words and tile bag
    pub fn new(config: &EngineConfig, bag: &LetterBag) -> Self {
        Self {
            bag: bag.clone(),
            type_two_pool: config.type_two_letters.to_ascii_uppercase(),
            type_three_seven: bag.num_combinations(&config.type_three_seven_reference),
            type_three_eight: bag.num_combinations(&config.type_three_eight_reference),
        }
    }

    pub fn is_member(&self, set: SearchSet, word: &str, graph: &WordGraph, stems: &StemIndex) -> bool {
        if !word.is_ascii() {
            return false;
        }
        let word = word.to_ascii_uppercase();
        let len = word.len();

        match set {
            SearchSet::HookWords => {
                len > 1 && (graph.contains_word(&word[1..]) || graph.contains_word(&word[..len - 1]))
            }
            SearchSet::FrontHooks => len > 1 && graph.contains_word(&word[1..]),
            SearchSet::BackHooks => len > 1 && graph.contains_word(&word[..len - 1]),
            SearchSet::HighFives => self.is_high_five(&word),
            SearchSet::TypeOneSevens => len == 7 && one_removed_is_stem(&word, stems),
            SearchSet::TypeOneEights => len == 8 && two_removed_is_stem(&word, stems),
            SearchSet::TypeTwoSevens => len == 7 && self.is_type_two(&word, stems),
            SearchSet::TypeTwoEights => len == 8 && self.is_type_two(&word, stems),
            SearchSet::TypeThreeSevens => {
                len == 7
                    && self.bag.num_combinations(&word) >= self.type_three_seven
                    && !self.is_type_one(&word, stems)
                    && !self.is_type_two(&word, stems)
            }
            SearchSet::TypeThreeEights => {
                len == 8
                    && self.bag.num_combinations(&word) >= self.type_three_eight
                    && !self.is_type_one(&word, stems)
                    && !self.is_type_two(&word, stems)
            }
            SearchSet::EightsFromSevenLetterStems => len == 8 && one_removed_is_stem(&word, stems),
        }
    }

    /// Five letters worth at most 5 each, with a 4 or 5 at either end
    fn is_high_five(&self, word: &str) -> bool {
        let bytes = word.as_bytes();
        if bytes.len() != 5 {
            return false;
        }
        let values: Vec<u32> = bytes.iter().map(|&b| self.bag.letter_value(b)).collect();
        values.iter().all(|&v| v <= 5) && [values[0], values[4]].iter().any(|&v| v >= 4)
    }

    fn is_type_one(&self, word: &str, stems: &StemIndex) -> bool {
        match word.len() {
            7 => one_removed_is_stem(word, stems),
            8 => two_removed_is_stem(word, stems),
            _ => false,
        }
    }

    /// Drawn entirely from the common-letter pool and not type one
    fn is_type_two(&self, word: &str, stems: &StemIndex) -> bool {
        is_sub_multiset(word, &self.type_two_pool) && !self.is_type_one(word, stems)
    }
}

/// Some single-letter deletion of the alphagram is a stem one letter shorter
fn one_removed_is_stem(word: &str, stems: &StemIndex) -> bool {
    let target = word.len() - 1;
    if !stems.has_length(target) {
        return false;
    }
    let agram = alphagram(word);
    (0..agram.len()).any(|i| {
        let mut reduced = String::with_capacity(target);
        reduced.push_str(&agram[..i]);
        reduced.push_str(&agram[i + 1..]);
        stems.contains_alphagram(target, &reduced)
    })
}

/// Some stem two letters shorter fits inside the word's letters
fn two_removed_is_stem(word: &str, stems: &StemIndex) -> bool {
    let target = word.len() - 2;
    stems.alphagrams(target).any(|stem| is_sub_multiset(stem, word))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> GroupClassifier {
        GroupClassifier::new(&EngineConfig::default(), &LetterBag::default())
    }

    fn graph(words: &[&str]) -> WordGraph {
        let mut g = WordGraph::new();
        g.import_words(words.iter().copied());
        g
    }

    #[test]
    fn test_stem_index_keeps_first_length() {
        let mut stems = StemIndex::new();
        assert_eq!(stems.add(["SATIRE", "RETAIN", "TOOLONG"]), 2);
        assert_eq!(stems.add(["SENIOR"]), 1);
        assert_eq!(stems.stems(6).len(), 3);
        assert!(stems.contains_alphagram(6, "AEIRST"));
        assert!(!stems.has_length(7));
    }

    #[test]
    fn test_hook_sets() {
        let g = graph(&["CAT", "CATS", "AT", "SCAT"]);
        let stems = StemIndex::new();
        let c = classifier();
        assert!(c.is_member(SearchSet::BackHooks, "CATS", &g, &stems));
        assert!(!c.is_member(SearchSet::BackHooks, "CAT", &g, &stems));
        assert!(c.is_member(SearchSet::FrontHooks, "CAT", &g, &stems));
        assert!(c.is_member(SearchSet::FrontHooks, "SCAT", &g, &stems));
        assert!(c.is_member(SearchSet::HookWords, "CATS", &g, &stems));
        assert!(!c.is_member(SearchSet::HookWords, "AT", &g, &stems));
    }

    #[test]
    fn test_non_ascii_words_are_in_no_set() {
        let g = graph(&["A", "AT", "CAT"]);
        let mut stems = StemIndex::new();
        stems.add(["SATIRE"]);
        let c = classifier();
        for set in SearchSet::ALL {
            for word in ["ÉA", "AÉ", "SATIRÉS", "SATIRÉSÉ"] {
                assert!(!c.is_member(set, word, &g, &stems), "{:?} {}", set, word);
            }
        }
    }

    #[test]
    fn test_high_fives() {
        let g = WordGraph::new();
        let stems = StemIndex::new();
        let c = classifier();
        // H is worth 4
        assert!(c.is_member(SearchSet::HighFives, "HEART", &g, &stems));
        assert!(c.is_member(SearchSet::HighFives, "TEACH", &g, &stems));
        assert!(!c.is_member(SearchSet::HighFives, "TAHER", &g, &stems));
        // Z is worth 10
        assert!(!c.is_member(SearchSet::HighFives, "ZEBRA", &g, &stems));
        assert!(!c.is_member(SearchSet::HighFives, "HEARTS", &g, &stems));
    }

    #[test]
    fn test_type_one_sevens_and_eights() {
        let g = WordGraph::new();
        let mut stems = StemIndex::new();
        stems.add(["SATIRE"]);
        let c = classifier();

        assert!(c.is_member(SearchSet::TypeOneSevens, "BAITERS", &g, &stems));
        assert!(!c.is_member(SearchSet::TypeOneSevens, "BOOKEND", &g, &stems));
        assert!(!c.is_member(SearchSet::TypeOneEights, "BARITONE", &g, &stems));
        assert!(c.is_member(SearchSet::TypeOneEights, "STAIRWED", &g, &stems));
    }

    #[test]
    fn test_eights_from_seven_stems() {
        let g = WordGraph::new();
        let mut stems = StemIndex::new();
        stems.add(["RETAINS"]);
        let c = classifier();
        assert!(c.is_member(SearchSet::EightsFromSevenLetterStems, "STRAINED", &g, &stems));
        assert!(!c.is_member(SearchSet::EightsFromSevenLetterStems, "BOOKENDS", &g, &stems));
    }

    #[test]
    fn test_type_classes_partition() {
        let g = WordGraph::new();
        let mut stems = StemIndex::new();
        stems.add(["SATIRE"]);
        let c = classifier();

        // Type one, so neither type two nor three
        assert!(c.is_member(SearchSet::TypeOneSevens, "ARTIEST", &g, &stems));
        assert!(!c.is_member(SearchSet::TypeTwoSevens, "ARTIEST", &g, &stems));
        assert!(!c.is_member(SearchSet::TypeThreeSevens, "ARTIEST", &g, &stems));

        // Common letters only, no stem
        assert!(c.is_member(SearchSet::TypeTwoSevens, "TOENAIL", &g, &stems));
        assert!(!c.is_member(SearchSet::TypeThreeSevens, "TOENAIL", &g, &stems));

        // The reference word itself meets its own threshold
        assert!(c.is_member(SearchSet::TypeThreeSevens, "HUNTERS", &g, &stems));
        assert!(!c.is_member(SearchSet::TypeThreeSevens, "JUKEBOX", &g, &stems));
    }
}
