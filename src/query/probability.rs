//! Probability ordering and the rank-window filter
//!
//! Words are ranked by how many ways their letters can be drawn from the
//! tile bag, most likely first. Ties on the draw count are broken by
//! alphagram and then by the word, giving a total order. The rank window keeps
//! a contiguous slice of that order. Its edges move outward over runs of tied
//! words, up to the strict bounds.

use crate::query::spec::{SearchCondition, ValueRange};
use crate::utils::{LetterBag, alphagram};
use std::cmp::Ordering;

/// Sort key for probability order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbabilityKey {
    pub combinations: u64,
    /// Omitted in legacy mode, where ties fall back to plain alphabetical order
    alphagram: Option<String>,
    word: String,
}

impl ProbabilityKey {
    pub fn new(word: &str, bag: &LetterBag, legacy: bool) -> Self {
        let upper = word.to_ascii_uppercase();
        Self {
            combinations: bag.num_combinations(&upper),
            alphagram: (!legacy).then(|| alphagram(&upper)),
            word: upper,
        }
    }

    /// True if both keys share a draw count
    pub fn ties_with(&self, other: &ProbabilityKey) -> bool {
        self.combinations == other.combinations
    }
}

impl Ord for ProbabilityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .combinations
            .cmp(&self.combinations)
            .then_with(|| self.alphagram.cmp(&other.alphagram))
            .then_with(|| self.word.cmp(&other.word))
    }
}

impl PartialOrd for ProbabilityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sort words into probability order, keeping each word's original casing
pub fn sort_by_probability(
    words: Vec<String>,
    bag: &LetterBag,
    legacy: bool,
) -> Vec<(ProbabilityKey, String)> {
    let mut keyed: Vec<(ProbabilityKey, String)> = words
        .into_iter()
        .map(|w| (ProbabilityKey::new(&w, bag, legacy), w))
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.dedup_by(|a, b| a.0 == b.0);
    keyed
}

/// Intersection of every rank-window condition in a spec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbabilityWindow {
    strict: ValueRange,
    lax: ValueRange,
    legacy: bool,
}

impl ProbabilityWindow {
    /// Combine the rank windows of `conditions`, `None` if there are none
    pub fn from_conditions(conditions: &[SearchCondition]) -> Option<Self> {
        let mut window: Option<ProbabilityWindow> = None;

        for condition in conditions {
            let SearchCondition::LimitByProbabilityOrder { range, lax, legacy } = condition else {
                continue;
            };
            let w = window.get_or_insert(ProbabilityWindow {
                strict: ValueRange::new(0, u32::MAX),
                lax: ValueRange::new(0, u32::MAX),
                legacy: false,
            });
            let side = if *lax { &mut w.lax } else { &mut w.strict };
            side.min = side.min.max(range.min);
            side.max = side.max.min(range.max);
            w.legacy |= *legacy;
        }

        window
    }

    /// Keep the words whose probability rank falls in the window.
    ///
    /// Ranks are 1-based over `words` itself. An edge that splits a run of
    /// tied words moves outward to take in the run, but never past the strict
    /// bound on that side. The result is in probability order.
    pub fn apply(&self, words: Vec<String>, bag: &LetterBag) -> Vec<String> {
        let size = words.len();
        if size == 0
            || self.strict.min as usize > size
            || self.lax.min as usize > size
            || self.strict.max == 0
            || self.lax.max == 0
        {
            return Vec::new();
        }

        let to_index = |rank: u32| (rank.saturating_sub(1) as usize).min(size - 1);
        let mut min = to_index(self.strict.min).max(to_index(self.lax.min));
        let mut max = to_index(self.strict.max).min(to_index(self.lax.max));
        if min > max {
            return Vec::new();
        }

        let keyed = sort_by_probability(words, bag, self.legacy);
        let max_index = keyed.len() - 1;
        max = max.min(max_index);
        min = min.min(max);
        let floor = to_index(self.strict.min);
        let ceiling = to_index(self.strict.max).min(max_index);

        while min > floor && keyed[min - 1].0.ties_with(&keyed[min].0) {
            min -= 1;
        }
        while max < ceiling && keyed[max + 1].0.ties_with(&keyed[max].0) {
            max += 1;
        }

        keyed
            .into_iter()
            .skip(min)
            .take(max - min + 1)
            .map(|(_, word)| word)
            .collect()
    }
}
