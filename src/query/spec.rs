//! Structured search specifications
//!
//! A [`SearchSpec`] is an ordered list of [`SearchCondition`]s plus a flag
//! choosing AND or OR semantics across the ordinary conditions. Word-list
//! membership and rank windows are never disjuncts: they always constrain the
//! combined result.

use crate::graph::{Pattern, Rack};
use std::fmt;

/// Inclusive numeric range; `min == max` is an exact match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueRange {
    pub min: u32,
    pub max: u32,
}

impl ValueRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn exact(value: u32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Everything from `min` up
    pub fn at_least(min: u32) -> Self {
        Self { min, max: u32::MAX }
    }

    #[inline]
    pub fn contains(&self, value: u32) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Overlap of two ranges, `None` if disjoint
    pub fn intersect(&self, other: &ValueRange) -> Option<ValueRange> {
        let range = ValueRange::new(self.min.max(other.min), self.max.min(other.max));
        (!range.is_empty()).then_some(range)
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else if self.max == u32::MAX {
            write!(f, "{}-", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

/// Named word categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchSet {
    HookWords,
    FrontHooks,
    BackHooks,
    HighFives,
    TypeOneSevens,
    TypeOneEights,
    TypeTwoSevens,
    TypeTwoEights,
    TypeThreeSevens,
    TypeThreeEights,
    EightsFromSevenLetterStems,
}

impl SearchSet {
    pub const ALL: [SearchSet; 11] = [
        SearchSet::HookWords,
        SearchSet::FrontHooks,
        SearchSet::BackHooks,
        SearchSet::HighFives,
        SearchSet::TypeOneSevens,
        SearchSet::TypeOneEights,
        SearchSet::TypeTwoSevens,
        SearchSet::TypeTwoEights,
        SearchSet::TypeThreeSevens,
        SearchSet::TypeThreeEights,
        SearchSet::EightsFromSevenLetterStems,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SearchSet::HookWords => "hook-words",
            SearchSet::FrontHooks => "front-hooks",
            SearchSet::BackHooks => "back-hooks",
            SearchSet::HighFives => "high-fives",
            SearchSet::TypeOneSevens => "type-one-sevens",
            SearchSet::TypeOneEights => "type-one-eights",
            SearchSet::TypeTwoSevens => "type-two-sevens",
            SearchSet::TypeTwoEights => "type-two-eights",
            SearchSet::TypeThreeSevens => "type-three-sevens",
            SearchSet::TypeThreeEights => "type-three-eights",
            SearchSet::EightsFromSevenLetterStems => "eights-from-seven-stems",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        Self::ALL.into_iter().find(|set| set.name() == name)
    }
}

impl fmt::Display for SearchSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One constraint of a search
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SearchCondition {
    /// `?` one letter, `*` any run, `[..]` letter class
    PatternMatch { pattern: String, negated: bool },
    /// Uses every letter of the rack exactly once
    AnagramMatch { letters: String, negated: bool },
    /// Uses some of the letters of the rack
    SubanagramMatch { letters: String, negated: bool },
    /// Built from the rack, with word length inside `[min, max]`
    ConsistOf {
        letters: String,
        min: u32,
        max: u32,
        negated: bool,
    },
    Length(ValueRange),
    /// Word contains every listed letter, counting repeats
    IncludeLetters { letters: String, negated: bool },
    /// `prefix + word` is itself a word
    Prefix { prefix: String, negated: bool },
    /// `word + suffix` is itself a word
    Suffix { suffix: String, negated: bool },
    NumVowels(ValueRange),
    NumUniqueLetters(ValueRange),
    PointValue(ValueRange),
    NumAnagrams(ValueRange),
    /// Stored rank; `lax` matches anywhere in a word's tie range
    ProbabilityOrder { range: ValueRange, lax: bool },
    BelongToGroup { set: SearchSet, negated: bool },
    InWordList { words: Vec<String>, negated: bool },
    /// Keep only a rank window of the final result
    LimitByProbabilityOrder {
        range: ValueRange,
        lax: bool,
        legacy: bool,
    },
}

impl SearchCondition {
    pub fn pattern(pattern: &str) -> Self {
        SearchCondition::PatternMatch {
            pattern: pattern.to_string(),
            negated: false,
        }
    }

    pub fn anagram(letters: &str) -> Self {
        SearchCondition::AnagramMatch {
            letters: letters.to_string(),
            negated: false,
        }
    }

    pub fn subanagram(letters: &str) -> Self {
        SearchCondition::SubanagramMatch {
            letters: letters.to_string(),
            negated: false,
        }
    }

    pub fn length(min: u32, max: u32) -> Self {
        SearchCondition::Length(ValueRange::new(min, max))
    }

    pub fn in_set(set: SearchSet) -> Self {
        SearchCondition::BelongToGroup {
            set,
            negated: false,
        }
    }

    pub fn in_word_list<S: AsRef<str>>(words: &[S]) -> Self {
        SearchCondition::InWordList {
            words: words.iter().map(|w| w.as_ref().to_string()).collect(),
            negated: false,
        }
    }

    pub fn limit(min: u32, max: u32, lax: bool) -> Self {
        SearchCondition::LimitByProbabilityOrder {
            range: ValueRange::new(min, max),
            lax,
            legacy: false,
        }
    }

    /// The same condition with its negation flag flipped.
    ///
    /// Range conditions have no negation and are returned unchanged.
    pub fn negate(mut self) -> Self {
        match &mut self {
            SearchCondition::PatternMatch { negated, .. }
            | SearchCondition::AnagramMatch { negated, .. }
            | SearchCondition::SubanagramMatch { negated, .. }
            | SearchCondition::ConsistOf { negated, .. }
            | SearchCondition::IncludeLetters { negated, .. }
            | SearchCondition::Prefix { negated, .. }
            | SearchCondition::Suffix { negated, .. }
            | SearchCondition::BelongToGroup { negated, .. }
            | SearchCondition::InWordList { negated, .. } => *negated = !*negated,
            _ => {}
        }
        self
    }

    pub fn is_negated(&self) -> bool {
        match self {
            SearchCondition::PatternMatch { negated, .. }
            | SearchCondition::AnagramMatch { negated, .. }
            | SearchCondition::SubanagramMatch { negated, .. }
            | SearchCondition::ConsistOf { negated, .. }
            | SearchCondition::IncludeLetters { negated, .. }
            | SearchCondition::Prefix { negated, .. }
            | SearchCondition::Suffix { negated, .. }
            | SearchCondition::BelongToGroup { negated, .. }
            | SearchCondition::InWordList { negated, .. } => *negated,
            _ => false,
        }
    }

    pub fn is_word_list(&self) -> bool {
        matches!(self, SearchCondition::InWordList { .. })
    }

    pub fn is_rank_window(&self) -> bool {
        matches!(self, SearchCondition::LimitByProbabilityOrder { .. })
    }

    /// Length range implied by a positive graph condition, used to prune traversal
    fn length_hint(&self) -> Option<ValueRange> {
        match self {
            SearchCondition::PatternMatch {
                pattern,
                negated: false,
            } => {
                let parsed = Pattern::parse(pattern)?;
                parsed.fixed_length().map(|len| ValueRange::exact(len as u32))
            }
            SearchCondition::AnagramMatch {
                letters,
                negated: false,
            } => {
                let rack = Rack::parse(letters)?;
                (!rack.is_open()).then(|| ValueRange::exact(rack.len() as u32))
            }
            SearchCondition::SubanagramMatch {
                letters,
                negated: false,
            } => {
                let rack = Rack::parse(letters)?;
                (!rack.is_open()).then(|| ValueRange::new(1, rack.len() as u32))
            }
            SearchCondition::ConsistOf {
                min,
                max,
                negated: false,
                ..
            } => Some(ValueRange::new((*min).max(1), *max)),
            _ => None,
        }
    }

    fn uppercased(self) -> Self {
        match self {
            SearchCondition::PatternMatch { pattern, negated } => SearchCondition::PatternMatch {
                pattern: pattern.to_ascii_uppercase(),
                negated,
            },
            SearchCondition::AnagramMatch { letters, negated } => SearchCondition::AnagramMatch {
                letters: letters.to_ascii_uppercase(),
                negated,
            },
            SearchCondition::SubanagramMatch { letters, negated } => {
                SearchCondition::SubanagramMatch {
                    letters: letters.to_ascii_uppercase(),
                    negated,
                }
            }
            SearchCondition::ConsistOf {
                letters,
                min,
                max,
                negated,
            } => SearchCondition::ConsistOf {
                letters: letters.to_ascii_uppercase(),
                min,
                max,
                negated,
            },
            SearchCondition::IncludeLetters { letters, negated } => {
                SearchCondition::IncludeLetters {
                    letters: letters.to_ascii_uppercase(),
                    negated,
                }
            }
            SearchCondition::Prefix { prefix, negated } => SearchCondition::Prefix {
                prefix: prefix.to_ascii_uppercase(),
                negated,
            },
            SearchCondition::Suffix { suffix, negated } => SearchCondition::Suffix {
                suffix: suffix.to_ascii_uppercase(),
                negated,
            },
            SearchCondition::InWordList { words, negated } => SearchCondition::InWordList {
                words: words.iter().map(|w| w.to_ascii_uppercase()).collect(),
                negated,
            },
            other => other,
        }
    }
}

/// Which numeric attribute a mergeable range condition constrains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeKind {
    Length,
    Vowels,
    Unique,
    Points,
    Anagrams,
    Probability { lax: bool },
}

fn range_of(condition: &SearchCondition) -> Option<(RangeKind, ValueRange)> {
    match condition {
        SearchCondition::Length(r) => Some((RangeKind::Length, *r)),
        SearchCondition::NumVowels(r) => Some((RangeKind::Vowels, *r)),
        SearchCondition::NumUniqueLetters(r) => Some((RangeKind::Unique, *r)),
        SearchCondition::PointValue(r) => Some((RangeKind::Points, *r)),
        SearchCondition::NumAnagrams(r) => Some((RangeKind::Anagrams, *r)),
        SearchCondition::ProbabilityOrder { range, lax } => {
            Some((RangeKind::Probability { lax: *lax }, *range))
        }
        _ => None,
    }
}

fn with_range(kind: RangeKind, range: ValueRange) -> SearchCondition {
    match kind {
        RangeKind::Length => SearchCondition::Length(range),
        RangeKind::Vowels => SearchCondition::NumVowels(range),
        RangeKind::Unique => SearchCondition::NumUniqueLetters(range),
        RangeKind::Points => SearchCondition::PointValue(range),
        RangeKind::Anagrams => SearchCondition::NumAnagrams(range),
        RangeKind::Probability { lax } => SearchCondition::ProbabilityOrder { range, lax },
    }
}

/// Ordered conditions plus the AND/OR flag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchSpec {
    pub conditions: Vec<SearchCondition>,
    /// `true` = AND across ordinary conditions, `false` = OR
    pub conjunction: bool,
}

impl Default for SearchSpec {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchSpec {
    pub fn new() -> Self {
        Self {
            conditions: Vec::new(),
            conjunction: true,
        }
    }

    pub fn from_conditions(conditions: Vec<SearchCondition>) -> Self {
        Self {
            conditions,
            conjunction: true,
        }
    }

    /// Builder-style condition append
    pub fn with(mut self, condition: SearchCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Switch to OR semantics
    pub fn any(mut self) -> Self {
        self.conjunction = false;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Normalized copy of a conjunctive spec.
    ///
    /// Text is upper-cased, length hints are derived from graph conditions,
    /// range conditions on the same attribute are intersected and duplicates
    /// dropped. Returns `None` when the conditions cannot all hold.
    pub fn optimize(&self) -> Option<SearchSpec> {
        let mut conditions: Vec<SearchCondition> = Vec::with_capacity(self.conditions.len() + 1);
        let mut ranges: Vec<(RangeKind, ValueRange)> = Vec::new();

        let mut merge = |kind: RangeKind, range: ValueRange| -> bool {
            match ranges.iter_mut().find(|(k, _)| *k == kind) {
                Some((_, existing)) => match existing.intersect(&range) {
                    Some(merged) => {
                        *existing = merged;
                        true
                    }
                    None => false,
                },
                None => {
                    ranges.push((kind, range));
                    !range.is_empty()
                }
            }
        };

        for condition in &self.conditions {
            let condition = condition.clone().uppercased();

            if let Some((kind, range)) = range_of(&condition) {
                if !merge(kind, range) {
                    return None;
                }
                continue;
            }

            if let Some(hint) = condition.length_hint() {
                if !merge(RangeKind::Length, hint) {
                    return None;
                }
            }

            if !conditions.contains(&condition) {
                conditions.push(condition);
            }
        }

        conditions.extend(ranges.into_iter().map(|(kind, range)| with_range(kind, range)));

        Some(SearchSpec {
            conditions,
            conjunction: true,
        })
    }
}

impl fmt::Display for SearchCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let neg = if self.is_negated() { "-" } else { "" };
        match self {
            SearchCondition::PatternMatch { pattern, .. } => write!(f, "{}pattern:{}", neg, pattern),
            SearchCondition::AnagramMatch { letters, .. } => write!(f, "{}anagram:{}", neg, letters),
            SearchCondition::SubanagramMatch { letters, .. } => {
                write!(f, "{}subanagram:{}", neg, letters)
            }
            SearchCondition::ConsistOf {
                letters, min, max, ..
            } => write!(f, "{}consist:{}:{}-{}", neg, letters, min, max),
            SearchCondition::Length(r) => write!(f, "length:{}", r),
            SearchCondition::IncludeLetters { letters, .. } => {
                write!(f, "{}include:{}", neg, letters)
            }
            SearchCondition::Prefix { prefix, .. } => write!(f, "{}prefix:{}", neg, prefix),
            SearchCondition::Suffix { suffix, .. } => write!(f, "{}suffix:{}", neg, suffix),
            SearchCondition::NumVowels(r) => write!(f, "vowels:{}", r),
            SearchCondition::NumUniqueLetters(r) => write!(f, "unique:{}", r),
            SearchCondition::PointValue(r) => write!(f, "points:{}", r),
            SearchCondition::NumAnagrams(r) => write!(f, "anagrams:{}", r),
            SearchCondition::ProbabilityOrder { range, lax } => {
                write!(f, "{}:{}", if *lax { "problax" } else { "prob" }, range)
            }
            SearchCondition::BelongToGroup { set, .. } => write!(f, "{}set:{}", neg, set),
            SearchCondition::InWordList { words, .. } => {
                write!(f, "{}list:{}", neg, words.join(","))
            }
            SearchCondition::LimitByProbabilityOrder { range, lax, legacy } => {
                let name = match (lax, legacy) {
                    (_, true) => "limitlegacy",
                    (true, false) => "limitlax",
                    (false, false) => "limit",
                };
                write!(f, "{}:{}", name, range)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_range_intersect() {
        let a = ValueRange::new(2, 8);
        assert_eq!(a.intersect(&ValueRange::new(5, 10)), Some(ValueRange::new(5, 8)));
        assert_eq!(a.intersect(&ValueRange::new(9, 10)), None);
        assert!(ValueRange::exact(4).contains(4));
        assert!(!ValueRange::exact(4).contains(5));
    }

    #[test]
    fn test_search_set_names() {
        for set in SearchSet::ALL {
            assert_eq!(SearchSet::from_name(set.name()), Some(set));
        }
        assert_eq!(SearchSet::from_name("HOOK-WORDS"), Some(SearchSet::HookWords));
        assert_eq!(SearchSet::from_name("nonsense"), None);
    }

    #[test]
    fn test_optimize_uppercases_and_adds_length_hint() {
        let spec = SearchSpec::new().with(SearchCondition::pattern("c?t"));
        let optimized = spec.optimize().unwrap();
        assert_eq!(
            optimized.conditions,
            vec![SearchCondition::pattern("C?T"), SearchCondition::length(3, 3)]
        );
    }

    #[test]
    fn test_optimize_no_hint_for_star_pattern() {
        let spec = SearchSpec::new().with(SearchCondition::pattern("*AT*"));
        let optimized = spec.optimize().unwrap();
        assert_eq!(optimized.conditions, vec![SearchCondition::pattern("*AT*")]);
    }

    #[test]
    fn test_optimize_merges_ranges() {
        let spec = SearchSpec::new()
            .with(SearchCondition::length(2, 7))
            .with(SearchCondition::NumVowels(ValueRange::new(1, 3)))
            .with(SearchCondition::length(4, 10));
        let optimized = spec.optimize().unwrap();
        assert_eq!(
            optimized.conditions,
            vec![
                SearchCondition::length(4, 7),
                SearchCondition::NumVowels(ValueRange::new(1, 3)),
            ]
        );
    }

    #[test]
    fn test_optimize_detects_contradiction() {
        let spec = SearchSpec::new()
            .with(SearchCondition::anagram("TEA"))
            .with(SearchCondition::length(5, 5));
        assert!(spec.optimize().is_none());
    }

    #[test]
    fn test_optimize_dedups() {
        let spec = SearchSpec::new()
            .with(SearchCondition::in_set(SearchSet::HighFives))
            .with(SearchCondition::in_set(SearchSet::HighFives));
        assert_eq!(spec.optimize().unwrap().conditions.len(), 1);
    }

    #[test]
    fn test_negate_flips_flag() {
        let cond = SearchCondition::pattern("A*").negate();
        assert!(cond.is_negated());
        assert!(!cond.negate().is_negated());
        assert!(!SearchCondition::length(1, 2).negate().is_negated());
    }
}
