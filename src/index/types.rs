use crate::query::{SearchCondition, SearchSet, ValueRange};
use crate::utils::letter_counts;
use serde::{Deserialize, Serialize};

/// Per-word attribute snapshot, one row of the `words` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordInfo {
    pub word: String,
    pub length: u32,
    pub probability_order: u32,
    pub min_probability_order: u32,
    pub max_probability_order: u32,
    pub num_vowels: u32,
    pub num_unique_letters: u32,
    pub num_anagrams: u32,
    pub point_value: u32,
    /// Lower-case letters, sorted
    pub front_hooks: String,
    /// Lower-case letters, sorted
    pub back_hooks: String,
    pub is_front_hook: bool,
    pub is_back_hook: bool,
    pub lexicon_symbols: String,
    pub definition: String,
}

impl WordInfo {
    /// A default-constructed record stands for "no attributes available"
    pub fn is_valid(&self) -> bool {
        !self.word.is_empty()
    }
}

/// Columns of the `words` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Word,
    Length,
    ProbabilityOrder,
    MinProbabilityOrder,
    MaxProbabilityOrder,
    NumVowels,
    NumUniqueLetters,
    PointValue,
    NumAnagrams,
    FrontHooks,
    BackHooks,
    IsFrontHook,
    IsBackHook,
    LexiconSymbols,
    Definition,
}

impl Column {
    pub fn name(&self) -> &'static str {
        match self {
            Column::Word => "word",
            Column::Length => "length",
            Column::ProbabilityOrder => "probability_order",
            Column::MinProbabilityOrder => "min_probability_order",
            Column::MaxProbabilityOrder => "max_probability_order",
            Column::NumVowels => "num_vowels",
            Column::NumUniqueLetters => "num_unique_letters",
            Column::PointValue => "point_value",
            Column::NumAnagrams => "num_anagrams",
            Column::FrontHooks => "front_hooks",
            Column::BackHooks => "back_hooks",
            Column::IsFrontHook => "is_front_hook",
            Column::IsBackHook => "is_back_hook",
            Column::LexiconSymbols => "lexicon_symbols",
            Column::Definition => "definition",
        }
    }
}

/// Backend-neutral row filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Inclusive numeric range; `u32::MAX` as max means unbounded
    Range { column: Column, range: ValueRange },
    /// SQL `LIKE` with `_` and `%` wildcards
    Like {
        column: Column,
        pattern: String,
        negated: bool,
    },
    Flag { column: Column, value: bool },
    InList {
        column: Column,
        values: Vec<String>,
        negated: bool,
    },
    /// At least one holds
    Any(Vec<Predicate>),
    Not(Box<Predicate>),
}

/// Conjunction of predicates against the `words` table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexQuery {
    pub predicates: Vec<Predicate>,
}

impl IndexQuery {
    /// Translate the index-answerable conditions; others are skipped
    pub fn from_conditions(conditions: &[SearchCondition]) -> Self {
        let mut predicates = Vec::new();

        for condition in conditions {
            match condition {
                SearchCondition::PatternMatch { pattern, negated } => {
                    predicates.push(Predicate::Like {
                        column: Column::Word,
                        pattern: like_pattern(pattern),
                        negated: *negated,
                    });
                }
                SearchCondition::Length(range) => predicates.push(range_on(Column::Length, *range)),
                SearchCondition::NumVowels(range) => {
                    predicates.push(range_on(Column::NumVowels, *range))
                }
                SearchCondition::NumUniqueLetters(range) => {
                    predicates.push(range_on(Column::NumUniqueLetters, *range))
                }
                SearchCondition::PointValue(range) => {
                    predicates.push(range_on(Column::PointValue, *range))
                }
                SearchCondition::NumAnagrams(range) => {
                    predicates.push(range_on(Column::NumAnagrams, *range))
                }
                SearchCondition::ProbabilityOrder { range, lax: true } => {
                    // Tie range overlaps the requested range
                    predicates.push(range_on(
                        Column::MaxProbabilityOrder,
                        ValueRange::at_least(range.min),
                    ));
                    predicates.push(range_on(
                        Column::MinProbabilityOrder,
                        ValueRange::new(0, range.max),
                    ));
                }
                SearchCondition::ProbabilityOrder { range, lax: false } => {
                    predicates.push(range_on(Column::ProbabilityOrder, *range))
                }
                SearchCondition::IncludeLetters { letters, negated } => {
                    include_letters(letters, *negated, &mut predicates);
                }
                SearchCondition::BelongToGroup { set, negated } => {
                    let predicate = match set {
                        SearchSet::FrontHooks => flag(Column::IsFrontHook),
                        SearchSet::BackHooks => flag(Column::IsBackHook),
                        SearchSet::HookWords => {
                            Predicate::Any(vec![flag(Column::IsFrontHook), flag(Column::IsBackHook)])
                        }
                        _ => continue,
                    };
                    predicates.push(if *negated {
                        Predicate::Not(Box::new(predicate))
                    } else {
                        predicate
                    });
                }
                SearchCondition::InWordList { words, negated } => {
                    predicates.push(Predicate::InList {
                        column: Column::Word,
                        values: words.iter().map(|w| w.to_ascii_uppercase()).collect(),
                        negated: *negated,
                    });
                }
                _ => {}
            }
        }

        Self { predicates }
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

fn range_on(column: Column, range: ValueRange) -> Predicate {
    Predicate::Range { column, range }
}

fn flag(column: Column) -> Predicate {
    Predicate::Flag {
        column,
        value: true,
    }
}

/// `?` and `.` become `_`, `*` becomes `%`. Literal `_`, `%` and `\` are
/// escaped with a backslash.
pub fn like_pattern(pattern: &str) -> String {
    let mut like = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            '?' | '.' => like.push('_'),
            '*' => like.push('%'),
            '_' | '%' | '\\' => {
                like.push('\\');
                like.push(c);
            }
            other => like.push(other.to_ascii_uppercase()),
        }
    }
    like
}

/// One `LIKE` per distinct letter: `%E%E%` requires two E's. Negated, the
/// word contains none of the letters.
fn include_letters(letters: &str, negated: bool, predicates: &mut Vec<Predicate>) {
    for (index, &count) in letter_counts(letters).iter().enumerate() {
        if count == 0 {
            continue;
        }
        let letter = (b'A' + index as u8) as char;
        let repeats = if negated { 1 } else { count as usize };
        let mut pattern = String::from("%");
        for _ in 0..repeats {
            pattern.push(letter);
            pattern.push('%');
        }
        predicates.push(Predicate::Like {
            column: Column::Word,
            pattern,
            negated,
        });
    }
}
