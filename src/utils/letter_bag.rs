//! Tile distribution and point values used for probability ordering,
//! point values and the type-three / high-five classifiers.

use crate::error::{LexiconError, Result};

/// Standard English tile distribution; `_` is the blank
pub const DEFAULT_DISTRIBUTION: &str = "A:9 B:2 C:2 D:4 E:12 F:2 G:3 H:2 I:9 J:1 K:1 L:4 M:2 N:6 \
     O:8 P:2 Q:1 R:6 S:4 T:6 U:4 V:2 W:2 X:1 Y:2 Z:1 _:2";

/// Standard English letter values
pub const DEFAULT_VALUES: &str = "A:1 B:3 C:3 D:2 E:1 F:4 G:2 H:4 I:1 J:8 K:5 L:1 M:3 N:1 \
     O:1 P:3 Q:10 R:1 S:1 T:1 U:1 V:4 W:4 X:8 Y:4 Z:10";

/// A bag of tiles with per-letter frequencies and values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterBag {
    frequencies: [u32; 26],
    values: [u32; 26],
    blanks: u32,
}

impl Default for LetterBag {
    fn default() -> Self {
        // The built-in tables are known to parse
        Self::new(DEFAULT_DISTRIBUTION, DEFAULT_VALUES).unwrap_or(Self {
            frequencies: [0; 26],
            values: [0; 26],
            blanks: 0,
        })
    }
}

impl LetterBag {
    /// Build a bag from `"A:9 B:2 … _:2"` style distribution and value strings
    pub fn new(distribution: &str, values: &str) -> Result<Self> {
        let mut bag = Self {
            frequencies: [0; 26],
            values: [0; 26],
            blanks: 0,
        };

        for (letter, count) in parse_letter_table(distribution)? {
            match letter {
                b'_' => bag.blanks = count,
                b'A'..=b'Z' => bag.frequencies[(letter - b'A') as usize] = count,
                _ => unreachable!("parse_letter_table only yields A-Z and _"),
            }
        }

        for (letter, value) in parse_letter_table(values)? {
            if letter.is_ascii_uppercase() {
                bag.values[(letter - b'A') as usize] = value;
            }
        }

        Ok(bag)
    }

    /// Number of blank tiles in the bag
    pub fn blanks(&self) -> u32 {
        self.blanks
    }

    /// Point value of a single letter (zero for unknown symbols)
    pub fn letter_value(&self, letter: u8) -> u32 {
        let letter = letter.to_ascii_uppercase();
        if letter.is_ascii_uppercase() {
            self.values[(letter - b'A') as usize]
        } else {
            0
        }
    }

    /// Sum of the letter values of a word
    pub fn point_value(&self, word: &str) -> u32 {
        word.bytes().map(|b| self.letter_value(b)).sum()
    }

    /// Number of distinct ways to draw the letters of `word` from the bag,
    /// counting draws where blanks stand in for letters.
    pub fn num_combinations(&self, word: &str) -> u64 {
        let counts = crate::utils::letter_counts(word);
        let letters: Vec<(u32, u32)> = counts
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .map(|(i, c)| (self.frequencies[i], *c as u32))
            .collect();
        let total_letters: u32 = letters.iter().map(|(_, c)| c).sum();

        let mut total = 0u64;
        for used_blanks in 0..=self.blanks.min(total_letters) {
            let ways = blank_replacements(&letters, used_blanks);
            total = total.saturating_add(ways.saturating_mul(n_choose_k(self.blanks, used_blanks)));
        }
        total
    }
}

/// Sum over every way of letting exactly `blanks` blanks replace letters,
/// of the product of the remaining per-letter draw counts.
fn blank_replacements(letters: &[(u32, u32)], blanks: u32) -> u64 {
    match letters.split_first() {
        None => u64::from(blanks == 0),
        Some((&(frequency, needed), rest)) => {
            let mut sum = 0u64;
            for replaced in 0..=blanks.min(needed) {
                let here = n_choose_k(frequency, needed - replaced);
                if here == 0 {
                    continue;
                }
                let tail = blank_replacements(rest, blanks - replaced);
                sum = sum.saturating_add(here.saturating_mul(tail));
            }
            sum
        }
    }
}

/// Binomial coefficient, zero when `k > n`
pub fn n_choose_k(n: u32, k: u32) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k) as u128;
    let n = n as u128;
    let mut result: u128 = 1;
    for i in 0..k {
        result = result * (n - i) / (i + 1);
    }
    u64::try_from(result).unwrap_or(u64::MAX)
}

fn parse_letter_table(table: &str) -> Result<Vec<(u8, u32)>> {
    table
        .split_whitespace()
        .map(|entry| {
            let (letter, count) = entry
                .split_once(':')
                .ok_or_else(|| LexiconError::Config(format!("bad letter entry '{}'", entry)))?;
            let letter = match letter.as_bytes() {
                [b] if b.is_ascii_alphabetic() || *b == b'_' => b.to_ascii_uppercase(),
                _ => return Err(LexiconError::Config(format!("bad letter '{}'", letter))),
            };
            let count = count
                .parse::<u32>()
                .map_err(|_| LexiconError::Config(format!("bad count in '{}'", entry)))?;
            Ok((letter, count))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_n_choose_k() {
        assert_eq!(n_choose_k(9, 2), 36);
        assert_eq!(n_choose_k(1, 2), 0);
        assert_eq!(n_choose_k(12, 0), 1);
    }

    #[test]
    fn test_point_value() {
        let bag = LetterBag::default();
        assert_eq!(bag.point_value("QUIZ"), 22);
        assert_eq!(bag.point_value("cat"), 5);
    }

    #[test]
    fn test_combinations_without_blanks() {
        let bag = LetterBag::new("A:9 T:6 _:0", DEFAULT_VALUES).unwrap();
        // C(9,1) * C(6,1)
        assert_eq!(bag.num_combinations("AT"), 54);
        // More A's than the bag holds
        let small = LetterBag::new("A:1 _:0", DEFAULT_VALUES).unwrap();
        assert_eq!(small.num_combinations("AA"), 0);
    }

    #[test]
    fn test_combinations_with_blanks() {
        let bag = LetterBag::new("A:1 _:1", DEFAULT_VALUES).unwrap();
        // "AA": no-blank draws impossible, one blank replaces one A: C(1,1) * C(1,1)
        assert_eq!(bag.num_combinations("AA"), 1);
        // "A": the A itself, or the blank
        assert_eq!(bag.num_combinations("A"), 2);
    }

    #[test]
    fn test_common_words_outrank_rare() {
        let bag = LetterBag::default();
        assert!(bag.num_combinations("AEINRST") > bag.num_combinations("MUZJIKS"));
        assert!(bag.num_combinations("HUNTERS") > 0);
    }

    #[test]
    fn test_bad_table() {
        assert!(LetterBag::new("A9", DEFAULT_VALUES).is_err());
        assert!(LetterBag::new("AB:9", DEFAULT_VALUES).is_err());
    }
}
