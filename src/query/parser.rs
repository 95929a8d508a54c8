//! Text form of a search specification
//!
//! ```text
//! pattern:C?T -set:hook-words length:3-5 | anagram:TEA limit:1-100
//! ```
//!
//! Terms are whitespace separated `field:value` pairs; a bare term is a
//! pattern. A leading `-` negates a term and any `|` switches the whole spec
//! to OR semantics. Ranges are `N`, `A-B` or `A-` (open ended).

use crate::error::{LexiconError, Result};
use crate::query::spec::{SearchCondition, SearchSet, SearchSpec, ValueRange};

/// Parse a search expression into a [`SearchSpec`]
pub fn parse_search(input: &str) -> Result<SearchSpec> {
    let mut parser = SearchParser::new(input);
    parser.parse()
}

struct SearchParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> SearchParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn parse(&mut self) -> Result<SearchSpec> {
        let mut spec = SearchSpec::new();

        loop {
            self.skip_whitespace();
            if self.is_eof() {
                break;
            }
            if self.consume_char('|') {
                spec.conjunction = false;
                continue;
            }
            spec.conditions.push(self.parse_term()?);
        }

        if spec.is_empty() {
            return Err(LexiconError::InvalidQuery("empty search".to_string()));
        }
        Ok(spec)
    }

    fn parse_term(&mut self) -> Result<SearchCondition> {
        let negated = self.consume_char('-');

        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() || ch == '|' {
                break;
            }
            self.advance();
        }
        let term = &self.input[start..self.pos];

        let condition = match term.split_once(':') {
            Some((field, value)) => parse_field(field, value)?,
            None if !term.is_empty() => SearchCondition::pattern(term),
            None => return Err(LexiconError::InvalidQuery("dangling '-'".to_string())),
        };

        if !negated {
            return Ok(condition);
        }
        let negatable = condition.clone().negate();
        if negatable.is_negated() {
            Ok(negatable)
        } else {
            Err(LexiconError::InvalidQuery(format!("'{}' cannot be negated", term)))
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn consume_char(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn advance(&mut self) {
        if let Some(ch) = self.peek_char() {
            self.pos += ch.len_utf8();
        }
    }
}

fn parse_field(field: &str, value: &str) -> Result<SearchCondition> {
    let text = || -> Result<String> {
        if value.is_empty() {
            Err(LexiconError::InvalidQuery(format!("{}: needs a value", field)))
        } else {
            Ok(value.to_ascii_uppercase())
        }
    };

    let condition = match field.to_lowercase().as_str() {
        "pattern" | "p" => SearchCondition::PatternMatch {
            pattern: text()?,
            negated: false,
        },
        "anagram" | "a" => SearchCondition::AnagramMatch {
            letters: text()?,
            negated: false,
        },
        "subanagram" | "sub" => SearchCondition::SubanagramMatch {
            letters: text()?,
            negated: false,
        },
        "consist" => {
            let (letters, window) = match value.split_once(':') {
                Some((letters, window)) => (letters, Some(parse_range(window)?)),
                None => (value, None),
            };
            if letters.is_empty() {
                return Err(LexiconError::InvalidQuery("consist: needs letters".to_string()));
            }
            let window = window.unwrap_or(ValueRange::new(1, letters.len() as u32));
            SearchCondition::ConsistOf {
                letters: letters.to_ascii_uppercase(),
                min: window.min,
                max: window.max,
                negated: false,
            }
        }
        "length" | "len" => SearchCondition::Length(parse_range(value)?),
        "include" => SearchCondition::IncludeLetters {
            letters: text()?,
            negated: false,
        },
        "prefix" => SearchCondition::Prefix {
            prefix: text()?,
            negated: false,
        },
        "suffix" => SearchCondition::Suffix {
            suffix: text()?,
            negated: false,
        },
        "vowels" => SearchCondition::NumVowels(parse_range(value)?),
        "unique" => SearchCondition::NumUniqueLetters(parse_range(value)?),
        "points" => SearchCondition::PointValue(parse_range(value)?),
        "anagrams" => SearchCondition::NumAnagrams(parse_range(value)?),
        "prob" => SearchCondition::ProbabilityOrder {
            range: parse_range(value)?,
            lax: false,
        },
        "problax" => SearchCondition::ProbabilityOrder {
            range: parse_range(value)?,
            lax: true,
        },
        "set" => {
            let set = SearchSet::from_name(value)
                .ok_or_else(|| LexiconError::InvalidQuery(format!("unknown set '{}'", value)))?;
            SearchCondition::in_set(set)
        }
        "list" => {
            let words: Vec<String> = value
                .split(',')
                .filter(|w| !w.is_empty())
                .map(|w| w.to_ascii_uppercase())
                .collect();
            SearchCondition::InWordList {
                words,
                negated: false,
            }
        }
        "limit" | "limitlax" | "limitlegacy" => SearchCondition::LimitByProbabilityOrder {
            range: parse_range(value)?,
            lax: field.eq_ignore_ascii_case("limitlax"),
            legacy: field.eq_ignore_ascii_case("limitlegacy"),
        },
        other => {
            return Err(LexiconError::InvalidQuery(format!("unknown field '{}'", other)));
        }
    };

    Ok(condition)
}

/// `N`, `A-B` or `A-`
fn parse_range(value: &str) -> Result<ValueRange> {
    let number = |s: &str| {
        s.parse::<u32>()
            .map_err(|_| LexiconError::InvalidQuery(format!("bad number '{}'", s)))
    };

    let range = match value.split_once('-') {
        Some((min, "")) => ValueRange::at_least(number(min)?),
        Some((min, max)) => ValueRange::new(number(min)?, number(max)?),
        None => ValueRange::exact(number(value)?),
    };
    if range.is_empty() {
        return Err(LexiconError::InvalidQuery(format!("empty range '{}'", value)));
    }
    Ok(range)
}
