//! Pattern and rack matching over a [`Dawg`].
//!
//! Both matchers are driven letter by letter so they can run against graph
//! edges. Patterns keep a set of live token positions; racks keep the set of
//! distinct letter budgets that could have spelled the path so far. Every
//! graph path is visited at most once, so results never need deduplication.

use super::dawg::{Dawg, NodeId};

const MAX_PATTERN_TOKENS: usize = 127;
const MAX_RACK_CLASSES: usize = 32;

/// Set of upper-case letters as a bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LetterSet(u32);

impl LetterSet {
    pub const ALL: LetterSet = LetterSet((1 << 26) - 1);

    pub fn from_letters(letters: &[u8]) -> Self {
        LetterSet(letters.iter().fold(0, |mask, &l| match l {
            b'A'..=b'Z' => mask | 1 << (l - b'A'),
            _ => mask,
        }))
    }

    #[inline]
    pub fn contains(&self, letter: u8) -> bool {
        letter.is_ascii_uppercase() && self.0 & (1 << (letter - b'A')) != 0
    }

    pub fn complement(&self) -> Self {
        LetterSet(!self.0 & Self::ALL.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Letter(u8),
    Any,
    Star,
    Class(LetterSet),
}

impl Token {
    /// Whether this token can consume `letter`; `*` always can
    fn accepts(self, letter: u8) -> bool {
        match self {
            Token::Letter(l) => l == letter,
            Token::Any | Token::Star => true,
            Token::Class(set) => set.contains(letter),
        }
    }
}

/// Split a query string into tokens; `None` on malformed input
fn tokenize(text: &str) -> Option<Vec<Token>> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i].to_ascii_uppercase();
        match b {
            b'A'..=b'Z' => tokens.push(Token::Letter(b)),
            b'?' | b'.' => tokens.push(Token::Any),
            b'*' => tokens.push(Token::Star),
            b'[' => {
                let close = bytes[i + 1..].iter().position(|&c| c == b']')? + i + 1;
                let (negated, body) = match bytes[i + 1..close].split_first() {
                    Some((b'^', rest)) => (true, rest),
                    _ => (false, &bytes[i + 1..close]),
                };
                if body.is_empty() || !body.iter().all(|c| c.is_ascii_alphabetic()) {
                    return None;
                }
                let upper: Vec<u8> = body.iter().map(|c| c.to_ascii_uppercase()).collect();
                let set = LetterSet::from_letters(&upper);
                tokens.push(Token::Class(if negated { set.complement() } else { set }));
                i = close;
            }
            _ => return None,
        }
        i += 1;
    }

    Some(tokens)
}

/// Wildcard pattern: `?` one letter, `*` zero or more, `[ABC]`/`[^ABC]` classes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    tokens: Vec<Token>,
}

/// Live positions of a pattern's position automaton, bit `n` = accept
pub(crate) type PatternState = u128;

impl Pattern {
    /// Parse a pattern; `None` if it is empty, too long or malformed
    pub fn parse(text: &str) -> Option<Self> {
        let tokens = tokenize(text)?;
        if tokens.is_empty() || tokens.len() > MAX_PATTERN_TOKENS {
            return None;
        }
        Some(Self { tokens })
    }

    /// Word length matched, when the pattern has no `*`
    pub fn fixed_length(&self) -> Option<usize> {
        (!self.tokens.contains(&Token::Star)).then_some(self.tokens.len())
    }

    /// Fewest letters any match can have
    pub fn min_length(&self) -> usize {
        self.tokens.iter().filter(|t| **t != Token::Star).count()
    }

    /// Pattern read back to front
    pub fn reversed(&self) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.reverse();
        Self { tokens }
    }

    /// Number of leading literal letters
    pub fn literal_prefix_len(&self) -> usize {
        self.tokens
            .iter()
            .take_while(|t| matches!(t, Token::Letter(_)))
            .count()
    }

    /// Number of trailing literal letters
    pub fn literal_suffix_len(&self) -> usize {
        self.tokens
            .iter()
            .rev()
            .take_while(|t| matches!(t, Token::Letter(_)))
            .count()
    }

    pub fn matches(&self, word: &[u8]) -> bool {
        let state = word
            .iter()
            .try_fold(self.start(), |state, &letter| {
                let next = self.step(state, letter);
                (next != 0).then_some(next)
            });
        state.is_some_and(|s| self.accepts(s))
    }

    /// For each letter of a matching word, whether a literal letter of the
    /// pattern spelled it. `*` takes as few letters as it can. `None` if the
    /// word does not match.
    pub fn literal_letters(&self, word: &[u8]) -> Option<Vec<bool>> {
        let mut literal = vec![false; word.len()];
        let mut failed = vec![false; (self.tokens.len() + 1) * (word.len() + 1)];
        self.literal_path(word, 0, 0, &mut failed, &mut literal)
            .then_some(literal)
    }

    fn literal_path(
        &self,
        word: &[u8],
        token: usize,
        at: usize,
        failed: &mut [bool],
        literal: &mut [bool],
    ) -> bool {
        let Some(&current) = self.tokens.get(token) else {
            return at == word.len();
        };
        let key = token * (word.len() + 1) + at;
        if failed[key] {
            return false;
        }

        let found = match current {
            Token::Star => {
                self.literal_path(word, token + 1, at, failed, literal)
                    || (at < word.len() && {
                        literal[at] = false;
                        self.literal_path(word, token, at + 1, failed, literal)
                    })
            }
            _ => match word.get(at) {
                Some(&letter) if current.accepts(letter) => {
                    literal[at] = matches!(current, Token::Letter(_));
                    self.literal_path(word, token + 1, at + 1, failed, literal)
                }
                _ => false,
            },
        };

        if !found {
            failed[key] = true;
        }
        found
    }

    pub(crate) fn start(&self) -> PatternState {
        self.closure(1)
    }

    /// Follow `*` tokens, which may match nothing
    fn closure(&self, mut state: PatternState) -> PatternState {
        for (pos, token) in self.tokens.iter().enumerate() {
            if *token == Token::Star && state & (1 << pos) != 0 {
                state |= 1 << (pos + 1);
            }
        }
        state
    }

    pub(crate) fn step(&self, state: PatternState, letter: u8) -> PatternState {
        let mut next: PatternState = 0;
        for (pos, token) in self.tokens.iter().enumerate() {
            if state & (1 << pos) == 0 {
                continue;
            }
            match *token {
                Token::Letter(l) if l == letter => next |= 1 << (pos + 1),
                Token::Any => next |= 1 << (pos + 1),
                Token::Class(set) if set.contains(letter) => next |= 1 << (pos + 1),
                Token::Star => next |= 1 << pos,
                _ => {}
            }
        }
        self.closure(next)
    }

    #[inline]
    pub(crate) fn accepts(&self, state: PatternState) -> bool {
        state & (1 << self.tokens.len()) != 0
    }
}

/// How a rack must be used up by a matching word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RackMode {
    /// Every tile used exactly once
    Anagram,
    /// Any non-empty subset of tiles
    Subanagram,
    /// Any subset of tiles, word length within `[min, max]`
    ConsistOf { min: usize, max: usize },
}

/// Multiset of query tiles: letters, blanks (`?`), classes (`[..]`) and an
/// optional `*` allowing any number of extra letters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rack {
    counts: [u8; 26],
    blanks: u8,
    classes: Vec<LetterSet>,
    open: bool,
    len: usize,
}

/// Remaining tiles along one way of spelling the current path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RackState {
    counts: [u8; 26],
    blanks: u8,
    classes_left: u32,
}

impl Rack {
    pub fn parse(text: &str) -> Option<Self> {
        let tokens = tokenize(text)?;
        let mut rack = Rack {
            counts: [0; 26],
            blanks: 0,
            classes: Vec::new(),
            open: false,
            len: 0,
        };
        for token in tokens {
            match token {
                Token::Letter(l) => {
                    let slot = &mut rack.counts[(l - b'A') as usize];
                    *slot = slot.checked_add(1)?;
                    rack.len += 1;
                }
                Token::Any => {
                    rack.blanks = rack.blanks.checked_add(1)?;
                    rack.len += 1;
                }
                Token::Class(set) => {
                    rack.classes.push(set);
                    rack.len += 1;
                }
                Token::Star => rack.open = true,
            }
        }
        if rack.classes.len() > MAX_RACK_CLASSES || (rack.len == 0 && !rack.open) {
            return None;
        }
        Some(rack)
    }

    /// Number of tiles, not counting `*`
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True if the rack contains `*`
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Longest word the rack can spell in this mode, `None` if unbounded
    pub fn max_length(&self, mode: RackMode) -> Option<usize> {
        match mode {
            RackMode::ConsistOf { max, .. } if self.open => Some(max),
            RackMode::ConsistOf { max, .. } => Some(max.min(self.len)),
            _ if self.open => None,
            _ => Some(self.len),
        }
    }

    pub fn matches(&self, word: &[u8], mode: RackMode) -> bool {
        let mut states = vec![self.start()];
        for &letter in word {
            states = self.step(&states, letter);
            if states.is_empty() {
                return false;
            }
        }
        self.accepts(&states, word.len(), mode)
    }

    /// For each letter of a word, whether a letter tile spelled it. Letter
    /// tiles are spent first, left to right; the rest came from blanks,
    /// classes or `*`.
    pub fn literal_letters(&self, word: &[u8]) -> Vec<bool> {
        let mut left = self.counts;
        word.iter()
            .map(|&letter| {
                match left.get_mut(letter.wrapping_sub(b'A') as usize) {
                    Some(count) if *count > 0 => {
                        *count -= 1;
                        true
                    }
                    _ => false,
                }
            })
            .collect()
    }

    pub(crate) fn start(&self) -> RackState {
        RackState {
            counts: self.counts,
            blanks: self.blanks,
            classes_left: if self.classes.len() == 32 {
                u32::MAX
            } else {
                (1u32 << self.classes.len()) - 1
            },
        }
    }

    /// Advance every live state by one letter.
    ///
    /// A matching letter tile is always taken first, then a class, then a
    /// blank, and `*` only absorbs a letter nothing else can. Distinct classes
    /// containing the letter branch.
    pub(crate) fn step(&self, states: &[RackState], letter: u8) -> Vec<RackState> {
        let mut next: Vec<RackState> = Vec::with_capacity(states.len());
        let index = (letter - b'A') as usize;

        let add = |state: RackState, next: &mut Vec<RackState>| {
            if !next.contains(&state) {
                next.push(state);
            }
        };

        for state in states {
            if state.counts[index] > 0 {
                let mut taken = *state;
                taken.counts[index] -= 1;
                add(taken, &mut next);
                continue;
            }

            let mut used_class = false;
            for (i, set) in self.classes.iter().enumerate() {
                let bit = 1u32 << i;
                if state.classes_left & bit == 0 || !set.contains(letter) {
                    continue;
                }
                // Identical remaining classes are interchangeable
                let duplicate = self.classes[..i]
                    .iter()
                    .enumerate()
                    .any(|(j, other)| state.classes_left & (1 << j) != 0 && other == set);
                if duplicate {
                    continue;
                }
                let mut taken = *state;
                taken.classes_left &= !bit;
                add(taken, &mut next);
                used_class = true;
            }
            if used_class {
                continue;
            }

            if state.blanks > 0 {
                let mut taken = *state;
                taken.blanks -= 1;
                add(taken, &mut next);
            } else if self.open {
                add(*state, &mut next);
            }
        }

        next
    }

    pub(crate) fn accepts(&self, states: &[RackState], length: usize, mode: RackMode) -> bool {
        if length == 0 || states.is_empty() {
            return false;
        }
        match mode {
            RackMode::Anagram => states
                .iter()
                .any(|s| s.blanks == 0 && s.classes_left == 0 && s.counts.iter().all(|&c| c == 0)),
            RackMode::Subanagram => true,
            RackMode::ConsistOf { min, max } => min <= length && length <= max,
        }
    }
}

/// Graph-phase constraints gathered from a search spec
#[derive(Debug, Clone, Default)]
pub struct GraphQuery {
    pub patterns: Vec<Pattern>,
    pub excluded_patterns: Vec<Pattern>,
    pub racks: Vec<(Rack, RackMode)>,
    pub excluded_racks: Vec<(Rack, RackMode)>,
    pub min_length: usize,
    pub max_length: Option<usize>,
}

impl GraphQuery {
    /// Longest word worth exploring
    fn depth_limit(&self) -> usize {
        let mut limit = self.max_length.unwrap_or(usize::MAX);
        for pattern in &self.patterns {
            if let Some(len) = pattern.fixed_length() {
                limit = limit.min(len);
            }
        }
        for (rack, mode) in &self.racks {
            if let Some(len) = rack.max_length(*mode) {
                limit = limit.min(len);
            }
        }
        limit
    }

    fn min_depth(&self) -> usize {
        let patterns = self.patterns.iter().map(|p| p.min_length()).max().unwrap_or(0);
        self.min_length.max(patterns).max(1)
    }

    /// Check the negated conditions against a complete word
    fn passes_exclusions(&self, word: &[u8]) -> bool {
        !self.excluded_patterns.iter().any(|p| p.matches(word))
            && !self
                .excluded_racks
                .iter()
                .any(|(rack, mode)| rack.matches(word, *mode))
    }

    /// Pattern set reversed for a back-to-front graph
    pub fn reversed(&self) -> GraphQuery {
        GraphQuery {
            patterns: self.patterns.iter().map(Pattern::reversed).collect(),
            ..self.clone()
        }
    }

    /// `word` with every letter filled in by a wildcard, blank or class in
    /// lower case. A letter stays upper case only if every pattern and rack
    /// spelled it with a literal letter.
    pub fn mark_wildcards(&self, word: &str) -> String {
        let bytes = word.as_bytes();
        let mut literal = vec![true; bytes.len()];
        for pattern in &self.patterns {
            if let Some(marks) = pattern.literal_letters(bytes) {
                literal.iter_mut().zip(marks).for_each(|(l, m)| *l &= m);
            }
        }
        for (rack, _) in &self.racks {
            let marks = rack.literal_letters(bytes);
            literal.iter_mut().zip(marks).for_each(|(l, m)| *l &= m);
        }
        bytes
            .iter()
            .zip(literal)
            .map(|(&b, l)| if l { b as char } else { b.to_ascii_lowercase() as char })
            .collect()
    }

    /// True if suffix-anchored: searching back to front prunes earlier
    pub fn prefers_reverse(&self) -> bool {
        let prefix: usize = self.patterns.iter().map(|p| p.literal_prefix_len()).max().unwrap_or(0);
        let suffix: usize = self.patterns.iter().map(|p| p.literal_suffix_len()).max().unwrap_or(0);
        self.racks.is_empty() && prefix == 0 && suffix > 0
    }
}

/// Depth-first traversal carrying matcher state along each edge
pub(crate) struct Walker<'a> {
    dawg: &'a Dawg,
    query: &'a GraphQuery,
    reverse: bool,
    min_depth: usize,
    max_depth: usize,
    path: Vec<u8>,
    results: Vec<String>,
}

impl<'a> Walker<'a> {
    /// `reverse` means the graph spells words back to front; the query must
    /// already be reversed to match.
    pub(crate) fn new(dawg: &'a Dawg, query: &'a GraphQuery, reverse: bool) -> Self {
        Self {
            dawg,
            query,
            reverse,
            min_depth: query.min_depth(),
            max_depth: query.depth_limit(),
            path: Vec::new(),
            results: Vec::new(),
        }
    }

    pub(crate) fn run(mut self) -> Vec<String> {
        if self.min_depth > self.max_depth {
            return Vec::new();
        }
        let patterns: Vec<PatternState> = self.query.patterns.iter().map(|p| p.start()).collect();
        let racks: Vec<Vec<RackState>> = self
            .query
            .racks
            .iter()
            .map(|(rack, _)| vec![rack.start()])
            .collect();
        self.visit(self.dawg.root(), &patterns, &racks);
        self.results
    }

    fn visit(&mut self, node: NodeId, patterns: &[PatternState], racks: &[Vec<RackState>]) {
        let depth = self.path.len();

        if depth >= self.min_depth && self.dawg.is_terminal(node) && self.accepts(patterns, racks) {
            self.emit();
        }

        if depth >= self.max_depth {
            return;
        }

        'edges: for edge in self.dawg.edges(node) {
            let mut next_patterns = Vec::with_capacity(patterns.len());
            for (pattern, &state) in self.query.patterns.iter().zip(patterns) {
                let next = pattern.step(state, edge.letter);
                if next == 0 {
                    continue 'edges;
                }
                next_patterns.push(next);
            }

            let mut next_racks = Vec::with_capacity(racks.len());
            for ((rack, _), states) in self.query.racks.iter().zip(racks) {
                let next = rack.step(states, edge.letter);
                if next.is_empty() {
                    continue 'edges;
                }
                next_racks.push(next);
            }

            self.path.push(edge.letter);
            self.visit(edge.target, &next_patterns, &next_racks);
            self.path.pop();
        }
    }

    fn accepts(&self, patterns: &[PatternState], racks: &[Vec<RackState>]) -> bool {
        let depth = self.path.len();
        self.query
            .patterns
            .iter()
            .zip(patterns)
            .all(|(p, &s)| p.accepts(s))
            && self
                .query
                .racks
                .iter()
                .zip(racks)
                .all(|((rack, mode), states)| rack.accepts(states, depth, *mode))
    }

    fn emit(&mut self) {
        let mut word = self.path.clone();
        if self.reverse {
            word.reverse();
        }
        if self.query.passes_exclusions(&word) {
            self.results.push(String::from_utf8_lossy(&word).into_owned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_wildcards() {
        let p = Pattern::parse("C?T").unwrap();
        assert!(p.matches(b"CAT"));
        assert!(!p.matches(b"CATS"));
        assert!(!p.matches(b"CT"));

        let star = Pattern::parse("*AT*").unwrap();
        assert!(star.matches(b"AT"));
        assert!(star.matches(b"CATS"));
        assert!(!star.matches(b"COT"));
    }

    #[test]
    fn test_pattern_classes() {
        let p = Pattern::parse("[CB]A[^R]").unwrap();
        assert!(p.matches(b"CAT"));
        assert!(p.matches(b"BAT"));
        assert!(!p.matches(b"BAR"));
        assert!(!p.matches(b"HAT"));
    }

    #[test]
    fn test_pattern_malformed() {
        assert!(Pattern::parse("").is_none());
        assert!(Pattern::parse("A[BC").is_none());
        assert!(Pattern::parse("A1").is_none());
        assert!(Pattern::parse("[]").is_none());
    }

    #[test]
    fn test_pattern_lengths() {
        assert_eq!(Pattern::parse("C?T").unwrap().fixed_length(), Some(3));
        assert_eq!(Pattern::parse("[AB]?").unwrap().fixed_length(), Some(2));
        assert_eq!(Pattern::parse("*ING").unwrap().fixed_length(), None);
        assert_eq!(Pattern::parse("*ING").unwrap().min_length(), 3);
        assert_eq!(Pattern::parse("*ING").unwrap().literal_suffix_len(), 3);
    }

    #[test]
    fn test_reversed_pattern() {
        let p = Pattern::parse("*ING").unwrap().reversed();
        assert!(p.matches(b"GNIOD"));
    }

    #[test]
    fn test_pattern_literal_letters() {
        let p = Pattern::parse("C?T").unwrap();
        assert_eq!(p.literal_letters(b"CAT"), Some(vec![true, false, true]));
        assert_eq!(p.literal_letters(b"DOG"), None);

        // `*` gives up letters to the literal tail
        let star = Pattern::parse("*AT").unwrap();
        assert_eq!(
            star.literal_letters(b"ATAT"),
            Some(vec![false, false, true, true])
        );

        let class = Pattern::parse("[CB]AT").unwrap();
        assert_eq!(class.literal_letters(b"BAT"), Some(vec![false, true, true]));
    }

    #[test]
    fn test_rack_literal_letters() {
        let rack = Rack::parse("T?A").unwrap();
        assert_eq!(rack.literal_letters(b"OAT"), vec![false, true, true]);
        let rack = Rack::parse("A?").unwrap();
        assert_eq!(rack.literal_letters(b"AA"), vec![true, false]);
    }

    #[test]
    fn test_mark_wildcards() {
        let query = GraphQuery {
            patterns: vec![Pattern::parse("C?T*").unwrap()],
            ..Default::default()
        };
        assert_eq!(query.mark_wildcards("CATS"), "CaTs");

        let query = GraphQuery {
            racks: vec![(Rack::parse("AT?").unwrap(), RackMode::Anagram)],
            ..Default::default()
        };
        assert_eq!(query.mark_wildcards("EAT"), "eAT");

        assert_eq!(GraphQuery::default().mark_wildcards("EAT"), "EAT");
    }

    #[test]
    fn test_rack_anagram() {
        let rack = Rack::parse("TEA").unwrap();
        assert!(rack.matches(b"EAT", RackMode::Anagram));
        assert!(!rack.matches(b"EATS", RackMode::Anagram));
        assert!(!rack.matches(b"AT", RackMode::Anagram));
        assert!(rack.matches(b"AT", RackMode::Subanagram));
    }

    #[test]
    fn test_rack_blanks_and_classes() {
        let rack = Rack::parse("T?A").unwrap();
        assert!(rack.matches(b"OAT", RackMode::Anagram));
        assert!(!rack.matches(b"OAK", RackMode::Anagram));

        let classes = Rack::parse("[AE][AE]T").unwrap();
        assert!(classes.matches(b"EAT", RackMode::Anagram));
        assert!(!classes.matches(b"OAT", RackMode::Anagram));
    }

    #[test]
    fn test_rack_open() {
        let rack = Rack::parse("QU*").unwrap();
        assert!(rack.is_open());
        assert!(rack.matches(b"QUIT", RackMode::Anagram));
        assert!(!rack.matches(b"QIT", RackMode::Anagram));
        assert_eq!(rack.max_length(RackMode::Anagram), None);
    }

    #[test]
    fn test_rack_consist_of_window() {
        let rack = Rack::parse("AEST").unwrap();
        let mode = RackMode::ConsistOf { min: 3, max: 3 };
        assert!(rack.matches(b"EAT", mode));
        assert!(!rack.matches(b"AT", mode));
        assert!(!rack.matches(b"EATS", mode));
    }

    fn graph(words: &[&str]) -> Dawg {
        let mut dawg = Dawg::new();
        for w in words {
            dawg.insert(w.as_bytes());
        }
        dawg.minimize();
        dawg
    }

    #[test]
    fn test_walker_pattern() {
        let dawg = graph(&["CAT", "COT", "CUT", "CATS"]);
        let query = GraphQuery {
            patterns: vec![Pattern::parse("C?T").unwrap()],
            ..Default::default()
        };
        assert_eq!(Walker::new(&dawg, &query, false).run(), vec!["CAT", "COT", "CUT"]);
    }

    #[test]
    fn test_walker_anagram_with_exclusion() {
        let dawg = graph(&["EAT", "ATE", "TEA", "EATS"]);
        let query = GraphQuery {
            racks: vec![(Rack::parse("TEA").unwrap(), RackMode::Anagram)],
            excluded_patterns: vec![Pattern::parse("T*").unwrap()],
            ..Default::default()
        };
        assert_eq!(Walker::new(&dawg, &query, false).run(), vec!["ATE", "EAT"]);
    }

    #[test]
    fn test_walker_length_bounds() {
        let dawg = graph(&["A", "AB", "ABC", "ABCD"]);
        let query = GraphQuery {
            min_length: 2,
            max_length: Some(3),
            ..Default::default()
        };
        assert_eq!(Walker::new(&dawg, &query, false).run(), vec!["AB", "ABC"]);
    }
}
