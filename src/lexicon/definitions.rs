use regex::{Captures, Regex};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static POS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\w+)").expect("part-of-speech pattern is valid"));

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)(?:=(\w+))?\}").expect("link pattern is valid"));

/// Separator between senses in stored definition text
pub const SENSE_SEPARATOR: &str = " / ";

/// Word definitions, each word holding its senses keyed by part of speech.
///
/// A sense may link to another word with `{WORD=pos}`; links are left as-is
/// unless a caller asks for them to be resolved.
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    entries: FxHashMap<String, BTreeMap<String, Vec<String>>>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the senses of `definition` for `word`, replacing earlier ones
    pub fn add(&mut self, word: &str, definition: &str) {
        let definition = definition.trim();
        if word.is_empty() || definition.is_empty() {
            return;
        }

        let mut by_pos: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for sense in definition.split(SENSE_SEPARATOR) {
            let pos = POS_RE
                .captures(sense)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            by_pos.entry(pos).or_default().push(sense.to_string());
        }
        self.entries.insert(word.to_ascii_uppercase(), by_pos);
    }

    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(&word.to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every sense of a word, grouped by part of speech
    pub fn senses(&self, word: &str) -> Vec<&str> {
        self.entries
            .get(&word.to_ascii_uppercase())
            .map(|by_pos| by_pos.values().flatten().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Senses tagged with one part of speech
    pub fn senses_for(&self, word: &str, pos: &str) -> Vec<&str> {
        self.entries
            .get(&word.to_ascii_uppercase())
            .and_then(|by_pos| {
                by_pos
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(pos))
                    .map(|(_, senses)| senses.iter().map(String::as_str).collect())
            })
            .unwrap_or_default()
    }

    /// Stored text: senses joined by ` / `
    pub fn text(&self, word: &str) -> Option<String> {
        let senses = self.senses(word);
        (!senses.is_empty()).then(|| senses.join(SENSE_SEPARATOR))
    }

    /// Definition for display, one sense per line with links resolved, or the
    /// stored text when `replace_links` is false
    pub fn render(&self, word: &str, replace_links: bool) -> Option<String> {
        let text = self.text(word)?;
        Some(if replace_links {
            self.resolve_links(&text)
        } else {
            text
        })
    }

    /// Put each sense of `text` on its own line and replace `{WORD=pos}` links
    /// with `WORD, <definition>`.
    ///
    /// Links are followed one level deep; links inside a linked definition are
    /// reduced to the bare word.
    pub fn resolve_links(&self, text: &str) -> String {
        let resolved = LINK_RE.replace_all(text, |caps: &Captures| {
            let linked = &caps[1];
            let sense = match caps.get(2) {
                Some(pos) => self.senses_for(linked, pos.as_str()).first().copied(),
                None => None,
            }
            .or_else(|| self.senses(linked).first().copied());

            match sense {
                Some(sense) => format!("{}, {}", linked.to_ascii_uppercase(), strip_links(sense)),
                None => linked.to_ascii_uppercase(),
            }
        });
        resolved.split(SENSE_SEPARATOR).collect::<Vec<_>>().join("\n")
    }
}

/// `{WORD=pos}` becomes `WORD`
fn strip_links(text: &str) -> String {
    LINK_RE
        .replace_all(text, |caps: &Captures| caps[1].to_ascii_uppercase())
        .into_owned()
}
