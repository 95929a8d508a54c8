//! Readers for word-list, stem-list and serialized graph files

use crate::error::{LexiconError, Result};
use memchr::memchr_iter;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// One line of a word list: the word and any trailing definition text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    pub word: String,
    pub definition: Option<String>,
}

/// Map a whole file into memory
fn map_file(path: &Path) -> Result<Option<Mmap>> {
    let file = File::open(path).map_err(|e| LexiconError::io(path, e))?;
    let len = file.metadata().map_err(|e| LexiconError::io(path, e))?.len();
    if len == 0 {
        return Ok(None);
    }
    let mmap = unsafe { Mmap::map(&file).map_err(|e| LexiconError::io(path, e))? };
    Ok(Some(mmap))
}

/// Raw bytes of a file
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    Ok(map_file(path)?.map(|mmap| mmap.to_vec()).unwrap_or_default())
}

/// Meaningful lines of a list file: whitespace collapsed, with blank and `#`
/// lines skipped
fn for_each_line(buf: &[u8], mut f: impl FnMut(&str)) {
    let mut start = 0;
    let ends = memchr_iter(b'\n', buf).chain(std::iter::once(buf.len()));
    for end in ends {
        if start >= buf.len() {
            break;
        }
        let line = String::from_utf8_lossy(&buf[start..end]);
        start = end + 1;

        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        f(line);
    }
}

/// Parse a word list: the first token of each line is the word, upper-cased;
/// the rest of the line, if any, is its definition
pub fn parse_word_list(buf: &[u8]) -> Vec<WordEntry> {
    let mut entries = Vec::new();
    for_each_line(buf, |line| {
        let mut parts = line.splitn(2, char::is_whitespace);
        let Some(word) = parts.next() else {
            return;
        };
        let definition = parts
            .next()
            .map(|rest| rest.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|rest| !rest.is_empty());
        entries.push(WordEntry {
            word: word.to_ascii_uppercase(),
            definition,
        });
    });
    entries
}

/// Parse a stem list: first token per line, as written
pub fn parse_stems(buf: &[u8]) -> Vec<String> {
    let mut stems = Vec::new();
    for_each_line(buf, |line| {
        if let Some(stem) = line.split_whitespace().next() {
            stems.push(stem.to_string());
        }
    });
    stems
}

pub fn read_word_list(path: &Path) -> Result<Vec<WordEntry>> {
    Ok(map_file(path)?
        .map(|mmap| parse_word_list(&mmap))
        .unwrap_or_default())
}

pub fn read_stems(path: &Path) -> Result<Vec<String>> {
    Ok(map_file(path)?.map(|mmap| parse_stems(&mmap)).unwrap_or_default())
}
