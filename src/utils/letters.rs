//! Letter-level helpers shared by the word graph, the planner and the classifiers.

/// Default accepted alphabet
pub const DEFAULT_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Letters sorted into canonical (byte) order
pub fn alphagram(word: &str) -> String {
    let mut bytes: Vec<u8> = word.bytes().map(|b| b.to_ascii_uppercase()).collect();
    bytes.sort_unstable();
    // Input is ASCII by construction, so this never loses data
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Alphagrams of a list of strings, duplicates removed, in sorted order
pub fn alphagrams<S: AsRef<str>>(words: &[S]) -> Vec<String> {
    let mut result: Vec<String> = words.iter().map(|w| alphagram(w.as_ref())).collect();
    result.sort();
    result.dedup();
    result
}

#[inline]
pub fn is_vowel(letter: u8) -> bool {
    matches!(letter.to_ascii_uppercase(), b'A' | b'E' | b'I' | b'O' | b'U')
}

/// Number of vowels in a word
pub fn num_vowels(word: &str) -> u32 {
    word.bytes().filter(|&b| is_vowel(b)).count() as u32
}

/// Number of distinct letters in a word
pub fn num_unique_letters(word: &str) -> u32 {
    let mut seen = [false; 256];
    let mut count = 0;
    for b in word.bytes() {
        let b = b.to_ascii_uppercase() as usize;
        if !seen[b] {
            seen[b] = true;
            count += 1;
        }
    }
    count
}

/// Upper-case a raw token and check it against the accepted alphabet.
///
/// Returns `None` for empty tokens or tokens containing letters outside the alphabet.
pub fn normalize_word(token: &str, alphabet: &str) -> Option<String> {
    if token.is_empty() || !token.is_ascii() {
        return None;
    }
    let upper = token.to_ascii_uppercase();
    if upper.bytes().all(|b| alphabet.as_bytes().contains(&b)) {
        Some(upper)
    } else {
        None
    }
}

/// Letter counts indexed by `letter - b'A'`; non-letters are ignored
pub fn letter_counts(word: &str) -> [u8; 26] {
    let mut counts = [0u8; 26];
    for b in word.bytes() {
        let b = b.to_ascii_uppercase();
        if b.is_ascii_uppercase() {
            counts[(b - b'A') as usize] = counts[(b - b'A') as usize].saturating_add(1);
        }
    }
    counts
}

/// True if every letter of `part` (as a multiset) is contained in `whole`
pub fn is_sub_multiset(part: &str, whole: &str) -> bool {
    let have = letter_counts(whole);
    let need = letter_counts(part);
    need.iter().zip(have.iter()).all(|(n, h)| n <= h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphagram() {
        assert_eq!(alphagram("TEA"), "AET");
        assert_eq!(alphagram("eats"), "AEST");
        assert_eq!(alphagram(""), "");
    }

    #[test]
    fn test_alphagrams_dedup() {
        let result = alphagrams(&["EAT", "TEA", "CAT"]);
        assert_eq!(result, vec!["ACT".to_string(), "AET".to_string()]);
    }

    #[test]
    fn test_counts() {
        assert_eq!(num_vowels("QUEUE"), 4);
        assert_eq!(num_unique_letters("QUEUE"), 3);
        assert_eq!(num_vowels("RHYTHM"), 0);
    }

    #[test]
    fn test_normalize_word() {
        assert_eq!(normalize_word("cat", DEFAULT_ALPHABET), Some("CAT".to_string()));
        assert_eq!(normalize_word("ca-t", DEFAULT_ALPHABET), None);
        assert_eq!(normalize_word("", DEFAULT_ALPHABET), None);
        assert_eq!(normalize_word("QI", "QI"), Some("QI".to_string()));
    }

    #[test]
    fn test_sub_multiset() {
        assert!(is_sub_multiset("AET", "AEST"));
        assert!(!is_sub_multiset("AAT", "AEST"));
    }
}
