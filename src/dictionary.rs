//! A normalized set of claimable words. Loading a dictionary from a file or external service is
//! out of scope here (§1): the core just consumes a fixed, in-memory, normalized word set.
use std::collections::HashSet;

use crate::constants::MIN_WORD_LENGTH;

/// The built-in word list, one uppercase word per line.
const BUILTIN_WORDS: &str = include_str!("../data/words.txt");

/// A read-only, shared, in-memory dictionary of claimable words.
///
/// Construction normalizes every entry: uppercased, letters-only, at least
/// [`MIN_WORD_LENGTH`] long. Shorter or malformed lines in the source text are silently
/// dropped — the dictionary never panics on its own seed data.
#[derive(Debug, Clone)]
pub struct Dictionary {
    words: HashSet<String>,
}

impl Dictionary {
    /// Build the dictionary from the crate's embedded word list.
    pub fn builtin() -> Self {
        Self::from_words(BUILTIN_WORDS.lines())
    }

    /// Build a dictionary from an arbitrary iterator of words, normalizing each one.
    /// Exposed mainly for tests that want a small, controlled vocabulary (as in §8's
    /// literal scenarios).
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = HashSet::new();
        for raw in words {
            if let Some(word) = normalize(raw.as_ref()) {
                set.insert(word);
            }
        }
        Self { words: set }
    }

    /// Whether `word` (already expected uppercase A-Z) is in the dictionary.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// Same words as [`Dictionary::iter`], as a `rayon` parallel iterator — used by
    /// [`crate::engine::claims::enumerate`] to spread the scan over the whole vocabulary
    /// across threads.
    #[cfg(feature = "rayon")]
    pub fn par_iter(&self) -> impl rayon::prelude::ParallelIterator<Item = &str> {
        use rayon::prelude::*;
        self.words.par_iter().map(String::as_str)
    }
}

fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.len() < MIN_WORD_LENGTH || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(trimmed.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_contains_scenario_words() {
        let dict = Dictionary::builtin();
        for word in ["TEAM", "MATE", "MEAT", "TAME", "META", "STARE", "RATES", "MILES"] {
            assert!(dict.contains(word), "{word} missing from builtin dictionary");
        }
    }

    #[test]
    fn from_words_drops_short_and_non_letter_entries() {
        let dict = Dictionary::from_words(["cat", "team", "te4m", ""]);
        assert!(!dict.contains("CAT"));
        assert!(dict.contains("TEAM"));
        assert!(!dict.contains("TE4M"));
    }
}
