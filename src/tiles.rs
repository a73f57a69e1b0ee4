//! Basic types for working with the shared letter tiles.
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies a single physical tile for its whole lifetime: bag, center, then some word's
/// `tileIds`. Ids are never reused even once a tile is "discarded" by a steal — the new word's
/// `tileIds` is a superset that still contains the old id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub Uuid);

impl TileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single uppercase A-Z letter. Never a blank: the center pool is drawn from a fixed
/// distribution of plain letters (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Letter(u8);

impl Letter {
    /// Build a `Letter` from an ASCII uppercase byte `b'A'..=b'Z'`.
    pub fn from_byte(b: u8) -> Option<Self> {
        if b.is_ascii_uppercase() {
            Some(Self(b))
        } else {
            None
        }
    }

    /// Build a `Letter` from a char, accepting either case.
    pub fn from_char(c: char) -> Option<Self> {
        c.to_ascii_uppercase()
            .try_into()
            .ok()
            .and_then(Self::from_byte)
    }

    pub fn as_char(self) -> char {
        self.0 as char
    }

    pub fn as_byte(self) -> u8 {
        self.0
    }

    /// Every letter A-Z, in order. Handy for building a full count-by-letter table.
    pub fn alphabet() -> impl Iterator<Item = Letter> {
        (b'A'..=b'Z').map(Letter)
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl TryFrom<char> for Letter {
    type Error = ();
    fn try_from(c: char) -> Result<Self, Self::Error> {
        Self::from_char(c).ok_or(())
    }
}

/// An immutable tile: an id paired with the letter it shows. Ownership moves between
/// bag/center/word collections; the tile itself never changes once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub letter: Letter,
}

impl Tile {
    pub fn new(letter: Letter) -> Self {
        Self {
            id: TileId::new(),
            letter,
        }
    }
}

/// Normalize a candidate word: uppercase, reject anything but A-Z.
/// Used everywhere a player-submitted string is turned into letters.
pub fn normalize_word(word: &str) -> Option<Vec<Letter>> {
    word.chars().map(Letter::from_char).collect()
}

/// A multiset of letters, backed by a fixed 26-slot count table. This is the currency the
/// word-formation engine trades in: centers, claimed words, and bag contents are all just
/// counts per letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LetterMultiset([u32; 26]);

impl LetterMultiset {
    pub fn new() -> Self {
        Self([0; 26])
    }

    fn index(letter: Letter) -> usize {
        (letter.as_byte() - b'A') as usize
    }

    pub fn insert(&mut self, letter: Letter) {
        self.0[Self::index(letter)] += 1;
    }

    pub fn count_of(&self, letter: Letter) -> u32 {
        self.0[Self::index(letter)]
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Whether every letter count in `self` is ≤ the matching count in `other`.
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(a, b)| a <= b)
    }

    /// Checked difference: `None` if `other` is not a subset of `self`.
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        if !other.is_subset_of(self) {
            return None;
        }
        let mut out = *self;
        for i in 0..26 {
            out.0[i] -= other.0[i];
        }
        Some(out)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Letter, u32)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|&(_, &n)| n > 0)
            .map(|(i, &n)| (Letter::from_byte(b'A' + i as u8).expect("in range"), n))
    }
}

impl FromIterator<Letter> for LetterMultiset {
    fn from_iter<I: IntoIterator<Item = Letter>>(iter: I) -> Self {
        let mut m = Self::new();
        for letter in iter {
            m.insert(letter);
        }
        m
    }
}

impl std::ops::Add for LetterMultiset {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        let mut out = self;
        for i in 0..26 {
            out.0[i] += rhs.0[i];
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_rejects_non_letters() {
        assert!(normalize_word("rate").is_some());
        assert!(normalize_word("RATE").is_some());
        assert!(normalize_word("rate!").is_none());
        assert!(normalize_word("ra te").is_none());
    }

    #[test]
    fn alphabet_has_26_letters() {
        assert_eq!(Letter::alphabet().count(), 26);
    }

    #[test]
    fn multiset_subset_and_difference() {
        let team: LetterMultiset = normalize_word("TEAM").unwrap().into_iter().collect();
        let mate: LetterMultiset = normalize_word("MATE").unwrap().into_iter().collect();
        assert_eq!(team, mate);
        assert!(team.is_subset_of(&mate));

        let rate: LetterMultiset = normalize_word("RATE").unwrap().into_iter().collect();
        let stare: LetterMultiset = normalize_word("STARE").unwrap().into_iter().collect();
        assert!(rate.is_subset_of(&stare));
        let remainder = stare.checked_sub(&rate).unwrap();
        assert_eq!(remainder.total(), 1);
        assert_eq!(remainder.count_of(Letter::from_char('S').unwrap()), 1);
    }
}
