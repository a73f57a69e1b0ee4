//! The shared draw pile: a fixed Scrabble-like letter distribution, shuffled once per game.
use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::tiles::{Letter, Tile};

/// `(letter, count)` for the standard English Scrabble distribution, ~98 tiles total.
const DISTRIBUTION: &[(u8, u32)] = &[
    (b'A', 9),
    (b'B', 2),
    (b'C', 2),
    (b'D', 4),
    (b'E', 12),
    (b'F', 2),
    (b'G', 3),
    (b'H', 2),
    (b'I', 9),
    (b'J', 1),
    (b'K', 1),
    (b'L', 4),
    (b'M', 2),
    (b'N', 6),
    (b'O', 8),
    (b'P', 2),
    (b'Q', 1),
    (b'R', 6),
    (b'S', 4),
    (b'T', 6),
    (b'U', 4),
    (b'V', 2),
    (b'W', 2),
    (b'X', 1),
    (b'Y', 2),
    (b'Z', 1),
];

/// Keeps track of the tiles left to draw. Internally just a shuffled stack; `draw_one` pops
/// from the end so the vector's remaining prefix is always the letters still in the bag.
#[derive(Debug, Clone)]
pub struct LetterBag(Vec<Tile>);

impl LetterBag {
    /// Build a fresh bag from the fixed distribution and shuffle it with the given RNG.
    /// The RNG is caller-supplied so tests (and deterministic replays) can pin the draw order.
    pub fn new_shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut tiles = Vec::new();
        for &(letter, count) in DISTRIBUTION {
            let letter = Letter::from_byte(letter).expect("distribution uses valid letters");
            for _ in 0..count {
                tiles.push(Tile::new(letter));
            }
        }
        tiles.shuffle(rng);
        Self(tiles)
    }

    /// Draw the next tile, or `None` if the bag is empty.
    pub fn draw_one(&mut self) -> Option<Tile> {
        self.0.pop()
    }

    /// Number of tiles left in the bag.
    pub fn count(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Remaining count per letter, for the viewer projection's `bagLetterCounts`.
    pub fn letters_remaining(&self) -> HashMap<Letter, usize> {
        let mut counts = HashMap::new();
        for tile in &self.0 {
            *counts.entry(tile.letter).or_insert(0) += 1;
        }
        counts
    }

    /// Total tiles the distribution starts with. Used by conservation-of-tiles tests.
    pub fn initial_total() -> usize {
        DISTRIBUTION.iter().map(|&(_, n)| n as usize).sum()
    }
}
