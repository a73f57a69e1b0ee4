//! Practice/puzzle engine (§4.8): a static snapshot the solver can run against outside of any
//! room, used both for the standalone practice mode and for replay analysis (§4.9), which
//! projects a historical moment back into a `Puzzle`.
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::dictionary::Dictionary;
use crate::engine::claims::{self, ClaimFailure, ClaimOption, ExistingWord};
use crate::ids::{PlayerId, WordId};
use crate::tiles::{Letter, Tile};

/// A frozen moment of center tiles plus whatever words are already claimed — enough to run the
/// word-formation engine against, independent of any live room.
#[derive(Debug, Clone)]
pub struct Puzzle {
    pub center_tiles: Vec<Tile>,
    pub existing_words: Vec<ExistingWord>,
}

/// Run the word-formation engine over a puzzle and return every legal option, best-scoring first.
pub fn solve(puzzle: &Puzzle, dictionary: &Dictionary) -> Vec<ClaimOption> {
    claims::enumerate(&puzzle.center_tiles, &puzzle.existing_words, dictionary)
}

/// Coarse categorization of a submission relative to the best available play, per §4.8's
/// fixed thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Perfect,
    Amazing,
    Great,
    Good,
    Ok,
    BetterLuckNextTime,
}

fn categorize(score: u32, best_score: u32) -> Outcome {
    let ratio = if best_score == 0 {
        0.0
    } else {
        score as f64 / best_score as f64
    };
    if ratio >= 1.0 && score > 0 {
        Outcome::Perfect
    } else if ratio >= 0.9 {
        Outcome::Amazing
    } else if ratio >= 0.75 {
        Outcome::Great
    } else if ratio >= 0.5 {
        Outcome::Good
    } else if ratio > 0.0 {
        Outcome::Ok
    } else {
        Outcome::BetterLuckNextTime
    }
}

/// The result of submitting one word against a puzzle.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub is_valid: bool,
    pub is_best_play: bool,
    pub score: u32,
    pub best_score: u32,
    /// Always `false` from this synchronous engine; the transport layer is responsible for the
    /// 5-7s submission timeout named in §5/§7.
    pub timed_out: bool,
    pub all_options: Vec<ClaimOption>,
    pub invalid_reason: Option<ClaimFailure>,
    pub outcome: Outcome,
}

/// Validate `submission` against `puzzle` and categorize it relative to the best available play.
pub fn evaluate(puzzle: &Puzzle, submission: &str, dictionary: &Dictionary) -> Evaluation {
    let all_options = solve(puzzle, dictionary);
    let best_score = all_options.first().map(|o| o.score).unwrap_or(0);

    let outcome_of = claims::validate_claim(
        &puzzle.center_tiles,
        &puzzle.existing_words,
        submission,
        dictionary,
    );

    let (is_valid, score, invalid_reason) = match outcome_of {
        Ok(option) => (true, option.score, None),
        Err(failure) => (false, 0, Some(failure)),
    };

    Evaluation {
        is_valid,
        is_best_play: is_valid && score == best_score,
        score,
        best_score,
        timed_out: false,
        outcome: categorize(score, best_score),
        all_options,
        invalid_reason,
    }
}

/// Generate a puzzle targeted at `difficulty` (1..=5). Guarantees the solver returns at least
/// one option by seeding the center from a known-good dictionary word, then pads the center
/// and existing-word set to bias toward more/longer decoys as difficulty rises (§9's open
/// question on the exact curve: monotone in expectation, not per-sample — see SPEC_FULL.md).
pub fn generate<R: Rng + ?Sized>(difficulty: u8, dictionary: &Dictionary, rng: &mut R) -> Option<Puzzle> {
    let difficulty = difficulty.clamp(1, 5);
    let mut words: Vec<&str> = dictionary.iter().collect();
    words.sort_unstable();
    if words.is_empty() {
        return None;
    }

    let seed_word = *words.choose(rng)?;
    let mut center_tiles: Vec<Tile> = seed_word
        .chars()
        .map(|c| Tile::new(Letter::from_char(c).expect("dictionary words are A-Z")))
        .collect();

    let padding = 2 + difficulty as usize;
    for _ in 0..padding {
        let letter = Letter::alphabet()
            .collect::<Vec<_>>()
            .choose(rng)
            .copied()
            .expect("alphabet is non-empty");
        center_tiles.push(Tile::new(letter));
    }
    center_tiles.shuffle(rng);

    let min_len = 4 + (difficulty as usize - 1) / 2;
    let decoy_count = difficulty as usize;
    let candidates: Vec<&&str> = words.iter().filter(|w| w.len() >= min_len).collect();
    let mut existing_words = Vec::new();
    for _ in 0..decoy_count {
        if candidates.is_empty() {
            break;
        }
        let text = (*candidates.choose(rng).expect("non-empty")).to_string();
        let tile_ids = text
            .chars()
            .map(|c| Tile::new(Letter::from_char(c).expect("dictionary words are A-Z")).id)
            .collect();
        existing_words.push(ExistingWord {
            word_id: WordId::new(),
            owner_id: PlayerId::new(),
            text,
            tile_ids,
        });
    }

    Some(Puzzle {
        center_tiles,
        existing_words,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn dict() -> Dictionary {
        Dictionary::from_words(["TEAM", "MATE", "MEAT", "TAME", "META", "RATE", "STARE"])
    }

    fn tiles(word: &str) -> Vec<Tile> {
        word.chars()
            .map(|c| Tile::new(Letter::from_char(c).unwrap()))
            .collect()
    }

    #[test]
    fn evaluate_best_play_matches_top_option() {
        let puzzle = Puzzle {
            center_tiles: tiles("TEAM"),
            existing_words: vec![],
        };
        let dictionary = dict();
        let eval = evaluate(&puzzle, "TEAM", &dictionary);
        assert!(eval.is_valid);
        assert!(eval.is_best_play);
        assert_eq!(eval.outcome, Outcome::Perfect);
    }

    #[test]
    fn evaluate_invalid_submission_is_better_luck_next_time() {
        let puzzle = Puzzle {
            center_tiles: tiles("TEAM"),
            existing_words: vec![],
        };
        let dictionary = dict();
        let eval = evaluate(&puzzle, "zzzz", &dictionary);
        assert!(!eval.is_valid);
        assert_eq!(eval.score, 0);
        assert_eq!(eval.outcome, Outcome::BetterLuckNextTime);
        assert_eq!(eval.invalid_reason, Some(ClaimFailure::NonLetters));
    }

    #[test]
    fn generate_always_yields_at_least_one_option() {
        let dictionary = Dictionary::builtin();
        let mut rng = StdRng::seed_from_u64(99);
        for difficulty in 1..=5u8 {
            let puzzle = generate(difficulty, &dictionary, &mut rng).expect("builtin dictionary is non-empty");
            let options = solve(&puzzle, &dictionary);
            assert!(!options.is_empty(), "difficulty {difficulty} produced an unsolvable puzzle");
        }
    }
}
