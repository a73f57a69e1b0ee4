//! The word-formation engine (§4.1): given the shared center pool and the words already on the
//! table, enumerate every legal claim and validate one specific submission. This is the
//! algorithm every other component in the crate — the room state machine, pre-steal
//! arbitration, the practice engine, and the replay analyzer — ultimately calls into.
use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::constants::MIN_WORD_LENGTH;
use crate::dictionary::Dictionary;
use crate::family;
use crate::ids::{PlayerId, WordId};
use crate::tiles::{normalize_word, LetterMultiset, Tile, TileId};

/// A word already owned by some player, as the engine needs to see it: just its letters and
/// the exact tiles it is made of.
#[derive(Debug, Clone)]
pub struct ExistingWord {
    pub word_id: WordId,
    pub owner_id: PlayerId,
    pub text: String,
    pub tile_ids: Vec<TileId>,
}

/// Where a claim option's letters come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimSource {
    /// Formed entirely from center tiles.
    Center,
    /// Consumes an existing word plus at least one center tile.
    Steal { victim_word_id: WordId, victim_owner_id: PlayerId },
}

/// One legal claim the engine found, scored and ready to apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimOption {
    pub word: String,
    pub source: ClaimSource,
    /// Tiles consumed from center for this claim (always disjoint from any victim's tiles).
    pub new_center_tile_ids: Vec<TileId>,
    /// Every tile the resulting word will own: victim tiles (if a steal) plus `new_center_tile_ids`.
    pub resulting_tile_ids: Vec<TileId>,
    pub score: u32,
}

/// Why a submitted word was rejected. Matches the kinds named in §4.1/§7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimFailure {
    EmptyWord,
    NonLetters,
    NotInDictionary,
    InsufficientLetters,
    IllegalSteal,
    SameFamily,
}

impl ClaimFailure {
    /// The exact client-facing string from §7's enumerated claim failures. `IllegalSteal` and
    /// `SameFamily` are not separately worded there — both are just an invalid play from the
    /// claimant's point of view, so both fold into the generic "not valid" message.
    pub fn message(self) -> &'static str {
        match self {
            ClaimFailure::EmptyWord => "Enter a word to claim.",
            ClaimFailure::NonLetters => "Word must contain only letters A-Z.",
            ClaimFailure::NotInDictionary | ClaimFailure::IllegalSteal | ClaimFailure::SameFamily => {
                "Word is not valid."
            }
            ClaimFailure::InsufficientLetters => "Not enough tiles in the center to make that word.",
        }
    }
}

fn word_multiset(word: &str) -> LetterMultiset {
    normalize_word(word)
        .expect("callers only pass already-normalized dictionary words")
        .into_iter()
        .collect()
}

/// Deterministically choose which center tiles satisfy `needed`: group center tiles by letter
/// in their existing (creation/append) order, then take the earliest `needed` of each letter.
/// Ties within a letter (shouldn't occur since ids are unique) fall back to id order.
fn choose_center_tiles(center: &[Tile], needed: &LetterMultiset) -> Option<Vec<TileId>> {
    // Tiles are grouped in the order they appear in `center`, which is itself creation order
    // (tiles are appended on reveal) — so taking the first N of a letter's group already
    // implements the earliest-created tie-break; id order only matters for ties the grouping
    // can't otherwise distinguish, which `HashMap`'s insertion-stable push preserves.
    let by_letter: HashMap<_, Vec<TileId>> = center.iter().map(|tile| (tile.letter, tile.id)).into_group_map();

    let mut chosen = Vec::new();
    for (letter, count) in needed.iter() {
        let available = by_letter.get(&letter)?;
        if (available.len() as u32) < count {
            return None;
        }
        chosen.extend(available.iter().take(count as usize).copied());
    }
    Some(chosen)
}

/// Whether `word` can be produced by inserting `added` letters into `victim` while leaving
/// `victim`'s own letters in their original relative order (i.e. `victim` is a subsequence of
/// `word`). Such a claim is a substring/prefix *extension*, not a rearrangement, and is
/// disallowed as a steal per §4.1 step 5.
fn is_order_preserving_extension(word: &str, victim: &str) -> bool {
    let word: Vec<char> = word.chars().collect();
    let victim: Vec<char> = victim.chars().collect();
    let mut vi = 0;
    for &c in &word {
        if vi < victim.len() && c == victim[vi] {
            vi += 1;
        }
    }
    vi == victim.len()
}

fn try_steal(
    word: &str,
    word_ms: LetterMultiset,
    center_ms: LetterMultiset,
    center: &[Tile],
    victim: &ExistingWord,
) -> Result<ClaimOption, ClaimFailure> {
    if word == victim.text {
        return Err(ClaimFailure::InsufficientLetters);
    }
    let victim_ms = word_multiset(&victim.text);
    let remainder = word_ms
        .checked_sub(&victim_ms)
        .ok_or(ClaimFailure::InsufficientLetters)?;
    if remainder.is_empty() || !remainder.is_subset_of(&center_ms) {
        return Err(ClaimFailure::InsufficientLetters);
    }
    if family::overlap(word, &victim.text) {
        return Err(ClaimFailure::SameFamily);
    }
    if is_order_preserving_extension(word, &victim.text) {
        return Err(ClaimFailure::IllegalSteal);
    }
    let new_tiles = choose_center_tiles(center, &remainder).ok_or(ClaimFailure::InsufficientLetters)?;
    let mut resulting = victim.tile_ids.clone();
    resulting.extend(new_tiles.iter().copied());
    Ok(ClaimOption {
        word: word.to_string(),
        source: ClaimSource::Steal {
            victim_word_id: victim.word_id,
            victim_owner_id: victim.owner_id,
        },
        new_center_tile_ids: new_tiles,
        resulting_tile_ids: resulting,
        score: word.len() as u32 + victim.text.len() as u32,
    })
}

/// Validate one player-submitted word against the current center and existing words.
/// Tries a center-formed claim first, then a steal against each existing word in order; the
/// first existing word that yields a legal steal wins. If nothing succeeds, the most
/// specific failure kind encountered is returned (insufficient-letters is the least specific
/// and is only returned when nothing closer to succeeding was found).
pub fn validate_claim(
    center: &[Tile],
    existing: &[ExistingWord],
    submitted: &str,
    dictionary: &Dictionary,
) -> Result<ClaimOption, ClaimFailure> {
    if submitted.trim().is_empty() {
        return Err(ClaimFailure::EmptyWord);
    }
    let letters = normalize_word(submitted).ok_or(ClaimFailure::NonLetters)?;
    if letters.len() < MIN_WORD_LENGTH {
        return Err(ClaimFailure::NotInDictionary);
    }
    let word: String = letters.iter().map(|l| l.as_char()).collect();
    if !dictionary.contains(&word) {
        return Err(ClaimFailure::NotInDictionary);
    }

    let word_ms: LetterMultiset = letters.into_iter().collect();
    let center_ms: LetterMultiset = center.iter().map(|t| t.letter).collect();

    if word_ms.is_subset_of(&center_ms) {
        let tile_ids = choose_center_tiles(center, &word_ms)
            .expect("word_ms is a subset of center_ms by construction");
        return Ok(ClaimOption {
            word: word.clone(),
            source: ClaimSource::Center,
            new_center_tile_ids: tile_ids.clone(),
            resulting_tile_ids: tile_ids,
            score: word.len() as u32,
        });
    }

    let mut best_failure = ClaimFailure::InsufficientLetters;
    for victim in existing {
        match try_steal(&word, word_ms, center_ms, center, victim) {
            Ok(option) => return Ok(option),
            Err(ClaimFailure::InsufficientLetters) => {}
            Err(other) => best_failure = other,
        }
    }
    Err(best_failure)
}

/// Enumerate every legal claim available right now: every dictionary word formable purely
/// from the center, plus every legal steal against an existing word. Repeated targets (the
/// same resulting word reachable more than one way) keep only the best-scoring row.
pub fn enumerate(center: &[Tile], existing: &[ExistingWord], dictionary: &Dictionary) -> Vec<ClaimOption> {
    let center_ms: LetterMultiset = center.iter().map(|t| t.letter).collect();

    let options_for = |word: &str| -> Vec<ClaimOption> {
        if word.len() < MIN_WORD_LENGTH {
            return Vec::new();
        }
        let word_ms = word_multiset(word);
        let mut found = Vec::new();

        if word_ms.is_subset_of(&center_ms) {
            if let Some(tile_ids) = choose_center_tiles(center, &word_ms) {
                found.push(ClaimOption {
                    word: word.to_string(),
                    source: ClaimSource::Center,
                    new_center_tile_ids: tile_ids.clone(),
                    resulting_tile_ids: tile_ids,
                    score: word.len() as u32,
                });
            }
        }

        for victim in existing {
            if let Ok(option) = try_steal(word, word_ms, center_ms, center, victim) {
                found.push(option);
            }
        }
        found
    };

    #[cfg(feature = "rayon")]
    let found: Vec<ClaimOption> = {
        use rayon::prelude::*;
        dictionary.par_iter().flat_map_iter(|word| options_for(word)).collect()
    };
    #[cfg(not(feature = "rayon"))]
    let found: Vec<ClaimOption> = dictionary.iter().flat_map(|word| options_for(word)).collect();

    let mut best: HashMap<String, ClaimOption> = HashMap::new();
    for option in found {
        best.entry(option.word.clone())
            .and_modify(|existing_best| {
                if option.score > existing_best.score {
                    *existing_best = option.clone();
                }
            })
            .or_insert(option);
    }

    let mut options: Vec<ClaimOption> = best.into_values().collect();
    options.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.word.cmp(&b.word)));
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::{Letter, Tile};

    fn center_from(word: &str) -> Vec<Tile> {
        word.chars()
            .map(|c| Tile::new(Letter::from_char(c).unwrap()))
            .collect()
    }

    fn dict(words: &[&str]) -> Dictionary {
        Dictionary::from_words(words)
    }

    /// S1 — center-formed claim, 4-letter word, no existing words.
    #[test]
    fn s1_center_formed_claims_sorted_by_score_then_word() {
        let center = center_from("TEAM");
        let dictionary = dict(&["TEAM", "MATE", "MEAT", "TAME", "META"]);
        let options = enumerate(&center, &[], &dictionary);
        let words: Vec<&str> = options.iter().map(|o| o.word.as_str()).collect();
        assert_eq!(words, vec!["MATE", "MEAT", "META", "TAME", "TEAM"]);
        assert!(options.iter().all(|o| o.score == 4));
        assert!(options.iter().all(|o| matches!(o.source, ClaimSource::Center)));
    }

    /// S2 — steal rearrangement wins over substring extension.
    #[test]
    fn s2_steal_rearrangement_wins_over_extension() {
        let center = center_from("S");
        let existing = vec![ExistingWord {
            word_id: WordId::new(),
            owner_id: PlayerId::new(),
            text: "RATE".to_string(),
            tile_ids: center_from("RATE").iter().map(|t| t.id).collect(),
        }];
        let dictionary = dict(&["RATE", "STARE", "RATES", "TEAR"]);
        let options = enumerate(&center, &existing, &dictionary);
        let stare = options.iter().find(|o| o.word == "STARE").expect("STARE should be offered");
        assert_eq!(stare.score, 9);
        assert!(matches!(stare.source, ClaimSource::Steal { .. }));
        assert!(options.iter().all(|o| o.word != "RATES"), "RATES is a substring extension, not a steal");
    }

    /// S3 — family rejection.
    #[test]
    fn s3_family_rejection() {
        let center = center_from("S");
        let existing = vec![ExistingWord {
            word_id: WordId::new(),
            owner_id: PlayerId::new(),
            text: "MILE".to_string(),
            tile_ids: center_from("MILE").iter().map(|t| t.id).collect(),
        }];
        let dictionary = dict(&["MILE", "MILES"]);
        let options = enumerate(&center, &existing, &dictionary);
        assert!(options.iter().all(|o| o.word != "MILES"));

        let failure = validate_claim(&center, &existing, "MILES", &dictionary).unwrap_err();
        assert_eq!(failure, ClaimFailure::SameFamily);
    }

    #[test]
    fn validate_claim_rejects_non_letters_and_short_words() {
        let center = center_from("TEAM");
        let dictionary = dict(&["TEAM"]);
        assert_eq!(
            validate_claim(&center, &[], "", &dictionary).unwrap_err(),
            ClaimFailure::EmptyWord
        );
        assert_eq!(
            validate_claim(&center, &[], "te4m", &dictionary).unwrap_err(),
            ClaimFailure::NonLetters
        );
        assert_eq!(
            validate_claim(&center, &[], "cat", &dictionary).unwrap_err(),
            ClaimFailure::NotInDictionary
        );
    }

    #[test]
    fn enumerate_dedups_to_best_scoring_row_per_word() {
        // Two existing words both of which can be stolen into the same resulting word at
        // different scores; only the higher-scoring steal should survive.
        let center = center_from("S");
        let existing = vec![
            ExistingWord {
                word_id: WordId::new(),
                owner_id: PlayerId::new(),
                text: "RATE".to_string(),
                tile_ids: center_from("RATE").iter().map(|t| t.id).collect(),
            },
            ExistingWord {
                word_id: WordId::new(),
                owner_id: PlayerId::new(),
                text: "TEAR".to_string(),
                tile_ids: center_from("TEAR").iter().map(|t| t.id).collect(),
            },
        ];
        let dictionary = dict(&["RATE", "TEAR", "STARE"]);
        let options = enumerate(&center, &existing, &dictionary);
        let stare_rows: Vec<_> = options.iter().filter(|o| o.word == "STARE").collect();
        assert_eq!(stare_rows.len(), 1, "STARE should dedup to a single best row");
    }
}
