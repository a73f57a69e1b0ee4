//! Pre-steal arbitration (§4.6): run immediately after a reveal adds tiles to the center,
//! deciding whether any player's standing auto-claim fires before the game returns to `Idle`.
use chrono::{DateTime, Utc};

use crate::dictionary::Dictionary;
use crate::engine::claims::{self, ExistingWord};
use crate::ids::PlayerId;
use crate::tiles::{normalize_word, LetterMultiset};

use super::types::{ClaimSourceKind, Game};

/// One armed pre-steal, ready to be applied exactly like a manual claim.
pub struct Armed {
    pub player_id: PlayerId,
    pub claim_word: String,
}

/// Find the first entry, in precedence order, whose trigger letters are available in the
/// current center and whose claim word currently validates. Ties within a player are broken by
/// `createdAt` since `pre_steal_entries` is always kept in creation order.
pub fn find_armed(game: &Game, dictionary: &Dictionary) -> Option<Armed> {
    let center_ms: LetterMultiset = game.center_tiles.iter().map(|t| t.letter).collect();
    let existing = existing_words(game);

    for &player_id in &game.precedence_order.0 {
        let player = game.player(player_id)?;
        for entry in &player.pre_steal_entries {
            let Some(trigger_letters) = normalize_word(&entry.trigger_letters) else {
                continue;
            };
            let trigger_ms: LetterMultiset = trigger_letters.into_iter().collect();
            if !trigger_ms.is_subset_of(&center_ms) {
                continue;
            }
            if claims::validate_claim(&game.center_tiles, &existing, &entry.claim_word, dictionary).is_ok() {
                return Some(Armed {
                    player_id,
                    claim_word: entry.claim_word.clone(),
                });
            }
        }
    }
    None
}

pub(crate) fn existing_words(game: &Game) -> Vec<ExistingWord> {
    game.players
        .iter()
        .flat_map(|p| {
            p.words.iter().map(move |w| ExistingWord {
                word_id: w.id,
                owner_id: p.id,
                text: w.text.clone(),
                tile_ids: w.tile_ids.clone(),
            })
        })
        .collect()
}

/// Apply an armed pre-steal the same way [`super::state_machine::apply_claim`] applies a manual
/// one, then demote the winner to the bottom of precedence order.
pub fn apply(game: &mut Game, armed: Armed, dictionary: &Dictionary, now: DateTime<Utc>) {
    let existing = existing_words(game);
    let option = claims::validate_claim(&game.center_tiles, &existing, &armed.claim_word, dictionary)
        .expect("re-validated immediately after find_armed confirmed it");

    super::state_machine::apply_claim_option(game, armed.player_id, option, ClaimSourceKind::PreSteal, now);
    game.precedence_order.demote(armed.player_id);
    if let Some(meta) = game.last_claim_event.as_mut() {
        meta.moved_to_bottom_of_pre_steal_precedence = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::letter_bag::LetterBag;
    use crate::room::types::{Player, PrecedenceOrder, Word};
    use crate::tiles::{Letter, Tile};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tile(c: char) -> Tile {
        Tile::new(Letter::from_char(c).unwrap())
    }

    fn dict() -> Dictionary {
        Dictionary::from_words(["RATE", "STARE", "MILE", "MILES"])
    }

    fn epoch() -> DateTime<Utc> {
        DateTime::from_timestamp(0, 0).unwrap()
    }

    fn game_with(center: Vec<Tile>, a_owns_rate: bool) -> Game {
        let mut rng = StdRng::seed_from_u64(1);
        let rate_tiles = vec![tile('R'), tile('A'), tile('T'), tile('E')];
        let a_id = PlayerId::new();
        let b_id = PlayerId::new();
        let mut a = Player::new(a_id, "A");
        let mut b = Player::new(b_id, "B");
        if a_owns_rate {
            a.words.push(Word {
                id: crate::ids::WordId::new(),
                text: "RATE".to_string(),
                tile_ids: rate_tiles.iter().map(|t| t.id).collect(),
                owner_id: a_id,
                created_at: epoch(),
            });
        }
        b.pre_steal_entries.push(crate::room::types::PreStealEntry {
            id: crate::ids::PreStealEntryId::new(),
            trigger_letters: "S".to_string(),
            claim_word: "STARE".to_string(),
            created_at: epoch(),
        });
        Game {
            room_id: crate::ids::RoomId::new(),
            status: crate::room::types::GameStatus::InGame,
            center_tiles: center,
            players: vec![a, b],
            turn_order: vec![a_id, b_id],
            turn_index: 0,
            last_claim_at: None,
            end_timer_ends_at: None,
            claim_window: None,
            claim_cooldowns: Default::default(),
            pending_flip: None,
            pre_steal_enabled: true,
            precedence_order: PrecedenceOrder::new(vec![a_id, b_id]),
            last_claim_event: None,
            bag: LetterBag::new_shuffled(&mut rng),
            replay: crate::replay::Replay::new(),
            last_replay_snapshot_hash: None,
        }
    }

    /// S5 — pre-steal demotion: B's "S" trigger arms against A's RATE, producing STARE.
    #[test]
    fn s5_pre_steal_demotion() {
        let mut game = game_with(vec![tile('S')], true);
        let dictionary = dict();
        let armed = find_armed(&game, &dictionary).expect("B's entry should arm");
        assert_eq!(armed.claim_word, "STARE");

        apply(&mut game, armed, &dictionary, epoch());

        let b = game.players.iter().find(|p| p.name == "B").unwrap();
        assert!(b.words.iter().any(|w| w.text == "STARE"));
        let a = game.players.iter().find(|p| p.name == "A").unwrap();
        assert!(a.words.is_empty());
        assert_eq!(game.precedence_order.0.last().copied(), Some(b.id));
        assert!(game
            .last_claim_event
            .as_ref()
            .unwrap()
            .moved_to_bottom_of_pre_steal_precedence);
    }

    #[test]
    fn no_entry_arms_without_matching_trigger() {
        let game = game_with(vec![tile('Z')], true);
        let dictionary = dict();
        assert!(find_armed(&game, &dictionary).is_none());
    }
}
