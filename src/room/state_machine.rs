//! Game state machine (§4.5): the commands that move a room between `Idle`, `Revealing`,
//! `Claiming`, and the terminal `Ended` state, plus applying a successful claim (§4.7). Every
//! function here is synchronous and takes `now` as a parameter rather than reading the clock
//! itself, so the whole module is deterministic and unit-testable without sleeping.
//!
//! `Idle`/`Revealing`/`Claiming` are not carried as an explicit field — they are a pure function
//! of `pending_flip`/`claim_window` (at most one of which is ever set, per the data model
//! invariant), so there is nothing for a bug to desynchronize them from.
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::constants::{DEFAULT_FLIP_REVEAL_MS, END_COUNTDOWN_SECONDS, MIN_WORD_LENGTH};
use crate::dictionary::Dictionary;
use crate::engine::claims::{self, ClaimFailure, ClaimOption, ClaimSource};
use crate::error::{Error, Result};
use crate::ids::{ClaimEventId, PlayerId, PreStealEntryId, WordId};
use crate::letter_bag::LetterBag;
use crate::replay::{self, StepKind};
use crate::tiles::normalize_word;

use super::prestal;
use super::types::{
    ClaimEventMeta, ClaimSourceKind, ClaimWindow, Game, GameStatus, PendingFlip, Player, PreStealEntry,
    PrecedenceOrder, Room,
};

/// Outcome of a `claim` command, for the caller (the async room handle) to decide whether the
/// claim-window timer needs rearming, canceling, or leaving alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    Succeeded,
    /// Rejected, but time remains on the window — it is still open for a re-submission.
    RejectedWindowOpen(ClaimFailure),
    /// Rejected with no time left; the window closed and the claimant is now on cooldown.
    RejectedCooldownApplied(ClaimFailure),
}

fn game_mut(room: &mut Room) -> Result<&mut Game> {
    room.game.as_mut().ok_or(Error::WrongState(room.meta.id))
}

/// `room:start`: builds the game's bag and roster from the lobby and records `game-start`.
pub fn start(room: &mut Room, host_id: PlayerId, rng: &mut impl Rng, now: DateTime<Utc>) -> Result<()> {
    let room_id = room.meta.id;
    if room.status != GameStatus::Lobby {
        return Err(Error::WrongState(room_id));
    }
    if room.meta.host_id != host_id {
        return Err(Error::NotAuthorized(host_id));
    }
    if room.lobby_players.is_empty() {
        return Err(Error::CannotStart(room_id));
    }

    let players = room.lobby_players.clone();
    let turn_order: Vec<PlayerId> = players.iter().map(|p| p.id).collect();
    let precedence_order = PrecedenceOrder::new(turn_order.clone());

    let mut game = Game {
        room_id,
        status: GameStatus::InGame,
        center_tiles: Vec::new(),
        players,
        turn_order,
        turn_index: 0,
        last_claim_at: None,
        end_timer_ends_at: None,
        claim_window: None,
        claim_cooldowns: Default::default(),
        pending_flip: None,
        pre_steal_enabled: room.meta.config.pre_steal_enabled,
        precedence_order,
        last_claim_event: None,
        bag: LetterBag::new_shuffled(rng),
        replay: crate::replay::Replay::new(),
        last_replay_snapshot_hash: None,
    };
    replay::record_step(&mut game, StepKind::GameStart, now);

    room.status = GameStatus::InGame;
    room.game = Some(game);
    Ok(())
}

/// `game:flip`: only the turn player, only from `Idle`, only with tiles left to draw.
pub fn flip(room: &mut Room, player_id: PlayerId, now: DateTime<Utc>) -> Result<()> {
    let room_id = room.meta.id;
    let game = game_mut(room)?;
    if game.status != GameStatus::InGame {
        return Err(Error::WrongState(room_id));
    }
    if game.claim_window.is_some() || game.pending_flip.is_some() {
        return Err(Error::WrongState(room_id));
    }
    if game.turn_player_id() != Some(player_id) {
        return Err(Error::NotYourTurn(player_id));
    }
    if game.bag.is_empty() {
        return Err(Error::WrongState(room_id));
    }
    game.pending_flip = Some(PendingFlip {
        player_id,
        started_at: now,
        reveals_at: now + Duration::milliseconds(DEFAULT_FLIP_REVEAL_MS),
    });
    Ok(())
}

/// Idle-timeout equivalent of `flip(turnPlayerId)`, gated on the room's flip timer being
/// enabled. Fired by the timer scheduler's `autoFlip` slot.
pub fn auto_flip(room: &mut Room, now: DateTime<Utc>) -> Result<()> {
    let room_id = room.meta.id;
    if !room.meta.config.flip_timer_enabled {
        return Err(Error::WrongState(room_id));
    }
    let turn_player = game_mut(room)?.turn_player_id().ok_or(Error::WrongState(room_id))?;
    flip(room, turn_player, now)
}

/// The visual-reveal interval elapses: draw the tile, advance turn, clear cooldowns, record the
/// step, then run pre-steal arbitration, then check for the bag-empty endgame condition.
pub fn pending_flip_reveal_fires(room: &mut Room, dictionary: &Dictionary, now: DateTime<Utc>) -> Result<()> {
    let room_id = room.meta.id;
    let game = game_mut(room)?;
    game.pending_flip.take().ok_or(Error::WrongState(room_id))?;

    if let Some(tile) = game.bag.draw_one() {
        game.center_tiles.push(tile);
    }
    if !game.turn_order.is_empty() {
        game.turn_index = (game.turn_index + 1) % game.turn_order.len();
    }
    // All cooldowns clear unconditionally on every reveal (see open-question decision).
    game.claim_cooldowns.clear();
    replay::record_step(game, StepKind::FlipRevealed, now);

    if let Some(armed) = prestal::find_armed(game, dictionary) {
        prestal::apply(game, armed, dictionary, now);
    }

    if game.bag.is_empty() && !game.center_tiles.is_empty() && game.end_timer_ends_at.is_none() {
        game.end_timer_ends_at = Some(now + Duration::seconds(END_COUNTDOWN_SECONDS as i64));
    }
    Ok(())
}

/// `game:claim-intent`: opens the claim window for `player_id`, provided they are not already
/// serving a cooldown and nothing else is in flight.
pub fn claim_intent(room: &mut Room, player_id: PlayerId, now: DateTime<Utc>) -> Result<()> {
    let room_id = room.meta.id;
    let claim_seconds = room.meta.config.claim_timer_seconds;
    let game = game_mut(room)?;
    if game.claim_window.is_some() || game.pending_flip.is_some() {
        return Err(Error::WrongState(room_id));
    }
    if game.is_on_cooldown(player_id, now) {
        return Err(Error::OnCooldown(player_id));
    }
    game.claim_window = Some(ClaimWindow {
        player_id,
        ends_at: now + Duration::seconds(claim_seconds as i64),
    });
    Ok(())
}

/// `game:claim`: validate the submission against the current window holder. Every failure kind
/// leaves the window open to retry while time remains (see open-question decision); only the
/// window's own expiry imposes a cooldown.
pub fn claim(
    room: &mut Room,
    player_id: PlayerId,
    word: &str,
    dictionary: &Dictionary,
    now: DateTime<Utc>,
) -> Result<ClaimOutcome> {
    let room_id = room.meta.id;
    let claim_seconds = room.meta.config.claim_timer_seconds;
    let game = game_mut(room)?;
    let window = game.claim_window.ok_or(Error::WrongState(room_id))?;
    if window.player_id != player_id {
        return Err(Error::NotAuthorized(player_id));
    }

    let existing = prestal::existing_words(game);
    match claims::validate_claim(&game.center_tiles, &existing, word, dictionary) {
        Ok(option) => {
            apply_claim_option(game, player_id, option, ClaimSourceKind::Manual, now);
            game.claim_window = None;
            Ok(ClaimOutcome::Succeeded)
        }
        Err(failure) if window.ends_at > now => Ok(ClaimOutcome::RejectedWindowOpen(failure)),
        Err(failure) => {
            game.claim_cooldowns
                .insert(player_id, now + Duration::seconds(claim_seconds as i64));
            game.claim_window = None;
            Ok(ClaimOutcome::RejectedCooldownApplied(failure))
        }
    }
}

/// The `claimWindow` timer fires (S4): the holder is placed on cooldown and the window closes
/// with no claim recorded.
pub fn claim_window_fires(room: &mut Room, now: DateTime<Utc>) -> Result<()> {
    let room_id = room.meta.id;
    let claim_seconds = room.meta.config.claim_timer_seconds;
    let game = game_mut(room)?;
    let window = game.claim_window.take().ok_or(Error::WrongState(room_id))?;
    game.claim_cooldowns
        .insert(window.player_id, now + Duration::seconds(claim_seconds as i64));
    replay::record_step(game, StepKind::ClaimExpired, now);
    Ok(())
}

/// The `endCountdown` timer fires: the game is over.
pub fn end_countdown_fires(room: &mut Room, now: DateTime<Utc>) -> Result<()> {
    let room_id = room.meta.id;
    let game = game_mut(room)?;
    if game.end_timer_ends_at.is_none() {
        return Err(Error::WrongState(room_id));
    }
    game.status = GameStatus::Ended;
    replay::record_step(game, StepKind::GameEnded, now);
    room.status = GameStatus::Ended;
    Ok(())
}

/// Apply an already-validated claim option, manual or pre-steal alike (§4.7): move tiles,
/// destroy the victim word if this was a steal, mint the new word, and record the event.
pub(crate) fn apply_claim_option(
    game: &mut Game,
    claimant_id: PlayerId,
    option: ClaimOption,
    source: ClaimSourceKind,
    now: DateTime<Utc>,
) {
    let replaced_word_id = match option.source {
        ClaimSource::Center => None,
        ClaimSource::Steal { victim_word_id, victim_owner_id } => {
            if let Some(victim) = game.player_mut(victim_owner_id) {
                victim.words.retain(|w| w.id != victim_word_id);
            }
            Some(victim_word_id)
        }
    };

    game.center_tiles.retain(|t| !option.new_center_tile_ids.contains(&t.id));

    let word_id = WordId::new();
    if let Some(claimant) = game.player_mut(claimant_id) {
        claimant.words.push(super::types::Word {
            id: word_id,
            text: option.word,
            tile_ids: option.resulting_tile_ids,
            owner_id: claimant_id,
            created_at: now,
        });
    }

    game.last_claim_at = Some(now);
    game.last_claim_event = Some(ClaimEventMeta {
        event_id: ClaimEventId::new(),
        word_id,
        claimant_id,
        replaced_word_id,
        source,
        moved_to_bottom_of_pre_steal_precedence: false,
    });

    replay::record_step(game, StepKind::ClaimSucceeded, now);
}

/// `game:pre-steal:add`: format-validate only; dictionary membership is checked at arm time.
pub fn pre_steal_add(
    room: &mut Room,
    player_id: PlayerId,
    trigger_letters: &str,
    claim_word: &str,
    now: DateTime<Utc>,
) -> Result<PreStealEntryId> {
    if !room.meta.config.pre_steal_enabled {
        return Err(Error::WrongState(room.meta.id));
    }
    let trigger = normalize_word(trigger_letters)
        .ok_or_else(|| Error::ClaimRejected(ClaimFailure::NonLetters.message().to_string()))?;
    if trigger.is_empty() {
        return Err(Error::ClaimRejected(ClaimFailure::EmptyWord.message().to_string()));
    }
    let word = normalize_word(claim_word)
        .ok_or_else(|| Error::ClaimRejected(ClaimFailure::NonLetters.message().to_string()))?;
    if word.len() < MIN_WORD_LENGTH {
        return Err(Error::ClaimRejected(ClaimFailure::NotInDictionary.message().to_string()));
    }

    let id = PreStealEntryId::new();
    let entry = PreStealEntry {
        id,
        trigger_letters: trigger_letters.to_ascii_uppercase(),
        claim_word: claim_word.to_ascii_uppercase(),
        created_at: now,
    };
    player_mut_any(room, player_id)?.pre_steal_entries.push(entry);
    Ok(id)
}

pub fn pre_steal_remove(room: &mut Room, player_id: PlayerId, entry_id: PreStealEntryId) -> Result<()> {
    player_mut_any(room, player_id)?
        .pre_steal_entries
        .retain(|e| e.id != entry_id);
    Ok(())
}

/// Reorder a player's pre-steal list to match `ordered_ids`; any ids not present are dropped,
/// any entries not named in `ordered_ids` keep their relative order at the end.
pub fn pre_steal_reorder(room: &mut Room, player_id: PlayerId, ordered_ids: &[PreStealEntryId]) -> Result<()> {
    let player = player_mut_any(room, player_id)?;
    let mut reordered = Vec::with_capacity(player.pre_steal_entries.len());
    for &id in ordered_ids {
        if let Some(pos) = player.pre_steal_entries.iter().position(|e| e.id == id) {
            reordered.push(player.pre_steal_entries.remove(pos));
        }
    }
    reordered.extend(player.pre_steal_entries.drain(..));
    player.pre_steal_entries = reordered;
    Ok(())
}

fn player_mut_any(room: &mut Room, player_id: PlayerId) -> Result<&mut Player> {
    if let Some(game) = room.game.as_mut() {
        game.player_mut(player_id).ok_or(Error::NotAuthorized(player_id))
    } else {
        room.lobby_players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or(Error::NotAuthorized(player_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::types::{RoomConfig, RoomMeta};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn epoch() -> DateTime<Utc> {
        DateTime::from_timestamp(0, 0).unwrap()
    }

    fn new_room() -> (Room, PlayerId) {
        let host_id = PlayerId::new();
        let meta = RoomMeta {
            id: crate::ids::RoomId::new(),
            name: "room".to_string(),
            is_public: true,
            code: None,
            host_id,
            config: RoomConfig::new(4, false, 10, 5, true).unwrap(),
            created_at: epoch(),
        };
        (Room::new(meta, "Host"), host_id)
    }

    fn dict() -> Dictionary {
        Dictionary::from_words(["TEAM", "MATE", "MEAT", "TAME", "META"])
    }

    #[test]
    fn start_requires_host_and_builds_game() {
        let (mut room, host_id) = new_room();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(start(&mut room, PlayerId::new(), &mut rng, epoch()).is_err());
        start(&mut room, host_id, &mut rng, epoch()).unwrap();
        let game = room.game.as_ref().unwrap();
        assert_eq!(game.status, GameStatus::InGame);
        assert_eq!(game.replay.steps.len(), 1);
        assert_eq!(game.replay.steps[0].kind, StepKind::GameStart);
    }

    #[test]
    fn flip_requires_turn_player() {
        let (mut room, host_id) = new_room();
        let mut rng = StdRng::seed_from_u64(1);
        start(&mut room, host_id, &mut rng, epoch()).unwrap();
        assert!(flip(&mut room, PlayerId::new(), epoch()).is_err());
        flip(&mut room, host_id, epoch()).unwrap();
        assert!(room.game.as_ref().unwrap().pending_flip.is_some());
    }

    #[test]
    fn reveal_then_claim_round_trip() {
        let (mut room, host_id) = new_room();
        let mut rng = StdRng::seed_from_u64(2);
        let dictionary = dict();
        start(&mut room, host_id, &mut rng, epoch()).unwrap();
        flip(&mut room, host_id, epoch()).unwrap();
        // Force a deterministic center so the claim is guaranteed valid regardless of bag order.
        room.game.as_mut().unwrap().pending_flip = None;
        room.game.as_mut().unwrap().center_tiles =
            "TEAM".chars().map(|c| crate::tiles::Tile::new(crate::tiles::Letter::from_char(c).unwrap())).collect();

        claim_intent(&mut room, host_id, epoch()).unwrap();
        let outcome = claim(&mut room, host_id, "TEAM", &dictionary, epoch()).unwrap();
        assert_eq!(outcome, ClaimOutcome::Succeeded);
        let game = room.game.as_ref().unwrap();
        assert!(game.claim_window.is_none());
        assert_eq!(game.players[0].words.len(), 1);
        assert!(game.replay.steps.iter().any(|s| s.kind == StepKind::ClaimSucceeded));
    }

    /// S4 — claim window expiry puts the holder on cooldown with no claim recorded.
    #[test]
    fn s4_claim_window_expiry_applies_cooldown() {
        let (mut room, host_id) = new_room();
        let mut rng = StdRng::seed_from_u64(3);
        start(&mut room, host_id, &mut rng, epoch()).unwrap();
        claim_intent(&mut room, host_id, epoch()).unwrap();

        let fires_at = epoch() + Duration::seconds(5);
        claim_window_fires(&mut room, fires_at).unwrap();

        let game = room.game.as_ref().unwrap();
        assert!(game.claim_window.is_none());
        assert!(game.is_on_cooldown(host_id, fires_at));
        assert!(!game.replay.steps.iter().any(|s| s.kind == StepKind::ClaimSucceeded));
    }

    #[test]
    fn failed_claim_leaves_window_open_while_time_remains() {
        let (mut room, host_id) = new_room();
        let mut rng = StdRng::seed_from_u64(4);
        let dictionary = dict();
        start(&mut room, host_id, &mut rng, epoch()).unwrap();
        claim_intent(&mut room, host_id, epoch()).unwrap();
        let outcome = claim(&mut room, host_id, "zzzz", &dictionary, epoch()).unwrap();
        assert!(matches!(outcome, ClaimOutcome::RejectedWindowOpen(_)));
        assert!(room.game.as_ref().unwrap().claim_window.is_some());
    }
}
