//! Replay recording (§4.9): an append-only, deduplicated sequence of snapshots taken at every
//! salient transition, plus (in [`analyze`]) the step analyzer built on top of the
//! practice/puzzle engine, and (in [`file`]) the v1 JSON export/import format (§6).
pub mod analyze;
pub mod file;

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::PlayerId;
use crate::room::types::{ClaimEventMeta, ClaimWindow, Game, GameStatus, PendingFlip, Player, PrecedenceOrder};

/// Why a step was recorded. Only `FlipRevealed` and `ClaimSucceeded` are analyzable (§4.9);
/// the others exist so the replay is a complete, gap-free record of observable state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepKind {
    GameStart,
    FlipRevealed,
    ClaimSucceeded,
    ClaimExpired,
    GameEnded,
}

/// Everything about a `Game` relevant for review — deliberately excludes bag contents (only
/// its count) and excludes nothing else named in §4.9.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub status: GameStatus,
    pub bag_count: usize,
    pub center_tiles: Vec<crate::tiles::Tile>,
    pub players: Vec<Player>,
    pub turn_player_id: Option<PlayerId>,
    pub claim_window: Option<ClaimWindow>,
    pub claim_cooldowns: BTreeMap<PlayerId, DateTime<Utc>>,
    pub pending_flip: Option<PendingFlip>,
    pub pre_steal_enabled: bool,
    pub precedence_order: PrecedenceOrder,
    pub last_claim_event: Option<ClaimEventMeta>,
    pub end_timer_ends_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn of(game: &Game) -> Self {
        Self {
            status: game.status,
            bag_count: game.bag.count(),
            center_tiles: game.center_tiles.clone(),
            players: game.players.clone(),
            turn_player_id: game.turn_player_id(),
            claim_window: game.claim_window,
            claim_cooldowns: game.claim_cooldowns.iter().map(|(&k, &v)| (k, v)).collect(),
            pending_flip: game.pending_flip,
            pre_steal_enabled: game.pre_steal_enabled,
            precedence_order: game.precedence_order.clone(),
            last_claim_event: game.last_claim_event.clone(),
            end_timer_ends_at: game.end_timer_ends_at,
        }
    }

    /// A canonical hash of this snapshot, used to decide whether a transition actually changed
    /// observable state. Hashing the JSON form (rather than deriving `Hash`) sidesteps needing
    /// `Hash` on `DateTime<Utc>` and keeps the notion of "canonical representation" explicit.
    fn canonical_hash(&self) -> u64 {
        let json = serde_json::to_string(self).expect("snapshot fields always serialize");
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        json.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayStep {
    pub index: u64,
    pub at: DateTime<Utc>,
    pub kind: StepKind,
    pub state: Snapshot,
}

/// An append-only, deduplicated record of a game's salient transitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Replay {
    pub steps: Vec<ReplayStep>,
}

impl Replay {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Snapshot `game`'s current state and, if it differs from the last recorded snapshot, append a
/// step of kind `kind`. No-ops (does not bump the step index) when nothing observable changed.
pub fn record_step(game: &mut Game, kind: StepKind, now: DateTime<Utc>) {
    let snapshot = Snapshot::of(game);
    let hash = snapshot.canonical_hash();
    if game.last_replay_snapshot_hash == Some(hash) {
        return;
    }
    let index = game.replay.steps.len() as u64;
    game.replay.steps.push(ReplayStep {
        index,
        at: now,
        kind,
        state: snapshot,
    });
    game.last_replay_snapshot_hash = Some(hash);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::letter_bag::LetterBag;
    use crate::room::types::PrecedenceOrder as PO;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn blank_game() -> Game {
        let mut rng = StdRng::seed_from_u64(5);
        Game {
            room_id: crate::ids::RoomId::new(),
            status: GameStatus::InGame,
            center_tiles: vec![],
            players: vec![],
            turn_order: vec![],
            turn_index: 0,
            last_claim_at: None,
            end_timer_ends_at: None,
            claim_window: None,
            claim_cooldowns: Default::default(),
            pending_flip: None,
            pre_steal_enabled: false,
            precedence_order: PO::new(vec![]),
            last_claim_event: None,
            bag: LetterBag::new_shuffled(&mut rng),
            replay: Replay::new(),
            last_replay_snapshot_hash: None,
        }
    }

    fn epoch() -> DateTime<Utc> {
        DateTime::from_timestamp(0, 0).unwrap()
    }

    #[test]
    fn identical_state_does_not_append_a_step() {
        let mut game = blank_game();
        record_step(&mut game, StepKind::GameStart, epoch());
        record_step(&mut game, StepKind::GameStart, epoch());
        assert_eq!(game.replay.steps.len(), 1);
    }

    #[test]
    fn changed_state_appends_with_increasing_index() {
        let mut game = blank_game();
        record_step(&mut game, StepKind::GameStart, epoch());
        game.turn_index = 1;
        game.turn_order.push(PlayerId::new());
        record_step(&mut game, StepKind::FlipRevealed, epoch());
        assert_eq!(game.replay.steps.len(), 2);
        assert_eq!(game.replay.steps[0].index, 0);
        assert_eq!(game.replay.steps[1].index, 1);
    }
}
