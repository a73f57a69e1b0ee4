//! The data model from §3: tiles up through rooms and games. Plain data, no behavior —
//! the state machine in `room::state_machine` is what mutates these.
pub use crate::ids::{ClaimEventId, PlayerId, PreStealEntryId, RoomId, SpectatorId};

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{CLAIM_TIMER_SECONDS_RANGE, FLIP_TIMER_SECONDS_RANGE, MAX_PLAYERS, MIN_PLAYERS};
use crate::error::{Error, Result};
use crate::ids::WordId;
use crate::tiles::{Tile, TileId};

/// A claimed word: the spelling, the exact tiles it consumes, and who owns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    pub id: WordId,
    pub text: String,
    pub tile_ids: Vec<TileId>,
    pub owner_id: PlayerId,
    pub created_at: DateTime<Utc>,
}

/// One entry in a player's pre-steal list: "if these letters ever appear in the center and I
/// can legally claim `claim_word`, do it automatically."
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreStealEntry {
    pub id: PreStealEntryId,
    pub trigger_letters: String,
    pub claim_word: String,
    pub created_at: DateTime<Utc>,
}

/// A participant with words on the table. `score` is always recomputed from `words`, never
/// stored independently, so it can never drift out of sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub connected: bool,
    pub words: Vec<Word>,
    pub pre_steal_entries: Vec<PreStealEntry>,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            connected: true,
            words: Vec::new(),
            pre_steal_entries: Vec::new(),
        }
    }

    /// Derived score: the total tiles owned across all of this player's words.
    pub fn score(&self) -> usize {
        self.words.iter().map(|w| w.tile_ids.len()).sum()
    }
}

/// At most one exists per game at a time: the window during which `claim_window.player_id` may
/// submit a claim.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClaimWindow {
    pub player_id: PlayerId,
    pub ends_at: DateTime<Utc>,
}

/// At most one exists per game at a time: the visual-reveal interval after a flip, before the
/// drawn tile lands in the center and a new claim window may open.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PendingFlip {
    pub player_id: PlayerId,
    pub started_at: DateTime<Utc>,
    pub reveals_at: DateTime<Utc>,
}

/// Tie-breaking order for pre-steal arbitration (§4.6). Always a permutation of the current
/// players; a player whose entry just fired is moved to the bottom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrecedenceOrder(pub Vec<PlayerId>);

impl PrecedenceOrder {
    pub fn new(players: Vec<PlayerId>) -> Self {
        Self(players)
    }

    /// Move `player_id` to the bottom (end) of the order, if present.
    pub fn demote(&mut self, player_id: PlayerId) {
        if let Some(pos) = self.0.iter().position(|&p| p == player_id) {
            let id = self.0.remove(pos);
            self.0.push(id);
        }
    }

    pub fn add(&mut self, player_id: PlayerId) {
        if !self.0.contains(&player_id) {
            self.0.push(player_id);
        }
    }

    pub fn remove(&mut self, player_id: PlayerId) {
        self.0.retain(|&p| p != player_id);
    }
}

/// Where a claim's letters came from, for annotating the log/UI.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClaimSourceKind {
    Manual,
    PreSteal,
}

/// Metadata describing the most recent successful claim, consumed by the log/UI to render text
/// like "Alice stole RATE from Bob to make STARE".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimEventMeta {
    pub event_id: ClaimEventId,
    pub word_id: WordId,
    pub claimant_id: PlayerId,
    pub replaced_word_id: Option<WordId>,
    pub source: ClaimSourceKind,
    pub moved_to_bottom_of_pre_steal_precedence: bool,
}

/// Tunable parameters fixed at room creation, validated against §6's ranges.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoomConfig {
    pub max_players: usize,
    pub flip_timer_enabled: bool,
    pub flip_timer_seconds: u32,
    pub claim_timer_seconds: u32,
    pub pre_steal_enabled: bool,
}

/// Errors constructing a [`RoomConfig`] from untrusted inbound command fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RoomConfigError {
    #[error("maxPlayers must be between {MIN_PLAYERS} and {MAX_PLAYERS}")]
    MaxPlayersOutOfRange,
    #[error("flipTimerSeconds must be between {} and {}", FLIP_TIMER_SECONDS_RANGE.start(), FLIP_TIMER_SECONDS_RANGE.end())]
    FlipTimerOutOfRange,
    #[error("claimTimerSeconds must be between {} and {}", CLAIM_TIMER_SECONDS_RANGE.start(), CLAIM_TIMER_SECONDS_RANGE.end())]
    ClaimTimerOutOfRange,
}

impl RoomConfig {
    pub fn new(
        max_players: usize,
        flip_timer_enabled: bool,
        flip_timer_seconds: u32,
        claim_timer_seconds: u32,
        pre_steal_enabled: bool,
    ) -> std::result::Result<Self, RoomConfigError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&max_players) {
            return Err(RoomConfigError::MaxPlayersOutOfRange);
        }
        if !FLIP_TIMER_SECONDS_RANGE.contains(&flip_timer_seconds) {
            return Err(RoomConfigError::FlipTimerOutOfRange);
        }
        if !CLAIM_TIMER_SECONDS_RANGE.contains(&claim_timer_seconds) {
            return Err(RoomConfigError::ClaimTimerOutOfRange);
        }
        Ok(Self {
            max_players,
            flip_timer_enabled,
            flip_timer_seconds,
            claim_timer_seconds,
            pre_steal_enabled,
        })
    }
}

/// Lifecycle status of a room's game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Lobby,
    InGame,
    Ended,
}

/// The lobby/host-facing half of a room, independent of whether a game has started.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomMeta {
    pub id: RoomId,
    pub name: String,
    pub is_public: bool,
    pub code: Option<String>,
    pub host_id: PlayerId,
    pub config: RoomConfig,
    pub created_at: DateTime<Utc>,
}

/// A non-participating observer. Spectators see the full viewer projection (§4.10) but hold no
/// words and cannot issue game commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spectator {
    pub id: SpectatorId,
    pub name: String,
}

/// A compact public-facing projection for `room:list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: RoomId,
    pub name: String,
    pub is_public: bool,
    pub player_count: usize,
    pub max_players: usize,
    pub status: GameStatus,
}

/// The full per-game state described in §3. Present once a room leaves `Lobby`.
///
/// Serialize-only: nothing ever deserializes a live `Game` directly. Snapshots for replay and
/// viewer projections are their own, simpler, round-trippable types.
#[derive(Debug, Clone, Serialize)]
pub struct Game {
    pub room_id: RoomId,
    pub status: GameStatus,
    pub center_tiles: Vec<Tile>,
    pub players: Vec<Player>,
    pub turn_order: Vec<PlayerId>,
    pub turn_index: usize,
    pub last_claim_at: Option<DateTime<Utc>>,
    pub end_timer_ends_at: Option<DateTime<Utc>>,
    pub claim_window: Option<ClaimWindow>,
    pub claim_cooldowns: HashMap<PlayerId, DateTime<Utc>>,
    pub pending_flip: Option<PendingFlip>,
    pub pre_steal_enabled: bool,
    pub precedence_order: PrecedenceOrder,
    pub last_claim_event: Option<ClaimEventMeta>,
    #[serde(skip)]
    pub bag: crate::letter_bag::LetterBag,
    pub replay: crate::replay::Replay,
    #[serde(skip)]
    pub last_replay_snapshot_hash: Option<u64>,
}

impl Game {
    pub fn turn_player_id(&self) -> Option<PlayerId> {
        self.turn_order.get(self.turn_index).copied()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn is_on_cooldown(&self, id: PlayerId, now: DateTime<Utc>) -> bool {
        self.claim_cooldowns.get(&id).is_some_and(|&ends_at| ends_at > now)
    }
}

/// The full room aggregate: lobby metadata plus, once a game has started, the `Game` itself.
/// This is what the registry hands out a handle to and what commands mutate.
#[derive(Debug, Clone, Serialize)]
pub struct Room {
    pub meta: RoomMeta,
    pub status: GameStatus,
    pub lobby_players: Vec<Player>,
    pub spectators: Vec<Spectator>,
    pub game: Option<Game>,
}

impl Room {
    pub fn new(meta: RoomMeta, host_name: impl Into<String>) -> Self {
        let host_id = meta.host_id;
        Self {
            status: GameStatus::Lobby,
            lobby_players: vec![Player::new(host_id, host_name)],
            spectators: Vec::new(),
            meta,
            game: None,
        }
    }

    /// Players, wherever they currently live: the lobby roster before a game starts, or the
    /// game's own roster afterward.
    pub fn players(&self) -> &[Player] {
        self.game.as_ref().map(|g| g.players.as_slice()).unwrap_or(&self.lobby_players)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players().iter().find(|p| p.id == id)
    }

    pub fn is_full(&self) -> bool {
        self.players().len() >= self.meta.config.max_players
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.meta.id,
            name: self.meta.name.clone(),
            is_public: self.meta.is_public,
            player_count: self.players().len(),
            max_players: self.meta.config.max_players,
            status: self.status,
        }
    }

    /// `room:join`: rejects a full room or a wrong/missing code on a private room. A joining
    /// player is added to the lobby roster and, if a game is already underway, to the live
    /// game's roster and turn/precedence order too (so latecomers can still be dealt in).
    pub fn join(&mut self, name: impl Into<String>, code: Option<&str>) -> Result<PlayerId> {
        if self.is_full() {
            return Err(Error::RoomFull(self.meta.id));
        }
        if let Some(expected) = &self.meta.code {
            if code != Some(expected.as_str()) {
                return Err(Error::WrongCode(self.meta.id));
            }
        }
        let id = PlayerId::new();
        let player = Player::new(id, name);
        self.lobby_players.push(player.clone());
        if let Some(game) = self.game.as_mut() {
            game.players.push(player);
            game.turn_order.push(id);
            game.precedence_order.add(id);
        }
        Ok(id)
    }

    /// `room:leave`: removes the player from wherever they currently live. Leaving does not
    /// reassign the host seat or advance an in-progress turn.
    pub fn leave(&mut self, player_id: PlayerId) {
        self.lobby_players.retain(|p| p.id != player_id);
        if let Some(game) = self.game.as_mut() {
            game.players.retain(|p| p.id != player_id);
            game.turn_order.retain(|&id| id != player_id);
            game.precedence_order.remove(player_id);
            if game.turn_index >= game.turn_order.len() && !game.turn_order.is_empty() {
                game.turn_index = 0;
            }
        }
    }

    /// `room:spectate`: join as a non-participant observer.
    pub fn spectate(&mut self, name: impl Into<String>) -> SpectatorId {
        let id = SpectatorId::new();
        self.spectators.push(Spectator { id, name: name.into() });
        id
    }

    pub fn leave_spectator(&mut self, spectator_id: SpectatorId) {
        self.spectators.retain(|s| s.id != spectator_id);
    }
}
