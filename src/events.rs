//! Inbound/outbound message contract (§6) and the dispatcher that reduces one inbound command
//! plus the current registry state into an outbound event. Transport-agnostic: nothing here
//! knows about WebSockets or any particular wire framing, only the tagged enums and a pure
//! `dispatch` that maps one to the other, per the design note calling for "an explicit
//! tagged-action enumeration plus a pure reduce(state, action) function".
use std::sync::Arc;

use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::dictionary::Dictionary;
use crate::engine::practice::{self, Evaluation, Puzzle};
use crate::error::{Error, Result};
use crate::ids::{PlayerId, PreStealEntryId, RoomId};
use crate::projection::{self, GameState, ViewerKind};
use crate::registry::Registry;
use crate::replay::analyze::AnalysisResult;
use crate::replay::file::ReplayFile;
use crate::room::types::{RoomConfig, RoomSummary};

/// Every command a client may send, named exactly as in §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Inbound {
    #[serde(rename = "room:create")]
    RoomCreate {
        name: String,
        is_public: bool,
        max_players: usize,
        flip_timer_enabled: bool,
        flip_timer_seconds: u32,
        claim_timer_seconds: u32,
        pre_steal_enabled: bool,
    },
    #[serde(rename = "room:join")]
    RoomJoin { room_id: RoomId, name: String, code: Option<String> },
    #[serde(rename = "room:spectate")]
    RoomSpectate { room_id: RoomId, name: String },
    #[serde(rename = "room:leave")]
    RoomLeave { room_id: RoomId },
    #[serde(rename = "room:start")]
    RoomStart { room_id: RoomId },
    #[serde(rename = "room:list")]
    RoomList,
    #[serde(rename = "game:flip")]
    GameFlip { room_id: RoomId },
    #[serde(rename = "game:claim-intent")]
    GameClaimIntent { room_id: RoomId },
    #[serde(rename = "game:claim")]
    GameClaim { room_id: RoomId, word: String },
    #[serde(rename = "game:pre-steal:add")]
    GamePreStealAdd { room_id: RoomId, trigger_letters: String, claim_word: String },
    #[serde(rename = "game:pre-steal:remove")]
    GamePreStealRemove { room_id: RoomId, entry_id: PreStealEntryId },
    #[serde(rename = "game:pre-steal:reorder")]
    GamePreStealReorder { room_id: RoomId, ordered_ids: Vec<PreStealEntryId> },
    #[serde(rename = "practice:start")]
    PracticeStart {
        difficulty: Option<u8>,
        shared_puzzle: Option<String>,
        timer_enabled: Option<bool>,
        timer_seconds: Option<u32>,
    },
    #[serde(rename = "practice:submit")]
    PracticeSubmit { word: String },
    #[serde(rename = "practice:skip")]
    PracticeSkip,
    #[serde(rename = "practice:next")]
    PracticeNext,
    #[serde(rename = "practice:exit")]
    PracticeExit,
    #[serde(rename = "practice:validate-custom")]
    PracticeValidateCustom { shared_puzzle: String },
    #[serde(rename = "practice:set-difficulty")]
    PracticeSetDifficulty { difficulty: u8 },
    #[serde(rename = "replay:analyze-step")]
    ReplayAnalyzeStep { room_id: RoomId, step_index: usize },
    #[serde(rename = "replay:analyze-imported-step")]
    ReplayAnalyzeImportedStep { replay_file: String, step_index: usize },
}

/// Every event the server may push back, named exactly as in §6.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Outbound {
    #[serde(rename = "room:list")]
    RoomList { rooms: Vec<RoomSummary> },
    #[serde(rename = "room:state")]
    RoomState { room: crate::room::types::Room },
    #[serde(rename = "game:state")]
    GameState { state: GameState },
    #[serde(rename = "practice:state")]
    PracticeState(PracticeState),
    #[serde(rename = "session:self")]
    SessionSelf {
        player_id: PlayerId,
        name: String,
        room_id: Option<RoomId>,
        session_token: Option<String>,
    },
    /// Not named among the outbound events in §6, which lists only the events a connected
    /// client's live session produces; `replay:analyze-step`/`replay:analyze-imported-step`
    /// are one-shot request/response calls, so their response gets its own event here.
    #[serde(rename = "replay:analysis")]
    ReplayAnalysis { result: AnalysisResult },
    #[serde(rename = "error")]
    Error { message: String },
}

/// The client-visible shape of one player's live practice run.
#[derive(Debug, Clone, Serialize)]
pub struct PracticeState {
    pub puzzle_center_tiles: Vec<crate::tiles::Tile>,
    pub difficulty: u8,
    pub last_evaluation: Option<EvaluationView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationView {
    pub is_valid: bool,
    pub is_best_play: bool,
    pub score: u32,
    pub best_score: u32,
    pub outcome: practice::Outcome,
}

impl From<Evaluation> for EvaluationView {
    fn from(e: Evaluation) -> Self {
        Self {
            is_valid: e.is_valid,
            is_best_play: e.is_best_play,
            score: e.score,
            best_score: e.best_score,
            outcome: e.outcome,
        }
    }
}

/// One player's standalone practice run, independent of any room. Kept server-side so repeated
/// `practice:submit` calls can be scored against the same puzzle.
struct PracticeSession {
    puzzle: Puzzle,
    difficulty: u8,
    last_evaluation: Option<Evaluation>,
}

impl PracticeSession {
    fn state(&self) -> PracticeState {
        PracticeState {
            puzzle_center_tiles: self.puzzle.center_tiles.clone(),
            difficulty: self.difficulty,
            last_evaluation: self.last_evaluation.clone().map(EvaluationView::from),
        }
    }
}

/// Ties a [`Registry`] together with per-player practice sessions and reduces inbound commands
/// into outbound events. Practice sessions live here rather than in `Registry` because they are
/// not shared room state — each player's practice run is theirs alone.
pub struct Dispatcher {
    registry: Registry,
    dictionary: Arc<Dictionary>,
    practice_sessions: DashMap<PlayerId, PracticeSession>,
}

impl Dispatcher {
    pub fn new(registry: Registry) -> Self {
        let dictionary = registry.dictionary().clone();
        Self {
            registry,
            dictionary,
            practice_sessions: DashMap::new(),
        }
    }

    pub async fn dispatch(&self, player_id: PlayerId, player_name: &str, inbound: Inbound) -> Outbound {
        match self.handle(player_id, player_name, inbound).await {
            Ok(outbound) => outbound,
            Err(err) => Outbound::Error { message: err.to_string() },
        }
    }

    async fn handle(&self, player_id: PlayerId, player_name: &str, inbound: Inbound) -> Result<Outbound> {
        match inbound {
            Inbound::RoomCreate {
                name,
                is_public,
                max_players,
                flip_timer_enabled,
                flip_timer_seconds,
                claim_timer_seconds,
                pre_steal_enabled,
            } => {
                let config = RoomConfig::new(
                    max_players,
                    flip_timer_enabled,
                    flip_timer_seconds,
                    claim_timer_seconds,
                    pre_steal_enabled,
                )
                .map_err(|e| Error::ClaimRejected(e.to_string()))?;
                let (room_id, _host_id) =
                    self.registry.create_room(player_name, name, is_public, None, config, chrono::Utc::now());
                self.room_state(room_id).await
            }
            Inbound::RoomJoin { room_id, name, code } => {
                self.registry.join_room(room_id, name, code.as_deref()).await?;
                self.room_state(room_id).await
            }
            Inbound::RoomSpectate { room_id, name } => {
                self.registry.spectate_room(room_id, name).await?;
                self.room_state(room_id).await
            }
            Inbound::RoomLeave { room_id } => {
                self.registry.leave_room(room_id, player_id).await?;
                self.room_state(room_id).await
            }
            Inbound::RoomStart { room_id } => {
                self.registry.get(room_id)?.start(player_id).await?;
                self.game_state(room_id, player_id).await
            }
            Inbound::RoomList => Ok(Outbound::RoomList {
                rooms: self.registry.list_public_rooms().await,
            }),
            Inbound::GameFlip { room_id } => {
                self.registry.get(room_id)?.flip(player_id).await?;
                self.game_state(room_id, player_id).await
            }
            Inbound::GameClaimIntent { room_id } => {
                self.registry.get(room_id)?.claim_intent(player_id).await?;
                self.game_state(room_id, player_id).await
            }
            Inbound::GameClaim { room_id, word } => {
                self.registry.get(room_id)?.claim(player_id, &word).await?;
                self.game_state(room_id, player_id).await
            }
            Inbound::GamePreStealAdd { room_id, trigger_letters, claim_word } => {
                self.registry.get(room_id)?.pre_steal_add(player_id, &trigger_letters, &claim_word).await?;
                self.game_state(room_id, player_id).await
            }
            Inbound::GamePreStealRemove { room_id, entry_id } => {
                self.registry.get(room_id)?.pre_steal_remove(player_id, entry_id).await?;
                self.game_state(room_id, player_id).await
            }
            Inbound::GamePreStealReorder { room_id, ordered_ids } => {
                self.registry.get(room_id)?.pre_steal_reorder(player_id, &ordered_ids).await?;
                self.game_state(room_id, player_id).await
            }
            Inbound::PracticeStart { difficulty, shared_puzzle, .. } => {
                let difficulty = difficulty.unwrap_or(1).clamp(1, 5);
                let puzzle = match shared_puzzle {
                    Some(encoded) => parse_shared_puzzle(&encoded)?,
                    None => {
                        let mut rng = StdRng::from_entropy();
                        practice::generate(difficulty, &self.dictionary, &mut rng)
                            .ok_or(Error::InvalidCustomPuzzle)?
                    }
                };
                self.practice_sessions.insert(
                    player_id,
                    PracticeSession { puzzle, difficulty, last_evaluation: None },
                );
                Ok(Outbound::PracticeState(self.practice_session_state(player_id)?))
            }
            Inbound::PracticeSubmit { word } => {
                let evaluation = {
                    let session = self.practice_sessions.get(&player_id).ok_or(Error::InvalidCustomPuzzle)?;
                    practice::evaluate(&session.puzzle, &word, &self.dictionary)
                };
                if let Some(mut session) = self.practice_sessions.get_mut(&player_id) {
                    session.last_evaluation = Some(evaluation);
                }
                Ok(Outbound::PracticeState(self.practice_session_state(player_id)?))
            }
            Inbound::PracticeSkip | Inbound::PracticeNext => {
                let (difficulty, puzzle) = {
                    let session = self.practice_sessions.get(&player_id).ok_or(Error::InvalidCustomPuzzle)?;
                    let mut rng = StdRng::from_entropy();
                    let puzzle = practice::generate(session.difficulty, &self.dictionary, &mut rng)
                        .ok_or(Error::InvalidCustomPuzzle)?;
                    (session.difficulty, puzzle)
                };
                self.practice_sessions.insert(player_id, PracticeSession { puzzle, difficulty, last_evaluation: None });
                Ok(Outbound::PracticeState(self.practice_session_state(player_id)?))
            }
            Inbound::PracticeExit => {
                self.practice_sessions.remove(&player_id);
                Ok(Outbound::SessionSelf {
                    player_id,
                    name: player_name.to_string(),
                    room_id: None,
                    session_token: None,
                })
            }
            Inbound::PracticeValidateCustom { shared_puzzle } => match parse_shared_puzzle(&shared_puzzle) {
                Ok(puzzle) => {
                    let options = practice::solve(&puzzle, &self.dictionary);
                    if options.is_empty() {
                        Err(Error::InvalidCustomPuzzle)
                    } else {
                        Ok(Outbound::SessionSelf {
                            player_id,
                            name: player_name.to_string(),
                            room_id: None,
                            session_token: None,
                        })
                    }
                }
                Err(err) => Err(err),
            },
            Inbound::PracticeSetDifficulty { difficulty } => {
                if let Some(mut session) = self.practice_sessions.get_mut(&player_id) {
                    session.difficulty = difficulty.clamp(1, 5);
                }
                Ok(Outbound::PracticeState(self.practice_session_state(player_id)?))
            }
            Inbound::ReplayAnalyzeStep { room_id, step_index } => {
                let room = self.registry.get(room_id)?.snapshot().await;
                let replay = room.game.as_ref().map(|g| &g.replay).ok_or(Error::RoomNotFound(room_id))?;
                let result = crate::replay::analyze::analyze_step(replay, step_index, &self.dictionary)?;
                Ok(analysis_outbound(result))
            }
            Inbound::ReplayAnalyzeImportedStep { replay_file, step_index } => {
                let file = ReplayFile::parse(&replay_file)?;
                let result = crate::replay::analyze::analyze_step(&file.replay, step_index, &self.dictionary)?;
                Ok(analysis_outbound(result))
            }
        }
    }

    async fn room_state(&self, room_id: RoomId) -> Result<Outbound> {
        let room = self.registry.get(room_id)?.snapshot().await;
        Ok(Outbound::RoomState { room })
    }

    async fn game_state(&self, room_id: RoomId, viewer_id: PlayerId) -> Result<Outbound> {
        let room = self.registry.get(room_id)?.snapshot().await;
        let is_spectator = !room.players().iter().any(|p| p.id == viewer_id);
        let kind = if is_spectator { ViewerKind::Spectator } else { ViewerKind::Player };
        match projection::project(&room, kind, viewer_id) {
            Some(state) => Ok(Outbound::GameState { state }),
            None => self.room_state(room_id).await,
        }
    }

    fn practice_session_state(&self, player_id: PlayerId) -> Result<PracticeState> {
        self.practice_sessions
            .get(&player_id)
            .map(|s| s.state())
            .ok_or(Error::InvalidCustomPuzzle)
    }
}

/// A "shared puzzle" string is just the center word, uppercased; anyone who types the same word
/// gets an identical puzzle, letting players compare scores on the same deal.
fn parse_shared_puzzle(encoded: &str) -> Result<Puzzle> {
    use crate::tiles::{Letter, Tile};

    let word = encoded.trim().to_uppercase();
    if word.len() < crate::constants::MIN_WORD_LENGTH {
        return Err(Error::InvalidCustomPuzzle);
    }
    let center_tiles: Option<Vec<Tile>> = word.chars().map(|c| Letter::from_char(c).map(Tile::new)).collect();
    let center_tiles = center_tiles.ok_or(Error::InvalidCustomPuzzle)?;
    Ok(Puzzle {
        center_tiles,
        existing_words: Vec::new(),
    })
}

fn analysis_outbound(result: AnalysisResult) -> Outbound {
    Outbound::ReplayAnalysis { result }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dictionary() -> Arc<Dictionary> {
        Arc::new(Dictionary::builtin())
    }

    #[tokio::test]
    async fn create_room_then_list() {
        let registry = Registry::new(dictionary());
        let dispatcher = Dispatcher::new(registry);
        let host = PlayerId::new();

        let outbound = dispatcher
            .dispatch(
                host,
                "Host",
                Inbound::RoomCreate {
                    name: "Game Night".to_string(),
                    is_public: true,
                    max_players: 4,
                    flip_timer_enabled: false,
                    flip_timer_seconds: 10,
                    claim_timer_seconds: 5,
                    pre_steal_enabled: true,
                },
            )
            .await;
        assert!(matches!(outbound, Outbound::RoomState { .. }));

        let listed = dispatcher.dispatch(host, "Host", Inbound::RoomList).await;
        match listed {
            Outbound::RoomList { rooms } => assert_eq!(rooms.len(), 1),
            other => panic!("expected room:list, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn practice_start_then_submit() {
        let registry = Registry::new(dictionary());
        let dispatcher = Dispatcher::new(registry);
        let player = PlayerId::new();

        let started = dispatcher
            .dispatch(
                player,
                "Alice",
                Inbound::PracticeStart {
                    difficulty: Some(1),
                    shared_puzzle: None,
                    timer_enabled: None,
                    timer_seconds: None,
                },
            )
            .await;
        assert!(matches!(started, Outbound::PracticeState(_)));

        let submitted = dispatcher.dispatch(player, "Alice", Inbound::PracticeSubmit { word: "zzzz".to_string() }).await;
        match submitted {
            Outbound::PracticeState(state) => assert!(state.last_evaluation.is_some()),
            other => panic!("expected practice:state, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_room_surfaces_as_error_event() {
        let registry = Registry::new(dictionary());
        let dispatcher = Dispatcher::new(registry);
        let outbound = dispatcher
            .dispatch(PlayerId::new(), "Ghost", Inbound::GameFlip { room_id: RoomId::new() })
            .await;
        assert!(matches!(outbound, Outbound::Error { .. }));
    }
}
