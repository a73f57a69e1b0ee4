//! Viewer projection (§4.10): builds the serializable `GameState` a specific viewer is allowed
//! to see, hiding other players' pre-steal entries and bag tile identities.
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{PlayerId, RoomId};
use crate::replay::Replay;
use crate::room::types::{ClaimEventMeta, ClaimWindow, GameStatus, PendingFlip, PreStealEntry, PrecedenceOrder, Room, Word};
use crate::tiles::Tile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerKind {
    Player,
    Spectator,
}

/// One player as a given viewer is allowed to see them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub connected: bool,
    pub words: Vec<Word>,
    pub score: usize,
    pub pre_steal_entries: Vec<PreStealEntry>,
}

/// The outbound `game:state` payload (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub room_id: RoomId,
    pub status: GameStatus,
    pub center_tiles: Vec<Tile>,
    pub players: Vec<PlayerView>,
    pub turn_player_id: Option<PlayerId>,
    pub claim_window: Option<ClaimWindow>,
    pub pending_flip: Option<PendingFlip>,
    pub bag_count: usize,
    pub bag_letter_counts: HashMap<char, usize>,
    pub pre_steal_enabled: bool,
    pub precedence_order: PrecedenceOrder,
    pub last_claim_event: Option<ClaimEventMeta>,
    pub end_timer_ends_at: Option<DateTime<Utc>>,
    /// Present only once the game has ended — at that point pre-steal is no longer a secret
    /// from anyone, so the full recorded replay is included verbatim.
    pub replay: Option<Replay>,
}

/// Project `room`'s game for `viewer_id`, seen as either a participant or a spectator.
/// `None` if the room has no game yet (still in `Lobby`).
pub fn project(room: &Room, viewer_kind: ViewerKind, viewer_id: PlayerId) -> Option<GameState> {
    let game = room.game.as_ref()?;

    let players = game
        .players
        .iter()
        .map(|p| PlayerView {
            id: p.id,
            name: p.name.clone(),
            connected: p.connected,
            words: p.words.clone(),
            score: p.score(),
            pre_steal_entries: if viewer_kind == ViewerKind::Spectator || p.id == viewer_id {
                p.pre_steal_entries.clone()
            } else {
                Vec::new()
            },
        })
        .collect();

    let bag_letter_counts = game
        .bag
        .letters_remaining()
        .into_iter()
        .map(|(letter, count)| (letter.as_char(), count))
        .collect();

    Some(GameState {
        room_id: game.room_id,
        status: game.status,
        center_tiles: game.center_tiles.clone(),
        players,
        turn_player_id: game.turn_player_id(),
        claim_window: game.claim_window,
        pending_flip: game.pending_flip,
        bag_count: game.bag.count(),
        bag_letter_counts,
        pre_steal_enabled: game.pre_steal_enabled,
        precedence_order: game.precedence_order.clone(),
        last_claim_event: game.last_claim_event.clone(),
        end_timer_ends_at: game.end_timer_ends_at,
        replay: (game.status == GameStatus::Ended).then(|| game.replay.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::types::{PreStealEntry, RoomConfig, RoomMeta};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn epoch() -> DateTime<Utc> {
        DateTime::from_timestamp(0, 0).unwrap()
    }

    /// S7 — a player's own pre-steal list is visible to them and to spectators, never to others.
    #[test]
    fn s7_projection_hides_other_players_pre_steal() {
        let host_id = PlayerId::new();
        let meta = RoomMeta {
            id: RoomId::new(),
            name: "room".to_string(),
            is_public: true,
            code: None,
            host_id,
            config: RoomConfig::new(4, false, 10, 5, true).unwrap(),
            created_at: epoch(),
        };
        let mut room = Room::new(meta, "A");
        let b_id = room.join("B", None).unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        crate::room::state_machine::start(&mut room, host_id, &mut rng, epoch()).unwrap();

        let game = room.game.as_mut().unwrap();
        game.player_mut(host_id).unwrap().pre_steal_entries.push(PreStealEntry {
            id: crate::ids::PreStealEntryId::new(),
            trigger_letters: "S".to_string(),
            claim_word: "STARE".to_string(),
            created_at: epoch(),
        });
        game.player_mut(b_id).unwrap().pre_steal_entries.push(PreStealEntry {
            id: crate::ids::PreStealEntryId::new(),
            trigger_letters: "Z".to_string(),
            claim_word: "ZEBRA".to_string(),
            created_at: epoch(),
        });

        let as_b = project(&room, ViewerKind::Player, b_id).unwrap();
        let a_view = as_b.players.iter().find(|p| p.id == host_id).unwrap();
        let b_view = as_b.players.iter().find(|p| p.id == b_id).unwrap();
        assert!(a_view.pre_steal_entries.is_empty());
        assert_eq!(b_view.pre_steal_entries.len(), 1);

        let as_spectator = project(&room, ViewerKind::Spectator, PlayerId::new()).unwrap();
        assert!(as_spectator.players.iter().all(|p| !p.pre_steal_entries.is_empty()));
    }

    #[test]
    fn replay_hidden_until_game_ends() {
        let host_id = PlayerId::new();
        let meta = RoomMeta {
            id: RoomId::new(),
            name: "room".to_string(),
            is_public: true,
            code: None,
            host_id,
            config: RoomConfig::new(4, false, 10, 5, true).unwrap(),
            created_at: epoch(),
        };
        let mut room = Room::new(meta, "A");
        let mut rng = StdRng::seed_from_u64(2);
        crate::room::state_machine::start(&mut room, host_id, &mut rng, epoch()).unwrap();

        let mid_game = project(&room, ViewerKind::Player, host_id).unwrap();
        assert!(mid_game.replay.is_none());

        room.game.as_mut().unwrap().status = GameStatus::Ended;
        let ended = project(&room, ViewerKind::Player, host_id).unwrap();
        assert!(ended.replay.is_some());
    }
}
