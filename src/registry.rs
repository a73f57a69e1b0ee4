//! Room registry & dispatcher (§4.11): a process-wide map from room id to room, with its own
//! serialization domain for creation, removal, and the public room list — independent of the
//! per-room serialization each `RoomHandle` provides for its own commands.
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::ids::{PlayerId, RoomId, SpectatorId};
use crate::room::types::{Room, RoomConfig, RoomMeta, RoomSummary};
use crate::room::RoomHandle;

/// The process-wide room directory. Cheap to clone — `DashMap` and the dictionary are both
/// already reference-counted/internally-synchronized, matching the "shared, read-only
/// dictionary; no cross-room mutable state" resource model of §5.
#[derive(Clone)]
pub struct Registry {
    rooms: Arc<DashMap<RoomId, RoomHandle>>,
    dictionary: Arc<Dictionary>,
}

impl Registry {
    pub fn new(dictionary: Arc<Dictionary>) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            dictionary,
        }
    }

    pub fn dictionary(&self) -> &Arc<Dictionary> {
        &self.dictionary
    }

    /// `room:create`: allocates a fresh room id and host id and registers the room in `Lobby`.
    pub fn create_room(
        &self,
        host_name: impl Into<String>,
        name: impl Into<String>,
        is_public: bool,
        code: Option<String>,
        config: RoomConfig,
        now: DateTime<Utc>,
    ) -> (RoomId, PlayerId) {
        let room_id = RoomId::new();
        let host_id = PlayerId::new();
        let meta = RoomMeta {
            id: room_id,
            name: name.into(),
            is_public,
            code,
            host_id,
            config,
            created_at: now,
        };
        let room = Room::new(meta, host_name);
        let handle = RoomHandle::new(room, self.dictionary.clone());
        self.rooms.insert(room_id, handle);
        (room_id, host_id)
    }

    pub fn get(&self, room_id: RoomId) -> Result<RoomHandle> {
        self.rooms
            .get(&room_id)
            .map(|entry| entry.value().clone())
            .ok_or(Error::RoomNotFound(room_id))
    }

    pub async fn join_room(&self, room_id: RoomId, name: impl Into<String>, code: Option<&str>) -> Result<PlayerId> {
        self.get(room_id)?.join(name, code).await
    }

    pub async fn spectate_room(&self, room_id: RoomId, name: impl Into<String>) -> Result<SpectatorId> {
        Ok(self.get(room_id)?.spectate(name).await)
    }

    pub async fn leave_room(&self, room_id: RoomId, player_id: PlayerId) -> Result<()> {
        let handle = self.get(room_id)?;
        handle.leave(player_id).await;
        self.remove_if_empty(room_id).await;
        Ok(())
    }

    pub async fn leave_spectate(&self, room_id: RoomId, spectator_id: SpectatorId) -> Result<()> {
        let handle = self.get(room_id)?;
        handle.leave_spectator(spectator_id).await;
        self.remove_if_empty(room_id).await;
        Ok(())
    }

    /// `room:list`: public rooms only, summarized.
    pub async fn list_public_rooms(&self) -> Vec<RoomSummary> {
        // Clone the handles out from under the shard locks first — holding a `DashMap` guard
        // across an `.await` would serialize unrelated rooms' snapshot calls on the same shard.
        let handles: Vec<RoomHandle> = self.rooms.iter().map(|entry| entry.value().clone()).collect();
        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            let room = handle.snapshot().await;
            if room.meta.is_public {
                summaries.push(room.summary());
            }
        }
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    async fn remove_if_empty(&self, room_id: RoomId) {
        let handle = match self.rooms.get(&room_id) {
            Some(entry) => entry.value().clone(),
            None => return,
        };
        let room = handle.snapshot().await;
        let empty = room.lobby_players.is_empty()
            && room.spectators.is_empty()
            && room.game.as_ref().map_or(true, |g| g.players.is_empty());
        if empty {
            self.rooms.remove(&room_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::types::RoomConfig;

    fn dictionary() -> Arc<Dictionary> {
        Arc::new(Dictionary::builtin())
    }

    #[tokio::test]
    async fn create_then_join_then_list() {
        let registry = Registry::new(dictionary());
        let config = RoomConfig::new(4, false, 10, 5, true).unwrap();
        let (room_id, host_id) = registry.create_room("Host", "Game Night", true, None, config, Utc::now());

        let guest_id = registry.join_room(room_id, "Guest", None).await.unwrap();
        assert_ne!(host_id, guest_id);

        let rooms = registry.list_public_rooms().await;
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].player_count, 2);
    }

    #[tokio::test]
    async fn room_is_removed_once_everyone_leaves() {
        let registry = Registry::new(dictionary());
        let config = RoomConfig::new(4, false, 10, 5, true).unwrap();
        let (room_id, host_id) = registry.create_room("Host", "Solo", false, None, config, Utc::now());
        registry.leave_room(room_id, host_id).await.unwrap();
        assert_eq!(registry.room_count(), 0);
    }

    #[tokio::test]
    async fn join_rejects_wrong_code() {
        let registry = Registry::new(dictionary());
        let config = RoomConfig::new(4, false, 10, 5, true).unwrap();
        let (room_id, _) =
            registry.create_room("Host", "Private", false, Some("SECRET".to_string()), config, Utc::now());
        let result = registry.join_room(room_id, "Guest", Some("WRONG")).await;
        assert!(matches!(result, Err(Error::WrongCode(_))));
    }
}
