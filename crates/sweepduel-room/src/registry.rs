//! Room registry: creates, tracks, and discards rooms by name.

use std::collections::HashMap;

use sweepduel_protocol::{PlayerId, RoomId};

use crate::room::spawn_room;
use crate::{PlayerSender, RoomConfig, RoomError, RoomHandle, RoomInfo};

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// All live rooms, keyed by name.
///
/// A room exists from its first join until its roster empties. The
/// registry is owned by the server state behind a `tokio::sync::Mutex`, so
/// creating and discarding entries never interleaves with a join.
#[derive(Debug)]
pub struct RoomRegistry {
    config: RoomConfig,
    rooms: HashMap<RoomId, RoomHandle>,
}

impl RoomRegistry {
    /// Creates an empty registry whose rooms all use `config`.
    pub fn new(config: RoomConfig) -> Self {
        Self {
            config,
            rooms: HashMap::new(),
        }
    }

    /// Adds a player to the named room, creating the room if needed.
    ///
    /// Returns a handle to the room and the player's 0-based index in it.
    /// The player is sent a waiting notice on `sender`; if this join
    /// completes the roster, everyone is sent the start message.
    ///
    /// # Errors
    /// [`RoomError::RoomFull`] or [`RoomError::InvalidState`] when the room
    /// takes no more players.
    pub async fn join(
        &mut self,
        room_id: &RoomId,
        player_id: PlayerId,
        sender: PlayerSender,
    ) -> Result<(RoomHandle, usize), RoomError> {
        let handle = match self.rooms.get(room_id) {
            Some(handle) => handle.clone(),
            None => self.create_room(room_id),
        };

        match handle.join(player_id, sender).await {
            Ok(index) => Ok((handle, index)),
            Err(err @ RoomError::Unavailable(_)) => {
                // The actor is gone; forget it so the next join starts fresh.
                self.rooms.remove(room_id);
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Removes a player from the named room. Once the room has nobody
    /// left, its actor is shut down and the entry discarded.
    ///
    /// Returns the number of players still in the room. Calling this for a
    /// player the room already dropped is fine.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if no such room exists.
    pub async fn leave(
        &mut self,
        room_id: &RoomId,
        player_id: PlayerId,
    ) -> Result<usize, RoomError> {
        let handle = self
            .rooms
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        let remaining = match handle.leave(player_id).await {
            Ok(remaining) => remaining,
            Err(err) => {
                tracing::warn!(%room_id, %player_id, %err, "leave failed, discarding room");
                0
            }
        };

        if remaining == 0 {
            self.destroy_room(room_id).await;
        }
        Ok(remaining)
    }

    /// Returns info about a specific room.
    pub async fn room_info(
        &self,
        room_id: &RoomId,
    ) -> Result<RoomInfo, RoomError> {
        let handle = self
            .rooms
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        handle.info().await
    }

    /// Returns the number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Lists live room names, sorted.
    pub fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<RoomId> = self.rooms.keys().cloned().collect();
        ids.sort();
        ids
    }

    fn create_room(&mut self, room_id: &RoomId) -> RoomHandle {
        let handle = spawn_room(
            room_id.clone(),
            self.config.clone(),
            DEFAULT_CHANNEL_SIZE,
        );
        self.rooms.insert(room_id.clone(), handle.clone());
        tracing::info!(%room_id, "room created");
        handle
    }

    async fn destroy_room(&mut self, room_id: &RoomId) {
        if let Some(handle) = self.rooms.remove(room_id) {
            let _ = handle.shutdown().await;
            tracing::info!(%room_id, "room destroyed");
        }
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}
