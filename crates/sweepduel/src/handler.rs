//! Per-connection handler: room join and message routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Read the room name from the request path
//!   2. Join the room through the registry → waiting / start
//!   3. Spawn a writer task that drains the player's outbound channel
//!   4. Loop: receive records → forward clicks to the room

use std::sync::Arc;

use sweepduel_protocol::{
    ClientMessage, Codec, PlayerId, Rejection, RoomId, ServerMessage,
};
use sweepduel_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::SweepduelError;
use crate::server::ServerState;

/// Drop guard that takes a player out of its room when the handler exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the async lock.
struct RoomGuard<C: Codec> {
    room_id: RoomId,
    player_id: PlayerId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for RoomGuard<C> {
    fn drop(&mut self) {
        let room_id = self.room_id.clone();
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut registry = state.registry.lock().await;
            if let Err(e) = registry.leave(&room_id, player_id).await {
                tracing::debug!(%room_id, %player_id, error = %e, "leave failed");
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), SweepduelError>
where
    C: Codec + Clone,
{
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    let player_id = PlayerId(conn_id.into_inner());
    tracing::debug!(%conn_id, path = conn.path(), "handling new connection");

    // --- Step 1: Room name ---
    let Some(room_id) = RoomId::from_path(conn.path()) else {
        tracing::info!(%conn_id, path = conn.path(), "no room in path");
        refuse(&conn, &state.codec, Rejection::InvalidRoom).await?;
        return Ok(());
    };

    // --- Step 2: Join ---
    let (outbound, rx) = mpsc::unbounded_channel();
    let joined = {
        let mut registry = state.registry.lock().await;
        registry.join(&room_id, player_id, outbound.clone()).await
    };
    let (room, index) = match joined {
        Ok(joined) => joined,
        Err(e) => {
            tracing::info!(%conn_id, %room_id, error = %e, "join refused");
            if let Some(reason) = e.rejection() {
                refuse(&conn, &state.codec, reason).await?;
            }
            return Err(e.into());
        }
    };
    let _guard = RoomGuard {
        room_id: room_id.clone(),
        player_id,
        state: Arc::clone(&state),
    };
    tracing::info!(%conn_id, %player_id, %room_id, index, "player connected");

    // --- Step 3: Writer ---
    tokio::spawn(write_loop(Arc::clone(&conn), rx, state.codec.clone()));

    // --- Step 4: Message loop ---
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%player_id, %room_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "malformed message");
                let _ = outbound
                    .send(ServerMessage::rejected(Rejection::MalformedMessage));
                continue;
            }
        };

        match msg {
            ClientMessage::Click { row, col } => {
                if let Err(e) = room.click(player_id, row, col).await {
                    tracing::info!(%player_id, error = %e, "room dropped player");
                    break;
                }
            }
        }
    }

    // _guard drops here → the room forgets this player, which closes the
    // outbound channel and ends the writer.
    Ok(())
}

/// Drains a player's outbound channel into the socket.
///
/// Stops at the first failed send. Dropping `rx` then makes the room's
/// next send to this player fail, and the room drops the player.
async fn write_loop<C: Codec>(
    conn: Arc<WebSocketConnection>,
    mut rx: mpsc::UnboundedReceiver<ServerMessage>,
    codec: C,
) {
    let conn_id = conn.id();
    while let Some(msg) = rx.recv().await {
        let bytes = match codec.encode(&msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "failed to encode message");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%conn_id, error = %e, "send failed, stopping writer");
            break;
        }
    }
    let _ = conn.close().await;
}

/// Sends an error record straight to the socket, then closes it.
/// Used before the player has a room to route through.
async fn refuse(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    reason: Rejection,
) -> Result<(), SweepduelError> {
    let bytes = codec.encode(&ServerMessage::rejected(reason))?;
    conn.send(&bytes).await?;
    conn.close().await?;
    Ok(())
}
