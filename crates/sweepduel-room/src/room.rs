//! Room actor: an isolated Tokio task that owns one room's roster and game.
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel. Joins, leaves and clicks for one room are
//! handled one at a time, in arrival order, so a click can never race a
//! roster change or another click.

use sweepduel_protocol::{PlayerId, Rejection, RoomId, ServerMessage};
use sweepduel_session::{
    ClickOutcome, GameSession, PlayerResult, SessionError, SessionState,
};
use tokio::sync::{mpsc, oneshot};

use crate::{RoomConfig, RoomError};

/// Channel sender for delivering outbound messages to a player.
///
/// Unbounded, so the actor never waits on a slow socket. A send only fails
/// once the receiving side (the connection's writer task) is gone.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in each variant is a reply channel: the caller
/// sends a command and waits for the response on it.
pub(crate) enum RoomCommand {
    /// Add a player to the roster. Replies with the player's index.
    Join {
        player_id: PlayerId,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<usize, RoomError>>,
    },

    /// Remove a player. Replies with how many players remain.
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<usize>,
    },

    /// Resolve a click. The reply only says whether the player is still in
    /// the room; what the click did goes out on the player channels.
    Click {
        player_id: PlayerId,
        row: i64,
        col: i64,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Request a snapshot of the room.
    GetInfo { reply: oneshot::Sender<RoomInfo> },

    /// Shut down the room.
    Shutdown,
}

/// A snapshot of room metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    /// The room's name.
    pub room_id: RoomId,
    /// Lifecycle state of the room's game. `WaitingForPlayers` until the
    /// session starts.
    pub state: SessionState,
    /// Number of players currently in the room.
    pub player_count: usize,
    /// Maximum players allowed.
    pub max_players: usize,
}

/// Handle to a running room actor. Used to send commands to it.
///
/// Cheap to clone: it's just an `mpsc::Sender` wrapper. The
/// [`RoomRegistry`](crate::RoomRegistry) holds one of these per room and
/// hands clones to the connections that join.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's name.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Sends a join request to the room.
    pub(crate) async fn join(
        &self,
        player_id: PlayerId,
        sender: PlayerSender,
    ) -> Result<usize, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.request(RoomCommand::Join {
            player_id,
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Sends a leave request to the room.
    ///
    /// Leaving twice is harmless; the reply is the remaining player count
    /// either way.
    pub(crate) async fn leave(
        &self,
        player_id: PlayerId,
    ) -> Result<usize, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.request(RoomCommand::Leave {
            player_id,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Sends a click from `player_id` to the room.
    ///
    /// # Errors
    /// [`RoomError::NotInRoom`] if the player has been dropped from the
    /// roster, e.g. because its outbound channel closed.
    pub async fn click(
        &self,
        player_id: PlayerId,
        row: i64,
        col: i64,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.request(RoomCommand::Click {
            player_id,
            row,
            col,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Requests the current room info.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.request(RoomCommand::GetInfo { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Tells the room to shut down.
    pub(crate) async fn shutdown(&self) -> Result<(), RoomError> {
        self.request(RoomCommand::Shutdown).await
    }

    async fn request(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender.send(cmd).await.map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.room_id.clone())
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    config: RoomConfig,
    /// Connected players in join order, with their outbound channels.
    roster: Vec<(PlayerId, PlayerSender)>,
    /// Created when the roster reaches the activation threshold.
    session: Option<GameSession>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player_id,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(player_id, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { player_id, reply } => {
                    let remaining = self.handle_leave(player_id);
                    let _ = reply.send(remaining);
                }
                RoomCommand::Click {
                    player_id,
                    row,
                    col,
                    reply,
                } => {
                    if self.is_member(player_id) {
                        let _ = reply.send(Ok(()));
                        self.handle_click(player_id, row, col);
                    } else {
                        let _ = reply.send(Err(RoomError::NotInRoom(
                            player_id,
                            self.room_id.clone(),
                        )));
                    }
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room_id = %self.room_id, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room_id = %self.room_id, "room actor stopped");
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        sender: PlayerSender,
    ) -> Result<usize, RoomError> {
        let state = self.state();
        if !state.is_joinable() {
            return Err(RoomError::InvalidState(self.room_id.clone(), state));
        }
        if self.roster.len() >= self.config.max_players {
            return Err(RoomError::RoomFull(self.room_id.clone()));
        }

        self.roster.push((player_id, sender));
        let index = self.roster.len() - 1;
        tracing::info!(
            room_id = %self.room_id,
            %player_id,
            index,
            players = self.roster.len(),
            "player joined"
        );

        self.send_to(player_id, ServerMessage::waiting(self.roster.len()));

        if self.roster.len() == self.config.activation_threshold {
            self.start_game();
        }

        Ok(index)
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> usize {
        if self.remove(player_id) {
            tracing::info!(
                room_id = %self.room_id,
                %player_id,
                players = self.roster.len(),
                "player left"
            );
        }
        self.roster.len()
    }

    fn handle_click(&mut self, player_id: PlayerId, row: i64, col: i64) {
        let Some(session) = self.session.as_mut() else {
            self.send_to(player_id, ServerMessage::rejected(Rejection::NotStarted));
            return;
        };

        match session.resolve_click(player_id, row, col) {
            Ok(outcome) => self.deliver(player_id, outcome),
            Err(err) => {
                tracing::debug!(
                    room_id = %self.room_id,
                    %player_id,
                    %err,
                    "click refused"
                );
                self.send_to(player_id, ServerMessage::rejected(rejection_for(&err)));
            }
        }
    }

    /// Creates the session and tells everyone the board's shape.
    fn start_game(&mut self) {
        let players: Vec<PlayerId> = self.roster.iter().map(|(id, _)| *id).collect();
        let session = GameSession::start(&self.config.board, &players);
        let board = session.board();
        let start = ServerMessage::start(board.height(), board.width(), board.mines());
        self.session = Some(session);

        tracing::info!(
            room_id = %self.room_id,
            players = players.len(),
            "game started"
        );
        self.broadcast(&start);
    }

    /// Sends the clicker its reveal batch, then each decided player its own
    /// result.
    fn deliver(&mut self, clicker: PlayerId, outcome: ClickOutcome) {
        let results = match outcome {
            ClickOutcome::Revealed {
                cells,
                found_count,
                results,
            } => {
                self.send_to(clicker, ServerMessage::reveal(cells, found_count));
                results
            }
            ClickOutcome::Detonated { results } => results,
        };

        for PlayerResult {
            player,
            outcome,
            time,
        } in results
        {
            tracing::info!(room_id = %self.room_id, %player, %outcome, ?time, "result decided");
            self.send_to(player, ServerMessage::end(outcome, time));
        }

        if self.state() == SessionState::Finished {
            tracing::info!(room_id = %self.room_id, "game finished");
        }
    }

    /// Sends `msg` to every player in the roster. Players whose channel has
    /// closed are dropped and the rest still get the message.
    fn broadcast(&mut self, msg: &ServerMessage) {
        let failed: Vec<PlayerId> = self
            .roster
            .iter()
            .filter(|(_, sender)| sender.send(msg.clone()).is_err())
            .map(|(id, _)| *id)
            .collect();
        for player_id in failed {
            self.drop_unreachable(player_id);
        }
    }

    /// Sends `msg` to one player, dropping it from the roster if its
    /// channel has closed.
    fn send_to(&mut self, player_id: PlayerId, msg: ServerMessage) {
        let Some((_, sender)) = self.roster.iter().find(|(id, _)| *id == player_id)
        else {
            return;
        };
        if sender.send(msg).is_err() {
            self.drop_unreachable(player_id);
        }
    }

    fn drop_unreachable(&mut self, player_id: PlayerId) {
        if self.remove(player_id) {
            tracing::warn!(
                room_id = %self.room_id,
                %player_id,
                players = self.roster.len(),
                "outbound channel closed, dropping player"
            );
        }
    }

    /// Takes a player out of the roster and, if a game is running, out of
    /// play. Returns `false` if the player was not in the roster.
    fn remove(&mut self, player_id: PlayerId) -> bool {
        let before = self.roster.len();
        self.roster.retain(|(id, _)| *id != player_id);
        if self.roster.len() == before {
            return false;
        }
        if let Some(session) = &mut self.session {
            session.remove_player(player_id);
        }
        true
    }

    fn is_member(&self, player_id: PlayerId) -> bool {
        self.roster.iter().any(|(id, _)| *id == player_id)
    }

    fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map_or(SessionState::WaitingForPlayers, GameSession::state)
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id.clone(),
            state: self.state(),
            player_count: self.roster.len(),
            max_players: self.config.max_players,
        }
    }
}

/// What the clicker is told when the session refuses a click.
fn rejection_for(err: &SessionError) -> Rejection {
    match err {
        SessionError::InvalidCoordinate { .. } => Rejection::InvalidCoordinates,
        SessionError::NotInProgress(_) | SessionError::UnknownPlayer(_) => {
            Rejection::GameOver
        }
    }
}

/// Spawns a new room actor task and returns a handle to communicate with it.
///
/// `channel_size` controls backpressure: if the channel fills up, senders
/// will wait (bounded channel).
pub(crate) fn spawn_room(
    room_id: RoomId,
    config: RoomConfig,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        room_id: room_id.clone(),
        config,
        roster: Vec::new(),
        session: None,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
