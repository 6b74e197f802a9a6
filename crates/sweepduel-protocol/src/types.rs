//! Core protocol types for Sweepduel's wire format.
//!
//! Every type here is something that gets serialized, sent over the
//! network, and deserialized on the other side. The JSON shapes are fixed by
//! the existing client, so most of the serde attributes below exist to
//! reproduce those shapes exactly.

use std::fmt;

use serde::de::{self, Unexpected, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player (one per connection).
///
/// Newtype over `u64` so a player id can't be confused with a row, a
/// column or a count. `#[serde(transparent)]` makes `PlayerId(42)`
/// serialize as plain `42`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// The name of a room, taken from the connection path.
///
/// Rooms are addressed by whatever string the client puts after `/ws/`,
/// so two clients that connect to `/ws/friday` end up playing each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Extracts a room name from a request path.
    ///
    /// Accepts `/ws/<room>` and `/<room>`. Returns `None` when the path
    /// names no room or has extra segments.
    ///
    /// ```rust
    /// use sweepduel_protocol::RoomId;
    ///
    /// assert_eq!(RoomId::from_path("/ws/lobby"), Some(RoomId("lobby".into())));
    /// assert_eq!(RoomId::from_path("/lobby"), Some(RoomId("lobby".into())));
    /// assert_eq!(RoomId::from_path("/ws/"), None);
    /// ```
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim_start_matches('/');
        let name = trimmed.strip_prefix("ws/").unwrap_or(trimmed);
        if name.is_empty() || name == "ws" || name.contains('/') {
            return None;
        }
        Some(Self(name.to_owned()))
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Records a client may send.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON:
///   `{ "type": "click", "row": 3, "col": 4 }`
///
/// Coordinates are signed so that a client sending `-1` gets an
/// "invalid coordinates" answer instead of a decode failure. For the same
/// reason integers beyond `i64` are clamped rather than refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Reveal the cell at `(row, col)`.
    Click {
        #[serde(deserialize_with = "coordinate")]
        row: i64,
        #[serde(deserialize_with = "coordinate")]
        col: i64,
    },
}

/// Reads any JSON integer as an `i64`, saturating at the bounds.
///
/// Integral floats such as `3.0` or `1e20` count as integers; fractional
/// values and non-numbers are still decode errors.
fn coordinate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    struct CoordinateVisitor;

    impl Visitor<'_> for CoordinateVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer coordinate")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            Ok(i64::try_from(v).unwrap_or(i64::MAX))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
            if v.fract() == 0.0 {
                // `as` saturates at the i64 bounds.
                Ok(v as i64)
            } else {
                Err(E::invalid_type(Unexpected::Float(v), &self))
            }
        }
    }

    deserializer.deserialize_any(CoordinateVisitor)
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// The final result a player receives when a game ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Lose,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Win => write!(f, "win"),
            Self::Lose => write!(f, "lose"),
        }
    }
}

/// One disclosed cell: `[row, col, value]` on the wire.
///
/// `value` is the number of neighbouring mines. Mines are never sent in a
/// reveal batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(usize, usize, u8)", into = "(usize, usize, u8)")]
pub struct RevealedCell {
    pub row: usize,
    pub col: usize,
    pub value: u8,
}

impl From<(usize, usize, u8)> for RevealedCell {
    fn from((row, col, value): (usize, usize, u8)) -> Self {
        Self { row, col, value }
    }
}

impl From<RevealedCell> for (usize, usize, u8) {
    fn from(cell: RevealedCell) -> Self {
        (cell.row, cell.col, cell.value)
    }
}

/// Why a client request was refused.
///
/// Each variant maps to the human-readable `message` of an `error` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Row or column outside the board.
    InvalidCoordinates,
    /// The record could not be decoded.
    MalformedMessage,
    /// The room is still waiting for players.
    NotStarted,
    /// The game has ended, or the sender has already been eliminated.
    GameOver,
    /// The connection path names no room.
    InvalidRoom,
    /// The room already has all the players it takes.
    RoomFull,
}

impl Rejection {
    /// The message text sent to the client.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidCoordinates => "invalid coordinates",
            Self::MalformedMessage => "malformed message",
            Self::NotStarted => "game has not started",
            Self::GameOver => "game is over",
            Self::InvalidRoom => "invalid room",
            Self::RoomFull => "room is full",
        }
    }
}

/// Game records, discriminated by a `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GameMessage {
    /// The session is active. Mine positions are never included.
    Start {
        rows: usize,
        cols: usize,
        mines: usize,
    },

    /// Cells newly disclosed by the recipient's own click.
    Reveal {
        data: Vec<RevealedCell>,
        found_count: usize,
    },

    /// The recipient's terminal result. `time` is the elapsed game time in
    /// seconds and is omitted entirely when there is none.
    End {
        result: Outcome,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time: Option<f64>,
    },

    /// A request from the recipient was refused.
    Error { message: String },
}

/// Lobby notices, discriminated by an `event` field.
///
/// The existing client reads the waiting notice from `event` rather than
/// `type`, so it lives in its own enum with its own tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum LobbyEvent {
    /// The room has `players` connections and is not yet active.
    Waiting { players: usize },
}

/// Anything the server sends to a client.
///
/// `#[serde(untagged)]` means the wrapper itself leaves no trace in the
/// JSON: a `ServerMessage::Game(..)` serializes exactly like the inner
/// [`GameMessage`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerMessage {
    #[serde(serialize_with = "game_record")]
    Game(GameMessage),
    Lobby(LobbyEvent),
}

/// Serializes a game record, adding `"event":"start"` to the start record.
///
/// The existing client waits for the start notice under `event`, the same
/// key it reads the waiting notice from.
fn game_record<S: Serializer>(msg: &GameMessage, serializer: S) -> Result<S::Ok, S::Error> {
    match *msg {
        GameMessage::Start { rows, cols, mines } => {
            let mut map = serializer.serialize_map(Some(5))?;
            map.serialize_entry("type", "start")?;
            map.serialize_entry("event", "start")?;
            map.serialize_entry("rows", &rows)?;
            map.serialize_entry("cols", &cols)?;
            map.serialize_entry("mines", &mines)?;
            map.end()
        }
        _ => msg.serialize(serializer),
    }
}

impl ServerMessage {
    /// `{"type":"start", "event":"start", ...}`
    pub fn start(rows: usize, cols: usize, mines: usize) -> Self {
        Self::Game(GameMessage::Start { rows, cols, mines })
    }

    /// `{"event":"waiting", "players": n}`
    pub fn waiting(players: usize) -> Self {
        Self::Lobby(LobbyEvent::Waiting { players })
    }

    /// `{"type":"reveal", "data": [...], "found_count": n}`
    pub fn reveal(data: Vec<RevealedCell>, found_count: usize) -> Self {
        Self::Game(GameMessage::Reveal { data, found_count })
    }

    /// `{"type":"end", "result": ..., "time": ...}`
    pub fn end(result: Outcome, time: Option<f64>) -> Self {
        Self::Game(GameMessage::End { result, time })
    }

    /// `{"type":"error", "message": ...}`
    pub fn rejected(reason: Rejection) -> Self {
        Self::Game(GameMessage::Error {
            message: reason.as_str().to_owned(),
        })
    }
}

impl From<GameMessage> for ServerMessage {
    fn from(msg: GameMessage) -> Self {
        Self::Game(msg)
    }
}

impl From<LobbyEvent> for ServerMessage {
    fn from(event: LobbyEvent) -> Self {
        Self::Lobby(event)
    }
}

// =========================================================================
// Tests
// =========================================================================
