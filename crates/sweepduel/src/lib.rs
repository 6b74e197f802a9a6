//! # Sweepduel
//!
//! Server for two-player competitive Minesweeper.
//!
//! Players connect over WebSocket to `/ws/<room>`. The first two players in
//! a room share one board; each reveals cells for themselves, and the game
//! ends when someone hits a mine or uncovers every safe cell.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sweepduel::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), SweepduelError> {
//!     let server = SweepduelServer::builder()
//!         .bind("0.0.0.0:8765")
//!         .build()
//!         .await?;
//!     server.run().await
//! }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{DEFAULT_BIND, ServerArgs, ServerConfig};
pub use error::SweepduelError;
pub use server::{SweepduelServer, SweepduelServerBuilder};

/// Convenient re-exports for running and testing a server.
pub mod prelude {
    pub use crate::{
        ServerArgs, ServerConfig, SweepduelError, SweepduelServer,
        SweepduelServerBuilder,
    };
    pub use sweepduel_board::{Board, BoardConfig, Cell};
    pub use sweepduel_protocol::{
        ClientMessage, GameMessage, LobbyEvent, Outcome, PlayerId, Rejection,
        RevealedCell, RoomId, ServerMessage,
    };
    pub use sweepduel_room::{RoomConfig, RoomInfo, RoomRegistry};
    pub use sweepduel_session::SessionState;
}
