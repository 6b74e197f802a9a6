//! Server configuration and its command-line overrides.

use clap::Parser;
use serde::{Deserialize, Serialize};
use sweepduel_board::BoardConfig;
use sweepduel_room::RoomConfig;

/// Address the server listens on when nothing else is configured.
pub const DEFAULT_BIND: &str = "127.0.0.1:8765";

/// Everything needed to start a server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `0.0.0.0:8765`.
    pub bind: String,

    /// Settings for every room the server creates.
    pub room: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            room: RoomConfig::default(),
        }
    }
}

/// Command-line arguments for `sweepduel-server`.
///
/// Each flag can also come from its `SWEEPDUEL_*` environment variable.
/// Board flags left unset keep the 10x10 board with 10 mines.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "sweepduel-server", version, about = "Two-player competitive Minesweeper over WebSocket")]
pub struct ServerArgs {
    /// Server listen address, "IP:PORT"
    #[arg(short, long, env = "SWEEPDUEL_BIND", default_value = DEFAULT_BIND)]
    pub bind: String,

    /// Number of board columns
    #[arg(long, env = "SWEEPDUEL_WIDTH")]
    pub width: Option<usize>,

    /// Number of board rows
    #[arg(long, env = "SWEEPDUEL_HEIGHT")]
    pub height: Option<usize>,

    /// Number of mines per board
    #[arg(long, env = "SWEEPDUEL_MINES")]
    pub mines: Option<usize>,

    /// Fixed seed for every board; a fresh one is drawn per game otherwise
    #[arg(long, env = "SWEEPDUEL_SEED")]
    pub seed: Option<u64>,
}

impl From<ServerArgs> for ServerConfig {
    fn from(args: ServerArgs) -> Self {
        let defaults = BoardConfig::default();
        Self {
            bind: args.bind,
            room: RoomConfig {
                board: BoardConfig {
                    width: args.width.unwrap_or(defaults.width),
                    height: args.height.unwrap_or(defaults.height),
                    mines: args.mines.unwrap_or(defaults.mines),
                    seed: args.seed,
                },
                ..RoomConfig::default()
            },
        }
    }
}
