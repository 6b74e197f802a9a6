//! Integration tests for the Sweepduel server, handler, and full connection
//! flow over real WebSocket clients.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use sweepduel::prelude::*;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Starts a server on a random port and returns its address and registry.
async fn start_server(room: RoomConfig) -> (String, Arc<Mutex<RoomRegistry>>) {
    let server = SweepduelServer::builder()
        .bind("127.0.0.1:0")
        .room_config(room)
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();
    let registry = server.registry();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    (addr, registry)
}

fn seeded(seed: u64) -> RoomConfig {
    RoomConfig {
        board: BoardConfig {
            seed: Some(seed),
            ..BoardConfig::default()
        },
        ..RoomConfig::default()
    }
}

/// First seed whose default board has a zero in the top-left corner.
fn zero_corner_board() -> (u64, Board) {
    (0u64..)
        .map(|seed| {
            let config = BoardConfig {
                seed: Some(seed),
                ..BoardConfig::default()
            };
            (seed, config.generate())
        })
        .find(|(_, board)| board.cell(0, 0) == Some(Cell::Safe(0)))
        .expect("some seed has a zero corner")
}

fn first_mine(board: &Board) -> (usize, usize) {
    board.mine_positions().next().expect("board has mines")
}

async fn connect(addr: &str, path: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}{path}"))
        .await
        .expect("should connect");
    ws
}

async fn send(ws: &mut ClientWs, value: Value) {
    ws.send(Message::text(value.to_string()))
        .await
        .expect("send");
}

async fn click(ws: &mut ClientWs, row: i64, col: i64) {
    send(ws, json!({"type": "click", "row": row, "col": col})).await;
}

/// Next JSON record from the server, skipping control frames.
async fn recv(ws: &mut ClientWs) -> Value {
    loop {
        let msg = tokio::time::timeout(TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for server")
            .expect("stream ended")
            .expect("websocket error");
        match msg {
            Message::Text(text) => {
                return serde_json::from_str(text.as_str()).expect("json");
            }
            Message::Close(_) => panic!("server closed the connection"),
            _ => continue,
        }
    }
}

/// Waits until the server ends the connection.
async fn expect_closed(ws: &mut ClientWs) {
    loop {
        match tokio::time::timeout(TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for close")
        {
            None | Some(Err(_)) | Some(Ok(Message::Close(_))) => return,
            Some(Ok(_)) => continue,
        }
    }
}

/// Connects two players to `path` and consumes their waiting/start records.
async fn start_duel(addr: &str, path: &str) -> (ClientWs, ClientWs) {
    let mut a = connect(addr, path).await;
    assert_eq!(recv(&mut a).await, json!({"event": "waiting", "players": 1}));

    let mut b = connect(addr, path).await;
    assert_eq!(recv(&mut b).await, json!({"event": "waiting", "players": 2}));

    let start = json!({
        "type": "start",
        "event": "start",
        "rows": 10,
        "cols": 10,
        "mines": 10
    });
    assert_eq!(recv(&mut a).await, start);
    assert_eq!(recv(&mut b).await, start);
    (a, b)
}

/// Polls the registry until it holds `count` rooms.
async fn wait_for_rooms(registry: &Mutex<RoomRegistry>, count: usize) {
    for _ in 0..100 {
        if registry.lock().await.room_count() == count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("registry never reached {count} rooms");
}

// =========================================================================
// Builder
// =========================================================================

#[tokio::test]
async fn test_builder_rejects_unplayable_board() {
    let result = SweepduelServer::builder()
        .bind("127.0.0.1:0")
        .room_config(RoomConfig {
            board: BoardConfig {
                width: 3,
                height: 3,
                mines: 9,
                seed: None,
            },
            ..RoomConfig::default()
        })
        .build()
        .await;
    assert!(matches!(result, Err(SweepduelError::Room(_))));
}

#[tokio::test]
async fn test_builder_rejects_oversized_board_from_flags() {
    use clap::Parser;

    let width = usize::MAX.to_string();
    let args = ServerArgs::try_parse_from([
        "sweepduel-server",
        "--bind",
        "127.0.0.1:0",
        "--width",
        width.as_str(),
        "--height",
        "2",
    ])
    .expect("flags parse");
    let result = SweepduelServer::builder()
        .config(ServerConfig::from(args))
        .build()
        .await;

    let Err(err) = result else {
        panic!("an oversized board must be refused at start");
    };
    assert!(err.to_string().contains("too large"), "got {err}");
}

// =========================================================================
// Full flow
// =========================================================================

#[tokio::test]
async fn test_two_player_seeded_scenario() {
    let (seed, board) = zero_corner_board();
    let (mine_row, mine_col) = first_mine(&board);
    let (addr, registry) = start_server(seeded(seed)).await;
    let (mut a, mut b) = start_duel(&addr, "/ws/scenario").await;

    click(&mut a, 0, 0).await;
    let reveal = recv(&mut a).await;
    assert_eq!(reveal["type"], "reveal");
    let data = reveal["data"].as_array().expect("data array");
    assert!(data.len() > 1, "a zero corner opens a region");
    assert_eq!(reveal["found_count"], data.len());
    for cell in data {
        let (row, col, value) = (
            cell[0].as_u64().unwrap() as usize,
            cell[1].as_u64().unwrap() as usize,
            cell[2].as_u64().unwrap() as u8,
        );
        assert_eq!(board.cell(row, col), Some(Cell::Safe(value)));
    }

    click(&mut b, mine_row as i64, mine_col as i64).await;
    assert_eq!(recv(&mut b).await, json!({"type": "end", "result": "lose"}));
    assert_eq!(recv(&mut a).await, json!({"type": "end", "result": "win"}));

    a.close(None).await.unwrap();
    b.close(None).await.unwrap();
    wait_for_rooms(&registry, 0).await;
}

#[tokio::test]
async fn test_bare_room_path_is_accepted() {
    let (addr, _registry) = start_server(RoomConfig::default()).await;
    let mut a = connect(&addr, "/plain").await;
    assert_eq!(recv(&mut a).await, json!({"event": "waiting", "players": 1}));
}

#[tokio::test]
async fn test_clearing_board_wins_with_time() {
    let mut config = seeded(5);
    config.board = BoardConfig {
        width: 3,
        height: 3,
        mines: 1,
        seed: Some(5),
    };
    let board = config.board.generate();
    let (addr, _registry) = start_server(config).await;

    let mut a = connect(&addr, "/ws/small").await;
    recv(&mut a).await;
    let mut b = connect(&addr, "/ws/small").await;
    recv(&mut b).await;
    recv(&mut a).await;
    recv(&mut b).await;

    // Click every safe cell; re-clicks inside an opened region are no-ops.
    let safe: Vec<(usize, usize)> = board
        .cells()
        .filter(|(_, _, c)| !c.is_mine())
        .map(|(r, c, _)| (r, c))
        .collect();
    let mut found = 0;
    for (row, col) in safe {
        click(&mut a, row as i64, col as i64).await;
        let reveal = recv(&mut a).await;
        assert_eq!(reveal["type"], "reveal");
        found = reveal["found_count"].as_u64().unwrap();
        if found == 8 {
            break;
        }
    }
    assert_eq!(found, 8);

    let win = recv(&mut a).await;
    assert_eq!(win["result"], "win");
    assert!(win["time"].as_f64().is_some_and(|t| t >= 0.0));
    let lose = recv(&mut b).await;
    assert_eq!(lose["result"], "lose");
    assert!(lose["time"].is_number());
}

// =========================================================================
// Errors
// =========================================================================

#[tokio::test]
async fn test_invalid_coordinates_keep_connection_open() {
    let (seed, _) = zero_corner_board();
    let (addr, _registry) = start_server(seeded(seed)).await;
    let (mut a, _b) = start_duel(&addr, "/ws/bounds").await;

    click(&mut a, 10, 0).await;
    assert_eq!(
        recv(&mut a).await,
        json!({"type": "error", "message": "invalid coordinates"})
    );
    click(&mut a, -3, 2).await;
    assert_eq!(
        recv(&mut a).await,
        json!({"type": "error", "message": "invalid coordinates"})
    );
    send(&mut a, json!({"type": "click", "row": 1e20, "col": 0})).await;
    assert_eq!(
        recv(&mut a).await,
        json!({"type": "error", "message": "invalid coordinates"})
    );

    click(&mut a, 0, 0).await;
    assert_eq!(recv(&mut a).await["type"], "reveal");
}

#[tokio::test]
async fn test_malformed_message_keeps_connection_open() {
    let (seed, _) = zero_corner_board();
    let (addr, _registry) = start_server(seeded(seed)).await;
    let (mut a, _b) = start_duel(&addr, "/ws/garbage").await;

    a.send(Message::text("not json".to_string())).await.unwrap();
    assert_eq!(
        recv(&mut a).await,
        json!({"type": "error", "message": "malformed message"})
    );
    send(&mut a, json!({"type": "click", "row": 1})).await;
    assert_eq!(
        recv(&mut a).await,
        json!({"type": "error", "message": "malformed message"})
    );

    click(&mut a, 0, 0).await;
    assert_eq!(recv(&mut a).await["type"], "reveal");
}

#[tokio::test]
async fn test_click_before_second_player() {
    let (addr, _registry) = start_server(RoomConfig::default()).await;
    let mut a = connect(&addr, "/ws/alone").await;
    recv(&mut a).await;

    click(&mut a, 0, 0).await;
    assert_eq!(
        recv(&mut a).await,
        json!({"type": "error", "message": "game has not started"})
    );
}

#[tokio::test]
async fn test_path_without_room_is_refused() {
    let (addr, registry) = start_server(RoomConfig::default()).await;
    let mut ws = connect(&addr, "/ws/").await;

    assert_eq!(
        recv(&mut ws).await,
        json!({"type": "error", "message": "invalid room"})
    );
    expect_closed(&mut ws).await;
    assert_eq!(registry.lock().await.room_count(), 0);
}

#[tokio::test]
async fn test_third_player_is_refused() {
    let (addr, _registry) = start_server(RoomConfig::default()).await;
    let (_a, _b) = start_duel(&addr, "/ws/crowded").await;

    let mut c = connect(&addr, "/ws/crowded").await;
    assert_eq!(
        recv(&mut c).await,
        json!({"type": "error", "message": "room is full"})
    );
    expect_closed(&mut c).await;
}

// =========================================================================
// Disconnects
// =========================================================================

#[tokio::test]
async fn test_disconnect_does_not_stop_other_player() {
    let (seed, board) = zero_corner_board();
    let (mine_row, mine_col) = first_mine(&board);
    let (addr, registry) = start_server(seeded(seed)).await;
    let (a, mut b) = start_duel(&addr, "/ws/flaky").await;

    // A vanishes without a close handshake.
    drop(a);
    let room = RoomId("flaky".into());
    for _ in 0..100 {
        let info = registry.lock().await.room_info(&room).await.unwrap();
        if info.player_count == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    click(&mut b, 0, 0).await;
    assert_eq!(recv(&mut b).await["type"], "reveal");

    click(&mut b, mine_row as i64, mine_col as i64).await;
    assert_eq!(recv(&mut b).await, json!({"type": "end", "result": "lose"}));
}

#[tokio::test]
async fn test_empty_room_is_discarded_and_name_reusable() {
    let (addr, registry) = start_server(RoomConfig::default()).await;
    let (mut a, mut b) = start_duel(&addr, "/ws/cycle").await;
    assert_eq!(registry.lock().await.room_count(), 1);

    a.close(None).await.unwrap();
    b.close(None).await.unwrap();
    wait_for_rooms(&registry, 0).await;

    let mut c = connect(&addr, "/ws/cycle").await;
    assert_eq!(recv(&mut c).await, json!({"event": "waiting", "players": 1}));
}

#[tokio::test]
async fn test_rooms_do_not_interfere() {
    let (addr, registry) = start_server(RoomConfig::default()).await;
    let (_a, _b) = start_duel(&addr, "/ws/one").await;
    let (_c, _d) = start_duel(&addr, "/ws/two").await;

    let ids = registry.lock().await.room_ids();
    assert_eq!(ids, vec![RoomId("one".into()), RoomId("two".into())]);
}
