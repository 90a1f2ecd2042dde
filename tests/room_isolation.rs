//! Rooms are independent games: separate boards, separate color slots,
//! separate broadcast domains, and a lifecycle tied to their members.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use checkers_server::config::ServerConfig;
use checkers_server::gateway::{ClientRequest, Gateway, GatewayError, ServerEvent};
use checkers_server::storage::MemoryStore;
use checkers_server::types::Color;

fn gateway_with(config: ServerConfig) -> Gateway {
    let store = Arc::new(MemoryStore::new());
    Gateway::new(config, store.clone(), store).unwrap()
}

fn drain(rx: &mut UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn join(game_id: &str, name: &str) -> ClientRequest {
    ClientRequest::Join {
        game_id: game_id.to_string(),
        player_name: name.to_string(),
    }
}

#[tokio::test]
async fn rooms_have_independent_games_and_colors() {
    let gateway = gateway_with(ServerConfig::default());
    let (a, mut rx_a) = gateway.connect();
    let (b, mut rx_b) = gateway.connect();
    gateway.handle(a, join("north", "alice")).await.unwrap();
    gateway.handle(b, join("south", "bob")).await.unwrap();
    assert_eq!(gateway.room_count(), 2);
    drain(&mut rx_a);
    drain(&mut rx_b);

    // Red is free in both rooms at once.
    for id in [a, b] {
        gateway
            .handle(id, ClientRequest::ChooseColor { color: Color::Red })
            .await
            .unwrap();
    }
    assert!(drain(&mut rx_a)
        .iter()
        .any(|e| *e == ServerEvent::ColorAssigned { color: Color::Red }));
    assert!(drain(&mut rx_b)
        .iter()
        .any(|e| *e == ServerEvent::ColorAssigned { color: Color::Red }));

    // A move in one room never reaches the other.
    gateway
        .handle(
            a,
            ClientRequest::Move {
                from_x: 2,
                from_y: 1,
                to_x: 3,
                to_y: 2,
            },
        )
        .await
        .unwrap();
    assert!(!drain(&mut rx_a).is_empty());
    assert!(drain(&mut rx_b).is_empty());
}

#[tokio::test]
async fn empty_rooms_are_destroyed() {
    let gateway = gateway_with(ServerConfig::default());
    let (a, _rx_a) = gateway.connect();
    let (b, _rx_b) = gateway.connect();
    gateway.handle(a, join("table", "alice")).await.unwrap();
    gateway.handle(b, join("table", "bob")).await.unwrap();
    assert_eq!(gateway.room_count(), 1);

    gateway.disconnect(a);
    assert_eq!(gateway.room_count(), 1);
    gateway.disconnect(b);
    assert_eq!(gateway.room_count(), 0);
    assert_eq!(gateway.connection_count(), 0);
}

#[tokio::test]
async fn rejoining_moves_the_connection() {
    let gateway = gateway_with(ServerConfig::default());
    let (a, mut rx_a) = gateway.connect();
    let (b, mut rx_b) = gateway.connect();
    gateway.handle(a, join("north", "alice")).await.unwrap();
    gateway.handle(b, join("north", "bob")).await.unwrap();
    gateway
        .handle(a, ClientRequest::ChooseColor { color: Color::Red })
        .await
        .unwrap();
    drain(&mut rx_a);
    drain(&mut rx_b);

    // Moving to another room releases the old color and leaves the old
    // room with its remaining member.
    gateway.handle(a, join("south", "alice")).await.unwrap();
    assert_eq!(gateway.room_count(), 2);
    assert!(drain(&mut rx_b)
        .iter()
        .any(|e| *e == ServerEvent::ColorReleased { color: Color::Red }));

    // The old room's red slot is free again.
    gateway
        .handle(b, ClientRequest::ChooseColor { color: Color::Red })
        .await
        .unwrap();
    assert!(drain(&mut rx_b)
        .iter()
        .any(|e| *e == ServerEvent::ColorAssigned { color: Color::Red }));

    // Leaving "south" as its only member destroys it.
    gateway.disconnect(a);
    assert_eq!(gateway.room_count(), 1);
}

#[tokio::test]
async fn rejoining_the_same_room_keeps_state() {
    let gateway = gateway_with(ServerConfig::default());
    let (a, mut rx_a) = gateway.connect();
    gateway.handle(a, join("north", "alice")).await.unwrap();
    gateway
        .handle(a, ClientRequest::ChooseColor { color: Color::Red })
        .await
        .unwrap();
    gateway
        .handle(
            a,
            ClientRequest::Move {
                from_x: 2,
                from_y: 1,
                to_x: 3,
                to_y: 2,
            },
        )
        .await
        .unwrap();
    drain(&mut rx_a);

    // A second join of the same room is a snapshot refresh, not a
    // departure: the game keeps going and the color is still held.
    gateway.handle(a, join("north", "alice")).await.unwrap();
    assert_eq!(gateway.room_count(), 1);
    let events = drain(&mut rx_a);
    assert!(events.iter().any(|e| matches!(
        e,
        ServerEvent::UpdateBoard { board } if *board != checkers_server::types::Board::standard()
    )));
    assert!(!events
        .iter()
        .any(|e| matches!(e, ServerEvent::ColorReleased { .. })));
    assert!(events.iter().any(|e| matches!(
        e,
        ServerEvent::PlayerColors { colors } if colors.get(&a) == Some(&Color::Red)
    )));
}

#[tokio::test]
async fn room_limit_is_enforced() {
    let gateway = gateway_with(ServerConfig {
        max_rooms: 1,
        ..Default::default()
    });
    let (a, _rx_a) = gateway.connect();
    let (b, _rx_b) = gateway.connect();
    gateway.handle(a, join("north", "alice")).await.unwrap();

    let err = gateway.handle(b, join("south", "bob")).await.unwrap_err();
    assert!(matches!(err, GatewayError::RoomLimitReached { max: 1 }));

    // Joining the existing room is still fine.
    gateway.handle(b, join("north", "bob")).await.unwrap();
    assert_eq!(gateway.room_count(), 1);
}

#[tokio::test]
async fn oversized_names_are_refused() {
    let gateway = gateway_with(ServerConfig {
        max_name_length: 8,
        ..Default::default()
    });
    let (a, _rx_a) = gateway.connect();

    let err = gateway
        .handle(a, join("table", "a-name-well-past-the-limit"))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::NameTooLong { max: 8 }));

    gateway.handle(a, join("table", "short")).await.unwrap();
}
