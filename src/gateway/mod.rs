//! The session gateway: routes client requests to rooms and fans the
//! resulting events back out to connections.
//!
//! Connections attach with [`Gateway::connect`], which hands back an
//! unbounded event receiver; the host binds that pair to its transport.
//! Requests are serviced by [`Gateway::handle`].
//!
//! Expected game outcomes (illegal moves, lost color races, bad
//! credentials) are delivered as [`ServerEvent`]s to the requesting
//! connection only. [`GatewayError`] is reserved for protocol misuse the
//! wire format has no event for, such as moving before joining a room.
//!
//! Locking: each room's game, registry and member set sit behind one
//! mutex, held only for the synchronous validate-and-apply step. Storage
//! calls are awaited after every lock is released, so a slow store cannot
//! stall gameplay, and broadcasts are fire-and-forget sends.

pub mod protocol;

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, ServerConfig};
use crate::session::Room;
use crate::storage::{LoginOutcome, PlayerStore, StatsStore};
use crate::types::{Board, Color, ConnectionId, RoomId, Square};

pub use protocol::{ClientRequest, ServerEvent};

/// Protocol misuse that has no wire event; reported to the transport
/// adapter instead of the client.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The connection id is not attached to this gateway.
    #[error("unknown connection {connection}")]
    UnknownConnection {
        /// The offending id.
        connection: ConnectionId,
    },
    /// The operation needs a room but the connection has not joined one.
    #[error("connection has not joined a game")]
    NotInRoom,
    /// Creating another room would exceed the configured limit.
    #[error("room limit reached: {max}")]
    RoomLimitReached {
        /// The configured limit.
        max: usize,
    },
    /// The supplied name is longer than the configured maximum.
    #[error("player name exceeds {max} bytes")]
    NameTooLong {
        /// The configured limit.
        max: usize,
    },
}

struct ConnectionEntry {
    sender: mpsc::UnboundedSender<ServerEvent>,
    room: Option<RoomId>,
}

/// The real-time protocol handler. One instance serves every room in the
/// process.
pub struct Gateway {
    config: ServerConfig,
    connections: DashMap<ConnectionId, ConnectionEntry>,
    rooms: DashMap<RoomId, Arc<Room>>,
    roster: Mutex<HashMap<ConnectionId, String>>,
    players: Arc<dyn PlayerStore>,
    stats: Arc<dyn StatsStore>,
}

/// What a move request resolved to under the room lock.
enum MoveReply {
    NoColor,
    Invalid,
    Applied {
        board: Board,
        announced: Option<Color>,
        winner: Option<Color>,
        members: Vec<ConnectionId>,
    },
}

impl Gateway {
    /// Create a gateway over the given stores. Fails when the
    /// configuration does not validate.
    pub fn new(
        config: ServerConfig,
        players: Arc<dyn PlayerStore>,
        stats: Arc<dyn StatsStore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            connections: DashMap::new(),
            rooms: DashMap::new(),
            roster: Mutex::new(HashMap::new()),
            players,
            stats,
        })
    }

    /// Attach a new connection and return its id plus the event stream the
    /// transport should drain.
    pub fn connect(&self) -> (ConnectionId, mpsc::UnboundedReceiver<ServerEvent>) {
        let id = ConnectionId::new();
        let (sender, receiver) = mpsc::unbounded_channel();
        self.connections
            .insert(id, ConnectionEntry { sender, room: None });
        debug!(connection = %id, "connection attached");
        (id, receiver)
    }

    /// Detach a connection: leave its room (freeing its color), drop it
    /// from the roster and forget it. Idempotent.
    pub fn disconnect(&self, connection: ConnectionId) {
        let Some((_, entry)) = self.connections.remove(&connection) else {
            return;
        };
        if let Some(room_id) = entry.room {
            self.leave_room(connection, &room_id);
        }
        let names = {
            let mut roster = self.roster.lock();
            roster
                .remove(&connection)
                .map(|_| sorted_names(&roster))
        };
        if let Some(names) = names {
            self.broadcast_all(ServerEvent::UpdateLoggedInUsers { names });
        }
        debug!(connection = %connection, "connection detached");
    }

    /// Number of rooms currently alive.
    #[must_use]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Number of attached connections.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Service one client request.
    pub async fn handle(
        &self,
        connection: ConnectionId,
        request: ClientRequest,
    ) -> Result<(), GatewayError> {
        match request {
            ClientRequest::Join {
                game_id,
                player_name,
            } => self.join(connection, game_id, player_name),
            ClientRequest::ChooseColor { color } => self.choose_color(connection, color),
            ClientRequest::Move {
                from_x,
                from_y,
                to_x,
                to_y,
            } => self.make_move(connection, (from_x, from_y), (to_x, to_y)).await,
            ClientRequest::GetValidMoves { from_x, from_y } => {
                self.valid_moves(connection, from_x, from_y)
            }
            ClientRequest::GetBoard => self.send_board(connection),
            ClientRequest::RestartGame => self.restart(connection),
            ClientRequest::EndGame { winner } => self.end_game(connection, winner).await,
            ClientRequest::Login { name, password } => {
                self.login(connection, name, password).await
            }
            ClientRequest::Ping => {
                debug!(connection = %connection, "ping");
                self.sender_of(connection).map(|_| ())
            }
            ClientRequest::SendMessage { message } => self.chat(connection, message),
        }
    }

    fn join(
        &self,
        connection: ConnectionId,
        game_id: String,
        player_name: String,
    ) -> Result<(), GatewayError> {
        if player_name.len() > self.config.max_name_length {
            return Err(GatewayError::NameTooLong {
                max: self.config.max_name_length,
            });
        }
        let sender = self.sender_of(connection)?;
        let room_id = RoomId::new(game_id);

        // Joining another room moves the connection; the old room sees a
        // departure. Re-joining the current room just refreshes the
        // snapshot.
        let previous = self
            .connections
            .get_mut(&connection)
            .and_then(|mut entry| entry.room.take());
        if let Some(old) = previous {
            if old != room_id {
                self.leave_room(connection, &old);
            }
        }

        if !self.rooms.contains_key(&room_id) && self.rooms.len() >= self.config.max_rooms {
            return Err(GatewayError::RoomLimitReached {
                max: self.config.max_rooms,
            });
        }
        let room = Arc::clone(&self.rooms.entry(room_id.clone()).or_default());

        let (board, current, colors, members) = {
            let mut state = room.lock();
            state.members.insert(connection);
            (
                state.game.board().clone(),
                state.game.current_player(),
                state.registry.by_connection(),
                state.members.iter().copied().collect::<Vec<_>>(),
            )
        };
        if let Some(mut entry) = self.connections.get_mut(&connection) {
            entry.room = Some(room_id.clone());
        }

        let _ = sender.send(ServerEvent::UpdateBoard { board });
        if let Some(color) = current {
            let _ = sender.send(ServerEvent::UpdateCurrentPlayer { color });
        }
        let _ = sender.send(ServerEvent::PlayerColors { colors });
        self.broadcast(&members, ServerEvent::PlayerJoined { player_name: player_name.clone() });
        info!(connection = %connection, room = %room_id, player = %player_name, "player joined");
        Ok(())
    }

    fn choose_color(&self, connection: ConnectionId, color: Color) -> Result<(), GatewayError> {
        let (room, room_id) = self.room_of(connection)?;
        let assigned = room.lock().registry.assign(connection, color);
        match assigned {
            Ok(()) => {
                info!(connection = %connection, room = %room_id, color = %color, "color assigned");
                self.unicast(connection, ServerEvent::ColorAssigned { color });
            }
            Err(_) => self.unicast(connection, ServerEvent::ColorAlreadyTaken),
        }
        Ok(())
    }

    async fn make_move(
        &self,
        connection: ConnectionId,
        from: (u8, u8),
        to: (u8, u8),
    ) -> Result<(), GatewayError> {
        let (room, room_id) = self.room_of(connection)?;

        let reply = {
            let mut state = room.lock();
            match state.registry.color_of(connection) {
                None => MoveReply::NoColor,
                Some(color) => match (Square::new(from.0, from.1), Square::new(to.0, to.1)) {
                    (Some(from), Some(to)) => {
                        // The caller may only move pieces of their own color,
                        // even out of turn; the session enforces the rest.
                        if state.game.board().get(from).map(|p| p.color) != Some(color) {
                            MoveReply::Invalid
                        } else {
                            match state.game.make_move(from, to) {
                                Ok(outcome) => MoveReply::Applied {
                                    board: state.game.board().clone(),
                                    announced: outcome
                                        .winner
                                        .map(Color::opposite)
                                        .or_else(|| state.game.current_player()),
                                    winner: outcome.winner,
                                    members: state.members.iter().copied().collect(),
                                },
                                Err(err) => {
                                    debug!(connection = %connection, error = %err, "move rejected");
                                    MoveReply::Invalid
                                }
                            }
                        }
                    }
                    _ => MoveReply::Invalid,
                },
            }
        };

        match reply {
            MoveReply::NoColor => self.unicast(connection, ServerEvent::NoColorSelected),
            MoveReply::Invalid => self.unicast(connection, ServerEvent::InvalidMove),
            MoveReply::Applied {
                board,
                announced,
                winner,
                members,
            } => {
                self.broadcast(&members, ServerEvent::UpdateBoard { board });
                if let Some(color) = announced {
                    self.broadcast(&members, ServerEvent::UpdateCurrentPlayer { color });
                }
                if let Some(winner) = winner {
                    info!(room = %room_id, winner = %winner, "game over");
                    self.broadcast(&members, ServerEvent::GameOver { winner });
                    self.record_win(winner).await;
                }
            }
        }
        Ok(())
    }

    fn valid_moves(
        &self,
        connection: ConnectionId,
        from_x: u8,
        from_y: u8,
    ) -> Result<(), GatewayError> {
        let (room, _) = self.room_of(connection)?;
        let moves = match Square::new(from_x, from_y) {
            Some(from) => room.lock().game.valid_moves(from),
            None => Vec::new(),
        };
        self.unicast(connection, ServerEvent::ValidMoves { moves });
        Ok(())
    }

    fn send_board(&self, connection: ConnectionId) -> Result<(), GatewayError> {
        let (room, _) = self.room_of(connection)?;
        let board = room.lock().game.board().clone();
        self.unicast(connection, ServerEvent::UpdateBoard { board });
        Ok(())
    }

    fn restart(&self, connection: ConnectionId) -> Result<(), GatewayError> {
        let (room, room_id) = self.room_of(connection)?;
        let (board, current, members) = {
            let mut state = room.lock();
            state.game.restart();
            state.registry.clear();
            (
                state.game.board().clone(),
                state.game.current_player(),
                state.members.iter().copied().collect::<Vec<_>>(),
            )
        };
        self.broadcast(&members, ServerEvent::UpdateBoard { board });
        if let Some(color) = current {
            self.broadcast(&members, ServerEvent::UpdateCurrentPlayer { color });
        }
        self.broadcast(&members, ServerEvent::GameRestarted);
        self.broadcast(&members, ServerEvent::ColorSelectionReset);
        info!(room = %room_id, "game restarted");
        Ok(())
    }

    async fn end_game(&self, connection: ConnectionId, winner: Color) -> Result<(), GatewayError> {
        let (room, room_id) = self.room_of(connection)?;
        let members: Vec<_> = room.lock().members.iter().copied().collect();
        info!(room = %room_id, winner = %winner, "game reported over");
        self.broadcast(&members, ServerEvent::GameOver { winner });
        self.record_win(winner).await;
        Ok(())
    }

    async fn login(
        &self,
        connection: ConnectionId,
        name: String,
        password: String,
    ) -> Result<(), GatewayError> {
        self.sender_of(connection)?;
        if name.len() > self.config.max_name_length {
            return Err(GatewayError::NameTooLong {
                max: self.config.max_name_length,
            });
        }
        match self.players.authenticate(&name, &password).await {
            Err(err) => {
                warn!(connection = %connection, error = %err, "login failed against player store");
                self.unicast(
                    connection,
                    ServerEvent::LoginResult {
                        success: false,
                        is_new_user: None,
                        reason: Some("StorageUnavailable".to_string()),
                    },
                );
            }
            Ok(LoginOutcome::Rejected) => {
                self.unicast(
                    connection,
                    ServerEvent::LoginResult {
                        success: false,
                        is_new_user: None,
                        reason: Some("InvalidPassword".to_string()),
                    },
                );
            }
            Ok(LoginOutcome::Accepted { new_account }) => {
                self.unicast(
                    connection,
                    ServerEvent::LoginResult {
                        success: true,
                        is_new_user: Some(new_account),
                        reason: None,
                    },
                );
                let names = {
                    let mut roster = self.roster.lock();
                    roster.insert(connection, name.clone());
                    sorted_names(&roster)
                };
                self.broadcast_all(ServerEvent::UpdateLoggedInUsers { names });
                info!(connection = %connection, player = %name, new_account, "logged in");
            }
        }
        Ok(())
    }

    fn chat(&self, connection: ConnectionId, message: String) -> Result<(), GatewayError> {
        let (room, _) = self.room_of(connection)?;
        let members: Vec<_> = room.lock().members.iter().copied().collect();
        self.broadcast(&members, ServerEvent::ReceiveMessage { message });
        Ok(())
    }

    /// Remove a connection from a room, freeing its color and destroying
    /// the room once the last member leaves.
    fn leave_room(&self, connection: ConnectionId, room_id: &RoomId) {
        let Some(room) = self.rooms.get(room_id).map(|r| Arc::clone(&r)) else {
            return;
        };
        let (released, members, now_empty) = {
            let mut state = room.lock();
            state.members.remove(&connection);
            (
                state.registry.release(connection),
                state.members.iter().copied().collect::<Vec<_>>(),
                state.members.is_empty(),
            )
        };
        if now_empty {
            if self
                .rooms
                .remove_if(room_id, |_, room| room.lock().members.is_empty())
                .is_some()
            {
                info!(room = %room_id, "room emptied and removed");
            }
        }
        if let Some(color) = released {
            info!(connection = %connection, room = %room_id, color = %color, "color released");
            self.broadcast(&members, ServerEvent::ColorReleased { color });
        }
    }

    async fn record_win(&self, winner: Color) {
        if let Err(err) = self.stats.record_win(winner).await {
            warn!(error = %err, winner = %winner, "failed to record win");
        }
    }

    fn sender_of(
        &self,
        connection: ConnectionId,
    ) -> Result<mpsc::UnboundedSender<ServerEvent>, GatewayError> {
        self.connections
            .get(&connection)
            .map(|entry| entry.sender.clone())
            .ok_or(GatewayError::UnknownConnection { connection })
    }

    fn room_of(&self, connection: ConnectionId) -> Result<(Arc<Room>, RoomId), GatewayError> {
        let room_id = self
            .connections
            .get(&connection)
            .ok_or(GatewayError::UnknownConnection { connection })?
            .room
            .clone()
            .ok_or(GatewayError::NotInRoom)?;
        let room = self
            .rooms
            .get(&room_id)
            .map(|r| Arc::clone(&r))
            .ok_or(GatewayError::NotInRoom)?;
        Ok((room, room_id))
    }

    fn unicast(&self, connection: ConnectionId, event: ServerEvent) {
        if let Some(entry) = self.connections.get(&connection) {
            let _ = entry.sender.send(event);
        }
    }

    fn broadcast(&self, members: &[ConnectionId], event: ServerEvent) {
        for member in members {
            if let Some(entry) = self.connections.get(member) {
                let _ = entry.sender.send(event.clone());
            }
        }
    }

    fn broadcast_all(&self, event: ServerEvent) {
        for entry in self.connections.iter() {
            let _ = entry.sender.send(event.clone());
        }
    }
}

fn sorted_names(roster: &HashMap<ConnectionId, String>) -> Vec<String> {
    let mut names: Vec<_> = roster.values().cloned().collect();
    names.sort();
    names
}
