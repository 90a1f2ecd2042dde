//! Wire shapes for the real-time protocol.
//!
//! Requests arrive from clients; events flow back as unicasts to the
//! requesting connection or broadcasts to a room. Variant and field names
//! are the protocol: boards are 8x8 grids of `null`/`"red"`/`"blue"`/
//! `"red_king"`/`"blue_king"`, squares are `[x, y]` pairs where `x` is the
//! row index.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{Board, Color, ConnectionId, Square};

/// A request from a client connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all_fields = "camelCase")]
pub enum ClientRequest {
    /// Join (or create) the room named `game_id` and receive the current
    /// game snapshot.
    Join {
        /// Room to join.
        game_id: String,
        /// Display name announced to the room.
        player_name: String,
    },
    /// Claim a side.
    ChooseColor {
        /// The requested color.
        color: Color,
    },
    /// Move a piece from `(from_x, from_y)` to `(to_x, to_y)`.
    Move {
        from_x: u8,
        from_y: u8,
        to_x: u8,
        to_y: u8,
    },
    /// Ask for the destinations of the piece on `(from_x, from_y)`.
    GetValidMoves { from_x: u8, from_y: u8 },
    /// Ask for the current board.
    GetBoard,
    /// Reset the room's game and color assignments.
    RestartGame,
    /// Report a finished game for the win log.
    EndGame {
        /// The reported winner.
        winner: Color,
    },
    /// Authenticate against the player store; unknown names register.
    Login { name: String, password: String },
    /// Liveness probe; acknowledged silently.
    Ping,
    /// Relay a chat message to the room.
    SendMessage { message: String },
}

/// An event delivered to client connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// The full board after any change, and on join/query.
    UpdateBoard { board: Board },
    /// The side now on turn.
    UpdateCurrentPlayer { color: Color },
    /// Current color assignments, keyed by connection.
    PlayerColors { colors: HashMap<ConnectionId, Color> },
    /// Someone joined the room.
    PlayerJoined { player_name: String },
    /// The caller's color claim succeeded.
    ColorAssigned { color: Color },
    /// The caller's color claim lost to another connection.
    ColorAlreadyTaken,
    /// A move was attempted before choosing a color.
    NoColorSelected,
    /// The attempted move was rejected; state is unchanged.
    InvalidMove,
    /// Destinations for a queried square, in no particular order.
    ValidMoves { moves: Vec<Square> },
    /// The room's game was reset.
    GameRestarted,
    /// Color assignments were cleared; sides must be re-chosen.
    ColorSelectionReset,
    /// The game is decided.
    GameOver { winner: Color },
    /// A departing connection freed its color.
    ColorReleased { color: Color },
    /// Outcome of a login attempt.
    LoginResult {
        success: bool,
        /// Present on success: whether the account was just created.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_new_user: Option<bool>,
        /// Present on failure: why the login was refused.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// The process-wide roster of logged-in players.
    UpdateLoggedInUsers { names: Vec<String> },
    /// A relayed chat message.
    ReceiveMessage { message: String },
}
