//! Shared types used across the engine, session and gateway layers.

pub mod board;
pub mod ids;
pub mod player;

pub use board::{Board, Color, Piece, Rank, Square};
pub use ids::{ConnectionId, RoomId};
pub use player::{PlayerRecord, WinRecord};
