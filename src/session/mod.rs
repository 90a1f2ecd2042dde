//! Session-level state: one game's turn machine, the per-room color
//! registry and the room container the gateway hands out.

pub mod game;
pub mod registry;
pub mod room;

pub use game::{GameSession, MoveOutcome, TurnState};
pub use registry::{ColorTaken, ConnectionRegistry};
pub use room::Room;
