//! One independent game room.

use std::collections::HashSet;

use parking_lot::{Mutex, MutexGuard};

use crate::session::game::GameSession;
use crate::session::registry::ConnectionRegistry;
use crate::types::ConnectionId;

/// A room couples one game session with its color registry and member set.
///
/// All three are guarded by a single mutex so every request touching the
/// room is one short atomic unit. The lock is never held across an await
/// point; persistence and broadcasting happen after it is released.
#[derive(Debug, Default)]
pub struct Room {
    inner: Mutex<RoomState>,
}

/// The state behind a room's lock.
#[derive(Debug, Default)]
pub struct RoomState {
    /// The shared game.
    pub game: GameSession,
    /// Color slots for this room.
    pub registry: ConnectionRegistry,
    /// Connections currently joined to this room.
    pub members: HashSet<ConnectionId>,
}

impl Room {
    /// A fresh room with an untouched game and no members.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the room state.
    pub fn lock(&self) -> MutexGuard<'_, RoomState> {
        self.inner.lock()
    }
}
