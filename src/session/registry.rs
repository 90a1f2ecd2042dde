//! Color slots for one room's connections.

use std::collections::HashMap;

use crate::types::{Color, ConnectionId};

/// Error returned when a color already belongs to another connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("color {color} is already taken")]
pub struct ColorTaken {
    /// The contested color.
    pub color: Color,
}

/// Maps a room's two color slots to live connections.
///
/// Invariants: at most one connection per color, at most one color per
/// connection. Assigning a connection a second color moves it, freeing
/// the first slot; re-asserting its current color is accepted.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    slots: HashMap<Color, ConnectionId>,
}

impl ConnectionRegistry {
    /// An empty registry with both slots free.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `color` for `connection`.
    pub fn assign(&mut self, connection: ConnectionId, color: Color) -> Result<(), ColorTaken> {
        match self.slots.get(&color) {
            Some(holder) if *holder != connection => Err(ColorTaken { color }),
            _ => {
                self.slots.retain(|_, holder| *holder != connection);
                self.slots.insert(color, connection);
                Ok(())
            }
        }
    }

    /// Drop `connection`'s slot, returning the freed color.
    pub fn release(&mut self, connection: ConnectionId) -> Option<Color> {
        let color = self.color_of(connection)?;
        self.slots.remove(&color);
        Some(color)
    }

    /// The color held by `connection`, if any.
    #[must_use]
    pub fn color_of(&self, connection: ConnectionId) -> Option<Color> {
        self.slots
            .iter()
            .find(|(_, holder)| **holder == connection)
            .map(|(color, _)| *color)
    }

    /// The connection holding `color`, if any.
    #[must_use]
    pub fn connection_of(&self, color: Color) -> Option<ConnectionId> {
        self.slots.get(&color).copied()
    }

    /// Snapshot of assignments keyed by connection, in wire shape.
    #[must_use]
    pub fn by_connection(&self) -> HashMap<ConnectionId, Color> {
        self.slots
            .iter()
            .map(|(color, connection)| (*connection, *color))
            .collect()
    }

    /// Free both slots.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_and_lookup() {
        let mut registry = ConnectionRegistry::new();
        let a = ConnectionId::new();
        registry.assign(a, Color::Red).unwrap();
        assert_eq!(registry.color_of(a), Some(Color::Red));
        assert_eq!(registry.connection_of(Color::Red), Some(a));
        assert_eq!(registry.connection_of(Color::Blue), None);
    }

    #[test]
    fn second_connection_is_rejected() {
        let mut registry = ConnectionRegistry::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        registry.assign(a, Color::Red).unwrap();
        let err = registry.assign(b, Color::Red).unwrap_err();
        assert_eq!(err, ColorTaken { color: Color::Red });
        assert_eq!(registry.connection_of(Color::Red), Some(a));
        registry.assign(b, Color::Blue).unwrap();
        assert_eq!(registry.color_of(b), Some(Color::Blue));
    }

    #[test]
    fn reassert_own_color_is_accepted() {
        let mut registry = ConnectionRegistry::new();
        let a = ConnectionId::new();
        registry.assign(a, Color::Red).unwrap();
        registry.assign(a, Color::Red).unwrap();
        assert_eq!(registry.color_of(a), Some(Color::Red));
    }

    #[test]
    fn switching_color_frees_the_old_slot() {
        let mut registry = ConnectionRegistry::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        registry.assign(a, Color::Red).unwrap();
        registry.assign(a, Color::Blue).unwrap();
        assert_eq!(registry.color_of(a), Some(Color::Blue));
        registry.assign(b, Color::Red).unwrap();
    }

    #[test]
    fn release_frees_the_slot() {
        let mut registry = ConnectionRegistry::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        registry.assign(a, Color::Red).unwrap();
        assert_eq!(registry.release(a), Some(Color::Red));
        assert_eq!(registry.release(a), None);
        registry.assign(b, Color::Red).unwrap();
    }

    #[test]
    fn clear_resets_both_slots() {
        let mut registry = ConnectionRegistry::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        registry.assign(a, Color::Red).unwrap();
        registry.assign(b, Color::Blue).unwrap();
        registry.clear();
        assert_eq!(registry.color_of(a), None);
        assert_eq!(registry.color_of(b), None);
    }
}
