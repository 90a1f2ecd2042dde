//! Persisted player and result models.
//!
//! The gameplay core never reads these directly; they cross the
//! [`crate::storage`] trait boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::board::Color;

/// A registered player account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Store-assigned identifier.
    pub id: u32,
    /// Login name, unique per store.
    pub name: String,
    /// Hex-encoded digest of the player's password.
    pub password_digest: String,
}

/// One appended win entry; each record counts a single finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinRecord {
    /// Winning color.
    pub color: Color,
    /// Number of wins this record represents. Always 1 today; kept explicit
    /// so aggregation stays a plain sum.
    pub wins: u32,
    /// When the win was recorded.
    pub recorded_at: DateTime<Utc>,
}
