//! Persistence boundary for player accounts and win statistics.
//!
//! The gameplay core treats stores as slow, fallible collaborators: every
//! call is awaited outside the room locks, and a failed write never rolls
//! back in-memory game state.

pub mod memory;

use async_trait::async_trait;

use crate::types::Color;

pub use memory::MemoryStore;

/// Error returned by a store that could not serve a request.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backing store could not be reached or refused the operation.
    #[error("storage unavailable: {reason}")]
    Unavailable {
        /// Description of the failure.
        reason: String,
    },
}

/// Result of checking a name/password pair against the player store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials accepted.
    Accepted {
        /// True when the name was unknown and an account was created.
        new_account: bool,
    },
    /// The name exists but the password does not match.
    Rejected,
}

/// Player account lookups and registration.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    /// Check a name/password pair, registering unknown names as new
    /// accounts.
    async fn authenticate(&self, name: &str, password: &str)
        -> Result<LoginOutcome, StorageError>;
}

/// Append-only log of finished games.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Record one win for the given color.
    async fn record_win(&self, winner: Color) -> Result<(), StorageError>;
}
