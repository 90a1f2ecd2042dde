//! In-memory store, the reference implementation of the persistence
//! boundary. State is lost on restart, which is fine for tests and
//! single-process deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use crate::storage::{LoginOutcome, PlayerStore, StatsStore, StorageError};
use crate::types::{Color, PlayerRecord, WinRecord};

/// In-memory player accounts plus win log.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    players: HashMap<String, PlayerRecord>,
    wins: Vec<WinRecord>,
    next_player_id: u32,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with the given name/password pairs, for demos
    /// and tests.
    #[must_use]
    pub fn with_seed_players<'a>(seed: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.lock();
            for (name, password) in seed {
                let id = inner.next_id();
                inner.players.insert(
                    name.to_string(),
                    PlayerRecord {
                        id,
                        name: name.to_string(),
                        password_digest: digest(password),
                    },
                );
            }
        }
        store
    }

    /// Snapshot of all registered players.
    #[must_use]
    pub fn players(&self) -> Vec<PlayerRecord> {
        let mut players: Vec<_> = self.inner.lock().players.values().cloned().collect();
        players.sort_by_key(|p| p.id);
        players
    }

    /// Snapshot of the win log, oldest first.
    #[must_use]
    pub fn wins(&self) -> Vec<WinRecord> {
        self.inner.lock().wins.clone()
    }
}

impl Inner {
    fn next_id(&mut self) -> u32 {
        self.next_player_id += 1;
        self.next_player_id
    }
}

/// Hex-encoded SHA-256 of the password.
fn digest(password: &str) -> String {
    let hash = Sha256::digest(password.as_bytes());
    hash.iter().fold(String::with_capacity(64), |mut out, b| {
        use std::fmt::Write;
        let _ = write!(out, "{b:02x}");
        out
    })
}

#[async_trait]
impl PlayerStore for MemoryStore {
    async fn authenticate(
        &self,
        name: &str,
        password: &str,
    ) -> Result<LoginOutcome, StorageError> {
        let mut inner = self.inner.lock();
        match inner.players.get(name) {
            Some(record) if record.password_digest == digest(password) => {
                Ok(LoginOutcome::Accepted { new_account: false })
            }
            Some(_) => Ok(LoginOutcome::Rejected),
            None => {
                let id = inner.next_id();
                inner.players.insert(
                    name.to_string(),
                    PlayerRecord {
                        id,
                        name: name.to_string(),
                        password_digest: digest(password),
                    },
                );
                Ok(LoginOutcome::Accepted { new_account: true })
            }
        }
    }
}

#[async_trait]
impl StatsStore for MemoryStore {
    async fn record_win(&self, winner: Color) -> Result<(), StorageError> {
        self.inner.lock().wins.push(WinRecord {
            color: winner,
            wins: 1,
            recorded_at: Utc::now(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_name_registers_a_new_account() {
        let store = MemoryStore::new();
        let outcome = store.authenticate("alice", "secret").await.unwrap();
        assert_eq!(outcome, LoginOutcome::Accepted { new_account: true });

        let players = store.players();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].name, "alice");
        assert_ne!(players[0].password_digest, "secret");
    }

    #[tokio::test]
    async fn returning_player_with_correct_password() {
        let store = MemoryStore::new();
        store.authenticate("alice", "secret").await.unwrap();
        let outcome = store.authenticate("alice", "secret").await.unwrap();
        assert_eq!(outcome, LoginOutcome::Accepted { new_account: false });
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let store = MemoryStore::new();
        store.authenticate("alice", "secret").await.unwrap();
        let outcome = store.authenticate("alice", "wrong").await.unwrap();
        assert_eq!(outcome, LoginOutcome::Rejected);
        assert_eq!(store.players().len(), 1);
    }

    #[tokio::test]
    async fn seeded_players_can_log_in() {
        let store = MemoryStore::with_seed_players([("Player1", "123"), ("Player2", "231")]);
        let outcome = store.authenticate("Player1", "123").await.unwrap();
        assert_eq!(outcome, LoginOutcome::Accepted { new_account: false });
        assert_eq!(store.authenticate("Player2", "x").await.unwrap(), LoginOutcome::Rejected);
        assert_eq!(store.players().len(), 2);
    }

    #[tokio::test]
    async fn wins_append_one_record_each() {
        let store = MemoryStore::new();
        store.record_win(Color::Red).await.unwrap();
        store.record_win(Color::Blue).await.unwrap();

        let wins = store.wins();
        assert_eq!(wins.len(), 2);
        assert_eq!(wins[0].color, Color::Red);
        assert_eq!(wins[1].color, Color::Blue);
        assert!(wins.iter().all(|w| w.wins == 1));
    }
}
