//! # Checkers Server
//!
//! A two-player checkers engine with live multiplayer synchronization.
//!
//! The crate is organized leaf-first:
//!
//! - [`types`] - board primitives (colors, pieces, squares) and identifiers.
//! - [`checkers`] - the pure rules engine: move generation, move application,
//!   capture chaining and terminal detection. No I/O.
//! - [`session`] - one game's turn state machine plus the per-room color
//!   registry.
//! - [`gateway`] - the protocol surface: routes client requests to rooms and
//!   fans events back out over per-connection channels.
//! - [`storage`] - the persistence boundary (player accounts, win records)
//!   with an in-memory reference implementation.
//!
//! The wire transport is deliberately abstract: a connection is a pair of
//! (request handler, event receiver). Hosts bind that pair to whatever
//! duplex transport they serve.

pub mod checkers;
pub mod config;
pub mod gateway;
pub mod session;
pub mod storage;
pub mod types;
