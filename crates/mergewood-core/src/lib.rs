//! Mergewood Core -- the headless engine for a grid-based merge game.
//!
//! Producers emit items onto a fixed board, matching items merge into
//! higher tiers, orders consume board pieces for currency, and currency
//! repairs village areas that unlock further producers. Rendering, audio
//! and UI live elsewhere: they feed input into a [`session::GameSession`],
//! drain its [`event::EventBus`], and read its snapshots.
//!
//! # Determinism
//!
//! The engine never reads a clock or an OS RNG. Every time-sensitive call
//! takes `now` in milliseconds from the host, timers live in a single
//! priority queue drained by [`session::GameSession::tick`], and all
//! randomness flows through the serializable SplitMix64 [`rng::GameRng`].
//! A seed plus an input sequence reproduces a game exactly.
//!
//! # Key types
//!
//! - [`session::GameSession`] -- owns all game state; the only entry point
//!   for mutations.
//! - [`grid::Grid`] -- the board: empty/occupied/locked cells, ring
//!   search, cobweb unlocking, hit testing.
//! - [`item::Item`] -- chain piece, producer marker, or wildcard token.
//! - [`producer::ProducerEngine`] -- buffer/cooldown/uses state machines.
//! - [`order::OrderBoard`] -- randomized orders scanned against the board.
//! - [`registry::Registry`] -- immutable chain/producer/area definitions,
//!   frozen at startup.
//! - [`serialize::SaveState`] -- the versioned, default-tolerant save
//!   shape.
//!
//! # Error handling
//!
//! Gameplay failures are values, not panics: every player-facing operation
//! returns `Result<_, `[`error::ActionError`]`>` and either fully applies
//! or fully no-ops.

pub mod collection;
pub mod economy;
pub mod energy;
pub mod error;
pub mod event;
pub mod fixed;
pub mod grid;
pub mod id;
pub mod inventory;
pub mod item;
pub mod merge;
pub mod order;
pub mod producer;
pub mod registry;
pub mod rng;
pub mod scheduler;
pub mod serialize;
pub mod session;
pub mod special;
pub mod village;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
