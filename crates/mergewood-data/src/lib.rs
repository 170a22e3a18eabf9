//! Data pipeline for the mergewood engine.
//!
//! Game content (merge chains, producers, village areas, tuning knobs)
//! lives in data files rather than code. This crate defines the on-disk
//! schema, loads RON/JSON/TOML files with format detection, resolves name
//! references into registry ids, and ships the built-in default dataset
//! the game launches with.

pub mod builtin;
pub mod loader;
pub mod schema;

pub use builtin::builtin;
pub use loader::{load_game_data, DataLoadError, GameData};
