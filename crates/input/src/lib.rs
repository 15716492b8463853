//! Terminal input module.
//!
//! Maps `crossterm` key events into [`KeyAction`]s: a game
//! [`crate::types::Command`], a request to start a game, or a request to quit.
//! Polling the terminal is left to the caller.

pub mod map;

pub use blockfall_types as types;

pub use map::{command_for, map_key, should_quit, KeyAction};
