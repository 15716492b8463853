//! Core game logic module - deterministic and testable
//!
//! This crate holds every rule of the game and no I/O. Time is passed in as
//! [`std::time::Instant`] values and randomness comes from an injected
//! [`rng::TileSource`], so the same inputs always produce the same game.
//!
//! # Module Structure
//!
//! - [`board`]: 10x20 grid, collision checks and row compaction
//! - [`pieces`]: spawn shapes, rotation tables and wall kicks
//! - [`scoring`]: line-clear points, level progression, gravity curve
//! - [`rng`]: tile sources (seeded random or fixed sequence)
//! - [`game_state`]: the state machine (fall, lock, clear, hold, pause)
//! - [`snapshot`]: plain copy of the state for renderers
//! - [`game`]: the lock-guarded handle shared between threads
//!
//! # Game Rules
//!
//! - **Gravity**: `(0.8 - (level - 1) * 0.007)^(level - 1)` seconds per row
//! - **Lock Delay**: 500ms once a piece cannot fall; if it can fall again by
//!   then, it keeps falling
//! - **Line Clears**: full rows stay visible for 100ms before they are removed
//! - **Scoring**: `[0, 40, 100, 300, 1200] * (level + 1)`
//! - **Levels**: one level per 10 cleared rows
//! - **Hold**: once per spawned piece
//! - **Game Over**: a piece locks while any of its cells is above the field
//!
//! # Example
//!
//! ```
//! use std::time::{Duration, Instant};
//! use blockfall_core::{GameState, SequenceTiles};
//! use blockfall_core::types::{Command, Tile};
//!
//! let mut game = GameState::new(SequenceTiles::new(vec![Tile::LightBlue]));
//! let t0 = Instant::now();
//! game.start(t0);
//!
//! game.handle_command(Command::Rotate, t0);
//! game.handle_command(Command::HardDrop, t0);
//! assert_eq!(game.board().filled_count(), 4);
//!
//! // Gravity moves the next piece after one second at level 1.
//! assert!(game.update(t0 + Duration::from_secs(1)));
//! ```

pub mod board;
pub mod game;
pub mod game_state;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use blockfall_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use game::Game;
pub use game_state::{GameState, Phase};
pub use pieces::{KickClass, Piece};
pub use rng::{RandomTiles, SequenceTiles, SimpleRng, TileSource};
pub use scoring::{advance_level, calculate_line_score, drop_interval};
pub use snapshot::{GameSnapshot, PieceView};
