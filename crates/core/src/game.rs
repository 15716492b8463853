//! Shared game handle
//!
//! The ticker, the input thread and the render loop all reach the rules
//! engine through one [`Game`]. Every entry point takes the lock for its whole
//! duration, so each operation is atomic with respect to the others.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::game_state::GameState;
use crate::rng::TileSource;
use crate::snapshot::GameSnapshot;
use crate::types::Command;

#[derive(Debug)]
pub struct Game {
    state: Mutex<GameState>,
}

impl Game {
    pub fn new(tiles: impl TileSource + 'static) -> Self {
        Self::from_state(GameState::new(tiles))
    }

    pub fn with_seed(seed: u32) -> Self {
        Self::from_state(GameState::with_seed(seed))
    }

    pub fn from_state(state: GameState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Lock the state. A panic on another thread never leaves the state half
    /// updated between statements, so a poisoned lock is still usable.
    pub fn lock(&self) -> MutexGuard<'_, GameState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn start(&self) {
        self.start_at(Instant::now());
    }

    pub fn start_at(&self, now: Instant) {
        self.lock().start(now);
    }

    /// Start a game unless one is already running
    pub fn start_if_idle(&self) -> bool {
        self.lock().start_if_idle(Instant::now())
    }

    pub fn reset(&self) {
        self.lock().reset();
    }

    pub fn update(&self) -> bool {
        self.update_at(Instant::now())
    }

    pub fn update_at(&self, now: Instant) -> bool {
        self.lock().update(now)
    }

    pub fn handle_command(&self, cmd: Command) -> bool {
        self.handle_command_at(cmd, Instant::now())
    }

    pub fn handle_command_at(&self, cmd: Command, now: Instant) -> bool {
        self.lock().handle_command(cmd, now)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.lock().snapshot()
    }

    /// Refresh a caller-owned snapshot without allocating
    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.lock().snapshot_into(out);
    }
}
