//! RNG module - where new pieces come from
//!
//! The game never reaches for a global random generator. It owns a
//! [`TileSource`] handed in at construction: [`RandomTiles`] draws uniformly
//! from the seven piece colors with a seeded LCG, and [`SequenceTiles`] replays
//! a fixed list for tests and scripted demos.

use crate::types::Tile;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Takes the upper half of the state; the low bits of an LCG cycle quickly.
    pub fn next_range(&mut self, max: u32) -> u32 {
        (self.next_u32() >> 16) % max
    }

    /// Current generator state
    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Supplier of piece colors for spawning
pub trait TileSource: Send {
    /// Color of the next piece to create
    fn next_tile(&mut self) -> Tile;
}

/// Uniformly random piece colors
#[derive(Debug, Clone)]
pub struct RandomTiles {
    rng: SimpleRng,
    seed: u32,
}

impl RandomTiles {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
            seed,
        }
    }

    /// Seed this source was created with
    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl TileSource for RandomTiles {
    fn next_tile(&mut self) -> Tile {
        Tile::PIECES[self.rng.next_range(Tile::PIECES.len() as u32) as usize]
    }
}

/// Cycles through a fixed list of piece colors
#[derive(Debug, Clone)]
pub struct SequenceTiles {
    tiles: Vec<Tile>,
    index: usize,
}

impl SequenceTiles {
    /// Create a cycling source. An empty list yields the line piece forever.
    pub fn new(tiles: impl Into<Vec<Tile>>) -> Self {
        Self {
            tiles: tiles.into(),
            index: 0,
        }
    }
}

impl TileSource for SequenceTiles {
    fn next_tile(&mut self) -> Tile {
        if self.tiles.is_empty() {
            return Tile::LightBlue;
        }
        let tile = self.tiles[self.index % self.tiles.len()];
        self.index = self.index.wrapping_add(1);
        tile
    }
}
