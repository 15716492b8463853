//! Pieces module - tetromino spawn shapes, rotation tables and wall kicks
//!
//! Rotation is table driven: for every tile and current rotation index there
//! is one offset per cell, and adding the offsets to the current cells gives
//! the rotated cells. Four quarter turns always bring a piece back to where it
//! started. Kicks follow a simplified SRS (Super Rotation System): when the
//! plain rotation collides, four `(row, col)` corrections are tried in order.
//! Reference: https://tetris.wiki/SRS

use crate::board::Board;
use crate::types::{Loc, Tile};

/// `(row, col)` correction applied to a whole candidate location
pub type KickOffset = (i8, i8);

/// Four kick offsets per starting rotation
pub type KickTable = [[KickOffset; 4]; 4];

/// Which kick table a tile uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KickClass {
    /// The four-in-a-line piece
    Line,
    /// The pieces built around a three-cell row
    Standard,
}

/// Spawn location of each piece, above the visible field
pub fn spawn_loc(tile: Tile) -> Loc {
    match tile {
        Tile::LightBlue => [(-1, 3), (-1, 4), (-1, 5), (-1, 6)],
        Tile::Yellow => [(-1, 4), (-1, 5), (-2, 4), (-2, 5)],
        Tile::Purple => [(-1, 4), (-1, 5), (-1, 6), (-2, 5)],
        Tile::Orange => [(-1, 4), (-1, 5), (-1, 6), (-2, 6)],
        Tile::Blue => [(-1, 4), (-1, 5), (-1, 6), (-2, 4)],
        Tile::Green => [(-1, 4), (-1, 5), (-2, 5), (-2, 6)],
        Tile::Red => [(-1, 5), (-1, 6), (-2, 4), (-2, 5)],
        // Markers never spawn; give them the square's footprint.
        Tile::Empty | Tile::Ghost => [(-1, 4), (-1, 5), (-2, 4), (-2, 5)],
    }
}

/// Per-cell offsets that rotate a piece out of `rotation` a quarter turn
/// clockwise. `None` for the square, which does not rotate.
pub fn rotation_offsets(tile: Tile, rotation: u8) -> Option<&'static Loc> {
    let table = match tile {
        Tile::LightBlue => &LIGHT_BLUE_ROTATION,
        Tile::Purple => &PURPLE_ROTATION,
        Tile::Orange => &ORANGE_ROTATION,
        Tile::Blue => &BLUE_ROTATION,
        Tile::Green => &GREEN_ROTATION,
        Tile::Red => &RED_ROTATION,
        Tile::Yellow | Tile::Empty | Tile::Ghost => return None,
    };
    Some(&table[(rotation % 4) as usize])
}

/// Kick class for a tile. `None` for the square.
pub fn kick_class(tile: Tile) -> Option<KickClass> {
    match tile {
        Tile::LightBlue => Some(KickClass::Line),
        Tile::Purple | Tile::Orange | Tile::Blue | Tile::Green | Tile::Red => {
            Some(KickClass::Standard)
        }
        Tile::Yellow | Tile::Empty | Tile::Ghost => None,
    }
}

/// Kick offsets to try, in priority order, when leaving `rotation`
pub fn kicks(class: KickClass, rotation: u8) -> &'static [KickOffset; 4] {
    let table = match class {
        KickClass::Line => &LINE_KICKS,
        KickClass::Standard => &STANDARD_KICKS,
    };
    &table[(rotation % 4) as usize]
}

/// Kicks for the pieces built around a three-cell row
const STANDARD_KICKS: KickTable = [
    [(0, -1), (-1, -1), (2, 0), (2, -1)],
    [(0, 1), (1, 1), (-2, 0), (-2, 1)],
    [(0, 1), (-1, 1), (2, 0), (2, 1)],
    [(0, -1), (1, -1), (-2, 0), (-2, -1)],
];

/// Kicks for the line piece
const LINE_KICKS: KickTable = [
    [(0, -2), (0, 1), (1, -2), (-2, 1)],
    [(0, -1), (0, 2), (-2, -1), (1, 2)],
    [(0, 2), (0, -1), (1, -2), (-2, 1)],
    [(0, 1), (0, -2), (2, 1), (-1, -2)],
];

const LIGHT_BLUE_ROTATION: [Loc; 4] = [
    [(-1, 2), (0, 1), (1, 0), (2, -1)],
    [(2, 1), (1, 0), (0, -1), (-1, -2)],
    [(1, -2), (0, -1), (-1, 0), (-2, 1)],
    [(-2, -1), (-1, 0), (0, 1), (1, 2)],
];

const PURPLE_ROTATION: [Loc; 4] = [
    [(-1, 1), (0, 0), (1, -1), (1, 1)],
    [(1, 1), (0, 0), (-1, -1), (1, -1)],
    [(1, -1), (0, 0), (-1, 1), (-1, -1)],
    [(-1, -1), (0, 0), (1, 1), (-1, 1)],
];

const ORANGE_ROTATION: [Loc; 4] = [
    [(-1, 1), (0, 0), (1, -1), (2, 0)],
    [(1, 1), (0, 0), (-1, -1), (0, -2)],
    [(1, -1), (0, 0), (-1, 1), (-2, 0)],
    [(-1, -1), (0, 0), (1, 1), (0, 2)],
];

const BLUE_ROTATION: [Loc; 4] = [
    [(-1, 1), (0, 0), (1, -1), (0, 2)],
    [(1, 1), (0, 0), (-1, -1), (2, 0)],
    [(1, -1), (0, 0), (-1, 1), (0, -2)],
    [(-1, -1), (0, 0), (1, 1), (-2, 0)],
];

const GREEN_ROTATION: [Loc; 4] = [
    [(-1, 1), (0, 0), (1, 1), (2, 0)],
    [(1, 1), (0, 0), (1, -1), (0, -2)],
    [(1, -1), (0, 0), (-1, -1), (-2, 0)],
    [(-1, -1), (0, 0), (-1, 1), (0, 2)],
];

const RED_ROTATION: [Loc; 4] = [
    [(0, 0), (1, -1), (0, 2), (1, 1)],
    [(0, 0), (-1, -1), (2, 0), (1, -1)],
    [(0, 0), (-1, 1), (0, -2), (-1, -1)],
    [(0, 0), (1, 1), (-2, 0), (-1, 1)],
];

/// Shift every cell of a location by `(drow, dcol)`
pub fn translate(loc: &Loc, (drow, dcol): (i8, i8)) -> Loc {
    loc.map(|(row, col)| (row + drow, col + dcol))
}

/// A single tetromino
///
/// Movement helpers return candidate locations and never touch the piece or
/// the board; the game validates a candidate before committing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub tile: Tile,
    pub loc: Loc,
    pub rotation: u8,
}

impl Piece {
    /// Create a piece in its spawn pose
    pub fn new(tile: Tile) -> Self {
        Self {
            tile,
            loc: spawn_loc(tile),
            rotation: 0,
        }
    }

    /// Return to the spawn pose
    pub fn reset(&mut self) {
        self.loc = spawn_loc(self.tile);
        self.rotation = 0;
    }

    pub fn down(&self) -> Loc {
        translate(&self.loc, (1, 0))
    }

    pub fn left(&self) -> Loc {
        translate(&self.loc, (0, -1))
    }

    pub fn right(&self) -> Loc {
        translate(&self.loc, (0, 1))
    }

    /// Plain clockwise rotation candidate, `None` for the square
    pub fn rotate(&self) -> Option<Loc> {
        let offsets = rotation_offsets(self.tile, self.rotation)?;
        let mut out = self.loc;
        for (cell, &(drow, dcol)) in out.iter_mut().zip(offsets.iter()) {
            cell.0 += drow;
            cell.1 += dcol;
        }
        Some(out)
    }

    /// Erase the piece from the visible part of the board
    pub fn clear(&self, board: &mut Board) {
        self.paint(board, Tile::Empty);
    }

    /// Draw the piece into the visible part of the board
    pub fn render(&self, board: &mut Board) {
        self.paint(board, self.tile);
    }

    fn paint(&self, board: &mut Board, tile: Tile) {
        for &(row, col) in &self.loc {
            if row >= 0 {
                board.set(row, col, tile);
            }
        }
    }

    /// Whether any cell is still above the visible field
    pub fn is_above_field(&self) -> bool {
        self.loc.iter().any(|&(row, _)| row < 0)
    }
}
