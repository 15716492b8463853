use crate::pieces::Piece;
use crate::types::{Loc, Tile, BOARD_HEIGHT, BOARD_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceView {
    pub tile: Tile,
    pub loc: Loc,
}

impl From<Piece> for PieceView {
    fn from(value: Piece) -> Self {
        Self {
            tile: value.tile,
            loc: value.loc,
        }
    }
}

/// Copy of everything the view needs, taken under the game lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    /// Locked cells plus the falling piece
    pub board: [[Tile; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
    /// Landing cells of the falling piece
    pub ghost: Option<Loc>,
    pub next: Option<PieceView>,
    pub held: Option<PieceView>,
    pub can_hold: bool,
    pub started: bool,
    pub paused: bool,
    pub game_over: bool,
    /// Full rows are on display, waiting to be removed
    pub clearing: bool,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub clears: u32,
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            board: [[Tile::Empty; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
            ghost: None,
            next: None,
            held: None,
            can_hold: true,
            started: false,
            paused: false,
            game_over: false,
            clearing: false,
            score: 0,
            level: 0,
            lines: 0,
            clears: 0,
        }
    }
}
