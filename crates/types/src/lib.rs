//! Core types module - shared data structures and constants
//!
//! Everything here is plain data with no external dependencies, so the rules
//! engine, the input mapping and the terminal view can all agree on it.
//!
//! # Coordinates
//!
//! Cells are addressed as `(row, col)`:
//!
//! - **row**: 0 at the top of the visible field, 19 at the floor. Negative rows
//!   are above the field; pieces spawn there and slide in.
//! - **col**: 0 (left wall) to 9 (right wall).
//!
//! # Game Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 10 | Default period of the update ticker |
//! | `LOCK_DELAY_MS` | 500 | Grace period before a grounded piece locks |
//! | `CLEAR_DELAY_MS` | 100 | Full rows stay visible this long before compaction |
//!
//! # Examples
//!
//! ```
//! use blockfall_types::{Command, Tile, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! assert_eq!(Tile::Orange.as_str(), "orange");
//! assert!(Tile::Orange.is_piece());
//! assert!(!Tile::Ghost.is_solid());
//! assert_eq!(Command::ALL.len(), 7);
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: u8 = 20;

/// Default update ticker period in milliseconds
pub const TICK_MS: u64 = 10;

/// Lock delay once a piece can no longer fall (500ms)
pub const LOCK_DELAY_MS: u64 = 500;

/// Time full rows remain on the board before they are removed (100ms)
pub const CLEAR_DELAY_MS: u64 = 100;

/// Cleared rows needed to advance one level
pub const LINES_PER_LEVEL: u32 = 10;

/// Level a fresh game starts at
pub const START_LEVEL: u32 = 1;

/// Highest level the gravity curve is evaluated at.
///
/// `(0.8 - (level - 1) * 0.007)^(level - 1)` turns back upward and eventually
/// takes a negative base past this point, so the curve is held flat beyond it.
pub const MAX_GRAVITY_LEVEL: u32 = 20;

/// Smallest drop interval handed to the ticker (1ms)
pub const DROP_INTERVAL_FLOOR_MS: u64 = 1;

/// Line clear scoring table (Classic Nintendo scoring)
///
/// Base points for clearing N rows with one piece:
/// - 0 rows: 0 points
/// - 1 row: 40 points
/// - 2 rows: 100 points
/// - 3 rows: 300 points
/// - 4 rows: 1200 points
///
/// Points are multiplied by (level + 1).
pub const LINE_SCORES: [u32; 5] = [0, 40, 100, 300, 1200];

/// A board coordinate, `(row, col)`.
pub type Cell = (i8, i8);

/// The four cells a tetromino occupies.
pub type Loc = [Cell; 4];


/// Contents of a board cell.
///
/// The seven colors double as the seven tetromino kinds:
/// - **LightBlue**: the four-in-a-line piece
/// - **Yellow**: the 2x2 square (never rotates)
/// - **Purple**: T-shaped
/// - **Orange**: L-shaped
/// - **Blue**: J-shaped
/// - **Green**: S-shaped
/// - **Red**: Z-shaped
///
/// `Empty` is a free cell. `Ghost` marks where the falling piece would land;
/// it is never written into the board and never blocks movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tile {
    LightBlue,
    Yellow,
    Purple,
    Orange,
    Blue,
    Green,
    Red,
    #[default]
    Empty,
    Ghost,
}

impl Tile {
    /// The seven piece colors, in spawn-index order.
    pub const PIECES: [Tile; 7] = [
        Tile::LightBlue,
        Tile::Yellow,
        Tile::Purple,
        Tile::Orange,
        Tile::Blue,
        Tile::Green,
        Tile::Red,
    ];

    /// Whether this tile is one of the seven piece colors
    pub fn is_piece(&self) -> bool {
        !matches!(self, Tile::Empty | Tile::Ghost)
    }

    /// Whether this tile blocks a falling piece
    pub fn is_solid(&self) -> bool {
        self.is_piece()
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Tile::LightBlue => "lightblue",
            Tile::Yellow => "yellow",
            Tile::Purple => "purple",
            Tile::Orange => "orange",
            Tile::Blue => "blue",
            Tile::Green => "green",
            Tile::Red => "red",
            Tile::Empty => "empty",
            Tile::Ghost => "ghost",
        }
    }
}

/// Player commands accepted by a running game
///
/// Starting a game is not a command: it is a separate lifecycle trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Toggle pause state
    Pause,
    /// Move piece one cell left
    Left,
    /// Move piece one cell right
    Right,
    /// Move piece one cell down, locking it at once if it cannot move
    SoftDrop,
    /// Drop piece as far as it goes and lock it
    HardDrop,
    /// Rotate piece a quarter turn clockwise
    Rotate,
    /// Bank the current piece (once per placed piece)
    Hold,
}

impl Command {
    pub const ALL: [Command; 7] = [
        Command::Pause,
        Command::Left,
        Command::Right,
        Command::SoftDrop,
        Command::HardDrop,
        Command::Rotate,
        Command::Hold,
    ];
}
