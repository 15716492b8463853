//! Board module - manages the game grid
//!
//! The board is a 20x10 grid of tiles stored as a flat row-major array.
//! Coordinates are `(row, col)`; row 0 is the top of the visible field.
//! Rows above the field (negative) are not stored: pieces occupying them are
//! simply not drawn.

use crate::types::{Cell, Tile, BOARD_HEIGHT, BOARD_WIDTH};

/// Total number of cells on the board
const BOARD_SIZE: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

const WIDTH: usize = BOARD_WIDTH as usize;
const HEIGHT: usize = BOARD_HEIGHT as usize;

/// The game board - 20 rows x 10 columns using flat array storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Flat array of tiles, row-major order (row * WIDTH + col)
    cells: [Tile; BOARD_SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [Tile::Empty; BOARD_SIZE],
        }
    }

    /// Calculate flat index from (row, col)
    #[inline(always)]
    fn index(row: i8, col: i8) -> Option<usize> {
        if row < 0 || row >= BOARD_HEIGHT as i8 || col < 0 || col >= BOARD_WIDTH as i8 {
            return None;
        }
        Some((row as usize) * WIDTH + (col as usize))
    }

    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    /// Tile at (row, col), `None` if out of bounds
    pub fn get(&self, row: i8, col: i8) -> Option<Tile> {
        Self::index(row, col).map(|idx| self.cells[idx])
    }

    /// Set tile at (row, col). Returns false if out of bounds
    pub fn set(&mut self, row: i8, col: i8, tile: Tile) -> bool {
        match Self::index(row, col) {
            Some(idx) => {
                self.cells[idx] = tile;
                true
            }
            None => false,
        }
    }

    /// Check if a single cell may be occupied by a falling piece.
    ///
    /// Columns must lie on the board and rows must not pass the floor. Rows
    /// above the field are always free; visible rows must not hold a solid tile.
    pub fn is_free(&self, (row, col): Cell) -> bool {
        if col < 0 || col >= BOARD_WIDTH as i8 || row >= BOARD_HEIGHT as i8 {
            return false;
        }
        if row < 0 {
            return true;
        }
        self.get(row, col).is_some_and(|t| !t.is_solid())
    }

    /// Check that every cell of a candidate location is free
    pub fn fits(&self, cells: &[Cell]) -> bool {
        cells.iter().all(|&c| self.is_free(c))
    }

    /// Like [`Board::fits`], but cells in `own` count as free.
    ///
    /// Used to test positions for the falling piece while it is still drawn.
    pub fn fits_ignoring(&self, cells: &[Cell], own: &[Cell]) -> bool {
        cells.iter().all(|&c| own.contains(&c) || self.is_free(c))
    }

    /// Check if a row holds no empty cell
    pub fn is_row_full(&self, row: usize) -> bool {
        self.row(row)
            .is_some_and(|tiles| tiles.iter().all(|tile| tile.is_solid()))
    }

    /// Borrow one row of tiles, or `None` below the floor
    pub fn row(&self, row: usize) -> Option<&[Tile]> {
        if row >= HEIGHT {
            return None;
        }
        let start = row * WIDTH;
        Some(&self.cells[start..start + WIDTH])
    }

    /// Remove the given rows and let everything above fall into the gap.
    ///
    /// Rows are matched as a set, so order and duplicates do not matter. Rows
    /// keep their relative order and vacated rows at the top become empty.
    /// Uses a two-pointer scan from the floor up with no allocation.
    pub fn compact(&mut self, rows: &[usize]) {
        let mut write_row = HEIGHT;

        for read_row in (0..HEIGHT).rev() {
            if rows.contains(&read_row) {
                continue;
            }
            write_row -= 1;
            if write_row != read_row {
                let src = read_row * WIDTH;
                self.cells.copy_within(src..src + WIDTH, write_row * WIDTH);
            }
        }

        self.cells[..write_row * WIDTH].fill(Tile::Empty);
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Tile] {
        &self.cells
    }

    /// Copy the board into a row-major grid
    pub fn write_grid(&self, out: &mut [[Tile; WIDTH]; HEIGHT]) {
        for (dst, src) in out.iter_mut().zip(self.cells.chunks_exact(WIDTH)) {
            dst.copy_from_slice(src);
        }
    }

    /// Count cells holding a piece color
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|t| t.is_solid()).count()
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells.fill(Tile::Empty);
    }

    /// Build a board from text rows, bottom-aligned.
    ///
    /// `.` is empty, `#` is a locked cell (drawn as Blue) and a tile's first
    /// letter in lowercase (`l`=LightBlue, `y`, `p`, `o`, `b`, `g`, `r`) is
    /// that color. Handy for tests and benches.
    pub fn from_rows(rows: &[&str]) -> Self {
        let mut board = Self::new();
        let offset = HEIGHT.saturating_sub(rows.len());
        for (i, line) in rows.iter().enumerate().take(HEIGHT) {
            for (col, ch) in line.chars().take(WIDTH).enumerate() {
                let tile = match ch {
                    '#' | 'b' => Tile::Blue,
                    'l' => Tile::LightBlue,
                    'y' => Tile::Yellow,
                    'p' => Tile::Purple,
                    'o' => Tile::Orange,
                    'g' => Tile::Green,
                    'r' => Tile::Red,
                    _ => Tile::Empty,
                };
                board.set((offset + i) as i8, col as i8, tile);
            }
        }
        board
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
