//! GameView: maps a `core::GameSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.
//!
//! Screen layout, left to right: the Hold and Help boxes, the framed board,
//! then the Next and Score boxes. A one-line status message sits above the
//! board frame.

use crate::core::{GameSnapshot, PieceView};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{Tile, BOARD_HEIGHT, BOARD_WIDTH};

/// Width of the side boxes in terminal columns
pub const PANEL_W: u16 = 14;
/// Columns between a side box and the board frame
pub const PANEL_GAP: u16 = 1;
/// Body rows of the Hold and Next boxes
const PIECE_BOX_ROWS: u16 = 6;

pub const START_MESSAGE: &str = "Press Enter to start a new game";
pub const PAUSE_MESSAGE: &str = "Game Paused";
pub const GAME_OVER_TEXT: &str = "GAME OVER";

pub const HELP_LINES: [&str; 7] = [
    "h:      left",
    "l:     right",
    "j:      down",
    "k:    rotate",
    "f:      hold",
    "space:  drop",
    "p:     pause",
];

const BOARD_BG: Rgb = Rgb::new(30, 30, 40);
const BOX_BG: Rgb = Rgb::new(0, 0, 0);
const HEADER_BG: Rgb = Rgb::new(110, 110, 120);

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// Where each part of the screen lands for a given viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Row of the status message
    pub message_y: u16,
    /// Left edge of the Hold and Help boxes
    pub left_x: u16,
    /// Top-left corner of the board frame
    pub frame_x: u16,
    pub frame_y: u16,
    pub frame_w: u16,
    pub frame_h: u16,
    /// Left edge of the Next and Score boxes
    pub right_x: u16,
    /// Total width of everything drawn
    pub width: u16,
}

/// A lightweight terminal renderer for the game.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
            anchor_y: AnchorY::Center,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Compute the screen layout for `viewport`. Everything is centered
    /// horizontally; small viewports clip on the right and bottom.
    pub fn layout(&self, viewport: Viewport) -> Layout {
        let frame_w = (BOARD_WIDTH as u16) * self.cell_w + 2;
        let frame_h = (BOARD_HEIGHT as u16) * self.cell_h + 2;
        let width = PANEL_W + PANEL_GAP + frame_w + PANEL_GAP + PANEL_W;
        let height = frame_h + 1;

        let left_x = viewport.width.saturating_sub(width) / 2;
        let top = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(height) / 2,
            AnchorY::Top => 0,
        };
        let frame_x = left_x + PANEL_W + PANEL_GAP;

        Layout {
            message_y: top,
            left_x,
            frame_x,
            frame_y: top + 1,
            frame_w,
            frame_h,
            right_x: frame_x + frame_w + PANEL_GAP,
            width,
        }
    }

    /// Render the snapshot into an existing framebuffer.
    ///
    /// This is the allocation-free hot path. Callers can reuse a framebuffer
    /// across frames and only resize when the terminal size changes.
    pub fn render_into(&self, snap: &GameSnapshot, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().into_cell(' '));

        let layout = self.layout(viewport);

        self.draw_board(fb, snap, &layout);
        self.draw_hold_box(fb, snap, &layout);
        self.draw_help_box(fb, &layout);
        self.draw_next_box(fb, snap, &layout);
        self.draw_score_box(fb, snap, &layout);
        self.draw_message(fb, snap, &layout);

        if snap.game_over {
            self.draw_overlay_text(fb, &layout, GAME_OVER_TEXT);
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, viewport, &mut fb);
        fb
    }

    fn draw_board(&self, fb: &mut FrameBuffer, snap: &GameSnapshot, layout: &Layout) {
        let board_w = layout.frame_w - 2;
        let board_h = layout.frame_h - 2;
        let border = CellStyle::new(Rgb::new(200, 200, 200), BOX_BG);

        fb.fill_rect(
            layout.frame_x + 1,
            layout.frame_y + 1,
            board_w,
            board_h,
            ' ',
            CellStyle::new(Rgb::new(80, 80, 90), BOARD_BG),
        );
        self.draw_border(fb, layout.frame_x, layout.frame_y, layout.frame_w, layout.frame_h, border);

        for (row, tiles) in snap.board.iter().enumerate() {
            let flashing = snap.clearing && tiles.iter().all(|t| t.is_solid());
            for (col, &tile) in tiles.iter().enumerate() {
                let (x, y) = (col as u16, row as u16);
                if flashing {
                    let style = CellStyle {
                        bold: true,
                        ..CellStyle::new(Rgb::new(255, 255, 255), BOARD_BG)
                    };
                    self.fill_board_cell(fb, layout, x, y, '▓', style);
                } else if let Some(color) = tile_color(tile) {
                    let style = CellStyle {
                        bold: true,
                        ..CellStyle::new(color, BOARD_BG)
                    };
                    self.fill_board_cell(fb, layout, x, y, '█', style);
                } else if is_ghost_cell(snap, row, col) {
                    let style = CellStyle {
                        dim: true,
                        ..CellStyle::new(Rgb::new(140, 140, 140), BOARD_BG)
                    };
                    self.fill_board_cell(fb, layout, x, y, '░', style);
                } else {
                    let style = CellStyle {
                        dim: true,
                        ..CellStyle::new(Rgb::new(90, 90, 100), BOARD_BG)
                    };
                    self.fill_board_cell(fb, layout, x, y, '·', style);
                }
            }
        }
    }

    fn draw_border(&self, fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
        if w < 2 || h < 2 {
            return;
        }

        fb.put_char(x, y, '┌', style);
        fb.put_char(x + w - 1, y, '┐', style);
        fb.put_char(x, y + h - 1, '└', style);
        fb.put_char(x + w - 1, y + h - 1, '┘', style);

        for dx in 1..w - 1 {
            fb.put_char(x + dx, y, '─', style);
            fb.put_char(x + dx, y + h - 1, '─', style);
        }
        for dy in 1..h - 1 {
            fb.put_char(x, y + dy, '│', style);
            fb.put_char(x + w - 1, y + dy, '│', style);
        }
    }

    fn fill_board_cell(
        &self,
        fb: &mut FrameBuffer,
        layout: &Layout,
        cell_x: u16,
        cell_y: u16,
        ch: char,
        style: CellStyle,
    ) {
        let px = layout.frame_x + 1 + cell_x * self.cell_w;
        let py = layout.frame_y + 1 + cell_y * self.cell_h;
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
    }

    /// Header row with a centered title over `body_rows` blank rows
    fn draw_box(&self, fb: &mut FrameBuffer, x: u16, y: u16, body_rows: u16, title: &str) {
        let header = CellStyle {
            bold: true,
            ..CellStyle::new(Rgb::new(255, 255, 255), HEADER_BG)
        };
        fb.fill_rect(x, y, PANEL_W, 1, ' ', header);
        let title_w = title.chars().count() as u16;
        fb.put_str(x + PANEL_W.saturating_sub(title_w) / 2, y, title, header);
        fb.fill_rect(x, y + 1, PANEL_W, body_rows, ' ', box_style());
    }

    /// Draw a spawn-pose piece centered in a box body
    fn draw_preview(&self, fb: &mut FrameBuffer, x: u16, y: u16, piece: &PieceView, dim: bool) {
        let Some(color) = tile_color(piece.tile) else {
            return;
        };
        let min_row = piece.loc.iter().map(|c| c.0).min().unwrap_or(0);
        let max_row = piece.loc.iter().map(|c| c.0).max().unwrap_or(0);
        let min_col = piece.loc.iter().map(|c| c.1).min().unwrap_or(0);
        let max_col = piece.loc.iter().map(|c| c.1).max().unwrap_or(0);

        let shape_w = ((max_col - min_col + 1) as u16) * 2;
        let shape_h = (max_row - min_row + 1) as u16;
        let x0 = x + PANEL_W.saturating_sub(shape_w) / 2;
        let y0 = y + 1 + PIECE_BOX_ROWS.saturating_sub(shape_h) / 2;

        let style = CellStyle {
            dim,
            ..CellStyle::new(color, BOX_BG)
        };
        for &(row, col) in &piece.loc {
            let px = x0 + ((col - min_col) as u16) * 2;
            let py = y0 + (row - min_row) as u16;
            fb.put_str(px, py, "██", style);
        }
    }

    fn draw_hold_box(&self, fb: &mut FrameBuffer, snap: &GameSnapshot, layout: &Layout) {
        let (x, y) = (layout.left_x, layout.frame_y);
        self.draw_box(fb, x, y, PIECE_BOX_ROWS, "Hold");
        if let Some(held) = &snap.held {
            self.draw_preview(fb, x, y, held, !snap.can_hold);
        }
    }

    fn draw_help_box(&self, fb: &mut FrameBuffer, layout: &Layout) {
        let (x, y) = (layout.left_x, layout.frame_y + PIECE_BOX_ROWS + 2);
        self.draw_box(fb, x, y, HELP_LINES.len() as u16, "Help");
        for (i, line) in HELP_LINES.iter().enumerate() {
            fb.put_str(x + 1, y + 1 + i as u16, line, box_style());
        }
    }

    fn draw_next_box(&self, fb: &mut FrameBuffer, snap: &GameSnapshot, layout: &Layout) {
        let (x, y) = (layout.right_x, layout.frame_y);
        self.draw_box(fb, x, y, PIECE_BOX_ROWS, "Next");
        if let Some(next) = &snap.next {
            self.draw_preview(fb, x, y, next, false);
        }
    }

    fn draw_score_box(&self, fb: &mut FrameBuffer, snap: &GameSnapshot, layout: &Layout) {
        let (x, y) = (layout.right_x, layout.frame_y + PIECE_BOX_ROWS + 2);
        self.draw_box(fb, x, y, 4, "Score");

        let style = box_style();
        let label = CellStyle { dim: true, ..style };
        let right = x + PANEL_W - 2;

        fb.put_u32_right(right, y + 1, snap.score, CellStyle { bold: true, ..style });
        fb.put_str(x + 1, y + 2, "Level", label);
        fb.put_u32_right(right, y + 2, snap.level, style);
        fb.put_str(x + 1, y + 3, "Lines", label);
        fb.put_u32_right(right, y + 3, snap.lines, style);
    }

    fn draw_message(&self, fb: &mut FrameBuffer, snap: &GameSnapshot, layout: &Layout) {
        let text = if !snap.started {
            START_MESSAGE
        } else if snap.paused {
            PAUSE_MESSAGE
        } else {
            return;
        };
        let style = CellStyle::new(Rgb::new(0, 0, 0), Rgb::new(230, 230, 230));
        let text_w = text.chars().count() as u16;
        let x = layout.left_x + layout.width.saturating_sub(text_w) / 2;
        fb.put_str(x, layout.message_y, text, style);
    }

    fn draw_overlay_text(&self, fb: &mut FrameBuffer, layout: &Layout, text: &str) {
        let mid_y = layout.frame_y.saturating_add(layout.frame_h / 2);
        let text_w = text.chars().count() as u16;
        let x = layout
            .frame_x
            .saturating_add(layout.frame_w.saturating_sub(text_w) / 2);
        let style = CellStyle {
            bold: true,
            ..CellStyle::new(Rgb::new(255, 255, 255), BOX_BG)
        };
        fb.put_str(x, mid_y, text, style);
    }
}

fn box_style() -> CellStyle {
    CellStyle::new(Rgb::new(220, 220, 220), BOX_BG)
}

fn is_ghost_cell(snap: &GameSnapshot, row: usize, col: usize) -> bool {
    snap.ghost.is_some_and(|cells| {
        cells
            .iter()
            .any(|&(r, c)| r >= 0 && r as usize == row && c as usize == col)
    })
}

/// Display color of a piece tile. `None` for markers.
pub fn tile_color(tile: Tile) -> Option<Rgb> {
    match tile {
        Tile::LightBlue => Some(Rgb::new(80, 220, 220)),
        Tile::Yellow => Some(Rgb::new(240, 220, 80)),
        Tile::Purple => Some(Rgb::new(200, 120, 220)),
        Tile::Orange => Some(Rgb::new(255, 165, 0)),
        Tile::Blue => Some(Rgb::new(80, 120, 220)),
        Tile::Green => Some(Rgb::new(100, 220, 120)),
        Tile::Red => Some(Rgb::new(220, 80, 80)),
        Tile::Empty | Tile::Ghost => None,
    }
}
