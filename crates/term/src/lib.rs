//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer: [`GameView`] paints a
//! [`core::GameSnapshot`] into a [`FrameBuffer`] without any I/O, and
//! [`TerminalRenderer`] flushes framebuffers to the real terminal with
//! crossterm, sending only the cells that changed.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use blockfall_core as core;
pub use blockfall_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{tile_color, AnchorY, GameView, Layout, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
