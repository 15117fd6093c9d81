//! Terminal rendering for the cascade game.
//!
//! Rendering is split in two: [`GameView`] maps a [`core::GameSnapshot`] into a
//! [`FrameBuffer`] without touching the terminal, and [`TerminalRenderer`]
//! flushes framebuffers to stdout, emitting only changed runs after the first
//! frame. Board cells are two columns wide to offset the glyph aspect ratio.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use cascade_tetris_core as core;
pub use cascade_tetris_types as types;

pub use fb::{format_clock, Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{AnchorY, GameView, LeaderboardRow, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
