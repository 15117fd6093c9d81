//! Terminal input module (engine-facing).
//!
//! This module is independent of any UI framework. It maps `crossterm` key
//! events into [`crate::types::GameAction`]. Key repeat is left to the
//! terminal: every press or auto-repeat arrives as its own event and becomes
//! one action.

pub mod map;

pub use cascade_tetris_types as types;

pub use map::{handle_key_event, should_quit};
