//! Cascade Tetris (workspace facade crate).
//!
//! Re-exports the workspace crates under one roof so binaries, integration
//! tests and benches can use `cascade_tetris::{core,adapter,term,input,types}`.

pub use cascade_tetris_adapter as adapter;
pub use cascade_tetris_core as core;
pub use cascade_tetris_input as input;
pub use cascade_tetris_term as term;
pub use cascade_tetris_types as types;
