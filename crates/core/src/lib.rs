//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains all the game rules, state management, and simulation logic.
//! It has **zero dependencies** on UI, networking, or I/O, making it:
//!
//! - **Deterministic**: Same seed produces identical games
//! - **Testable**: Every rule is reachable without a terminal
//! - **Portable**: Can run in any environment (terminal, headless, benches)
//!
//! # Module Structure
//!
//! - [`shape`]: dense piece matrices, rotation, compaction, connected components
//! - [`piece`]: tetromino catalog and the active piece (movement, rotation, wall kicks)
//! - [`board`]: 10x20 occupancy grid and row removal
//! - [`registry`]: locked pieces and the [`Playfield`] aggregate that keeps the grid in sync
//! - [`gravity`]: whole-piece settling
//! - [`line_clear`]: clear passes and cascades
//! - [`modifiers`]: bottom-row clear and bomb effects
//! - [`scoring`]: per-pass points, drop bonus, speed ramp
//! - [`rng`]: seeded LCG and uniform piece queue
//! - [`game_state`]: the session controller
//!
//! # Game Rules
//!
//! - Locking a piece scores 10; a hard drop adds `round(rows / 4) * 10`
//! - Locked pieces keep their shape; cleared rows cut them apart
//! - After every clear, pieces and fragments fall as rigid bodies and may
//!   complete new rows, which clear in a further pass (a cascade)
//! - Each pass is scored on its own: 100 / 250 / 400 / 600 for 1-4 rows
//! - Each cleared row shortens the drop interval by 20ms, down to 100ms
//! - Four one-shot modifiers (slow, row clear, bomb, replace) cost points
//!
//! # Example
//!
//! ```
//! use cascade_tetris_core::GameState;
//! use cascade_tetris_types::GameAction;
//!
//! // Create and start a game
//! let mut game = GameState::new(12345);
//! game.start();
//!
//! // Apply game actions
//! game.apply_action(GameAction::MoveRight);
//! game.apply_action(GameAction::RotateCw);
//! game.apply_action(GameAction::HardDrop);
//!
//! // Check game state
//! assert!(game.score() > 0); // Locking awards points
//! ```
//!
//! # Timing
//!
//! Call [`GameState::tick`](game_state::GameState::tick) every frame with elapsed
//! time. The active piece drops one row once the accumulated time exceeds the
//! drop interval (700ms at the start).

pub mod board;
pub mod config;
pub mod game_state;
pub mod gravity;
pub mod line_clear;
pub mod modifiers;
pub mod piece;
pub mod registry;
pub mod rng;
pub mod scoring;
pub mod shape;
pub mod snapshot;

pub use cascade_tetris_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use game_state::GameState;
pub use gravity::{settle, SettleOutcome};
pub use line_clear::{resolve_lines, CascadeReport, ClearPass};
pub use piece::{catalog_shape, Tetromino};
pub use registry::{component_to_piece, PieceRegistry, PlacedPiece, Playfield};
pub use rng::{PieceQueue, SimpleRng};
pub use shape::{
    bounding_dimensions, compact, find_connected_components, rotate_clockwise, shapes_equal,
    Shape,
};
pub use snapshot::{ActiveSnapshot, GameSnapshot, PieceSnapshot};
