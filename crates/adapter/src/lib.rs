//! Leaderboard adapter - score persistence over TCP with a JSON protocol
//!
//! The game core knows nothing about players or storage. When a session ends
//! the host pairs `CoreEvent::GameOver` with a player name and hands it to this
//! crate, which talks to a small leaderboard server.
//!
//! # Protocol Overview
//!
//! A **line-delimited JSON protocol** over TCP, one request and one reply per
//! line. Replies echo the request's `seq`.
//!
//! ## Client → Server
//!
//! - **save_score**: `player`, `score`, `elapsed_ms`
//! - **get_scores**: optional `limit` (default 10)
//!
//! ## Server → Client
//!
//! - **ack**: the stored score's 1-based `rank`
//! - **scores**: `entries` of `{display_name, score, elapsed_ms}`, ordered by
//!   score descending, then elapsed time ascending
//! - **error**: `code` and `message`
//!
//! # Environment Variables
//!
//! - `CASCADE_LEADERBOARD_HOST`: server address (default: "127.0.0.1")
//! - `CASCADE_LEADERBOARD_PORT`: port (default: 7878)
//! - `CASCADE_LEADERBOARD_DISABLED`: "1" or "true" turns reporting off
//! - `CASCADE_PLAYER`: display name for this player (max 20 characters)
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"save_score","seq":1,"player":"ada","score":1280,"elapsed_ms":93410}
//! Server -> Client: {"type":"ack","seq":1,"rank":1}
//! Client -> Server: {"type":"get_scores","seq":2,"limit":5}
//! Server -> Client: {"type":"scores","seq":2,"entries":[{"display_name":"ada","score":1280,"elapsed_ms":93410}]}
//! ```
//!
//! # Testing
//!
//! ```bash
//! cargo run --bin leaderboard-server
//! nc 127.0.0.1 7878
//! {"type":"get_scores","seq":1}
//! ```

pub mod client;
pub mod protocol;
pub mod runtime;
pub mod server;

pub use cascade_tetris_types as types;

pub use client::LeaderboardClient;
pub use protocol::*;
pub use runtime::{ReporterEvent, ScoreReporter};
pub use server::{run_server, Leaderboard, LeaderboardConfig, ServerState};
