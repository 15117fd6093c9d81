//! Standalone leaderboard server.
//!
//! Binds `CASCADE_LEADERBOARD_HOST:CASCADE_LEADERBOARD_PORT` and keeps scores
//! in memory until the process exits.

use cascade_tetris::adapter::{run_server, LeaderboardConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = LeaderboardConfig::from_env();
    if config.disabled {
        println!("[Leaderboard] disabled via CASCADE_LEADERBOARD_DISABLED");
        return Ok(());
    }
    run_server(config, None).await
}
