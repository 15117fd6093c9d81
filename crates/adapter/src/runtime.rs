//! Leaderboard runtime integration.
//!
//! Bridges the sync game loop with the async client: requests are spawned on
//! a private tokio runtime and their results come back over a channel the
//! game loop polls once per frame.

use std::net::SocketAddr;

use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::client::LeaderboardClient;
use crate::protocol::ScoreEntry;
use crate::server::LeaderboardConfig;
use crate::types::CoreEvent;

/// Result of a background leaderboard request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReporterEvent {
    Saved { rank: usize },
    Scores(Vec<ScoreEntry>),
    Failed(String),
}

/// Running reporter instance.
pub struct ScoreReporter {
    rt: Runtime,
    client: LeaderboardClient,
    player: String,
    event_tx: mpsc::UnboundedSender<ReporterEvent>,
    event_rx: mpsc::UnboundedReceiver<ReporterEvent>,
}

impl ScoreReporter {
    /// Start the reporter from environment variables.
    ///
    /// Returns None if `CASCADE_LEADERBOARD_DISABLED` is set or the config is
    /// unusable.
    pub fn start_from_env() -> Option<Self> {
        let config = LeaderboardConfig::from_env();
        if config.disabled {
            return None;
        }
        let addr = match config.socket_addr() {
            Ok(addr) => addr,
            Err(e) => {
                eprintln!("[Leaderboard] {e:#}");
                return None;
            }
        };
        match Self::new(addr, &config.player) {
            Ok(reporter) => Some(reporter),
            Err(e) => {
                eprintln!("[Leaderboard] failed to start runtime: {e:#}");
                None
            }
        }
    }

    pub fn new(addr: SocketAddr, player: &str) -> anyhow::Result<Self> {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Ok(Self {
            rt,
            client: LeaderboardClient::new(addr),
            player: player.to_string(),
            event_tx,
            event_rx,
        })
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    /// Report a finished game in the background.
    pub fn submit(&mut self, score: u32, elapsed_ms: u64) {
        let client = self.client.clone();
        let player = self.player.clone();
        let tx = self.event_tx.clone();
        self.rt.spawn(async move {
            let event = match client.save_score(&player, score, elapsed_ms).await {
                Ok(rank) => ReporterEvent::Saved { rank },
                Err(e) => ReporterEvent::Failed(format!("{e:#}")),
            };
            let _ = tx.send(event);
        });
    }

    /// Submit the score carried by a `GameOver` event. Other events are
    /// ignored; returns whether a submission was made.
    pub fn report_event(&mut self, event: &CoreEvent) -> bool {
        match *event {
            CoreEvent::GameOver { score, elapsed_ms } => {
                self.submit(score, elapsed_ms);
                true
            }
            _ => false,
        }
    }

    /// Fetch the top `limit` scores in the background.
    pub fn request_scores(&mut self, limit: usize) {
        let client = self.client.clone();
        let tx = self.event_tx.clone();
        self.rt.spawn(async move {
            let event = match client.fetch_scores(limit).await {
                Ok(entries) => ReporterEvent::Scores(entries),
                Err(e) => ReporterEvent::Failed(format!("{e:#}")),
            };
            let _ = tx.send(event);
        });
    }

    pub fn try_recv(&mut self) -> Option<ReporterEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Block until the next result arrives. Intended for tests and tools.
    pub fn recv_blocking(&mut self) -> Option<ReporterEvent> {
        self.rt.block_on(self.event_rx.recv())
    }
}
