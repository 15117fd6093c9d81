//! TCP server for the leaderboard
//!
//! Handles incoming connections and keeps the scores in memory.
//! Uses tokio for async networking.

use std::cmp::Reverse;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{oneshot, RwLock};

use crate::protocol::*;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardConfig {
    pub host: String,
    pub port: u16,
    pub disabled: bool,
    /// Identity attached to scores reported by this process.
    pub player: String,
    /// Entries kept by the server; lower ranks are dropped.
    pub max_entries: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            disabled: false,
            player: "player".to_string(),
            max_entries: 100,
        }
    }
}

impl LeaderboardConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let host = lookup("CASCADE_LEADERBOARD_HOST")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = lookup("CASCADE_LEADERBOARD_PORT")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let disabled = lookup("CASCADE_LEADERBOARD_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let player = lookup("CASCADE_PLAYER")
            .map(|s| truncate_name(&s))
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.player);

        Self {
            host,
            port,
            disabled,
            player,
            max_entries: defaults.max_entries,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid leaderboard address {}:{}", self.host, self.port))
    }
}

/// Scores ordered by score descending, then elapsed time ascending.
#[derive(Debug, Clone)]
pub struct Leaderboard {
    entries: Vec<ScoreEntry>,
    capacity: usize,
}

impl Leaderboard {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert and return the 1-based rank, or `None` if it fell off the end.
    ///
    /// Ties keep insertion order: a new entry goes after equal ones.
    pub fn insert(&mut self, player: &str, score: u32, elapsed_ms: u64) -> Option<usize> {
        let entry = ScoreEntry {
            display_name: truncate_name(player),
            score,
            elapsed_ms,
        };
        let key = rank_key(score, elapsed_ms);
        let pos = self
            .entries
            .iter()
            .position(|e| rank_key(e.score, e.elapsed_ms) < key)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(self.capacity);
        (pos < self.capacity).then_some(pos + 1)
    }

    pub fn top(&self, limit: usize) -> Vec<ScoreEntry> {
        self.entries.iter().take(limit).cloned().collect()
    }
}

/// Larger is better.
fn rank_key(score: u32, elapsed_ms: u64) -> (u32, Reverse<u64>) {
    (score, Reverse(elapsed_ms))
}

/// Shared server state
pub struct ServerState {
    leaderboard: RwLock<Leaderboard>,
}

impl ServerState {
    pub fn new(config: &LeaderboardConfig) -> Self {
        Self {
            leaderboard: RwLock::new(Leaderboard::new(config.max_entries)),
        }
    }

    /// Answer one request.
    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::SaveScore {
                seq,
                player,
                score,
                elapsed_ms,
            } => {
                if truncate_name(&player).is_empty() {
                    return create_error(seq, ErrorCode::InvalidField, "player must not be empty");
                }
                let rank = self.leaderboard.write().await.insert(&player, score, elapsed_ms);
                match rank {
                    Some(rank) => Response::Ack { seq, rank },
                    None => create_error(seq, ErrorCode::InvalidField, "score below leaderboard cutoff"),
                }
            }
            Request::GetScores { seq, limit } => {
                let limit = limit.unwrap_or(DEFAULT_SCORES_LIMIT);
                let entries = self.leaderboard.read().await.top(limit);
                Response::Scores { seq, entries }
            }
        }
    }
}

/// Start the TCP server
pub async fn run_server(
    config: LeaderboardConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr).await?;
    let bound = listener.local_addr()?;
    println!("[Leaderboard] TCP server listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(&config));
    let mut client_id_counter = 0usize;

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        println!("[Leaderboard] Client {} connected from {}", client_id, addr);

        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, state).await {
                eprintln!("[Leaderboard] Client {} error: {}", client_id, e);
            }
            println!("[Leaderboard] Client {} disconnected", client_id);
        });
    }
}

/// Handle a single client connection
async fn handle_client(socket: TcpStream, state: Arc<ServerState>) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    let mut line = String::new();
    let mut buf: Vec<u8> = Vec::with_capacity(1024);

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            // Client disconnected
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match parse_request(trimmed) {
            Ok(request) => state.handle(request).await,
            Err(error) => error,
        };

        buf.clear();
        serde_json::to_writer(&mut buf, &response)?;
        buf.push(b'\n');
        writer.write_all(&buf).await?;
        writer.flush().await?;
    }

    Ok(())
}
