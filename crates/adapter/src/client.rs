//! Async client for the leaderboard server.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::protocol::*;

/// How long a single request may take end to end.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// One connection per request; the server keeps no session state.
///
/// Clones share the sequence counter.
#[derive(Debug, Clone)]
pub struct LeaderboardClient {
    addr: SocketAddr,
    seq: Arc<AtomicU64>,
}

impl LeaderboardClient {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Store a finished game. Returns the rank the server assigned.
    pub async fn save_score(
        &self,
        player: &str,
        score: u32,
        elapsed_ms: u64,
    ) -> anyhow::Result<usize> {
        let request = Request::SaveScore {
            seq: self.next_seq(),
            player: player.to_string(),
            score,
            elapsed_ms,
        };
        match self.send(&request).await? {
            Response::Ack { rank, .. } => Ok(rank),
            other => bail!(unexpected(other)),
        }
    }

    /// Fetch up to `limit` entries, best first.
    pub async fn fetch_scores(&self, limit: usize) -> anyhow::Result<Vec<ScoreEntry>> {
        let request = Request::GetScores {
            seq: self.next_seq(),
            limit: Some(limit),
        };
        match self.send(&request).await? {
            Response::Scores { entries, .. } => Ok(entries),
            other => bail!(unexpected(other)),
        }
    }

    /// Send one request line and read one response line.
    pub async fn send(&self, request: &Request) -> anyhow::Result<Response> {
        tokio::time::timeout(REQUEST_TIMEOUT, self.round_trip(request))
            .await
            .with_context(|| format!("leaderboard request to {} timed out", self.addr))?
    }

    async fn round_trip(&self, request: &Request) -> anyhow::Result<Response> {
        let stream = TcpStream::connect(self.addr)
            .await
            .with_context(|| format!("connect to leaderboard at {}", self.addr))?;
        let (reader, mut writer) = stream.into_split();

        let mut buf = serde_json::to_vec(request)?;
        buf.push(b'\n');
        writer.write_all(&buf).await?;
        writer.flush().await?;

        let mut reader = BufReader::new(reader);
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            bail!("leaderboard closed the connection without replying");
        }
        let response: Response =
            serde_json::from_str(line.trim()).context("malformed leaderboard reply")?;
        if response.seq() != request.seq() {
            bail!(
                "leaderboard replied to seq {} (expected {})",
                response.seq(),
                request.seq()
            );
        }
        Ok(response)
    }
}

fn unexpected(response: Response) -> String {
    match response {
        Response::Error { code, message, .. } => format!("leaderboard error {code:?}: {message}"),
        other => format!("unexpected leaderboard reply: {other:?}"),
    }
}
