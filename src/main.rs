//! Terminal cascade Tetris runner (default binary).
//!
//! Uses crossterm for input and the framebuffer renderer from the term crate.
//! Core events are appended as JSON lines to `CASCADE_LOG_PATH` when set, and
//! finished games are reported to the leaderboard unless
//! `CASCADE_LEADERBOARD_DISABLED` is set.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use serde_json::json;

use cascade_tetris::adapter::{ReporterEvent, ScoreReporter};
use cascade_tetris::core::config::game_config_from_env;
use cascade_tetris::core::{GameSnapshot, GameState};
use cascade_tetris::input::{handle_key_event, should_quit};
use cascade_tetris::term::{FrameBuffer, GameView, LeaderboardRow, TerminalRenderer, Viewport};
use cascade_tetris::types::{CoreEvent, TICK_MS};

/// Leaderboard rows fetched for the side panel.
const LEADERBOARD_LIMIT: usize = 5;

fn main() -> Result<()> {
    let mut log = EventLog::from_env()?;
    let mut reporter = ScoreReporter::start_from_env();

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut log, reporter.as_mut());

    // Always try to restore terminal state.
    let _ = term.exit();
    log.flush();
    result
}

fn run(
    term: &mut TerminalRenderer,
    log: &mut EventLog,
    mut reporter: Option<&mut ScoreReporter>,
) -> Result<()> {
    let mut game = GameState::with_config(seed_from_env(), game_config_from_env());

    let view = GameView::default();
    let mut snap = GameSnapshot::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut leaderboard: Option<Vec<LeaderboardRow>> = None;

    if let Some(r) = reporter.as_deref_mut() {
        r.request_scores(LEADERBOARD_LIMIT);
        leaderboard = Some(Vec::new());
    }

    let tick_duration = Duration::from_millis(TICK_MS as u64);
    let mut last_tick = Instant::now();

    loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        game.snapshot_into(&mut snap);
        view.render_into_with_leaderboard(&snap, leaderboard.as_deref(), Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if should_quit(key) {
                        return Ok(());
                    }
                    if let Some(action) = handle_key_event(key) {
                        game.apply_action(action);
                    }
                }
                Event::Resize(_, _) => term.invalidate(),
                _ => {}
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            game.tick(TICK_MS);
        }

        for event in game.drain_events() {
            log.record(&event);
            if let Some(r) = reporter.as_deref_mut() {
                r.report_event(&event);
            }
        }

        if let Some(r) = reporter.as_deref_mut() {
            while let Some(result) = r.try_recv() {
                match result {
                    ReporterEvent::Saved { .. } => r.request_scores(LEADERBOARD_LIMIT),
                    ReporterEvent::Scores(entries) => {
                        leaderboard = Some(
                            entries
                                .into_iter()
                                .map(|e| LeaderboardRow {
                                    name: e.display_name,
                                    score: e.score,
                                    elapsed_ms: e.elapsed_ms,
                                })
                                .collect(),
                        );
                    }
                    ReporterEvent::Failed(message) => {
                        log.record_json(json!({ "event": "leaderboard_error", "message": message }));
                    }
                }
            }
        }
    }
}

/// `CASCADE_SEED`, or the wall clock.
fn seed_from_env() -> u32 {
    if let Some(seed) = std::env::var("CASCADE_SEED")
        .ok()
        .and_then(|s| s.trim().parse().ok())
    {
        return seed;
    }
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

/// JSON-lines sink for core events.
struct EventLog {
    out: Option<BufWriter<File>>,
}

impl EventLog {
    fn from_env() -> Result<Self> {
        let path = std::env::var("CASCADE_LOG_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let Some(path) = path else {
            return Ok(Self { out: None });
        };
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open event log {path}"))?;
        Ok(Self {
            out: Some(BufWriter::new(file)),
        })
    }

    fn record(&mut self, event: &CoreEvent) {
        if self.out.is_some() {
            self.record_json(event_json(event));
        }
    }

    fn record_json(&mut self, value: serde_json::Value) {
        let Some(out) = self.out.as_mut() else {
            return;
        };
        // A failing log must not end the game; stop logging instead.
        if serde_json::to_writer(&mut *out, &value).is_err() || out.write_all(b"\n").is_err() {
            self.out = None;
        }
    }

    fn flush(&mut self) {
        if let Some(out) = self.out.as_mut() {
            let _ = out.flush();
        }
    }
}

fn event_json(event: &CoreEvent) -> serde_json::Value {
    match *event {
        CoreEvent::Locked {
            kind,
            x,
            y,
            rotation,
        } => json!({
            "event": "locked",
            "kind": kind.as_str(),
            "x": x,
            "y": y,
            "rotation": rotation.degrees(),
        }),
        CoreEvent::LinesCleared {
            pass,
            rows,
            points,
            drop_interval_ms,
        } => json!({
            "event": "lines_cleared",
            "pass": pass,
            "rows": rows,
            "points": points,
            "drop_interval_ms": drop_interval_ms,
        }),
        CoreEvent::GravityCapped { iterations } => {
            json!({ "event": "gravity_capped", "iterations": iterations })
        }
        CoreEvent::Modifier { modifier, outcome } => json!({
            "event": "modifier",
            "modifier": modifier.as_str(),
            "outcome": format!("{outcome:?}"),
        }),
        CoreEvent::GameOver { score, elapsed_ms } => {
            json!({ "event": "game_over", "score": score, "elapsed_ms": elapsed_ms })
        }
    }
}
