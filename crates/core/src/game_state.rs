//! Game state module - the session controller
//!
//! Ties together the playfield, the active piece, the piece queue, scoring and
//! the one-shot modifiers. Every command and every tick runs to completion
//! before returning: lock, line clears, cascades, gravity and respawn all
//! happen inside a single call, so a host only ever observes settled states.
//!
//! Lifecycle: `NotStarted -> Running <-> Paused -> GameOver`, and `Restart`
//! from any phase goes back to `NotStarted` with a fresh board.

use crate::line_clear::resolve_lines;
use crate::modifiers::{clear_bottom_rows, detonate, pick_epicenter, EffectReport};
use crate::piece::Tetromino;
use crate::registry::{PieceRegistry, Playfield};
use crate::rng::{PieceQueue, SimpleRng};
use crate::scoring::{apply_penalty, hard_drop_bonus, line_clear_points, sped_up_interval};
use crate::snapshot::{ActiveSnapshot, GameSnapshot, PieceSnapshot};
use crate::types::*;

/// Salt separating the effect RNG stream from the piece stream.
const EFFECT_RNG_SALT: u32 = 0x9E37_79B9;

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    config: GameConfig,
    field: Playfield,
    active: Option<Tetromino>,
    queue: PieceQueue,
    /// Randomness for board effects (bomb epicentre).
    effect_rng: SimpleRng,
    seed: u32,
    phase: SessionPhase,
    score: u32,
    lines: u32,
    drop_interval_ms: u32,
    drop_timer_ms: u32,
    elapsed_ms: u64,
    modifiers_used: [bool; 4],
    /// Swap with the next piece is allowed once per spawned piece.
    can_swap: bool,
    events: Vec<CoreEvent>,
}

impl GameState {
    /// Create a new game with the given RNG seed and default tuning
    pub fn new(seed: u32) -> Self {
        Self::with_config(seed, GameConfig::default())
    }

    pub fn with_config(seed: u32, config: GameConfig) -> Self {
        let mut state = Self {
            config,
            field: Playfield::new(),
            active: None,
            queue: PieceQueue::new(seed),
            effect_rng: SimpleRng::new(seed ^ EFFECT_RNG_SALT),
            seed,
            phase: SessionPhase::NotStarted,
            score: 0,
            lines: 0,
            drop_interval_ms: config.initial_drop_ms,
            drop_timer_ms: 0,
            elapsed_ms: 0,
            modifiers_used: [false; 4],
            can_swap: true,
            events: Vec::new(),
        };
        state.spawn_piece();
        state
    }

    /// Leave `NotStarted`. Returns false in any other phase.
    pub fn start(&mut self) -> bool {
        if self.phase != SessionPhase::NotStarted {
            return false;
        }
        self.phase = SessionPhase::Running;
        true
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn started(&self) -> bool {
        self.phase != SessionPhase::NotStarted
    }

    pub fn paused(&self) -> bool {
        self.phase == SessionPhase::Paused
    }

    pub fn game_over(&self) -> bool {
        self.phase == SessionPhase::GameOver
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Rows cleared this session, cascades included.
    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn drop_interval_ms(&self) -> u32 {
        self.drop_interval_ms
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn active(&self) -> Option<Tetromino> {
        self.active
    }

    pub fn next_piece(&self) -> PieceKind {
        self.queue.peek()
    }

    pub fn can_swap(&self) -> bool {
        self.can_swap
    }

    pub fn modifier_used(&self, modifier: Modifier) -> bool {
        self.modifiers_used[modifier.index()]
    }

    pub fn board(&self) -> &crate::board::Board {
        self.field.board()
    }

    pub fn pieces(&self) -> &PieceRegistry {
        self.field.pieces()
    }

    pub fn playfield(&self) -> &Playfield {
        &self.field
    }

    /// Direct access to the playfield for fixtures and replays.
    ///
    /// Callers must keep the grid derived from the registry (use
    /// [`Playfield::insert`] / [`Playfield::remove_cells`]).
    pub fn playfield_mut(&mut self) -> &mut Playfield {
        &mut self.field
    }

    /// Replace the active piece with a catalog piece at the spawn anchor.
    ///
    /// Scripted sessions use this to control the piece sequence. Returns false
    /// (and changes nothing) if the piece would not fit.
    pub fn force_active(&mut self, kind: PieceKind) -> bool {
        let (x, y) = self.config.spawn;
        let piece = Tetromino::new(kind, x, y);
        if !piece.fits(self.field.board()) {
            return false;
        }
        self.active = Some(piece);
        true
    }

    /// Row the active piece would land on.
    pub fn landing_y(&self) -> Option<i8> {
        self.active.map(|p| p.landing_y(self.field.board()))
    }

    /// Events produced since the last drain, oldest first.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, CoreEvent> {
        self.events.drain(..)
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.field.board().write_u8_grid(&mut out.board);
        out.pieces.clear();
        out.pieces
            .extend(self.field.pieces().iter().map(PieceSnapshot::from));
        out.active = self.active.map(ActiveSnapshot::from);
        out.landing_y = self.landing_y();
        out.next = self.queue.peek();
        out.can_swap = self.can_swap;
        out.phase = self.phase;
        out.seed = self.seed;
        out.score = self.score;
        out.lines = self.lines;
        out.drop_interval_ms = self.drop_interval_ms;
        out.elapsed_ms = self.elapsed_ms;
        out.modifiers_used = self.modifiers_used;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    /// Spawn the queued piece. Entering game over if it does not fit.
    fn spawn_piece(&mut self) -> bool {
        let kind = self.queue.draw();
        let (x, y) = self.config.spawn;
        let piece = Tetromino::new(kind, x, y);
        self.can_swap = true;
        self.drop_timer_ms = 0;

        if !piece.fits(self.field.board()) {
            self.active = None;
            self.enter_game_over();
            return false;
        }
        self.active = Some(piece);
        true
    }

    fn enter_game_over(&mut self) {
        self.phase = SessionPhase::GameOver;
        self.events.push(CoreEvent::GameOver {
            score: self.score,
            elapsed_ms: self.elapsed_ms,
        });
    }

    fn running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    fn try_move(&mut self, dx: i8) -> bool {
        let Some(mut active) = self.active else {
            return false;
        };
        if !active.move_horizontal(dx, self.field.board()) {
            return false;
        }
        self.active = Some(active);
        true
    }

    fn try_rotate(&mut self, action: GameAction) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        let board = self.field.board();
        let rotated = match action {
            GameAction::RotateCw => active.try_rotate_cw(board).map(|(p, _)| p),
            GameAction::RotateCcw => active.try_rotate_ccw(board),
            GameAction::Rotate180 => active.try_rotate_180(board),
            _ => None,
        };
        match rotated {
            Some(piece) => {
                self.active = Some(piece);
                true
            }
            None => false,
        }
    }

    /// Advance the active piece one row, locking it if it cannot move.
    fn step_down(&mut self) -> bool {
        let Some(mut active) = self.active else {
            return false;
        };
        self.drop_timer_ms = 0;
        if active.drop_one_row(self.field.board()) {
            self.active = Some(active);
        } else {
            self.lock_piece();
        }
        true
    }

    /// Drop to the landing row, award the height bonus and lock.
    pub(crate) fn hard_drop(&mut self) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        let landing = active.landing_y(self.field.board());
        let rows = (landing - active.y).max(0) as u32;
        self.active = Some(Tetromino {
            y: landing,
            ..active
        });
        self.score = self
            .score
            .saturating_add(hard_drop_bonus(&self.config, rows));
        self.lock_piece();
        true
    }

    /// Exchange the active piece with the previewed one, keeping the anchor.
    pub(crate) fn swap_with_next(&mut self) -> bool {
        if !self.can_swap {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };
        let swapped = Tetromino::new(self.queue.peek(), active.x, active.y);
        if !swapped.fits(self.field.board()) {
            return false;
        }
        self.queue.swap_next(active.kind);
        self.active = Some(swapped);
        self.can_swap = false;
        true
    }

    /// Merge the active piece, resolve clears and cascades, then respawn.
    pub fn lock_piece(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        self.field.lock(&active);
        self.score = self.score.saturating_add(self.config.placement_score);
        self.events.push(CoreEvent::Locked {
            kind: active.kind,
            x: active.x,
            y: active.y,
            rotation: active.rotation(),
        });

        let report = resolve_lines(&mut self.field);
        for (i, pass) in report.passes.iter().enumerate() {
            let rows = pass.row_count();
            let points = line_clear_points(&self.config, rows);
            self.score = self.score.saturating_add(points);
            self.lines += rows as u32;
            self.drop_interval_ms =
                sped_up_interval(&self.config, self.drop_interval_ms, rows as u32);
            self.events.push(CoreEvent::LinesCleared {
                pass: i as u32 + 1,
                rows: rows as u32,
                points,
                drop_interval_ms: self.drop_interval_ms,
            });
            if !pass.settle.converged {
                self.events.push(CoreEvent::GravityCapped {
                    iterations: pass.settle.iterations,
                });
            }
        }

        self.spawn_piece();
    }

    /// Use a one-shot modifier.
    ///
    /// Only while running. The modifier is marked used and its penalty charged
    /// before the effect runs, so a no-target or blocked activation still
    /// consumes it. Replace needs an active piece and is otherwise
    /// `Unavailable` without being consumed.
    pub fn activate_modifier(&mut self, modifier: Modifier) -> ModifierOutcome {
        let outcome = self.run_modifier(modifier);
        self.events.push(CoreEvent::Modifier { modifier, outcome });
        outcome
    }

    fn run_modifier(&mut self, modifier: Modifier) -> ModifierOutcome {
        if !self.running() {
            return ModifierOutcome::Unavailable;
        }
        if self.modifiers_used[modifier.index()] {
            return ModifierOutcome::AlreadyUsed;
        }
        if modifier == Modifier::Replace && self.active.is_none() {
            return ModifierOutcome::Unavailable;
        }

        self.modifiers_used[modifier.index()] = true;
        self.score = apply_penalty(self.score, self.config.modifiers.penalty(modifier));

        let mods = self.config.modifiers;
        let active = self.active;
        let blocked = move |x: i8, y: i8| active.is_some_and(|p| p.cells().any(|c| c == (x, y)));

        match modifier {
            Modifier::Slow => {
                self.drop_interval_ms = self.drop_interval_ms.saturating_add(mods.slow_amount_ms);
                ModifierOutcome::Applied
            }
            Modifier::RowClear => {
                let report = clear_bottom_rows(&mut self.field, mods.clear_rows, blocked);
                self.effect_outcome(report)
            }
            Modifier::Bomb => match pick_epicenter(&self.field, &mut self.effect_rng) {
                None => ModifierOutcome::AppliedNoTarget,
                Some(epicenter) => {
                    let report = detonate(
                        &mut self.field,
                        epicenter,
                        mods.bomb_radius,
                        mods.bomb_height,
                        blocked,
                    );
                    self.effect_outcome(report)
                }
            },
            Modifier::Replace => {
                if self.replace_active() {
                    ModifierOutcome::Applied
                } else {
                    ModifierOutcome::Blocked
                }
            }
        }
    }

    fn effect_outcome(&mut self, report: EffectReport) -> ModifierOutcome {
        if !report.settle.converged {
            self.events.push(CoreEvent::GravityCapped {
                iterations: report.settle.iterations,
            });
        }
        if report.removal.cells_removed == 0 {
            ModifierOutcome::AppliedNoTarget
        } else {
            ModifierOutcome::Applied
        }
    }

    /// Swap the active piece for the linear piece.
    ///
    /// Candidate anchors, first fit wins: the current anchor, the centred
    /// column, the centred column one row up, the spawn anchor. If none fit the
    /// original piece is kept.
    fn replace_active(&mut self) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        let board = self.field.board();
        let centred = (active.x - 1).clamp(0, BOARD_WIDTH as i8 - 4);
        let (spawn_x, spawn_y) = self.config.spawn;
        let candidates = [
            (active.x, active.y),
            (centred, active.y),
            (centred, (active.y - 1).max(0)),
            (spawn_x, spawn_y),
        ];

        let replacement = candidates
            .iter()
            .map(|&(x, y)| Tetromino::new(PieceKind::I, x, y))
            .find(|p| p.fits(board));
        match replacement {
            Some(piece) => {
                self.active = Some(piece);
                true
            }
            None => false,
        }
    }

    /// Main game tick - advance timers and apply automatic drops
    ///
    /// Returns true if the active piece moved or locked.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        if !self.running() {
            return false;
        }
        self.elapsed_ms += elapsed_ms as u64;
        self.drop_timer_ms = self.drop_timer_ms.saturating_add(elapsed_ms);
        if self.drop_timer_ms <= self.drop_interval_ms {
            return false;
        }
        self.step_down()
    }

    /// Apply a game action
    ///
    /// Returns true if the action changed the session.
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::Start => self.start(),
            GameAction::Pause => match self.phase {
                SessionPhase::Running => {
                    self.phase = SessionPhase::Paused;
                    true
                }
                SessionPhase::Paused => {
                    self.phase = SessionPhase::Running;
                    true
                }
                _ => false,
            },
            GameAction::Restart => {
                let seed = self.queue.seed();
                *self = Self::with_config(seed, self.config);
                true
            }
            GameAction::Activate(modifier) => self.activate_modifier(modifier).consumed(),
            _ if !self.running() => false,
            GameAction::MoveLeft => self.try_move(-1),
            GameAction::MoveRight => self.try_move(1),
            GameAction::SoftDrop => self.step_down(),
            GameAction::HardDrop => self.hard_drop(),
            GameAction::RotateCw | GameAction::RotateCcw | GameAction::Rotate180 => {
                self.try_rotate(action)
            }
            GameAction::SwapWithNext => self.swap_with_next(),
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PlacedPiece;
    use crate::shape::Shape;

    fn running(seed: u32) -> GameState {
        let mut state = GameState::new(seed);
        state.start();
        state
    }

    fn single(x: i8, y: i8) -> PlacedPiece {
        PlacedPiece {
            shape: Shape::from_rows(&[&[1]]),
            x,
            y,
            kind: PieceKind::O,
            rotation: Rotation::Deg0,
            modified: false,
        }
    }

    #[test]
    fn test_new_game_state() {
        let state = GameState::new(12345);
        assert_eq!(state.phase(), SessionPhase::NotStarted);
        assert_eq!(state.score(), 0);
        assert_eq!(state.drop_interval_ms(), 700);
        assert!(state.active().is_some());
        assert!(state.pieces().is_empty());
    }

    #[test]
    fn test_not_started_ignores_input_and_ticks() {
        let mut state = GameState::new(1);
        let before = state.active();
        assert!(!state.apply_action(GameAction::MoveLeft));
        assert!(!state.tick(10_000));
        assert_eq!(state.active(), before);
        assert_eq!(state.elapsed_ms(), 0);
    }

    #[test]
    fn test_pause_toggles_and_freezes_time() {
        let mut state = running(5);
        assert!(state.apply_action(GameAction::Pause));
        assert!(state.paused());
        assert!(!state.tick(1000));
        assert_eq!(state.elapsed_ms(), 0);
        assert!(state.apply_action(GameAction::Pause));
        assert_eq!(state.phase(), SessionPhase::Running);
    }

    #[test]
    fn test_tick_drops_after_interval() {
        let mut state = running(9);
        let y0 = state.active().unwrap().y;
        assert!(!state.tick(700));
        assert_eq!(state.active().unwrap().y, y0);
        assert!(state.tick(1));
        assert_eq!(state.active().unwrap().y, y0 + 1);
        assert_eq!(state.elapsed_ms(), 701);
    }

    #[test]
    fn test_hard_drop_scores_placement_and_height_bonus() {
        let mut state = running(3);
        assert!(state.force_active(PieceKind::O));
        assert!(state.apply_action(GameAction::HardDrop));
        // 18 rows: round(18 / 4) * 10 = 50, plus 10 for placing.
        assert_eq!(state.score(), 60);
        assert_eq!(state.pieces().len(), 1);
        assert!(state.playfield().is_consistent());

        let events: Vec<_> = state.drain_events().collect();
        assert!(matches!(events[0], CoreEvent::Locked { kind: PieceKind::O, x: 3, y: 18, .. }));
    }

    #[test]
    fn test_modifier_used_once() {
        let mut state = running(11);
        state.score = 1000;
        assert_eq!(state.activate_modifier(Modifier::Slow), ModifierOutcome::Applied);
        assert_eq!(state.drop_interval_ms(), 1100);
        assert_eq!(state.score(), 500);

        assert_eq!(state.activate_modifier(Modifier::Slow), ModifierOutcome::AlreadyUsed);
        assert_eq!(state.drop_interval_ms(), 1100);
        assert_eq!(state.score(), 500);
    }

    #[test]
    fn test_modifier_unavailable_when_not_running() {
        let mut state = GameState::new(11);
        assert_eq!(state.activate_modifier(Modifier::Bomb), ModifierOutcome::Unavailable);
        assert!(!state.modifier_used(Modifier::Bomb));
    }

    #[test]
    fn test_bomb_on_empty_board_is_no_target() {
        let mut state = running(4);
        assert_eq!(state.activate_modifier(Modifier::Bomb), ModifierOutcome::AppliedNoTarget);
        assert!(state.modifier_used(Modifier::Bomb));
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_row_clear_keeps_active_piece_clear_of_settling() {
        let mut state = running(8);
        for x in 0..10 {
            state.playfield_mut().insert(single(x, 19));
        }
        state.playfield_mut().insert(single(4, 10));
        assert_eq!(state.activate_modifier(Modifier::RowClear), ModifierOutcome::Applied);
        assert_eq!(state.board().occupied_count(), 1);
        assert!(state.board().is_occupied(4, 19));
        assert!(state.playfield().is_consistent());
    }

    #[test]
    fn test_replace_falls_back_to_centred_column() {
        let mut state = running(21);
        assert!(state.force_active(PieceKind::O));
        // Move the O against the right wall: x = 8, where a bar cannot fit.
        for _ in 0..5 {
            state.apply_action(GameAction::MoveRight);
        }
        assert_eq!(state.active().unwrap().x, 8);

        assert_eq!(state.activate_modifier(Modifier::Replace), ModifierOutcome::Applied);
        let active = state.active().unwrap();
        assert_eq!(active.kind, PieceKind::I);
        assert_eq!((active.x, active.y), (6, 0));
    }

    #[test]
    fn test_replace_blocked_restores_original() {
        let mut state = running(21);
        assert!(state.force_active(PieceKind::O));
        // Fill row 1 except under the O so no bar placement fits anywhere.
        for x in 0..10 {
            if x != 3 && x != 4 {
                state.playfield_mut().insert(single(x, 0));
                state.playfield_mut().insert(single(x, 1));
            }
        }
        let before = state.active();
        assert_eq!(state.activate_modifier(Modifier::Replace), ModifierOutcome::Blocked);
        assert_eq!(state.active(), before);
        assert!(state.modifier_used(Modifier::Replace));
    }

    #[test]
    fn test_swap_with_next_once_per_piece() {
        let mut state = running(77);
        let current = state.active().unwrap().kind;
        let next = state.next_piece();
        assert!(state.apply_action(GameAction::SwapWithNext));
        assert_eq!(state.active().unwrap().kind, next);
        assert_eq!(state.next_piece(), current);
        assert!(!state.apply_action(GameAction::SwapWithNext));
    }

    #[test]
    fn test_game_over_when_spawn_blocked() {
        let mut state = running(6);
        assert!(state.force_active(PieceKind::I));
        // Row 1 nearly full: the bar locks in row 0 and nothing can spawn.
        for x in 0..9 {
            state.playfield_mut().insert(single(x, 1));
        }
        state.apply_action(GameAction::HardDrop);
        assert!(state.game_over());
        assert!(state.active().is_none());
        assert!(state
            .drain_events()
            .any(|e| matches!(e, CoreEvent::GameOver { .. })));
        assert!(!state.apply_action(GameAction::MoveLeft));
    }

    #[test]
    fn test_restart_returns_to_not_started() {
        let mut state = running(6);
        state.apply_action(GameAction::HardDrop);
        state.apply_action(GameAction::Activate(Modifier::Slow));
        assert!(state.apply_action(GameAction::Restart));
        assert_eq!(state.phase(), SessionPhase::NotStarted);
        assert_eq!(state.score(), 0);
        assert!(state.pieces().is_empty());
        assert!(!state.modifier_used(Modifier::Slow));
        assert_eq!(state.drop_interval_ms(), 700);
        assert!(state.active().is_some());
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut state = running(12);
        state.apply_action(GameAction::HardDrop);
        let snap = state.snapshot();
        assert_eq!(snap.score, state.score());
        assert_eq!(snap.pieces.len(), 1);
        assert_eq!(snap.next, state.next_piece());
        assert!(snap.playable());
        let cells: usize = snap.board.iter().flatten().filter(|&&c| c != 0).count();
        assert_eq!(cells, 4);
    }
}
