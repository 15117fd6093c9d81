//! GameView: maps a `core::GameSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::piece::catalog_shape;
use crate::core::{GameSnapshot, Shape};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{Modifier, PieceKind, SessionPhase, BOARD_HEIGHT, BOARD_WIDTH};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// One leaderboard line as shown in the side panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    pub name: String,
    pub score: u32,
    pub elapsed_ms: u64,
}

/// Rows shown under the side panel's LEADERBOARD heading.
const LEADERBOARD_ROWS: usize = 5;

const PLAY_BG: Rgb = Rgb::new(30, 30, 40);
const PANEL_BG: Rgb = Rgb::new(0, 0, 0);

/// A lightweight terminal renderer for the game.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
            anchor_y: AnchorY::Center,
        }
    }
}

/// Top-left corner of the board frame.
#[derive(Debug, Clone, Copy)]
struct Origin {
    x: u16,
    y: u16,
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w,
            cell_h,
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Render the current game state into an existing framebuffer.
    ///
    /// Callers can reuse a framebuffer across frames and only resize when the
    /// terminal size changes.
    pub fn render_into(&self, snap: &GameSnapshot, viewport: Viewport, fb: &mut FrameBuffer) {
        self.render_into_with_leaderboard(snap, None, viewport, fb);
    }

    pub fn render_into_with_leaderboard(
        &self,
        snap: &GameSnapshot,
        leaderboard: Option<&[LeaderboardRow]>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().into_cell(' '));

        let board_px_w = (BOARD_WIDTH as u16) * self.cell_w;
        let board_px_h = (BOARD_HEIGHT as u16) * self.cell_h;
        let frame_w = board_px_w + 2;
        let frame_h = board_px_h + 2;

        let origin = Origin {
            x: viewport.width.saturating_sub(frame_w) / 2,
            y: match self.anchor_y {
                AnchorY::Center => viewport.height.saturating_sub(frame_h) / 2,
                AnchorY::Top => 0,
            },
        };

        let bg = CellStyle::plain(Rgb::new(80, 80, 90), PLAY_BG);
        let border = CellStyle::plain(Rgb::new(200, 200, 200), PANEL_BG);

        fb.fill_rect(origin.x + 1, origin.y + 1, board_px_w, board_px_h, ' ', bg);
        self.draw_border(fb, origin.x, origin.y, frame_w, frame_h, border);

        // Grid cells; empty ones get a faint dot.
        for y in 0..BOARD_HEIGHT as u16 {
            for x in 0..BOARD_WIDTH as u16 {
                match PieceKind::from_color_index(snap.board[y as usize][x as usize]) {
                    Some(kind) => self.draw_board_cell(fb, origin, x, y, kind, false),
                    None => self.draw_empty_cell(fb, origin, x, y),
                }
            }
        }

        // Pieces that lost cells are drawn with a shaded glyph.
        for piece in snap.pieces.iter().filter(|p| p.modified) {
            for (x, y) in absolute_cells(&piece.shape, piece.x, piece.y) {
                self.draw_board_cell(fb, origin, x, y, piece.kind, true);
            }
        }

        if let Some(active) = snap.active {
            if let Some(landing_y) = snap.landing_y {
                let style = CellStyle {
                    dim: true,
                    ..CellStyle::plain(Rgb::new(140, 140, 140), PLAY_BG)
                };
                for (x, y) in absolute_cells(&active.shape, active.x, landing_y) {
                    self.fill_cell_rect(fb, origin, x, y, '░', style);
                }
            }
            for (x, y) in absolute_cells(&active.shape, active.x, active.y) {
                self.draw_board_cell(fb, origin, x, y, active.kind, false);
            }
        }

        self.draw_side_panel(fb, snap, leaderboard, viewport, origin, frame_w);

        let overlay = match snap.phase {
            SessionPhase::NotStarted => Some("PRESS ENTER"),
            SessionPhase::Paused => Some("PAUSED"),
            SessionPhase::GameOver => Some("GAME OVER"),
            SessionPhase::Running => None,
        };
        if let Some(text) = overlay {
            self.draw_overlay_text(fb, origin, frame_w, frame_h, text);
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, viewport, &mut fb);
        fb
    }

    pub fn render_with_leaderboard(
        &self,
        snap: &GameSnapshot,
        leaderboard: Option<&[LeaderboardRow]>,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into_with_leaderboard(snap, leaderboard, viewport, &mut fb);
        fb
    }

    fn draw_border(&self, fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
        if w < 2 || h < 2 {
            return;
        }

        fb.put_char(x, y, '┌', style);
        fb.put_char(x + w - 1, y, '┐', style);
        fb.put_char(x, y + h - 1, '└', style);
        fb.put_char(x + w - 1, y + h - 1, '┘', style);

        for dx in 1..w - 1 {
            fb.put_char(x + dx, y, '─', style);
            fb.put_char(x + dx, y + h - 1, '─', style);
        }
        for dy in 1..h - 1 {
            fb.put_char(x, y + dy, '│', style);
            fb.put_char(x + w - 1, y + dy, '│', style);
        }
    }

    fn draw_empty_cell(&self, fb: &mut FrameBuffer, origin: Origin, x: u16, y: u16) {
        let style = CellStyle {
            dim: true,
            ..CellStyle::plain(Rgb::new(90, 90, 100), PLAY_BG)
        };
        self.fill_cell_rect(fb, origin, x, y, '·', style);
    }

    fn draw_board_cell(
        &self,
        fb: &mut FrameBuffer,
        origin: Origin,
        x: u16,
        y: u16,
        kind: PieceKind,
        modified: bool,
    ) {
        let base = piece_color(kind);
        let (fg, ch) = if modified {
            (base.scaled(2, 3), '▓')
        } else {
            (base, '█')
        };
        let style = CellStyle {
            bold: !modified,
            ..CellStyle::plain(fg, PLAY_BG)
        };
        self.fill_cell_rect(fb, origin, x, y, ch, style);
    }

    fn fill_cell_rect(
        &self,
        fb: &mut FrameBuffer,
        origin: Origin,
        cell_x: u16,
        cell_y: u16,
        ch: char,
        style: CellStyle,
    ) {
        let px = origin.x + 1 + cell_x * self.cell_w;
        let py = origin.y + 1 + cell_y * self.cell_h;
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        leaderboard: Option<&[LeaderboardRow]>,
        viewport: Viewport,
        origin: Origin,
        frame_w: u16,
    ) {
        let panel_x = origin.x.saturating_add(frame_w).saturating_add(2);
        if panel_x >= viewport.width {
            return;
        }
        let panel_w = viewport.width - panel_x;
        if panel_w < 12 {
            return;
        }

        let label = CellStyle {
            bold: true,
            ..CellStyle::plain(Rgb::new(220, 220, 220), PANEL_BG)
        };
        let value = CellStyle::plain(Rgb::new(200, 200, 200), PANEL_BG);
        let dim = CellStyle { dim: true, ..value };

        let mut y = origin.y;
        fb.put_str(panel_x, y, "SCORE", label);
        fb.put_u32(panel_x, y + 1, snap.score, value);
        y = y.saturating_add(3);

        fb.put_str(panel_x, y, "TIME", label);
        fb.put_clock(panel_x, y + 1, snap.elapsed_ms, value);
        y = y.saturating_add(3);

        fb.put_str(panel_x, y, "SPEED", label);
        let end = fb.put_u32(panel_x, y + 1, snap.drop_interval_ms, value);
        fb.put_str(end, y + 1, "ms", dim);
        y = y.saturating_add(3);

        fb.put_str(panel_x, y, "LINES", label);
        fb.put_u32(panel_x, y + 1, snap.lines, value);
        y = y.saturating_add(3);

        fb.put_str(panel_x, y, "NEXT", label);
        if !snap.can_swap {
            fb.put_str(panel_x + 5, y, "(swapped)", dim);
        }
        let shape = catalog_shape(snap.next);
        let style = CellStyle::plain(piece_color(snap.next), PANEL_BG);
        for (dx, dy) in shape.cells() {
            let px = panel_x + dx as u16 * 2;
            fb.put_str(px, y + 1 + dy as u16, "██", style);
        }
        y = y.saturating_add(4);

        fb.put_str(panel_x, y, "BONUS", label);
        y = y.saturating_add(1);
        for modifier in Modifier::ALL {
            if y >= viewport.height {
                return;
            }
            let used = snap.modifier_used(modifier);
            let style = if used { dim } else { value };
            fb.put_u32(panel_x, y, modifier.index() as u32 + 1, style);
            let end = fb.put_str(panel_x + 2, y, modifier_label(modifier), style);
            if used {
                fb.put_str(end + 1, y, "used", dim);
            }
            y = y.saturating_add(1);
        }

        let Some(rows) = leaderboard else {
            return;
        };
        y = y.saturating_add(1);
        fb.put_str(panel_x, y, "LEADERBOARD", label);
        y = y.saturating_add(1);
        if rows.is_empty() {
            fb.put_str(panel_x, y, "-", dim);
        }
        for row in rows.iter().take(LEADERBOARD_ROWS) {
            if y >= viewport.height {
                break;
            }
            let name: String = row.name.chars().take(10).collect();
            fb.put_str(panel_x, y, &name, value);
            fb.put_u32(panel_x + 11, y, row.score, value);
            y = y.saturating_add(1);
        }
    }

    fn draw_overlay_text(
        &self,
        fb: &mut FrameBuffer,
        origin: Origin,
        frame_w: u16,
        frame_h: u16,
        text: &str,
    ) {
        let mid_y = origin.y.saturating_add(frame_h / 2);
        let text_w = text.chars().count() as u16;
        let x = origin.x.saturating_add(frame_w.saturating_sub(text_w) / 2);
        let style = CellStyle {
            bold: true,
            ..CellStyle::plain(Rgb::new(255, 255, 255), PANEL_BG)
        };
        fb.put_str(x, mid_y, text, style);
    }
}

/// On-board cells of a shape anchored at `(x, y)`.
fn absolute_cells(shape: &Shape, x: i8, y: i8) -> impl Iterator<Item = (u16, u16)> + '_ {
    shape.cells().filter_map(move |(dx, dy)| {
        let (cx, cy) = (x + dx as i8, y + dy as i8);
        (cx >= 0 && cx < BOARD_WIDTH as i8 && cy >= 0 && cy < BOARD_HEIGHT as i8)
            .then_some((cx as u16, cy as u16))
    })
}

fn piece_color(kind: PieceKind) -> Rgb {
    match kind {
        PieceKind::I => Rgb::new(80, 220, 220),
        PieceKind::O => Rgb::new(240, 220, 80),
        PieceKind::S => Rgb::new(100, 220, 120),
        PieceKind::Z => Rgb::new(220, 80, 80),
        PieceKind::L => Rgb::new(255, 165, 0),
        PieceKind::J => Rgb::new(80, 120, 220),
        PieceKind::T => Rgb::new(200, 120, 220),
    }
}

fn modifier_label(modifier: Modifier) -> &'static str {
    match modifier {
        Modifier::Slow => "SLOW",
        Modifier::RowClear => "CLEAR",
        Modifier::Bomb => "BOMB",
        Modifier::Replace => "REPLACE",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameState;

    fn find_row(fb: &FrameBuffer, needle: &str) -> Option<u16> {
        (0..fb.height()).find(|&y| fb.row_text(y).contains(needle))
    }

    #[test]
    fn overlay_tracks_phase() {
        let view = GameView::default();
        let mut game = GameState::new(7);
        let vp = Viewport::new(80, 24);

        let fb = view.render(&game.snapshot(), vp);
        assert!(find_row(&fb, "PRESS ENTER").is_some());

        game.start();
        let fb = view.render(&game.snapshot(), vp);
        assert!(find_row(&fb, "PRESS ENTER").is_none());
        assert!(find_row(&fb, "PAUSED").is_none());
    }

    #[test]
    fn side_panel_lists_modifiers() {
        let view = GameView::default();
        let mut game = GameState::new(7);
        game.start();
        let fb = view.render(&game.snapshot(), Viewport::new(80, 30));
        for label in ["SCORE", "TIME", "SPEED", "LINES", "NEXT", "BONUS", "REPLACE"] {
            assert!(find_row(&fb, label).is_some(), "missing {label}");
        }
        assert!(find_row(&fb, "700ms").is_some());
        assert!(find_row(&fb, "LEADERBOARD").is_none());
    }

    #[test]
    fn leaderboard_rows_are_listed() {
        let view = GameView::default();
        let snap = GameState::new(1).snapshot();
        let rows = vec![LeaderboardRow {
            name: "ada".to_string(),
            score: 4200,
            elapsed_ms: 90_000,
        }];
        let fb = view.render_with_leaderboard(&snap, Some(&rows), Viewport::new(80, 36));
        assert!(find_row(&fb, "LEADERBOARD").is_some());
        let row = find_row(&fb, "ada").unwrap();
        assert!(fb.row_text(row).contains("4200"));
    }

    #[test]
    fn tiny_viewport_does_not_panic() {
        let view = GameView::default();
        let snap = GameState::new(1).snapshot();
        let fb = view.render(&snap, Viewport::new(5, 3));
        assert_eq!(fb.width(), 5);
    }
}
