//! Board effects of the one-shot modifiers
//!
//! Only the geometric effects live here. Charging penalties, the used-once
//! bookkeeping and the slow/replace modifiers belong to
//! [`crate::game_state::GameState`].

use crate::gravity::{settle_with, SettleOutcome};
use crate::registry::{Playfield, RemovalReport};
use crate::rng::SimpleRng;
use crate::types::{BOARD_HEIGHT, GRAVITY_MAX_ITERATIONS};

/// Cells removed by a modifier and the settling run that followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EffectReport {
    pub removal: RemovalReport,
    pub settle: SettleOutcome,
}

/// First row of the bottom band of `rows` rows.
pub fn bottom_band_start(rows: u8) -> i8 {
    BOARD_HEIGHT.saturating_sub(rows) as i8
}

/// Blast test for a bomb centred on `(cx, cy)`.
///
/// Columns within `radius` of the epicentre (Euclidean distance along x) are
/// hit across `height` rows starting at the epicentre row.
pub fn in_blast(cx: i8, cy: i8, radius: u8, height: u8, x: i8, y: i8) -> bool {
    let dx = (x - cx) as i32;
    let r = radius as i32;
    dx * dx <= r * r && y >= cy && (y as i32) < cy as i32 + height as i32
}

/// Uniformly chosen occupied cell, or `None` on an empty board.
pub fn pick_epicenter(field: &Playfield, rng: &mut SimpleRng) -> Option<(i8, i8)> {
    let count = field.board().occupied_count();
    if count == 0 {
        return None;
    }
    let pick = rng.next_range(count as u32) as usize;
    field.board().occupied_cells().nth(pick)
}

/// Remove the bottom `rows` rows regardless of completeness, then settle.
///
/// `blocked` is passed through to gravity (the active piece's cells).
pub fn clear_bottom_rows(
    field: &mut Playfield,
    rows: u8,
    blocked: impl Fn(i8, i8) -> bool,
) -> EffectReport {
    let start = bottom_band_start(rows);
    let removal = field.remove_cells(|_, y| y >= start);
    let settle = settle_with(field, GRAVITY_MAX_ITERATIONS, blocked);
    EffectReport { removal, settle }
}

/// Remove every cell inside the blast around `epicenter`, then settle.
pub fn detonate(
    field: &mut Playfield,
    epicenter: (i8, i8),
    radius: u8,
    height: u8,
    blocked: impl Fn(i8, i8) -> bool,
) -> EffectReport {
    let (cx, cy) = epicenter;
    let removal = field.remove_cells(|x, y| in_blast(cx, cy, radius, height, x, y));
    let settle = settle_with(field, GRAVITY_MAX_ITERATIONS, blocked);
    EffectReport { removal, settle }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PlacedPiece;
    use crate::shape::Shape;
    use crate::types::{PieceKind, Rotation};

    fn bar(x: i8, y: i8) -> PlacedPiece {
        PlacedPiece {
            shape: Shape::from_rows(&[&[1, 1, 1, 1]]),
            x,
            y,
            kind: PieceKind::I,
            rotation: Rotation::Deg0,
            modified: false,
        }
    }

    #[test]
    fn blast_covers_columns_within_radius_below_epicenter() {
        assert!(in_blast(5, 10, 2, 3, 3, 10));
        assert!(in_blast(5, 10, 2, 3, 7, 12));
        assert!(!in_blast(5, 10, 2, 3, 8, 10));
        assert!(!in_blast(5, 10, 2, 3, 5, 9));
        assert!(!in_blast(5, 10, 2, 3, 5, 13));
    }

    #[test]
    fn epicenter_on_empty_board_is_none() {
        let field = Playfield::new();
        let mut rng = SimpleRng::new(7);
        assert_eq!(pick_epicenter(&field, &mut rng), None);
    }

    #[test]
    fn epicenter_is_an_occupied_cell() {
        let mut field = Playfield::new();
        field.insert(bar(0, 19));
        let mut rng = SimpleRng::new(99);
        for _ in 0..20 {
            let (x, y) = pick_epicenter(&field, &mut rng).unwrap();
            assert!(field.board().is_occupied(x, y));
        }
    }

    #[test]
    fn bottom_row_clear_trims_and_settles() {
        let mut field = Playfield::new();
        field.insert(bar(0, 19));
        field.insert(bar(0, 18));
        field.insert(bar(4, 15));

        let report = clear_bottom_rows(&mut field, 2, |_, _| false);
        assert_eq!(report.removal.pieces_dropped, 2);
        assert!(report.settle.converged);
        assert_eq!(field.pieces().len(), 1);
        assert_eq!(field.pieces().as_slice()[0].y, 19);
        assert!(field.is_consistent());
    }

    #[test]
    fn bomb_splits_bar_and_drops_pieces() {
        let mut field = Playfield::new();
        field.insert(bar(0, 19));
        field.insert(bar(4, 19));

        // Columns 3..=5 of rows 19..21.
        let report = detonate(&mut field, (4, 19), 1, 3, |_, _| false);
        assert_eq!(report.removal.cells_removed, 3);
        assert_eq!(field.board().occupied_count(), 5);
        assert!(!field.board().is_occupied(4, 19));
        assert!(field.board().is_occupied(6, 19));
        assert!(field.is_consistent());
    }
}
