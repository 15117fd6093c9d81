//! Line-clear engine - scan, fragment, shift, settle, repeat
//!
//! Runs once per lock. Each pass:
//!
//! 1. Scan the grid for complete rows (pure; indices are fixed before any mutation)
//! 2. Cut those rows out of every placed piece (pieces may split or vanish)
//! 3. Remove the rows from the grid, bottom first
//! 4. Move every surviving piece down by the number of cleared rows strictly
//!    below its bottom edge
//! 5. Settle the registry with gravity
//!
//! and then rescans, because settled fragments can complete new rows. Scoring
//! is left to the caller, which gets one [`ClearPass`] per pass.

use arrayvec::ArrayVec;

use crate::board::RowList;
use crate::gravity::{settle, SettleOutcome};
use crate::registry::{Playfield, PlacedPiece};
use crate::types::BOARD_HEIGHT;

/// One scan-and-remove pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearPass {
    /// Cleared row indices as they were before removal, bottom to top.
    pub rows: RowList,
    /// Gravity run that followed the removal.
    pub settle: SettleOutcome,
}

impl ClearPass {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Everything the engine did for one lock event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub passes: ArrayVec<ClearPass, { BOARD_HEIGHT as usize }>,
}

impl CascadeReport {
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Rows cleared across all passes.
    pub fn total_rows(&self) -> usize {
        self.passes.iter().map(ClearPass::row_count).sum()
    }

    /// Passes after the first.
    pub fn cascades(&self) -> usize {
        self.passes.len().saturating_sub(1)
    }
}

/// Rows to add to a piece's anchor after `cleared` rows are removed.
///
/// Only rows strictly below the piece's bottom edge count.
pub fn rows_below(piece: &PlacedPiece, cleared: &[usize]) -> i8 {
    let bottom = piece.bottom();
    cleared.iter().filter(|&&row| row as i8 > bottom).count() as i8
}

/// Run one pass. Returns `None` if no row was complete.
pub fn clear_pass(field: &mut Playfield) -> Option<ClearPass> {
    let rows = field.board.complete_rows();
    if rows.is_empty() {
        return None;
    }

    field
        .pieces
        .remove_cells(|_, y| y >= 0 && rows.contains(&(y as usize)));
    field.board.remove_rows(&rows);

    for piece in field.pieces.as_mut_slice() {
        let shift = rows_below(piece, &rows);
        piece.y += shift;
    }
    field.recompute_grid_from_pieces();

    let settle = settle(field);
    Some(ClearPass { rows, settle })
}

/// Clear complete rows until none are left.
pub fn resolve_lines(field: &mut Playfield) -> CascadeReport {
    let mut report = CascadeReport::default();
    while !report.passes.is_full() {
        match clear_pass(field) {
            Some(pass) => report.passes.push(pass),
            None => break,
        }
    }
    report
}
