//! Gravity - discrete, whole-piece settling of the placed-piece registry
//!
//! Each iteration visits pieces lowest-first and moves a piece down one row
//! if every one of its cells can go there. Moves are atomic per piece and use
//! the live positions of the pieces already visited in the same iteration, so
//! a stack can settle in a single pass when the lowest piece falls first.
//! Iteration stops at a fixed point or at the iteration cap.

use crate::registry::{Playfield, PlacedPiece};
use crate::types::{BOARD_HEIGHT, BOARD_WIDTH, GRAVITY_MAX_ITERATIONS};

const NO_OWNER: u16 = u16::MAX;

/// Which piece covers each cell; `NO_OWNER` for empty cells.
type OwnerGrid = [[u16; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];

/// How a settling run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettleOutcome {
    /// Iterations executed, including the final one in which nothing moved.
    pub iterations: u32,
    /// Rows moved, summed over all pieces.
    pub rows_fallen: u32,
    /// False if the cap was reached while pieces were still moving.
    pub converged: bool,
}

/// Settle every placed piece with the default iteration cap.
pub fn settle(field: &mut Playfield) -> SettleOutcome {
    settle_with(field, GRAVITY_MAX_ITERATIONS, |_, _| false)
}

/// Settle with an explicit cap and an extra set of fixed obstacle cells.
///
/// `blocked` marks cells that are not part of the registry but must not be
/// entered, such as the cells of a still-falling active piece. The grid is
/// rebuilt from piece positions before returning, whether or not the run
/// converged.
pub fn settle_with(
    field: &mut Playfield,
    max_iterations: u32,
    blocked: impl Fn(i8, i8) -> bool,
) -> SettleOutcome {
    let mut outcome = SettleOutcome::default();
    let mut order: Vec<usize> = (0..field.pieces.len()).collect();

    while outcome.iterations < max_iterations {
        outcome.iterations += 1;

        let pieces = field.pieces.as_mut_slice();
        order.sort_by(|&a, &b| pieces[b].bottom().cmp(&pieces[a].bottom()));
        let mut owners = owner_grid(pieces);

        let mut moved = false;
        for &idx in &order {
            let piece = pieces[idx];
            if !can_fall(&piece, idx as u16, &owners, &blocked) {
                continue;
            }
            mark(&mut owners, &piece, NO_OWNER);
            pieces[idx].y += 1;
            mark(&mut owners, &pieces[idx], idx as u16);
            outcome.rows_fallen += 1;
            moved = true;
        }

        if !moved {
            outcome.converged = true;
            break;
        }
    }

    field.recompute_grid_from_pieces();
    outcome
}

fn owner_grid(pieces: &[PlacedPiece]) -> OwnerGrid {
    let mut owners = [[NO_OWNER; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
    for (idx, piece) in pieces.iter().enumerate() {
        mark(&mut owners, piece, idx as u16);
    }
    owners
}

fn mark(owners: &mut OwnerGrid, piece: &PlacedPiece, value: u16) {
    for (x, y) in piece.cells() {
        if in_bounds(x, y) {
            owners[y as usize][x as usize] = value;
        }
    }
}

fn in_bounds(x: i8, y: i8) -> bool {
    x >= 0 && x < BOARD_WIDTH as i8 && y >= 0 && y < BOARD_HEIGHT as i8
}

fn can_fall(
    piece: &PlacedPiece,
    idx: u16,
    owners: &OwnerGrid,
    blocked: &impl Fn(i8, i8) -> bool,
) -> bool {
    piece.cells().all(|(x, y)| {
        let below = y + 1;
        if below >= BOARD_HEIGHT as i8 || x < 0 || x >= BOARD_WIDTH as i8 {
            return false;
        }
        if below < 0 {
            return true;
        }
        let owner = owners[below as usize][x as usize];
        (owner == NO_OWNER || owner == idx) && !blocked(x, below)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;
    use crate::types::{PieceKind, Rotation};

    fn piece(rows: &[&[u8]], x: i8, y: i8) -> PlacedPiece {
        PlacedPiece {
            shape: Shape::from_rows(rows),
            x,
            y,
            kind: PieceKind::T,
            rotation: Rotation::Deg0,
            modified: false,
        }
    }

    #[test]
    fn test_settled_board_is_a_fixed_point() {
        let mut field = Playfield::new();
        field.insert(piece(&[&[1, 1, 1, 1]], 0, 19));
        let outcome = settle(&mut field);
        assert!(outcome.converged);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.rows_fallen, 0);
    }

    #[test]
    fn test_stack_falls_together_bottom_first() {
        let mut field = Playfield::new();
        // Two single cells stacked in column 0, floating at rows 10 and 11.
        field.insert(piece(&[&[1]], 0, 10));
        field.insert(piece(&[&[1]], 0, 11));
        let outcome = settle(&mut field);

        assert!(outcome.converged);
        let mut ys: Vec<i8> = field.pieces().iter().map(|p| p.y).collect();
        ys.sort();
        assert_eq!(ys, vec![18, 19]);
        // Lower piece moves first each iteration, so both fall 8 rows in 8 passes.
        assert_eq!(outcome.iterations, 9);
        assert!(field.is_consistent());
    }

    #[test]
    fn test_whole_piece_moves_atomically() {
        let mut field = Playfield::new();
        // Column 1 is supported at row 19; the overhang in column 0 stays put.
        field.insert(piece(&[&[1]], 1, 19));
        field.insert(piece(&[&[1, 1], &[0, 1]], 0, 17));
        settle(&mut field);

        let hanging = field
            .pieces()
            .iter()
            .find(|p| p.shape.cell_count() == 3)
            .unwrap();
        assert_eq!(hanging.y, 17);
        assert!(field.board().is_occupied(0, 17));
        assert!(!field.board().is_occupied(0, 18));
        assert!(!field.board().is_occupied(0, 19));
    }

    #[test]
    fn test_cap_stops_early_and_keeps_grid_consistent() {
        let mut field = Playfield::new();
        field.insert(piece(&[&[1]], 4, 0));
        let outcome = settle_with(&mut field, 3, |_, _| false);

        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 3);
        assert_eq!(field.pieces().as_slice()[0].y, 3);
        assert!(field.board().is_occupied(4, 3));
        assert!(field.is_consistent());
    }

    #[test]
    fn test_blocked_cells_act_as_obstacles() {
        let mut field = Playfield::new();
        field.insert(piece(&[&[1]], 2, 5));
        settle_with(&mut field, GRAVITY_MAX_ITERATIONS, |x, y| x == 2 && y == 12);
        assert_eq!(field.pieces().as_slice()[0].y, 11);
    }
}
