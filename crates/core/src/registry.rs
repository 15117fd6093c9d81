//! Placed-piece registry and the `Playfield` aggregate
//!
//! Locked pieces keep their own shape, anchor, kind and rendering angle after
//! they land, so that line clears and modifiers can cut them apart and the
//! gravity pass can move them as rigid bodies. The board grid is derived data:
//! [`Playfield::recompute_grid_from_pieces`] rebuilds it from the registry at
//! every mutation boundary, which keeps the invariant
//! "a cell is filled iff exactly one placed piece covers it".

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::piece::Tetromino;
use crate::shape::{compact, find_connected_components, Component, Shape};
use crate::types::{PieceKind, Rotation, BOARD_HEIGHT, BOARD_WIDTH};

/// A locked piece, or a fragment of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlacedPiece {
    pub shape: Shape,
    pub x: i8,
    pub y: i8,
    pub kind: PieceKind,
    pub rotation: Rotation,
    /// Set once any original cell has been removed; never cleared.
    pub modified: bool,
}

impl PlacedPiece {
    pub fn from_tetromino(piece: &Tetromino) -> Self {
        Self {
            shape: piece.shape,
            x: piece.x,
            y: piece.y,
            kind: piece.kind,
            rotation: piece.rotation(),
            modified: false,
        }
    }

    /// Absolute coordinates of every occupied cell.
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.shape
            .cells()
            .map(move |(dx, dy)| (self.x + dx as i8, self.y + dy as i8))
    }

    /// Lowest board row spanned by the shape rectangle.
    pub fn bottom(&self) -> i8 {
        self.y + self.shape.height() as i8 - 1
    }
}

/// Turn one connected component of `original`'s shape into its own piece.
///
/// The new anchor is the original anchor plus the component's bounding-box
/// minimum; kind and angle are inherited and the result is always modified.
pub fn component_to_piece(component: &Component, original: &PlacedPiece) -> Option<PlacedPiece> {
    let (shape, (min_x, min_y)) = component.to_shape()?;
    Some(PlacedPiece {
        shape,
        x: original.x + min_x as i8,
        y: original.y + min_y as i8,
        modified: true,
        ..*original
    })
}

/// What a partial-removal sweep did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemovalReport {
    /// Cells taken out of pieces.
    pub cells_removed: usize,
    /// Pieces that lost at least one cell.
    pub pieces_affected: usize,
    /// Pieces that lost every cell (or degenerated) and were dropped.
    pub pieces_dropped: usize,
    /// New pieces created from split-off components.
    pub fragments_created: usize,
}

/// Outcome of cutting cells out of one piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trim {
    /// Nothing matched; the piece is unchanged.
    Untouched,
    /// The piece is gone.
    Removed,
    /// The piece survives (possibly reshaped and moved) with split-off fragments.
    Kept {
        piece: PlacedPiece,
        fragments: ArrayVec<PlacedPiece, 16>,
    },
}

/// Remove every cell of `piece` for which `hit` is true and restore connectivity.
///
/// 1. Zero the hit cells.
/// 2. Strip empty border rows (the anchor follows rows stripped from the top).
/// 3. No cells left: the piece is removed.
/// 4. One component: same piece, new shape, marked modified.
/// 5. Several: the largest (first found on ties) continues the piece, every
///    other component becomes a new piece.
pub fn trim_piece(piece: &PlacedPiece, hit: impl Fn(i8, i8) -> bool) -> (Trim, usize) {
    let mut shape = piece.shape;
    let mut removed = 0usize;
    for (dx, dy) in piece.shape.cells() {
        if hit(piece.x + dx as i8, piece.y + dy as i8) {
            shape.set(dx, dy, false);
            removed += 1;
        }
    }
    if removed == 0 {
        return (Trim::Untouched, 0);
    }

    let Some(compacted) = compact(&shape) else {
        return (Trim::Removed, removed);
    };
    let trimmed = PlacedPiece {
        shape: compacted.shape,
        y: piece.y + compacted.rows_removed_above as i8,
        modified: true,
        ..*piece
    };

    let components = find_connected_components(&trimmed.shape);
    let result = match components.len() {
        0 => Trim::Removed,
        1 => Trim::Kept {
            piece: trimmed,
            fragments: ArrayVec::new(),
        },
        _ => {
            let mut largest = 0;
            for (i, c) in components.iter().enumerate() {
                if c.len() > components[largest].len() {
                    largest = i;
                }
            }

            match component_to_piece(&components[largest], &trimmed) {
                None => Trim::Removed,
                Some(continuation) => {
                    let fragments = components
                        .iter()
                        .enumerate()
                        .filter(|&(i, _)| i != largest)
                        .filter_map(|(_, c)| component_to_piece(c, &trimmed))
                        .collect();
                    Trim::Kept {
                        piece: continuation,
                        fragments,
                    }
                }
            }
        }
    };
    (result, removed)
}

/// Unordered collection of placed pieces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PieceRegistry {
    pieces: Vec<PlacedPiece>,
}

impl PieceRegistry {
    pub fn new() -> Self {
        Self { pieces: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlacedPiece> {
        self.pieces.iter()
    }

    pub fn as_slice(&self) -> &[PlacedPiece] {
        &self.pieces
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [PlacedPiece] {
        &mut self.pieces
    }

    pub fn push(&mut self, piece: PlacedPiece) {
        if !piece.shape.is_empty() {
            self.pieces.push(piece);
        }
    }

    pub fn clear(&mut self) {
        self.pieces.clear();
    }

    /// Apply [`trim_piece`] to every piece. Split-off fragments are appended
    /// after the surviving pieces and are not themselves re-trimmed.
    pub fn remove_cells(&mut self, hit: impl Fn(i8, i8) -> bool) -> RemovalReport {
        let mut report = RemovalReport::default();
        let mut kept = Vec::with_capacity(self.pieces.len());
        let mut fragments = Vec::new();

        for piece in self.pieces.drain(..) {
            let (trim, removed) = trim_piece(&piece, &hit);
            report.cells_removed += removed;
            match trim {
                Trim::Untouched => kept.push(piece),
                Trim::Removed => {
                    report.pieces_affected += 1;
                    report.pieces_dropped += 1;
                }
                Trim::Kept {
                    piece,
                    fragments: split,
                } => {
                    report.pieces_affected += 1;
                    report.fragments_created += split.len();
                    kept.push(piece);
                    fragments.extend(split);
                }
            }
        }

        kept.extend(fragments);
        self.pieces = kept;
        report
    }
}

/// Board grid plus the registry it is derived from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Playfield {
    pub(crate) board: Board,
    pub(crate) pieces: PieceRegistry,
}

impl Playfield {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn pieces(&self) -> &PieceRegistry {
        &self.pieces
    }

    /// Merge a piece into both the registry and the grid.
    pub fn lock(&mut self, piece: &Tetromino) -> PlacedPiece {
        let placed = PlacedPiece::from_tetromino(piece);
        self.board
            .fill_cells(placed.shape.cells(), placed.x, placed.y, placed.kind);
        self.pieces.push(placed);
        placed
    }

    /// Insert an already-placed piece (fixtures, replays) and refresh the grid.
    pub fn insert(&mut self, piece: PlacedPiece) {
        self.pieces.push(piece);
        self.recompute_grid_from_pieces();
    }

    /// Rebuild the grid from piece positions. Cells off the board are skipped.
    pub fn recompute_grid_from_pieces(&mut self) {
        self.board.clear();
        for piece in self.pieces.iter() {
            self.board
                .fill_cells(piece.shape.cells(), piece.x, piece.y, piece.kind);
        }
    }

    /// Cut cells out of pieces, then rebuild the grid.
    pub fn remove_cells(&mut self, hit: impl Fn(i8, i8) -> bool) -> RemovalReport {
        let report = self.pieces.remove_cells(hit);
        self.recompute_grid_from_pieces();
        report
    }

    pub fn clear(&mut self) {
        self.board.clear();
        self.pieces.clear();
    }

    /// Every filled cell is covered by exactly one piece of the same kind, and
    /// every piece cell is on the board and filled.
    pub fn is_consistent(&self) -> bool {
        let mut cover = [[0u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
        for piece in self.pieces.iter() {
            for (x, y) in piece.cells() {
                if self.board.get(x, y) != Some(Some(piece.kind)) {
                    return false;
                }
                cover[y as usize][x as usize] += 1;
            }
        }
        self.board
            .occupied_cells()
            .all(|(x, y)| cover[y as usize][x as usize] == 1)
            && cover.iter().flatten().all(|&n| n <= 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed(rows: &[&[u8]], x: i8, y: i8, kind: PieceKind) -> PlacedPiece {
        PlacedPiece {
            shape: Shape::from_rows(rows),
            x,
            y,
            kind,
            rotation: Rotation::Deg0,
            modified: false,
        }
    }

    #[test]
    fn trim_untouched_piece_is_unchanged() {
        let p = placed(&[&[1, 1], &[1, 1]], 0, 0, PieceKind::O);
        let (trim, removed) = trim_piece(&p, |_, y| y == 5);
        assert_eq!(trim, Trim::Untouched);
        assert_eq!(removed, 0);
    }

    #[test]
    fn trim_top_row_moves_anchor_down() {
        // Vertical 3-tall L-ish column at rows 10..12; remove row 10.
        let p = placed(&[&[1, 0], &[1, 0], &[1, 1]], 4, 10, PieceKind::L);
        let (trim, removed) = trim_piece(&p, |_, y| y == 10);
        assert_eq!(removed, 1);
        match trim {
            Trim::Kept { piece, fragments } => {
                assert!(fragments.is_empty());
                assert_eq!(piece.y, 11);
                assert_eq!(piece.x, 4);
                assert!(piece.modified);
                assert_eq!(piece.shape, Shape::from_rows(&[&[1, 0], &[1, 1]]));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn trim_middle_row_splits_into_components() {
        // 3 rows; clearing the middle leaves a 2-cell top and a 1-cell bottom.
        let p = placed(&[&[1, 1], &[1, 0], &[0, 1]], 2, 5, PieceKind::J);
        let (trim, _) = trim_piece(&p, |_, y| y == 6);
        match trim {
            Trim::Kept { piece, fragments } => {
                assert_eq!(piece.shape, Shape::from_rows(&[&[1, 1]]));
                assert_eq!((piece.x, piece.y), (2, 5));
                assert_eq!(fragments.len(), 1);
                assert_eq!(fragments[0].shape, Shape::from_rows(&[&[1]]));
                assert_eq!((fragments[0].x, fragments[0].y), (3, 7));
                assert!(fragments[0].modified);
                assert_eq!(fragments[0].kind, PieceKind::J);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn trim_tie_keeps_first_found_component() {
        // Two single cells on one row after clearing the middle column.
        let p = placed(&[&[1, 1, 1]], 0, 19, PieceKind::I);
        let (trim, _) = trim_piece(&p, |x, _| x == 1);
        match trim {
            Trim::Kept { piece, fragments } => {
                assert_eq!(piece.x, 0);
                assert_eq!(fragments.len(), 1);
                assert_eq!(fragments[0].x, 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn trim_everything_removes_piece() {
        let p = placed(&[&[1, 1, 1, 1]], 0, 19, PieceKind::I);
        let (trim, removed) = trim_piece(&p, |_, y| y == 19);
        assert_eq!(trim, Trim::Removed);
        assert_eq!(removed, 4);
    }

    #[test]
    fn playfield_remove_cells_keeps_grid_in_sync() {
        let mut field = Playfield::new();
        field.insert(placed(&[&[1, 1, 1, 1]], 0, 19, PieceKind::I));
        field.insert(placed(&[&[1, 1], &[1, 1]], 4, 18, PieceKind::O));
        assert!(field.is_consistent());

        let report = field.remove_cells(|_, y| y == 19);
        assert_eq!(report.pieces_dropped, 1);
        assert_eq!(report.cells_removed, 6);
        assert_eq!(field.pieces().len(), 1);
        assert_eq!(field.board().occupied_count(), 2);
        assert!(field.is_consistent());
    }

    #[test]
    fn playfield_detects_inconsistency() {
        let mut field = Playfield::new();
        field.insert(placed(&[&[1]], 0, 19, PieceKind::T));
        field.board.set(5, 5, Some(PieceKind::T));
        assert!(!field.is_consistent());
    }
}
