//! Piece module - tetromino catalog and the active (falling) piece
//!
//! Rotation is a matrix transform of the piece's shape rather than a table
//! lookup. Clockwise rotation searches a small horizontal wall-kick list;
//! counter-clockwise and 180° rotation apply or revert wholesale.

use crate::board::Board;
use crate::shape::{rotation_angle, Shape};
use crate::types::{PieceKind, Rotation};

/// Column offsets tried, in order, when a clockwise rotation does not fit.
pub const WALL_KICKS: [i8; 4] = [-1, 1, -2, 2];

/// Catalog shape of a piece kind (its spawn orientation).
pub fn catalog_shape(kind: PieceKind) -> Shape {
    match kind {
        PieceKind::I => Shape::from_rows(&[&[1, 1, 1, 1]]),
        PieceKind::O => Shape::from_rows(&[&[1, 1], &[1, 1]]),
        PieceKind::S => Shape::from_rows(&[&[0, 1, 1], &[1, 1, 0]]),
        PieceKind::Z => Shape::from_rows(&[&[1, 1, 0], &[0, 1, 1]]),
        PieceKind::L => Shape::from_rows(&[&[1, 0, 0], &[1, 1, 1]]),
        PieceKind::J => Shape::from_rows(&[&[0, 0, 1], &[1, 1, 1]]),
        PieceKind::T => Shape::from_rows(&[&[0, 1, 0], &[1, 1, 1]]),
    }
}

/// Anchor shift that keeps the linear piece visually centred while it turns.
///
/// Horizontal to vertical shifts right by one, vertical to horizontal shifts
/// left by one.
pub fn linear_centering(before: &Shape, after: &Shape) -> i8 {
    let was_horizontal = before.is_horizontal_line();
    let now_vertical = after.height() > after.width();
    match (was_horizontal, now_vertical) {
        (true, true) => 1,
        (false, false) => -1,
        _ => 0,
    }
}

/// The single piece under player control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tetromino {
    pub kind: PieceKind,
    pub shape: Shape,
    pub x: i8,
    pub y: i8,
}

impl Tetromino {
    /// A catalog-oriented piece at the given anchor.
    pub fn new(kind: PieceKind, x: i8, y: i8) -> Self {
        Self {
            kind,
            shape: catalog_shape(kind),
            x,
            y,
        }
    }

    /// Absolute board coordinates of every occupied cell.
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.shape
            .cells()
            .map(move |(dx, dy)| (self.x + dx as i8, self.y + dy as i8))
    }

    /// Any occupied cell lands on a filled board cell or off the board.
    pub fn collides(&self, board: &Board) -> bool {
        self.cells().any(|(x, y)| !board.is_valid(x, y))
    }

    /// Any occupied cell lies outside `[0, W) x [0, H)`.
    pub fn out_of_bounds(&self, board: &Board) -> bool {
        self.cells().any(|(x, y)| board.is_out_of_bounds(x, y))
    }

    /// Legal placement: no collision and fully on the board.
    pub fn fits(&self, board: &Board) -> bool {
        !self.collides(board) && !self.out_of_bounds(board)
    }

    pub fn translated(&self, dx: i8, dy: i8) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Shift horizontally; reverts and returns false on collision.
    pub fn move_horizontal(&mut self, dx: i8, board: &Board) -> bool {
        let moved = self.translated(dx, 0);
        if moved.collides(board) {
            return false;
        }
        *self = moved;
        true
    }

    /// Advance one row. False means the piece is resting and should lock.
    pub fn drop_one_row(&mut self, board: &Board) -> bool {
        let moved = self.translated(0, 1);
        if moved.collides(board) {
            return false;
        }
        *self = moved;
        true
    }

    /// Row the piece would come to rest on if dropped straight down.
    ///
    /// Does not mutate the piece; used by hard drop and the landing preview.
    pub fn landing_y(&self, board: &Board) -> i8 {
        let mut probe = *self;
        while probe.drop_one_row(board) {}
        probe.y
    }

    /// Rotate clockwise with the linear-piece centring rule and wall kicks.
    ///
    /// Returns the rotated piece and the kick offset that was used, or `None`
    /// if neither the plain rotation nor any kick in [`WALL_KICKS`] fits.
    pub fn try_rotate_cw(&self, board: &Board) -> Option<(Tetromino, i8)> {
        let shape = self.shape.rotate_cw();
        let centering = if self.kind == PieceKind::I {
            linear_centering(&self.shape, &shape)
        } else {
            0
        };

        let rotated = Tetromino {
            shape,
            x: self.x + centering,
            ..*self
        };
        if rotated.fits(board) {
            return Some((rotated, 0));
        }

        WALL_KICKS.iter().find_map(|&kick| {
            let kicked = Tetromino {
                x: self.x + kick + centering,
                ..rotated
            };
            kicked.fits(board).then_some((kicked, kick))
        })
    }

    /// Counter-clockwise rotation in place; no kicks.
    pub fn try_rotate_ccw(&self, board: &Board) -> Option<Tetromino> {
        self.with_shape(self.shape.rotate_ccw(), board)
    }

    /// 180° rotation in place; no kicks.
    pub fn try_rotate_180(&self, board: &Board) -> Option<Tetromino> {
        self.with_shape(self.shape.rotate_180(), board)
    }

    fn with_shape(&self, shape: Shape, board: &Board) -> Option<Tetromino> {
        let turned = Tetromino { shape, ..*self };
        (!turned.collides(board)).then_some(turned)
    }

    /// Rendering angle relative to the catalog orientation.
    pub fn rotation(&self) -> Rotation {
        rotation_angle(&catalog_shape(self.kind), &self.shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_shapes_have_four_cells() {
        for kind in PieceKind::ALL {
            assert_eq!(catalog_shape(kind).cell_count(), 4, "{:?}", kind);
        }
    }

    #[test]
    fn test_linear_centering() {
        let h = catalog_shape(PieceKind::I);
        let v = h.rotate_cw();
        assert_eq!(linear_centering(&h, &v), 1);
        assert_eq!(linear_centering(&v, &h), -1);
    }

    #[test]
    fn test_rotate_cw_open_board_centres_linear_piece() {
        let board = Board::new();
        let piece = Tetromino::new(PieceKind::I, 3, 5);
        let (rotated, kick) = piece.try_rotate_cw(&board).unwrap();
        assert_eq!(kick, 0);
        assert_eq!(rotated.x, 4);
        assert_eq!((rotated.shape.width(), rotated.shape.height()), (1, 4));
    }

    #[test]
    fn test_rotate_cw_blocked_everywhere_returns_none() {
        let mut board = Board::new();
        // Leave only a one-row slot at rows 18..19 so the vertical I never fits.
        for y in 0..18 {
            for x in 0..10 {
                board.set(x, y, Some(PieceKind::O));
            }
        }
        let piece = Tetromino::new(PieceKind::I, 3, 19);
        assert!(piece.try_rotate_cw(&board).is_none());
    }

    #[test]
    fn test_rotate_ccw_reverts_on_collision() {
        let mut board = Board::new();
        let piece = Tetromino::new(PieceKind::T, 0, 0);
        assert!(piece.try_rotate_ccw(&board).is_some());

        // Block the cell the rotated T would need.
        let turned = piece.shape.rotate_ccw();
        let (dx, dy) = turned.cells().find(|&c| !piece.shape.get(c.0, c.1)).unwrap();
        board.set(dx as i8, dy as i8, Some(PieceKind::O));
        assert!(piece.try_rotate_ccw(&board).is_none());
    }

    #[test]
    fn test_landing_y_does_not_mutate() {
        let board = Board::new();
        let piece = Tetromino::new(PieceKind::O, 4, 0);
        assert_eq!(piece.landing_y(&board), 18);
        assert_eq!(piece.y, 0);
    }

    #[test]
    fn test_move_horizontal_stops_at_wall() {
        let board = Board::new();
        let mut piece = Tetromino::new(PieceKind::O, 0, 0);
        assert!(!piece.move_horizontal(-1, &board));
        assert_eq!(piece.x, 0);
        assert!(piece.move_horizontal(1, &board));
        assert_eq!(piece.x, 1);
    }
}
