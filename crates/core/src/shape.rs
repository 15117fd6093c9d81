//! Shape module - dense binary piece matrices and the geometry helpers on them
//!
//! A shape is a small rectangle (at most 4x4) of occupied/empty cells,
//! addressed as `(x, y)` with `y` growing downward like the board. Shapes stay
//! dense after fragmentation: holes are represented as empty cells, and only
//! whole empty rows are ever trimmed, so surviving cells keep their horizontal
//! offset inside the piece frame.

use arrayvec::ArrayVec;

use crate::types::{Rotation, MAX_SHAPE_DIM};

const CELLS: usize = MAX_SHAPE_DIM * MAX_SHAPE_DIM;

/// Dense occupancy matrix of a piece.
///
/// Cells outside `width x height` are always empty, so derived equality is
/// dimension-plus-element equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    width: u8,
    height: u8,
    rows: [[bool; MAX_SHAPE_DIM]; MAX_SHAPE_DIM],
}

/// Width/height pair returned by [`bounding_dimensions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u8,
    pub height: u8,
}

/// A 4-connected group of occupied cells, in shape-local coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Component {
    cells: ArrayVec<(u8, u8), CELLS>,
}

/// Result of [`compact`]: the trimmed shape plus how many rows were stripped
/// from the top (the caller must move its anchor down by that amount).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compacted {
    pub shape: Shape,
    pub rows_removed_above: u8,
}

impl Shape {
    /// An all-empty shape of the given size (clamped to 4x4).
    pub fn empty(width: u8, height: u8) -> Self {
        Self {
            width: width.min(MAX_SHAPE_DIM as u8),
            height: height.min(MAX_SHAPE_DIM as u8),
            rows: [[false; MAX_SHAPE_DIM]; MAX_SHAPE_DIM],
        }
    }

    /// Build from row slices of 0/1 values.
    ///
    /// Rows and columns beyond 4 are ignored; the width is taken from the
    /// first row.
    ///
    /// ```
    /// use cascade_tetris_core::shape::Shape;
    ///
    /// let t = Shape::from_rows(&[&[0, 1, 0], &[1, 1, 1]]);
    /// assert_eq!((t.width(), t.height()), (3, 2));
    /// assert!(t.get(1, 0));
    /// assert!(!t.get(0, 0));
    /// ```
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        let width = rows.first().map(|r| r.len()).unwrap_or(0) as u8;
        let mut shape = Self::empty(width, rows.len() as u8);
        for (y, row) in rows.iter().enumerate().take(shape.height as usize) {
            for (x, &v) in row.iter().enumerate().take(shape.width as usize) {
                shape.rows[y][x] = v != 0;
            }
        }
        shape
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Occupancy at `(x, y)`; false outside the rectangle.
    #[inline]
    pub fn get(&self, x: u8, y: u8) -> bool {
        x < self.width && y < self.height && self.rows[y as usize][x as usize]
    }

    /// Set a cell inside the rectangle. Out-of-range writes are ignored.
    pub fn set(&mut self, x: u8, y: u8, filled: bool) {
        if x < self.width && y < self.height {
            self.rows[y as usize][x as usize] = filled;
        }
    }

    /// Occupied cells in scan order (rows top-to-bottom, columns left-to-right).
    pub fn cells(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).filter_map(move |x| self.get(x, y).then_some((x, y)))
        })
    }

    pub fn cell_count(&self) -> usize {
        self.cells().count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells().next().is_none()
    }

    fn row_is_empty(&self, y: u8) -> bool {
        (0..self.width).all(|x| !self.get(x, y))
    }

    /// Transpose then reverse rows (90° clockwise). Pure.
    pub fn rotate_cw(&self) -> Self {
        let mut out = Self::empty(self.height, self.width);
        for y in 0..out.height {
            for x in 0..out.width {
                out.set(x, y, self.get(y, self.height - 1 - x));
            }
        }
        out
    }

    /// 90° counter-clockwise. Pure.
    pub fn rotate_ccw(&self) -> Self {
        let mut out = Self::empty(self.height, self.width);
        for y in 0..out.height {
            for x in 0..out.width {
                out.set(x, y, self.get(self.width - 1 - y, x));
            }
        }
        out
    }

    /// 180°: reverse rows and each row. Pure.
    pub fn rotate_180(&self) -> Self {
        let mut out = Self::empty(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.set(x, y, self.get(self.width - 1 - x, self.height - 1 - y));
            }
        }
        out
    }

    /// True for a single-row shape (used for the linear piece's centering rule).
    pub fn is_horizontal_line(&self) -> bool {
        self.height == 1
    }
}

/// Dimension and element-wise equality.
pub fn shapes_equal(a: &Shape, b: &Shape) -> bool {
    a == b
}

/// Rotate a shape clockwise, returning a new shape.
pub fn rotate_clockwise(shape: &Shape) -> Shape {
    shape.rotate_cw()
}

pub fn bounding_dimensions(shape: &Shape) -> Dimensions {
    Dimensions {
        width: shape.width,
        height: shape.height,
    }
}

/// Strip fully empty leading and trailing rows. Columns are never trimmed.
///
/// Returns `None` when no occupied cell remains.
pub fn compact(shape: &Shape) -> Option<Compacted> {
    let first = (0..shape.height).find(|&y| !shape.row_is_empty(y))?;
    let last = (0..shape.height).rev().find(|&y| !shape.row_is_empty(y))?;

    let mut out = Shape::empty(shape.width, last - first + 1);
    for y in first..=last {
        for x in 0..shape.width {
            out.set(x, y - first, shape.get(x, y));
        }
    }
    Some(Compacted {
        shape: out,
        rows_removed_above: first,
    })
}

/// 4-connected components over occupied cells.
///
/// Components are discovered in scan order (rows top-to-bottom, columns
/// left-to-right); each unvisited filled cell seeds a new component. The fill
/// uses an explicit stack.
pub fn find_connected_components(shape: &Shape) -> ArrayVec<Component, CELLS> {
    let mut visited = [[false; MAX_SHAPE_DIM]; MAX_SHAPE_DIM];
    let mut components = ArrayVec::new();

    for (sx, sy) in shape.cells() {
        if visited[sy as usize][sx as usize] {
            continue;
        }

        let mut component = Component::default();
        let mut stack: ArrayVec<(u8, u8), CELLS> = ArrayVec::new();
        visited[sy as usize][sx as usize] = true;
        stack.push((sx, sy));

        while let Some((x, y)) = stack.pop() {
            component.cells.push((x, y));

            let neighbors = [
                (x as i16, y as i16 - 1),
                (x as i16, y as i16 + 1),
                (x as i16 - 1, y as i16),
                (x as i16 + 1, y as i16),
            ];
            for (nx, ny) in neighbors {
                if nx < 0 || ny < 0 {
                    continue;
                }
                let (nx, ny) = (nx as u8, ny as u8);
                if shape.get(nx, ny) && !visited[ny as usize][nx as usize] {
                    visited[ny as usize][nx as usize] = true;
                    stack.push((nx, ny));
                }
            }
        }

        components.push(component);
    }

    components
}

impl Component {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[(u8, u8)] {
        &self.cells
    }

    /// `(min_x, min_y, max_x, max_y)`, or `None` for an empty component.
    pub fn bounds(&self) -> Option<(u8, u8, u8, u8)> {
        let &(x0, y0) = self.cells.first()?;
        Some(self.cells.iter().fold(
            (x0, y0, x0, y0),
            |(min_x, min_y, max_x, max_y), &(x, y)| {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            },
        ))
    }

    /// Dense shape translated to the component's own bounding box, plus the
    /// box's top-left offset within the source shape.
    pub fn to_shape(&self) -> Option<(Shape, (u8, u8))> {
        let (min_x, min_y, max_x, max_y) = self.bounds()?;
        let mut shape = Shape::empty(max_x - min_x + 1, max_y - min_y + 1);
        for &(x, y) in &self.cells {
            shape.set(x - min_x, y - min_y, true);
        }
        Some((shape, (min_x, min_y)))
    }
}

/// Angle that turns `original` into `current` under clockwise rotation.
///
/// Symmetric shapes resolve to the smallest matching angle; shapes that match
/// no rotation report [`Rotation::Deg0`].
pub fn rotation_angle(original: &Shape, current: &Shape) -> Rotation {
    let mut probe = *original;
    let mut angle = Rotation::Deg0;
    for _ in 0..4 {
        if shapes_equal(&probe, current) {
            return angle;
        }
        probe = probe.rotate_cw();
        angle = angle.rotate_cw();
    }
    Rotation::Deg0
}
