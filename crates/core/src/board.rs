//! Board module - the fixed 10x20 occupancy grid
//!
//! Each cell is empty or holds the kind (and therefore color) of the piece
//! covering it. Storage is a flat row-major array for cache locality.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..19
//! (top to bottom).
//!
//! The board is not the source of truth for placed pieces; see
//! [`crate::registry::Playfield`], which rebuilds it from the piece registry.

use arrayvec::ArrayVec;

use crate::types::{Cell, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

/// Total number of cells on the board
const BOARD_SIZE: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

/// Row indices, at most one per board row.
pub type RowList = ArrayVec<usize, { BOARD_HEIGHT as usize }>;

/// The game board - 10 columns x 20 rows using flat array storage
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [None; BOARD_SIZE],
        }
    }

    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * (BOARD_WIDTH as usize) + (x as usize))
    }

    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Within bounds and empty
    pub fn is_valid(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(None))
    }

    /// Within bounds and filled
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    pub fn is_out_of_bounds(&self, x: i8, y: i8) -> bool {
        Self::index(x, y).is_none()
    }

    fn row(&self, y: usize) -> &[Cell] {
        let start = y * BOARD_WIDTH as usize;
        &self.cells[start..start + BOARD_WIDTH as usize]
    }

    /// Every cell of row `y` is filled. Rows outside the board are never full.
    pub fn is_row_full(&self, y: usize) -> bool {
        y < BOARD_HEIGHT as usize && self.row(y).iter().all(|cell| cell.is_some())
    }

    pub fn is_row_empty(&self, y: usize) -> bool {
        y >= BOARD_HEIGHT as usize || self.row(y).iter().all(|cell| cell.is_none())
    }

    /// All complete rows, bottom to top.
    ///
    /// A pure scan: nothing is mutated, so the indices stay valid until the
    /// caller starts removing rows.
    pub fn complete_rows(&self) -> RowList {
        (0..BOARD_HEIGHT as usize)
            .rev()
            .filter(|&y| self.is_row_full(y))
            .collect()
    }

    /// Delete row `y`, shift every row above it down by one and empty the top row.
    ///
    /// Returns false if `y` is out of range.
    pub fn remove_row(&mut self, y: usize) -> bool {
        if y >= BOARD_HEIGHT as usize {
            return false;
        }

        let width = BOARD_WIDTH as usize;
        // copy_within handles the overlapping ranges.
        self.cells.copy_within(0..y * width, width);
        self.cells[..width].fill(None);
        true
    }

    /// Remove several rows at once.
    ///
    /// Rows are processed in descending order so indices that have not been
    /// removed yet keep pointing at the same rows. Net effect: every surviving
    /// row moves down by the number of removed rows below it. Duplicates are
    /// ignored. Returns how many rows were removed.
    pub fn remove_rows(&mut self, rows: &[usize]) -> usize {
        let mut sorted: RowList = rows
            .iter()
            .copied()
            .filter(|&y| y < BOARD_HEIGHT as usize)
            .collect();
        sorted.sort_unstable_by(|a, b| b.cmp(a));

        let mut removed = 0;
        let mut last = None;
        for y in sorted {
            if last == Some(y) {
                continue;
            }
            last = Some(y);
            // Each removal below `y` has already pulled `y`'s content down by one.
            if self.remove_row(y + removed) {
                removed += 1;
            }
        }
        removed
    }

    /// Fill cells with `kind` at `(x + dx, y + dy)` for each offset.
    ///
    /// Out-of-bounds cells are skipped; returns false if any were.
    pub fn fill_cells(
        &mut self,
        offsets: impl IntoIterator<Item = (u8, u8)>,
        x: i8,
        y: i8,
        kind: PieceKind,
    ) -> bool {
        let mut all_in = true;
        for (dx, dy) in offsets {
            all_in &= self.set(x + dx as i8, y + dy as i8, Some(kind));
        }
        all_in
    }

    /// Coordinates of every filled cell, row by row.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.cells.iter().enumerate().filter_map(|(i, cell)| {
            cell.map(|_| {
                (
                    (i % BOARD_WIDTH as usize) as i8,
                    (i / BOARD_WIDTH as usize) as i8,
                )
            })
        })
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Write the board as color indices (0 = empty).
    pub fn write_u8_grid(&self, out: &mut [[u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize]) {
        for (y, row) in out.iter_mut().enumerate() {
            for (x, v) in row.iter_mut().enumerate() {
                *v = self.cells[y * BOARD_WIDTH as usize + x]
                    .map(|k| k.color_index())
                    .unwrap_or(0);
            }
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
