//! The halo-padded board owned by one shard.
//!
//! # Shape
//!
//! A shard owning `R` rows of a `W`-wide grid holds an `(R + 2) x (W + 2)` grid:
//!
//! ```text
//!        col 0   1 .. W   W+1
//! row 0    .   [ top halo ]  .      <- copy of the upper neighbour's last row
//! row 1    .   [ interior ]  .
//!  ..      .   [ interior ]  .
//! row R    .   [ interior ]  .
//! row R+1  .   [ bottom halo] .     <- copy of the lower neighbour's first row
//! ```
//!
//! Columns `0` and `W + 1` are the dead border and are never set. A halo row with no
//! neighbour behind it stays dead forever and plays the role of the global border.
//!
//! The lifecycle is `allocate -> seed -> (exchange, step)* -> release`.

use crate::error::{LifeError, Result};
use crate::grid::Grid;
use crate::topology::Topology;

/// Row index of the top halo.
pub const TOP_HALO: usize = 0;

/// A shard's halo-padded slice of the global grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    grid: Grid<bool>,
    row_count: usize,
    width: usize,
}

impl Board {
    /// Allocates an all-dead board for `row_count` owned rows of a `width`-wide grid.
    ///
    /// Fails with [`LifeError::Allocation`] if the memory cannot be obtained.
    pub fn allocate(row_count: usize, width: usize) -> Result<Self> {
        let rows = row_count.checked_add(2);
        let cols = width.checked_add(2);
        let (Some(rows), Some(cols)) = (rows, cols) else {
            return Err(LifeError::Allocation {
                what: "board",
                elements: usize::MAX,
            });
        };

        Ok(Self {
            grid: Grid::zeros([rows, cols])?,
            row_count,
            width,
        })
    }

    /// Number of rows this shard owns (halo rows excluded).
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Width of the global grid (border columns excluded).
    pub fn width(&self) -> usize {
        self.width
    }

    /// The full padded grid, halo rows and border columns included.
    pub fn grid(&self) -> &Grid<bool> {
        &self.grid
    }

    pub(crate) fn grid_mut(&mut self) -> &mut Grid<bool> {
        &mut self.grid
    }

    /// Row index of the bottom halo.
    pub fn bottom_halo(&self) -> usize {
        self.row_count + 1
    }

    pub fn top_halo_row(&self) -> &[bool] {
        self.padded_row(TOP_HALO)
    }

    pub fn bottom_halo_row(&self) -> &[bool] {
        self.padded_row(self.bottom_halo())
    }

    /// First owned row, border columns included. This is what goes to the upper
    /// neighbour.
    pub fn first_row(&self) -> &[bool] {
        self.padded_row(1)
    }

    /// Last owned row, border columns included. This is what goes to the lower
    /// neighbour.
    pub fn last_row(&self) -> &[bool] {
        self.padded_row(self.row_count)
    }

    fn padded_row(&self, row: usize) -> &[bool] {
        let cols = self.grid.cols();
        &self.grid.data()[row * cols..(row + 1) * cols]
    }

    fn interior_offset(&self, row: usize, col: usize) -> Result<(usize, usize)> {
        if row >= self.row_count || col >= self.width {
            return Err(LifeError::IndexOutOfBounds {
                index: vec![row, col],
                shape: vec![self.row_count, self.width],
            });
        }
        Ok((row + 1, col + 1))
    }

    /// Reads an owned cell; `row` and `col` are 0-based within the interior.
    pub fn cell(&self, row: usize, col: usize) -> Result<bool> {
        let (row, col) = self.interior_offset(row, col)?;
        self.grid.get(row, col)
    }

    /// Sets an owned cell; `row` and `col` are 0-based within the interior.
    pub fn set_cell(&mut self, row: usize, col: usize, alive: bool) -> Result<()> {
        let (row, col) = self.interior_offset(row, col)?;
        self.grid.set(row, col, alive)
    }

    /// Sets every owned cell to `f(row, col)`, with interior-relative coordinates.
    pub fn fill_interior<F>(&mut self, mut f: F)
    where
        F: FnMut(usize, usize) -> bool,
    {
        let cols = self.grid.cols();
        let width = self.width;
        let row_count = self.row_count;
        for (row, cells) in self
            .grid
            .data_mut()
            .chunks_mut(cols)
            .skip(1)
            .take(row_count)
            .enumerate()
        {
            for (col, cell) in cells[1..=width].iter_mut().enumerate() {
                *cell = f(row, col);
            }
        }
    }

    /// Fills the interior with pseudorandom cells keyed by global coordinates.
    ///
    /// See [`crate::seed::seed_random`].
    pub fn seed_random(&mut self, topology: &Topology, seed: u64) -> Result<()> {
        crate::seed::seed_random(self, topology, seed)
    }

    /// Iterates over the owned rows without their border columns.
    pub fn interior_rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        let width = self.width;
        self.grid
            .data()
            .chunks(self.grid.cols())
            .skip(1)
            .take(self.row_count)
            .map(move |row| &row[1..=width])
    }

    /// Number of live owned cells.
    pub fn population(&self) -> usize {
        self.interior_rows()
            .map(|row| row.iter().filter(|&&alive| alive).count())
            .sum()
    }

    /// Returns `true` if both border columns are dead on every row.
    pub fn border_is_dead(&self) -> bool {
        let cols = self.grid.cols();
        self.grid
            .data()
            .chunks(cols)
            .all(|row| !row[0] && !row[cols - 1])
    }

    /// Address of the underlying buffer, for identity checks.
    pub fn as_ptr(&self) -> *const bool {
        self.grid.as_ptr()
    }

    /// Frees the board now rather than at the end of the enclosing scope.
    pub fn release(self) {
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_shape() {
        let board = Board::allocate(3, 5).unwrap();
        assert_eq!(board.grid().shape(), &[5, 7]);
        assert_eq!(board.bottom_halo(), 4);
        assert_eq!(board.population(), 0);
        assert!(board.border_is_dead());
    }

    #[test]
    fn test_cell_coordinates_skip_padding() {
        let mut board = Board::allocate(2, 3).unwrap();
        board.set_cell(0, 0, true).unwrap();
        board.set_cell(1, 2, true).unwrap();

        assert!(board.grid().get(1, 1).unwrap());
        assert!(board.grid().get(2, 3).unwrap());
        assert!(board.cell(1, 2).unwrap());
        assert_eq!(board.first_row(), &[false, true, false, false, false]);
        assert_eq!(board.last_row(), &[false, false, false, true, false]);
        assert!(board.border_is_dead());
    }

    #[test]
    fn test_cell_out_of_interior() {
        let mut board = Board::allocate(2, 3).unwrap();
        assert!(matches!(
            board.set_cell(2, 0, true),
            Err(LifeError::IndexOutOfBounds { .. })
        ));
        assert!(board.cell(0, 3).is_err());
    }

    #[test]
    fn test_interior_rows_and_population() {
        let mut board = Board::allocate(2, 4).unwrap();
        board.fill_interior(|row, col| (row + col) % 2 == 0);

        let rows: Vec<&[bool]> = board.interior_rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], &[true, false, true, false]);
        assert_eq!(rows[1], &[false, true, false, true]);
        assert_eq!(board.population(), 4);
        assert!(board.border_is_dead());
        assert!(board.top_halo_row().iter().all(|&c| !c));
        assert!(board.bottom_halo_row().iter().all(|&c| !c));
    }

    #[test]
    fn test_release() {
        let board = Board::allocate(1, 1).unwrap();
        board.release();
    }
}
