//! Bounds-checked 2D view over one contiguous buffer.
//!
//! # Layout
//!
//! A `Grid` stores `rows * cols` elements in a single `Vec<T>` in **row-major** order:
//! element `(r, c)` lives at `r * cols + c`. A row is therefore a contiguous slice,
//! which is exactly what a halo exchange sends and what the transition kernel walks.
//!
//! Buffers are obtained with `try_reserve_exact`, so running out of memory surfaces as
//! [`LifeError::Allocation`] instead of aborting the process.

use crate::error::{LifeError, Result};

/// Allocates a vector of `len` copies of `value`, reporting failure as an error.
pub(crate) fn try_filled<T: Clone>(len: usize, value: T, what: &'static str) -> Result<Vec<T>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| LifeError::Allocation {
            what,
            elements: len,
        })?;
    data.resize(len, value);
    Ok(data)
}

/// Copies `src` into a freshly allocated vector, reporting failure as an error.
pub(crate) fn try_copied<T: Copy>(src: &[T], what: &'static str) -> Result<Vec<T>> {
    let mut data = Vec::new();
    data.try_reserve_exact(src.len())
        .map_err(|_| LifeError::Allocation {
            what,
            elements: src.len(),
        })?;
    data.extend_from_slice(src);
    Ok(data)
}

/// A dense 2D grid with row-stride indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    data: Vec<T>,
    shape: [usize; 2],
}

impl<T: Copy + Default> Grid<T> {
    /// Creates a grid of `shape = [rows, cols]` filled with `T::default()`.
    pub fn zeros(shape: [usize; 2]) -> Result<Self> {
        let [rows, cols] = shape;
        let len = rows.checked_mul(cols).ok_or(LifeError::Allocation {
            what: "grid",
            elements: usize::MAX,
        })?;
        Ok(Self {
            data: try_filled(len, T::default(), "grid")?,
            shape,
        })
    }

    /// Returns `[rows, cols]`.
    pub fn shape(&self) -> &[usize; 2] {
        &self.shape
    }

    pub fn rows(&self) -> usize {
        self.shape[0]
    }

    pub fn cols(&self) -> usize {
        self.shape[1]
    }

    /// Returns the underlying row-major buffer.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Address of the first element; identifies the buffer, not its contents.
    pub fn as_ptr(&self) -> *const T {
        self.data.as_ptr()
    }

    fn offset(&self, row: usize, col: usize) -> Result<usize> {
        let [rows, cols] = self.shape;
        if row >= rows || col >= cols {
            return Err(LifeError::IndexOutOfBounds {
                index: vec![row, col],
                shape: self.shape.to_vec(),
            });
        }
        Ok(row * cols + col)
    }

    fn row_range(&self, row: usize) -> Result<std::ops::Range<usize>> {
        if row >= self.rows() {
            return Err(LifeError::IndexOutOfBounds {
                index: vec![row],
                shape: self.shape.to_vec(),
            });
        }
        let start = row * self.cols();
        Ok(start..start + self.cols())
    }

    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        Ok(self.data[self.offset(row, col)?])
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let offset = self.offset(row, col)?;
        self.data[offset] = value;
        Ok(())
    }

    pub fn row(&self, row: usize) -> Result<&[T]> {
        let range = self.row_range(row)?;
        Ok(&self.data[range])
    }

    pub fn row_mut(&mut self, row: usize) -> Result<&mut [T]> {
        let range = self.row_range(row)?;
        Ok(&mut self.data[range])
    }

    /// Borrows row `read` immutably and row `write` mutably at the same time.
    ///
    /// This is what a combined send-and-receive needs: the outgoing row is read while
    /// the incoming row is written. The two rows must differ.
    pub fn row_pair_mut(&mut self, read: usize, write: usize) -> Result<(&[T], &mut [T])> {
        let read_range = self.row_range(read)?;
        let write_range = self.row_range(write)?;
        if read == write {
            return Err(LifeError::IndexOutOfBounds {
                index: vec![read, write],
                shape: self.shape.to_vec(),
            });
        }

        if read < write {
            let (head, tail) = self.data.split_at_mut(write_range.start);
            Ok((&head[read_range], &mut tail[..self.shape[1]]))
        } else {
            let (head, tail) = self.data.split_at_mut(read_range.start);
            Ok((&tail[..self.shape[1]], &mut head[write_range]))
        }
    }

    /// Fills every element of `row` with `value`.
    pub fn fill_row(&mut self, row: usize, value: T) -> Result<()> {
        self.row_mut(row)?.fill(value);
        Ok(())
    }
}
