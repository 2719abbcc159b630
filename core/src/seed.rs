//! Partition-invariant random seeding.
//!
//! # The Problem
//!
//! Seeding each shard from its own generator would make the initial pattern depend on
//! how many shards the grid is split into. We want the opposite: for a given seed,
//! the global grid must come out the same for any shard count.
//!
//! # The Approach
//!
//! Think of one `ChaCha8` keystream laid over the whole grid in row-major order: cell
//! `(y, x)` is decided by word `y * W + x` of the stream, and is alive iff that word is
//! odd. ChaCha can seek to any word in constant time with `set_word_pos`, so each
//! shard jumps straight to the first word of each of its rows instead of drawing and
//! discarding everything that belongs to the shards above it.

use crate::board::Board;
use crate::error::{LifeError, Result};
use crate::topology::Topology;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A random-access view of the keystream that decides every cell of the grid.
pub struct CellStream {
    rng: ChaCha8Rng,
    width: usize,
}

impl CellStream {
    /// Creates the stream for a `width`-wide grid.
    pub fn new(seed: u64, width: usize) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            width,
        }
    }

    /// Writes global row `row` into `out`, which must be `width` long.
    pub fn fill_row(&mut self, row: usize, out: &mut [bool]) {
        debug_assert_eq!(out.len(), self.width);
        self.rng.set_word_pos(row as u128 * self.width as u128);
        for cell in out {
            *cell = self.rng.next_u32() & 1 == 1;
        }
    }
}

/// Fills the interior of `board` with the cells of rows
/// `topology.row_start..topology.row_end()` of the global random grid.
///
/// Halo rows and border columns are forced dead.
pub fn seed_random(board: &mut Board, topology: &Topology, seed: u64) -> Result<()> {
    if board.row_count() != topology.row_count {
        return Err(LifeError::ShapeMismatch {
            expected: vec![topology.row_count],
            got: vec![board.row_count()],
        });
    }

    let width = board.width();
    let bottom_halo = board.bottom_halo();
    let mut stream = CellStream::new(seed, width);
    let grid = board.grid_mut();

    grid.fill_row(0, false)?;
    grid.fill_row(bottom_halo, false)?;
    for local in 0..topology.row_count {
        let row = grid.row_mut(local + 1)?;
        row[0] = false;
        row[width + 1] = false;
        stream.fill_row(topology.row_start + local, &mut row[1..=width]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_global(height: usize, width: usize, shards: usize, seed: u64) -> Vec<bool> {
        Topology::partition(height, shards)
            .unwrap()
            .iter()
            .flat_map(|topology| {
                let mut board = Board::allocate(topology.row_count, width).unwrap();
                board.seed_random(topology, seed).unwrap();
                board.interior_rows().flatten().copied().collect::<Vec<_>>()
            })
            .collect()
    }

    #[test]
    fn test_partition_invariance() {
        let reference = seeded_global(13, 9, 1, 42);
        for shards in 2..=13 {
            assert_eq!(seeded_global(13, 9, shards, 42), reference, "N={shards}");
        }
    }

    #[test]
    fn test_seed_changes_pattern() {
        assert_ne!(seeded_global(8, 8, 2, 1), seeded_global(8, 8, 2, 2));
    }

    #[test]
    fn test_not_degenerate() {
        let cells = seeded_global(32, 32, 4, 7);
        let alive = cells.iter().filter(|&&c| c).count();
        assert!(alive > 256 && alive < 768, "alive = {alive}");
    }

    #[test]
    fn test_rows_do_not_depend_on_read_order() {
        let mut forward = CellStream::new(99, 6);
        let mut backward = CellStream::new(99, 6);
        let (mut a, mut b) = ([[false; 6]; 5], [[false; 6]; 5]);
        for row in 0..5 {
            forward.fill_row(row, &mut a[row]);
        }
        for row in (0..5).rev() {
            backward.fill_row(row, &mut b[row]);
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_padding_stays_dead() {
        let topology = Topology::new(6, 2, 1).unwrap();
        let mut board = Board::allocate(topology.row_count, 5).unwrap();
        board.grid_mut().fill_row(0, true).unwrap();
        board.seed_random(&topology, 3).unwrap();

        assert!(board.border_is_dead());
        assert!(board.top_halo_row().iter().all(|&c| !c));
        assert!(board.bottom_halo_row().iter().all(|&c| !c));
    }

    #[test]
    fn test_board_topology_mismatch() {
        let topology = Topology::new(6, 2, 0).unwrap();
        let mut board = Board::allocate(4, 5).unwrap();
        assert!(matches!(
            board.seed_random(&topology, 3),
            Err(LifeError::ShapeMismatch { .. })
        ));
    }
}
