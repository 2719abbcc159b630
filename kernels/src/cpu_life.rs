use crate::{KernelError, Result};
use rayon::prelude::*;

/// Applies the B3/S23 rule to a single cell.
///
/// A live cell survives with two or three live neighbours, a dead cell is born
/// with exactly three. Every other combination yields a dead cell.
#[inline]
pub fn next_state(alive: bool, neighbors: u8) -> bool {
    matches!((alive, neighbors), (true, 2) | (true, 3) | (false, 3))
}

/// Counts the live cells among the eight neighbours of column `x`.
///
/// `above`, `here` and `below` are three consecutive padded rows; `x` must not be a
/// border column.
#[inline]
fn live_neighbors(above: &[bool], here: &[bool], below: &[bool], x: usize) -> u8 {
    above[x - 1] as u8
        + above[x] as u8
        + above[x + 1] as u8
        + here[x - 1] as u8
        + here[x + 1] as u8
        + below[x - 1] as u8
        + below[x] as u8
        + below[x + 1] as u8
}

/// CPU implementation of one Game of Life generation.
///
/// Both buffers are row-major with shape `[rows, cols]`, where the first and last row
/// are halo rows and the first and last column are the dead border. Only the interior
/// `[1..rows-1] x [1..cols-1]` of `next` is written; everything it reads comes from
/// `current`.
///
/// # Parallelism
///
/// Interior rows of the output are independent of each other, so we hand one output
/// row to each `rayon` task. Each task reads the three input rows centred on it.
pub fn cpu_life_step(current: &[bool], next: &mut [bool], shape: &[usize; 2]) -> Result<()> {
    let [rows, cols] = *shape;
    let size = rows * cols;

    for len in [current.len(), next.len()] {
        if len != size {
            return Err(KernelError::ShapeMismatch {
                expected: vec![rows, cols],
                got: vec![len],
            });
        }
    }

    // Nothing but halo and border.
    if rows < 3 || cols < 3 {
        return Ok(());
    }

    next[cols..(rows - 1) * cols]
        .par_chunks_mut(cols)
        .enumerate()
        .for_each(|(i, out_row)| {
            let y = i + 1;
            let above = &current[(y - 1) * cols..y * cols];
            let here = &current[y * cols..(y + 1) * cols];
            let below = &current[(y + 1) * cols..(y + 2) * cols];

            for x in 1..cols - 1 {
                out_row[x] = next_state(here[x], live_neighbors(above, here, below, x));
            }
        });

    Ok(())
}
