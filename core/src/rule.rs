//! The transition from one generation to the next.

use crate::board::Board;
use crate::error::{LifeError, Result};
use halo_life_kernels::cpu_life_step;

/// Computes the next generation of `current`'s interior into `next`.
///
/// Reads only `current` (halo rows included) and writes only `next`'s interior, so the
/// halo rows and border columns of `next` keep whatever they held. The two boards must
/// have the same shape.
pub fn step(current: &Board, next: &mut Board) -> Result<()> {
    let shape = *current.grid().shape();
    if next.grid().shape() != &shape {
        return Err(LifeError::ShapeMismatch {
            expected: shape.to_vec(),
            got: next.grid().shape().to_vec(),
        });
    }
    cpu_life_step(current.grid().data(), next.grid_mut().data_mut(), &shape)?;
    Ok(())
}
