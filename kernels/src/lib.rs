//! CPU kernels for the Game of Life transition.
//!
//! Kernels work on flat, row-major, halo-padded buffers and know nothing about shards
//! or messaging. They are kept in their own crate so they can be benchmarked and
//! swapped without touching the distributed engine.

use thiserror::Error;

pub mod cpu_life;

pub use cpu_life::{cpu_life_step, next_state};

#[derive(Error, Debug)]
pub enum KernelError {
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },
}

pub type Result<T> = std::result::Result<T, KernelError>;
