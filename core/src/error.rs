//! Error type shared by every layer of the engine.
//!
//! No error is recoverable in the middle of a generation: any of these aborts the
//! shard that hit it, and dropping that shard's communicator aborts its peers.

use crate::distributed::Rank;
use halo_life_kernels::KernelError;
use thiserror::Error;

/// Error type for the distributed simulation.
#[derive(Error, Debug)]
pub enum LifeError {
    /// A board or message buffer could not be obtained.
    #[error("Allocation failed: could not reserve {elements} elements for {what}")]
    Allocation { what: &'static str, elements: usize },

    /// A send or receive did not complete.
    #[error("Communication with rank {peer} failed: {reason}")]
    Communication { peer: Rank, reason: String },

    /// The peer is gone, usually because it failed first.
    #[error("Rank {peer} hung up")]
    Disconnected { peer: Rank },

    /// The run parameters cannot produce a valid decomposition.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A rank outside the group was addressed.
    #[error("Rank {rank} is outside a group of {size}")]
    InvalidRank { rank: Rank, size: usize },

    /// The shape of a buffer does not match the expected shape.
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// An index is out of bounds for the given shape.
    #[error("Index out of bounds: index {index:?} for shape {shape:?}")]
    IndexOutOfBounds {
        index: Vec<usize>,
        shape: Vec<usize>,
    },

    /// The rendering sink failed to write.
    #[error("Rendering failed: {0}")]
    Render(#[from] std::io::Error),

    /// The runtime could not start a shard.
    #[error("Could not start shard {rank}: {source}")]
    Spawn {
        rank: Rank,
        #[source]
        source: std::io::Error,
    },

    /// A shard thread panicked; the whole run is void.
    #[error("Shard {rank} panicked")]
    ShardPanicked { rank: Rank },
}

impl From<KernelError> for LifeError {
    fn from(err: KernelError) -> Self {
        match err {
            KernelError::ShapeMismatch { expected, got } => {
                LifeError::ShapeMismatch { expected, got }
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, LifeError>;
