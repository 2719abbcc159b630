//! Row-band decomposition of the global grid.
//!
//! The grid of height `H` is cut into `N` horizontal bands. Every shard gets
//! `H / N` rows; the last one also absorbs the remainder `H % N`. Shards only ever talk
//! to the shard directly above and directly below.
//!
//! ```text
//! H = 10, N = 3
//!
//! rank 0  rows 0..3    upper: none   lower: 1
//! rank 1  rows 3..6    upper: 0      lower: 2
//! rank 2  rows 6..10   upper: 1      lower: none
//! ```

use crate::distributed::Rank;
use crate::error::{LifeError, Result};

/// The band of rows owned by one shard and its two neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    /// Rank this band belongs to.
    pub rank: Rank,
    /// Number of shards in the group.
    pub shards: usize,
    /// First global row owned by this shard.
    pub row_start: usize,
    /// Number of rows owned by this shard.
    pub row_count: usize,
    /// Shard owning the rows directly above, `None` at the top edge.
    pub upper: Option<Rank>,
    /// Shard owning the rows directly below, `None` at the bottom edge.
    pub lower: Option<Rank>,
}

impl Topology {
    /// Computes the band of `rank` when `height` rows are split over `shards` shards.
    ///
    /// Fails with [`LifeError::Configuration`] if the split would leave a shard without
    /// rows, and with [`LifeError::InvalidRank`] if `rank` is not in the group.
    pub fn new(height: usize, shards: usize, rank: Rank) -> Result<Self> {
        if shards == 0 {
            return Err(LifeError::Configuration(
                "at least one shard is required".to_string(),
            ));
        }
        if rank >= shards {
            return Err(LifeError::InvalidRank { rank, size: shards });
        }
        if height < shards {
            return Err(LifeError::Configuration(format!(
                "{shards} shards cannot split {height} rows; every shard needs at least one row"
            )));
        }

        let base_rows = height / shards;
        let last = shards - 1;
        let row_count = if rank == last {
            base_rows + height % shards
        } else {
            base_rows
        };

        Ok(Self {
            rank,
            shards,
            row_start: rank * base_rows,
            row_count,
            upper: rank.checked_sub(1),
            lower: (rank < last).then_some(rank + 1),
        })
    }

    /// Computes every shard's band, in rank order.
    pub fn partition(height: usize, shards: usize) -> Result<Vec<Self>> {
        (0..shards)
            .map(|rank| Self::new(height, shards, rank))
            .collect()
    }

    /// One past the last global row owned by this shard.
    pub fn row_end(&self) -> usize {
        self.row_start + self.row_count
    }
}
