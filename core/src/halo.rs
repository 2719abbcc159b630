//! Boundary row exchange between neighbouring shards.
//!
//! Before generation `g` is computed, every shard needs in its halo rows the boundary
//! rows its neighbours hold at the start of `g`. Each generation moves two rows per
//! shard boundary, one in each direction:
//!
//! ```text
//! rank r-1   last row   --- TOWARD_HIGHER -->  rank r     top halo
//! rank r     first row  --- TOWARD_LOWER  -->  rank r-1   bottom halo
//! ```
//!
//! The two directions use different tags so that a shard completing both transfers
//! with the same neighbour at once can tell them apart. A missing neighbour is the null
//! process, so edge shards run the same code and their outer halo stays dead.

use crate::board::{Board, TOP_HALO};
use crate::distributed::{Channel, Tag};
use crate::error::Result;
use crate::topology::Topology;
use tracing::trace;

/// Tag of rows flowing toward lower ranks (a shard's first row going up).
pub const TOWARD_LOWER: Tag = 0;

/// Tag of rows flowing toward higher ranks (a shard's last row going down).
pub const TOWARD_HIGHER: Tag = 1;

/// How halo rows are exchanged. Both modes move exactly the same data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExchangeMode {
    /// Two combined send-and-receive calls, one per direction.
    #[default]
    Synchronous,
    /// Four posted operations (two sends, two receives), then four waits.
    Asynchronous,
}

impl ExchangeMode {
    /// Refreshes both halo rows of `board` from the neighbours named in `topology`.
    pub fn exchange<C>(self, comm: &C, topology: &Topology, board: &mut Board) -> Result<()>
    where
        C: Channel<bool> + ?Sized,
    {
        trace!(rank = topology.rank, mode = ?self, "exchanging halos");
        match self {
            ExchangeMode::Synchronous => paired_exchange(comm, topology, board),
            ExchangeMode::Asynchronous => posted_exchange(comm, topology, board),
        }
    }
}

/// Exchanges halos with one `sendrecv` per direction.
pub fn paired_exchange<C>(comm: &C, topology: &Topology, board: &mut Board) -> Result<()>
where
    C: Channel<bool> + ?Sized,
{
    let last = board.row_count();
    let bottom_halo = board.bottom_halo();
    let grid = board.grid_mut();

    // First row goes up, the lower neighbour's first row fills the bottom halo.
    let (send, recv) = grid.row_pair_mut(1, bottom_halo)?;
    comm.sendrecv(
        send,
        topology.upper,
        TOWARD_LOWER,
        recv,
        topology.lower,
        TOWARD_LOWER,
    )?;

    // Last row goes down, the upper neighbour's last row fills the top halo.
    let (send, recv) = grid.row_pair_mut(last, TOP_HALO)?;
    comm.sendrecv(
        send,
        topology.lower,
        TOWARD_HIGHER,
        recv,
        topology.upper,
        TOWARD_HIGHER,
    )
}

/// Exchanges halos by posting all four operations before waiting on any of them.
pub fn posted_exchange<C>(comm: &C, topology: &Topology, board: &mut Board) -> Result<()>
where
    C: Channel<bool> + ?Sized,
{
    let last = board.row_count();
    let bottom_halo = board.bottom_halo();
    let cols = board.grid().cols();
    let grid = board.grid_mut();

    let up = comm.isend(grid.row(1)?, topology.upper, TOWARD_LOWER)?;
    let from_below = comm.irecv(topology.lower, TOWARD_LOWER, cols);
    let down = comm.isend(grid.row(last)?, topology.lower, TOWARD_HIGHER)?;
    let from_above = comm.irecv(topology.upper, TOWARD_HIGHER, cols);

    comm.wait_send(up)?;
    comm.wait_recv(from_below, grid.row_mut(bottom_halo)?)?;
    comm.wait_send(down)?;
    comm.wait_recv(from_above, grid.row_mut(TOP_HALO)?)
}
