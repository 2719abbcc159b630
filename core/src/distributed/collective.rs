//! Collective operations built from point-to-point messages.
//!
//! # How they work
//!
//! Every collective here is a *reference* algorithm with cost linear in the number of
//! shards:
//!
//! - **Gather**: every shard (root included) sends its buffer to the root. The root
//!   posts one receive per source rank into the slot reserved for that rank, so the
//!   order in which messages arrive never affects where they land.
//! - **Broadcast**: the root sends the buffer to every other shard in turn (a linear
//!   fan-out, not a tree). Each non-root shard posts exactly one receive.
//! - **All-Gather**: a gather to rank 0 followed by a broadcast of the concatenated
//!   result from rank 0. Not a ring; two phases, `O(N)` messages through one shard.
//!
//! Collectives use tags from the top of the tag space so they never match halo
//! traffic in flight between the same shards.

use super::backend::{Channel, RecvRequest};
use super::{Element, Rank, Tag};
use crate::error::{LifeError, Result};
use crate::grid::try_filled;

/// Tag carried by gather contributions.
pub const GATHER_TAG: Tag = Tag::MAX - 1;

/// Tag carried by broadcast payloads.
pub const BROADCAST_TAG: Tag = Tag::MAX - 2;

/// Root used by [`Collective::all_gather`] and [`Collective::barrier`].
pub const IMPLICIT_ROOT: Rank = 0;

/// Gather, broadcast, all-gather and barrier for any [`Channel`].
///
/// Every shard of the group must make the same sequence of collective calls with the
/// same root; that is what lets the messages pair up.
///
/// A group of zero shards is a no-op for every operation.
pub trait Collective<T: Element>: Channel<T> {
    /// Gathers `send` from every shard at `root`.
    ///
    /// Returns `Some` at the root, holding all contributions concatenated in ascending
    /// rank order, and `None` everywhere else. All shards must contribute buffers of
    /// the same length.
    fn gather(&self, send: &[T], root: Rank) -> Result<Option<Vec<T>>> {
        let size = self.world_size();
        if size == 0 {
            return Ok(None);
        }
        check_root(root, size)?;

        let count = send.len();
        let send_request = self.isend(send, Some(root), GATHER_TAG)?;

        let mut gathered = None;
        if self.rank() == root {
            let total = count.checked_mul(size).ok_or(LifeError::Allocation {
                what: "gather buffer",
                elements: usize::MAX,
            })?;
            let mut recv = try_filled(total, T::default(), "gather buffer")?;

            let requests: Vec<RecvRequest> = (0..size)
                .map(|source| self.irecv(Some(source), GATHER_TAG, count))
                .collect();
            for (source, request) in requests.into_iter().enumerate() {
                let slot = &mut recv[source * count..(source + 1) * count];
                self.wait_recv(request, slot)?;
            }
            gathered = Some(recv);
        }

        self.wait_send(send_request)?;
        Ok(gathered)
    }

    /// Copies `buf` from `root` into `buf` on every other shard.
    ///
    /// The root sends once per non-root shard; this is a linear fan-out.
    fn broadcast(&self, buf: &mut [T], root: Rank) -> Result<()> {
        let size = self.world_size();
        if size == 0 {
            return Ok(());
        }
        check_root(root, size)?;

        if self.rank() == root {
            let requests = (0..size)
                .filter(|&dest| dest != root)
                .map(|dest| self.isend(buf, Some(dest), BROADCAST_TAG))
                .collect::<Result<Vec<_>>>()?;
            for request in requests {
                self.wait_send(request)?;
            }
        } else {
            let request = self.irecv(Some(root), BROADCAST_TAG, buf.len());
            self.wait_recv(request, buf)?;
        }
        Ok(())
    }

    /// Leaves every shard's `recv` holding all shards' `send` buffers concatenated in
    /// ascending rank order.
    ///
    /// Composed as [`gather`](Self::gather) to rank 0 followed by
    /// [`broadcast`](Self::broadcast) from rank 0. `recv` must be exactly
    /// `world_size * send.len()` long.
    fn all_gather(&self, send: &[T], recv: &mut [T]) -> Result<()> {
        let size = self.world_size();
        if size == 0 {
            return Ok(());
        }
        if Some(recv.len()) != send.len().checked_mul(size) {
            return Err(LifeError::ShapeMismatch {
                expected: vec![size, send.len()],
                got: vec![recv.len()],
            });
        }

        if let Some(gathered) = self.gather(send, IMPLICIT_ROOT)? {
            recv.copy_from_slice(&gathered);
        }
        self.broadcast(recv, IMPLICIT_ROOT)
    }

    /// Blocks until every shard of the group has entered the barrier.
    ///
    /// An empty gather tells rank 0 that everyone has arrived; the empty broadcast that
    /// follows releases them.
    fn barrier(&self) -> Result<()> {
        let mut empty: [T; 0] = [];
        self.gather(&empty, IMPLICIT_ROOT)?;
        self.broadcast(&mut empty, IMPLICIT_ROOT)
    }
}

impl<T: Element, C: Channel<T> + ?Sized> Collective<T> for C {}

fn check_root(root: Rank, size: usize) -> Result<()> {
    if root >= size {
        return Err(LifeError::InvalidRank { rank: root, size });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributed::launch;
    use std::cell::Cell;

    /// A channel with no shards at all.
    struct EmptyGroup {
        calls: Cell<usize>,
    }

    impl Channel<u8> for EmptyGroup {
        fn rank(&self) -> Rank {
            0
        }

        fn world_size(&self) -> usize {
            0
        }

        fn send(&self, _buf: &[u8], _dest: Option<Rank>, _tag: Tag) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            Ok(())
        }

        fn recv(&self, _buf: &mut [u8], _source: Option<Rank>, _tag: Tag) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn test_zero_shards_is_noop() {
        let group = EmptyGroup {
            calls: Cell::new(0),
        };
        let mut buf = [7u8; 2];

        assert_eq!(group.gather(&[1, 2], 0).unwrap(), None);
        group.broadcast(&mut buf, 0).unwrap();
        group.all_gather(&[1, 2], &mut buf).unwrap();
        group.barrier().unwrap();

        assert_eq!(buf, [7, 7]);
        assert_eq!(group.calls.get(), 0);
    }

    #[test]
    fn test_gather_places_by_rank() {
        let results = launch::<i32, _, _>(4, |comm| {
            let mine = [comm.rank() as i32; 2];
            comm.gather(&mine, 2)
        })
        .unwrap();

        assert_eq!(results[0], None);
        assert_eq!(results[1], None);
        assert_eq!(results[2], Some(vec![0, 0, 1, 1, 2, 2, 3, 3]));
        assert_eq!(results[3], None);
    }

    #[test]
    fn test_broadcast_from_non_zero_root() {
        let results = launch::<u16, _, _>(3, |comm| {
            let mut buf = if comm.rank() == 1 { [9, 8, 7] } else { [0; 3] };
            comm.broadcast(&mut buf, 1)?;
            Ok(buf)
        })
        .unwrap();

        assert!(results.iter().all(|buf| buf == &[9, 8, 7]));
    }

    #[test]
    fn test_bad_root() {
        let err = launch::<u8, _, _>(2, |comm| comm.broadcast(&mut [0], 2)).unwrap_err();
        assert!(matches!(err, LifeError::InvalidRank { rank: 2, size: 2 }));
    }

    #[test]
    fn test_all_gather_checks_recv_len() {
        let err = launch::<u8, _, _>(2, |comm| {
            let mut recv = [0u8; 3];
            comm.all_gather(&[1, 2], &mut recv)
        })
        .unwrap_err();
        assert!(matches!(err, LifeError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_barrier_completes() {
        let results = launch::<u8, _, _>(5, |comm| {
            for _ in 0..3 {
                comm.barrier()?;
            }
            Ok(comm.rank())
        })
        .unwrap();
        assert_eq!(results.len(), 5);
    }
}
