//! In-process stand-in for a process-group runtime.
//!
//! A real deployment gets its rank and group size from the launcher. Here the group is
//! a set of threads, each owning one [`Communicator`] and nothing else in common.

use super::backend::Channel;
use super::cpu_backend::{Communicator, Envelope};
use super::{Element, Rank};
use crate::error::{LifeError, Result};
use crossbeam::channel::{Receiver, Sender, unbounded};
use std::thread;
use tracing::{debug, error};

/// Factory for a fully connected group of communicators.
pub struct World;

impl World {
    /// Builds `size` communicators, one per rank, in rank order.
    ///
    /// Channel `(s, d)` carries messages from rank `s` to rank `d`:
    ///
    /// ```text
    ///            to 0     to 1     to 2
    /// from 0  [ (0,0)    (0,1)    (0,2) ]   -> outboxes of rank 0
    /// from 1  [ (1,0)    (1,1)    (1,2) ]
    /// from 2  [ (2,0)    (2,1)    (2,2) ]
    ///             |
    ///             v inboxes of rank 0
    /// ```
    ///
    /// A group of zero shards is empty.
    pub fn connect<T: Element>(size: usize) -> Vec<Communicator<T>> {
        let mut outboxes: Vec<Vec<Sender<Envelope<T>>>> =
            (0..size).map(|_| Vec::with_capacity(size)).collect();
        let mut inboxes: Vec<Vec<Receiver<Envelope<T>>>> =
            (0..size).map(|_| Vec::with_capacity(size)).collect();

        for source_outboxes in outboxes.iter_mut() {
            for dest_inboxes in inboxes.iter_mut() {
                let (tx, rx) = unbounded();
                source_outboxes.push(tx);
                dest_inboxes.push(rx);
            }
        }

        outboxes
            .into_iter()
            .zip(inboxes)
            .enumerate()
            .map(|(rank, (outboxes, inboxes))| {
                Communicator::from_parts(rank, size, outboxes, inboxes)
            })
            .collect()
    }
}

/// Runs `f` once per shard, each on its own thread, and returns the results in rank
/// order.
///
/// If any shard fails, the run fails. A shard that returns early drops its
/// communicator, so peers waiting on it fail with [`LifeError::Disconnected`] rather
/// than hanging. When several shards fail, the lowest-rank error that is not
/// `Disconnected` is reported; if every failure is a hang-up, the lowest-rank one is.
/// A panicking shard is reported as [`LifeError::ShardPanicked`].
pub fn launch<T, R, F>(size: usize, f: F) -> Result<Vec<R>>
where
    T: Element,
    R: Send,
    F: Fn(Communicator<T>) -> Result<R> + Sync,
{
    let communicators = World::connect::<T>(size);
    debug!(size, "launching shards");

    let outcomes: Vec<Result<R>> = thread::scope(|scope| {
        let f = &f;
        let handles: Vec<_> = communicators
            .into_iter()
            .map(|comm| {
                let rank = comm.rank();
                let handle = thread::Builder::new()
                    .name(format!("shard-{rank}"))
                    .spawn_scoped(scope, move || f(comm))
                    .map_err(|source| LifeError::Spawn { rank, source });
                (rank, handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(rank, handle)| match handle {
                Ok(handle) => handle
                    .join()
                    .unwrap_or(Err(LifeError::ShardPanicked { rank })),
                Err(err) => Err(err),
            })
            .collect()
    });

    let mut results = Vec::with_capacity(size);
    let mut errors: Vec<(Rank, LifeError)> = Vec::new();
    for (rank, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(result) => results.push(result),
            Err(err) => {
                error!(rank, %err, "shard failed");
                errors.push((rank, err));
            }
        }
    }

    if errors.is_empty() {
        return Ok(results);
    }
    let root_cause = errors
        .iter()
        .position(|(_, err)| !matches!(err, LifeError::Disconnected { .. }))
        .unwrap_or(0);
    Err(errors.swap_remove(root_cause).1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_world() {
        assert!(World::connect::<u8>(0).is_empty());
        let results = launch::<u8, _, _>(0, |_| Ok(())).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_results_in_rank_order() {
        let results = launch::<u8, _, _>(5, |comm| Ok(comm.rank() * 2)).unwrap();
        assert_eq!(results, vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn test_ring_pass() {
        let size = 4;
        let results = launch::<u64, _, _>(size, |comm| {
            let right = (comm.rank() + 1) % size;
            let left = (comm.rank() + size - 1) % size;
            let mut buf = [0u64];
            comm.sendrecv(
                &[comm.rank() as u64],
                Some(right),
                0,
                &mut buf,
                Some(left),
                0,
            )?;
            Ok(buf[0])
        })
        .unwrap();
        assert_eq!(results, vec![3, 0, 1, 2]);
    }

    #[test]
    fn test_failure_reaches_peers() {
        let err = launch::<u8, _, _>(3, |comm| {
            if comm.rank() == 2 {
                return Err(LifeError::Configuration("boom".to_string()));
            }
            // Everyone else waits for a message that never comes.
            let mut buf = [0u8];
            comm.recv(&mut buf, Some(2), 0)?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, LifeError::Configuration(_)));
    }

    #[test]
    fn test_root_cause_beats_hang_ups() {
        let err = launch::<u8, _, _>(3, |comm| {
            let mut buf = [0u8; 2];
            match comm.rank() {
                0 => {
                    comm.send(&[1, 2, 3], Some(2), 0)?;
                    comm.recv(&mut buf, Some(2), 0)?;
                }
                1 => comm.recv(&mut buf, Some(2), 0)?,
                _ => comm.recv(&mut buf, Some(0), 0)?,
            }
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, LifeError::Communication { peer: 0, .. }));
    }

    #[test]
    fn test_all_hang_ups_report_lowest_rank() {
        let err = launch::<u8, (), _>(2, |comm| {
            let peer = 1 - comm.rank();
            Err(LifeError::Disconnected { peer })
        })
        .unwrap_err();
        assert!(matches!(err, LifeError::Disconnected { peer: 1 }));
    }

    #[test]
    fn test_panic_is_reported() {
        let err = launch::<u8, _, _>(2, |comm| {
            if comm.rank() == 1 {
                panic!("shard went down");
            }
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, LifeError::ShardPanicked { rank: 1 }));
    }
}
