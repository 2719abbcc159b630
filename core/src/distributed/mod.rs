//! # Message Passing Between Shards
//!
//! Shards share no memory. Every row that crosses a shard boundary, and every
//! contribution to a collective, travels as an explicit message.
//!
//! ## 🎓 The Layers
//!
//! 1.  **Point-to-point** ([`Channel`](backend::Channel)): `send`/`recv`, a combined
//!     `sendrecv`, and posted `isend`/`irecv` that complete on `wait_*`. Messages are
//!     matched by `(source, tag)`, so two transfers in flight between the same pair of
//!     shards cannot be confused as long as they use different tags.
//! 2.  **Collectives** ([`Collective`](collective::Collective)): gather, broadcast,
//!     all-gather and barrier, written *only* in terms of layer 1.
//! 3.  **Runtime** ([`launch`](world::launch)): wires `N` communicators together and
//!     runs one shard per thread.
//!
//! ## Null Peers
//!
//! A peer of `None` is the null process. Sending to it or receiving from it completes
//! immediately and moves no data. Shards on the edge of the grid use it for the
//! neighbour they do not have, which keeps the exchange code free of special cases.
//!
//! ## 🚀 Quick Start
//!
//! ```rust
//! use halo_life::distributed::{Channel, Collective, launch};
//!
//! let results = launch::<u32, _, _>(3, |comm| {
//!     let mine = [comm.rank() as u32 * 10];
//!     let mut all = [0u32; 3];
//!     comm.all_gather(&mine, &mut all)?;
//!     Ok(all)
//! })
//! .unwrap();
//!
//! assert!(results.iter().all(|all| all == &[0, 10, 20]));
//! ```

use std::fmt::Debug;

pub mod backend;
pub mod collective;
pub mod cpu_backend;
pub mod world;

pub use backend::{Channel, RecvRequest, SendRequest};
pub use collective::Collective;
pub use cpu_backend::Communicator;
pub use world::{World, launch};

/// Ordinal of a shard inside its group, in `[0, world_size)`.
pub type Rank = usize;

/// Message tag used to tell concurrent transfers between the same pair apart.
pub type Tag = u32;

/// Trait bound for values that can travel in a message.
pub trait Element: Copy + Default + Debug + Send + 'static {}

impl<T> Element for T where T: Copy + Default + Debug + Send + 'static {}
