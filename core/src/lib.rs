//! # halo-life
//!
//! Conway's Game of Life on shards that share no memory.
//!
//! The global grid is cut into horizontal bands, one per shard. Each generation, every
//! shard swaps its boundary rows with its neighbours (the *halo exchange*), computes
//! the next generation of its own band into a second buffer, and swaps the two
//! buffers. All data that crosses a band boundary travels as a message.
//!
//! ## Modules
//!
//! - [`topology`]: which rows each shard owns and who its neighbours are.
//! - [`board`]: the halo-padded grid a shard owns, built on [`grid`].
//! - [`seed`]: random initial patterns that do not depend on the shard count.
//! - [`distributed`]: point-to-point messaging, collectives, and the thread runtime.
//! - [`halo`]: the boundary row exchange, synchronous or posted.
//! - [`rule`]: the B3/S23 transition.
//! - [`driver`]: the per-shard generation loop and [`run`].
//! - [`render`]: drawing the board to a terminal.
//!
//! ## Example
//!
//! ```rust
//! use halo_life::{LifeConfig, run};
//!
//! let config = LifeConfig::new(16, 12).with_generations(5).with_seed(7);
//! let reports = run(&config, 3).unwrap();
//!
//! let rows: usize = reports.iter().map(|r| r.rows.len()).sum();
//! assert_eq!(rows, 12);
//! ```

pub mod board;
pub mod config;
pub mod distributed;
pub mod driver;
pub mod error;
pub mod grid;
pub mod halo;
pub mod render;
pub mod rule;
pub mod seed;
pub mod topology;

pub use board::Board;
pub use config::LifeConfig;
pub use driver::{DriverState, ShardReport, Simulation, run};
pub use error::{LifeError, Result};
pub use grid::Grid;
pub use halo::ExchangeMode;
pub use render::{Renderer, TerminalRenderer};
pub use topology::Topology;
