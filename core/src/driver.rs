//! The per-shard generation loop.
//!
//! # Lifecycle
//!
//! ```text
//! Idle --step--> Running { generation: 0 } --step--> ... --step--> Finished
//! ```
//!
//! One step of generation `g`:
//! 1. if a renderer is attached, draw `current` (shards take turns);
//! 2. exchange halo rows of `current` with the neighbours;
//! 3. compute the next generation of `current` into `next`;
//! 4. swap `current` and `next`.
//!
//! The swap moves the two buffers between their slots; no cell is copied. The buffer
//! written in generation `g` is the very buffer read as `current` in `g + 1`.
//!
//! A run is always exactly `generations` steps long.

use crate::board::Board;
use crate::config::LifeConfig;
use crate::distributed::{Channel, Communicator, Rank, launch};
use crate::error::{LifeError, Result};
use crate::halo::ExchangeMode;
use crate::render::{Renderer, TerminalRenderer, render_in_turn};
use crate::rule;
use crate::topology::Topology;
use std::time::Duration;
use tracing::{debug, info};

/// Where a shard's generation loop stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Nothing has run yet.
    Idle,
    /// `generation` is the next generation to compute.
    Running { generation: usize },
    /// All generations have been computed.
    Finished,
}

/// Everything one shard owns during a run.
pub struct Simulation<C> {
    comm: C,
    topology: Topology,
    current: Board,
    next: Board,
    mode: ExchangeMode,
    generations: usize,
    frame_delay: Duration,
    state: DriverState,
}

impl<C: Channel<bool>> Simulation<C> {
    /// Sets up this shard's band of a randomly seeded grid.
    ///
    /// `seed` must be the same on every shard.
    pub fn new(comm: C, config: &LifeConfig, seed: u64) -> Result<Self> {
        let topology = Topology::new(config.height, comm.world_size(), comm.rank())?;
        let mut board = Board::allocate(topology.row_count, config.width)?;
        board.seed_random(&topology, seed)?;
        Self::with_board(comm, config, board)
    }

    /// Sets up this shard with an already populated board.
    ///
    /// The board must match the band [`Topology`] assigns to this shard.
    pub fn with_board(comm: C, config: &LifeConfig, board: Board) -> Result<Self> {
        let topology = Topology::new(config.height, comm.world_size(), comm.rank())?;
        if board.row_count() != topology.row_count || board.width() != config.width {
            return Err(LifeError::ShapeMismatch {
                expected: vec![topology.row_count, config.width],
                got: vec![board.row_count(), board.width()],
            });
        }
        let next = Board::allocate(topology.row_count, config.width)?;

        info!(
            rank = topology.rank,
            rows = topology.row_count,
            row_start = topology.row_start,
            population = board.population(),
            "shard ready"
        );

        Ok(Self {
            comm,
            topology,
            current: board,
            next,
            mode: config.mode,
            generations: config.generations,
            frame_delay: config.frame_delay,
            state: DriverState::Idle,
        })
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn rank(&self) -> Rank {
        self.topology.rank
    }

    /// The board holding the latest generation.
    pub fn current(&self) -> &Board {
        &self.current
    }

    /// The board the next generation will be written into.
    pub fn next(&self) -> &Board {
        &self.next
    }

    /// Refreshes the halo rows of the current board.
    pub fn exchange_halos(&mut self) -> Result<()> {
        self.mode
            .exchange(&self.comm, &self.topology, &mut self.current)
    }

    /// Computes one generation without rendering.
    ///
    /// Returns `false` once the run is finished; further calls do nothing.
    pub fn step(&mut self) -> Result<bool> {
        self.advance(None)
    }

    /// Runs every remaining generation, drawing each one first if `renderer` is set.
    pub fn run(&mut self, mut renderer: Option<&mut (dyn Renderer + '_)>) -> Result<()> {
        while self.advance(renderer.as_deref_mut())? {}
        info!(
            rank = self.rank(),
            generations = self.generations,
            population = self.current.population(),
            "shard finished"
        );
        Ok(())
    }

    fn advance(&mut self, renderer: Option<&mut (dyn Renderer + '_)>) -> Result<bool> {
        let generation = match self.state {
            DriverState::Idle => 0,
            DriverState::Running { generation } => generation,
            DriverState::Finished => return Ok(false),
        };
        if generation >= self.generations {
            self.state = DriverState::Finished;
            return Ok(false);
        }
        self.state = DriverState::Running { generation };

        if let Some(renderer) = renderer {
            render_in_turn(&self.comm, renderer, &self.current)?;
            std::thread::sleep(self.frame_delay);
        }

        self.exchange_halos()?;
        rule::step(&self.current, &mut self.next)?;
        std::mem::swap(&mut self.current, &mut self.next);

        debug!(
            rank = self.rank(),
            generation,
            population = self.current.population(),
            "generation complete"
        );

        self.state = if generation + 1 < self.generations {
            DriverState::Running {
                generation: generation + 1,
            }
        } else {
            DriverState::Finished
        };
        Ok(true)
    }

    /// Ends the run, releasing the spare buffer and returning the latest board.
    pub fn finish(self) -> Board {
        self.next.release();
        self.current
    }
}

/// What one shard reports at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardReport {
    pub topology: Topology,
    /// Number of live cells in the final generation.
    pub population: usize,
    /// Final interior rows, border columns excluded.
    pub rows: Vec<Vec<bool>>,
}

impl ShardReport {
    fn from_board(topology: Topology, board: &Board) -> Self {
        Self {
            topology,
            population: board.population(),
            rows: board.interior_rows().map(<[bool]>::to_vec).collect(),
        }
    }
}

/// Runs a whole simulation over `shards` in-process shards.
///
/// Validates `config` first, resolves the seed once for all shards, and returns one
/// report per shard in rank order. Any shard failure fails the run.
pub fn run(config: &LifeConfig, shards: usize) -> Result<Vec<ShardReport>> {
    config.validate(shards)?;
    let seed = config.resolve_seed();
    info!(
        width = config.width,
        height = config.height,
        generations = config.generations,
        shards,
        seed,
        mode = ?config.mode,
        "starting run"
    );

    launch::<bool, _, _>(shards, |comm: Communicator<bool>| {
        let mut simulation = Simulation::new(comm, config, seed)?;
        if config.show {
            let mut renderer = TerminalRenderer::stdout();
            simulation.run(Some(&mut renderer))?;
        } else {
            simulation.run(None)?;
        }

        let topology = *simulation.topology();
        let board = simulation.finish();
        let report = ShardReport::from_board(topology, &board);
        board.release();
        Ok(report)
    })
}
