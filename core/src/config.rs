//! Run parameters.

use crate::error::{LifeError, Result};
use crate::halo::ExchangeMode;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Configuration for a simulation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LifeConfig {
    /// Width of the global grid.
    pub width: usize,

    /// Height of the global grid.
    pub height: usize,

    /// Number of generations to run. The run never stops early.
    pub generations: usize,

    /// Render every generation to the terminal.
    pub show: bool,

    /// How halo rows are exchanged.
    pub mode: ExchangeMode,

    /// Seed of the initial pattern. `None` picks one from the clock at start-up.
    pub seed: Option<u64>,

    /// Pause after each rendered frame.
    pub frame_delay: Duration,
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            generations: 10,
            show: false,
            mode: ExchangeMode::Synchronous,
            seed: None,
            frame_delay: Duration::from_millis(200),
        }
    }
}

impl LifeConfig {
    /// Create a configuration for a `width x height` grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Set the number of generations.
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// Set whether each generation is rendered.
    pub fn with_show(mut self, show: bool) -> Self {
        self.show = show;
        self
    }

    /// Set the halo exchange mode.
    pub fn with_mode(mut self, mode: ExchangeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set a fixed seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the pause after each rendered frame.
    pub fn with_frame_delay(mut self, frame_delay: Duration) -> Self {
        self.frame_delay = frame_delay;
        self
    }

    /// Checks that the grid can be split over `shards` shards.
    ///
    /// Called before any shard starts, so a bad configuration never produces empty
    /// partitions.
    pub fn validate(&self, shards: usize) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(LifeError::Configuration(format!(
                "grid must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        if shards == 0 {
            return Err(LifeError::Configuration(
                "at least one shard is required".to_string(),
            ));
        }
        if shards > self.height {
            return Err(LifeError::Configuration(format!(
                "{shards} shards cannot split {} rows; every shard needs at least one row",
                self.height
            )));
        }
        Ok(())
    }

    /// Returns the configured seed, or one derived from the current time.
    ///
    /// Call this once per run and hand the result to every shard.
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_secs())
                .unwrap_or_default()
        })
    }
}
