//! halo-life CLI
//!
//! Runs Conway's Game of Life over in-process shards that exchange halo rows by
//! message passing.
//!
//! # Example
//!
//! ```bash
//! # 4 shards, 40x30 grid, 100 generations, drawn in the terminal
//! halo-life -p 4 -w 40 -h 30 -g 100 --show
//!
//! # Posted (non-blocking) exchange with a fixed seed
//! halo-life --noblock --seed 42
//! ```

use clap::Parser;
use halo_life::{ExchangeMode, LifeConfig};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Conway's Game of Life on message-passing shards.
#[derive(Parser, Debug)]
#[command(name = "halo-life")]
#[command(version, about, long_about = None, disable_help_flag = true)]
struct Args {
    /// Print help
    #[arg(short = 'H', long, action = clap::ArgAction::Help)]
    help: Option<bool>,

    /// Width of the simulation
    #[arg(short = 'w', long, default_value = "10")]
    width: usize,

    /// Height of the simulation
    #[arg(short = 'h', long, default_value = "10")]
    height: usize,

    /// Number of generations to simulate
    #[arg(short = 'g', long, default_value = "10")]
    generations: usize,

    /// Draw every generation. Avoid boards larger than your viewport.
    #[arg(short = 's', long)]
    show: bool,

    /// Exchange halo rows with posted (non-blocking) operations
    #[arg(short = 'n', long)]
    noblock: bool,

    /// Number of shards
    #[arg(short = 'p', long, default_value = "2")]
    shards: usize,

    /// Seed of the initial pattern. Defaults to the current time.
    #[arg(long)]
    seed: Option<u64>,

    /// Pause between drawn generations, in milliseconds
    #[arg(long, default_value = "200")]
    frame_delay_ms: u64,
}

impl Args {
    fn config(&self) -> LifeConfig {
        let mode = if self.noblock {
            ExchangeMode::Asynchronous
        } else {
            ExchangeMode::Synchronous
        };
        let config = LifeConfig::new(self.width, self.height)
            .with_generations(self.generations)
            .with_show(self.show)
            .with_mode(mode)
            .with_frame_delay(Duration::from_millis(self.frame_delay_ms));
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

fn main() -> ExitCode {
    // Logs go to stderr so they never land in the middle of a drawn board.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.config();

    match halo_life::run(&config, args.shards) {
        Ok(reports) => {
            let population: usize = reports.iter().map(|r| r.population).sum();
            info!(
                shards = reports.len(),
                generations = config.generations,
                population,
                "run complete"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(%err, "run aborted");
            ExitCode::FAILURE
        }
    }
}
