use anyhow::{Context, Result};
use image::{DynamicImage, GrayImage};
use log::info;
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub mod coordinator;
pub mod error;
pub mod grid;
pub mod io;
pub mod kernel;
pub mod partition;
pub mod worker;

pub use coordinator::{execute, execute_with, halo_jobs, merge, GatherMode};
pub use error::LbpError;
pub use grid::{GridView, HaloSlice, PixelGrid};
pub use partition::{plan, Assignment, RowRange, Strategy};
pub use worker::WorkerResult;

#[derive(Debug, Clone)]
pub struct Config {
    pub strategy: Strategy,
    pub workers: usize,
    pub gather: GatherMode,
    /// Log wall-clock time of the compute step.
    pub timings: bool,
}

pub fn default_config() -> Config {
    Config {
        strategy: Strategy::NoSplit,
        workers: num_cpus::get().max(1),
        gather: GatherMode::Join,
        timings: false,
    }
}

/// Sleep between empty checks for the message-passing algorithm name.
pub const DEFAULT_POLL_MS: u64 = 1;

/// Select the strategy named `name`.
///
/// `multi-lbp-mpi` is the shared-grid split gathered by polling a result channel.
pub fn apply_algorithm(cfg: &mut Config, name: &str) -> error::Result<()> {
    cfg.strategy = name.parse::<Strategy>()?;
    if name.trim().eq_ignore_ascii_case("multi-lbp-mpi") {
        cfg.gather = poll_every(DEFAULT_POLL_MS);
    }
    Ok(())
}

/// Poll-based gather with the given sleep between empty checks.
pub fn poll_every(ms: u64) -> GatherMode {
    GatherMode::Poll { interval: Duration::from_millis(ms) }
}

#[derive(Debug, Clone)]
pub struct Params {
    pub input: PathBuf,
    /// Descriptor image destination; nothing is written when `None`.
    pub output: Option<PathBuf>,
    pub config: Config,
}

/// Outcome of a file-level run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub width: u32,
    pub height: u32,
    pub patterns: usize,
    pub elapsed: Duration,
}

/// Descriptor sequence for an already-decoded grid.
pub fn compute(grid: &PixelGrid, config: &Config) -> error::Result<Vec<u8>> {
    execute_with(grid, config.strategy, config.workers, config.gather)
}

/// Core algorithm on an in-memory image, returning the descriptor image.
pub fn process_dynamic(dyn_img: &DynamicImage, config: &Config) -> error::Result<GrayImage> {
    let grid = PixelGrid::from_dynamic(dyn_img)?;
    let (w, h) = grid.interior_dims();
    let patterns = compute(&grid, config)?;
    io::descriptor_image(patterns, w, h)
}

pub fn process(params: Params) -> Result<Report> {
    let Params { input, output, config } = params;
    info!("Starting LBP (Rust)");
    info!("Input image: {}", input.display());

    let grid = io::load_grid(&input).with_context(|| format!("failed to load {}", input.display()))?;
    let (w, h) = grid.interior_dims();

    let start = Instant::now();
    let patterns = compute(&grid, &config)?;
    let elapsed = start.elapsed();
    if config.timings {
        info!("elapsed_ms={}", elapsed.as_millis());
    }

    let report = Report { width: w, height: h, patterns: patterns.len(), elapsed };
    if let Some(out) = output {
        io::save_descriptors(&out, patterns, w, h).with_context(|| format!("failed to write {}", out.display()))?;
        info!("Descriptor image saved: {}", out.display());
    }
    Ok(report)
}
