// CLI entry for lbp
use anyhow::{bail, Result};
use clap::{Parser, ValueHint};
use lbp_rust::{apply_algorithm, default_config, poll_every, process, Config, Params};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lbp", version, about = "Local Binary Pattern descriptors over partitioned rows")]
struct Cli {
    /// Algorithm: "lbp", "multi-lbp", "multi-split-lbp", or "multi-lbp-mpi" (multi-lbp gathered by polling)
    #[arg(short = 'a', long = "algorithm", default_value = "lbp")]
    algorithm: String,

    /// Number of workers (defaults to the CPU count)
    #[arg(short = 'p', long = "processes")]
    processes: Option<usize>,

    /// Gather results by polling every N ms instead of joining (overrides the multi-lbp-mpi default)
    #[arg(long = "poll-ms")]
    poll_ms: Option<u64>,

    /// Log wall-clock time of the compute step
    #[arg(long = "timings")]
    timings: bool,

    /// Input image path
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
    /// Descriptor image path; omit to compute without writing
    #[arg(value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

fn build_config(cli: &Cli) -> Result<Config> {
    let mut cfg = default_config();
    apply_algorithm(&mut cfg, &cli.algorithm)?;
    if let Some(v) = cli.processes { cfg.workers = v; }
    if let Some(ms) = cli.poll_ms { cfg.gather = poll_every(ms); }
    if cli.timings { cfg.timings = true; }
    Ok(cfg)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let cfg = build_config(&cli)?;
    if !cli.input.is_file() {
        bail!("File '{}' does not exist.", cli.input.display());
    }
    let timings = cfg.timings;
    let params = Params { input: cli.input, output: cli.output, config: cfg };
    let report = process(params)?;
    if timings {
        println!("{} patterns ({}x{}) in {} ms", report.patterns, report.width, report.height, report.elapsed.as_millis());
    }
    Ok(())
}
