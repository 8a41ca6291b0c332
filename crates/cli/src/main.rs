//! Two-level cache hierarchy simulator CLI.
//!
//! This binary runs one memory reference trace through an L1/L2 hierarchy and
//! prints the resulting statistics. It performs:
//! 1. **Parameter resolution:** Command-line flags, optionally layered over a JSON parameter file.
//! 2. **Simulation:** Lazy trace parsing and the per-reference L1/L2 protocol.
//! 3. **Reporting:** `L1miss=… L2miss=… AccTimeAvg=…` on stdout, or JSON with `--json`.
//!
//! Any error is reported on stderr and no statistics are printed.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cachesim_core::SimReport;
use cachesim_core::common::SimError;
use cachesim_core::config::PartialSimParams;
use cachesim_core::sim::{Simulator, loader};

#[derive(Parser, Debug)]
#[command(
    name = "cachesim",
    author,
    version,
    about = "Two-level inclusive cache hierarchy simulator",
    long_about = "Replays a memory reference trace through an L1/L2 hierarchy and reports miss rates and average access time.\n\nSizes and associativities are log2 values: --bsize 5 means 32-byte blocks, --l1-assoc 2 means 4 ways.\n\nExamples:\n  cachesim trace.in --mem-cyc 100 --bsize 5 --wr-alloc 1 --l1-size 12 --l1-assoc 1 --l1-cyc 1 --l2-size 15 --l2-assoc 2 --l2-cyc 5\n  cachesim trace.in --config params.json --l1-size 14"
)]
struct Cli {
    /// Trace file, one `R|W 0x<address>` reference per line.
    trace: PathBuf,

    /// Main memory latency in cycles.
    #[arg(long, value_name = "CYCLES")]
    mem_cyc: Option<u64>,

    /// log2 of the block size in bytes.
    #[arg(long, value_name = "LOG2")]
    bsize: Option<u32>,

    /// log2 of the L1 capacity in bytes.
    #[arg(long, value_name = "LOG2")]
    l1_size: Option<u32>,

    /// log2 of the L2 capacity in bytes.
    #[arg(long, value_name = "LOG2")]
    l2_size: Option<u32>,

    /// log2 of the L1 associativity.
    #[arg(long, value_name = "LOG2")]
    l1_assoc: Option<u32>,

    /// log2 of the L2 associativity.
    #[arg(long, value_name = "LOG2")]
    l2_assoc: Option<u32>,

    /// L1 hit latency in cycles.
    #[arg(long, value_name = "CYCLES")]
    l1_cyc: Option<u64>,

    /// L2 hit latency in cycles.
    #[arg(long, value_name = "CYCLES")]
    l2_cyc: Option<u64>,

    /// 1 to allocate on write misses, 0 to write around L1.
    #[arg(long, value_name = "0|1")]
    wr_alloc: Option<u32>,

    /// JSON parameter file using the flag names as keys; flags take precedence.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the full report as JSON instead of the one-line summary.
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// Parameters given as flags.
    const fn flag_params(&self) -> PartialSimParams {
        PartialSimParams {
            mem_cyc: self.mem_cyc,
            bsize: self.bsize,
            l1_size: self.l1_size,
            l2_size: self.l2_size,
            l1_assoc: self.l1_assoc,
            l2_assoc: self.l2_assoc,
            l1_cyc: self.l1_cyc,
            l2_cyc: self.l2_cyc,
            wr_alloc: self.wr_alloc,
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    tracing::debug!(?cli, "parsed arguments");

    let report = match run(&cli) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match report.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: cannot encode report: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{report}");
    }
    ExitCode::SUCCESS
}

/// Resolves parameters, then simulates the trace.
///
/// # Errors
///
/// Any configuration, I/O or trace format error.
fn run(cli: &Cli) -> Result<SimReport, SimError> {
    let base = match &cli.config {
        Some(path) => loader::load_params(path)?,
        None => PartialSimParams::default(),
    };
    let params = base.merge(cli.flag_params()).resolve()?;
    let config = params.into_config()?;
    Simulator::run_file(&config, &cli.trace)
}

/// Installs a stderr `fmt` subscriber filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
