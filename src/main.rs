// Sequential vs parallel vector sum benchmark.
//
// Usage:
//   vector_sum compare [--size N] [--threads T] [--strategy threads|pool] [--pin] [--seed S]
//   vector_sum sweep [--config PATH] [--sizes a,b,c] [--threads a,b,c] ...
//
// Output goes to stdout in the chosen --format; logs go to stderr.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use vector_sum::bench::{compare, sweep};
use vector_sum::config::SweepConfig;
use vector_sum::report::{render_comparison, render_sweep, Format};
use vector_sum::workload::random_vector;
use vector_sum::{Reducer, Strategy};

/// Sum a random vector sequentially and with T workers, and compare the times
#[derive(Parser, Debug)]
#[command(name = "vector_sum")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error); defaults to RUST_LOG or warn
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare one sequential and one parallel run on a single vector
    Compare(CompareArgs),
    /// Time the parallel path over several vector sizes and thread counts
    Sweep(SweepArgs),
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// Vector length (prompted for if omitted)
    #[arg(short = 'n', long)]
    size: Option<usize>,

    /// Worker count (prompted for if omitted)
    #[arg(short, long)]
    threads: Option<usize>,

    #[arg(long, value_enum, default_value_t = Strategy::Threads)]
    strategy: Strategy,

    /// Pin each worker to a CPU core
    #[arg(long)]
    pin: bool,

    /// Seed for the random vector
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value = "table")]
    format: Format,
}

#[derive(Args, Debug)]
struct SweepArgs {
    /// JSON sweep config; flags below override its fields
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Vector sizes, comma separated
    #[arg(long, value_delimiter = ',')]
    sizes: Option<Vec<usize>>,

    /// Thread counts, comma separated
    #[arg(long, value_delimiter = ',')]
    threads: Option<Vec<usize>>,

    #[arg(long, value_enum)]
    strategy: Option<Strategy>,

    /// Pin each worker to a CPU core
    #[arg(long)]
    pin: bool,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value = "table")]
    format: Format,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_level.as_deref());

    match cli.command {
        Command::Compare(args) => run_compare(args),
        Command::Sweep(args) => run_sweep(args),
    }
}

fn setup_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run_compare(args: CompareArgs) -> Result<()> {
    let size = match args.size {
        Some(size) => size,
        None => prompt("Enter the size of the vector: ")?,
    };
    let threads = match args.threads {
        Some(threads) => threads,
        None => prompt("Enter the number of threads: ")?,
    };

    // Generate input data (not timed)
    let data = random_vector(size, args.seed);
    debug!(size, threads, seed = ?args.seed, "generated input vector");

    let reducer = Reducer::new(threads)
        .with_strategy(args.strategy)
        .with_pinned_workers(args.pin);
    let cmp = compare(&data, &reducer).context("comparison failed")?;

    print!("{}", render_comparison(&cmp, args.format)?);
    Ok(())
}

fn run_sweep(args: SweepArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => SweepConfig::from_file(path)?,
        None => SweepConfig::default(),
    };

    if let Some(sizes) = args.sizes {
        config.sizes = sizes;
    }
    if let Some(threads) = args.threads {
        config.thread_counts = threads;
    }
    if let Some(strategy) = args.strategy {
        config.strategy = strategy;
    }
    if args.pin {
        config.pin_workers = true;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    debug!(?config, "running sweep");

    let points = sweep(&config).context("sweep failed")?;
    print!("{}", render_sweep(&points, args.format)?);
    Ok(())
}

/// Ask for a number on stdin. Only allowed when stdin is a terminal.
fn prompt(question: &str) -> Result<usize> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        bail!("missing value and stdin is not interactive; pass --size and --threads");
    }

    print!("{question}");
    io::stdout().flush().context("failed to flush stdout")?;

    let mut line = String::new();
    stdin
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    line.trim()
        .parse()
        .with_context(|| format!("expected a non-negative integer, got {:?}", line.trim()))
}
