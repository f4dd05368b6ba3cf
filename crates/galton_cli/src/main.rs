//! Bean Counter CLI
//!
//! Runs the machine in text mode and shows the slot counts at the end.

#[cfg(feature = "cli")]
use anyhow::Result;
#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "cli")]
use galton_cli::{ConfigOverrides, RunOptions, Truncation};
#[cfg(feature = "cli")]
use galton_core::BeanKind;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Trailer {
    /// Print the board after every step
    Debug,
}

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "bean_counter")]
#[command(about = "Drop beans through a Galton box and count where they land", long_about = None)]
#[command(after_help = galton_cli::USAGE)]
struct Cli {
    /// Number of slots (and peg rows)
    slot_count: Option<usize>,

    /// Number of beans to drop
    bean_count: Option<usize>,

    /// Bean behaviour: luck or skill
    mode: Option<BeanKind>,

    /// Pass `debug` to print the board after every step
    #[arg(value_enum)]
    debug: Option<Trailer>,

    /// Master seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// JSON experiment config; positional values override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a JSON summary instead of text
    #[arg(long, default_value = "false")]
    json: bool,

    /// Re-run the experiment this many more times with the same beans
    #[arg(long, default_value_t = 0)]
    repeat: usize,

    /// Keep only the lower half of the final run
    #[arg(long, conflicts_with = "upper_half")]
    lower_half: bool,

    /// Keep only the upper half of the final run
    #[arg(long)]
    upper_half: bool,
}

#[cfg(feature = "cli")]
fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = galton_cli::resolve_config(&ConfigOverrides {
        config_path: cli.config,
        slot_count: cli.slot_count,
        bean_count: cli.bean_count,
        mode: cli.mode,
        seed: cli.seed,
        debug: cli.debug.is_some(),
    })?;

    let truncation = if cli.lower_half {
        Some(Truncation::LowerHalf)
    } else if cli.upper_half {
        Some(Truncation::UpperHalf)
    } else {
        None
    };

    let options = RunOptions { config, repeats: cli.repeat, truncation, json: cli.json };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    galton_cli::run_experiment(&options, &mut out)?;

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("bean_counter CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
