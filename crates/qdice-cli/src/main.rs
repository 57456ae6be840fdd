//! qdice Command-Line Interface
//!
//! Inspect circuit step traces, chart outcome distributions and roll a
//! quantum die against a running engine service.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{histogram, roll, steps};

/// qdice - step through quantum dice circuits and chart their outcomes
#[derive(Parser)]
#[command(name = "qdice")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (YAML)
    #[arg(short, long, global = true, env = "QDICE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the circuit diagram and state table of a step trace
    Steps {
        /// Trace file (JSON, as returned by /circuit_visual)
        #[arg(short, long)]
        input: String,

        /// Advance the cursor this many steps
        #[arg(short, long, default_value = "0")]
        step: usize,

        /// Show the final state without highlighting
        #[arg(long)]
        view_only: bool,

        /// Do not prepend the all-zero initial state
        #[arg(long)]
        no_init: bool,

        /// Also write the diagram as SVG
        #[arg(long)]
        svg: Option<String>,
    },

    /// Chart sample counts against a theoretical distribution
    Histogram {
        /// Sample counts file (JSON object: outcome -> count)
        #[arg(short, long)]
        samples: String,

        /// Theoretical distribution file (JSON object: outcome -> probability)
        #[arg(short, long)]
        theoretical: Option<String>,

        /// Outcomes below this value are valid
        #[arg(long)]
        valid_bound: u32,
    },

    /// Roll the quantum die on the engine service
    Roll {
        /// Number of sides (clamped to 2..=20)
        #[arg(short = 'n', long, default_value = "6")]
        sides: u32,

        /// Sampling method (rejection, exact)
        #[arg(short, long, default_value = "rejection")]
        method: String,

        /// Concurrent batch rolls to fire
        #[arg(short, long, default_value = "1")]
        batches: u32,

        /// Shots per batch (defaults to the configured batch size)
        #[arg(long)]
        shots: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let config = cli.config.as_deref();

    // Execute command
    let result = match cli.command {
        Commands::Steps {
            input,
            step,
            view_only,
            no_init,
            svg,
        } => steps::execute(config, &input, step, view_only, no_init, svg.as_deref()),

        Commands::Histogram {
            samples,
            theoretical,
            valid_bound,
        } => histogram::execute(&samples, theoretical.as_deref(), valid_bound),

        Commands::Roll {
            sides,
            method,
            batches,
            shots,
        } => roll::execute(config, sides, &method, batches, shots).await,
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
