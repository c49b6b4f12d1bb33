//! Mycel CLI - drive and inspect pattern networks.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "mycel")]
#[command(author, version, about = "Mycel - self-healing pattern networks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default mycel.toml
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Run the reference scenario: transfers, a node failure and a heal
    Simulate {
        /// Number of nodes (default: from mycel.toml)
        #[arg(short, long)]
        nodes: Option<u64>,

        /// Seed for reproducible topology
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Drive random transfers and show network statistics
    Stats {
        /// Number of nodes (default: from mycel.toml)
        #[arg(short, long)]
        nodes: Option<u64>,

        /// Number of transfers to attempt (default: from mycel.toml)
        #[arg(short, long)]
        transfers: Option<u64>,

        /// Seed for reproducible runs
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Simulate { nodes, seed } => commands::simulate::run(nodes, seed),
        Commands::Stats { nodes, transfers, seed } => commands::stats::run(nodes, transfers, seed),
    }
}
