use clap::{Parser, Subcommand};

use crate::commands;
use crate::constants::REQUESTS_PER_HOUR_CAP;

#[derive(Parser)]
#[command(name = "nordic-screener")]
#[command(about = "Nordic stock fundamentals screener", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect fundamentals and rank each market
    Collect {
        /// Markets to process: "all" or comma-separated names
        #[arg(short, long, default_value = "all")]
        markets: String,

        /// Provider requests allowed before a mandatory cooldown
        #[arg(long, default_value_t = REQUESTS_PER_HOUR_CAP)]
        cap: u32,

        /// Cooldown length in seconds (default: 3600)
        #[arg(long)]
        cooldown_secs: Option<u64>,
    },
    /// Recompute rankings from the stored metric tables
    Rank {
        /// Markets to rank: "all" or comma-separated names
        #[arg(short, long, default_value = "all")]
        markets: String,
    },
    /// Show per-market ledger progress
    Status,
    /// Append exchange suffixes to universe files, rewriting them in place
    FormatTickers {
        /// Markets whose universe files to rewrite
        #[arg(short, long, default_value = "all")]
        markets: String,
    },
}

pub fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Collect {
            markets,
            cap,
            cooldown_secs,
        } => {
            commands::collect::run(markets, cap, cooldown_secs);
        }
        Commands::Rank { markets } => {
            commands::rank::run(markets);
        }
        Commands::Status => {
            commands::status::run();
        }
        Commands::FormatTickers { markets } => {
            commands::format_tickers::run(markets);
        }
    }
}
