//! fieldlog CLI
//!
//! Command-line tools for inspecting and replaying outstanding entries.
//!
//! # Commands
//!
//! - `encode` - Serialize `key=tag:text` pairs into the tagged wire form
//! - `decode` - Decode a serialized map into typed pairs
//! - `replay` - Run a replay pass over entries loaded from JSON

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// fieldlog command-line tools.
#[derive(Parser)]
#[command(name = "fieldlog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serialize pairs into the tagged wire form
    Encode {
        /// Pairs as `key=tag:text`, where tag is one of i, l, d, b, s
        #[arg(required = true)]
        pairs: Vec<String>,
    },

    /// Decode a serialized map
    Decode {
        /// Serialized map, e.g. `a|i5|b|sx|`
        serialized: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Replay outstanding entries against in-memory rows
    Replay {
        /// Schema JSON file
        #[arg(long)]
        schema: PathBuf,

        /// Outstanding entries JSON file (array of entries)
        #[arg(long)]
        entries: PathBuf,

        /// Table to replay
        #[arg(short, long)]
        table: String,

        /// Existing rows JSON file; defaults to an empty row per entity
        #[arg(long)]
        rows: Option<PathBuf>,

        /// Keep entries in the log after commit
        #[arg(long)]
        retain: bool,

        /// Stop after this many entity groups
        #[arg(long)]
        max_groups: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbosity flag when set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Encode { pairs } => {
            commands::encode::run(&pairs)?;
        }
        Commands::Decode { serialized, format } => {
            commands::decode::run(&serialized, &format)?;
        }
        Commands::Replay {
            schema,
            entries,
            table,
            rows,
            retain,
            max_groups,
            format,
        } => {
            let options = commands::replay::ReplayOptions {
                schema,
                entries,
                table,
                rows,
                retain,
                max_groups,
            };
            commands::replay::run(&options, &format)?;
        }
        Commands::Version => {
            println!("fieldlog CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("fieldlog core v{}", fieldlog_core::VERSION);
        }
    }

    Ok(())
}
