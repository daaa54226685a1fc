//! Command-line interface for rastros.

use clap::{Parser, Subcommand};

/// Rastros - trail-blocking pursuit game orchestration
#[derive(Parser, Debug)]
#[command(name = "rastros")]
#[command(about = "Win-history tools for the Rastros orchestration layer", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "rastros.toml")]
    pub config: std::path::PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show aggregated win history against the AI
    History {
        /// Restrict to a single difficulty level (1-10)
        #[arg(short, long)]
        level: Option<u8>,

        /// Restrict to one board size, e.g. "7x7"
        #[arg(short, long)]
        board: Option<String>,
    },

    /// Clear the recorded win history
    Reset,
}
