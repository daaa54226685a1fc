//! Rastros - win-history CLI
//!
//! Inspects and maintains the persisted win-history ledger used by the
//! orchestration layer.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use rastros::{Counts, FileHistoryStore, RastrosConfig, WinHistory, WinHistoryLedger};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = RastrosConfig::load_or_default(&cli.config)?;
    let ledger = WinHistoryLedger::new(Box::new(FileHistoryStore::new(
        config.resolved_history_path(),
    )));

    match cli.command {
        Command::History { level, board } => show_history(&ledger, level, board.as_deref()),
        Command::Reset => reset_history(&ledger),
    }
}

/// Prints win-history counters, optionally filtered by level and board.
fn show_history(ledger: &WinHistoryLedger, level: Option<u8>, board: Option<&str>) -> Result<()> {
    let stats = ledger.stats();

    match level {
        Some(level) => {
            let Some(entry) = stats.level(level) else {
                println!("No history recorded for level {level}");
                return Ok(());
            };
            println!("Level {level}{}", board_suffix(board));
            print_counts("as side 0", entry.as_p1().counts(board));
            print_counts("as side 1", entry.as_p2().counts(board));
        }
        None => {
            let (as_p1, as_p2) = stats.totals(board);
            println!("All levels{}", board_suffix(board));
            print_counts("as side 0", as_p1);
            print_counts("as side 1", as_p2);
            print_boards(&stats);
        }
    }
    Ok(())
}

fn board_suffix(board: Option<&str>) -> String {
    board.map(|key| format!(", board {key}")).unwrap_or_default()
}

fn print_counts(label: &str, counts: Counts) {
    println!(
        "  {label}: {} won / {} played",
        counts.wins(),
        counts.played()
    );
}

fn print_boards(stats: &WinHistory) {
    let boards = stats.boards_played();
    if !boards.is_empty() {
        println!("Boards played: {}", boards.join(", "));
    }
}

/// Clears the recorded win history.
fn reset_history(ledger: &WinHistoryLedger) -> Result<()> {
    ledger.reset()?;
    info!("Win history cleared");
    println!("Win history cleared");
    Ok(())
}
