//! Persistent win/loss history for human-vs-agent matches.

mod ledger;
mod store;

pub use ledger::{
    BoardStats, Counts, HISTORY_SCHEMA_VERSION, LevelStats, SideStats, WinHistory,
    WinHistoryLedger, migrate,
};
pub use store::{FileHistoryStore, HistoryError, HistoryStore, MemoryHistoryStore};
