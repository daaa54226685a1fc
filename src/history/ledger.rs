//! Aggregate win/loss counters keyed by level, side and board size.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::store::{HistoryError, HistoryStore};
use crate::game::{Mode, Side};

/// Current persisted schema version.
pub const HISTORY_SCHEMA_VERSION: u32 = 3;

/// Number of difficulty levels tracked.
const LEVEL_COUNT: u8 = 10;

/// Per-board-size counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct BoardStats {
    /// Matches recorded on this board size.
    played: u32,
    /// Matches the human won on this board size.
    wins: u32,
}

/// Simple played/wins pair for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters)]
pub struct Counts {
    /// Matches recorded.
    played: u32,
    /// Matches the human won.
    wins: u32,
}

impl Counts {
    fn add(&mut self, other: Counts) {
        self.played += other.played;
        self.wins += other.wins;
    }
}

/// Counters for one side at one level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct SideStats {
    /// Matches recorded with the human on this side.
    played: u32,
    /// Matches the human won on this side.
    wins: u32,
    /// Per-board-size breakdown, keyed `"RxC"`.
    #[serde(default)]
    by_board: BTreeMap<String, BoardStats>,
}

impl SideStats {
    fn record(&mut self, won: bool, board_key: &str) {
        self.played += 1;
        if won {
            self.wins += 1;
        }
        let cell = self.by_board.entry(board_key.to_string()).or_default();
        cell.played += 1;
        if won {
            cell.wins += 1;
        }
    }

    /// Counters aggregated across boards, or restricted to one board size.
    pub fn counts(&self, board: Option<&str>) -> Counts {
        match board {
            None => Counts {
                played: self.played,
                wins: self.wins,
            },
            Some(key) => self
                .by_board
                .get(key)
                .map(|cell| Counts {
                    played: cell.played,
                    wins: cell.wins,
                })
                .unwrap_or_default(),
        }
    }
}

/// Both sides' counters at one level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct LevelStats {
    /// Counters with the human opening as side 0.
    as_p1: SideStats,
    /// Counters with the human replying as side 1.
    as_p2: SideStats,
}

/// The persisted win-history document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct WinHistory {
    /// Schema version.
    v: u32,
    /// Timestamp of the last recording.
    updated_at: DateTime<Utc>,
    /// Per-level counters, keyed by the decimal level.
    levels: BTreeMap<String, LevelStats>,
}

impl WinHistory {
    /// A fresh document with all levels zeroed.
    pub fn empty() -> Self {
        let levels = (1..=LEVEL_COUNT)
            .map(|level| (level.to_string(), LevelStats::default()))
            .collect();
        Self {
            v: HISTORY_SCHEMA_VERSION,
            updated_at: Utc::now(),
            levels,
        }
    }

    /// Counters for one difficulty level.
    pub fn level(&self, level: u8) -> Option<&LevelStats> {
        self.levels.get(&level.to_string())
    }

    /// Totals across all levels for both sides, aggregated or per board.
    pub fn totals(&self, board: Option<&str>) -> (Counts, Counts) {
        let mut as_p1 = Counts::default();
        let mut as_p2 = Counts::default();
        for level in self.levels.values() {
            as_p1.add(level.as_p1.counts(board));
            as_p2.add(level.as_p2.counts(board));
        }
        (as_p1, as_p2)
    }

    /// Board keys with at least one recorded match, sorted by size.
    pub fn boards_played(&self) -> Vec<String> {
        let mut keys = BTreeSet::new();
        for level in self.levels.values() {
            for side in [&level.as_p1, &level.as_p2] {
                for (key, cell) in &side.by_board {
                    if key != "unknown" && cell.played > 0 {
                        keys.insert(key.clone());
                    }
                }
            }
        }
        let mut sorted: Vec<String> = keys.into_iter().collect();
        sorted.sort_by_key(|key| board_key_dims(key));
        sorted
    }

    fn record(&mut self, human: Side, won: bool, level: u8, board_key: &str) {
        let entry = self.levels.entry(level.to_string()).or_default();
        let stats = match human {
            Side::P1 => &mut entry.as_p1,
            Side::P2 => &mut entry.as_p2,
        };
        stats.record(won, board_key);
        self.v = HISTORY_SCHEMA_VERSION;
        self.updated_at = Utc::now();
    }
}

fn board_key_dims(key: &str) -> (usize, usize) {
    let mut parts = key.splitn(2, 'x');
    let rows = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let cols = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    (rows, cols)
}

/// Pure migration from any stored schema to the current one.
///
/// Version 2 documents lack the per-board maps; they deserialize with empty
/// ones. Unknown versions yield a fresh document.
pub fn migrate(raw: Value) -> WinHistory {
    match raw.get("v").and_then(Value::as_u64) {
        Some(3) => serde_json::from_value(raw).unwrap_or_else(|_| WinHistory::empty()),
        Some(2) => match serde_json::from_value::<WinHistory>(raw) {
            Ok(mut history) => {
                history.v = HISTORY_SCHEMA_VERSION;
                history
            }
            Err(_) => WinHistory::empty(),
        },
        _ => WinHistory::empty(),
    }
}

/// Reads, records and resets the persisted win history through an injected
/// store.
pub struct WinHistoryLedger {
    store: Box<dyn HistoryStore>,
}

impl WinHistoryLedger {
    /// Creates a ledger over the given store.
    pub fn new(store: Box<dyn HistoryStore>) -> Self {
        Self { store }
    }

    /// Loads the stored history, migrating as needed.
    ///
    /// A missing or unparseable blob degrades to a fresh empty document.
    #[instrument(skip(self))]
    pub fn stats(&self) -> WinHistory {
        let blob = match self.store.load() {
            Ok(Some(blob)) => blob,
            Ok(None) => return WinHistory::empty(),
            Err(error) => {
                warn!(%error, "History load failed, starting fresh");
                return WinHistory::empty();
            }
        };
        match serde_json::from_str::<Value>(&blob) {
            Ok(raw) => migrate(raw),
            Err(error) => {
                warn!(%error, "Stored history unparseable, starting fresh");
                WinHistory::empty()
            }
        }
    }

    /// Records one finished human-vs-agent match.
    ///
    /// Modes without a fixed human side are ignored. Recording once per
    /// match is the caller's job, keyed by the session epoch.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] when the updated document cannot be
    /// persisted.
    #[instrument(skip(self))]
    pub fn record(
        &self,
        mode: Mode,
        level: u8,
        winner: Side,
        board_key: &str,
    ) -> Result<WinHistory, HistoryError> {
        let Some(human) = mode.human_side() else {
            debug!("Mode has no fixed human side, not recorded");
            return Ok(self.stats());
        };

        let mut history = self.stats();
        history.record(human, winner == human, level, board_key);

        let blob = serde_json::to_string(&history)?;
        self.store.save(&blob)?;

        info!(won = (winner == human), "Win history updated");
        Ok(history)
    }

    /// Clears all recorded history.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] when the store cannot be cleared.
    #[instrument(skip(self))]
    pub fn reset(&self) -> Result<(), HistoryError> {
        self.store.clear()
    }
}
