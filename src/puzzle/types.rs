//! Puzzle definitions and the solving-session record.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::game::Coord;

/// Known-optimal solution metadata a puzzle author may record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleSolution {
    /// Minimum number of solver moves.
    optimal_length: u32,
}

/// A preset problem: obstacles already on the board, the marker placed, and
/// the human to move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleDef {
    /// Board row count.
    rows: usize,
    /// Board column count.
    cols: usize,
    /// Marker position.
    marker: Coord,
    /// Preset obstacles, listed in the order they were "played".
    blocked: Vec<Coord>,
    /// Advisory move budget shown to the solver.
    ///
    /// TODO: decide whether overrunning this budget should fail the puzzle;
    /// today failure only comes from the agent winning first.
    #[serde(default)]
    moves_limit: Option<u32>,
    /// Known-optimal solution, when recorded.
    #[serde(default)]
    solution: Option<PuzzleSolution>,
}

impl PuzzleDef {
    /// Obstacles with the marker's own cell filtered out.
    ///
    /// A puzzle author listing the marker square as blocked must not corrupt
    /// engine state, so the coincident cell is dropped here.
    pub fn obstacles(&self) -> Vec<Coord> {
        self.blocked
            .iter()
            .filter(|cell| **cell != self.marker)
            .copied()
            .collect()
    }

    /// Number of moves already "played" before the solver takes over.
    pub fn pre_move_count(&self) -> u32 {
        self.obstacles().len() as u32
    }

    /// The recorded optimal move count, if any.
    pub fn optimal_moves(&self) -> Option<u32> {
        self.solution.as_ref().map(|s| *s.optimal_length())
    }

    /// Parses a JSON puzzle catalog (an array of definitions).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the document does not parse.
    #[instrument(skip(json))]
    pub fn catalog_from_json(json: &str) -> Result<Vec<Self>, CatalogError> {
        serde_json::from_str(json)
            .map_err(|e| CatalogError::new(format!("Failed to parse puzzle catalog: {e}")))
    }
}

/// Puzzle catalog parse error with caller location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Puzzle catalog error: {} at {}:{}", message, file, line)]
pub struct CatalogError {
    /// Error message.
    pub message: String,
    /// Line number where the error was raised.
    pub line: u32,
    /// Source file where the error was raised.
    pub file: &'static str,
}

impl CatalogError {
    /// Creates a new catalog error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Puzzle lifecycle status.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PuzzleStatus {
    /// No puzzle loaded; free play.
    #[default]
    Idle,
    /// A puzzle is being solved.
    Active,
    /// The solver reached a terminal state favorably.
    Success,
    /// The agent won first.
    Failed,
}

/// Puzzle bookkeeping layered on top of the live match.
#[derive(Debug, Clone, Default, Getters)]
pub struct PuzzleSession {
    /// The puzzle being solved, if any.
    current: Option<PuzzleDef>,
    /// Solver moves made since the puzzle was (re)started.
    moves_made: u32,
    /// Lifecycle status.
    status: PuzzleStatus,
}

impl PuzzleSession {
    /// True while a puzzle is loaded and being solved.
    pub fn is_active(&self) -> bool {
        self.status == PuzzleStatus::Active
    }

    /// Installs a puzzle and marks it active.
    pub(crate) fn start(&mut self, def: PuzzleDef) {
        self.current = Some(def);
        self.moves_made = 0;
        self.status = PuzzleStatus::Active;
    }

    /// Counts one solver move. No-op outside an active puzzle.
    pub(crate) fn record_move(&mut self) {
        if self.is_active() {
            self.moves_made += 1;
        }
    }

    /// Sets the lifecycle status. No-op without a loaded puzzle.
    pub(crate) fn set_status(&mut self, status: PuzzleStatus) {
        if self.current.is_some() {
            self.status = status;
        }
    }

    /// Restarts the loaded puzzle from scratch. No-op without one.
    pub(crate) fn reset(&mut self) {
        if self.current.is_some() {
            self.moves_made = 0;
            self.status = PuzzleStatus::Active;
        }
    }

    /// Leaves puzzle mode entirely.
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}
