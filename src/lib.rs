//! Rastros game orchestration.
//!
//! Turn and lifecycle coordination for a two-player trail-blocking pursuit
//! game on a variable-size grid. The rules engine (legality, termination)
//! and the search agents (move choice) are external collaborators behind
//! the traits exported here; this crate owns everything in between.
//!
//! # Architecture
//!
//! - **Session state**: the authoritative match record with a closed set of
//!   transitions ([`MatchState`]).
//! - **Orchestrator**: decides whose turn acts, requests agent moves at the
//!   scheduled depth, resolves terminal states, and drives puzzle and
//!   win-history side effects ([`Orchestrator`]).
//! - **Depth policy**: pure depth scheduling from difficulty, board size
//!   and round ([`compute_depth`]).
//! - **Puzzles**: preset problems layered on top of free play
//!   ([`PuzzleDef`], [`prepare_puzzle`]).
//! - **Win history**: persistent aggregate counters behind an injected
//!   store ([`WinHistoryLedger`]).
//!
//! # Example
//!
//! ```no_run
//! use rastros::{Coord, MatchSettings, Mode, Orchestrator};
//!
//! # fn example(boards: Box<dyn rastros::BoardFactory>,
//! #            agents: Box<dyn rastros::AgentFactory>) {
//! let mut game = Orchestrator::with_settings(
//!     MatchSettings::default().with_mode(Mode::HumanFirst),
//! );
//! game.attach_engine(boards, agents);
//! game.start_match();
//! game.submit_human_move(Coord::new(3, 2));
//! game.pump(); // runs the agent's reply
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod convert;
mod depth;
mod engine;
mod export;
mod game;
mod history;
mod puzzle;

// Crate-level exports - Configuration
pub use config::{ConfigError, HISTORY_PATH_ENV, RastrosConfig};

// Crate-level exports - Engine payload normalization and notation
pub use convert::{marker_from_flat, parse_notation, to_grid, to_notation, to_positions};

// Crate-level exports - Depth policy
pub use depth::{DepthRequest, compute_depth, depth_with_rounds};

// Crate-level exports - External interface seams
pub use engine::{AgentFactory, AgentSpec, BoardEngine, BoardFactory, RawPositions, SearchAgent};

// Crate-level exports - CSV export
pub use export::{export_file_name, log_to_csv};

// Crate-level exports - Match lifecycle
pub use game::{
    AudioCue, BoardSnapshot, Coord, GameEvent, MatchSettings, MatchSetup, MatchState, Mode,
    Orchestrator, Phase, RoundEntry, Side, Winner,
};

// Crate-level exports - Win history
pub use history::{
    BoardStats, Counts, FileHistoryStore, HISTORY_SCHEMA_VERSION, HistoryError, HistoryStore,
    LevelStats, MemoryHistoryStore, SideStats, WinHistory, WinHistoryLedger, migrate,
};

// Crate-level exports - Puzzles
pub use puzzle::{
    CatalogError, PreparedMatch, PuzzleDef, PuzzleSession, PuzzleSolution, PuzzleStatus,
    prepare_puzzle,
};
