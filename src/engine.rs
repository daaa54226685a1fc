//! Seams to the external rules engine and search agents.
//!
//! The orchestration layer never inspects move legality or terminal
//! conditions itself; it drives implementations of these traits. Position
//! payloads cross the boundary in one of a closed set of raw shapes
//! ([`RawPositions`]) normalized by [`crate::convert`].

use derive_getters::Getters;
use derive_new::new;

use crate::game::{Coord, Side};

/// Raw position payload as surfaced by an engine binding.
///
/// Some accessors return an interleaved flat list, others pre-paired
/// values. Anything malformed normalizes to "no positions" rather than an
/// error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawPositions {
    /// Interleaved `[r0, c0, r1, c1, ..]`.
    Flat(Vec<i32>),
    /// Already-paired `(row, col)` values.
    Pairs(Vec<(i32, i32)>),
}

/// The board-rules engine owning cell state, legality and termination.
///
/// Moves passed to [`BoardEngine::make_move`] are assumed legal; callers
/// check the valid-move set first.
pub trait BoardEngine {
    /// Reinitializes the board to an empty grid of the given size.
    fn reset_board(&mut self, rows: usize, cols: usize, auto_block_center: bool);
    /// Marks a single cell as blocked.
    fn block_cell(&mut self, row: usize, col: usize);
    /// Places the marker, optionally also blocking its cell.
    fn set_marker(&mut self, row: usize, col: usize, also_block: bool);
    /// Tells the engine whose move it is.
    fn set_current_side(&mut self, side: Side);
    /// Applies a pre-validated move.
    fn make_move(&mut self, target: Coord);
    /// Hands the turn to the opposing side.
    fn switch_side(&mut self);
    /// Whether the match has ended.
    fn is_terminal(&self) -> bool;
    /// Raw winner code; meaningful only once [`BoardEngine::is_terminal`]
    /// reports true.
    fn winner_code(&self) -> i32;
    /// Flat row-major cell values.
    fn flat_cells(&self) -> Vec<i32>;
    /// Currently legal target cells.
    fn valid_moves(&self) -> RawPositions;
    /// Marker position as a flat `[row, col]` list.
    fn flat_marker(&self) -> Vec<i32>;
}

/// Creates fresh board handles; one per match, never reused across matches.
pub trait BoardFactory {
    /// Builds a board sized `rows` x `cols`.
    fn create_board(&self, rows: usize, cols: usize) -> Box<dyn BoardEngine>;
}

/// Construction parameters for a search agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, new)]
pub struct AgentSpec {
    /// Whether the agent plays the maximizing side (side 0).
    maximizing: bool,
    /// Hard ceiling on search depth for this agent's lifetime.
    max_depth: u8,
    /// Difficulty level the agent was built for (1-10).
    level: u8,
    /// Engine-side debug verbosity.
    verbosity: u8,
}

/// A search agent choosing moves for one side.
pub trait SearchAgent {
    /// Picks a move for the current position. Assumed total and
    /// terminating; the orchestrator applies the result verbatim.
    fn choose_move(&mut self, board: &dyn BoardEngine, depth: u8, round: u32) -> Coord;
}

/// Creates search agents on demand.
pub trait AgentFactory {
    /// Builds an agent from the given spec.
    fn create_agent(&self, spec: AgentSpec) -> Box<dyn SearchAgent>;
}
