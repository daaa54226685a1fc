//! Authoritative record of the current match.
//!
//! Every mutation of match state passes through the closed transition set
//! here. Transitions whose preconditions do not hold are silent no-ops: the
//! orchestrator gates calls, and a spurious UI action must never corrupt the
//! match.

use derive_getters::Getters;
use derive_setters::Setters;
use tracing::{debug, instrument};

use super::phase::Phase;
use super::types::{Coord, Mode, RoundEntry, Side, Winner};
use crate::convert::{marker_from_flat, to_grid, to_positions};
use crate::engine::{BoardEngine, SearchAgent};
use crate::puzzle::{PuzzleDef, PuzzleSession, PuzzleStatus};

/// Derived read-view of the engine board.
///
/// Replaced wholesale after every engine mutation; never inferred.
#[derive(Debug, Clone, PartialEq, Eq, Default, Getters)]
pub struct BoardSnapshot {
    /// Cell values in row-major rows.
    grid: Vec<Vec<i32>>,
    /// Marker position.
    marker: Coord,
    /// Legal destination cells for the side to move.
    valid_moves: Vec<Coord>,
}

impl BoardSnapshot {
    /// Reads a fresh snapshot off the engine board.
    pub fn read(board: &dyn BoardEngine, rows: usize, cols: usize) -> Self {
        Self {
            grid: to_grid(&board.flat_cells(), rows, cols),
            marker: marker_from_flat(&board.flat_marker()),
            valid_moves: to_positions(&board.valid_moves()),
        }
    }

    /// Whether `target` is currently a legal destination.
    pub fn allows(&self, target: Coord) -> bool {
        self.valid_moves.contains(&target)
    }

    /// Number of blocked (trail) cells on the board.
    pub fn blocked_count(&self) -> usize {
        self.grid.iter().flatten().filter(|cell| **cell == 0).count()
    }
}

/// Pre-match configuration, adjustable while no match is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Setters)]
#[setters(prefix = "with_")]
pub struct MatchSettings {
    /// Who controls each side.
    mode: Mode,
    /// Difficulty level (1-10).
    difficulty: u8,
    /// Board row count (5-11).
    rows: usize,
    /// Board column count (5-11).
    cols: usize,
    /// Base search depth for round scaling.
    start_depth: u8,
    /// Search depth ceiling.
    max_depth: u8,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            mode: Mode::HumanFirst,
            difficulty: 5,
            rows: 7,
            cols: 7,
            start_depth: 10,
            max_depth: 20,
        }
    }
}

/// Everything needed to install a fresh match.
///
/// Built by the orchestrator (or the puzzle preparation service) and handed
/// to [`MatchState::install`] in one piece, so no partially-initialized
/// match is ever observable.
pub struct MatchSetup {
    board: Box<dyn BoardEngine>,
    agents: [Option<Box<dyn SearchAgent>>; 2],
    snapshot: BoardSnapshot,
    rows: usize,
    cols: usize,
    mode: Option<Mode>,
    side: Side,
    move_log: Vec<RoundEntry>,
    round: u32,
}

impl MatchSetup {
    /// Starts a setup from a board handle and its derived snapshot.
    pub fn new(
        board: Box<dyn BoardEngine>,
        snapshot: BoardSnapshot,
        rows: usize,
        cols: usize,
    ) -> Self {
        Self {
            board,
            agents: [None, None],
            snapshot,
            rows,
            cols,
            mode: None,
            side: Side::P1,
            move_log: Vec::new(),
            round: 0,
        }
    }

    /// Attaches per-side agents.
    pub fn with_agents(
        mut self,
        p1: Option<Box<dyn SearchAgent>>,
        p2: Option<Box<dyn SearchAgent>>,
    ) -> Self {
        self.agents = [p1, p2];
        self
    }

    /// Overrides the match mode (puzzle installs resolve their own).
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Overrides the side to act first.
    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    /// Seeds a reconstructed move log and round counter.
    pub fn with_history(mut self, move_log: Vec<RoundEntry>, round: u32) -> Self {
        self.move_log = move_log;
        self.round = round;
        self
    }
}

/// The authoritative in-memory record of the current match.
pub struct MatchState {
    board: Option<Box<dyn BoardEngine>>,
    agents: [Option<Box<dyn SearchAgent>>; 2],
    snapshot: BoardSnapshot,
    move_log: Vec<RoundEntry>,
    round: u32,
    phase: Phase,
    settings: MatchSettings,
    rows: usize,
    cols: usize,
    session_epoch: u64,
    skip_stats: bool,
    puzzle: PuzzleSession,
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new(MatchSettings::default())
    }
}

impl MatchState {
    /// Creates an idle session with the given settings.
    pub fn new(settings: MatchSettings) -> Self {
        Self {
            board: None,
            agents: [None, None],
            snapshot: BoardSnapshot::default(),
            move_log: Vec::new(),
            round: 0,
            phase: Phase::Idle,
            rows: *settings.rows(),
            cols: *settings.cols(),
            settings,
            session_epoch: 0,
            skip_stats: false,
            puzzle: PuzzleSession::default(),
        }
    }

    // ── Read access ──────────────────────────────────────────────

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Pre-match configuration.
    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    /// Derived board view.
    pub fn snapshot(&self) -> &BoardSnapshot {
        &self.snapshot
    }

    /// Recorded rounds so far.
    pub fn move_log(&self) -> &[RoundEntry] {
        &self.move_log
    }

    /// Move counter, advanced after every applied move.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Live board row count (puzzles may differ from the settings).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Live board column count.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Monotonic match identifier, bumped on every install.
    pub fn session_epoch(&self) -> u64 {
        self.session_epoch
    }

    /// Whether this match is excluded from win-history recording.
    pub fn skip_stats(&self) -> bool {
        self.skip_stats
    }

    /// Puzzle bookkeeping.
    pub fn puzzle(&self) -> &PuzzleSession {
        &self.puzzle
    }

    /// Current mode (possibly overridden by a puzzle install).
    pub fn mode(&self) -> Mode {
        *self.settings.mode()
    }

    /// The engine board, when a match has been installed.
    pub fn board(&self) -> Option<&dyn BoardEngine> {
        self.board.as_deref()
    }

    /// Mutable access to the engine board.
    pub fn board_mut(&mut self) -> Option<&mut (dyn BoardEngine + 'static)> {
        self.board.as_deref_mut()
    }

    /// Whether a persistent agent exists for `side`.
    pub fn has_agent(&self, side: Side) -> bool {
        self.agents[side.index()].is_some()
    }

    /// Whether the active turn belongs to an agent under the current mode.
    pub fn ai_to_act(&self) -> bool {
        self.phase
            .current_side()
            .is_some_and(|side| self.mode().is_ai_side(side))
    }

    // ── Transitions ──────────────────────────────────────────────

    /// Replaces the settings. No-op while a match is running.
    pub fn set_settings(&mut self, settings: MatchSettings) {
        if self.phase.in_progress() {
            debug!("settings change ignored while a match is running");
            return;
        }
        self.settings = settings;
    }

    /// Installs a fresh match and starts play.
    #[instrument(skip(self, setup), fields(epoch = self.session_epoch + 1))]
    pub fn install(&mut self, setup: MatchSetup) {
        let side = setup.side;
        self.install_parts(setup);
        self.phase = Phase::Playing { side };
    }

    /// Installs a fresh board without starting play.
    #[instrument(skip(self, setup), fields(epoch = self.session_epoch + 1))]
    pub fn install_idle(&mut self, setup: MatchSetup) {
        self.install_parts(setup);
        self.phase = Phase::Idle;
    }

    fn install_parts(&mut self, setup: MatchSetup) {
        if let Some(mode) = setup.mode {
            self.settings = self.settings.with_mode(mode);
        }
        self.board = Some(setup.board);
        self.agents = setup.agents;
        self.snapshot = setup.snapshot;
        self.rows = setup.rows;
        self.cols = setup.cols;
        self.move_log = setup.move_log;
        self.round = setup.round;
        self.session_epoch += 1;
        self.skip_stats = false;
    }

    /// Stores an agent for `side`, replacing any existing one.
    pub fn install_agent(&mut self, side: Side, agent: Box<dyn SearchAgent>) {
        self.agents[side.index()] = Some(agent);
    }

    /// Asks the stored agent for `side` to choose a move.
    ///
    /// Returns `None` when no board or no agent is installed.
    pub(crate) fn agent_choose(&mut self, side: Side, depth: u8) -> Option<Coord> {
        let round = self.round;
        let board = self.board.as_deref()?;
        let agent = self.agents[side.index()].as_deref_mut()?;
        Some(agent.choose_move(board, depth, round))
    }

    /// Records the active side's move in the log.
    ///
    /// Does not change whose turn it is. Side 0 opens a round; side 1 fills
    /// the reply slot of the latest round.
    pub fn apply_move(&mut self, target: Coord) {
        let Some(side) = self.phase.current_side() else {
            debug!("apply_move ignored: no active match");
            return;
        };
        match side {
            Side::P1 => self.move_log.push(RoundEntry::opened_by(target)),
            Side::P2 => {
                if let Some(last) = self.move_log.last_mut() {
                    last.fill_reply(target);
                }
            }
        }
    }

    /// Re-reads the derived snapshot from the engine board.
    pub fn refresh_snapshot(&mut self) {
        let Some(board) = self.board.as_deref() else {
            return;
        };
        self.snapshot = BoardSnapshot::read(board, self.rows, self.cols);
    }

    /// Marks the active turn as ended, pending the side switch.
    pub fn end_turn(&mut self) {
        if let Phase::Playing { side } = self.phase {
            self.phase = Phase::Resolving { side };
        }
    }

    /// Hands the turn to the opposing side.
    pub fn switch_side(&mut self) {
        if let Phase::Resolving { side } = self.phase {
            self.phase = Phase::Playing {
                side: side.opponent(),
            };
        }
    }

    /// Sets or clears the terminal result.
    ///
    /// A result ends the match; clearing one dismisses it back to idle.
    pub fn set_winner(&mut self, winner: Option<Winner>) {
        match winner {
            Some(w) if self.phase.in_progress() => self.phase = Phase::Over { winner: w },
            None if matches!(self.phase, Phase::Over { .. }) => self.phase = Phase::Idle,
            _ => debug!(?winner, "winner transition ignored"),
        }
    }

    /// Advances the move counter.
    pub fn increment_round(&mut self) {
        self.round += 1;
    }

    /// Excludes this match from win-history recording.
    pub fn mark_skip_stats(&mut self) {
        self.skip_stats = true;
    }

    // ── Puzzle transitions ───────────────────────────────────────

    /// Installs a puzzle and marks it active.
    pub fn puzzle_start(&mut self, def: PuzzleDef) {
        self.puzzle.start(def);
    }

    /// Counts one solver move.
    pub fn puzzle_record_move(&mut self) {
        self.puzzle.record_move();
    }

    /// Sets the puzzle lifecycle status.
    pub fn puzzle_set_status(&mut self, status: PuzzleStatus) {
        self.puzzle.set_status(status);
    }

    /// Restarts the loaded puzzle.
    pub fn puzzle_reset(&mut self) {
        self.puzzle.reset();
    }

    /// Leaves puzzle mode for free play.
    pub fn puzzle_clear(&mut self) {
        self.puzzle.clear();
    }
}
