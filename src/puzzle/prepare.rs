//! Applies a puzzle definition to a fresh engine board and resolves sides.

use tracing::{debug, instrument};

use super::types::PuzzleDef;
use crate::engine::{AgentFactory, AgentSpec, BoardEngine, BoardFactory, SearchAgent};
use crate::game::{BoardSnapshot, Coord, MatchSetup, Mode, RoundEntry, Side};

/// Output of puzzle preparation: the side-resolved configuration, ready to
/// install as a match that has "already been in progress".
pub struct PreparedMatch {
    board: Box<dyn BoardEngine>,
    agents: [Option<Box<dyn SearchAgent>>; 2],
    snapshot: BoardSnapshot,
    rows: usize,
    cols: usize,
    mode: Mode,
    side_to_move: Side,
    move_log: Vec<RoundEntry>,
    round: u32,
}

impl PreparedMatch {
    /// The resolved mode (human-first when side 0 is to move).
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The side to move — always the human's side in a puzzle.
    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    /// Seed value for the move counter (the puzzle's pre-moves).
    pub fn round(&self) -> u32 {
        self.round
    }

    /// The reconstructed move log.
    pub fn move_log(&self) -> &[RoundEntry] {
        &self.move_log
    }

    /// The derived board view after the puzzle was applied.
    pub fn snapshot(&self) -> &BoardSnapshot {
        &self.snapshot
    }

    /// Whether an agent was built for `side`.
    pub fn has_agent(&self, side: Side) -> bool {
        self.agents[side.index()].is_some()
    }

    /// Converts into a [`MatchSetup`] for installation.
    pub fn into_setup(self) -> MatchSetup {
        let [p1, p2] = self.agents;
        MatchSetup::new(self.board, self.snapshot, self.rows, self.cols)
            .with_agents(p1, p2)
            .with_mode(self.mode)
            .with_side(self.side_to_move)
            .with_history(self.move_log, self.round)
    }
}

/// Prepares a puzzle on a fresh board.
///
/// Obstacles are applied with the marker's own cell excluded, the marker is
/// placed without blocking, and the side to move falls out of obstacle
/// parity: the marker plus an odd obstacle count means side 0 opens. At most
/// one agent is built, for the side the human does not hold.
#[instrument(skip_all, fields(rows = *puzzle.rows(), cols = *puzzle.cols()))]
pub fn prepare_puzzle(
    puzzle: &PuzzleDef,
    boards: &dyn BoardFactory,
    agents: &dyn AgentFactory,
    max_depth: u8,
    level: u8,
) -> PreparedMatch {
    let rows = *puzzle.rows();
    let cols = *puzzle.cols();
    let mut board = boards.create_board(rows, cols);
    board.reset_board(rows, cols, false);

    let marker = *puzzle.marker();
    for cell in puzzle.obstacles() {
        board.block_cell(cell.row, cell.col);
    }
    board.set_marker(marker.row, marker.col, false);

    let snapshot = BoardSnapshot::read(board.as_ref(), rows, cols);

    // One white marker plus the trail: odd total means side 0 is to move.
    let total_markers = snapshot.blocked_count() + 1;
    let side_to_move = if total_markers % 2 == 1 {
        Side::P1
    } else {
        Side::P2
    };
    board.set_current_side(side_to_move);

    let opponent = side_to_move.opponent();
    let agent = agents.create_agent(AgentSpec::new(
        opponent == Side::P1,
        max_depth,
        level,
        0,
    ));
    let mut pair: [Option<Box<dyn SearchAgent>>; 2] = [None, None];
    pair[opponent.index()] = Some(agent);

    let move_log = reconstruct_move_log(puzzle);
    let round = puzzle.pre_move_count();
    let mode = if side_to_move == Side::P1 {
        Mode::HumanFirst
    } else {
        Mode::AiFirst
    };

    debug!(?side_to_move, ?mode, round, "Puzzle prepared");

    PreparedMatch {
        board,
        agents: pair,
        snapshot,
        rows,
        cols,
        mode,
        side_to_move,
        move_log,
        round,
    }
}

/// Rebuilds a plausible move log from the obstacle placement order.
///
/// The obstacle list is taken as chronological move order; the marker's
/// final square is the destination of the most recent move.
fn reconstruct_move_log(puzzle: &PuzzleDef) -> Vec<RoundEntry> {
    let obstacles = puzzle.obstacles();
    if obstacles.is_empty() {
        return Vec::new();
    }

    let mut destinations: Vec<Coord> = obstacles[1..].to_vec();
    destinations.push(*puzzle.marker());
    pair_moves(&destinations)
}

fn pair_moves(moves: &[Coord]) -> Vec<RoundEntry> {
    let mut rounds: Vec<RoundEntry> = Vec::with_capacity(moves.len().div_ceil(2));
    for (i, target) in moves.iter().enumerate() {
        if i % 2 == 0 {
            rounds.push(RoundEntry::opened_by(*target));
        } else if let Some(last) = rounds.last_mut() {
            last.fill_reply(*target);
        }
    }
    rounds
}
