//! Core domain types for match orchestration.

use derive_new::new;
use serde::{Deserialize, Serialize};

/// One of the two competing positions in a match, independent of whether a
/// human or a search agent controls it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Side 0, the side that opens every round.
    P1,
    /// Side 1, the replying side.
    P2,
}

impl Side {
    /// Returns the opposing side.
    pub fn opponent(self) -> Self {
        match self {
            Side::P1 => Side::P2,
            Side::P2 => Side::P1,
        }
    }

    /// Slot index (0 or 1) used for move-log rounds and agent storage.
    pub fn index(self) -> usize {
        match self {
            Side::P1 => 0,
            Side::P2 => 1,
        }
    }

    /// The engine's integer encoding: player `1` or `2`.
    pub fn engine_int(self) -> i32 {
        match self {
            Side::P1 => 1,
            Side::P2 => 2,
        }
    }
}

/// Board coordinate as zero-based `(row, col)` from the engine's top-left.
///
/// Serialized as a two-element array to match the engine binding and the
/// puzzle catalog format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, new)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Coord {
    /// Row index, counted from the engine's top.
    pub row: usize,
    /// Column index, counted from the left.
    pub col: usize,
}

impl From<(usize, usize)> for Coord {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl From<Coord> for (usize, usize) {
    fn from(coord: Coord) -> Self {
        (coord.row, coord.col)
    }
}

/// Who controls each side of the match.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Mode {
    /// Two humans alternating at the same board.
    HumanVsHuman,
    /// Human plays side 0, an agent replies as side 1.
    HumanFirst,
    /// An agent opens as side 0, the human replies as side 1.
    AiFirst,
    /// Agents on both sides.
    AiVsAi,
}

impl Mode {
    /// Whether `side` is agent-controlled under this mode.
    pub fn is_ai_side(self, side: Side) -> bool {
        match self {
            Mode::HumanVsHuman => false,
            Mode::HumanFirst => side == Side::P2,
            Mode::AiFirst => side == Side::P1,
            Mode::AiVsAi => true,
        }
    }

    /// The human's fixed side, defined only for the human-vs-agent modes.
    pub fn human_side(self) -> Option<Side> {
        match self {
            Mode::HumanFirst => Some(Side::P1),
            Mode::AiFirst => Some(Side::P2),
            Mode::HumanVsHuman | Mode::AiVsAi => None,
        }
    }

    /// True for the two modes that pit one human against one agent.
    pub fn versus_ai(self) -> bool {
        matches!(self, Mode::HumanFirst | Mode::AiFirst)
    }
}

/// Terminal result as reported by the rules engine.
///
/// Codes `1`/`2` mean that side reached its goal square; `3`/`6` mean the
/// opponent was left without a legal move (winning side times three).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Winner {
    code: i32,
}

impl Winner {
    /// Wraps a raw engine code, rejecting values outside the known domain.
    pub fn from_code(code: i32) -> Option<Self> {
        matches!(code, 1 | 2 | 3 | 6).then_some(Self { code })
    }

    /// The raw engine code.
    pub fn code(self) -> i32 {
        self.code
    }

    /// The winning side, normalized across both victory kinds.
    pub fn side(self) -> Side {
        let n = if self.code <= 2 {
            self.code
        } else {
            self.code / 3
        };
        if n == 1 { Side::P1 } else { Side::P2 }
    }

    /// True when the win came from blocking the opponent rather than
    /// reaching the goal.
    pub fn by_blocking(self) -> bool {
        self.code > 2
    }
}

/// One full alternation: side 0's move followed by side 1's reply.
///
/// Created when side 0 moves; side 1's slot is filled in place. Once both
/// slots are filled the round is never reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundEntry {
    moves: [Option<Coord>; 2],
}

impl RoundEntry {
    /// Opens a round with side 0's move.
    pub fn opened_by(target: Coord) -> Self {
        Self {
            moves: [Some(target), None],
        }
    }

    /// Fills side 1's slot. No-op if the reply was already recorded.
    pub fn fill_reply(&mut self, target: Coord) {
        if self.moves[1].is_none() {
            self.moves[1] = Some(target);
        }
    }

    /// The move recorded for `side` in this round, if any.
    pub fn side(&self, side: Side) -> Option<Coord> {
        self.moves[side.index()]
    }

    /// True once both slots hold a move.
    pub fn complete(&self) -> bool {
        self.moves.iter().all(Option::is_some)
    }
}
