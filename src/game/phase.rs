//! Lifecycle phase of the current match.

use super::types::{Side, Winner};

/// Tagged match phase.
///
/// Replaces the started/turn-ended/winner flag trio with a single union so
/// that contradictory combinations (a finished match still marked as
/// running, a pending side switch with no active side) cannot be
/// represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No live match; settings may be changed freely.
    Idle,
    /// A match is running and `side` is to act.
    Playing {
        /// The side whose move is awaited.
        side: Side,
    },
    /// A turn just ended; the side switch has not run yet.
    Resolving {
        /// The side that just moved.
        side: Side,
    },
    /// The match ended.
    Over {
        /// The terminal result.
        winner: Winner,
    },
}

impl Phase {
    /// True while a match is running (a turn in play or resolving).
    pub fn in_progress(&self) -> bool {
        matches!(self, Phase::Playing { .. } | Phase::Resolving { .. })
    }

    /// The side owning the active turn, when a match is running.
    pub fn current_side(&self) -> Option<Side> {
        match self {
            Phase::Playing { side } | Phase::Resolving { side } => Some(*side),
            Phase::Idle | Phase::Over { .. } => None,
        }
    }

    /// The terminal result, once the match is over.
    pub fn winner(&self) -> Option<Winner> {
        match self {
            Phase::Over { winner } => Some(*winner),
            _ => None,
        }
    }
}
