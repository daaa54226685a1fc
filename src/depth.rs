//! Search-depth scheduling for agent turns.
//!
//! Deeper search is reserved for the higher difficulty levels and for late
//! rounds, when branching has narrowed. Large boards pin a shallow fixed
//! depth in unattended play to bound move latency. Depths are forced odd to
//! sidestep the even/odd evaluation asymmetry of alternating-move search.

use derive_getters::Getters;
use derive_new::new;
use tracing::debug;

use crate::game::Mode;
use crate::puzzle::PuzzleStatus;

/// Fixed shallow depth used on large boards in unattended play.
const LARGE_BOARD_DEPTH: u8 = 7;

/// Inputs for one depth decision.
#[derive(Debug, Clone, Copy, Getters, new)]
pub struct DepthRequest {
    /// Difficulty level (1-10).
    difficulty: u8,
    /// Current round counter.
    round: u32,
    /// Board row count.
    rows: usize,
    /// Board column count.
    cols: usize,
    /// Match mode.
    mode: Mode,
    /// Whether this is a manually forced move.
    forced: bool,
    /// The match's configured base depth.
    start_depth: u8,
    /// The match's configured depth ceiling.
    max_depth: u8,
    /// Puzzle lifecycle status; the difficulty table only applies in free
    /// play.
    puzzle_status: PuzzleStatus,
}

/// Computes the search depth for one agent move.
pub fn compute_depth(req: &DepthRequest) -> u8 {
    let large_ai_vs_ai = (req.rows >= 9 || req.cols >= 9) && req.mode == Mode::AiVsAi;
    let very_large = req.rows >= 10 || req.cols >= 10;
    if !req.forced && (large_ai_vs_ai || very_large) {
        debug!(rows = req.rows, cols = req.cols, "Large board, capping depth");
        return LARGE_BOARD_DEPTH;
    }

    if !req.forced && req.puzzle_status == PuzzleStatus::Idle {
        match req.difficulty {
            1 | 2 => return 1,
            3 | 4 => return 3,
            5 => return 4,
            6 => return depth_with_rounds(4, 6, req.round),
            7 => return depth_with_rounds(6, 6, req.round),
            8 => return depth_with_rounds(7, 7, req.round),
            9 => return depth_with_rounds(5, 9, req.round),
            _ => {}
        }
    }

    depth_with_rounds(req.start_depth, req.max_depth, req.round)
}

/// Round-scaled depth: grows one ply per five rounds, forced odd, clamped to
/// `[start, max]`.
pub fn depth_with_rounds(start: u8, max: u8, round: u32) -> u8 {
    let mut depth = (u32::from(start) + round / 5).min(u32::from(max)) as u8;
    if depth % 2 == 0 {
        depth = depth.saturating_sub(1);
    }
    depth.max(start)
}
