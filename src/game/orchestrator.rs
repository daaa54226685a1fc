//! Turn coordination: who acts, agent scheduling, terminal resolution.
//!
//! All sequencing runs on an explicit follow-up queue instead of timers, so
//! "apply move, then resolve the turn" is a deterministic transaction. Each
//! queued entry carries the session epoch it was scheduled under; entries
//! left over from a replaced match are discarded on drain.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use tracing::{debug, instrument, warn};

use super::phase::Phase;
use super::state::{BoardSnapshot, MatchSettings, MatchSetup, MatchState};
use super::types::{Coord, Mode, Side, Winner};
use crate::depth::{DepthRequest, compute_depth, depth_with_rounds};
use crate::engine::{AgentFactory, AgentSpec, BoardFactory};
use crate::export::log_to_csv;
use crate::history::WinHistoryLedger;
use crate::puzzle::{PuzzleDef, PuzzleStatus, prepare_puzzle};

/// Search ceiling used for freshly selected puzzles.
const PUZZLE_MAX_DEPTH: u8 = 11;
/// Difficulty level used for freshly selected puzzles.
const PUZZLE_LEVEL: u8 = 10;
/// Difficulty level for manually forced moves.
const FORCED_LEVEL: u8 = 10;
/// Depth pinned for forced moves on large boards.
const FORCED_LARGE_BOARD_DEPTH: u8 = 8;

/// Audio cue selected for the rendering layer; playback lives elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    /// A stone was placed.
    Move,
    /// The human (or the watching player) won.
    Win,
    /// The agent won.
    Lose,
}

/// Notifications for the rendering layer, drained after each action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// The derived board view was replaced.
    SnapshotChanged,
    /// A move was applied for `side`.
    MoveApplied {
        /// The side that moved.
        side: Side,
        /// The destination cell.
        target: Coord,
    },
    /// The turn passed; `side` is now to act.
    TurnPassed {
        /// The side now to act.
        side: Side,
    },
    /// The match ended.
    GameOver {
        /// The terminal result.
        winner: Winner,
    },
    /// The puzzle lifecycle advanced.
    PuzzleStatus {
        /// New status.
        status: PuzzleStatus,
    },
    /// An audio cue was selected.
    Cue(AudioCue),
}

/// Deferred continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FollowUp {
    ResolveTurn,
    AiMove { forced: bool },
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    epoch: u64,
    task: FollowUp,
}

/// Coordinates the turn lifecycle over the session state.
pub struct Orchestrator {
    state: MatchState,
    boards: Option<Box<dyn BoardFactory>>,
    agents: Option<Box<dyn AgentFactory>>,
    ledger: Option<WinHistoryLedger>,
    catalog: Vec<PuzzleDef>,
    queue: VecDeque<Scheduled>,
    events: VecDeque<GameEvent>,
    recorded_epoch: Option<u64>,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Orchestrator {
    /// Creates an orchestrator with default settings and no engine attached.
    pub fn new() -> Self {
        Self::with_settings(MatchSettings::default())
    }

    /// Creates an orchestrator with the given settings.
    pub fn with_settings(settings: MatchSettings) -> Self {
        Self {
            state: MatchState::new(settings),
            boards: None,
            agents: None,
            ledger: None,
            catalog: Vec::new(),
            queue: VecDeque::new(),
            events: VecDeque::new(),
            recorded_epoch: None,
        }
    }

    /// Attaches the engine seams. Until this runs, all actions are no-ops.
    pub fn attach_engine(
        &mut self,
        boards: Box<dyn BoardFactory>,
        agents: Box<dyn AgentFactory>,
    ) {
        self.boards = Some(boards);
        self.agents = Some(agents);
    }

    /// Attaches the win-history ledger.
    pub fn set_ledger(&mut self, ledger: WinHistoryLedger) {
        self.ledger = Some(ledger);
    }

    /// Replaces the puzzle catalog used for random selection.
    pub fn set_puzzle_catalog(&mut self, catalog: Vec<PuzzleDef>) {
        self.catalog = catalog;
    }

    /// Read access to the session state.
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// The attached ledger, when one was set.
    pub fn ledger(&self) -> Option<&WinHistoryLedger> {
        self.ledger.as_ref()
    }

    /// Replaces pre-match settings; ignored while a match is running.
    pub fn configure(&mut self, settings: MatchSettings) {
        self.state.set_settings(settings);
    }

    /// Takes all pending UI notifications.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }

    /// Exports the current move log as CSV.
    pub fn move_log_csv(&self) -> String {
        log_to_csv(self.state.move_log(), self.state.rows())
    }

    // ── Lifecycle entry points ───────────────────────────────────

    /// Starts a fresh free-play match with the current settings.
    #[instrument(skip(self))]
    pub fn start_match(&mut self) {
        let Some(setup) = self.build_free_play_setup() else {
            return;
        };
        self.state.puzzle_clear();
        self.state.install(setup);
        self.events.push_back(GameEvent::SnapshotChanged);

        // Agent-opening modes act immediately.
        if self.state.ai_to_act() {
            self.schedule(FollowUp::AiMove { forced: false });
        }
    }

    /// Replaces the match with a fresh board without starting play.
    #[instrument(skip(self))]
    pub fn reset_match(&mut self) {
        let Some(setup) = self.build_free_play_setup() else {
            return;
        };
        self.state.puzzle_clear();
        self.state.install_idle(setup);
        self.events.push_back(GameEvent::SnapshotChanged);
    }

    fn build_free_play_setup(&self) -> Option<MatchSetup> {
        let (Some(boards), Some(agents)) = (&self.boards, &self.agents) else {
            debug!("Engine not attached, ignoring");
            return None;
        };
        let settings = *self.state.settings();
        let (rows, cols) = (*settings.rows(), *settings.cols());
        let board = boards.create_board(rows, cols);
        let p1 = agents.create_agent(AgentSpec::new(
            true,
            *settings.max_depth(),
            *settings.difficulty(),
            2,
        ));
        let p2 = agents.create_agent(AgentSpec::new(
            false,
            *settings.max_depth(),
            *settings.difficulty(),
            2,
        ));
        let snapshot = BoardSnapshot::read(board.as_ref(), rows, cols);
        Some(
            MatchSetup::new(board, snapshot, rows, cols).with_agents(Some(p1), Some(p2)),
        )
    }

    /// Dismisses a finished match's result, returning to idle.
    pub fn dismiss_result(&mut self) {
        self.state.set_winner(None);
    }

    // ── Moves ────────────────────────────────────────────────────

    /// Applies a human click on a cell.
    ///
    /// Silently ignored unless a match is running, it is a human turn, and
    /// the cell is currently playable — clicking a dead cell is normal UI
    /// noise, not an error.
    #[instrument(skip_all, fields(row = target.row, col = target.col))]
    pub fn submit_human_move(&mut self, target: Coord) {
        let Phase::Playing { side } = self.state.phase() else {
            debug!("Click ignored: no active turn");
            return;
        };
        if self.state.ai_to_act() {
            debug!("Click ignored: agent's turn");
            return;
        }
        if !self.state.snapshot().allows(target) {
            debug!("Click ignored: cell not playable");
            return;
        }

        self.apply_and_log(side, target);

        if self.state.puzzle().is_active() {
            self.state.puzzle_record_move();
        }

        // Human moves resolve synchronously; there is no intermediate
        // render to wait for.
        self.resolve_turn();
    }

    /// Requests an agent move.
    ///
    /// `forced` is the manual override: it plays for the human's own side
    /// with a one-shot strong agent and excludes the match from the win
    /// history. Unforced requests only fire on agent turns.
    #[instrument(skip(self))]
    pub fn request_ai_move(&mut self, forced: bool) {
        self.run_ai_move(forced);
    }

    fn run_ai_move(&mut self, forced: bool) {
        let Phase::Playing { side } = self.state.phase() else {
            debug!("Agent move ignored: no active turn");
            return;
        };
        if self.state.board().is_none_or(|board| board.is_terminal()) {
            debug!("Agent move ignored: match already decided");
            return;
        }

        let settings = *self.state.settings();
        let mode = self.state.mode();
        let round = self.state.round();

        let target = if forced {
            if self.state.ai_to_act() {
                debug!("Forced move ignored: already the agent's turn");
                return;
            }
            let Some(factory) = &self.agents else {
                return;
            };
            let depth = if self.state.rows() >= 9 || self.state.cols() >= 9 {
                FORCED_LARGE_BOARD_DEPTH
            } else {
                depth_with_rounds(*settings.start_depth(), *settings.max_depth(), round)
            };
            let mut agent = factory.create_agent(AgentSpec::new(
                side == Side::P1,
                depth,
                FORCED_LEVEL,
                1,
            ));
            let Some(board) = self.state.board() else {
                return;
            };
            let chosen = agent.choose_move(board, depth, round);
            // Someone else picked this move; keep the result off the books.
            if mode.versus_ai() {
                self.state.mark_skip_stats();
            }
            chosen
        } else {
            if !self.state.ai_to_act() {
                debug!("Agent move ignored: not an agent turn");
                return;
            }
            let depth = compute_depth(&DepthRequest::new(
                *settings.difficulty(),
                round,
                self.state.rows(),
                self.state.cols(),
                mode,
                false,
                *settings.start_depth(),
                *settings.max_depth(),
                *self.state.puzzle().status(),
            ));
            if !self.state.has_agent(side) {
                // The "force move" path can leave a side with no persistent
                // agent; build one on demand.
                let Some(factory) = &self.agents else {
                    return;
                };
                let agent = factory.create_agent(AgentSpec::new(
                    side == Side::P1,
                    *settings.max_depth(),
                    *settings.difficulty(),
                    0,
                ));
                self.state.install_agent(side, agent);
            }
            match self.state.agent_choose(side, depth) {
                Some(target) => target,
                None => return,
            }
        };

        self.apply_and_log(side, target);

        // Let a render show the agent's move before the turn resolves.
        self.schedule(FollowUp::ResolveTurn);
    }

    fn apply_and_log(&mut self, side: Side, target: Coord) {
        let Some(board) = self.state.board_mut() else {
            return;
        };
        board.make_move(target);
        self.events.push_back(GameEvent::Cue(AudioCue::Move));
        self.state.apply_move(target);
        self.events.push_back(GameEvent::MoveApplied { side, target });
        self.state.refresh_snapshot();
        self.events.push_back(GameEvent::SnapshotChanged);
        self.state.increment_round();
    }

    // ── Turn resolution ──────────────────────────────────────────

    fn resolve_turn(&mut self) {
        let Some(side) = self.state.phase().current_side() else {
            return;
        };
        let (terminal, code) = {
            let Some(board) = self.state.board() else {
                return;
            };
            (board.is_terminal(), board.winner_code())
        };

        if terminal {
            let Some(winner) = Winner::from_code(code) else {
                warn!(code, "Engine reported unknown winner code");
                return;
            };

            if self.state.puzzle().is_active() {
                let status = if self.state.mode().is_ai_side(side) {
                    PuzzleStatus::Failed
                } else {
                    PuzzleStatus::Success
                };
                self.state.puzzle_set_status(status);
                self.events.push_back(GameEvent::PuzzleStatus { status });
            }

            self.state.set_winner(Some(winner));
            self.events.push_back(GameEvent::GameOver { winner });
            self.select_result_cue(winner);
            self.record_result(winner);
        } else {
            self.state.end_turn();
            if let Some(board) = self.state.board_mut() {
                board.switch_side();
            }
            self.state.switch_side();
            self.state.refresh_snapshot();
            self.events.push_back(GameEvent::SnapshotChanged);
            if let Some(next) = self.state.phase().current_side() {
                self.events.push_back(GameEvent::TurnPassed { side: next });
            }
            if self.state.ai_to_act() {
                self.schedule(FollowUp::AiMove { forced: false });
            }
        }
    }

    fn select_result_cue(&mut self, winner: Winner) {
        let cue = match self.state.mode() {
            Mode::HumanVsHuman => Some(AudioCue::Win),
            Mode::AiVsAi => None,
            mode => mode.human_side().map(|human| {
                if winner.side() == human {
                    AudioCue::Win
                } else {
                    AudioCue::Lose
                }
            }),
        };
        if let Some(cue) = cue {
            self.events.push_back(GameEvent::Cue(cue));
        }
    }

    fn record_result(&mut self, winner: Winner) {
        let mode = self.state.mode();
        if !mode.versus_ai() {
            return;
        }
        if self.state.skip_stats() {
            debug!("Match excluded from win history");
            return;
        }
        let epoch = self.state.session_epoch();
        if self.recorded_epoch == Some(epoch) {
            return;
        }
        self.recorded_epoch = Some(epoch);

        let Some(ledger) = &self.ledger else {
            return;
        };
        let board_key = format!("{}x{}", self.state.rows(), self.state.cols());
        let level = *self.state.settings().difficulty();
        if let Err(error) = ledger.record(mode, level, winner.side(), &board_key) {
            warn!(%error, "Failed to persist win history");
        }
    }

    // ── Puzzles ──────────────────────────────────────────────────

    /// Installs a specific puzzle and starts solving it.
    #[instrument(skip_all)]
    pub fn start_puzzle(&mut self, puzzle: PuzzleDef) {
        let (Some(boards), Some(agents)) = (&self.boards, &self.agents) else {
            debug!("Engine not attached, ignoring");
            return;
        };
        let prepared = prepare_puzzle(
            &puzzle,
            boards.as_ref(),
            agents.as_ref(),
            PUZZLE_MAX_DEPTH,
            PUZZLE_LEVEL,
        );
        self.state.install(prepared.into_setup());
        self.state.puzzle_start(puzzle);
        self.events.push_back(GameEvent::SnapshotChanged);
        self.events.push_back(GameEvent::PuzzleStatus {
            status: PuzzleStatus::Active,
        });
    }

    /// Picks a random puzzle from the catalog and starts it.
    #[instrument(skip(self))]
    pub fn start_random_puzzle(&mut self) {
        let Some(puzzle) = self.catalog.choose(&mut rand::thread_rng()).cloned() else {
            debug!("Puzzle catalog is empty");
            return;
        };
        self.start_puzzle(puzzle);
    }

    /// Restarts the current puzzle from scratch.
    ///
    /// A retry runs with the match's configured depth and difficulty rather
    /// than the fresh-selection ceiling.
    #[instrument(skip(self))]
    pub fn retry_puzzle(&mut self) {
        let Some(puzzle) = self.state.puzzle().current().clone() else {
            debug!("No puzzle to retry");
            return;
        };
        let (Some(boards), Some(agents)) = (&self.boards, &self.agents) else {
            return;
        };
        let settings = *self.state.settings();
        let prepared = prepare_puzzle(
            &puzzle,
            boards.as_ref(),
            agents.as_ref(),
            *settings.max_depth(),
            *settings.difficulty(),
        );
        self.state.install(prepared.into_setup());
        self.state.puzzle_reset();
        self.events.push_back(GameEvent::SnapshotChanged);
        self.events.push_back(GameEvent::PuzzleStatus {
            status: PuzzleStatus::Active,
        });
    }

    // ── Scheduling ───────────────────────────────────────────────

    fn schedule(&mut self, task: FollowUp) {
        self.queue.push_back(Scheduled {
            epoch: self.state.session_epoch(),
            task,
        });
    }

    /// Runs the next pending follow-up.
    ///
    /// Returns `false` when nothing was pending. Entries scheduled under a
    /// replaced match target a dead board and are dropped.
    pub fn step(&mut self) -> bool {
        let Some(entry) = self.queue.pop_front() else {
            return false;
        };
        if entry.epoch != self.state.session_epoch() {
            debug!(
                scheduled = entry.epoch,
                current = self.state.session_epoch(),
                "Dropping stale follow-up"
            );
            return true;
        }
        match entry.task {
            FollowUp::ResolveTurn => self.resolve_turn(),
            FollowUp::AiMove { forced } => self.run_ai_move(forced),
        }
        true
    }

    /// Drains scheduled follow-ups until quiescent.
    ///
    /// In unattended play this runs the match to completion.
    pub fn pump(&mut self) {
        while self.step() {}
    }
}
