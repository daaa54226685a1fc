//! Shared fixtures: a scripted rules engine and scripted agents.
//!
//! The fakes share interior state with the test through `Rc<RefCell<..>>`
//! handles, so a test can flip terminal flags or inspect applied moves
//! after the orchestrator has taken ownership of the board.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use rastros::{
    AgentFactory, AgentSpec, BoardEngine, BoardFactory, Coord, MemoryHistoryStore, Orchestrator,
    RawPositions, SearchAgent, WinHistoryLedger,
};

/// Scripted board state, shared between the test and the installed handle.
#[derive(Debug, Clone)]
pub struct BoardScript {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<i32>,
    pub marker: (i32, i32),
    pub valid: Vec<(i32, i32)>,
    /// Surface valid moves as pre-paired values instead of a flat list.
    pub paired_moves: bool,
    pub side: i32,
    pub terminal: bool,
    pub winner_code: i32,
    /// Flip `terminal` once this many moves have been applied.
    pub terminal_after: Option<usize>,
    pub moves: Vec<Coord>,
    pub switches: u32,
    pub boards_created: u32,
}

impl Default for BoardScript {
    fn default() -> Self {
        Self {
            rows: 7,
            cols: 7,
            cells: vec![1; 49],
            marker: (0, 0),
            valid: vec![(0, 0), (0, 1), (3, 3)],
            paired_moves: false,
            side: 1,
            terminal: false,
            winner_code: 0,
            terminal_after: None,
            moves: Vec::new(),
            switches: 0,
            boards_created: 0,
        }
    }
}

/// A fresh shared board script.
pub fn board_script() -> Rc<RefCell<BoardScript>> {
    Rc::new(RefCell::new(BoardScript::default()))
}

/// Board handle over a shared script.
pub struct FakeBoard {
    script: Rc<RefCell<BoardScript>>,
}

impl BoardEngine for FakeBoard {
    fn reset_board(&mut self, rows: usize, cols: usize, _auto_block_center: bool) {
        let mut s = self.script.borrow_mut();
        s.rows = rows;
        s.cols = cols;
        s.cells = vec![1; rows * cols];
    }

    fn block_cell(&mut self, row: usize, col: usize) {
        let mut s = self.script.borrow_mut();
        let cols = s.cols;
        s.cells[row * cols + col] = 0;
    }

    fn set_marker(&mut self, row: usize, col: usize, also_block: bool) {
        let mut s = self.script.borrow_mut();
        s.marker = (row as i32, col as i32);
        if also_block {
            let cols = s.cols;
            s.cells[row * cols + col] = 0;
        }
    }

    fn set_current_side(&mut self, side: rastros::Side) {
        self.script.borrow_mut().side = side.engine_int();
    }

    fn make_move(&mut self, target: Coord) {
        let mut s = self.script.borrow_mut();
        s.marker = (target.row as i32, target.col as i32);
        s.moves.push(target);
        if let Some(limit) = s.terminal_after {
            if s.moves.len() >= limit {
                s.terminal = true;
            }
        }
    }

    fn switch_side(&mut self) {
        let mut s = self.script.borrow_mut();
        s.side = 3 - s.side;
        s.switches += 1;
    }

    fn is_terminal(&self) -> bool {
        self.script.borrow().terminal
    }

    fn winner_code(&self) -> i32 {
        self.script.borrow().winner_code
    }

    fn flat_cells(&self) -> Vec<i32> {
        self.script.borrow().cells.clone()
    }

    fn valid_moves(&self) -> RawPositions {
        let s = self.script.borrow();
        if s.paired_moves {
            RawPositions::Pairs(s.valid.clone())
        } else {
            RawPositions::Flat(s.valid.iter().flat_map(|&(r, c)| [r, c]).collect())
        }
    }

    fn flat_marker(&self) -> Vec<i32> {
        let s = self.script.borrow();
        vec![s.marker.0, s.marker.1]
    }
}

/// Factory handing out handles over one shared script.
pub struct FakeBoardFactory {
    script: Rc<RefCell<BoardScript>>,
}

impl FakeBoardFactory {
    pub fn new(script: Rc<RefCell<BoardScript>>) -> Self {
        Self { script }
    }
}

impl BoardFactory for FakeBoardFactory {
    fn create_board(&self, rows: usize, cols: usize) -> Box<dyn BoardEngine> {
        {
            let mut s = self.script.borrow_mut();
            s.rows = rows;
            s.cols = cols;
            s.cells = vec![1; rows * cols];
            s.marker = (0, 0);
            s.side = 1;
            s.moves.clear();
            s.switches = 0;
            s.terminal = false;
            s.boards_created += 1;
        }
        Box::new(FakeBoard {
            script: Rc::clone(&self.script),
        })
    }
}

/// One recorded agent invocation.
#[derive(Debug, Clone, Copy)]
pub struct AgentCall {
    pub spec: AgentSpec,
    pub depth: u8,
    pub round: u32,
}

/// Scripted agent behavior shared across all created agents.
#[derive(Debug, Default)]
pub struct AgentScript {
    /// Moves handed out in order; `(0, 0)` once exhausted.
    pub queue: VecDeque<Coord>,
    pub calls: Vec<AgentCall>,
}

/// A fresh shared agent script.
pub fn agent_script() -> Rc<RefCell<AgentScript>> {
    Rc::new(RefCell::new(AgentScript::default()))
}

struct FakeAgent {
    script: Rc<RefCell<AgentScript>>,
    spec: AgentSpec,
}

impl SearchAgent for FakeAgent {
    fn choose_move(&mut self, _board: &dyn BoardEngine, depth: u8, round: u32) -> Coord {
        let mut s = self.script.borrow_mut();
        s.calls.push(AgentCall {
            spec: self.spec,
            depth,
            round,
        });
        s.queue.pop_front().unwrap_or_else(|| Coord::new(0, 0))
    }
}

/// Factory recording every spec it was asked to build.
pub struct FakeAgentFactory {
    script: Rc<RefCell<AgentScript>>,
    pub created: Rc<RefCell<Vec<AgentSpec>>>,
}

impl FakeAgentFactory {
    pub fn new(script: Rc<RefCell<AgentScript>>) -> Self {
        Self {
            script,
            created: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl AgentFactory for FakeAgentFactory {
    fn create_agent(&self, spec: AgentSpec) -> Box<dyn SearchAgent> {
        self.created.borrow_mut().push(spec);
        Box::new(FakeAgent {
            script: Rc::clone(&self.script),
            spec,
        })
    }
}

/// Parses a puzzle definition from JSON.
pub fn puzzle(json: &str) -> rastros::PuzzleDef {
    serde_json::from_str(json).expect("puzzle json")
}

/// Fixture bundling an orchestrator with handles into its fakes.
pub struct Fixture {
    pub game: Orchestrator,
    pub board: Rc<RefCell<BoardScript>>,
    pub agents: Rc<RefCell<AgentScript>>,
    pub created_specs: Rc<RefCell<Vec<AgentSpec>>>,
}

/// Builds an orchestrator wired to fakes and an in-memory ledger.
pub fn fixture() -> Fixture {
    fixture_with(Orchestrator::new())
}

/// Wires fakes and an in-memory ledger into the given orchestrator.
pub fn fixture_with(mut game: Orchestrator) -> Fixture {
    let board = board_script();
    let agents = agent_script();
    let agent_factory = FakeAgentFactory::new(Rc::clone(&agents));
    let created_specs = Rc::clone(&agent_factory.created);
    game.attach_engine(
        Box::new(FakeBoardFactory::new(Rc::clone(&board))),
        Box::new(agent_factory),
    );
    game.set_ledger(WinHistoryLedger::new(Box::new(MemoryHistoryStore::new())));
    Fixture {
        game,
        board,
        agents,
        created_specs,
    }
}
