//! Session-state transition tests.

mod common;

use std::rc::Rc;

use common::{FakeBoardFactory, board_script, puzzle};
use rastros::{
    BoardFactory, BoardSnapshot, Coord, MatchSettings, MatchSetup, MatchState, Mode, Phase,
    PuzzleStatus, RoundEntry, Side, Winner,
};

fn fresh_setup() -> MatchSetup {
    let factory = FakeBoardFactory::new(board_script());
    let board = factory.create_board(7, 7);
    MatchSetup::new(board, BoardSnapshot::default(), 7, 7)
}

fn started_state() -> MatchState {
    let mut state = MatchState::default();
    state.install(fresh_setup());
    state
}

#[test]
fn install_starts_play_and_bumps_epoch() {
    let mut state = MatchState::default();
    let before = state.session_epoch();

    state.install(fresh_setup());

    assert!(state.phase().in_progress());
    assert_eq!(state.phase().current_side(), Some(Side::P1));
    assert_eq!(state.session_epoch(), before + 1);
    assert!(state.move_log().is_empty());
    assert_eq!(state.round(), 0);
    assert!(!state.skip_stats());
}

#[test]
fn install_honors_puzzle_overrides() {
    let mut state = MatchState::default();
    let log = vec![RoundEntry::opened_by(Coord::new(5, 1))];
    let setup = fresh_setup()
        .with_mode(Mode::AiFirst)
        .with_side(Side::P2)
        .with_history(log, 2);

    state.install(setup);

    assert_eq!(state.mode(), Mode::AiFirst);
    assert_eq!(state.phase().current_side(), Some(Side::P2));
    assert_eq!(state.round(), 2);
    assert_eq!(state.move_log().len(), 1);
}

#[test]
fn install_idle_leaves_the_match_unstarted() {
    let mut state = MatchState::default();
    state.install_idle(fresh_setup());

    assert_eq!(state.phase(), Phase::Idle);
    assert!(state.board().is_some());
    assert_eq!(state.session_epoch(), 1);
}

#[test]
fn apply_move_pairs_rounds() {
    let mut state = started_state();

    state.apply_move(Coord::new(0, 0));
    assert_eq!(state.move_log().len(), 1);
    assert_eq!(state.move_log()[0].side(Side::P1), Some(Coord::new(0, 0)));
    assert_eq!(state.move_log()[0].side(Side::P2), None);

    state.end_turn();
    state.switch_side();
    state.apply_move(Coord::new(1, 1));
    assert_eq!(state.move_log().len(), 1);
    assert_eq!(state.move_log()[0].side(Side::P2), Some(Coord::new(1, 1)));

    state.end_turn();
    state.switch_side();
    state.apply_move(Coord::new(2, 2));
    assert_eq!(state.move_log().len(), 2);
    assert!(!state.move_log()[1].complete());
}

#[test]
fn apply_move_without_a_match_is_a_noop() {
    let mut state = MatchState::default();
    state.apply_move(Coord::new(0, 0));
    assert!(state.move_log().is_empty());
}

#[test]
fn reply_with_an_empty_log_is_a_noop() {
    let mut state = MatchState::default();
    let setup = fresh_setup().with_side(Side::P2);
    state.install(setup);

    state.apply_move(Coord::new(1, 1));
    assert!(state.move_log().is_empty());
}

#[test]
fn end_turn_then_switch_flips_the_side() {
    let mut state = started_state();

    state.end_turn();
    assert!(state.phase().in_progress());
    assert_eq!(state.phase().current_side(), Some(Side::P1));

    state.switch_side();
    assert_eq!(state.phase(), Phase::Playing { side: Side::P2 });

    // Switching again without an ended turn changes nothing.
    state.switch_side();
    assert_eq!(state.phase(), Phase::Playing { side: Side::P2 });
}

#[test]
fn setting_a_winner_ends_the_match() {
    let mut state = started_state();
    let winner = Winner::from_code(2).unwrap();

    state.set_winner(Some(winner));
    assert!(!state.phase().in_progress());
    assert_eq!(state.phase().winner(), Some(winner));

    state.set_winner(None);
    assert_eq!(state.phase(), Phase::Idle);
}

#[test]
fn winner_transitions_need_preconditions() {
    let mut state = MatchState::default();
    state.set_winner(Some(Winner::from_code(1).unwrap()));
    assert_eq!(state.phase(), Phase::Idle);

    state.set_winner(None);
    assert_eq!(state.phase(), Phase::Idle);
}

#[test]
fn round_counter_increments() {
    let mut state = started_state();
    state.increment_round();
    state.increment_round();
    assert_eq!(state.round(), 2);
}

#[test]
fn installs_reset_the_stats_exclusion() {
    let mut state = started_state();
    state.mark_skip_stats();
    assert!(state.skip_stats());

    state.install(fresh_setup());
    assert!(!state.skip_stats());
}

#[test]
fn settings_are_frozen_while_playing() {
    let mut state = started_state();
    let tweaked = MatchSettings::default().with_difficulty(9);

    state.set_settings(tweaked);
    assert_eq!(*state.settings().difficulty(), 5);

    state.set_winner(Some(Winner::from_code(1).unwrap()));
    state.set_settings(tweaked);
    assert_eq!(*state.settings().difficulty(), 9);
}

#[test]
fn puzzle_transitions_follow_the_lifecycle() {
    let mut state = MatchState::default();
    let def = puzzle(r#"{"rows":7,"cols":7,"marker":[4,2],"blocked":[[6,0],[5,1]]}"#);

    state.puzzle_start(def.clone());
    assert_eq!(*state.puzzle().status(), PuzzleStatus::Active);
    assert_eq!(state.puzzle().current().as_ref(), Some(&def));

    state.puzzle_record_move();
    assert_eq!(*state.puzzle().moves_made(), 1);

    state.puzzle_set_status(PuzzleStatus::Success);
    assert_eq!(*state.puzzle().status(), PuzzleStatus::Success);

    state.puzzle_reset();
    assert_eq!(*state.puzzle().status(), PuzzleStatus::Active);
    assert_eq!(*state.puzzle().moves_made(), 0);

    state.puzzle_clear();
    assert_eq!(*state.puzzle().status(), PuzzleStatus::Idle);
    assert!(state.puzzle().current().is_none());
}

#[test]
fn puzzle_moves_only_count_while_active() {
    let mut state = MatchState::default();
    state.puzzle_record_move();
    assert_eq!(*state.puzzle().moves_made(), 0);

    state.puzzle_set_status(PuzzleStatus::Failed);
    assert_eq!(*state.puzzle().status(), PuzzleStatus::Idle);
}

#[test]
fn refresh_snapshot_rereads_the_board() {
    let script = board_script();
    let factory = FakeBoardFactory::new(Rc::clone(&script));
    let board = factory.create_board(7, 7);
    let mut state = MatchState::default();
    state.install(MatchSetup::new(board, BoardSnapshot::default(), 7, 7));

    script.borrow_mut().cells[0] = 0;
    script.borrow_mut().marker = (4, 2);
    state.refresh_snapshot();

    assert_eq!(state.snapshot().grid()[0][0], 0);
    assert_eq!(state.snapshot().blocked_count(), 1);
    assert_eq!(*state.snapshot().marker(), Coord::new(4, 2));
    assert!(state.snapshot().allows(Coord::new(0, 1)));
    assert!(!state.snapshot().allows(Coord::new(6, 6)));
}

#[test]
fn ai_to_act_follows_mode_and_side() {
    let mut state = MatchState::new(MatchSettings::default().with_mode(Mode::HumanFirst));
    state.install(fresh_setup());
    assert!(!state.ai_to_act());

    state.end_turn();
    state.switch_side();
    assert!(state.ai_to_act());

    let mut ai_first = MatchState::new(MatchSettings::default().with_mode(Mode::AiFirst));
    ai_first.install(fresh_setup());
    assert!(ai_first.ai_to_act());

    let mut watch = MatchState::new(MatchSettings::default().with_mode(Mode::AiVsAi));
    watch.install(fresh_setup());
    assert!(watch.ai_to_act());

    let mut humans = MatchState::new(MatchSettings::default().with_mode(Mode::HumanVsHuman));
    humans.install(fresh_setup());
    assert!(!humans.ai_to_act());
}
