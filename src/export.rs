//! Move-log CSV export.

use crate::convert::to_notation;
use crate::game::{Mode, RoundEntry, Side};

/// Renders a move log as CSV, one row per round, in board notation.
///
/// Unfilled slots (an in-progress round) render as empty cells.
pub fn log_to_csv(log: &[RoundEntry], board_rows: usize) -> String {
    let mut out = String::from("Round,Side0,Side1\n");
    for (index, round) in log.iter().enumerate() {
        let p1 = round
            .side(Side::P1)
            .map(|target| to_notation(target, board_rows))
            .unwrap_or_default();
        let p2 = round
            .side(Side::P2)
            .map(|target| to_notation(target, board_rows))
            .unwrap_or_default();
        out.push_str(&format!("{},{},{}\n", index + 1, p1, p2));
    }
    out
}

/// Suggested file name for a downloaded log.
pub fn export_file_name(mode: Mode, rows: usize, cols: usize, difficulty: u8) -> String {
    format!("{mode}_{rows}x{cols}_d-{difficulty}.csv")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Coord;

    #[test]
    fn csv_rows_follow_the_log() {
        let mut first = RoundEntry::opened_by(Coord::new(0, 0));
        first.fill_reply(Coord::new(1, 1));
        let second = RoundEntry::opened_by(Coord::new(2, 3));
        let csv = log_to_csv(&[first, second], 7);
        assert_eq!(csv, "Round,Side0,Side1\n1,a7,b6\n2,d5,\n");
    }

    #[test]
    fn empty_log_is_just_the_header() {
        assert_eq!(log_to_csv(&[], 7), "Round,Side0,Side1\n");
    }

    #[test]
    fn file_name_carries_the_match_shape() {
        assert_eq!(
            export_file_name(Mode::HumanFirst, 7, 7, 5),
            "human_first_7x7_d-5.csv"
        );
    }
}
