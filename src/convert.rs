//! Normalization of engine position payloads and board notation.
//!
//! The engine binding surfaces board state as flat numeric lists in a couple
//! of shapes. Everything here is pure: malformed payloads normalize to empty
//! results instead of errors, so callers can treat "nothing yet" and
//! "unrecognized" the same way.

use crate::engine::RawPositions;
use crate::game::Coord;

/// Partitions a flat row-major cell list into `rows` rows of `cols` cells.
///
/// Order is preserved; a short input simply yields short (or empty) trailing
/// rows.
pub fn to_grid(flat: &[i32], rows: usize, cols: usize) -> Vec<Vec<i32>> {
    (0..rows)
        .map(|r| flat.iter().skip(r * cols).take(cols).copied().collect())
        .collect()
}

/// Normalizes a raw position payload to `(row, col)` coordinates.
///
/// Fails closed: an odd-length flat list or any negative coordinate yields
/// an empty list.
pub fn to_positions(raw: &RawPositions) -> Vec<Coord> {
    let pairs: Option<Vec<Coord>> = match raw {
        RawPositions::Flat(values) => {
            if values.len() % 2 != 0 {
                return Vec::new();
            }
            values
                .chunks_exact(2)
                .map(|pair| coord_from(pair[0], pair[1]))
                .collect()
        }
        RawPositions::Pairs(values) => values
            .iter()
            .map(|&(row, col)| coord_from(row, col))
            .collect(),
    };
    pairs.unwrap_or_default()
}

/// Reads the marker position from a flat `[row, col]` list, falling back to
/// the origin when the payload is unusable.
pub fn marker_from_flat(flat: &[i32]) -> Coord {
    match flat {
        [row, col, ..] => coord_from(*row, *col).unwrap_or_else(|| Coord::new(0, 0)),
        _ => Coord::new(0, 0),
    }
}

fn coord_from(row: i32, col: i32) -> Option<Coord> {
    if row >= 0 && col >= 0 {
        Some(Coord::new(row as usize, col as usize))
    } else {
        None
    }
}

/// Renders a coordinate as `<column letter><row number>`.
///
/// The row axis is inverted (`boardRows - row`) so the engine's top row
/// prints the highest number, matching the board's bottom-up labels.
pub fn to_notation(target: Coord, board_rows: usize) -> String {
    let col_letter = (b'a' + target.col as u8) as char;
    format!("{}{}", col_letter, board_rows - target.row)
}

/// Parses notation produced by [`to_notation`] back into a coordinate.
pub fn parse_notation(text: &str, board_rows: usize) -> Option<Coord> {
    let mut chars = text.chars();
    let col_letter = chars.next()?;
    if !col_letter.is_ascii_lowercase() {
        return None;
    }
    let col = (col_letter as u8 - b'a') as usize;
    let row_number: usize = chars.as_str().parse().ok()?;
    if row_number == 0 || row_number > board_rows {
        return None;
    }
    Some(Coord::new(board_rows - row_number, col))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_grid_partitions_row_major() {
        for rows in 5..=11 {
            for cols in 5..=11 {
                let flat: Vec<i32> = (0..(rows * cols) as i32).collect();
                let grid = to_grid(&flat, rows, cols);
                assert_eq!(grid.len(), rows);
                for (r, row) in grid.iter().enumerate() {
                    assert_eq!(row.len(), cols);
                    assert_eq!(row[0], (r * cols) as i32);
                    assert_eq!(row[cols - 1], (r * cols + cols - 1) as i32);
                }
            }
        }
    }

    #[test]
    fn to_grid_tolerates_short_input() {
        let grid = to_grid(&[1, 2, 3], 2, 2);
        assert_eq!(grid, vec![vec![1, 2], vec![3]]);
    }

    #[test]
    fn to_positions_accepts_both_shapes() {
        let flat = RawPositions::Flat(vec![0, 1, 2, 3]);
        let pairs = RawPositions::Pairs(vec![(0, 1), (2, 3)]);
        let expected = vec![Coord::new(0, 1), Coord::new(2, 3)];
        assert_eq!(to_positions(&flat), expected);
        assert_eq!(to_positions(&pairs), expected);
    }

    #[test]
    fn to_positions_fails_closed() {
        assert!(to_positions(&RawPositions::Flat(vec![0, 1, 2])).is_empty());
        assert!(to_positions(&RawPositions::Flat(vec![0, -1])).is_empty());
        assert!(to_positions(&RawPositions::Pairs(vec![(1, 1), (-2, 0)])).is_empty());
        assert!(to_positions(&RawPositions::Flat(Vec::new())).is_empty());
    }

    #[test]
    fn marker_falls_back_to_origin() {
        assert_eq!(marker_from_flat(&[4, 2]), Coord::new(4, 2));
        assert_eq!(marker_from_flat(&[4, 2, 9]), Coord::new(4, 2));
        assert_eq!(marker_from_flat(&[7]), Coord::new(0, 0));
        assert_eq!(marker_from_flat(&[-1, 3]), Coord::new(0, 0));
    }

    #[test]
    fn notation_inverts_rows() {
        assert_eq!(to_notation(Coord::new(0, 0), 7), "a7");
        assert_eq!(to_notation(Coord::new(6, 0), 7), "a1");
        assert_eq!(to_notation(Coord::new(4, 2), 7), "c3");
    }

    #[test]
    fn notation_round_trips_all_board_sizes() {
        for rows in 5..=11 {
            for cols in 5..=11 {
                for row in 0..rows {
                    for col in 0..cols {
                        let pos = Coord::new(row, col);
                        let text = to_notation(pos, rows);
                        assert_eq!(parse_notation(&text, rows), Some(pos), "{text}");
                    }
                }
            }
        }
    }

    #[test]
    fn parse_rejects_out_of_range_rows() {
        assert_eq!(parse_notation("a0", 7), None);
        assert_eq!(parse_notation("a8", 7), None);
        assert_eq!(parse_notation("A3", 7), None);
        assert_eq!(parse_notation("", 7), None);
    }
}
