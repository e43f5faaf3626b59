use std::sync::OnceLock;

use crate::engine::{self, Board, SIZE};

const LINE_TABLE_SIZE: usize = 0x1_0000;

const MONOTONIC_REWARD: f64 = 900.0;
const BROKEN_MONOTONIC_PENALTY: f64 = 100_000.0;
const GRADIENT_WEIGHT: f64 = 1000.0;
const SMOOTHNESS_WEIGHT: f64 = 500.0;
const EMPTY_REWARD: f64 = 30_000.0;
const SMALL_TILE_PENALTY: f64 = 8000.0;
const LARGE_TILE_WEIGHT: f64 = 10_000.0;
const MID_TILE_WEIGHT: f64 = 100.0;

/// Per-line scores. Rows carry the shape terms plus the per-tile terms,
/// columns only the shape terms, so every tile is counted once.
struct LineTables {
    row: Box<[f64]>,
    col: Box<[f64]>,
}

static LINE_TABLES: OnceLock<LineTables> = OnceLock::new();

fn line_tables() -> &'static LineTables {
    LINE_TABLES.get_or_init(|| {
        let mut row = vec![0.0f64; LINE_TABLE_SIZE];
        let mut col = vec![0.0f64; LINE_TABLE_SIZE];
        for (idx, line) in (0..=u16::MAX).enumerate() {
            let values = line_values(line);
            let shape = calc_monotonicity(&values) - calc_gradient(&values) - calc_roughness(&values);
            row[idx] = shape + calc_tiles(&values);
            col[idx] = shape;
        }
        LineTables { row: row.into_boxed_slice(), col: col.into_boxed_slice() }
    })
}

pub(crate) fn warm() {
    let _ = line_tables();
}

/// Static desirability of a board, higher is better.
///
/// Pure and deterministic. Every value is finite, so the search's win/loss
/// sentinels always dominate it.
///
/// ```
/// use minimax_2048::engine::Board;
/// use minimax_2048::minimax::heuristic;
/// let sorted = Board::from_rows([[2, 4, 8, 16], [0; 4], [0; 4], [0; 4]]).unwrap();
/// let jumbled = Board::from_rows([[4, 2, 8, 16], [0; 4], [0; 4], [0; 4]]).unwrap();
/// assert!(heuristic(sorted) > heuristic(jumbled));
/// ```
#[inline]
pub fn heuristic(board: Board) -> f64 {
    let tables = line_tables();
    let transposed = engine::transpose(board.raw());
    (0..SIZE).fold(0., |score, idx| {
        let row = engine::extract_line(board.raw(), idx);
        let col = engine::extract_line(transposed, idx);
        score + tables.row[usize::from(row)] + tables.col[usize::from(col)]
    })
}

fn line_values(line: u16) -> [u32; SIZE] {
    engine::unpack_line(line).map(|exp| if exp == 0 { 0 } else { 1 << exp })
}

/// Rewards every interior triple that is ordered either way, punishes peaks and valleys.
fn calc_monotonicity(line: &[u32; SIZE]) -> f64 {
    line.windows(3).fold(0., |acc, w| {
        let ordered = (w[0] <= w[1] && w[1] <= w[2]) || (w[0] >= w[1] && w[1] >= w[2]);
        if ordered { acc + MONOTONIC_REWARD } else { acc - BROKEN_MONOTONIC_PENALTY }
    })
}

fn calc_gradient(line: &[u32; SIZE]) -> f64 {
    occupied_pairs(line).map(|(a, b)| f64::from(a.abs_diff(b))).sum::<f64>() * GRADIENT_WEIGHT
}

// Exponent distance between neighbours; adjacent tiles close in rank are easy to merge.
fn calc_roughness(line: &[u32; SIZE]) -> f64 {
    occupied_pairs(line)
        .map(|(a, b)| f64::from(a.trailing_zeros().abs_diff(b.trailing_zeros())))
        .sum::<f64>()
        * SMOOTHNESS_WEIGHT
}

fn calc_tiles(line: &[u32; SIZE]) -> f64 {
    line.iter().fold(0., |acc, &value| match value {
        0 => acc + EMPTY_REWARD,
        2 | 4 => acc - SMALL_TILE_PENALTY,
        v if v >= 128 => acc + f64::from(v) * LARGE_TILE_WEIGHT,
        v if v >= 32 => acc + f64::from(v) * MID_TILE_WEIGHT,
        _ => acc,
    })
}

fn occupied_pairs(line: &[u32; SIZE]) -> impl Iterator<Item = (u32, u32)> + '_ {
    line.windows(2).filter(|w| w[0] != 0 && w[1] != 0).map(|w| (w[0], w[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: [[u32; 4]; 4]) -> Board { Board::from_rows(rows).unwrap() }

    #[test]
    fn empty_board_value() {
        // 8 ordered lines x 2 triples, plus 16 empty cells.
        assert_eq!(heuristic(Board::EMPTY), 16.0 * MONOTONIC_REWARD + 16.0 * EMPTY_REWARD);
    }

    #[test]
    fn is_deterministic() {
        let b = board([[2, 4, 8, 16], [32, 0, 4, 2], [128, 2, 0, 0], [0, 0, 2, 1024]]);
        let first = heuristic(b);
        for _ in 0..10 {
            assert_eq!(heuristic(b), first);
        }
        assert!(first.is_finite());
    }

    #[test]
    fn monotonic_row_scores_at_least_as_high() {
        let sorted = board([[2, 4, 8, 16], [0; 4], [0; 4], [0; 4]]);
        let jumbled = board([[4, 2, 8, 16], [0; 4], [0; 4], [0; 4]]);
        assert_eq!(heuristic(sorted), 342_900.0);
        assert_eq!(heuristic(jumbled), 239_500.0);
        assert!(heuristic(sorted) >= heuristic(jumbled));
    }

    #[test]
    fn rewards_open_space() {
        let crowded = board([[2, 4, 2, 4], [0; 4], [0; 4], [0; 4]]);
        let merged = board([[4, 8, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert!(heuristic(merged) > heuristic(crowded));
    }

    #[test]
    fn rewards_large_tiles() {
        let small = board([[64, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let large = board([[128, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert!(heuristic(large) > heuristic(small));
    }

    #[test]
    fn symmetric_under_reflection() {
        let b = board([[2, 4, 0, 8], [0, 16, 2, 0], [32, 0, 0, 4], [2, 2, 8, 0]]);
        let mirrored = board([[8, 0, 4, 2], [0, 2, 16, 0], [4, 0, 0, 32], [0, 8, 2, 2]]);
        let transposed = Board::from_raw(engine::transpose(b.raw()));
        assert_eq!(heuristic(b), heuristic(mirrored));
        assert_eq!(heuristic(b), heuristic(transposed));
    }

    #[test]
    fn line_terms() {
        assert_eq!(calc_monotonicity(&[2, 4, 8, 16]), 2.0 * MONOTONIC_REWARD);
        assert_eq!(calc_monotonicity(&[4, 2, 8, 16]), MONOTONIC_REWARD - BROKEN_MONOTONIC_PENALTY);
        assert_eq!(calc_gradient(&[2, 0, 8, 16]), 8.0 * GRADIENT_WEIGHT);
        assert_eq!(calc_roughness(&[2, 8, 0, 16]), 2.0 * SMOOTHNESS_WEIGHT);
        assert_eq!(calc_tiles(&[0, 2, 32, 128]), EMPTY_REWARD - SMALL_TILE_PENALTY + 3200.0 + 1_280_000.0);
    }
}
