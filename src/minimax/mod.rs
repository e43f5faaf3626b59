//! Iterative-deepening alpha-beta minimax policy for 2048.
//!
//! The game tree alternates two plies:
//! - a maximizing ply where the player picks one of the legal moves, and
//! - a minimizing ply where an adversary places a 2 or a 4 on the worst empty cell.
//!
//! Leaves at the depth horizon are scored with [`heuristic`]; nodes without a
//! continuation are scored with [`terminal_value`]. [`AlphaBeta`] repeats the
//! search at increasing depth until its time budget or depth cap is reached and
//! returns the move of the last completed depth.
//!
//! Notes
//! - Time is read through a [`Clock`]. [`SystemClock`] is the default; tests
//!   and benches can inject their own.
//! - The adversary is worst-case, not probabilistic: spawn odds are ignored.
//!
//! Quick start
//! ```
//! use minimax_2048::config::SearchConfig;
//! use minimax_2048::engine::Board;
//! use minimax_2048::minimax::AlphaBeta;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(123);
//! let b0 = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
//!
//! let mut ab = AlphaBeta::with_config(SearchConfig { max_depth: Some(2), ..Default::default() });
//! let mv = ab.best_move(b0);
//! assert!(mv.is_some());
//! assert!(ab.last_stats().depth >= 1);
//! ```

use std::time::{Duration, Instant};

use crate::engine::{self, Board, Move};

mod heuristic;
mod search;

pub use heuristic::heuristic;
pub use search::AlphaBeta;

pub use crate::config::SearchConfig;

/// Score of a board that contains the winning tile and admits no continuation.
pub const WIN_SCORE: f64 = f64::INFINITY;

/// Score of a dead board without the winning tile.
pub const LOSS_SCORE: f64 = f64::NEG_INFINITY;

/// Source of monotonic time for deadline checks.
///
/// Only differences between readings matter.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall-clock time since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self { Self { origin: Instant::now() } }
}

impl Default for SystemClock { fn default() -> Self { Self::new() } }

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Duration { self.origin.elapsed() }
}

/// Outcome of a maximizing ply.
///
/// `best_move` is `None` at the depth horizon and at dead boards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    pub score: f64,
    pub best_move: Option<Move>,
}

/// Basic search stats for a single `best_move` call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchStats {
    /// Nodes visited across all iterations.
    pub nodes: u64,
    /// Deepest fully searched depth.
    pub depth: u32,
    /// Time spent, as measured by the engine's clock.
    pub elapsed: Duration,
    /// Largest `nodes` seen since the last reset.
    pub peak_nodes: u64,
}

/// Value of a board with no continuation at the current ply.
///
/// ```
/// use minimax_2048::engine::Board;
/// use minimax_2048::minimax::{terminal_value, WIN_SCORE, LOSS_SCORE};
/// let won = Board::from_rows([[2048, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4]]).unwrap();
/// let lost = Board::from_rows([[1024, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4]]).unwrap();
/// assert_eq!(terminal_value(won), WIN_SCORE);
/// assert_eq!(terminal_value(lost), LOSS_SCORE);
/// ```
#[inline]
pub fn terminal_value(board: Board) -> f64 {
    if board.has_tile(engine::WIN_VALUE) { WIN_SCORE } else { LOSS_SCORE }
}
