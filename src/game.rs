//! Turn loop that drives a board with an [`AlphaBeta`] policy.
//!
//! ```
//! use minimax_2048::config::SearchConfig;
//! use minimax_2048::game::{Game, Limits};
//! use minimax_2048::minimax::AlphaBeta;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut policy = AlphaBeta::with_config(SearchConfig { max_depth: Some(1), ..Default::default() });
//! let mut game = Game::new(StdRng::seed_from_u64(7));
//! let summary = game.play(&mut policy, &Limits { steps: Some(5), ..Default::default() });
//! assert_eq!(summary.moves, 5);
//! ```

use std::time::Instant;

use rand::Rng;
use serde::Serialize;

use crate::engine::{Board, Move, WIN_VALUE};
use crate::minimax::{AlphaBeta, Clock};

/// Optional early-stop conditions for [`Game::play`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Limits {
    /// Stop after this many moves.
    pub steps: Option<u64>,
    /// Stop once the board score reaches this value.
    pub stop_score: Option<u64>,
    /// Stop once a tile of at least this value appears.
    pub stop_tile: Option<u32>,
}

/// Result of a finished (or stopped) game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSummary {
    pub moves: u64,
    pub score: u64,
    pub highest_tile: u32,
    pub won: bool,
    pub game_over: bool,
    pub total_nodes: u64,
    pub peak_nodes: u64,
    pub elapsed_s: f64,
    pub final_board: u64,
}

pub struct Game<R: Rng> {
    board: Board,
    rng: R,
    moves: u64,
    total_nodes: u64,
    peak_nodes: u64,
}

impl<R: Rng> Game<R> {
    /// Start a game with two random tiles.
    pub fn new(mut rng: R) -> Self {
        let board = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
        Self::from_board(board, rng)
    }

    /// Resume play from an existing board.
    pub fn from_board(board: Board, rng: R) -> Self {
        Self { board, rng, moves: 0, total_nodes: 0, peak_nodes: 0 }
    }

    #[inline]
    pub fn board(&self) -> Board { self.board }

    #[inline]
    pub fn moves(&self) -> u64 { self.moves }

    #[inline]
    pub fn is_over(&self) -> bool { self.board.is_game_over() }

    /// Ask `policy` for a move and play it, spawning a random tile.
    ///
    /// Returns `None` once the board has no legal move.
    pub fn step<C: Clock>(&mut self, policy: &mut AlphaBeta<C>) -> Option<Move> {
        let dir = policy.get_next_move(self.board)?;
        let stats = policy.last_stats();
        self.total_nodes = self.total_nodes.saturating_add(stats.nodes);
        self.peak_nodes = self.peak_nodes.max(stats.nodes);
        self.board = self.board.make_move(dir, &mut self.rng);
        self.moves += 1;
        tracing::debug!(
            turn = self.moves,
            %dir,
            depth = stats.depth,
            nodes = stats.nodes,
            score = self.board.score(),
            "move played"
        );
        Some(dir)
    }

    /// Play until the game ends or a limit is hit.
    pub fn play<C: Clock>(&mut self, policy: &mut AlphaBeta<C>, limits: &Limits) -> GameSummary {
        let start = Instant::now();
        while self.step(policy).is_some() {
            if limits.steps.is_some_and(|limit| self.moves >= limit) {
                break;
            }
            if limits.stop_tile.is_some_and(|tile| self.board.highest_tile() >= tile) {
                break;
            }
            if limits.stop_score.is_some_and(|target| self.board.score() >= target) {
                break;
            }
        }
        let summary = self.summary(start.elapsed().as_secs_f64());
        tracing::info!(
            moves = summary.moves,
            score = summary.score,
            highest_tile = summary.highest_tile,
            won = summary.won,
            "game finished"
        );
        summary
    }

    fn summary(&self, elapsed_s: f64) -> GameSummary {
        let highest_tile = self.board.highest_tile();
        GameSummary {
            moves: self.moves,
            score: self.board.score(),
            highest_tile,
            won: highest_tile >= WIN_VALUE,
            game_over: self.is_over(),
            total_nodes: self.total_nodes,
            peak_nodes: self.peak_nodes,
            elapsed_s,
            final_board: self.board.raw(),
        }
    }
}
