use crate::config::SearchConfig;
use crate::engine::{Board, Move, SPAWN_VALUES};

use super::heuristic::{heuristic, warm as warm_heuristic};
use super::{terminal_value, Clock, SearchResult, SearchStats, SystemClock};

/// Single-threaded iterative-deepening alpha-beta search.
///
/// The engine owns its configuration and clock; nothing is carried over from
/// one `best_move` call to the next apart from [`SearchStats::peak_nodes`].
pub struct AlphaBeta<C: Clock = SystemClock> {
    cfg: SearchConfig,
    clock: C,
    stats: SearchStats,
}

impl AlphaBeta {
    pub fn new() -> Self { Self::with_config(SearchConfig::default()) }

    pub fn with_config(cfg: SearchConfig) -> Self { Self::with_clock(cfg, SystemClock::new()) }
}

impl Default for AlphaBeta { fn default() -> Self { Self::new() } }

impl<C: Clock> AlphaBeta<C> {
    /// Build an engine that reads time from `clock`.
    pub fn with_clock(cfg: SearchConfig, clock: C) -> Self {
        warm_heuristic();
        Self { cfg, clock, stats: SearchStats::default() }
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig { &self.cfg }

    /// Back-compat shim.
    ///
    /// Equivalent to [`Self::best_move`].
    #[inline]
    pub fn get_next_move(&mut self, board: Board) -> Option<Move> { self.best_move(board) }

    /// Pick a move for `board`, or `None` when no move is legal.
    ///
    /// Searches depth 1, 2, ... and keeps the move of the latest completed
    /// depth. Depth 1 always runs; the budget and depth cap are checked before
    /// each further depth, never inside one.
    ///
    /// ```
    /// use minimax_2048::config::SearchConfig;
    /// use minimax_2048::engine::{Board, Move};
    /// use minimax_2048::minimax::AlphaBeta;
    /// let b = Board::from_rows([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
    /// let mut ab = AlphaBeta::with_config(SearchConfig { time_budget_ms: 0, ..Default::default() });
    /// assert_eq!(ab.best_move(b), Some(Move::Down));
    /// assert_eq!(ab.last_stats().depth, 1);
    /// ```
    pub fn best_move(&mut self, board: Board) -> Option<Move> {
        let start = self.clock.now();
        let budget = self.cfg.time_budget();
        let max_depth = self.cfg.max_depth.unwrap_or(u32::MAX).max(1);
        let mut best = None;
        let mut nodes = 0u64;
        let mut completed = 0;
        let mut depth = 1;
        loop {
            let result = self.maximize(f64::NEG_INFINITY, f64::INFINITY, board, depth, &mut nodes);
            let Some(dir) = result.best_move else {
                tracing::trace!("root has no legal moves");
                break;
            };
            best = Some(dir);
            completed = depth;
            let elapsed = self.clock.now().saturating_sub(start);
            tracing::trace!(depth, score = result.score, best = %dir, nodes, ?elapsed, "depth complete");
            if depth >= max_depth || elapsed >= budget || result.score.is_infinite() {
                break;
            }
            depth += 1;
        }
        self.record(nodes, completed, self.clock.now().saturating_sub(start));
        tracing::debug!(depth = completed, nodes, best = ?best, "search finished");
        best
    }

    /// Run a single alpha-beta search at exactly `depth` plies.
    pub fn search_depth(&mut self, board: Board, depth: u32) -> SearchResult {
        let start = self.clock.now();
        let mut nodes = 0u64;
        let result = self.maximize(f64::NEG_INFINITY, f64::INFINITY, board, depth, &mut nodes);
        self.record(nodes, depth, self.clock.now().saturating_sub(start));
        result
    }

    /// Statistics collected from the last call to [`Self::best_move`] or
    /// [`Self::search_depth`].
    #[inline]
    pub fn last_stats(&self) -> SearchStats { self.stats }

    /// Reset accumulated stats to zero.
    #[inline]
    pub fn reset_stats(&mut self) { self.stats = SearchStats::default(); }

    fn record(&mut self, nodes: u64, depth: u32, elapsed: std::time::Duration) {
        let peak_nodes = self.stats.peak_nodes.max(nodes);
        self.stats = SearchStats { nodes, depth, elapsed, peak_nodes };
    }

    fn maximize(&self, mut alpha: f64, beta: f64, board: Board, depth: u32, nodes: &mut u64) -> SearchResult {
        *nodes += 1;
        if depth == 0 {
            return SearchResult { score: heuristic(board), best_move: None };
        }
        let mut best = SearchResult { score: f64::NEG_INFINITY, best_move: None };
        for dir in board.available_moves() {
            let value = self.minimize(alpha, beta, board.shift(dir), depth - 1, nodes);
            // Ties keep the earlier move.
            if best.best_move.is_none() || value > best.score {
                best = SearchResult { score: value, best_move: Some(dir) };
            }
            alpha = alpha.max(value);
            if self.cfg.pruning && alpha >= beta {
                break;
            }
        }
        if best.best_move.is_none() {
            return SearchResult { score: terminal_value(board), best_move: None };
        }
        best
    }

    fn minimize(&self, alpha: f64, mut beta: f64, board: Board, depth: u32, nodes: &mut u64) -> f64 {
        *nodes += 1;
        if depth == 0 {
            return heuristic(board);
        }
        if board.count_empty() == 0 {
            return terminal_value(board);
        }
        let mut value = f64::INFINITY;
        for cell in board.available_cells() {
            for tile in SPAWN_VALUES {
                let reply = self.maximize(alpha, beta, board.with_tile(cell, tile), depth - 1, nodes).score;
                value = value.min(reply);
                beta = beta.min(value);
                if self.cfg.pruning && alpha >= beta {
                    return value;
                }
            }
        }
        value
    }
}
