//! minimax-2048: a 2048 game engine + iterative-deepening alpha-beta policy
//!
//! This crate provides:
//! - A compact `Board` type (`engine` module) with the primitives a search needs
//!   (`shift`, `available_moves`, `available_cells`, `with_tile`, ...)
//! - An alpha-beta minimax AI (`minimax` module) with a lookup-table heuristic
//! - Search configuration loaded from code or JSON (`config` module)
//! - A turn loop with summaries for whole games (`game` module)
//!
//! Quick start:
//! ```
//! use minimax_2048::engine::{Board, Move};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Deterministic board initialization with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let b0 = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
//! let b1 = b0.shift(Move::Left);
//! assert!(b1.count_empty() >= 14);
//! ```
//!
//! Full loop (simplest possible)
//! ```
//! use minimax_2048::engine::Board;
//! use minimax_2048::minimax::AlphaBeta;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut policy = AlphaBeta::new();
//! let mut rng = StdRng::seed_from_u64(123);
//! let mut b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
//! let mut moves = 0u32;
//!
//! // Keep doctests fast
//! while !b.is_game_over() && moves < 4 {
//!     match policy.best_move(b) {
//!         Some(dir) => b = b.make_move(dir, &mut rng),
//!         None => break,
//!     }
//!     moves += 1;
//! }
//! assert_eq!(moves, 4);
//! ```
pub mod config;
pub mod engine;
pub mod game;
pub mod minimax;
