use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use minimax_2048::config::SearchConfig;
use minimax_2048::engine::{Board, Move};
use minimax_2048::game::{Game, Limits};
use minimax_2048::minimax::AlphaBeta;
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;

fn corpus() -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(4242);
    let mut boards = Vec::new();
    let mut b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    boards.push(b);
    for dir in Move::ALL.iter().cycle().take(32) {
        let nb = b.shift(*dir);
        if nb != b { b = nb.with_random_tile(&mut rng); }
        boards.push(b);
    }
    boards
}

fn fixed(depth: u32, pruning: bool) -> AlphaBeta {
    AlphaBeta::with_config(SearchConfig { time_budget_ms: u64::MAX, max_depth: Some(depth), pruning })
}

fn bench_search_depth(c: &mut Criterion) {
    let boards = corpus();
    let mut group = c.benchmark_group("alphabeta/search_depth");
    for depth in 1..=3u32 {
        for pruning in [true, false] {
            let label = if pruning { "pruned" } else { "plain" };
            let mut ab = fixed(depth, pruning);
            group.bench_with_input(BenchmarkId::new(label, depth), &depth, |bch, &d| {
                bch.iter(|| {
                    let mut acc = 0.0;
                    for &bd in &boards { acc += ab.search_depth(bd, d).score; }
                    black_box(acc)
                })
            });
        }
    }
    group.finish();
}

fn bench_e2e(c: &mut Criterion) {
    let mut ab = fixed(3, true);
    c.bench_function("e2e/64_moves", |bch| {
        bch.iter(|| {
            let mut game = Game::new(StdRng::seed_from_u64(7));
            let summary = game.play(&mut ab, &Limits { steps: Some(64), ..Default::default() });
            black_box((summary.final_board, summary.moves))
        })
    });
}

criterion_group!(alphabeta, bench_search_depth, bench_e2e);
criterion_main!(alphabeta);
