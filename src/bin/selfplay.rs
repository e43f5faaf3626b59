use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use minimax_2048::config::SearchConfig;
use minimax_2048::game::{Game, GameSummary, Limits};
use minimax_2048::minimax::AlphaBeta;
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Play many seeded games in parallel and report aggregate results.
///
/// Each game runs its own single-threaded search; parallelism is across games.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of games to play
    #[arg(long, default_value_t = 16)]
    games: u64,
    /// Seed of the first game; game `i` uses `seed + i`
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Worker threads (defaults to rayon's choice)
    #[arg(long)]
    threads: Option<usize>,
    /// JSON search config; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,
    /// Per-move time budget in milliseconds
    #[arg(long)]
    budget_ms: Option<u64>,
    /// Maximum search depth in plies
    #[arg(long)]
    max_depth: Option<u32>,
    /// Stop each game after this many moves
    #[arg(long)]
    steps: Option<u64>,
    /// Stop each game once its score reaches this value
    #[arg(long)]
    stop_score: Option<u64>,
    /// Stop each game once this tile appears
    #[arg(long)]
    stop_tile: Option<u32>,
    /// Write one JSON line per game to this file
    #[arg(long)]
    out: Option<PathBuf>,
    /// Hide the progress bar
    #[arg(long)]
    quiet: bool,
}

#[derive(Serialize)]
struct Record<'a> {
    seed: u64,
    #[serde(flatten)]
    summary: &'a GameSummary,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => SearchConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => SearchConfig::default(),
    };
    if let Some(ms) = args.budget_ms { cfg.time_budget_ms = ms; }
    if let Some(depth) = args.max_depth { cfg.max_depth = Some(depth); }
    cfg.validate()?;

    let mut pool = ThreadPoolBuilder::new();
    if let Some(n) = args.threads {
        pool = pool.num_threads(n);
    }
    let pool = pool.build().context("building thread pool")?;

    let limits = Limits { steps: args.steps, stop_score: args.stop_score, stop_tile: args.stop_tile };
    let pb = if args.quiet { ProgressBar::hidden() } else { ProgressBar::new(args.games) };
    pb.set_style(
        ProgressStyle::with_template("{spinner} {elapsed_precise} [{bar:40}] {pos}/{len} games | {msg}")
            .context("progress template")?
            .progress_chars("=> "),
    );

    let results: Vec<(u64, GameSummary)> = pool.install(|| {
        (0..args.games)
            .into_par_iter()
            .map(|i| {
                let seed = args.seed.wrapping_add(i);
                let mut policy = AlphaBeta::with_config(cfg.clone());
                let mut game = Game::new(StdRng::seed_from_u64(seed));
                let summary = game.play(&mut policy, &limits);
                pb.inc(1);
                pb.set_message(format!("last score: {}", summary.score));
                (seed, summary)
            })
            .collect()
    });
    pb.finish_and_clear();

    if let Some(path) = &args.out {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let mut w = BufWriter::new(file);
        for (seed, summary) in &results {
            serde_json::to_writer(&mut w, &Record { seed: *seed, summary })?;
            w.write_all(b"\n")?;
        }
        w.flush()?;
        eprintln!("Wrote {} games to {}", results.len(), path.display());
    }

    let games = results.len().max(1) as f64;
    let mean_score = results.iter().map(|(_, s)| s.score as f64).sum::<f64>() / games;
    let wins = results.iter().filter(|(_, s)| s.won).count();
    let best_tile = results.iter().map(|(_, s)| s.highest_tile).max().unwrap_or(0);
    let mean_moves = results.iter().map(|(_, s)| s.moves as f64).sum::<f64>() / games;
    println!(
        "Games: {} | mean score: {:.1} | mean moves: {:.1} | wins: {} ({:.1}%) | best tile: {}",
        results.len(),
        mean_score,
        mean_moves,
        wins,
        100.0 * wins as f64 / games,
        best_tile
    );
    Ok(())
}
