use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use minimax_2048::config::SearchConfig;
use minimax_2048::game::Game;
use minimax_2048::minimax::AlphaBeta;
use rand::{rngs::StdRng, SeedableRng};
use tracing_subscriber::EnvFilter;

/// Play a single game of 2048 with the alpha-beta player.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// RNG seed for tile spawns (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// JSON search config; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,
    /// Per-move time budget in milliseconds
    #[arg(long)]
    budget_ms: Option<u64>,
    /// Maximum search depth in plies
    #[arg(long)]
    max_depth: Option<u32>,
    /// Search until the time budget runs out, ignoring any depth cap
    #[arg(long, conflicts_with = "max_depth")]
    no_depth_cap: bool,
    /// Only print the final board and summary
    #[arg(long)]
    quiet: bool,
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
    if args.no_depth_cap { cfg.max_depth = None; }
    cfg.validate()?;

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut policy = AlphaBeta::with_config(cfg);
    let mut game = Game::new(StdRng::seed_from_u64(seed));
    if !args.quiet {
        println!("{}", game.board());
    }
    while let Some(dir) = game.step(&mut policy) {
        if !args.quiet {
            println!("{dir}\n{}", game.board());
        }
    }
    let board = game.board();
    if args.quiet {
        println!("{board}");
    }
    println!(
        "Seed: {}, Moves made: {}, Score: {}, Highest tile: {}",
        seed,
        game.moves(),
        board.score(),
        board.highest_tile()
    );
    Ok(())
}
