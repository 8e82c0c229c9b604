use std::io;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod game;

use game::GameConfig;

/// Play Connect 4 in the terminal against an alpha-beta engine.
#[derive(Parser, Debug)]
#[command(name = "connect4", author, version, about, long_about = None)]
struct Cli {
    /// Number of human players (0, 1 or 2); asked interactively when omitted
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=2))]
    humans: Option<u8>,
    /// Initial search depth of the engine
    #[arg(long, default_value_t = 5)]
    depth: u32,
    /// Deepen the search by one ply whenever a move took less than this
    #[arg(long, default_value_t = 200)]
    increase_below_ms: u64,
    /// Seed for the engine and for choosing who starts
    #[arg(long)]
    seed: Option<u64>,
    /// Print a JSON summary once the game is over
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = GameConfig {
        initial_depth: cli.depth,
        increase_below_ms: cli.increase_below_ms,
        seed: cli.seed,
    };

    let mut input = io::stdin().lock();
    let mut out = io::stdout().lock();
    let humans = match cli.humans {
        Some(humans) => humans,
        None => game::ask_humans(&mut input, &mut out)?,
    };
    let summary = game::run(&config, humans, &mut input, &mut out)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
