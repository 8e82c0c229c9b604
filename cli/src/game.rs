//! Console game loop: seats, prompts and adaptive search depth.
use std::io::{BufRead, Write};
use std::time::{Duration, Instant};

use anyhow::bail;
use connect4::{parse_column, AlignmentEvaluator, AlphaBeta, Player, Strategy, MAX_CELLS};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub initial_depth: u32,
    pub increase_below_ms: u64,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_depth: 5,
            increase_below_ms: 200,
            seed: None,
        }
    }
}

impl GameConfig {
    fn increase_below(&self) -> Duration {
        Duration::from_millis(self.increase_below_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub winner: Option<Player>,
    pub moves: Vec<usize>,
    pub final_depth: u32,
}

fn read_line<R: BufRead>(input: &mut R) -> anyhow::Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("input closed");
    }
    Ok(line)
}

pub fn ask_humans<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> anyhow::Result<u8> {
    loop {
        write!(out, "How many human players? (0, 1 or 2) ")?;
        out.flush()?;
        match read_line(input)?.trim().parse::<u8>() {
            Ok(humans) if humans <= 2 => return Ok(humans),
            _ => writeln!(out, "Invalid number of players.")?,
        }
    }
}

fn ask_move<R: BufRead, W: Write>(
    engine: &dyn Strategy,
    player: Player,
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<usize> {
    loop {
        write!(out, "\nNext move for player {}: ", player.symbol())?;
        out.flush()?;
        match parse_column(&read_line(input)?) {
            Ok(column) if engine.board().is_valid_move(column) => return Ok(column),
            Ok(column) => writeln!(out, "Invalid move: column {column} is full. Try again.")?,
            Err(err) => writeln!(out, "Invalid move: {err}. Try again.")?,
        }
    }
}

/// Search depth for the next engine move: one ply deeper after a fast
/// search, as long as the depth cannot exceed the cells left to fill.
fn next_depth(config: &GameConfig, depth: u32, elapsed: Duration, played: usize) -> u32 {
    if elapsed < config.increase_below() && depth as usize + played <= MAX_CELLS {
        depth + 1
    } else {
        depth
    }
}

fn seat(player: Player) -> usize {
    match player {
        Player::X => 0,
        Player::O => 1,
    }
}

/// Plays one game to the end. X always moves first; with a single human the
/// human's side is drawn at random.
pub fn run<R: BufRead, W: Write>(
    config: &GameConfig,
    humans: u8,
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<GameSummary> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let engine_rng = StdRng::seed_from_u64(rng.random::<u64>());
    let mut engine: Box<dyn Strategy> =
        Box::new(AlphaBeta::with_parts(AlignmentEvaluator::default(), engine_rng));

    let mut human = [humans >= 1, humans >= 2];
    if rng.random_bool(0.5) {
        human.swap(0, 1);
    }
    info!(
        engine = engine.name(),
        x_human = human[0],
        o_human = human[1],
        "starting game"
    );

    let mut player = Player::X;
    let mut depth = config.initial_depth;
    let mut moves = Vec::with_capacity(MAX_CELLS);
    let mut winner = None;

    for played in 0..MAX_CELLS {
        write!(out, "{}", engine.board())?;

        let column = if human[seat(player)] {
            ask_move(engine.as_ref(), player, input, out)?
        } else {
            let started = Instant::now();
            let column = engine.choose_next_move(player, depth)?;
            let elapsed = started.elapsed();
            debug!(player = %player.symbol(), column, ?elapsed, depth, "engine moved");
            let deeper = next_depth(config, depth, elapsed, played);
            if deeper != depth {
                depth = deeper;
                info!(depth, "increasing search depth");
                writeln!(out, "New search depth: {depth}")?;
            }
            column
        };

        let outcome = engine.play_in_column(column, player)?;
        moves.push(column);
        if outcome.won {
            winner = Some(player);
            break;
        }
        player = player.opponent();
    }

    write!(out, "{}", engine.board())?;
    match winner {
        Some(player) => writeln!(out, "{} wins!", player.symbol())?,
        None => writeln!(out, "Draw!")?,
    }
    info!(winner = ?winner, moves = moves.len(), "game over");

    Ok(GameSummary {
        winner,
        moves,
        final_depth: depth,
    })
}
