//! Connect 4 engine with incremental alignment tracking and alpha-beta search.
//! The board keeps, for each player, counts of the longest runs created by
//! each placed piece (2, 3 and 4+), so wins are detected in O(1) and leaf
//! evaluation never rescans the grid. The search is a negamax with
//! alpha-beta pruning that plays and undoes moves on a single board.
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod board;
mod eval;
mod search;

pub use board::{Alignments, Board, Snapshot};
pub use eval::{AlignmentEvaluator, Evaluator};
pub use search::{AlphaBeta, SearchStats, Strategy};

pub const WIDTH: usize = 7;
pub const HEIGHT: usize = 6;
pub const MAX_CELLS: usize = WIDTH * HEIGHT;
pub const CENTER_COLUMN: usize = WIDTH / 2;

/// Number of aligned pieces needed to win.
const WIN_LENGTH: usize = 4;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    X,
    O,
}

impl Player {
    fn idx(self) -> usize {
        match self {
            Player::X => 0,
            Player::O => 1,
        }
    }

    pub fn opponent(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// `+1` for X and `-1` for O; negating it yields the opponent's sign.
    pub fn sign(self) -> i32 {
        match self {
            Player::X => 1,
            Player::O => -1,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Player::X => 'X',
            Player::O => 'O',
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Cell {
    #[default]
    Empty,
    Taken(Player),
}

impl Cell {
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Taken(player) => Some(player),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("column {column} is out of bounds")]
    ColumnOutOfBounds { column: usize },
    #[error("column {column} is full")]
    ColumnFull { column: usize },
    #[error("the board is full")]
    BoardFull,
    #[error("player {} has already won", .player.symbol())]
    AlreadyWon { player: Player },
    #[error("invalid column {input:?}: expected a number between 0 and {}", WIDTH - 1)]
    ParseColumn { input: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub player: Player,
    pub column: usize,
    pub row: usize,
    pub won: bool,
}

/// Parses a human-entered, zero-based column number.
pub fn parse_column(input: &str) -> Result<usize, GameError> {
    let trimmed = input.trim();
    match trimmed.parse::<usize>() {
        Ok(column) if column < WIDTH => Ok(column),
        _ => Err(GameError::ParseColumn {
            input: trimmed.to_string(),
        }),
    }
}
