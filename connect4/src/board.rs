use std::fmt;

use crate::{Cell, GameError, MoveOutcome, Player, HEIGHT, WIDTH, WIN_LENGTH};

/// Scans through the last placed piece as (column step, row step, both ways).
/// Rows grow downward, so the column scan only walks down. The order is
/// significant: a longer run demotes a shorter one recorded before it.
const SCANS: [(isize, isize, bool); 4] = [
    (0, 1, false), // column
    (1, -1, true), // ascending diagonal
    (1, 1, true),  // descending diagonal
    (1, 0, true),  // row
];

/// Per-player counts of the runs of 2, 3 and 4+ pieces created by moves.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Alignments {
    counts: [u32; 3],
}

impl Alignments {
    pub fn twos(&self) -> u32 {
        self.counts[0]
    }

    pub fn threes(&self) -> u32 {
        self.counts[1]
    }

    pub fn fours(&self) -> u32 {
        self.counts[2]
    }

    /// Counts a run of `length` pieces. A run that grew out of a shorter one
    /// moves that one up a bucket instead of being counted twice.
    fn record(&mut self, length: usize) {
        if length < 2 {
            return;
        }
        let idx = length.min(WIN_LENGTH) - 2;
        if idx > 0 && self.counts[idx - 1] > 0 {
            self.counts[idx - 1] -= 1;
        }
        self.counts[idx] += 1;
    }
}

/// State that `undo` cannot rebuild on its own.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    alignments: [Alignments; 2],
    last_move: Option<(usize, usize)>,
}

/// A 7x6 grid indexed `[column][row]`, row 0 being the top.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    grid: [[Cell; HEIGHT]; WIDTH],
    heights: [usize; WIDTH],
    last_move: Option<(usize, usize)>,
    alignments: [Alignments; 2],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            grid: [[Cell::Empty; HEIGHT]; WIDTH],
            heights: [0; WIDTH],
            last_move: None,
            alignments: [Alignments::default(); 2],
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn cell(&self, column: usize, row: usize) -> Cell {
        self.grid[column][row]
    }

    /// Number of pieces stacked in `column`.
    pub fn height(&self, column: usize) -> usize {
        self.heights[column]
    }

    pub fn moves_played(&self) -> usize {
        self.heights.iter().sum()
    }

    /// `(column, row)` of the last piece placed, if any.
    pub fn last_move(&self) -> Option<(usize, usize)> {
        self.last_move
    }

    pub fn alignments(&self, player: Player) -> Alignments {
        self.alignments[player.idx()]
    }

    pub fn is_valid_move(&self, column: usize) -> bool {
        column < WIDTH && self.grid[column][0].is_empty()
    }

    pub fn is_winner(&self, player: Player) -> bool {
        self.alignments[player.idx()].fours() > 0
    }

    /// True once no column accepts another piece.
    pub fn is_game_over(&self) -> bool {
        !(0..WIDTH).any(|column| self.is_valid_move(column))
    }

    /// Checked variant of [`Board::play`] for moves coming from outside the engine.
    pub fn play_in_column(
        &mut self,
        column: usize,
        player: Player,
    ) -> Result<MoveOutcome, GameError> {
        if column >= WIDTH {
            return Err(GameError::ColumnOutOfBounds { column });
        }
        if !self.is_valid_move(column) {
            return Err(GameError::ColumnFull { column });
        }
        let row = self.play(column, player);
        Ok(MoveOutcome {
            player,
            column,
            row,
            won: self.is_winner(player),
        })
    }

    /// Drops a piece into `column` and returns the row it landed on.
    ///
    /// The column must be a valid move.
    pub fn play(&mut self, column: usize, player: Player) -> usize {
        debug_assert!(self.is_valid_move(column), "column {column} is not playable");
        let row = HEIGHT - 1 - self.heights[column];
        self.grid[column][row] = Cell::Taken(player);
        self.heights[column] += 1;
        self.last_move = Some((column, row));
        self.rescan(column, row, player);
        row
    }

    /// Removes the top piece of `column`. Alignments are left untouched;
    /// callers restore them from a [`Snapshot`].
    pub fn undo(&mut self, column: usize) {
        let filled = self.heights[column];
        assert!(filled > 0, "undo on empty column {column}");
        self.grid[column][HEIGHT - filled] = Cell::Empty;
        self.heights[column] = filled - 1;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            alignments: self.alignments,
            last_move: self.last_move,
        }
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.alignments = snapshot.alignments;
        self.last_move = snapshot.last_move;
    }

    fn rescan(&mut self, column: usize, row: usize, player: Player) {
        for (dc, dr, both_ways) in SCANS {
            let mut length = self.run_length(column, row, dc, dr, player, 1);
            if both_ways && length < WIN_LENGTH {
                length = self.run_length(column, row, -dc, -dr, player, length);
            }
            self.alignments[player.idx()].record(length);
        }
    }

    fn run_length(
        &self,
        column: usize,
        row: usize,
        dc: isize,
        dr: isize,
        player: Player,
        mut length: usize,
    ) -> usize {
        let mut c = column as isize + dc;
        let mut r = row as isize + dr;
        while length < WIN_LENGTH && self.taken_by(c, r, player) {
            length += 1;
            c += dc;
            r += dr;
        }
        length
    }

    fn taken_by(&self, column: isize, row: isize, player: Player) -> bool {
        if column < 0 || row < 0 {
            return false;
        }
        let (column, row) = (column as usize, row as usize);
        column < WIDTH && row < HEIGHT && self.grid[column][row] == Cell::Taken(player)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SEPARATOR: &str = " | ";
        writeln!(f)?;
        for row in 0..HEIGHT {
            write!(f, "{SEPARATOR}")?;
            for column in 0..WIDTH {
                let symbol = self.grid[column][row].player().map_or(' ', Player::symbol);
                write!(f, "{symbol}{SEPARATOR}")?;
            }
            writeln!(f)?;
        }
        writeln!(f)?;
        write!(f, "{SEPARATOR}")?;
        for column in 0..WIDTH {
            write!(f, "{column}{SEPARATOR}")?;
        }
        writeln!(f)
    }
}
