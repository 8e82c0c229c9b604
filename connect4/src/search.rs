use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::{
    AlignmentEvaluator, Board, Evaluator, GameError, MoveOutcome, Player, CENTER_COLUMN, WIDTH,
};

/// Center-out base order, shuffled at every node.
const MOVE_ORDER: [usize; WIDTH] = [3, 4, 5, 0, 1, 2, 6];
/// Score of a decided game, scaled by the depth left when it was found.
const WIN_SCORE: i32 = 100;
const INFINITY: i32 = i32::MAX;

/// What a driver needs from a computer player.
pub trait Strategy {
    /// Short display name.
    fn name(&self) -> &str;

    fn board(&self) -> &Board;

    fn reset(&mut self);

    /// Commits a move for either side.
    fn play_in_column(&mut self, column: usize, player: Player)
        -> Result<MoveOutcome, GameError>;

    /// Recommends a column for `player` without changing the board.
    fn choose_next_move(&mut self, player: Player, depth: u32) -> Result<usize, GameError>;
}

/// Counters for the most recent search.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub cutoffs: u64,
}

#[derive(Copy, Clone, Debug)]
struct Scored {
    score: i32,
    column: Option<usize>,
}

impl Scored {
    fn leaf(score: i32) -> Self {
        Self {
            score,
            column: None,
        }
    }
}

/// Negamax with alpha-beta pruning over a single, mutated board.
pub struct AlphaBeta<E = AlignmentEvaluator, R = StdRng> {
    board: Board,
    evaluator: E,
    rng: R,
    stats: SearchStats,
}

impl AlphaBeta {
    pub fn new() -> Self {
        Self::with_parts(AlignmentEvaluator::default(), StdRng::from_os_rng())
    }

    /// Engine whose move ordering is reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_parts(AlignmentEvaluator::default(), StdRng::seed_from_u64(seed))
    }
}

impl Default for AlphaBeta {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Evaluator, R: Rng> AlphaBeta<E, R> {
    pub fn with_parts(evaluator: E, rng: R) -> Self {
        Self {
            board: Board::new(),
            evaluator,
            rng,
            stats: SearchStats::default(),
        }
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Value of the position for `player` to move, searched `depth` plies.
    /// Depth 0 is the static evaluation unless the game is already lost.
    pub fn search_score(&mut self, player: Player, depth: u32) -> i32 {
        self.stats = SearchStats::default();
        self.negamax(depth, -INFINITY, INFINITY, player).score
    }

    fn negamax(&mut self, depth: u32, mut alpha: i32, beta: i32, player: Player) -> Scored {
        self.stats.nodes += 1;

        if self.board.is_winner(player.opponent()) {
            // Fewer plies left means the loss comes later.
            return Scored::leaf(-WIN_SCORE * (depth as i32 + 1));
        }
        if depth == 0 {
            return Scored::leaf(self.evaluator.evaluate(&self.board, player));
        }
        if self.board.is_game_over() {
            return Scored::leaf(0);
        }

        let mut columns = MOVE_ORDER;
        columns.shuffle(&mut self.rng);
        let snapshot = self.board.snapshot();

        let mut best = Scored::leaf(-INFINITY);
        for column in columns {
            if !self.board.is_valid_move(column) {
                continue;
            }
            self.board.play(column, player);
            let score = -self
                .negamax(depth - 1, -beta, -alpha, player.opponent())
                .score;
            self.board.undo(column);
            self.board.restore(snapshot);

            if score > best.score {
                best = Scored {
                    score,
                    column: Some(column),
                };
            }
            if score > alpha {
                alpha = score;
                if alpha > beta {
                    self.stats.cutoffs += 1;
                    break;
                }
            }
        }
        best
    }
}

impl<E: Evaluator, R: Rng> Strategy for AlphaBeta<E, R> {
    fn name(&self) -> &str {
        "AlphaBeta"
    }

    fn board(&self) -> &Board {
        &self.board
    }

    fn reset(&mut self) {
        self.board.reset();
        self.stats = SearchStats::default();
    }

    fn play_in_column(
        &mut self,
        column: usize,
        player: Player,
    ) -> Result<MoveOutcome, GameError> {
        self.board.play_in_column(column, player)
    }

    fn choose_next_move(&mut self, player: Player, depth: u32) -> Result<usize, GameError> {
        if let Some(winner) = [Player::X, Player::O]
            .into_iter()
            .find(|&p| self.board.is_winner(p))
        {
            return Err(GameError::AlreadyWon { player: winner });
        }
        if self.board.is_game_over() {
            return Err(GameError::BoardFull);
        }
        if self.board.height(CENTER_COLUMN) == 0 {
            trace!(column = CENTER_COLUMN, "center column empty, skipping search");
            return Ok(CENTER_COLUMN);
        }

        // A zero-ply search never picks a column.
        let depth = depth.max(1);
        let before = self.board.clone();
        self.stats = SearchStats::default();
        let best = self.negamax(depth, -INFINITY, INFINITY, player);
        debug_assert_eq!(self.board, before, "search left the board modified");

        debug!(
            player = %player.symbol(),
            depth,
            score = best.score,
            column = ?best.column,
            nodes = self.stats.nodes,
            cutoffs = self.stats.cutoffs,
            "search finished"
        );
        best.column.ok_or(GameError::BoardFull)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HEIGHT;

    /// Plays `columns` alternately starting with X and returns the side to move.
    fn setup(engine: &mut AlphaBeta, columns: &[usize]) -> Player {
        let mut player = Player::X;
        for &column in columns {
            engine.play_in_column(column, player).unwrap();
            player = player.opponent();
        }
        player
    }

    fn fill_without_winner(engine: &mut AlphaBeta) {
        for column in 0..WIDTH {
            for row in (0..HEIGHT).rev() {
                let player = if (column / 2 + row) % 2 == 0 {
                    Player::X
                } else {
                    Player::O
                };
                engine.play_in_column(column, player).unwrap();
            }
        }
    }

    #[test]
    fn opens_in_the_center() {
        for depth in 0..8 {
            let mut engine = AlphaBeta::with_seed(depth as u64);
            assert_eq!(engine.choose_next_move(Player::X, depth), Ok(CENTER_COLUMN));
            assert_eq!(engine.stats().nodes, 0);
        }
    }

    #[test]
    fn center_shortcut_ignores_other_columns() {
        let mut engine = AlphaBeta::with_seed(1);
        let player = setup(&mut engine, &[0, 6]);
        assert_eq!(engine.choose_next_move(player, 4), Ok(CENTER_COLUMN));
    }

    #[test]
    fn depth_zero_is_static_evaluation() {
        let mut engine = AlphaBeta::with_seed(5);
        let player = setup(&mut engine, &[3, 3, 4]);
        assert_eq!(player, Player::O);
        let expected = AlignmentEvaluator::default().evaluate(engine.board(), player);
        assert_eq!(engine.search_score(player, 0), expected);
        assert_eq!(expected, -1);
        assert_eq!(engine.stats().nodes, 1);
    }

    #[test]
    fn takes_immediate_vertical_win() {
        for seed in 0..6 {
            let mut engine = AlphaBeta::with_seed(seed);
            let player = setup(&mut engine, &[3, 0, 3, 1, 3, 2]);
            for depth in 1..=6 {
                assert_eq!(engine.choose_next_move(player, depth), Ok(3));
            }
        }
    }

    #[test]
    fn takes_immediate_horizontal_win() {
        // X holds 1, 2 and 3 on the bottom row while O threatens column 0.
        for seed in 0..6 {
            let mut engine = AlphaBeta::with_seed(seed);
            let player = setup(&mut engine, &[3, 0, 1, 0, 2, 0]);
            for depth in 1..=6 {
                assert_eq!(engine.choose_next_move(player, depth), Ok(4));
            }
        }
    }

    #[test]
    fn blocks_vertical_threat() {
        for seed in 0..6 {
            let mut engine = AlphaBeta::with_seed(seed);
            let player = setup(&mut engine, &[0, 3, 0, 3, 6, 3]);
            for depth in 2..=6 {
                assert_eq!(engine.choose_next_move(player, depth), Ok(3));
            }
        }
    }

    #[test]
    fn immediate_win_scores_by_remaining_depth() {
        let mut engine = AlphaBeta::with_seed(11);
        let player = setup(&mut engine, &[3, 0, 3, 1, 3, 2]);
        for depth in 1..=5 {
            assert_eq!(engine.search_score(player, depth), WIN_SCORE * depth as i32);
        }
    }

    #[test]
    fn lost_position_scores_as_loss_even_at_depth_zero() {
        let mut engine = AlphaBeta::with_seed(2);
        setup(&mut engine, &[0, 1, 0, 1, 0, 1, 0]);
        assert!(engine.board().is_winner(Player::X));
        assert_eq!(engine.search_score(Player::O, 0), -WIN_SCORE);
        assert_eq!(engine.search_score(Player::O, 3), -WIN_SCORE * 4);
        assert_eq!(
            engine.choose_next_move(Player::O, 3),
            Err(GameError::AlreadyWon { player: Player::X })
        );
    }

    #[test]
    fn full_board_scores_zero() {
        let mut engine = AlphaBeta::with_seed(9);
        fill_without_winner(&mut engine);
        assert!(engine.board().is_game_over());
        for depth in 1..4 {
            assert_eq!(engine.search_score(Player::X, depth), 0);
            assert_eq!(engine.search_score(Player::O, depth), 0);
        }
        assert_eq!(
            engine.choose_next_move(Player::X, 4),
            Err(GameError::BoardFull)
        );
    }

    #[test]
    fn search_leaves_board_untouched() {
        let mut engine = AlphaBeta::with_seed(21);
        let player = setup(&mut engine, &[3, 2, 4, 4, 2, 5, 1]);
        let before = engine.board().clone();
        let column = engine.choose_next_move(player, 6).unwrap();
        assert_eq!(engine.board(), &before);
        assert!(engine.board().is_valid_move(column));
        assert!(engine.stats().nodes > 1);
    }

    #[test]
    fn same_seed_same_choice() {
        let moves = [3, 3, 2, 4, 4, 2, 5];
        let mut a = AlphaBeta::with_seed(42);
        let mut b = AlphaBeta::with_seed(42);
        let player = setup(&mut a, &moves);
        setup(&mut b, &moves);
        for depth in 1..=5 {
            assert_eq!(
                a.choose_next_move(player, depth),
                b.choose_next_move(player, depth)
            );
            assert_eq!(a.stats(), b.stats());
        }
    }

    #[test]
    fn reset_through_trait_object() {
        let mut engine: Box<dyn Strategy> = Box::new(AlphaBeta::with_seed(0));
        assert_eq!(engine.name(), "AlphaBeta");
        engine.play_in_column(3, Player::X).unwrap();
        engine.play_in_column(3, Player::O).unwrap();
        assert_eq!(engine.board().moves_played(), 2);
        engine.reset();
        assert_eq!(engine.board(), &Board::new());
    }

    struct Flat;

    impl Evaluator for Flat {
        fn evaluate(&self, _board: &Board, _player: Player) -> i32 {
            0
        }
    }

    #[test]
    fn custom_evaluator_still_sees_wins() {
        let mut engine = AlphaBeta::with_parts(Flat, StdRng::seed_from_u64(4));
        let mut player = Player::X;
        for column in [3, 0, 3, 1, 3, 2] {
            engine.play_in_column(column, player).unwrap();
            player = player.opponent();
        }
        assert_eq!(engine.choose_next_move(player, 3), Ok(3));
    }
}
