use crate::{Alignments, Board, Player};

/// Scores a position from `player`'s point of view. Implementations must be
/// zero-sum: `evaluate(b, p) == -evaluate(b, p.opponent())`.
pub trait Evaluator {
    fn evaluate(&self, board: &Board, player: Player) -> i32;
}

/// Weighted sum of a player's alignment buckets minus the opponent's.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AlignmentEvaluator {
    weights: [i32; 3],
}

impl Default for AlignmentEvaluator {
    fn default() -> Self {
        Self {
            weights: [1, 10, 100],
        }
    }
}

impl AlignmentEvaluator {
    pub fn with_weights(twos: i32, threes: i32, fours: i32) -> Self {
        Self {
            weights: [twos, threes, fours],
        }
    }

    fn weigh(&self, alignments: Alignments) -> i32 {
        let [w2, w3, w4] = self.weights;
        w2 * alignments.twos() as i32 + w3 * alignments.threes() as i32 + w4 * alignments.fours() as i32
    }
}

impl Evaluator for AlignmentEvaluator {
    fn evaluate(&self, board: &Board, player: Player) -> i32 {
        self.weigh(board.alignments(player)) - self.weigh(board.alignments(player.opponent()))
    }
}
