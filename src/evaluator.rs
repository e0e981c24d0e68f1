//! Leaf evaluation for the search engine.

use crate::board_game::Player;
use crate::search;
use crate::tic_tac_toe::Board;

/// Scores a position for a player on the outcome scale: 0 = loss, 1 = tie, 2 = win.
///
/// `player` is the one who moved into the position, so it is their opponent's turn. The search
/// engine asks for the mover's score at its cutoff depth and flips it with `2 - score`.
///
/// The search engine only ever talks to leaf evaluators through this trait, so any scorer can be
/// plugged in at the cutoff depth. `&mut self` lets evaluators keep state between calls (the
/// network evaluator records every board it is shown).
pub trait Evaluator {
    fn evaluate(&mut self, board: &Board, player: Player) -> f64;
}

impl<F> Evaluator for F
where
    F: FnMut(&Board, Player) -> f64,
{
    fn evaluate(&mut self, board: &Board, player: Player) -> f64 {
        self(board, player)
    }
}

/// Exact scoring: the terminal score when the game is over, otherwise the value of the position
/// under perfect play by both sides, with the opponent of `player` to move.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExactEvaluator;

impl Evaluator for ExactEvaluator {
    fn evaluate(&mut self, board: &Board, player: Player) -> f64 {
        match board.terminal_score(player) {
            Some(outcome) => outcome.value(),
            None => 2.0 - search::search(board, player.get_opponent(), None).0,
        }
    }
}
