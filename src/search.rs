//! Depth-bounded negamax search with alpha-beta pruning.
//!
//! Scores are on the outcome scale (0 = loss, 1 = tie, 2 = win) and always from the perspective of
//! the player to move at that node. A child's score is converted to its parent's perspective with
//! `2 - score`, and the parent's (alpha, beta) window becomes (2 - beta, 2 - alpha) for the child.

use scoped_threadpool::Pool;

use crate::board_game::Player;
use crate::evaluator::Evaluator;
use crate::tic_tac_toe::Board;

/// Replace exact search with a leaf evaluator once `depth` plies have been searched.
pub struct Cutoff<'e> {
    pub evaluator: &'e mut dyn Evaluator,
    pub depth: usize,
}

impl<'e> Cutoff<'e> {
    pub fn new(evaluator: &'e mut dyn Evaluator, depth: usize) -> Self {
        Cutoff { evaluator, depth }
    }
}

/// Best move for `player` and its score. Without a cutoff the search runs to terminal states and
/// the score is exact.
///
/// Ties keep the first move found, moves are tried in increasing cell index order, so the result
/// is deterministic.
pub fn search(board: &Board, player: Player, cutoff: Option<Cutoff<'_>>) -> (f64, Board) {
    search_with_bounds(board, player, cutoff, None, None)
}

/// [`search`] inside an inherited (alpha, beta) window; `None` means unbounded.
pub fn search_with_bounds(
    board: &Board,
    player: Player,
    cutoff: Option<Cutoff<'_>>,
    alpha: Option<f64>,
    beta: Option<f64>,
) -> (f64, Board) {
    let (evaluator, depth) = match cutoff {
        Some(Cutoff { evaluator, depth }) => (Some(evaluator), Some(depth)),
        None => (None, None),
    };
    let mut negamax = Negamax { evaluator };
    negamax.search(
        board,
        player,
        depth,
        alpha.unwrap_or(f64::NEG_INFINITY),
        beta.unwrap_or(f64::INFINITY),
    )
}

struct Negamax<'e> {
    evaluator: Option<&'e mut dyn Evaluator>,
}

impl Negamax<'_> {
    fn search(
        &mut self,
        board: &Board,
        player: Player,
        depth: Option<usize>,
        mut alpha: f64,
        beta: f64,
    ) -> (f64, Board) {
        if let Some(outcome) = board.terminal_score(player) {
            return (outcome.value(), board.clone());
        }

        if depth == Some(0) {
            if let Some(evaluator) = self.evaluator.as_deref_mut() {
                // the opponent just moved into this position, score it for them and flip
                let score = evaluator.evaluate(board, player.get_opponent());
                debug_assert!(
                    (0.0..=2.0).contains(&score),
                    "evaluator score {} outside [0, 2]",
                    score
                );
                return (2.0 - score, board.clone());
            }
        }

        let opponent = player.get_opponent();
        let child_depth = depth.map(|d| d.saturating_sub(1));
        let mut best: Option<(f64, Board)> = None;
        for child in board.legal_moves(player) {
            let (child_score, _) =
                self.search(&child, opponent, child_depth, 2.0 - beta, 2.0 - alpha);
            let score = 2.0 - child_score;
            if best.as_ref().map_or(true, |(best_score, _)| score > *best_score) {
                best = Some((score, child));
            }
            if score >= beta {
                break;
            }
            if score > alpha {
                alpha = score;
            }
        }

        match best {
            Some(best) => best,
            None => unreachable!("non-terminal board without legal moves: {:?}", board),
        }
    }
}

/// Exhaustive [`search`] with the root's children spread over a pool of `threads` workers.
///
/// Every child is searched with a full window, then the first child with the maximal score is
/// picked, so the result matches the sequential search.
pub fn search_parallel(board: &Board, player: Player, threads: usize) -> (f64, Board) {
    if let Some(outcome) = board.terminal_score(player) {
        return (outcome.value(), board.clone());
    }

    let opponent = player.get_opponent();
    let children: Vec<Board> = board.legal_moves(player).collect();
    let mut scores = vec![0.0; children.len()];

    let mut pool = Pool::new(threads.max(1) as u32);
    pool.scoped(|scoped| {
        for (child, score) in children.iter().zip(scores.iter_mut()) {
            scoped.execute(move || {
                *score = 2.0 - search(child, opponent, None).0;
            });
        }
    });

    let mut best = 0;
    for (i, &score) in scores.iter().enumerate() {
        if score > scores[best] {
            best = i;
        }
    }
    (scores[best], children[best].clone())
}
