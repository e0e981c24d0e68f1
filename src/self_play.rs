//! Driving games between two agents.
use log::{debug, info};

use crate::agents::Agent;
use crate::board_game::Outcome;
use crate::board_game::Player::{P1, P2};
use crate::error::AgentError;
use crate::tic_tac_toe::{initial_board, Board};

/// How a single game ended.
#[derive(Clone, Debug, PartialEq)]
pub struct GameRecord {
    pub board: Board,
    /// Result for the agent that moved first.
    pub outcome: Outcome,
    pub moves: usize,
}

/// Play one game on an empty size x size board. `first` plays P1 and moves first.
///
/// Both agents are told the result once the game is over: `first` gets the outcome, `second` its
/// complement. A board that is not one of the mover's legal moves aborts the game.
pub fn play_game(
    first: &mut dyn Agent,
    second: &mut dyn Agent,
    size: usize,
) -> Result<GameRecord, AgentError> {
    first.set_player(P1);
    second.set_player(P2);

    let mut board = initial_board(size);
    let mut moves = 0;
    let outcome = loop {
        if let Some(outcome) = board.terminal_score(P1) {
            break outcome;
        }
        board = if moves % 2 == 0 {
            take_turn(first, &board, moves)?
        } else {
            take_turn(second, &board, moves)?
        };
        moves += 1;
    };

    first.game_over(outcome);
    second.game_over(outcome.complement());
    Ok(GameRecord {
        board,
        outcome,
        moves,
    })
}

fn take_turn(agent: &mut dyn Agent, board: &Board, moves: usize) -> Result<Board, AgentError> {
    let next = agent.choose_move(board)?;
    if !board.legal_moves(agent.player()).any(|b| b == next) {
        return Err(AgentError::IllegalMove {
            agent: agent.name().to_string(),
            board: format!("{:?}", next),
        });
    }
    debug!(
        "move {}: {} ({:?}) took cell {:?}",
        moves + 1,
        agent.name(),
        agent.player(),
        board.move_index(&next)
    );
    Ok(next)
}

/// Results of a series of games between agents `a` and `b`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionSummary {
    pub games: usize,
    pub a_wins: usize,
    pub b_wins: usize,
    pub ties: usize,
    pub last: Option<GameRecord>,
}

/// Play `games` games between `a` and `b`. With `alternate_first` they take turns moving first,
/// starting with `a`; otherwise `a` always moves first.
pub fn play_session(
    a: &mut dyn Agent,
    b: &mut dyn Agent,
    games: usize,
    size: usize,
    alternate_first: bool,
) -> Result<SessionSummary, AgentError> {
    let mut summary = SessionSummary::default();
    for game in 0..games {
        let a_first = !alternate_first || game % 2 == 0;
        let record = if a_first {
            play_game(a, b, size)?
        } else {
            play_game(b, a, size)?
        };
        let a_outcome = if a_first {
            record.outcome
        } else {
            record.outcome.complement()
        };
        match a_outcome {
            Outcome::Win => summary.a_wins += 1,
            Outcome::Loss => summary.b_wins += 1,
            Outcome::Tie => summary.ties += 1,
        }
        summary.games += 1;
        info!(
            "game {}/{}: {} {} against {} in {} moves ({}-{}-{})",
            game + 1,
            games,
            a.name(),
            a_outcome,
            b.name(),
            record.moves,
            summary.a_wins,
            summary.ties,
            summary.b_wins
        );
        summary.last = Some(record);
    }
    Ok(summary)
}
