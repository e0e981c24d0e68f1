//! Perfect-play agent: exhaustive negamax search to the end of the game.

use std::time::Instant;

use log::debug;

use crate::agents::{Agent, Seat};
use crate::board_game::Player;
use crate::error::AgentError;
use crate::search;
use crate::tic_tac_toe::Board;

#[derive(Clone, Debug)]
pub struct MinimaxAgent {
    seat: Seat,
    // size of the pool the root moves are searched on, 1 searches on the calling thread
    threads: usize,
}

impl MinimaxAgent {
    pub fn new(player: Player) -> MinimaxAgent {
        MinimaxAgent::with_threads(player, 1)
    }

    /// Search the root moves on `threads` workers; 0 means one per CPU.
    pub fn with_threads(player: Player, threads: usize) -> MinimaxAgent {
        let threads = if threads == 0 { num_cpus::get() } else { threads };
        MinimaxAgent {
            seat: Seat::new(player),
            threads,
        }
    }

    pub fn threads(&self) -> usize {
        self.threads
    }
}

impl Agent for MinimaxAgent {
    fn name(&self) -> &str {
        "Minimax"
    }

    fn seat(&self) -> &Seat {
        &self.seat
    }

    fn seat_mut(&mut self) -> &mut Seat {
        &mut self.seat
    }

    fn choose_move(&mut self, board: &Board) -> Result<Board, AgentError> {
        let now = Instant::now();
        let player = self.seat.player;
        let (score, next) = if self.threads > 1 {
            search::search_parallel(board, player, self.threads)
        } else {
            search::search(board, player, None)
        };
        debug!(
            "{:?} {} chose cell {:?} (score {}) in {:?}",
            player,
            self.name(),
            board.move_index(&next),
            score,
            now.elapsed()
        );
        Ok(next)
    }
}
