//! Agents for Tic Tac Toe.

mod minimax_agent;
mod network_agent;
pub use minimax_agent::MinimaxAgent;
pub use network_agent::{Example, NetworkAgent, NetworkEvaluator};

use std::io::{self, BufRead};

use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board_game::{Cell, Outcome, Player};
use crate::error::AgentError;
use crate::tic_tac_toe::{Board, ALPHABET};

// Error messages
const BAD_INPUT: &str = "bad input";
const OUT_OF_RANGE: &str = "out of range";
const CELL_TAKEN: &str = "cell taken";

/// Which player an agent is playing as, and its running score (sum of outcome points over every
/// game it has finished).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Seat {
    pub player: Player,
    pub score: u32,
}

impl Seat {
    pub fn new(player: Player) -> Seat {
        Seat { player, score: 0 }
    }
}

/// An agent that will choose a move given the state of the game board.
pub trait Agent {
    fn name(&self) -> &str;

    fn seat(&self) -> &Seat;

    fn seat_mut(&mut self) -> &mut Seat;

    fn player(&self) -> Player {
        self.seat().player
    }

    /// Called at the start of every game.
    fn set_player(&mut self, player: Player) {
        self.seat_mut().player = player;
    }

    /// The board after this agent's move. Agents without a move policy report
    /// [`AgentError::Unimplemented`] rather than returning some board.
    fn choose_move(&mut self, _board: &Board) -> Result<Board, AgentError> {
        Err(AgentError::Unimplemented {
            agent: self.name().to_string(),
        })
    }

    /// Called once the game is over with the result from this agent's perspective.
    fn game_over(&mut self, outcome: Outcome) {
        self.seat_mut().score += outcome.points();
    }

    fn score(&self) -> u32 {
        self.seat().score
    }
}

/*
 * -----------
 * Human Agent
 * -----------
 */

/// An agent controlled by the user running the program.
pub struct HumanAgent {
    seat: Seat,
    input: Box<dyn BufRead>,
}

impl HumanAgent {
    /// Reads moves from stdin.
    pub fn new(player: Player) -> HumanAgent {
        HumanAgent::with_input(player, Box::new(io::BufReader::new(io::stdin())))
    }

    pub fn with_input(player: Player, input: Box<dyn BufRead>) -> HumanAgent {
        HumanAgent {
            seat: Seat::new(player),
            input,
        }
    }
}

/// Translate a move like "a2" into a cell index. Columns are letter indexes, rows are integers,
/// so "a2" means column 0, row 2.
pub fn parse_move(input: &str, size: usize) -> Result<usize, &'static str> {
    let mut chars = input.trim().chars();
    let (col, row) = match (chars.next(), chars.next(), chars.next()) {
        (Some(col), Some(row), None) => (col, row),
        _ => return Err(BAD_INPUT),
    };
    let col = match ALPHABET.find(col.to_ascii_lowercase()) {
        Some(idx) => idx,
        None => return Err(BAD_INPUT),
    };
    let row = match row.to_digit(10) {
        Some(idx) => idx as usize,
        None => return Err(BAD_INPUT),
    };
    if row >= size || col >= size {
        return Err(OUT_OF_RANGE);
    }
    Ok(row * size + col)
}

impl Agent for HumanAgent {
    fn name(&self) -> &str {
        "Human"
    }

    fn seat(&self) -> &Seat {
        &self.seat
    }

    fn seat_mut(&mut self) -> &mut Seat {
        &mut self.seat
    }

    fn choose_move(&mut self, board: &Board) -> Result<Board, AgentError> {
        if board.empty_cells() == 0 {
            return Err(AgentError::GameOver {
                agent: self.name().to_string(),
            });
        }
        println!("{}", board);
        loop {
            println!("Enter a move (like \"a0\"):");
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(AgentError::InputClosed);
            }
            let chosen = parse_move(&line, board.size()).and_then(|idx| {
                if board.cells()[idx] == Cell::Empty {
                    Ok(idx)
                } else {
                    Err(CELL_TAKEN)
                }
            });
            match chosen {
                Ok(idx) => return Ok(board.with_move(idx, self.seat.player)),
                Err(msg) => {
                    warn!("rejected move {:?}: {}", line.trim(), msg);
                    println!("Oops, enter valid input");
                }
            }
        }
    }
}

/*
 * ------------
 * Random Agent
 * ------------
 */

/// Agent that makes random moves.
#[derive(Clone, Debug)]
pub struct RandomAgent {
    seat: Seat,
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(player: Player) -> RandomAgent {
        RandomAgent {
            seat: Seat::new(player),
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(player: Player, seed: u64) -> RandomAgent {
        RandomAgent {
            seat: Seat::new(player),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        "Random"
    }

    fn seat(&self) -> &Seat {
        &self.seat
    }

    fn seat_mut(&mut self) -> &mut Seat {
        &mut self.seat
    }

    fn choose_move(&mut self, board: &Board) -> Result<Board, AgentError> {
        let mut moves: Vec<Board> = board.legal_moves(self.seat.player).collect();
        if moves.is_empty() {
            return Err(AgentError::GameOver {
                agent: self.name().to_string(),
            });
        }
        let idx = self.rng.random_range(0..moves.len());
        Ok(moves.swap_remove(idx))
    }
}
