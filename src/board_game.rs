//! Players, cells and game outcomes shared by the board, the search and the agents.

use std::fmt;

use serde::{Deserialize, Serialize};

use Player::{P1, P2};

/// Used for deciding whose turn it is. P1 goes first.
#[derive(Eq, Hash, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Player {
    P1,
    P2,
}

impl Player {
    pub fn get_opponent(self) -> Player {
        match self {
            P1 => P2,
            P2 => P1,
        }
    }

    /// +1 for P1, -1 for P2. This is how a player's stones and perspective flag are fed to the
    /// network.
    pub fn sign(self) -> f64 {
        match self {
            P1 => 1.0,
            P2 => -1.0,
        }
    }
}

/// Represents a single cell of a game board.
#[derive(Eq, Hash, Clone, Copy, Debug, PartialEq)]
pub enum Cell {
    Empty,
    Full(Player),
}

impl Cell {
    /// Numeric value of the cell for the network input: the owner's sign, or 0 when empty.
    pub fn value(self) -> f64 {
        match self {
            Cell::Empty => 0.0,
            Cell::Full(player) => player.sign(),
        }
    }
}

/// Result of a finished game, always from the perspective of one named player.
///
/// The numeric encoding (0 = loss, 1 = tie, 2 = win) is the scale used everywhere: terminal
/// scores, search values and (halved) training targets.
#[derive(Eq, Hash, Clone, Copy, Debug, PartialEq, PartialOrd, Ord)]
pub enum Outcome {
    Loss = 0,
    Tie = 1,
    Win = 2,
}

impl Outcome {
    /// The same result seen by the other player (2 - x).
    pub fn complement(self) -> Outcome {
        match self {
            Outcome::Loss => Outcome::Win,
            Outcome::Tie => Outcome::Tie,
            Outcome::Win => Outcome::Loss,
        }
    }

    pub fn points(self) -> u32 {
        self as u32
    }

    pub fn value(self) -> f64 {
        f64::from(self.points())
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Outcome::Loss => "loss",
            Outcome::Tie => "tie",
            Outcome::Win => "win",
        };
        write!(f, "{}", s)
    }
}
