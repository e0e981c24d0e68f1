//! Tic Tac Toe rules on an N x N board.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::board_game::{Cell, Outcome, Player};

use Cell::{Empty, Full};
use Player::{P1, P2};

pub const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";

/// N cell indexes that win the game when one player owns all of them.
pub type Line = Vec<usize>;

/// Every row, every column and both diagonals of a size x size board.
pub fn lines(size: usize) -> Vec<Line> {
    let mut lines = Vec::with_capacity(2 * size + 2);
    for row in 0..size {
        lines.push((0..size).map(|col| row * size + col).collect());
    }
    for col in 0..size {
        lines.push((0..size).map(|row| row * size + col).collect());
    }
    // \ diag
    lines.push((0..size).map(|i| i * (size + 1)).collect());
    // / diag
    lines.push((0..size).map(|i| (i + 1) * (size - 1)).collect());
    lines
}

/// Store the size and state of the tic-tac-toe board.
///
/// Boards are values: nothing mutates a board once it is built, every move produces a new one via
/// [`Board::with_move`]. The winning lines are computed once in [`Board::new`] and shared by every
/// board derived from it.
#[derive(Clone)]
pub struct Board {
    // dimension of the board (total number of cells = size * size)
    size: usize,
    // for example: 3x3 grid would be a vec of length 9
    cells: Vec<Cell>,
    lines: Arc<[Line]>,
}

/// Return a new all-empty board of (size * size) cells.
pub fn initial_board(size: usize) -> Board {
    Board::new(size)
}

impl Board {
    pub fn new(size: usize) -> Board {
        assert!(size >= 1, "board size must be at least 1");
        Board {
            size,
            cells: vec![Empty; size * size],
            lines: lines(size).into(),
        }
    }

    /// Build a position directly from its cells, row by row.
    pub fn from_cells(size: usize, cells: Vec<Cell>) -> Board {
        assert_eq!(
            cells.len(),
            size * size,
            "a {}x{} board needs {} cells",
            size,
            size,
            size * size
        );
        Board {
            cells,
            ..Board::new(size)
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn empty_cells(&self) -> usize {
        self.cells.iter().filter(|&&c| c == Empty).count()
    }

    /// A copy of this board with `player` placed on cell `idx`.
    ///
    /// Panics if the cell is out of range or taken: callers only ever write to cells they got
    /// from the board itself.
    pub fn with_move(&self, idx: usize, player: Player) -> Board {
        assert!(
            idx < self.cells.len(),
            "cell {} out of range for a {}x{} board",
            idx,
            self.size,
            self.size
        );
        assert_eq!(self.cells[idx], Empty, "cell {} is already taken", idx);
        let mut cells = self.cells.clone();
        cells[idx] = Full(player);
        Board {
            size: self.size,
            cells,
            lines: Arc::clone(&self.lines),
        }
    }

    /// Every board reachable by `player` placing one piece, in increasing cell index order.
    pub fn legal_moves(&self, player: Player) -> impl Iterator<Item = Board> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| cell == Empty)
            .map(move |(idx, _)| self.with_move(idx, player))
    }

    /// Win if `player` owns a whole line, Loss if the opponent does, Tie if no line is owned and
    /// the board is full, None while the game goes on.
    ///
    /// All lines are checked before the board is declared a tie, so a board filled by its
    /// winning move is still a win.
    pub fn terminal_score(&self, player: Player) -> Option<Outcome> {
        let opponent = player.get_opponent();
        for line in self.lines.iter() {
            if self.player_fills_line(player, line) {
                return Some(Outcome::Win);
            }
            if self.player_fills_line(opponent, line) {
                return Some(Outcome::Loss);
            }
        }
        if self.cells.iter().all(|&c| c != Empty) {
            return Some(Outcome::Tie);
        }
        None
    }

    /// The cell that was filled to get from this board to `next`, if `next` is exactly one move
    /// ahead of it.
    pub fn move_index(&self, next: &Board) -> Option<usize> {
        if self.size != next.size {
            return None;
        }
        let mut changed = self
            .cells
            .iter()
            .zip(next.cells.iter())
            .enumerate()
            .filter(|(_, (a, b))| a != b);
        match (changed.next(), changed.next()) {
            (Some((idx, (Empty, Full(_)))), None) => Some(idx),
            _ => None,
        }
    }

    /// Network input for this position: one value per cell (+1 P1, -1 P2, 0 empty) followed by
    /// the perspective flag of `player`.
    pub fn encode(&self, player: Player) -> Vec<f64> {
        let mut input: Vec<f64> = self.cells.iter().map(|c| c.value()).collect();
        input.push(player.sign());
        input
    }

    /// Return if the line is filled with cells of type player.
    fn player_fills_line(&self, player: Player, line: &[usize]) -> bool {
        line.iter().all(|&i| self.cells[i] == Full(player))
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Board) -> bool {
        self.size == other.size && self.cells == other.cells
    }
}

impl Eq for Board {}

impl Hash for Board {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.size.hash(state);
        self.cells.hash(state);
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let board_repr: String = self.cells.iter().map(|&c| cell_char(c)).collect();
        write!(
            f,
            "Board {{ size: {}, cells: [{}] }}",
            self.size, board_repr
        )
    }
}

/// Print the board with the column and row labels:
///
///   abc
/// 0 ...
/// 1 ...
/// 2 ...
///
/// NOTE: row labels are single digits, so boards larger than 10 are printed without them.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let labelled = self.size <= 10;
        if labelled {
            writeln!(f, "  {}", &ALPHABET[..self.size])?;
        }
        for i in 0..self.size {
            let mut row = String::with_capacity(self.size + 2);
            if labelled {
                row.push_str(&format!("{:<2}", i));
            }
            for j in 0..self.size {
                row.push(cell_char(self.cells[i * self.size + j]));
            }
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}

fn cell_char(cell: Cell) -> char {
    match cell {
        Empty => '.',
        Full(P1) => 'x',
        Full(P2) => 'o',
    }
}
