//! Board state and rules.
//!
//! The board owns its nine cells exclusively; callers observe through
//! accessors and mutate only through `apply_move`, `advance_turn`, and
//! `reset`. Win/draw evaluation is a pure scan of the eight winning
//! triples in a fixed order, so the reported winning line is stable.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::cell::{Cell, Side};
use super::error::EngineError;

/// The eight winning triples, row-major rows, then columns, then
/// diagonals. Evaluation reports the first matching triple in this order.
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Corner cell indices, used by the selector's corner layer.
pub const CORNERS: [usize; 4] = [0, 2, 6, 8];

/// Center cell index.
pub const CENTER: usize = 4;

/// Terminal classification of a board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    Won(Side),
    Drawn,
}

impl GameStatus {
    /// Whether no further moves are accepted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

/// Result of a successful `apply_move`: which cell changed and the
/// re-evaluated status, with the winning triple when the move won.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub index: usize,
    pub side: Side,
    pub status: GameStatus,
    pub winning_line: Option<[usize; 3]>,
}

/// A 3x3 board plus the side to move.
///
/// Created fresh (all empty, X to move) at game start and on reset; once
/// terminal it is only ever replaced, never mutated further.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; 9],
    current_side: Side,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// A fresh board: all cells empty, X to move.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; 9],
            current_side: Side::X,
        }
    }

    /// Build a board from explicit cells and side to move. Test and
    /// analysis helper; `apply_move` is the only mutation path in play.
    #[must_use]
    pub fn from_cells(cells: [Cell; 9], to_move: Side) -> Self {
        Self {
            cells,
            current_side: to_move,
        }
    }

    /// The cell at `index` (0..8, row-major).
    #[must_use]
    pub fn cell(&self, index: usize) -> Cell {
        self.cells[index]
    }

    /// All nine cells, row-major.
    #[must_use]
    pub fn cells(&self) -> &[Cell; 9] {
        &self.cells
    }

    /// The side to move.
    #[must_use]
    pub fn current_side(&self) -> Side {
        self.current_side
    }

    /// Whether every cell is occupied.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }

    /// Indices of empty cells, ascending.
    #[must_use]
    pub fn empty_cells(&self) -> SmallVec<[usize; 9]> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_empty())
            .map(|(i, _)| i)
            .collect()
    }

    /// Evaluate the board: status plus the winning triple when won.
    ///
    /// Scans `WINNING_LINES` in order and reports the first triple whose
    /// three cells are equal and non-empty. Boards reachable through
    /// `apply_move` have at most one winner; for unreachable double-win
    /// boards the first triple in table order is reported.
    #[must_use]
    pub fn evaluate(&self) -> (GameStatus, Option<[usize; 3]>) {
        for line in WINNING_LINES {
            let [a, b, c] = line;
            if let Some(side) = self.cells[a].side() {
                if self.cells[b] == self.cells[a] && self.cells[c] == self.cells[a] {
                    return (GameStatus::Won(side), Some(line));
                }
            }
        }

        if self.is_full() {
            (GameStatus::Drawn, None)
        } else {
            (GameStatus::InProgress, None)
        }
    }

    /// The board's status without the winning line.
    #[must_use]
    pub fn status(&self) -> GameStatus {
        self.evaluate().0
    }

    /// Place `side` at `index`.
    ///
    /// Fails with `IllegalMove` if the index is out of range, the cell is
    /// occupied, or the game has already ended; the board is untouched on
    /// failure. Does not advance the turn - callers advance separately so
    /// the terminal side stays attributed to the move that ended the game.
    pub fn apply_move(&mut self, index: usize, side: Side) -> Result<MoveOutcome, EngineError> {
        if index >= 9 || !self.cells[index].is_empty() || self.status().is_terminal() {
            return Err(EngineError::IllegalMove { index });
        }

        self.cells[index] = side.cell();
        let (status, winning_line) = self.evaluate();

        Ok(MoveOutcome {
            index,
            side,
            status,
            winning_line,
        })
    }

    /// Flip the side to move. Only meaningful while the game is in
    /// progress; terminal boards are replaced, not advanced.
    pub fn advance_turn(&mut self) {
        self.current_side = self.current_side.opponent();
    }

    /// Replace this board with a fresh one.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
