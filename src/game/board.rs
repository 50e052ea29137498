use std::fmt;

use serde::{Deserialize, Serialize};

use super::side::Side;
use crate::error::BoardError;

pub const ROWS: usize = 6;
pub const COLS: usize = 7;

/// Number of same-side pieces in a line that wins the game.
const CONNECT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    SideA,
    SideB,
}

impl Cell {
    /// The side occupying this cell, if any.
    pub fn side(self) -> Option<Side> {
        match self {
            Cell::Empty => None,
            Cell::SideA => Some(Side::A),
            Cell::SideB => Some(Side::B),
        }
    }
}

/// Where a dropped piece landed and whether it completed a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropResult {
    pub row: usize,
    pub column: usize,
    pub triggers_win: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Board {
            cells: [[Cell::Empty; COLS]; ROWS],
        }
    }

    /// Get the cell at a specific position
    /// Row 0 is the top, row 5 is the bottom
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    /// Row-major copy of the grid, top row first.
    pub fn cells(&self) -> [[Cell; COLS]; ROWS] {
        self.cells
    }

    /// Check if a column is full. Out-of-range columns count as full.
    pub fn is_column_full(&self, col: usize) -> bool {
        if col >= COLS {
            return true;
        }
        self.cells[0][col] != Cell::Empty
    }

    /// Number of pieces stacked in a column.
    pub fn column_height(&self, col: usize) -> usize {
        if col >= COLS {
            return 0;
        }
        (0..ROWS)
            .filter(|&row| self.cells[row][col] != Cell::Empty)
            .count()
    }

    pub fn piece_count(&self) -> usize {
        (0..COLS).map(|col| self.column_height(col)).sum()
    }

    /// Columns that still accept a piece, in ascending order.
    pub fn valid_columns(&self) -> Vec<usize> {
        (0..COLS).filter(|&col| !self.is_column_full(col)).collect()
    }

    /// Eligibility of every column in column order.
    pub fn valid_moves(&self) -> [bool; COLS] {
        let mut moves = [false; COLS];
        for (col, slot) in moves.iter_mut().enumerate() {
            *slot = !self.is_column_full(col);
        }
        moves
    }

    /// Drop a piece for `side` in a column and report whether it won.
    pub fn drop_piece(&mut self, col: usize, side: Side) -> Result<DropResult, BoardError> {
        if col >= COLS {
            return Err(BoardError::InvalidColumn(col));
        }

        if self.is_column_full(col) {
            return Err(BoardError::ColumnFull(col));
        }

        let row = (0..ROWS)
            .rev()
            .find(|&row| self.cells[row][col] == Cell::Empty)
            .ok_or(BoardError::ColumnFull(col))?;
        self.cells[row][col] = side.to_cell();

        Ok(DropResult {
            row,
            column: col,
            triggers_win: self.check_win(row, col),
        })
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        (0..COLS).all(|col| self.is_column_full(col))
    }

    /// Check if the piece at (row, col) is part of four in a row.
    ///
    /// Only lines through this cell are examined: a win can only be completed
    /// by the newest piece.
    pub fn check_win(&self, row: usize, col: usize) -> bool {
        let cell = self.get(row, col);
        if cell == Cell::Empty {
            return false;
        }

        // horizontal, vertical, diagonal /, diagonal \
        const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (-1, 1), (1, 1)];

        DIRECTIONS.iter().any(|&(dr, dc)| {
            let count =
                1 + self.run_length(row, col, dr, dc, cell) + self.run_length(row, col, -dr, -dc, cell);
            count >= CONNECT
        })
    }

    /// Count consecutive `cell` pieces starting next to (row, col) in one direction.
    fn run_length(&self, row: usize, col: usize, dr: isize, dc: isize, cell: Cell) -> usize {
        let mut count = 0;
        let mut r = row as isize + dr;
        let mut c = col as isize + dc;
        while r >= 0
            && c >= 0
            && (r as usize) < ROWS
            && (c as usize) < COLS
            && self.cells[r as usize][c as usize] == cell
        {
            count += 1;
            r += dr;
            c += dc;
        }
        count
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Plain-text grid, top row first: `A`/`B` pieces, `.` for empty cells.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let line: String = row
                .iter()
                .map(|cell| match cell {
                    Cell::Empty => '.',
                    Cell::SideA => 'A',
                    Cell::SideB => 'B',
                })
                .collect();
            writeln!(f, "{line}")?;
        }
        write!(f, "0123456")
    }
}
