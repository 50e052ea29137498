//! Core Connect Four rules: the board, the two sides, and the round state
//! machine that plays a crowd-voted game on top of them.

mod board;
mod round;
mod side;

pub use board::{Board, Cell, DropResult, COLS, ROWS};
pub use round::{GameOutcome, ResolvedMove, Round, RoundStatus, RoundView};
pub use side::Side;
