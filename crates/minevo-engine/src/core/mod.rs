//! Grid geometry and the Minesweeper board state machine.
//!
//! - [`Position`] - Cell coordinates with neighborhood iteration
//! - [`Cell`] / [`CellState`] - Per-cell mine flag, neighbor count and visibility
//! - [`MineLayout`] - Where the mines are; the immutable ground truth of a game
//! - [`Board`] - Reveal/flag transitions, flood reveal and win detection

pub use self::{board::*, cell::*, mine_layout::*, position::*};

pub(crate) mod board;
pub(crate) mod cell;
pub(crate) mod mine_layout;
pub(crate) mod position;

/// Number of columns of the board.
pub const GRID_WIDTH: usize = 10;
/// Number of rows of the board.
pub const GRID_HEIGHT: usize = 10;
/// Total number of cells of the board.
pub const CELL_COUNT: usize = GRID_WIDTH * GRID_HEIGHT;
/// Number of mines in every scenario.
pub const MINE_COUNT: usize = 15;

const _: () = assert!(MINE_COUNT + 9 <= CELL_COUNT, "mines must fit outside the safe zone");
