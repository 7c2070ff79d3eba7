/// Visibility of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::IsVariant)]
pub enum CellState {
    #[default]
    Hidden,
    Revealed,
    Flagged,
}

/// A single board cell.
///
/// Cells are only mutated through [`Board`](super::Board) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    is_mine: bool,
    neighboring_mines: u8,
    state: CellState,
}

impl Cell {
    pub(crate) const fn new(is_mine: bool, neighboring_mines: u8) -> Self {
        Self {
            is_mine,
            neighboring_mines,
            state: CellState::Hidden,
        }
    }

    #[must_use]
    pub const fn is_mine(&self) -> bool {
        self.is_mine
    }

    /// Returns the number of mines among the (up to 8) adjacent cells.
    ///
    /// Always 0 for a mine.
    #[must_use]
    pub const fn neighboring_mines(&self) -> u8 {
        self.neighboring_mines
    }

    #[must_use]
    pub const fn state(&self) -> CellState {
        self.state
    }

    pub(crate) const fn set_state(&mut self, state: CellState) {
        self.state = state;
    }
}
