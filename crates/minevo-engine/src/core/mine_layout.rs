use super::{CELL_COUNT, Position};

/// Mine placement of a game, one flag per cell in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MineLayout {
    mines: [bool; CELL_COUNT],
}

impl Default for MineLayout {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl MineLayout {
    pub const EMPTY: Self = Self {
        mines: [false; CELL_COUNT],
    };

    /// Builds a layout with a mine at each given position.
    ///
    /// Out-of-bounds positions are ignored.
    pub fn from_positions<I>(positions: I) -> Self
    where
        I: IntoIterator<Item = Position>,
    {
        let mut layout = Self::EMPTY;
        for pos in positions {
            layout.set_mine(pos);
        }
        layout
    }

    /// Builds a layout from row-major cell flags.
    #[must_use]
    pub const fn from_cells(mines: [bool; CELL_COUNT]) -> Self {
        Self { mines }
    }

    /// Returns the row-major cell flags.
    #[must_use]
    pub const fn cells(&self) -> &[bool; CELL_COUNT] {
        &self.mines
    }

    #[must_use]
    pub fn is_mine(&self, pos: Position) -> bool {
        pos.is_in_bounds() && self.mines[pos.index()]
    }

    pub fn set_mine(&mut self, pos: Position) {
        if pos.is_in_bounds() {
            self.mines[pos.index()] = true;
        }
    }

    #[must_use]
    pub fn mine_count(&self) -> usize {
        self.mines.iter().filter(|m| **m).count()
    }

    pub fn mine_positions(&self) -> impl Iterator<Item = Position> + '_ {
        Position::all().filter(|pos| self.mines[pos.index()])
    }

    /// Counts mines among the cells adjacent to `pos`.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn neighboring_mines(&self, pos: Position) -> u8 {
        // at most 8
        pos.neighbors().filter(|p| self.is_mine(*p)).count() as u8
    }
}
