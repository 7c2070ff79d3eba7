use std::fmt;

use super::{CELL_COUNT, Cell, CellState, GRID_WIDTH, MineLayout, Position};

/// Minesweeper board state machine.
///
/// A board is built from a [`MineLayout`] with every cell hidden, and only ever
/// advances: cells go from hidden to revealed or flagged, never back.
///
/// # Terminal States
///
/// - **Game over** - set as soon as a mine is revealed
/// - **Won** - set when every non-mine cell has been revealed
///
/// The board itself does not refuse moves after a terminal state; callers that
/// play a game (the rule interpreter, the fitness evaluator) stop on their own.
///
/// # Example
///
/// ```
/// use minevo_engine::{Board, MineLayout, Position};
///
/// let layout = MineLayout::from_positions([Position::new(9, 9)]);
/// let mut board = Board::new(&layout);
///
/// // (0, 0) has no neighboring mine, so the reveal floods the whole board
/// // except the mine itself.
/// assert!(board.reveal(Position::new(0, 0)));
/// assert!(board.is_won());
/// assert!(!board.is_game_over());
/// ```
#[derive(Debug, Clone)]
pub struct Board {
    cells: [Cell; CELL_COUNT],
    mine_count: usize,
    revealed_safe_count: usize,
    game_over: bool,
    won: bool,
}

impl Board {
    #[must_use]
    pub fn new(layout: &MineLayout) -> Self {
        let mut cells = [Cell::default(); CELL_COUNT];
        for pos in Position::all() {
            let is_mine = layout.is_mine(pos);
            let count = if is_mine {
                0
            } else {
                layout.neighboring_mines(pos)
            };
            cells[pos.index()] = Cell::new(is_mine, count);
        }
        Self {
            cells,
            mine_count: layout.mine_count(),
            revealed_safe_count: 0,
            game_over: false,
            won: false,
        }
    }

    /// Returns the cell at `pos`, or `None` if it is outside the board.
    #[must_use]
    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        pos.is_in_bounds().then(|| &self.cells[pos.index()])
    }

    /// Iterates over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        Position::all().map(|pos| (pos, &self.cells[pos.index()]))
    }

    /// Iterates over the positions of all hidden cells in row-major order.
    pub fn hidden_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells()
            .filter(|(_, cell)| cell.state().is_hidden())
            .map(|(pos, _)| pos)
    }

    #[must_use]
    pub const fn mine_count(&self) -> usize {
        self.mine_count
    }

    #[must_use]
    pub const fn revealed_safe_count(&self) -> usize {
        self.revealed_safe_count
    }

    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        self.game_over
    }

    #[must_use]
    pub const fn is_won(&self) -> bool {
        self.won
    }

    /// Returns `true` once the game is either lost or won.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.game_over || self.won
    }

    /// Reveals the cell at `pos`.
    ///
    /// Does nothing if `pos` is outside the board or the cell is not hidden.
    /// Revealing a mine ends the game. Revealing a cell with no neighboring mine
    /// also reveals all its hidden neighbors, transitively, before the win
    /// condition is checked.
    ///
    /// Returns `true` if the board changed.
    pub fn reveal(&mut self, pos: Position) -> bool {
        if !self.cell(pos).is_some_and(|c| c.state().is_hidden()) {
            return false;
        }

        let mut worklist = vec![pos];
        while let Some(pos) = worklist.pop() {
            let cell = &mut self.cells[pos.index()];
            if !cell.state().is_hidden() {
                continue;
            }
            cell.set_state(CellState::Revealed);
            let (is_mine, is_zero) = (cell.is_mine(), cell.neighboring_mines() == 0);
            if is_mine {
                self.game_over = true;
                return true;
            }
            self.revealed_safe_count += 1;
            if is_zero {
                let cells = &self.cells;
                worklist.extend(
                    pos.neighbors()
                        .filter(|p| cells[p.index()].state().is_hidden()),
                );
            }
        }

        self.check_win_condition();
        true
    }

    /// Flags the cell at `pos`.
    ///
    /// Does nothing unless the cell is hidden. Returns `true` if the board changed.
    pub fn flag(&mut self, pos: Position) -> bool {
        if !self.cell(pos).is_some_and(|c| c.state().is_hidden()) {
            return false;
        }
        self.cells[pos.index()].set_state(CellState::Flagged);
        true
    }

    fn check_win_condition(&mut self) {
        let revealed_safe = self
            .cells
            .iter()
            .filter(|c| !c.is_mine() && c.state().is_revealed())
            .count();
        debug_assert_eq!(revealed_safe, self.revealed_safe_count);
        if revealed_safe == CELL_COUNT - self.mine_count {
            self.won = true;
        }
    }
}

impl fmt::Display for Board {
    /// Renders the board as text, one line per row.
    ///
    /// `#` hidden, `F` flagged, `*` revealed mine, `.` revealed empty cell,
    /// `1`-`8` revealed numbered cell.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pos, cell) in self.cells() {
            let ch = match cell.state() {
                CellState::Hidden => '#',
                CellState::Flagged => 'F',
                CellState::Revealed if cell.is_mine() => '*',
                CellState::Revealed => match cell.neighboring_mines() {
                    0 => '.',
                    n => char::from(b'0' + n),
                },
            };
            write!(f, "{ch}")?;
            if pos.x == GRID_WIDTH - 1 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GRID_HEIGHT;

    fn board_with_mines(mines: &[(usize, usize)]) -> Board {
        let layout = MineLayout::from_positions(mines.iter().map(|&(x, y)| Position::new(x, y)));
        Board::new(&layout)
    }

    fn state_at(board: &Board, x: usize, y: usize) -> CellState {
        board.cell(Position::new(x, y)).unwrap().state()
    }

    #[test]
    fn test_neighbor_counts() {
        let board = board_with_mines(&[(0, 0), (1, 0)]);
        assert_eq!(board.cell(Position::new(0, 1)).unwrap().neighboring_mines(), 2);
        assert_eq!(board.cell(Position::new(2, 1)).unwrap().neighboring_mines(), 1);
        assert_eq!(board.cell(Position::new(3, 3)).unwrap().neighboring_mines(), 0);
        assert_eq!(board.mine_count(), 2);
    }

    #[test]
    fn test_reveal_out_of_bounds_is_noop() {
        let mut board = board_with_mines(&[(5, 5)]);
        assert!(!board.reveal(Position::new(GRID_WIDTH, 0)));
        assert!(!board.reveal(Position::new(0, GRID_HEIGHT)));
        assert!(board.hidden_positions().count() == CELL_COUNT);
    }

    #[test]
    fn test_reveal_never_changes_revealed_or_flagged_cell() {
        let mut board = board_with_mines(&[(0, 0), (5, 5)]);

        let numbered = Position::new(1, 1);
        assert!(board.reveal(numbered));
        assert!(!board.reveal(numbered));
        assert_eq!(state_at(&board, 1, 1), CellState::Revealed);

        let flagged = Position::new(0, 0);
        assert!(board.flag(flagged));
        assert!(!board.reveal(flagged));
        assert_eq!(state_at(&board, 0, 0), CellState::Flagged);
        assert!(!board.is_game_over());
    }

    #[test]
    fn test_flag_never_affects_revealed_cell() {
        let mut board = board_with_mines(&[(0, 0)]);
        let pos = Position::new(1, 0);
        board.reveal(pos);
        assert!(!board.flag(pos));
        assert_eq!(state_at(&board, 1, 0), CellState::Revealed);

        let hidden = Position::new(0, 0);
        assert!(board.flag(hidden));
        assert!(!board.flag(hidden));
    }

    #[test]
    fn test_reveal_mine_ends_game() {
        let mut board = board_with_mines(&[(3, 3)]);
        assert!(board.reveal(Position::new(3, 3)));
        assert!(board.is_game_over());
        assert!(!board.is_won());
        assert!(board.is_terminal());
    }

    #[test]
    fn test_flood_reveals_zero_region_and_border_only() {
        // A vertical wall of mines at x = 4 splits the board.
        let mines: Vec<_> = (0..GRID_HEIGHT).map(|y| (4, y)).collect();
        let mut board = board_with_mines(&mines);

        assert!(board.reveal(Position::new(0, 0)));
        assert!(!board.is_game_over());

        for (pos, cell) in board.cells() {
            let expected = if pos.x <= 3 {
                CellState::Revealed
            } else {
                CellState::Hidden
            };
            assert_eq!(cell.state(), expected, "unexpected state at {pos:?}");
            assert!(!(cell.is_mine() && cell.state().is_revealed()));
        }
        // x = 3 is the numbered border, x <= 2 the zero region
        assert_eq!(board.cell(Position::new(3, 5)).unwrap().neighboring_mines(), 3);
        assert_eq!(board.revealed_safe_count(), 4 * GRID_HEIGHT);
    }

    #[test]
    fn test_flood_stops_at_flagged_cells() {
        let mut board = board_with_mines(&[(9, 9)]);
        board.flag(Position::new(2, 2));
        board.reveal(Position::new(0, 0));
        assert_eq!(state_at(&board, 2, 2), CellState::Flagged);
        assert!(!board.is_won());
        assert_eq!(board.revealed_safe_count(), CELL_COUNT - 2);
    }

    #[test]
    fn test_win_requires_every_safe_cell() {
        let mut board = board_with_mines(&[(0, 0)]);
        for pos in Position::all().filter(|p| *p != Position::new(0, 0)) {
            assert!(!board.is_won());
            board.reveal(pos);
        }
        assert!(board.is_won());
        assert!(!board.is_game_over());
    }

    #[test]
    fn test_start_in_corner_with_mines_outside_safe_zone() {
        // 10x10, 15 mines, none within the 3x3 zone around (0, 0)
        let mines = [
            (3, 0),
            (5, 1),
            (8, 2),
            (0, 3),
            (2, 4),
            (6, 4),
            (9, 4),
            (1, 6),
            (4, 6),
            (7, 7),
            (0, 8),
            (3, 8),
            (9, 8),
            (5, 9),
            (8, 9),
        ];
        let mut board = board_with_mines(&mines);
        assert_eq!(board.mine_count(), 15);

        board.reveal(Position::new(0, 0));
        assert_eq!(state_at(&board, 0, 0), CellState::Revealed);
        assert!(!board.is_game_over());
        assert!(
            board
                .cells()
                .all(|(_, c)| !(c.is_mine() && c.state().is_revealed()))
        );
    }

    #[test]
    fn test_display() {
        let mut board = board_with_mines(&[(9, 9)]);
        board.flag(Position::new(9, 9));
        board.reveal(Position::new(0, 0));
        let text = board.to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), GRID_HEIGHT);
        assert_eq!(lines[0], "..........");
        assert_eq!(lines[8], "........11");
        assert_eq!(lines[9], "........1F");
    }
}
