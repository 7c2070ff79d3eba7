use serde::{Deserialize, Serialize};

use super::{CELL_COUNT, GRID_HEIGHT, GRID_WIDTH};

/// Coordinates of a cell on the board.
///
/// `x` is the column and `y` the row, both zero-based from the top-left corner.
/// Iteration helpers always yield positions in row-major order, which fixes the
/// order in which the rule interpreter scans the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Returns the position of the `index`-th cell in row-major order.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self {
            x: index % GRID_WIDTH,
            y: index / GRID_WIDTH,
        }
    }

    /// Returns the row-major index of this position.
    ///
    /// Only meaningful for in-bounds positions.
    #[must_use]
    pub const fn index(self) -> usize {
        self.y * GRID_WIDTH + self.x
    }

    #[must_use]
    pub const fn is_in_bounds(self) -> bool {
        self.x < GRID_WIDTH && self.y < GRID_HEIGHT
    }

    /// Iterates over every cell of the board in row-major order.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..CELL_COUNT).map(Position::from_index)
    }

    /// Iterates over the square of cells within Chebyshev distance `radius`,
    /// clipped to the board.
    ///
    /// The position itself is included.
    pub fn square(self, radius: usize) -> impl Iterator<Item = Position> {
        let x0 = self.x.saturating_sub(radius);
        let y0 = self.y.saturating_sub(radius);
        let x1 = usize::min(self.x.saturating_add(radius), GRID_WIDTH - 1);
        let y1 = usize::min(self.y.saturating_add(radius), GRID_HEIGHT - 1);
        (y0..=y1).flat_map(move |y| (x0..=x1).map(move |x| Position::new(x, y)))
    }

    /// Iterates over the (up to 8) adjacent cells.
    pub fn neighbors(self) -> impl Iterator<Item = Position> {
        self.square(1).filter(move |p| *p != self)
    }

    #[must_use]
    pub fn chebyshev_distance(self, other: Position) -> usize {
        usize::max(self.x.abs_diff(other.x), self.y.abs_diff(other.y))
    }

    /// Returns `true` if the cell lies within `margin` rows or columns of a boundary.
    ///
    /// A margin of 0 matches only the outermost ring.
    #[must_use]
    pub const fn is_near_edge(self, margin: usize) -> bool {
        self.x <= margin
            || self.y <= margin
            || self.x + margin >= GRID_WIDTH - 1
            || self.y + margin >= GRID_HEIGHT - 1
    }
}
