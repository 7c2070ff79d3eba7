//! Cell pattern predicates consulted by rules with `has_pattern` set.
//!
//! A rule's `has_pattern` flag only says "the pattern must hold"; what the pattern
//! is belongs to the agent. The default, [`NumberPattern::DEFAULT`], matches a
//! revealed cell showing exactly two neighboring mines.

use std::fmt;

use minevo_engine::{Board, Position};

/// A predicate over one revealed cell and its surroundings.
pub trait CellPattern: fmt::Debug + Send + Sync {
    /// Returns `true` if the pattern holds at `pos`.
    fn matches(&self, board: &Board, pos: Position) -> bool;
}

/// Matches cells whose own mine count equals `number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberPattern {
    number: u8,
}

impl NumberPattern {
    pub const DEFAULT: Self = Self::new(2);

    #[must_use]
    pub const fn new(number: u8) -> Self {
        Self { number }
    }

    #[must_use]
    pub const fn number(&self) -> u8 {
        self.number
    }
}

impl Default for NumberPattern {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl CellPattern for NumberPattern {
    fn matches(&self, board: &Board, pos: Position) -> bool {
        board
            .cell(pos)
            .is_some_and(|cell| cell.neighboring_mines() == self.number)
    }
}
