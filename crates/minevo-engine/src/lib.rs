//! Minesweeper board model and the reproducible scenario bank used for training.
//!
//! - [`core`] - Grid geometry, cells, mine layouts and the [`Board`] state machine
//! - [`scenario`] - Fixed game instances ([`Scenario`]) and the persisted [`ScenarioBank`]
//!
//! Grid dimensions and the mine count are structural constants: a scenario bank
//! or population persisted with one set of constants cannot be reused with another.

use std::io;

pub use self::{core::*, scenario::*};

pub mod core;
pub mod scenario;

/// A scenario that breaks the mine-count or safe-zone invariants.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InvalidScenarioError {
    #[display("start cell ({x}, {y}) is outside the board")]
    StartOutOfBounds { x: i64, y: i64 },
    #[display("expected {expected} mines, found {actual}")]
    MineCount { expected: usize, actual: usize },
    #[display("mine at ({x}, {y}) lies inside the safe zone of the start cell")]
    MineInSafeZone { x: usize, y: usize },
}

/// Failure to load a scenario bank file.
///
/// Every variant is recoverable by regenerating the bank.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ScenarioBankError {
    #[display("failed to access scenario bank file: {_0}")]
    #[from]
    Io(#[error(source)] io::Error),
    #[display("scenario bank record #{index} is truncated")]
    TruncatedRecord { index: usize },
    #[display("scenario bank record #{index} is invalid: {source}")]
    InvalidScenario {
        index: usize,
        source: InvalidScenarioError,
    },
    #[display("scenario bank file contains no scenarios")]
    Empty,
}
