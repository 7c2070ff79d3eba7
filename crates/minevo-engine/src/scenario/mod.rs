//! Reproducible game instances used as evaluation ground truth.
//!
//! - [`Scenario`] - A start cell plus a mine layout with a mine-free safe zone
//! - [`ScenarioBank`] - A fixed set of scenarios, generated once and persisted
//!
//! # Scenario Bank File Format
//!
//! The bank is stored as a sequence of fixed-size records until end-of-file,
//! all integers little-endian:
//!
//! ```text
//! start_x: i32
//! start_y: i32
//! mines:   [u8; GRID_WIDTH * GRID_HEIGHT]   row-major, 1 = mine, 0 = safe
//! ```
//!
//! There is no header: the record size is derived from the grid constants, so a
//! file written with other constants is detected as truncated or invalid.

pub use self::{game_scenario::*, scenario_bank::*};

mod bank_file;
mod game_scenario;
mod scenario_bank;
