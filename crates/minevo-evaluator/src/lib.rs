//! Rule-based agents and the fitness protocol used to score them.
//!
//! This crate implements a three-level evaluation architecture:
//!
//! 1. **Rules** ([`rule`], [`pattern`]) - A [`Rule`](rule::Rule) is one gene: a set of
//!    conditions on a revealed cell's neighborhood plus an action to take when they hold.
//!
//! 2. **Rule Agent** ([`rule_agent`]) - Executes an individual's rules against a board in
//!    priority order, falling back to a random reveal when no rule applies.
//!
//! 3. **Fitness Evaluation** ([`fitness_evaluator`]) - Plays an agent on a batch of
//!    scenarios and turns each game's outcome into a score. The mean score is the
//!    individual's fitness.
//!
//! # Architecture
//!
//! ```text
//! Fitness Evaluation (mean score over scenarios)
//!     ↓ plays games with
//! Rule Agent (prioritized rule scan + random fallback)
//!     ↓ fires
//! Rules (conditions → reveal / flag)
//! ```
//!
//! # Design Principles
//!
//! ## No Failure Outcomes
//!
//! Evaluating an agent cannot fail. A bad agent simply scores badly: revealing a mine
//! ends its game with a large penalty, and a game that stops making progress is cut
//! off by the per-game action limit.
//!
//! ## Deterministic Given an RNG
//!
//! The only randomness is the fallback reveal. Every entry point takes the random
//! number generator as an argument, so a seeded generator reproduces a game exactly.
//!
//! # Current Limitations
//!
//! - **Local conditions only**: Rules see one cell's neighborhood counts; they cannot
//!   reason about constraints shared between neighboring numbers.
//! - **Single pattern predicate**: `has_pattern` consults one
//!   [`CellPattern`](pattern::CellPattern) per agent rather than a per-rule pattern.

pub mod fitness_evaluator;
pub mod pattern;
pub mod rule;
pub mod rule_agent;
