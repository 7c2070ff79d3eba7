//! Fitness evaluation: scoring an agent over a batch of scenarios.
//!
//! This module implements the third level of the evaluator architecture: playing a
//! [`RuleAgent`] on every scenario of a batch and reducing the games to one fitness
//! value for the genetic algorithm.
//!
//! # How It Works
//!
//! For each scenario:
//!
//! 1. **Fresh Board** - Build the board from the scenario and reveal its start cell
//! 2. **Play** - Run [`RuleAgent::play_game`] up to the action limit
//! 3. **Score** - Summarize the final board as a [`GameOutcome`] and apply [`ScoreWeights`]
//!
//! The fitness of the agent is the mean score over the batch.
//!
//! # Score
//!
//! ```text
//! score = safe_revealed × 1
//!       + correct_flags × 5
//!       - mines_revealed × 50
//!       - actions × 0.1
//!       + 2000 if won
//! ```
//!
//! Wrong flags cost nothing directly; they only keep a game from being won.
//!
//! # Usage
//!
//! ```rust
//! use minevo_engine::ScenarioBank;
//! use minevo_evaluator::{
//!     fitness_evaluator::{DefaultFitnessEvaluator, FitnessEvaluator},
//!     rule_agent::RuleAgent,
//! };
//!
//! let bank = ScenarioBank::generate_with_seed(5, 42);
//! let evaluator = DefaultFitnessEvaluator::new();
//! let agent = RuleAgent::new(&[]);
//! let fitness = evaluator.evaluate(&agent, bank.scenarios(), &mut rand::rng());
//! assert!(fitness.is_finite());
//! assert_eq!(evaluator.counters().games_played(), 5);
//! ```

use std::{
    fmt,
    sync::atomic::{AtomicUsize, Ordering},
};

use minevo_engine::{Board, Scenario};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::rule_agent::{DEFAULT_ACTION_LIMIT, RuleAgent};

/// Summary of one finished (or cut off) game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameOutcome {
    pub safe_revealed: usize,
    pub correct_flags: usize,
    pub wrong_flags: usize,
    pub mines_revealed: usize,
    pub actions: usize,
    pub won: bool,
}

impl GameOutcome {
    #[must_use]
    pub fn from_board(board: &Board, actions: usize) -> Self {
        let mut outcome = Self {
            actions,
            won: board.is_won(),
            ..Self::default()
        };
        for (_, cell) in board.cells() {
            match (cell.is_mine(), cell.state()) {
                (false, state) if state.is_revealed() => outcome.safe_revealed += 1,
                (false, state) if state.is_flagged() => outcome.wrong_flags += 1,
                (true, state) if state.is_revealed() => outcome.mines_revealed += 1,
                (true, state) if state.is_flagged() => outcome.correct_flags += 1,
                _ => {}
            }
        }
        outcome
    }
}

/// Coefficients of the game score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub safe_revealed: f64,
    pub correct_flag: f64,
    pub mine_revealed: f64,
    pub action: f64,
    pub win_bonus: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            safe_revealed: 1.0,
            correct_flag: 5.0,
            mine_revealed: 50.0,
            action: 0.1,
            win_bonus: 2000.0,
        }
    }
}

impl ScoreWeights {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn score(&self, outcome: &GameOutcome) -> f64 {
        let mut score = outcome.safe_revealed as f64 * self.safe_revealed
            + outcome.correct_flags as f64 * self.correct_flag
            - outcome.mines_revealed as f64 * self.mine_revealed
            - outcome.actions as f64 * self.action;
        if outcome.won {
            score += self.win_bonus;
        }
        score
    }
}

/// Games played and won, shared between evaluation threads.
#[derive(Debug, Default)]
pub struct GameCounters {
    played: AtomicUsize,
    won: AtomicUsize,
}

impl GameCounters {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            played: AtomicUsize::new(0),
            won: AtomicUsize::new(0),
        }
    }

    pub fn record(&self, outcome: &GameOutcome) {
        self.played.fetch_add(1, Ordering::Relaxed);
        if outcome.won {
            self.won.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[must_use]
    pub fn games_played(&self) -> usize {
        self.played.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn games_won(&self) -> usize {
        self.won.load(Ordering::Relaxed)
    }

    /// Returns the fraction of recorded games that were won, or 0 if none were played.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn win_rate(&self) -> f64 {
        let played = self.games_played();
        if played == 0 {
            return 0.0;
        }
        self.games_won() as f64 / played as f64
    }

    /// Resets both counters, e.g. at the start of a generation.
    pub fn reset(&self) {
        self.played.store(0, Ordering::Relaxed);
        self.won.store(0, Ordering::Relaxed);
    }
}

/// Scores agents on scenarios.
///
/// Used by the genetic algorithm to compute fitness scores for individuals.
pub trait FitnessEvaluator: fmt::Debug + Send + Sync {
    /// Plays one scenario from a fresh board and returns the final board with its
    /// outcome.
    fn play_board(
        &self,
        agent: &RuleAgent<'_>,
        scenario: &Scenario,
        rng: &mut dyn RngCore,
    ) -> (Board, GameOutcome);

    /// Plays one scenario from a fresh board and returns its outcome.
    fn play_scenario(
        &self,
        agent: &RuleAgent<'_>,
        scenario: &Scenario,
        rng: &mut dyn RngCore,
    ) -> GameOutcome {
        self.play_board(agent, scenario, rng).1
    }

    /// Converts an outcome into a score (higher is better).
    fn score(&self, outcome: &GameOutcome) -> f64;

    /// Returns the counters every played game is recorded in.
    fn counters(&self) -> &GameCounters;

    /// Plays every scenario and returns the mean score, or 0 for an empty batch.
    fn evaluate(&self, agent: &RuleAgent<'_>, scenarios: &[Scenario], rng: &mut dyn RngCore)
    -> f64;
}

/// Default fitness evaluator: fixed action limit and [`ScoreWeights`].
///
/// Every game played through [`FitnessEvaluator::play_board`] is recorded in
/// the evaluator's [`GameCounters`].
#[derive(Debug)]
pub struct DefaultFitnessEvaluator {
    action_limit: usize,
    weights: ScoreWeights,
    counters: GameCounters,
}

impl Default for DefaultFitnessEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultFitnessEvaluator {
    #[must_use]
    pub fn new() -> Self {
        Self::with_params(DEFAULT_ACTION_LIMIT, ScoreWeights::default())
    }

    #[must_use]
    pub const fn with_params(action_limit: usize, weights: ScoreWeights) -> Self {
        Self {
            action_limit,
            weights,
            counters: GameCounters::new(),
        }
    }

    #[must_use]
    pub const fn action_limit(&self) -> usize {
        self.action_limit
    }

    #[must_use]
    pub const fn weights(&self) -> &ScoreWeights {
        &self.weights
    }
}

impl FitnessEvaluator for DefaultFitnessEvaluator {
    fn play_board(
        &self,
        agent: &RuleAgent<'_>,
        scenario: &Scenario,
        rng: &mut dyn RngCore,
    ) -> (Board, GameOutcome) {
        let mut board = scenario.new_board();
        board.reveal(scenario.start());
        let actions = agent.play_game(&mut board, self.action_limit, rng);
        let outcome = GameOutcome::from_board(&board, actions);
        self.counters.record(&outcome);
        (board, outcome)
    }

    fn score(&self, outcome: &GameOutcome) -> f64 {
        self.weights.score(outcome)
    }

    fn counters(&self) -> &GameCounters {
        &self.counters
    }

    #[expect(clippy::cast_precision_loss)]
    fn evaluate(
        &self,
        agent: &RuleAgent<'_>,
        scenarios: &[Scenario],
        rng: &mut dyn RngCore,
    ) -> f64 {
        if scenarios.is_empty() {
            return 0.0;
        }
        let mut total = 0.0;
        for scenario in scenarios {
            let outcome = self.play_scenario(agent, scenario, rng);
            total += self.score(&outcome);
        }
        total / scenarios.len() as f64
    }
}
