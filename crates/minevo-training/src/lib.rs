//! Training system for evolving rule-based Minesweeper agents using a genetic algorithm.
//!
//! Each individual is a fixed-length list of rules. Its fitness is the mean score of
//! the agent built from those rules over a sample of scenarios from the scenario
//! bank (see `minevo-evaluator`).
//!
//! # How Training Works
//!
//! 1. **Population** - Load the saved population, or create one with random rules
//! 2. **Evaluation** - Each individual plays the generation's scenario sample, in parallel
//! 3. **Ranking** - Individuals are sorted by fitness, best first
//! 4. **Reproduction** - Elites are copied; the rest of the next generation comes from
//!    tournament selection, multi-point crossover and per-field mutation
//! 5. **Persistence** - The population file is rewritten every few generations
//! 6. **Repeat** - Until the caller stops the loop
//!
//! # Architecture
//!
//! ```text
//! Trainer (trainer)
//!     ↓ drives
//! Population / PopulationEvolver (genetic)
//!     ↓ operate on
//! Rule lists (rules)
//!     ↓ played by
//! RuleAgent + FitnessEvaluator (minevo-evaluator)
//!     ↓ on
//! Scenario sample (minevo-engine)
//! ```
//!
//! Evaluation tasks are spread over a [`WorkerPool`](scheduler::WorkerPool). Every task
//! draws from its own generator derived by [`SeedSource`](seed::SeedSource), so a run is
//! reproducible for a given base seed regardless of the number of workers.
//!
//! # Genetic Algorithm Parameters
//!
//! - **Population size** - 300 individuals
//! - **Rule count** - 150 rules per individual
//! - **Elite count** - 2 individuals copied unchanged
//! - **Tournament size** - 10 contestants, drawn with replacement
//! - **Crossover rate** - 0.8
//! - **Mutation rate** - 0.02 per rule field
//!
//! # Example
//!
//! ```rust,no_run
//! use minevo_engine::ScenarioBank;
//! use minevo_evaluator::fitness_evaluator::DefaultFitnessEvaluator;
//! use minevo_training::{
//!     scheduler::WorkerPool,
//!     trainer::{Trainer, TrainingParams},
//! };
//!
//! let bank = ScenarioBank::load_or_generate(
//!     "scenarios.dat",
//!     ScenarioBank::DEFAULT_SIZE,
//!     &mut rand::rng(),
//! );
//! let mut trainer = Trainer::new(
//!     TrainingParams::default(),
//!     bank,
//!     DefaultFitnessEvaluator::new(),
//!     WorkerPool::default(),
//!     "population.dat",
//! );
//! for _ in 0..100 {
//!     trainer.step();
//! }
//! trainer.save()?;
//! # Ok::<(), minevo_training::population_file::PopulationFileError>(())
//! ```
//!
//! # Current Limitations
//!
//! - **Sampled fitness**: Fitness is measured on a small per-generation sample, so the
//!   reported best fitness is noisy and elites are re-scored every generation
//! - **Simple GA**: No adaptive mutation rates, niching or island models

pub mod genetic;
pub mod population_file;
pub mod rules;
pub mod scheduler;
pub mod seed;
pub mod trainer;
