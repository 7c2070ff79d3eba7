//! The evolutionary loop.
//!
//! A [`Trainer`] owns the population, the scenario bank and the fitness evaluator,
//! and advances one generation per [`step`](Trainer::step):
//!
//! ```text
//! Init ─→ Evaluate ─→ Rank ─→ Reproduce ─┬─→ Evaluate ─→ …
//!                                        └─→ Persist (every `save_interval` generations)
//! ```
//!
//! - **Init** - Load the population file if its shape matches, otherwise start from a
//!   random population
//! - **Evaluate** - Sample the generation's scenarios from the bank and score every
//!   individual on them in parallel
//! - **Rank** - Sort by fitness, best first, and summarize the generation in a
//!   [`GenerationReport`]
//! - **Reproduce** - Build the next population with the [`PopulationEvolver`]
//! - **Persist** - Write the population file
//!
//! The loop has no terminal condition of its own; callers decide how many steps to run
//! and call [`Trainer::save`] on a clean stop.

use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use minevo_engine::ScenarioBank;
use minevo_evaluator::fitness_evaluator::FitnessEvaluator;
use minevo_stats::{descriptive::DescriptiveStats, percentiles::Percentiles};

use crate::{
    genetic::{Individual, POPULATION_SIZE, Population, PopulationEvolver, RULE_COUNT},
    population_file::PopulationFileError,
    scheduler::WorkerPool,
    seed::SeedSource,
};

/// Number of scenarios sampled from the bank for each generation.
pub const SCENARIOS_PER_GENERATION: usize = 20;
/// Number of generations between two population saves.
pub const SAVE_INTERVAL: NonZeroUsize = NonZeroUsize::new(5).unwrap();

const QUARTILES: [f64; 3] = [25.0, 50.0, 75.0];

/// Parameters of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingParams {
    pub population_size: usize,
    pub rule_count: usize,
    pub scenarios_per_generation: usize,
    pub save_interval: NonZeroUsize,
    pub seed: u64,
    pub evolver: PopulationEvolver,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            population_size: POPULATION_SIZE,
            rule_count: RULE_COUNT,
            scenarios_per_generation: SCENARIOS_PER_GENERATION,
            save_interval: SAVE_INTERVAL,
            seed: 0,
            evolver: PopulationEvolver::default(),
        }
    }
}

/// Summary of one evaluated generation.
///
/// Fitness values are measured on this generation's scenario sample only.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub generation: u64,
    /// `None` only for an empty population.
    pub fitness: Option<DescriptiveStats>,
    pub fitness_quartiles: Percentiles,
    pub games_played: usize,
    pub games_won: usize,
    /// Mean normalized genetic distance from every individual to the best one.
    pub diversity: f64,
    pub elapsed: Duration,
}

impl GenerationReport {
    /// Returns the fraction of this generation's games that were won.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.games_won as f64 / self.games_played as f64
    }

    fn log(&self) {
        let Some(fitness) = &self.fitness else {
            tracing::warn!(generation = self.generation, "population is empty");
            return;
        };
        tracing::info!(
            generation = self.generation,
            best = fitness.max,
            mean = fitness.mean,
            median = fitness.median,
            min = fitness.min,
            std_dev = fitness.std_dev,
            win_rate = self.win_rate(),
            diversity = self.diversity,
            elapsed = ?self.elapsed,
            "fitness on this generation's sample"
        );
        for (p, value) in self.fitness_quartiles.iter() {
            tracing::debug!(generation = self.generation, percentile = p, fitness = value);
        }
    }
}

/// Runs the genetic algorithm over a fixed scenario bank.
#[derive(Debug)]
pub struct Trainer<E> {
    params: TrainingParams,
    bank: ScenarioBank,
    evaluator: E,
    pool: WorkerPool,
    seeds: SeedSource,
    population_path: PathBuf,
    population: Population,
    best: Option<Individual>,
    generation: u64,
}

impl<E> Trainer<E>
where
    E: FitnessEvaluator,
{
    /// Creates a trainer, loading the population at `population_path` if it matches
    /// `params`, or starting from a random population otherwise.
    ///
    /// Generation numbers always restart at 1. A resumed run draws from
    /// [`SeedSource::resumed`] so that it does not replay the random streams of the
    /// run that saved the population.
    pub fn new<P>(
        params: TrainingParams,
        bank: ScenarioBank,
        evaluator: E,
        pool: WorkerPool,
        population_path: P,
    ) -> Self
    where
        P: Into<PathBuf>,
    {
        let population_path = population_path.into();
        let seeds = SeedSource::new(params.seed);
        let (population, seeds) = match load_saved_population(&population_path, &params) {
            Some(population) => {
                let seeds = seeds.resumed(&population);
                (population, seeds)
            }
            None => {
                let mut rng = seeds.init_rng();
                let population =
                    Population::random(params.population_size, params.rule_count, &mut rng);
                (population, seeds)
            }
        };
        Self {
            params,
            bank,
            evaluator,
            pool,
            seeds,
            population_path,
            population,
            best: None,
            generation: 0,
        }
    }

    #[must_use]
    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    /// Returns the current population.
    ///
    /// After a [`step`](Self::step) this is the freshly reproduced, not yet evaluated
    /// generation.
    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    #[must_use]
    pub fn seeds(&self) -> &SeedSource {
        &self.seeds
    }

    /// Returns the best individual of the most recently evaluated generation.
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.best.as_ref()
    }

    /// Returns the number of generations evaluated so far.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Evaluates, ranks and reproduces one generation.
    ///
    /// Persists the new population every `save_interval` generations. A failed save
    /// is logged and training continues.
    pub fn step(&mut self) -> GenerationReport {
        let start = Instant::now();
        self.generation += 1;
        let generation = self.generation;
        let mut rng = self.seeds.generation_rng(generation);

        // evaluate and rank
        let scenarios = self
            .bank
            .sample(self.params.scenarios_per_generation, &mut rng);
        let counters = self.evaluator.counters();
        counters.reset();
        self.population.evaluate_fitness(
            &scenarios,
            &self.evaluator,
            &self.pool,
            &self.seeds,
            generation,
        );
        let report = GenerationReport {
            generation,
            fitness: self.population.compute_fitness_stats(),
            fitness_quartiles: self.population.compute_fitness_percentiles(&QUARTILES),
            games_played: counters.games_played(),
            games_won: counters.games_won(),
            diversity: self.population.mean_distance_to_best(),
            elapsed: start.elapsed(),
        };
        report.log();
        self.best = self.population.best().cloned();

        // reproduce
        self.population = self.params.evolver.evolve(&self.population, &mut rng);

        // persist
        if generation % self.params.save_interval.get() as u64 == 0 {
            match self.save() {
                Ok(()) => tracing::info!(
                    generation,
                    path = %self.population_path.display(),
                    "saved population"
                ),
                Err(err) => tracing::warn!(
                    generation,
                    path = %self.population_path.display(),
                    error = %err,
                    "failed to save population"
                ),
            }
        }

        report
    }

    /// Writes the current population to the population file.
    pub fn save(&self) -> Result<(), PopulationFileError> {
        self.population.save(&self.population_path)
    }
}

fn load_saved_population(path: &Path, params: &TrainingParams) -> Option<Population> {
    match Population::load(path, params.population_size, params.rule_count) {
        Ok(population) => {
            tracing::info!(
                path = %path.display(),
                individuals = population.len(),
                "loaded population"
            );
            Some(population)
        }
        Err(PopulationFileError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no saved population found, starting fresh");
            None
        }
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "discarding incompatible population, starting fresh"
            );
            None
        }
    }
}
