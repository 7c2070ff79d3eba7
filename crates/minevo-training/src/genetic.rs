//! Genetic algorithm implementation for evolving rule sets.
//!
//! This module implements a genetic algorithm (GA) that evolves populations of rule
//! sets to maximize fitness scores. The GA uses elitism, tournament selection,
//! multi-point crossover and per-field mutation to create new generations.
//!
//! # Algorithm Overview
//!
//! The genetic algorithm follows this cycle:
//!
//! 1. **Evaluate Fitness** - Each individual plays the generation's scenarios and receives a fitness score
//! 2. **Rank** - Individuals are sorted by fitness, best first
//! 3. **Elite Selection** - Top performers are copied unchanged into the next generation
//! 4. **Tournament Selection** - Select parents for reproduction using tournament selection
//! 5. **Crossover** - With probability `crossover_rate`, combine two parents into two offspring
//! 6. **Mutation** - Redraw individual rule fields with probability `mutation_rate`
//!
//! # Key Components
//!
//! - [`Individual`] - A single candidate solution (rule set + fitness score)
//! - [`Population`] - Collection of individuals evaluated together
//! - [`PopulationEvolver`] - Controls evolution parameters (selection, crossover, mutation)
//!
//! # Genetic Operators
//!
//! ## Tournament Selection
//!
//! Draw `tournament_size` individuals uniformly *with replacement* and keep the one with
//! the highest fitness. Larger tournaments mean stronger selection pressure.
//!
//! ## Multi-Point Crossover
//!
//! See [`rules::multi_point_crossover`](crate::rules::multi_point_crossover). Rules keep
//! their positions, so crossover mixes whole rules and never splits one.
//!
//! # Parallelization
//!
//! Fitness evaluation runs on a [`WorkerPool`]. Each individual is evaluated with its
//! own generator from [`SeedSource::evaluation_rng`], so fitness values do not depend
//! on the number of workers.
//!
//! # Ranking
//!
//! Ranking is a stable sort by descending fitness: individuals with equal fitness keep
//! their previous relative order.

use std::iter;

use minevo_engine::Scenario;
use minevo_evaluator::{fitness_evaluator::FitnessEvaluator, rule::Rule, rule_agent::RuleAgent};
use minevo_stats::{descriptive::DescriptiveStats, percentiles::Percentiles};
use rand::Rng;

use crate::{rules, scheduler::WorkerPool, seed::SeedSource};

/// Number of individuals in a population.
pub const POPULATION_SIZE: usize = 300;
/// Number of rules in every individual.
pub const RULE_COUNT: usize = 150;

/// A single individual in the genetic algorithm population.
///
/// An individual is a fixed-length rule set and the fitness it scored on the most
/// recent evaluation. Offspring start with a fitness of 0 until they are evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    rules: Vec<Rule>,
    fitness: f64,
}

impl Individual {
    #[must_use]
    pub fn new(rules: Vec<Rule>, fitness: f64) -> Self {
        Self { rules, fitness }
    }

    /// Creates an individual with `rule_count` uniformly random rules.
    pub fn random<R>(rng: &mut R, rule_count: usize) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::new(rules::random(rng, rule_count), 0.0)
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Returns the fitness from the most recent evaluation.
    ///
    /// Fitness is measured on one generation's scenario sample and is not
    /// comparable across generations.
    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Creates an agent that plays with this individual's rules.
    #[must_use]
    pub fn agent(&self) -> RuleAgent<'static> {
        RuleAgent::new(&self.rules)
    }
}

/// A population of individuals for genetic algorithm evolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    #[must_use]
    pub fn new(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    /// Creates `count` random individuals with `rule_count` rules each.
    pub fn random<R>(count: usize, rule_count: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let individuals = iter::repeat_with(|| Individual::random(rng, rule_count))
            .take(count)
            .collect();
        Self { individuals }
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Returns the first individual, which is the best one once the population is ranked.
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.first()
    }

    /// Evaluates fitness for all individuals in parallel, then ranks them.
    ///
    /// Every individual plays the same `scenarios`. Individual `i` draws its fallback
    /// moves from `seeds.evaluation_rng(generation, i)`.
    pub fn evaluate_fitness<E>(
        &mut self,
        scenarios: &[Scenario],
        evaluator: &E,
        pool: &WorkerPool,
        seeds: &SeedSource,
        generation: u64,
    ) where
        E: FitnessEvaluator + ?Sized,
    {
        let individuals = &self.individuals;
        let fitness = pool.map(individuals.len(), |i| {
            let agent = individuals[i].agent();
            let mut rng = seeds.evaluation_rng(generation, i as u64);
            evaluator.evaluate(&agent, scenarios, &mut rng)
        });
        for (ind, fitness) in iter::zip(&mut self.individuals, fitness) {
            ind.fitness = fitness;
        }
        self.rank();
    }

    /// Sorts individuals by descending fitness.
    ///
    /// The sort is stable, so ties keep their previous order.
    pub fn rank(&mut self) {
        self.individuals.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
    }

    #[must_use]
    pub fn is_ranked(&self) -> bool {
        self.individuals.is_sorted_by(|a, b| a.fitness >= b.fitness)
    }

    /// Computes descriptive statistics for fitness across all individuals.
    ///
    /// Returns `None` for an empty population.
    #[must_use]
    pub fn compute_fitness_stats(&self) -> Option<DescriptiveStats> {
        DescriptiveStats::new(self.individuals.iter().map(|ind| ind.fitness))
    }

    /// Computes fitness values at the given percentiles.
    #[must_use]
    pub fn compute_fitness_percentiles(&self, points: &[f64]) -> Percentiles {
        let values: Vec<_> = self.individuals.iter().map(|ind| ind.fitness).collect();
        Percentiles::new(&values, points)
    }

    /// Returns the mean [genetic distance](rules::genetic_distance) from every other
    /// individual to the first one.
    ///
    /// Values near 0 mean the population has converged on the best individual's rules.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean_distance_to_best(&self) -> f64 {
        let Some((best, rest)) = self.individuals.split_first() else {
            return 0.0;
        };
        if rest.is_empty() {
            return 0.0;
        }
        let total: f64 = rest
            .iter()
            .map(|ind| rules::genetic_distance(&best.rules, &ind.rules))
            .sum();
        total / rest.len() as f64
    }
}

/// Controls genetic algorithm evolution parameters.
///
/// This struct defines how populations evolve from one generation to the next,
/// including selection pressure, crossover behavior, and mutation rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationEvolver {
    /// Number of top individuals preserved unchanged (elitism)
    pub elite_count: usize,
    /// Tournament size for selection (larger = stronger selection pressure)
    pub tournament_size: usize,
    /// Probability that two parents are recombined rather than copied
    pub crossover_rate: f64,
    /// Probability of redrawing each rule field (per-field mutation rate)
    pub mutation_rate: f64,
}

impl Default for PopulationEvolver {
    fn default() -> Self {
        Self {
            elite_count: 2,
            tournament_size: 10,
            crossover_rate: 0.8,
            mutation_rate: 0.02,
        }
    }
}

impl PopulationEvolver {
    /// Evolves the population to create the next generation.
    ///
    /// 1. Copies the top `elite_count` individuals unchanged
    /// 2. Fills the remaining slots with offspring pairs: two tournament winners are
    ///    recombined (or copied), then both children are mutated
    /// 3. If only one slot remains, the second child of the last pair is dropped
    ///
    /// # Panics
    ///
    /// Panics if `population` is not ranked, or if it is non-empty and
    /// `tournament_size` is 0.
    #[must_use]
    pub fn evolve<R>(&self, population: &Population, rng: &mut R) -> Population
    where
        R: Rng + ?Sized,
    {
        assert!(population.is_ranked(), "population must be ranked before evolving");
        let size = population.len();
        let mut next_individuals = Vec::with_capacity(size);

        // elite selection
        let elite_count = self.elite_count.min(size);
        next_individuals.extend(population.individuals[..elite_count].iter().cloned());

        // generate the rest individuals
        while next_individuals.len() < size {
            let p1 = tournament_select(&population.individuals, self.tournament_size, rng);
            let p2 = tournament_select(&population.individuals, self.tournament_size, rng);

            let (mut c1, mut c2) = if rng.random_bool(self.crossover_rate) {
                rules::multi_point_crossover(&p1.rules, &p2.rules, rng)
            } else {
                (p1.rules.clone(), p2.rules.clone())
            };
            rules::mutate(&mut c1, self.mutation_rate, rng);
            rules::mutate(&mut c2, self.mutation_rate, rng);

            next_individuals.push(Individual::new(c1, 0.0));
            if next_individuals.len() < size {
                next_individuals.push(Individual::new(c2, 0.0));
            }
        }

        Population::new(next_individuals)
    }
}

/// Selects an individual using tournament selection.
///
/// Draws `tournament_size` individuals with replacement and returns the one with
/// the highest fitness (the earliest drawn on ties).
fn tournament_select<'a, R>(
    population: &'a [Individual],
    tournament_size: usize,
    rng: &mut R,
) -> &'a Individual
where
    R: Rng + ?Sized,
{
    assert!(tournament_size > 0);
    let mut winner = &population[rng.random_range(0..population.len())];
    for _ in 1..tournament_size {
        let candidate = &population[rng.random_range(0..population.len())];
        if candidate.fitness > winner.fitness {
            winner = candidate;
        }
    }
    winner
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use minevo_engine::ScenarioBank;
    use minevo_evaluator::fitness_evaluator::DefaultFitnessEvaluator;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn population_with_fitness(fitness: &[f64], rng: &mut Pcg32) -> Population {
        Population::new(
            fitness
                .iter()
                .map(|&f| Individual::new(rules::random(rng, 10), f))
                .collect(),
        )
    }

    #[test]
    fn test_rank_is_stable() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut population = population_with_fitness(&[1.0, 3.0, 1.0, 3.0, 2.0], &mut rng);
        let before = population.clone();
        population.rank();
        assert!(population.is_ranked());
        let order: Vec<_> = population
            .individuals()
            .iter()
            .map(|ind| {
                before
                    .individuals()
                    .iter()
                    .position(|b| b == ind)
                    .unwrap()
            })
            .collect();
        assert_eq!(order, [1, 3, 4, 0, 2]);
    }

    #[test]
    fn test_tournament_of_whole_population_picks_best() {
        let mut rng = Pcg32::seed_from_u64(1);
        let population = population_with_fitness(&[5.0, 4.0, 3.0, 2.0, 1.0], &mut rng);
        // a large tournament almost surely contains the best individual
        for _ in 0..20 {
            let winner = tournament_select(population.individuals(), 200, &mut rng);
            assert!((winner.fitness() - 5.0).abs() < f64::EPSILON);
        }
        // a tournament of one is a uniform draw
        let mut seen = [false; 5];
        for _ in 0..500 {
            let winner = tournament_select(population.individuals(), 1, &mut rng);
            let f = winner.fitness();
            seen[5 - f as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_evolve_keeps_size_and_elites() {
        let mut rng = Pcg32::seed_from_u64(2);
        for size in [1, 2, 3, 7, 30] {
            let mut population = Population::random(size, RULE_COUNT, &mut rng);
            for (i, ind) in population.individuals.iter_mut().enumerate() {
                ind.fitness = -(i as f64);
            }
            let evolver = PopulationEvolver::default();
            let next = evolver.evolve(&population, &mut rng);
            assert_eq!(next.len(), size);
            let elites = evolver.elite_count.min(size);
            assert_eq!(next.individuals()[..elites], population.individuals()[..elites]);
            for ind in next.individuals() {
                assert_eq!(ind.rules().len(), RULE_COUNT);
                assert!(ind.rules().iter().all(Rule::is_valid));
            }
        }
    }

    #[test]
    fn test_evolve_without_variation_copies_parents() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut population = Population::random(11, 20, &mut rng);
        population.rank();
        let evolver = PopulationEvolver {
            elite_count: 0,
            tournament_size: 3,
            crossover_rate: 0.0,
            mutation_rate: 0.0,
        };
        let next = evolver.evolve(&population, &mut rng);
        assert_eq!(next.len(), 11);
        for ind in next.individuals() {
            assert!(population.individuals().iter().any(|p| p.rules() == ind.rules()));
            assert!(ind.fitness().abs() < f64::EPSILON);
        }
    }

    #[test]
    #[should_panic(expected = "must be ranked")]
    fn test_evolve_requires_ranked_population() {
        let mut rng = Pcg32::seed_from_u64(4);
        let population = population_with_fitness(&[1.0, 2.0], &mut rng);
        let _ = PopulationEvolver::default().evolve(&population, &mut rng);
    }

    #[test]
    fn test_evaluate_fitness_is_independent_of_workers() {
        let mut rng = Pcg32::seed_from_u64(5);
        let bank = ScenarioBank::generate(10, &mut rng);
        let population = Population::random(12, 30, &mut rng);
        let evaluator = DefaultFitnessEvaluator::new();
        let seeds = SeedSource::new(7);

        let mut results = vec![];
        for workers in [1, 4] {
            let mut population = population.clone();
            let pool = WorkerPool::new(NonZeroUsize::new(workers).unwrap());
            population.evaluate_fitness(bank.scenarios(), &evaluator, &pool, &seeds, 1);
            assert!(population.is_ranked());
            results.push(population);
        }
        assert_eq!(results[0], results[1]);
    }

    #[test]
    fn test_fitness_stats_and_diversity() {
        let mut rng = Pcg32::seed_from_u64(6);
        assert!(Population::default().compute_fitness_stats().is_none());
        assert!(Population::default().mean_distance_to_best().abs() < f64::EPSILON);

        let population = population_with_fitness(&[4.0, 2.0, 0.0], &mut rng);
        let stats = population.compute_fitness_stats().unwrap();
        assert!((stats.mean - 2.0).abs() < f64::EPSILON);
        assert!((stats.max - 4.0).abs() < f64::EPSILON);
        let quartiles = population.compute_fitness_percentiles(&[50.0]);
        assert_eq!(quartiles.get(50.0), Some(2.0));

        let distance = population.mean_distance_to_best();
        assert!(distance > 0.0 && distance <= 1.0);

        let best = population.individuals()[0].clone();
        let clones = Population::new(vec![best.clone(), best.clone(), best]);
        assert!(clones.mean_distance_to_best().abs() < f64::EPSILON);
    }
}
