use std::{num::NonZeroUsize, path::PathBuf};

use anyhow::Context as _;
use minevo_engine::ScenarioBank;
use minevo_evaluator::fitness_evaluator::DefaultFitnessEvaluator;
use minevo_training::{
    genetic::{POPULATION_SIZE, RULE_COUNT},
    scheduler::WorkerPool,
    trainer::{SAVE_INTERVAL, SCENARIOS_PER_GENERATION, Trainer, TrainingParams},
};
use rand::SeedableRng as _;
use rand_pcg::Pcg32;

use super::{DEFAULT_POPULATION_PATH, DEFAULT_SCENARIOS_PATH};
use crate::{model::agent_model::AgentModel, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Population file, resumed from if it matches and rewritten during training
    #[arg(long, default_value = DEFAULT_POPULATION_PATH)]
    population: PathBuf,
    /// Scenario bank file, generated if missing or unusable
    #[arg(long, default_value = DEFAULT_SCENARIOS_PATH)]
    scenarios: PathBuf,
    /// Base seed for every random draw (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Stop after this many generations (runs until killed if omitted)
    #[arg(long)]
    generations: Option<u64>,
    /// Number of generations between population saves
    #[arg(long, default_value_t = SAVE_INTERVAL)]
    save_interval: NonZeroUsize,
    /// Number of evaluation threads (one per CPU if omitted)
    #[arg(long)]
    threads: Option<NonZeroUsize>,
    /// Number of individuals
    #[arg(long, default_value_t = POPULATION_SIZE)]
    population_size: usize,
    /// Number of rules per individual
    #[arg(long, default_value_t = RULE_COUNT)]
    rule_count: usize,
    /// Number of scenarios each individual plays per generation
    #[arg(long, default_value_t = SCENARIOS_PER_GENERATION)]
    scenarios_per_generation: usize,
    /// Write the best individual as a JSON model when training stops
    #[arg(long)]
    output: Option<PathBuf>,
    /// Model name used with `--output`
    #[arg(long, default_value = "minevo")]
    name: String,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        population,
        scenarios,
        seed,
        generations,
        save_interval,
        threads,
        population_size,
        rule_count,
        scenarios_per_generation,
        output,
        name,
    } = arg;

    let seed = seed.unwrap_or_else(rand::random);
    let bank = ScenarioBank::load_or_generate(
        scenarios,
        ScenarioBank::DEFAULT_SIZE,
        &mut Pcg32::seed_from_u64(seed),
    );
    let pool = threads.map_or_else(WorkerPool::default, WorkerPool::new);
    let params = TrainingParams {
        population_size: *population_size,
        rule_count: *rule_count,
        scenarios_per_generation: *scenarios_per_generation,
        save_interval: *save_interval,
        seed,
        ..TrainingParams::default()
    };
    tracing::info!(
        seed,
        workers = pool.workers().get(),
        population_size,
        rule_count,
        scenarios_per_generation,
        "starting training"
    );

    let mut trainer = Trainer::new(
        params,
        bank,
        DefaultFitnessEvaluator::new(),
        pool,
        population.clone(),
    );
    while generations.is_none_or(|limit| trainer.generation() < limit) {
        trainer.step();
    }

    trainer
        .save()
        .with_context(|| format!("Failed to save population file: {}", population.display()))?;
    tracing::info!(
        generation = trainer.generation(),
        path = %population.display(),
        "training stopped, population saved"
    );

    let Some(best) = trainer.best() else {
        tracing::warn!("no generation was evaluated, nothing to export");
        return Ok(());
    };
    tracing::info!(
        generation = trainer.generation(),
        fitness = best.fitness(),
        "best individual of the last generation"
    );
    if let Some(path) = output {
        let model = AgentModel::from_individual(name, Some(trainer.generation()), best);
        Output::save_json(&model, Some(path.clone()))?;
        tracing::info!(path = %path.display(), name = %model.name, "model saved");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;
    use minevo_training::genetic::Population;

    use super::*;
    use crate::{
        command::{CommandArgs, Mode},
        util::read_agent_model_file,
    };

    fn parse(args: &[&str]) -> TrainArg {
        let args = ["minevo", "train"].into_iter().chain(args.iter().copied());
        let args = CommandArgs::try_parse_from(args).unwrap();
        let Mode::Train(arg) = args.mode else {
            panic!("expected train mode");
        };
        arg
    }

    #[test]
    fn test_defaults() {
        let arg = parse(&[]);
        assert_eq!(arg.population, PathBuf::from(DEFAULT_POPULATION_PATH));
        assert_eq!(arg.scenarios, PathBuf::from(DEFAULT_SCENARIOS_PATH));
        assert_eq!(arg.seed, None);
        assert_eq!(arg.generations, None);
        assert_eq!(arg.save_interval, SAVE_INTERVAL);
        assert_eq!(arg.population_size, POPULATION_SIZE);
        assert_eq!(arg.rule_count, RULE_COUNT);
        assert_eq!(arg.scenarios_per_generation, SCENARIOS_PER_GENERATION);
    }

    #[test]
    fn test_flags() {
        let arg = parse(&[
            "--seed",
            "7",
            "--generations",
            "10",
            "--save-interval",
            "3",
            "--threads",
            "2",
        ]);
        assert_eq!(arg.seed, Some(7));
        assert_eq!(arg.generations, Some(10));
        assert_eq!(arg.save_interval.get(), 3);
        assert_eq!(arg.threads.map(NonZeroUsize::get), Some(2));
    }

    #[test]
    fn test_short_run_saves_population_and_model() {
        let dir = tempfile::tempdir().unwrap();
        let population = dir.path().join("population.dat");
        let scenarios = dir.path().join("scenarios.dat");
        let output = dir.path().join("model.json");
        let arg = parse(&[
            "--population",
            population.to_str().unwrap(),
            "--scenarios",
            scenarios.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--seed",
            "11",
            "--generations",
            "2",
            "--threads",
            "2",
            "--population-size",
            "6",
            "--rule-count",
            "8",
            "--scenarios-per-generation",
            "3",
        ]);
        run(&arg).unwrap();

        assert_eq!(ScenarioBank::load(&scenarios).unwrap().len(), ScenarioBank::DEFAULT_SIZE);
        assert_eq!(Population::load(&population, 6, 8).unwrap().len(), 6);
        let model = read_agent_model_file(&output).unwrap();
        assert_eq!(model.name, "minevo");
        assert_eq!(model.generation, Some(2));
        assert_eq!(model.rules.len(), 8);
    }
}
