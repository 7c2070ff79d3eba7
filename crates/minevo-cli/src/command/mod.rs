use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use minevo_training::genetic::{POPULATION_SIZE, Population, RULE_COUNT};

use self::{
    export::ExportArg, generate_scenarios::GenerateScenariosArg, show::ShowArg, train::TrainArg,
};

mod export;
mod generate_scenarios;
mod show;
mod train;

const DEFAULT_POPULATION_PATH: &str = "population.dat";
const DEFAULT_SCENARIOS_PATH: &str = "scenarios.dat";

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve rule-based agents with the genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Generate and save a new scenario bank
    GenerateScenarios(#[clap(flatten)] GenerateScenariosArg),
    /// Replay the best agents and print their final boards
    Show(#[clap(flatten)] ShowArg),
    /// Export the best individual of a population file as a JSON model
    Export(#[clap(flatten)] ExportArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::GenerateScenarios(arg) => generate_scenarios::run(&arg)?,
        Mode::Show(arg) => show::run(&arg)?,
        Mode::Export(arg) => export::run(&arg)?,
    }
    Ok(())
}

/// Location and expected shape of a population file.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PopulationFileArg {
    /// Population file path
    #[arg(long, default_value = DEFAULT_POPULATION_PATH)]
    population: PathBuf,
    /// Number of individuals the population file must hold
    #[arg(long, default_value_t = POPULATION_SIZE)]
    population_size: usize,
    /// Number of rules every individual must hold
    #[arg(long, default_value_t = RULE_COUNT)]
    rule_count: usize,
}

impl PopulationFileArg {
    fn load(&self) -> anyhow::Result<Population> {
        let population = Population::load(&self.population, self.population_size, self.rule_count)
            .with_context(|| {
                format!(
                    "Failed to load population file: {}",
                    self.population.display()
                )
            })?;
        tracing::info!(
            path = %self.population.display(),
            individuals = population.len(),
            "loaded population"
        );
        Ok(population)
    }
}
