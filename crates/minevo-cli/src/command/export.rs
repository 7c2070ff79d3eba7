use std::path::PathBuf;

use anyhow::Context as _;

use super::PopulationFileArg;
use crate::{model::agent_model::AgentModel, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ExportArg {
    #[command(flatten)]
    file: PopulationFileArg,
    /// Model name
    #[arg(long, default_value = "minevo")]
    name: String,
    /// Output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Exports the first individual of the population file.
///
/// Training saves the population after reproduction, so the front of the file holds
/// the elites of the last evaluated generation, best first.
pub(crate) fn run(arg: &ExportArg) -> anyhow::Result<()> {
    let ExportArg { file, name, output } = arg;
    let population = file.load()?;
    let best = population
        .individuals()
        .first()
        .context("Population file holds no individuals")?;
    let model = AgentModel::from_individual(name, None, best);
    Output::save_json(&model, output.clone())?;
    tracing::info!(
        name = %model.name,
        fitness = model.fitness,
        rules = model.rules.len(),
        "model exported"
    );
    Ok(())
}
