use std::path::PathBuf;

use anyhow::{Context as _, ensure};
use minevo_engine::ScenarioBank;

use super::DEFAULT_SCENARIOS_PATH;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GenerateScenariosArg {
    /// Output file path (overwritten if it exists)
    #[arg(long, default_value = DEFAULT_SCENARIOS_PATH)]
    output: PathBuf,
    /// Number of scenarios to generate
    #[arg(long, default_value_t = ScenarioBank::DEFAULT_SIZE)]
    count: usize,
    /// Seed for a reproducible bank (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &GenerateScenariosArg) -> anyhow::Result<()> {
    let GenerateScenariosArg {
        output,
        count,
        seed,
    } = arg;
    ensure!(*count > 0, "A scenario bank needs at least one scenario");

    let seed = seed.unwrap_or_else(rand::random);
    let bank = ScenarioBank::generate_with_seed(*count, seed);
    bank.save(output)
        .with_context(|| format!("Failed to save scenario bank: {}", output.display()))?;
    tracing::info!(
        path = %output.display(),
        scenarios = bank.len(),
        seed,
        "saved scenario bank"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_loadable_bank() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("scenarios.dat");
        let arg = GenerateScenariosArg {
            output: output.clone(),
            count: 12,
            seed: Some(3),
        };
        run(&arg).unwrap();

        let bank = ScenarioBank::load(&output).unwrap();
        assert_eq!(bank.len(), 12);
        assert_eq!(bank, ScenarioBank::generate_with_seed(12, 3));
    }

    #[test]
    fn test_rejects_empty_bank() {
        let dir = tempfile::tempdir().unwrap();
        let arg = GenerateScenariosArg {
            output: dir.path().join("scenarios.dat"),
            count: 0,
            seed: None,
        };
        assert!(run(&arg).is_err());
    }
}
