use std::path::PathBuf;

use anyhow::Context as _;
use minevo_engine::{Board, Scenario, ScenarioBank};
use minevo_evaluator::fitness_evaluator::{DefaultFitnessEvaluator, FitnessEvaluator, GameOutcome};
use minevo_training::{genetic::Individual, scheduler::WorkerPool, seed::SeedSource};

use super::{DEFAULT_SCENARIOS_PATH, PopulationFileArg};
use crate::util::read_agent_model_file;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ShowArg {
    #[command(flatten)]
    file: PopulationFileArg,
    /// Agent model JSON to show instead of the population file
    #[arg(long)]
    model: Option<PathBuf>,
    /// Scenario bank file the games are drawn from
    #[arg(long, default_value = DEFAULT_SCENARIOS_PATH)]
    scenarios: PathBuf,
    /// Number of agents to show
    #[arg(long, default_value_t = 3)]
    top: usize,
    /// Number of scenarios every agent plays
    #[arg(long, default_value_t = 5)]
    games: usize,
    /// Number of highest-priority rules printed per agent
    #[arg(long, default_value_t = 10)]
    rules: usize,
    /// Seed for the scenario sample and fallback moves (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
}

/// One agent replayed on the shown scenarios.
#[derive(Debug)]
struct Replay<'a> {
    index: usize,
    individual: &'a Individual,
    games: Vec<(Board, GameOutcome, f64)>,
    fitness: f64,
}

impl<'a> Replay<'a> {
    #[expect(clippy::cast_precision_loss)]
    fn play(
        index: usize,
        individual: &'a Individual,
        scenarios: &[Scenario],
        evaluator: &DefaultFitnessEvaluator,
        seeds: &SeedSource,
    ) -> Self {
        let agent = individual.agent();
        let mut rng = seeds.evaluation_rng(0, index as u64);
        let games: Vec<_> = scenarios
            .iter()
            .map(|scenario| {
                let (board, outcome) = evaluator.play_board(&agent, scenario, &mut rng);
                let score = evaluator.score(&outcome);
                (board, outcome, score)
            })
            .collect();
        let fitness = if games.is_empty() {
            0.0
        } else {
            games.iter().map(|(_, _, score)| score).sum::<f64>() / games.len() as f64
        };
        Self {
            index,
            individual,
            games,
            fitness,
        }
    }

    fn print(&self, rank: usize, rule_count: usize) {
        let won = self.games.iter().filter(|(_, outcome, _)| outcome.won).count();
        println!(
            "#{rank} individual {} (saved fitness {:.3}): fitness {:.3}, won {won}/{}",
            self.index,
            self.individual.fitness(),
            self.fitness,
            self.games.len(),
        );
        let agent = self.individual.agent();
        println!("  rules by priority:");
        for rule in agent.rules().iter().take(rule_count) {
            println!("    {rule}");
        }
        for (i, (board, outcome, score)) in self.games.iter().enumerate() {
            println!(
                "  game {}: {} safe {} flags {}/{} mines {} actions {} score {score:.1}",
                i + 1,
                if outcome.won { "won " } else { "lost" },
                outcome.safe_revealed,
                outcome.correct_flags,
                outcome.wrong_flags,
                outcome.mines_revealed,
                outcome.actions,
            );
            for line in board.to_string().lines() {
                println!("    {line}");
            }
        }
        println!();
    }
}

pub(crate) fn run(arg: &ShowArg) -> anyhow::Result<()> {
    let ShowArg {
        file,
        model,
        scenarios,
        top,
        games,
        rules,
        seed,
    } = arg;

    let individuals = match model {
        Some(path) => vec![read_agent_model_file(path)?.to_individual()],
        None => file.load()?.individuals().to_vec(),
    };
    let bank = ScenarioBank::load(scenarios)
        .with_context(|| format!("Failed to load scenario bank: {}", scenarios.display()))?;

    let seed = seed.unwrap_or_else(rand::random);
    let seeds = SeedSource::new(seed);
    let sample = bank.sample(*games, &mut seeds.generation_rng(0));
    tracing::info!(
        seed,
        agents = individuals.len(),
        games = sample.len(),
        "replaying agents"
    );

    let replays = replay_ranked(&individuals, &sample, &seeds);
    for (rank, replay) in replays.iter().take(*top).enumerate() {
        replay.print(rank + 1, *rules);
    }
    Ok(())
}

/// Replays every individual on `scenarios` and sorts the results, best first.
fn replay_ranked<'a>(
    individuals: &'a [Individual],
    scenarios: &[Scenario],
    seeds: &SeedSource,
) -> Vec<Replay<'a>> {
    let evaluator = DefaultFitnessEvaluator::new();
    let mut replays = WorkerPool::default().map(individuals.len(), |i| {
        Replay::play(i, &individuals[i], scenarios, &evaluator, seeds)
    });
    replays.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
    replays
}
