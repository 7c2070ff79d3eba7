use anyhow::ensure;
use chrono::{DateTime, Utc};
use minevo_evaluator::rule::Rule;
use minevo_training::genetic::Individual;
use serde::{Deserialize, Serialize};

/// A trained rule list exported as JSON.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AgentModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    /// Generation the individual was evaluated in, if known.
    pub generation: Option<u64>,
    /// Fitness on that generation's scenario sample.
    pub fitness: f64,
    pub rules: Vec<Rule>,
}

impl AgentModel {
    pub fn from_individual(name: &str, generation: Option<u64>, individual: &Individual) -> Self {
        Self {
            name: name.to_owned(),
            trained_at: Utc::now(),
            generation,
            fitness: individual.fitness(),
            rules: individual.rules().to_vec(),
        }
    }

    /// Rejects models whose rules lie outside the rule domains.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (i, rule) in self.rules.iter().enumerate() {
            ensure!(rule.is_valid(), "rule #{i} of model {} is out of range", self.name);
        }
        Ok(())
    }

    pub fn to_individual(&self) -> Individual {
        Individual::new(self.rules.clone(), self.fitness)
    }
}
