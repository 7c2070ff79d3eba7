use std::path::Path;

use rand::{Rng, SeedableRng as _, seq::index};
use rand_pcg::Pcg32;

use crate::ScenarioBankError;

use super::Scenario;

/// A fixed set of scenarios reused across the whole training run.
///
/// The bank is generated once, persisted, and reloaded by later runs so that
/// evaluation ground truth stays identical across process restarts. Each
/// generation evaluates on a fresh [`sample`](Self::sample) of the bank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioBank {
    scenarios: Vec<Scenario>,
}

impl ScenarioBank {
    /// Number of scenarios in a freshly generated bank.
    pub const DEFAULT_SIZE: usize = 200;

    #[must_use]
    pub fn new(scenarios: Vec<Scenario>) -> Self {
        Self { scenarios }
    }

    /// Generates a bank of `count` random scenarios.
    pub fn generate<R>(count: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let scenarios = (0..count).map(|_| Scenario::generate(rng)).collect();
        Self { scenarios }
    }

    /// Like [`Self::generate`], but with a seed for reproducible banks.
    #[must_use]
    pub fn generate_with_seed(count: usize, seed: u64) -> Self {
        Self::generate(count, &mut Pcg32::seed_from_u64(seed))
    }

    /// Loads the bank at `path`, or generates and saves a new one.
    ///
    /// Any load failure (missing file, truncated or invalid record) is logged and
    /// answered by generating a fresh bank of `count` scenarios. A failure to save
    /// the new bank is logged as well; the in-memory bank is returned regardless.
    pub fn load_or_generate<P, R>(path: P, count: usize, rng: &mut R) -> Self
    where
        P: AsRef<Path>,
        R: Rng + ?Sized,
    {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(bank) => {
                tracing::info!(
                    path = %path.display(),
                    scenarios = bank.len(),
                    "loaded scenario bank"
                );
                return bank;
            }
            Err(ScenarioBankError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no scenario bank found, generating a new one");
            }
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "discarding unusable scenario bank, generating a new one"
                );
            }
        }

        let bank = Self::generate(count, rng);
        if let Err(err) = bank.save(path) {
            tracing::warn!(path = %path.display(), error = %err, "failed to save scenario bank");
        }
        bank
    }

    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Draws `count` distinct scenarios uniformly at random.
    ///
    /// If `count` exceeds the bank size, every scenario is returned (in random
    /// order).
    pub fn sample<R>(&self, count: usize, rng: &mut R) -> Vec<Scenario>
    where
        R: Rng + ?Sized,
    {
        let count = usize::min(count, self.scenarios.len());
        index::sample(rng, self.scenarios.len(), count)
            .into_iter()
            .map(|i| self.scenarios[i].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_generate_count() {
        let bank = ScenarioBank::generate_with_seed(25, 1);
        assert_eq!(bank.len(), 25);
        assert_eq!(bank, ScenarioBank::generate_with_seed(25, 1));
    }

    #[test]
    fn test_sample_without_replacement() {
        let bank = ScenarioBank::generate_with_seed(30, 2);
        let mut rng = Pcg32::seed_from_u64(9);
        let sample = bank.sample(20, &mut rng);
        assert_eq!(sample.len(), 20);

        let indices: HashSet<_> = sample
            .iter()
            .map(|s| bank.scenarios().iter().position(|b| b == s).unwrap())
            .collect();
        assert_eq!(indices.len(), 20);
    }

    #[test]
    fn test_sample_larger_than_bank_returns_all() {
        let bank = ScenarioBank::generate_with_seed(5, 3);
        let sample = bank.sample(20, &mut Pcg32::seed_from_u64(0));
        assert_eq!(sample.len(), 5);
        assert!(ScenarioBank::default().sample(3, &mut Pcg32::seed_from_u64(0)).is_empty());
    }

    #[test]
    fn test_load_or_generate_creates_and_reuses_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenarios.dat");
        let mut rng = Pcg32::seed_from_u64(11);

        let first = ScenarioBank::load_or_generate(&path, 12, &mut rng);
        assert_eq!(first.len(), 12);
        assert!(path.exists());

        let second = ScenarioBank::load_or_generate(&path, 99, &mut rng);
        assert_eq!(first, second);
    }

    #[test]
    fn test_load_or_generate_replaces_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenarios.dat");
        std::fs::write(&path, [1, 2, 3]).unwrap();

        let bank = ScenarioBank::load_or_generate(&path, 4, &mut Pcg32::seed_from_u64(0));
        assert_eq!(bank.len(), 4);
        assert_eq!(ScenarioBank::load(&path).unwrap(), bank);
    }
}
