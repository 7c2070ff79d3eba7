//! Deterministic per-task random number generators.
//!
//! Every evaluation task gets its own generator, seeded from the run's base seed,
//! the generation number and the individual's index. Results therefore do not
//! depend on how tasks are distributed over worker threads.

use rand::SeedableRng as _;
use rand_pcg::Pcg32;

use crate::genetic::Population;

/// Stream tag for per-individual evaluation tasks.
pub const EVALUATION_STREAM: u64 = 0;
/// Stream tag for the generation-level work (scenario sampling, reproduction).
pub const GENERATION_STREAM: u64 = 1;
/// Stream tag for the initial random population.
pub const INIT_STREAM: u64 = 2;

/// Seeds for every random decision of a training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSource {
    base: u64,
}

impl SeedSource {
    #[must_use]
    pub const fn new(base: u64) -> Self {
        Self { base }
    }

    #[must_use]
    pub const fn base(&self) -> u64 {
        self.base
    }

    /// Returns the seeds for a run that resumes from `population`.
    ///
    /// Generation numbers restart at 1 on every run, so the base seed is mixed with a
    /// fingerprint of the loaded population. Resuming the same file with the same seed
    /// repeats the same run, while the streams differ from those of the run that wrote
    /// the file.
    #[must_use]
    pub fn resumed(&self, population: &Population) -> Self {
        let mut state = splitmix64(population.len() as u64);
        for ind in population.individuals() {
            for rule in ind.rules() {
                let packed = u64::from_le_bytes([
                    rule.number_condition,
                    rule.hidden_condition,
                    rule.flagged_condition,
                    u8::from(rule.near_edge),
                    u8::from(rule.has_pattern),
                    rule.scope,
                    rule.priority,
                    rule.action.code().to_le_bytes()[0],
                ]);
                state = splitmix64(state ^ packed);
            }
            state = splitmix64(state ^ ind.fitness().to_bits());
        }
        Self {
            base: splitmix64(self.base ^ state),
        }
    }

    /// Returns the seed for `(stream, generation, index)`.
    #[must_use]
    pub const fn derive(&self, stream: u64, generation: u64, index: u64) -> u64 {
        let mut state = splitmix64(self.base ^ splitmix64(stream));
        state = splitmix64(state ^ generation);
        splitmix64(state ^ index)
    }

    /// Returns the generator for evaluating individual `index` in `generation`.
    #[must_use]
    pub fn evaluation_rng(&self, generation: u64, index: u64) -> Pcg32 {
        Pcg32::seed_from_u64(self.derive(EVALUATION_STREAM, generation, index))
    }

    /// Returns the generator for the initial random population.
    #[must_use]
    pub fn init_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.derive(INIT_STREAM, 0, 0))
    }

    /// Returns the generator for sampling and reproduction in `generation`.
    #[must_use]
    pub fn generation_rng(&self, generation: u64) -> Pcg32 {
        Pcg32::seed_from_u64(self.derive(GENERATION_STREAM, generation, 0))
    }
}

const fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
