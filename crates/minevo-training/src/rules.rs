//! Rule-set operations for the genetic algorithm.
//!
//! An individual's genome is a fixed-length sequence of [`Rule`]s. This module
//! provides the operators [`PopulationEvolver`](crate::genetic::PopulationEvolver)
//! applies to those sequences.
//!
//! # Operations
//!
//! - **Initialization**: [`random`] draws every rule uniformly from the rule domains
//! - **Crossover**: [`multi_point_crossover`] swaps alternating segments between parents
//! - **Mutation**: [`mutate`] redraws individual rule fields
//! - **Diversity**: [`genetic_distance`] measures how far apart two genomes are
//!
//! # Multi-Point Crossover
//!
//! A random number `k` of distinct cut points is drawn from `1..len`, then sorted.
//! The cuts split both parents into `k + 1` segments. The first child takes the
//! first segment from the first parent, the next from the second parent, and so on;
//! the second child takes the complementary segments.
//!
//! ```text
//! cuts:     2       5
//! p1:     a a | a a a | a a
//! p2:     b b | b b b | b b
//! child1: a a | b b b | a a
//! child2: b b | a a a | b b
//! ```
//!
//! Rules keep their positions, so every rule of a child at index `i` is a copy of
//! one parent's rule at index `i`.

use std::iter;

use minevo_evaluator::rule::{Rule, RuleField};
use rand::{Rng, seq::index};

/// Generates `len` uniformly random rules.
pub fn random<R>(rng: &mut R, len: usize) -> Vec<Rule>
where
    R: Rng + ?Sized,
{
    iter::repeat_with(|| rng.random()).take(len).collect()
}

/// Performs multi-point crossover between two parents of equal length.
///
/// The number of cut points is uniform in `1..len`. Parents shorter than two rules
/// cannot be cut and are returned as copies.
///
/// # Panics
///
/// Panics if the parents have different lengths.
pub fn multi_point_crossover<R>(p1: &[Rule], p2: &[Rule], rng: &mut R) -> (Vec<Rule>, Vec<Rule>)
where
    R: Rng + ?Sized,
{
    assert_eq!(p1.len(), p2.len());
    let len = p1.len();
    if len < 2 {
        return (p1.to_vec(), p2.to_vec());
    }
    let cut_count = rng.random_range(1..len);
    let mut cuts: Vec<usize> = index::sample(rng, len - 1, cut_count)
        .into_iter()
        .map(|i| i + 1)
        .collect();
    cuts.sort_unstable();
    crossover_at(p1, p2, &cuts)
}

/// Swaps segments of two parents at the given cut points.
///
/// `cuts` must be strictly increasing and lie in `1..len`.
///
/// # Panics
///
/// Panics if the parents have different lengths or `cuts` is not strictly increasing.
#[must_use]
pub fn crossover_at(p1: &[Rule], p2: &[Rule], cuts: &[usize]) -> (Vec<Rule>, Vec<Rule>) {
    assert_eq!(p1.len(), p2.len());
    assert!(cuts.is_sorted_by(|a, b| a < b), "cut points must be strictly increasing");

    let mut c1 = Vec::with_capacity(p1.len());
    let mut c2 = Vec::with_capacity(p2.len());
    let mut swapped = false;
    let mut start = 0;
    for end in cuts.iter().copied().chain([p1.len()]) {
        let (a, b) = if swapped { (p2, p1) } else { (p1, p2) };
        c1.extend_from_slice(&a[start..end]);
        c2.extend_from_slice(&b[start..end]);
        swapped = !swapped;
        start = end;
    }
    (c1, c2)
}

/// Mutates rules in-place.
///
/// Every field of every rule is independently redrawn from its domain with
/// probability `rate`. The new value may equal the old one.
pub fn mutate<R>(rules: &mut [Rule], rate: f64, rng: &mut R)
where
    R: Rng + ?Sized,
{
    for rule in rules {
        for field in RuleField::ALL {
            if rng.random_bool(rate) {
                rule.randomize_field(field, rng);
            }
        }
    }
}

/// Returns the fraction of rule fields that differ between two genomes.
///
/// Rules are compared position by position over all eight fields, so the result
/// lies in `[0, 1]`. Two empty genomes have distance 0.
///
/// # Panics
///
/// Panics if the genomes have different lengths.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn genetic_distance(a: &[Rule], b: &[Rule]) -> f64 {
    assert_eq!(a.len(), b.len());
    if a.is_empty() {
        return 0.0;
    }
    let differing: usize = iter::zip(a, b)
        .map(|(ra, rb)| {
            RuleField::ALL
                .iter()
                .filter(|field| !ra.field_eq(rb, **field))
                .count()
        })
        .sum();
    differing as f64 / (a.len() * RuleField::ALL.len()) as f64
}

#[cfg(test)]
mod tests {
    use minevo_evaluator::rule::RuleAction;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn uniform_rules(priority: u8, len: usize) -> Vec<Rule> {
        let rule = Rule {
            number_condition: 1,
            hidden_condition: 1,
            flagged_condition: 0,
            near_edge: false,
            has_pattern: false,
            scope: 1,
            priority,
            action: RuleAction::PlaceFlag,
        };
        vec![rule; len]
    }

    #[test]
    fn test_random_length_and_validity() {
        let mut rng = Pcg32::seed_from_u64(0);
        let rules = random(&mut rng, 150);
        assert_eq!(rules.len(), 150);
        assert!(rules.iter().all(Rule::is_valid));
    }

    #[test]
    fn test_crossover_at_alternates_segments() {
        let p1 = uniform_rules(1, 7);
        let p2 = uniform_rules(2, 7);
        let (c1, c2) = crossover_at(&p1, &p2, &[2, 5]);
        let priorities = |rules: &[Rule]| rules.iter().map(|r| r.priority).collect::<Vec<_>>();
        assert_eq!(priorities(&c1), [1, 1, 2, 2, 2, 1, 1]);
        assert_eq!(priorities(&c2), [2, 2, 1, 1, 1, 2, 2]);
    }

    #[test]
    fn test_crossover_keeps_positions() {
        let mut rng = Pcg32::seed_from_u64(1);
        let p1 = random(&mut rng, 150);
        let p2 = random(&mut rng, 150);
        for _ in 0..100 {
            let (c1, c2) = multi_point_crossover(&p1, &p2, &mut rng);
            assert_eq!(c1.len(), 150);
            assert_eq!(c2.len(), 150);
            for i in 0..150 {
                assert!(c1[i] == p1[i] || c1[i] == p2[i]);
                // children are complementary at every position
                if c1[i] == p1[i] {
                    assert_eq!(c2[i], p2[i]);
                } else {
                    assert_eq!(c2[i], p1[i]);
                }
            }
        }
    }

    #[test]
    fn test_crossover_always_cuts() {
        let mut rng = Pcg32::seed_from_u64(2);
        let p1 = uniform_rules(1, 10);
        let p2 = uniform_rules(2, 10);
        for _ in 0..100 {
            let (c1, _) = multi_point_crossover(&p1, &p2, &mut rng);
            // the first segment comes from p1, and at least one later segment from p2
            assert_eq!(c1[0].priority, 1);
            assert!(c1.iter().any(|r| r.priority == 2));
        }
    }

    #[test]
    fn test_crossover_single_rule_copies() {
        let mut rng = Pcg32::seed_from_u64(3);
        let p1 = uniform_rules(1, 1);
        let p2 = uniform_rules(2, 1);
        assert_eq!(multi_point_crossover(&p1, &p2, &mut rng), (p1, p2));
    }

    #[test]
    fn test_mutate_rate_zero_keeps_rules() {
        let mut rng = Pcg32::seed_from_u64(4);
        let original = random(&mut rng, 150);
        let mut rules = original.clone();
        mutate(&mut rules, 0.0, &mut rng);
        assert_eq!(rules, original);
    }

    #[test]
    fn test_mutate_rate_one_redraws_every_field() {
        let original = random(&mut Pcg32::seed_from_u64(4), 150);
        let mut rng = Pcg32::seed_from_u64(5);
        let mut replay = rng.clone();

        let mut rules = original.clone();
        mutate(&mut rules, 1.0, &mut rng);

        // Redraw all eight fields of every rule, in field order, from the same stream.
        let mut expected = original.clone();
        for rule in &mut expected {
            for field in RuleField::ALL {
                assert!(replay.random_bool(1.0));
                rule.randomize_field(field, &mut replay);
            }
        }
        assert_eq!(rules, expected);
        assert_eq!(rng, replay);
        assert!(rules.iter().all(Rule::is_valid));
        assert!(genetic_distance(&rules, &original) > 0.3);
    }

    #[test]
    fn test_genetic_distance() {
        let a = uniform_rules(1, 4);
        assert!(genetic_distance(&a, &a).abs() < f64::EPSILON);

        let mut b = a.clone();
        b[0].priority = 9;
        b[3].action = RuleAction::RevealHidden;
        b[3].near_edge = true;
        assert!((genetic_distance(&a, &b) - 3.0 / 32.0).abs() < f64::EPSILON);
        assert!(genetic_distance(&[], &[]).abs() < f64::EPSILON);
    }
}
