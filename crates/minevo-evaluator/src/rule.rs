//! Rule genes: the unit of inheritance of an agent.
//!
//! A [`Rule`] holds three neighborhood-count conditions, two boolean filters, a scope
//! radius, a priority and an action. Every field has a fixed domain; random rules and
//! mutations draw uniformly from it.
//!
//! | field               | domain                          |
//! |---------------------|---------------------------------|
//! | `number_condition`  | [`NUMBER_CONDITION_RANGE`]      |
//! | `hidden_condition`  | [`HIDDEN_CONDITION_RANGE`]      |
//! | `flagged_condition` | [`FLAGGED_CONDITION_RANGE`]     |
//! | `near_edge`         | `bool`                          |
//! | `has_pattern`       | `bool`                          |
//! | `scope`             | [`SCOPE_RANGE`]                 |
//! | `priority`          | [`PRIORITY_RANGE`]              |
//! | `action`            | [`RuleAction`]                  |

use std::{fmt, ops::RangeInclusive};

use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};
use serde::{Deserialize, Serialize};

pub const NUMBER_CONDITION_RANGE: RangeInclusive<u8> = 0..=8;
pub const HIDDEN_CONDITION_RANGE: RangeInclusive<u8> = 0..=8;
pub const FLAGGED_CONDITION_RANGE: RangeInclusive<u8> = 0..=8;
pub const SCOPE_RANGE: RangeInclusive<u8> = 1..=2;
pub const PRIORITY_RANGE: RangeInclusive<u8> = 1..=10;

/// What a rule does when all its conditions hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    /// Reveal every hidden cell in scope, once all expected mines are flagged.
    RevealHidden,
    /// Flag the last hidden cell in scope, when exactly one mine is unaccounted for.
    PlaceFlag,
}

impl RuleAction {
    /// Returns the integer code used by the population file format.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            RuleAction::RevealHidden => 0,
            RuleAction::PlaceFlag => 1,
        }
    }

    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(RuleAction::RevealHidden),
            1 => Some(RuleAction::PlaceFlag),
            _ => None,
        }
    }
}

impl Distribution<RuleAction> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> RuleAction {
        if rng.random() {
            RuleAction::PlaceFlag
        } else {
            RuleAction::RevealHidden
        }
    }
}

/// A single gene: conditions on a revealed cell and the action to take.
///
/// See the [module documentation](self) for field domains, and
/// [`RuleAgent`](crate::rule_agent::RuleAgent) for how rules fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    /// Required mine count shown by the cell.
    pub number_condition: u8,
    /// Required number of hidden cells in scope.
    pub hidden_condition: u8,
    /// Required number of flagged cells in scope.
    pub flagged_condition: u8,
    /// If set, the cell must lie in the two outermost rows or columns.
    pub near_edge: bool,
    /// If set, the agent's cell pattern predicate must hold.
    pub has_pattern: bool,
    /// Chebyshev radius of the neighborhood the counts are taken over.
    pub scope: u8,
    /// Rules with higher priority are tried first.
    pub priority: u8,
    pub action: RuleAction,
}

/// Individually mutable fields of a [`Rule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleField {
    NumberCondition,
    HiddenCondition,
    FlaggedCondition,
    NearEdge,
    HasPattern,
    Scope,
    Priority,
    Action,
}

impl RuleField {
    pub const ALL: [RuleField; 8] = [
        RuleField::NumberCondition,
        RuleField::HiddenCondition,
        RuleField::FlaggedCondition,
        RuleField::NearEdge,
        RuleField::HasPattern,
        RuleField::Scope,
        RuleField::Priority,
        RuleField::Action,
    ];
}

impl Distribution<Rule> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Rule {
        Rule {
            number_condition: rng.random_range(NUMBER_CONDITION_RANGE),
            hidden_condition: rng.random_range(HIDDEN_CONDITION_RANGE),
            flagged_condition: rng.random_range(FLAGGED_CONDITION_RANGE),
            near_edge: rng.random(),
            has_pattern: rng.random(),
            scope: rng.random_range(SCOPE_RANGE),
            priority: rng.random_range(PRIORITY_RANGE),
            action: rng.random(),
        }
    }
}

impl Rule {
    /// Replaces one field with a fresh uniform draw from its domain.
    pub fn randomize_field<R>(&mut self, field: RuleField, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        match field {
            RuleField::NumberCondition => {
                self.number_condition = rng.random_range(NUMBER_CONDITION_RANGE);
            }
            RuleField::HiddenCondition => {
                self.hidden_condition = rng.random_range(HIDDEN_CONDITION_RANGE);
            }
            RuleField::FlaggedCondition => {
                self.flagged_condition = rng.random_range(FLAGGED_CONDITION_RANGE);
            }
            RuleField::NearEdge => self.near_edge = rng.random(),
            RuleField::HasPattern => self.has_pattern = rng.random(),
            RuleField::Scope => self.scope = rng.random_range(SCOPE_RANGE),
            RuleField::Priority => self.priority = rng.random_range(PRIORITY_RANGE),
            RuleField::Action => self.action = rng.random(),
        }
    }

    /// Returns `true` if the value of `field` is the same in both rules.
    #[must_use]
    pub fn field_eq(&self, other: &Rule, field: RuleField) -> bool {
        match field {
            RuleField::NumberCondition => self.number_condition == other.number_condition,
            RuleField::HiddenCondition => self.hidden_condition == other.hidden_condition,
            RuleField::FlaggedCondition => self.flagged_condition == other.flagged_condition,
            RuleField::NearEdge => self.near_edge == other.near_edge,
            RuleField::HasPattern => self.has_pattern == other.has_pattern,
            RuleField::Scope => self.scope == other.scope,
            RuleField::Priority => self.priority == other.priority,
            RuleField::Action => self.action == other.action,
        }
    }

    /// Returns `true` if every numeric field lies within its domain.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        NUMBER_CONDITION_RANGE.contains(&self.number_condition)
            && HIDDEN_CONDITION_RANGE.contains(&self.hidden_condition)
            && FLAGGED_CONDITION_RANGE.contains(&self.flagged_condition)
            && SCOPE_RANGE.contains(&self.scope)
            && PRIORITY_RANGE.contains(&self.priority)
    }
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RuleAction::RevealHidden => "reveal hidden",
            RuleAction::PlaceFlag => "place flag",
        })
    }
}

impl fmt::Display for Rule {
    /// Formats the rule on one line, e.g.
    /// `[p7] number=1 hidden=1 flagged=0 scope=1 edge => place flag`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[p{}] number={} hidden={} flagged={} scope={}",
            self.priority,
            self.number_condition,
            self.hidden_condition,
            self.flagged_condition,
            self.scope
        )?;
        if self.near_edge {
            f.write_str(" edge")?;
        }
        if self.has_pattern {
            f.write_str(" pattern")?;
        }
        write!(f, " => {}", self.action)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_random_rules_are_valid() {
        let mut rng = Pcg32::seed_from_u64(0);
        for _ in 0..1000 {
            let rule: Rule = rng.random();
            assert!(rule.is_valid(), "{rule:?}");
        }
    }

    #[test]
    fn test_random_rules_cover_domains() {
        let mut rng = Pcg32::seed_from_u64(1);
        let rules: Vec<Rule> = (0..2000).map(|_| rng.random()).collect();
        for n in NUMBER_CONDITION_RANGE {
            assert!(rules.iter().any(|r| r.number_condition == n));
        }
        for p in PRIORITY_RANGE {
            assert!(rules.iter().any(|r| r.priority == p));
        }
        assert!(rules.iter().any(|r| r.action == RuleAction::PlaceFlag));
        assert!(rules.iter().any(|r| r.action == RuleAction::RevealHidden));
        assert!(rules.iter().any(|r| r.scope == 2));
    }

    #[test]
    fn test_randomize_every_field_stays_in_domain() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut rule = Rule {
            number_condition: 200,
            hidden_condition: 200,
            flagged_condition: 200,
            near_edge: false,
            has_pattern: false,
            scope: 200,
            priority: 200,
            action: RuleAction::RevealHidden,
        };
        assert!(!rule.is_valid());
        for field in RuleField::ALL {
            rule.randomize_field(field, &mut rng);
        }
        assert!(rule.is_valid());
    }

    #[test]
    fn test_action_codes() {
        for action in [RuleAction::RevealHidden, RuleAction::PlaceFlag] {
            assert_eq!(RuleAction::from_code(action.code()), Some(action));
        }
        assert_eq!(RuleAction::from_code(2), None);
        assert_eq!(RuleAction::from_code(-1), None);
    }

    #[test]
    fn test_action_json_format() {
        let json = serde_json::to_string(&RuleAction::PlaceFlag).unwrap();
        assert_eq!(json, "\"place_flag\"");
    }

    #[test]
    fn test_display() {
        let rule = Rule {
            number_condition: 1,
            hidden_condition: 1,
            flagged_condition: 0,
            near_edge: true,
            has_pattern: false,
            scope: 1,
            priority: 7,
            action: RuleAction::PlaceFlag,
        };
        assert_eq!(
            rule.to_string(),
            "[p7] number=1 hidden=1 flagged=0 scope=1 edge => place flag"
        );
    }
}
