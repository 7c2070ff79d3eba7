//! Rule execution: playing a board with an individual's rule set.
//!
//! This module implements the second level of the evaluator architecture: turning a
//! list of [`Rule`]s into moves on a [`Board`].
//!
//! # How It Works
//!
//! One interpreter pass ([`RuleAgent::apply_rules`]) walks the rules from highest to
//! lowest priority. For each rule it scans every revealed cell showing the rule's
//! `number_condition`, in row-major order, and counts the hidden and flagged cells
//! within the rule's scope (a Chebyshev square clipped to the board, centre
//! included). When every condition holds the action may fire:
//!
//! - **`RevealHidden`** - if the flags in scope already account for the number,
//!   every hidden cell in scope is revealed
//! - **`PlaceFlag`** - if exactly one mine is unaccounted for and exactly one cell
//!   in scope is hidden, that cell is flagged
//!
//! A pass stops as soon as the board reaches a terminal state.
//!
//! # Playing a Game
//!
//! [`RuleAgent::play_game`] alternates interpreter passes with a fallback: whenever a
//! pass changes nothing, one uniformly random hidden cell is revealed. Both count
//! as one action, and the game is cut off once the action limit is reached.

use arrayvec::ArrayVec;
use minevo_engine::{Board, Position};
use rand::{Rng, seq::IteratorRandom as _};

use crate::{
    pattern::{CellPattern, NumberPattern},
    rule::{Rule, RuleAction},
};

/// Largest scope radius the interpreter supports.
const MAX_SCOPE: usize = 2;
const MAX_SCOPE_CELLS: usize = (2 * MAX_SCOPE + 1) * (2 * MAX_SCOPE + 1);

/// Rows and columns from the boundary that count as "near the edge".
const NEAR_EDGE_MARGIN: usize = 1;

/// Default cap on actions in a single game.
///
/// Every action reveals or flags at least one cell, so a game on a 10×10 board
/// cannot need more than this.
pub const DEFAULT_ACTION_LIMIT: usize = 1000;

/// Executes one individual's rules against boards.
#[derive(Debug, Clone)]
pub struct RuleAgent<'a> {
    rules: Vec<Rule>,
    pattern: &'a dyn CellPattern,
}

impl RuleAgent<'static> {
    /// Creates an agent using the default pattern predicate.
    #[must_use]
    pub fn new(rules: &[Rule]) -> Self {
        Self::with_pattern(rules, &NumberPattern::DEFAULT)
    }
}

impl<'a> RuleAgent<'a> {
    /// Creates an agent that evaluates `has_pattern` with `pattern`.
    ///
    /// Rules are ordered by descending priority. The sort is stable, so rules with
    /// equal priority keep their order in `rules`.
    #[must_use]
    pub fn with_pattern(rules: &[Rule], pattern: &'a dyn CellPattern) -> Self {
        let mut rules = rules.to_vec();
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self { rules, pattern }
    }

    /// Returns the rules in the order they are tried.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Runs one interpreter pass over `board`.
    ///
    /// Returns `true` if any cell changed state.
    pub fn apply_rules(&self, board: &mut Board) -> bool {
        let mut changed = false;
        for rule in &self.rules {
            for pos in Position::all() {
                if board.is_terminal() {
                    return changed;
                }
                changed |= self.apply_rule_at(rule, board, pos);
            }
        }
        changed
    }

    fn apply_rule_at(&self, rule: &Rule, board: &mut Board, pos: Position) -> bool {
        let Some(cell) = board.cell(pos) else {
            return false;
        };
        if !cell.state().is_revealed() || cell.neighboring_mines() != rule.number_condition {
            return false;
        }

        let scope = usize::from(rule.scope).min(MAX_SCOPE);
        let mut hidden = ArrayVec::<Position, MAX_SCOPE_CELLS>::new();
        let mut flagged = 0;
        for p in pos.square(scope) {
            let Some(cell) = board.cell(p) else { continue };
            if cell.state().is_hidden() {
                hidden.push(p);
            } else if cell.state().is_flagged() {
                flagged += 1;
            }
        }

        if hidden.len() != usize::from(rule.hidden_condition)
            || flagged != usize::from(rule.flagged_condition)
        {
            return false;
        }
        if rule.near_edge && !pos.is_near_edge(NEAR_EDGE_MARGIN) {
            return false;
        }
        if rule.has_pattern && !self.pattern.matches(board, pos) {
            return false;
        }

        let number = usize::from(rule.number_condition);
        match rule.action {
            RuleAction::RevealHidden if flagged == number && !hidden.is_empty() => {
                let mut changed = false;
                for p in hidden {
                    if board.is_terminal() {
                        break;
                    }
                    changed |= board.reveal(p);
                }
                changed
            }
            RuleAction::PlaceFlag if number == flagged + 1 && hidden.len() == 1 => {
                board.flag(hidden[0])
            }
            RuleAction::RevealHidden | RuleAction::PlaceFlag => false,
        }
    }

    /// Plays `board` until it is terminal, no hidden cell remains, or
    /// `action_limit` actions have been taken.
    ///
    /// Returns the number of actions taken.
    pub fn play_game<R>(&self, board: &mut Board, action_limit: usize, rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        let mut actions = 0;
        while !board.is_terminal() && actions < action_limit {
            if self.apply_rules(board) {
                actions += 1;
                continue;
            }
            if !reveal_random_hidden(board, rng) {
                break;
            }
            actions += 1;
        }
        actions
    }
}

/// Reveals one uniformly random hidden cell.
///
/// Returns `false` if the board has no hidden cell.
pub fn reveal_random_hidden<R>(board: &mut Board, rng: &mut R) -> bool
where
    R: Rng + ?Sized,
{
    match board.hidden_positions().choose(rng) {
        Some(pos) => board.reveal(pos),
        None => false,
    }
}
