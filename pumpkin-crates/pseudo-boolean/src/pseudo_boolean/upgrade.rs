//! Replaces pseudo-boolean constraints by ordinary linear constraints when all of their AND-terms
//! follow the pattern of `n` variables of which `n - 1` are shared by every term.
use log::debug;

use super::lock_synchronizer::unlock_term;
use super::lock_synchronizer::TermLocking;
use super::PseudoBooleanConstraint;
use super::TermDiff;
use super::TermRegistry;
use crate::basic_types::PresolveStatistics;
use crate::basic_types::PseudoBooleanError;
use crate::engine::carriers::CarrierData;
use crate::engine::carriers::LinearCarrier;
use crate::engine::carriers::LinearConstraint;
use crate::engine::carriers::LinearConstraintType;
use crate::engine::Problem;
use crate::engine::VariableId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum UpgradeOutcome {
    NotApplicable,
    Upgraded,
    Cutoff,
}

/// The variables which occur in every term, and for every term the one variable it has in
/// addition.
#[derive(Debug, PartialEq, Eq)]
struct SharedPattern {
    shared: Vec<VariableId>,
    excess: Vec<VariableId>,
}

/// Detects the shared pattern over the given sorted variable lists.
///
/// A single term is accepted when `allow_single_term` is set; its highest-index variable is then
/// the excess variable.
fn shared_pattern(terms: &[&[VariableId]], allow_single_term: bool) -> Option<SharedPattern> {
    let (first, rest) = terms.split_first()?;
    let length = first.len();
    if length < 2 {
        return None;
    }

    if rest.is_empty() {
        return allow_single_term.then(|| SharedPattern {
            shared: first[..length - 1].to_vec(),
            excess: vec![first[length - 1]],
        });
    }

    let mut shared = first.to_vec();
    for term in rest {
        if term.len() != length {
            return None;
        }
        shared = TermDiff::between(&shared, term).kept;
        if shared.len() + 1 < length {
            return None;
        }
    }

    // Only possible when two terms are equal, which the registry rules out.
    if shared.len() + 1 != length {
        return None;
    }

    let excess = terms
        .iter()
        .flat_map(|term| TermDiff::between(&shared, term).added)
        .collect();

    Some(SharedPattern { shared, excess })
}

/// Tries to replace the constraint, deleting it and its carrier when successful.
pub(crate) fn try_upgrade(
    constraint: &mut PseudoBooleanConstraint,
    registry: &mut TermRegistry,
    problem: &mut Problem,
    statistics: &mut PresolveStatistics,
) -> Result<UpgradeOutcome, PseudoBooleanError> {
    if constraint.entries.is_empty() {
        debug!(
            "{} has no AND-terms left, its carrier becomes an ordinary linear constraint",
            constraint.name
        );
        problem.mark_upgrade_linear(constraint.carrier);
        constraint.deleted = true;
        statistics.deleted_constraints += 1;
        statistics.upgraded_constraints += 1;
        return Ok(UpgradeOutcome::Upgraded);
    }

    let replacement = match constraint.carrier_type {
        LinearConstraintType::LogicOr => upgrade_logic_or(constraint, registry, problem)?,
        LinearConstraintType::SetPacking | LinearConstraintType::SetPartitioning => {
            upgrade_set_ppc(constraint, registry, problem)?
        }
        LinearConstraintType::SetCovering
        | LinearConstraintType::Knapsack
        | LinearConstraintType::Linear => Replacement::None,
    };

    let replacement = match replacement {
        Replacement::None => return Ok(UpgradeOutcome::NotApplicable),
        Replacement::Infeasible { fixed_variables } => {
            statistics.fixed_variables += fixed_variables;
            return Ok(UpgradeOutcome::Cutoff);
        }
        Replacement::Constraint {
            constraint: replacement,
            fixed_variables,
        } => {
            statistics.fixed_variables += fixed_variables;
            replacement
        }
    };

    let carrier = problem.carrier(constraint.carrier);
    let name = format!("{}_upgraded", carrier.name());
    let modifiable = carrier.is_modifiable();
    let _ = problem.create_carrier(name.as_str(), LinearCarrier::Linear(replacement), modifiable);
    debug!("upgraded {} to {name}", constraint.name);

    for entry in constraint.entries.drain(..) {
        let locking = TermLocking::new(entry.coefficient, constraint.lhs, constraint.rhs);
        unlock_term(problem, registry.term_of(&entry.handle), locking);
        if registry.release(problem, entry.handle) {
            statistics.deleted_constraints += 1;
        }
    }
    problem.delete_carrier(constraint.carrier);
    constraint.deleted = true;

    statistics.deleted_constraints += 1;
    statistics.upgraded_constraints += 1;

    Ok(UpgradeOutcome::Upgraded)
}

#[derive(Debug)]
enum Replacement {
    None,
    Infeasible {
        fixed_variables: usize,
    },
    Constraint {
        constraint: LinearConstraint,
        fixed_variables: usize,
    },
}

/// The variables of the carrier which are not resultants of the terms of the constraint.
fn linear_variables(
    constraint: &PseudoBooleanConstraint,
    registry: &TermRegistry,
    problem: &Problem,
) -> Vec<VariableId> {
    let resultants = constraint
        .entries
        .iter()
        .map(|entry| registry.term_of(&entry.handle).resultant())
        .collect::<Vec<_>>();

    problem
        .carrier(constraint.carrier)
        .data()
        .variables()
        .iter()
        .copied()
        .filter(|variable| !resultants.contains(variable))
        .collect()
}

fn find_pattern(
    constraint: &PseudoBooleanConstraint,
    registry: &TermRegistry,
    allow_single_term: bool,
) -> Option<SharedPattern> {
    let terms = constraint
        .entries
        .iter()
        .map(|entry| registry.term_of(&entry.handle).variables())
        .collect::<Vec<_>>();
    shared_pattern(&terms, allow_single_term)
}

/// Fixes every variable to 1 and returns the number of changed variables. On an empty domain the
/// error holds the number of variables changed before it.
fn fix_to_one(problem: &mut Problem, variables: &[VariableId]) -> Result<usize, usize> {
    let mut fixed = 0;
    for &variable in variables {
        match problem.fix_variable(variable, 1) {
            Ok(true) => fixed += 1,
            Ok(false) => {}
            Err(_) => return Err(fixed),
        }
    }
    Ok(fixed)
}

/// `sum(prod(term_j)) + sum(x_i) >= 1`
fn upgrade_logic_or(
    constraint: &PseudoBooleanConstraint,
    registry: &TermRegistry,
    problem: &mut Problem,
) -> Result<Replacement, PseudoBooleanError> {
    let linear = linear_variables(constraint, registry, problem);
    if constraint.entries.len() == 1 && !linear.is_empty() {
        return Ok(Replacement::None);
    }

    let Some(pattern) = find_pattern(constraint, registry, linear.is_empty()) else {
        return Ok(Replacement::None);
    };

    let mut replacement = LinearConstraint::new(vec![], vec![], Some(1), None)?;
    for &variable in &pattern.excess {
        replacement.add_coefficient(variable, 1)?;
    }

    let mut fixed_variables = 0;
    if linear.is_empty() {
        match fix_to_one(problem, &pattern.shared) {
            Ok(fixed) => fixed_variables = fixed,
            Err(fixed_variables) => return Ok(Replacement::Infeasible { fixed_variables }),
        }
    } else {
        let number_of_terms = constraint.entries.len() as i64;
        let linear_weight = number_of_terms * pattern.shared.len() as i64 + 1;

        for &variable in &pattern.shared {
            replacement.add_coefficient(variable, number_of_terms)?;
        }
        for &variable in &linear {
            replacement.add_coefficient(variable, linear_weight)?;
        }
        replacement.change_lhs(Some(linear_weight))?;
    }

    Ok(Replacement::Constraint {
        constraint: replacement,
        fixed_variables,
    })
}

/// `sum(prod(term_j)) <= 1` or `sum(prod(term_j)) == 1`
fn upgrade_set_ppc(
    constraint: &PseudoBooleanConstraint,
    registry: &TermRegistry,
    problem: &mut Problem,
) -> Result<Replacement, PseudoBooleanError> {
    if constraint.entries.len() == 1 || constraint.number_of_linear_variables > 0 {
        return Ok(Replacement::None);
    }

    let Some(pattern) = find_pattern(constraint, registry, false) else {
        return Ok(Replacement::None);
    };

    let number_of_terms = constraint.entries.len() as i64;
    let number_of_shared = pattern.shared.len() as i64;

    let (mut replacement, fixed_variables) =
        if constraint.carrier_type == LinearConstraintType::SetPartitioning {
            let fixed = match fix_to_one(problem, &pattern.shared) {
                Ok(fixed) => fixed,
                Err(fixed_variables) => return Ok(Replacement::Infeasible { fixed_variables }),
            };
            (
                LinearConstraint::new(vec![], vec![], Some(1), Some(1))?,
                fixed,
            )
        } else {
            let mut replacement = LinearConstraint::new(
                vec![],
                vec![],
                None,
                Some(1 + (number_of_terms - 1) * number_of_shared),
            )?;
            for &variable in &pattern.shared {
                replacement.add_coefficient(variable, number_of_terms - 1)?;
            }
            (replacement, 0)
        };

    for &variable in &pattern.excess {
        replacement.add_coefficient(variable, 1)?;
    }

    Ok(Replacement::Constraint {
        constraint: replacement,
        fixed_variables,
    })
}
