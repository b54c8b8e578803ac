use std::cmp::Ordering;

use itertools::Itertools;
use log::debug;
use log::warn;

use super::carrier_selection::select_carrier_type;
use super::lock_synchronizer::lock_term;
use super::lock_synchronizer::resync_term;
use super::lock_synchronizer::unlock_term;
use super::lock_synchronizer::TermLocking;
use super::upgrade::try_upgrade;
use super::upgrade::UpgradeOutcome;
use super::PseudoBooleanConstraint;
use super::PseudoBooleanConstraintArguments;
use super::PseudoBooleanConstraintId;
use super::PseudoBooleanOptions;
use super::SoftConstraint;
use super::Term;
use super::TermEntry;
use super::TermId;
use super::TermRegistry;
use crate::basic_types::InvalidData;
use crate::basic_types::PresolveResult;
use crate::basic_types::PresolveStatistics;
use crate::basic_types::PseudoBooleanError;
use crate::containers::HashMap;
use crate::containers::KeyedVec;
use crate::engine::carriers::check_sides;
use crate::engine::carriers::CarrierId;
use crate::engine::carriers::LinearCarrier;
use crate::engine::carriers::LinearConstraintType;
use crate::engine::Problem;
use crate::engine::VariableId;
use crate::pumpkin_assert_moderate;
use crate::statistics::should_log_statistics;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

/// The status flags of a pseudo-boolean constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConstraintFlags {
    /// The constraint changed during the last reconciliation with its carrier
    pub changed: bool,
    pub propagated: bool,
    pub presolved: bool,
    pub upgrade_tried: bool,
    pub modifiable: bool,
    pub checked: bool,
}

/// The constraint handler for pseudo-boolean constraints
/// `lhs <= sum(a_i * x_i) + sum(b_j * prod(y_jk)) <= rhs`.
///
/// The linear part (including one resultant variable per AND-term) is stored in a carrier
/// constraint of the [`Problem`], every AND-term is stored once in the [`TermRegistry`] and shared
/// by all constraints which contain it. Each call to [`PseudoBooleanHandler::presolve_round`]
/// brings the constraints back in line with the changes the rest of the solver made to the
/// carriers and AND-constraints, and then tries to replace constraints by linear ones.
#[derive(Debug)]
pub struct PseudoBooleanHandler {
    options: PseudoBooleanOptions,
    registry: TermRegistry,
    constraints: KeyedVec<PseudoBooleanConstraintId, PseudoBooleanConstraint>,
    statistics: PresolveStatistics,
    last_round: PresolveStatistics,
}

impl Default for PseudoBooleanHandler {
    fn default() -> Self {
        PseudoBooleanHandler::new(PseudoBooleanOptions::default())
    }
}

impl PseudoBooleanHandler {
    pub fn new(options: PseudoBooleanOptions) -> PseudoBooleanHandler {
        PseudoBooleanHandler {
            options,
            registry: TermRegistry::new(
                options.term_table_capacity,
                options.and_constraint_flags(),
            ),
            constraints: KeyedVec::default(),
            statistics: PresolveStatistics::default(),
            last_round: PresolveStatistics::default(),
        }
    }

    pub fn options(&self) -> &PseudoBooleanOptions {
        &self.options
    }

    pub fn registry(&self) -> &TermRegistry {
        &self.registry
    }

    /// The reductions of all presolving rounds so far.
    pub fn statistics(&self) -> PresolveStatistics {
        self.statistics
    }

    /// The reductions of the last presolving round.
    pub fn last_round_statistics(&self) -> PresolveStatistics {
        self.last_round
    }

    fn live_constraint(
        constraints: &KeyedVec<PseudoBooleanConstraintId, PseudoBooleanConstraint>,
        id: PseudoBooleanConstraintId,
    ) -> Result<&PseudoBooleanConstraint, PseudoBooleanError> {
        constraints
            .get(id)
            .filter(|constraint| !constraint.deleted)
            .ok_or_else(|| PseudoBooleanError::UnknownConstraint(id.to_string()))
    }

    fn live_constraint_mut(
        constraints: &mut KeyedVec<PseudoBooleanConstraintId, PseudoBooleanConstraint>,
        id: PseudoBooleanConstraintId,
    ) -> Result<&mut PseudoBooleanConstraint, PseudoBooleanError> {
        constraints
            .get_mut(id)
            .filter(|constraint| !constraint.deleted)
            .ok_or_else(|| PseudoBooleanError::UnknownConstraint(id.to_string()))
    }

    /// Creates a new pseudo-boolean constraint.
    ///
    /// Duplicate AND-terms and duplicate linear variables are merged by summing their
    /// coefficients; terms whose coefficients cancel out are dropped.
    pub fn create_constraint(
        &mut self,
        problem: &mut Problem,
        arguments: PseudoBooleanConstraintArguments,
    ) -> Result<PseudoBooleanConstraintId, PseudoBooleanError> {
        let PseudoBooleanConstraintArguments {
            name,
            linear,
            terms,
            lhs,
            rhs,
            modifiable,
            checked,
            carrier_type,
            soft,
        } = arguments;

        check_sides(lhs, rhs)?;
        if let Some(soft) = soft {
            if soft.weight == 0 {
                return Err(InvalidData::ZeroSoftWeight.into());
            }
            if modifiable {
                return Err(InvalidData::ModifiableSoftConstraint.into());
            }
        }

        let linear = merge_duplicates(linear);
        let terms = merge_duplicates(
            terms
                .into_iter()
                .map(|(mut variables, coefficient)| {
                    variables.sort_unstable();
                    variables.dedup();
                    (variables, coefficient)
                })
                .collect(),
        );
        if terms.iter().any(|(variables, _)| variables.is_empty()) {
            return Err(InvalidData::EmptyTerm.into());
        }

        let coefficients = linear
            .iter()
            .map(|&(_, coefficient)| coefficient)
            .chain(terms.iter().map(|&(_, coefficient)| coefficient))
            .collect::<Vec<_>>();
        let carrier_type = carrier_type.unwrap_or_else(|| {
            select_carrier_type(
                &coefficients,
                lhs,
                rhs,
                modifiable,
                self.options.carrier_selection,
            )
        });

        let mut carrier = LinearCarrier::empty(carrier_type, lhs, rhs)?;
        if carrier.data().lhs() != lhs || carrier.data().rhs() != rhs {
            return Err(InvalidData::UnsupportedSides(carrier_type).into());
        }
        for &(variable, coefficient) in &linear {
            if self.registry.lookup_resultant(variable).is_some() {
                return Err(InvalidData::ResultantAsLinearVariable(variable).into());
            }
            carrier.data_mut().add_coefficient(variable, coefficient)?;
        }

        let mut entries = Vec::with_capacity(terms.len());
        for (variables, coefficient) in terms {
            match self.registry.find_or_create(problem, &variables) {
                Ok((handle, _)) => entries.push(TermEntry {
                    handle,
                    coefficient,
                }),
                Err(error) => {
                    release_entries(&mut self.registry, problem, entries);
                    return Err(error);
                }
            }
        }
        entries.sort_by_key(|entry| self.registry.term_of(&entry.handle).resultant());

        let rejected = entries.iter().find_map(|entry| {
            let resultant = self.registry.term_of(&entry.handle).resultant();
            carrier
                .data_mut()
                .add_coefficient(resultant, entry.coefficient)
                .err()
        });
        if let Some(error) = rejected {
            release_entries(&mut self.registry, problem, entries);
            return Err(error.into());
        }

        let carrier = problem.create_carrier(
            format!("pseudoboolean_linear{}", self.constraints.len()),
            carrier,
            modifiable,
        );

        for entry in &entries {
            let locking = TermLocking::new(entry.coefficient, lhs, rhs);
            lock_term(problem, self.registry.term_of(&entry.handle), locking);
        }

        debug!(
            "created {name} with {} AND-terms and a {carrier_type} carrier",
            entries.len()
        );

        Ok(self.constraints.push(PseudoBooleanConstraint {
            name,
            carrier,
            carrier_type,
            lhs,
            rhs,
            entries,
            number_of_linear_variables: linear.len(),
            changed: true,
            propagated: false,
            presolved: false,
            upgrade_tried: false,
            modifiable,
            checked,
            soft,
            deleted: false,
        }))
    }

    /// Adds `coefficient * prod(variables)` to the constraint.
    pub fn add_term(
        &mut self,
        problem: &mut Problem,
        id: PseudoBooleanConstraintId,
        mut variables: Vec<VariableId>,
        coefficient: i64,
    ) -> Result<(), PseudoBooleanError> {
        let constraint = Self::live_constraint_mut(&mut self.constraints, id)?;
        let registry = &mut self.registry;

        variables.sort_unstable();
        variables.dedup();
        if variables.is_empty() {
            return Err(InvalidData::EmptyTerm.into());
        }
        if coefficient == 0 {
            return Ok(());
        }

        let (handle, _) = registry.find_or_create(problem, &variables)?;
        let resultant = registry.term_of(&handle).resultant();

        if let Err(error) = problem
            .carrier_mut(constraint.carrier)
            .data_mut()
            .add_coefficient(resultant, coefficient)
        {
            let _ = registry.release(problem, handle);
            return Err(error.into());
        }

        let (lhs, rhs) = (constraint.lhs, constraint.rhs);
        match constraint
            .entries
            .binary_search_by_key(&resultant, |entry| {
                registry.term_of(&entry.handle).resultant()
            }) {
            Ok(position) => {
                let _ = registry.release(problem, handle);

                let entry = &mut constraint.entries[position];
                let old = TermLocking::new(entry.coefficient, lhs, rhs);
                let new = TermLocking::new(entry.coefficient + coefficient, lhs, rhs);

                if new.coefficient == 0 {
                    unlock_term(problem, registry.term_of(&entry.handle), old);
                    let entry = constraint.entries.remove(position);
                    let _ = registry.release(problem, entry.handle);
                } else {
                    let _ = resync_term(problem, registry.term_of(&entry.handle), old, new);
                    entry.coefficient = new.coefficient;
                }
            }
            Err(position) => {
                let locking = TermLocking::new(coefficient, lhs, rhs);
                lock_term(problem, registry.term_of(&handle), locking);
                constraint.entries.insert(
                    position,
                    TermEntry {
                        handle,
                        coefficient,
                    },
                );
            }
        }

        constraint.mark_changed();
        Ok(())
    }

    /// Adds `coefficient * variable` to the linear part of the constraint.
    ///
    /// Resultants of AND-terms are rejected; products are added through
    /// [`PseudoBooleanHandler::add_term`].
    pub fn add_linear_coefficient(
        &mut self,
        problem: &mut Problem,
        id: PseudoBooleanConstraintId,
        variable: VariableId,
        coefficient: i64,
    ) -> Result<(), PseudoBooleanError> {
        let constraint = Self::live_constraint_mut(&mut self.constraints, id)?;
        if self.registry.lookup_resultant(variable).is_some() {
            return Err(InvalidData::ResultantAsLinearVariable(variable).into());
        }

        let carrier = problem.carrier_mut(constraint.carrier).data_mut();
        carrier.add_coefficient(variable, coefficient)?;
        constraint.number_of_linear_variables =
            carrier.variables().len() - constraint.entries.len();

        constraint.mark_changed();
        Ok(())
    }

    /// Changes the left-hand side; only supported for constraints with a linear carrier.
    pub fn change_lhs(
        &mut self,
        problem: &mut Problem,
        id: PseudoBooleanConstraintId,
        lhs: Option<i64>,
    ) -> Result<(), PseudoBooleanError> {
        let rhs = Self::live_constraint(&self.constraints, id)?.rhs;
        self.change_sides(problem, id, lhs, rhs)
    }

    /// Changes the right-hand side; only supported for constraints with a linear carrier.
    pub fn change_rhs(
        &mut self,
        problem: &mut Problem,
        id: PseudoBooleanConstraintId,
        rhs: Option<i64>,
    ) -> Result<(), PseudoBooleanError> {
        let lhs = Self::live_constraint(&self.constraints, id)?.lhs;
        self.change_sides(problem, id, lhs, rhs)
    }

    fn change_sides(
        &mut self,
        problem: &mut Problem,
        id: PseudoBooleanConstraintId,
        lhs: Option<i64>,
        rhs: Option<i64>,
    ) -> Result<(), PseudoBooleanError> {
        let constraint = Self::live_constraint_mut(&mut self.constraints, id)?;
        if constraint.carrier_type != LinearConstraintType::Linear {
            return Err(InvalidData::UnsupportedSideChange(constraint.carrier_type).into());
        }
        check_sides(lhs, rhs)?;
        if (constraint.lhs, constraint.rhs) == (lhs, rhs) {
            return Ok(());
        }

        // The carrier rejects crossing sides after each single change.
        let carrier = problem.carrier_mut(constraint.carrier).data_mut();
        if lhs.is_some_and(|lhs| constraint.rhs.is_some_and(|rhs| lhs > rhs)) {
            carrier.change_rhs(rhs)?;
            carrier.change_lhs(lhs)?;
        } else {
            carrier.change_lhs(lhs)?;
            carrier.change_rhs(rhs)?;
        }

        for entry in &constraint.entries {
            let old = TermLocking::new(entry.coefficient, constraint.lhs, constraint.rhs);
            let new = TermLocking::new(entry.coefficient, lhs, rhs);
            let _ = resync_term(problem, self.registry.term_of(&entry.handle), old, new);
        }

        constraint.lhs = lhs;
        constraint.rhs = rhs;
        constraint.mark_changed();
        Ok(())
    }

    /// Deletes the constraint together with its carrier, and gives back its AND-terms.
    pub fn delete_constraint(
        &mut self,
        problem: &mut Problem,
        id: PseudoBooleanConstraintId,
    ) -> Result<(), PseudoBooleanError> {
        let constraint = Self::live_constraint_mut(&mut self.constraints, id)?;

        for entry in constraint.entries.drain(..) {
            let locking = TermLocking::new(entry.coefficient, constraint.lhs, constraint.rhs);
            unlock_term(problem, self.registry.term_of(&entry.handle), locking);
            let _ = self.registry.release(problem, entry.handle);
        }
        problem.delete_carrier(constraint.carrier);
        constraint.deleted = true;

        debug!("deleted {}", constraint.name);
        Ok(())
    }

    /// Records that the constraint was propagated since its last change.
    pub fn mark_propagated(
        &mut self,
        id: PseudoBooleanConstraintId,
    ) -> Result<(), PseudoBooleanError> {
        Self::live_constraint_mut(&mut self.constraints, id)?.propagated = true;
        Ok(())
    }

    /// Performs one presolving round: reads the changes the solver made to the AND-constraints
    /// and carriers, moves the rounding locks accordingly, commits the new AND-term variables,
    /// and tries to upgrade every constraint which changed.
    pub fn presolve_round(
        &mut self,
        problem: &mut Problem,
    ) -> Result<PresolveResult, PseudoBooleanError> {
        let mut statistics = PresolveStatistics::default();

        let _ = self.registry.compute_changes(problem);

        for id in self.constraints.keys() {
            if !self.constraints[id].deleted {
                self.reconcile(problem, id, &mut statistics);
            }
        }

        self.registry.commit_changes(problem);

        let mut cutoff = false;
        for id in self.constraints.keys() {
            let constraint = &mut self.constraints[id];
            if constraint.deleted
                || constraint.modifiable
                || constraint.soft.is_some()
                || constraint.upgrade_tried
            {
                continue;
            }
            constraint.upgrade_tried = true;

            let outcome = try_upgrade(constraint, &mut self.registry, problem, &mut statistics)?;
            if outcome == UpgradeOutcome::Cutoff {
                warn!("fixing variables while upgrading {} is infeasible", constraint.name);
                cutoff = true;
                break;
            }
        }

        for id in self.constraints.keys() {
            let constraint = &mut self.constraints[id];
            if !constraint.deleted {
                constraint.presolved = true;
            }
        }

        pumpkin_assert_moderate!(self.is_consistent());

        debug!("presolving round finished: {statistics:?}");
        self.statistics.accumulate(&statistics);
        self.last_round = statistics;

        Ok(if cutoff {
            PresolveResult::Cutoff
        } else if statistics.found_reductions() {
            PresolveResult::Changed
        } else {
            PresolveResult::Unchanged
        })
    }

    /// Brings a constraint in line with its carrier.
    fn reconcile(
        &mut self,
        problem: &mut Problem,
        id: PseudoBooleanConstraintId,
        statistics: &mut PresolveStatistics,
    ) {
        let constraint = &mut self.constraints[id];
        let registry = &mut self.registry;
        let (old_lhs, old_rhs) = (constraint.lhs, constraint.rhs);
        constraint.changed = false;

        if problem.carrier(constraint.carrier).is_deleted() {
            debug!("the carrier of {} was deleted", constraint.name);
            for entry in constraint.entries.drain(..) {
                let term = registry.term_of(&entry.handle);
                problem.set_and_constraint_checked(term.carrier(), constraint.checked);
                unlock_term(
                    problem,
                    term,
                    TermLocking::new(entry.coefficient, old_lhs, old_rhs),
                );
                if registry.release(problem, entry.handle) {
                    statistics.deleted_constraints += 1;
                }
            }
            constraint.deleted = true;
            statistics.deleted_constraints += 1;
            return;
        }

        let carrier = problem.carrier(constraint.carrier).data();
        let (new_lhs, new_rhs) = (carrier.lhs(), carrier.rhs());
        let mut number_of_linear_variables = 0;
        let mut resultants = carrier
            .variables()
            .iter()
            .copied()
            .zip(carrier.coefficients())
            .filter(|&(variable, _)| {
                let is_resultant = registry.lookup_resultant(variable).is_some();
                if !is_resultant {
                    number_of_linear_variables += 1;
                }
                is_resultant
            })
            .collect::<Vec<_>>();
        resultants.sort_unstable_by_key(|&(variable, _)| variable);

        let mut changed = false;
        let old_entries = std::mem::take(&mut constraint.entries);
        let mut entries = Vec::with_capacity(resultants.len());
        let mut old_entries = old_entries.into_iter().peekable();
        let mut resultants = resultants.into_iter().peekable();

        loop {
            let order = match (old_entries.peek(), resultants.peek()) {
                (None, None) => break,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(entry), Some(&(resultant, _))) => registry
                    .term_of(&entry.handle)
                    .resultant()
                    .cmp(&resultant),
            };

            match order {
                Ordering::Less => {
                    let Some(entry) = old_entries.next() else {
                        break;
                    };
                    let locking = TermLocking::new(entry.coefficient, old_lhs, old_rhs);
                    unlock_term(problem, registry.term_of(&entry.handle), locking);
                    if registry.release(problem, entry.handle) {
                        statistics.deleted_constraints += 1;
                    }
                    statistics.changed_coefficients += 1;
                    changed = true;
                }
                Ordering::Greater => {
                    let Some((resultant, coefficient)) = resultants.next() else {
                        break;
                    };
                    let Some(handle) = registry.share(resultant) else {
                        continue;
                    };
                    changed = true;

                    if registry.term_of(&handle).has_vanished() {
                        if registry.release(problem, handle) {
                            statistics.deleted_constraints += 1;
                        }
                        number_of_linear_variables += 1;
                        continue;
                    }

                    let locking = TermLocking::new(coefficient, new_lhs, new_rhs);
                    lock_term(problem, registry.term_of(&handle), locking);
                    entries.push(TermEntry {
                        handle,
                        coefficient,
                    });
                    statistics.changed_coefficients += 1;
                }
                Ordering::Equal => {
                    let (Some(mut entry), Some((_, coefficient))) =
                        (old_entries.next(), resultants.next())
                    else {
                        break;
                    };
                    let old = TermLocking::new(entry.coefficient, old_lhs, old_rhs);
                    let term = registry.term_of(&entry.handle);

                    if term.has_vanished() {
                        unlock_term(problem, term, old);
                        if registry.release(problem, entry.handle) {
                            statistics.deleted_constraints += 1;
                        }
                        number_of_linear_variables += 1;
                        changed = true;
                        continue;
                    }

                    let new = TermLocking::new(coefficient, new_lhs, new_rhs);
                    changed |= resync_term(problem, term, old, new);
                    if entry.coefficient != coefficient {
                        entry.coefficient = coefficient;
                        statistics.changed_coefficients += 1;
                        changed = true;
                    }
                    entries.push(entry);
                }
            }
        }

        if (old_lhs, old_rhs) != (new_lhs, new_rhs) {
            constraint.lhs = new_lhs;
            constraint.rhs = new_rhs;
            statistics.changed_sides += 1;
            changed = true;
        }

        constraint.entries = entries;
        constraint.number_of_linear_variables = number_of_linear_variables;
        if changed {
            constraint.mark_changed();
        }
    }

    /// Ends the solving session: every constraint and every AND-term is released and the
    /// registry is replaced by an empty one. Rounding locks are left as they are.
    pub fn exit_solve(&mut self, problem: &mut Problem) {
        for id in self.constraints.keys() {
            let constraint = &mut self.constraints[id];
            release_entries(
                &mut self.registry,
                problem,
                std::mem::take(&mut constraint.entries),
            );
            constraint.deleted = true;
        }
        self.registry.clear(problem);
        self.registry = TermRegistry::new(
            self.options.term_table_capacity,
            self.options.and_constraint_flags(),
        );

        if should_log_statistics() {
            self.log_statistics();
        }
    }

    pub fn log_statistics(&self) {
        self.statistics
            .log(StatisticLogger::new("pseudo_boolean_presolve"));
    }

    /// Checks the constraint against a complete assignment of the variables.
    ///
    /// A soft constraint whose indicator is 1 is always satisfied.
    pub fn is_satisfied(
        &self,
        problem: &Problem,
        id: PseudoBooleanConstraintId,
        solution: impl Fn(VariableId) -> i64,
    ) -> Result<bool, PseudoBooleanError> {
        let constraint = Self::live_constraint(&self.constraints, id)?;
        if constraint
            .soft
            .is_some_and(|soft| solution(soft.indicator) == 1)
        {
            return Ok(true);
        }

        let linear_activity = self
            .linear_part(problem, constraint)
            .map(|(variable, coefficient)| coefficient * solution(variable))
            .sum::<i64>();
        let term_activity = constraint
            .entries
            .iter()
            .map(|entry| {
                let term = self.registry.term_of(&entry.handle);
                let product = term
                    .variables()
                    .iter()
                    .map(|&variable| solution(variable))
                    .product::<i64>();
                entry.coefficient * product
            })
            .sum::<i64>();
        let activity = linear_activity + term_activity;

        Ok(constraint.lhs.map_or(true, |lhs| activity >= lhs)
            && constraint.rhs.map_or(true, |rhs| activity <= rhs))
    }

    /// The carrier variables which are not the resultant of one of the terms of the constraint.
    fn linear_part<'a>(
        &'a self,
        problem: &'a Problem,
        constraint: &'a PseudoBooleanConstraint,
    ) -> impl Iterator<Item = (VariableId, i64)> + 'a {
        let resultants = constraint
            .entries
            .iter()
            .map(|entry| self.registry.term_of(&entry.handle).resultant())
            .collect::<Vec<_>>();
        let carrier = problem.carrier(constraint.carrier).data();

        carrier
            .variables()
            .iter()
            .copied()
            .zip(carrier.coefficients())
            .filter(move |(variable, _)| !resultants.contains(variable))
    }

    /// Renders the constraint, e.g. `+1 x1 +2 y1*y2 <= 3`. Soft constraints are prefixed with
    /// their weight and end with their indicator, e.g. `[5] +1 x1 +2 y1*y2 <= 3 unless r`.
    pub fn format_constraint(
        &self,
        problem: &Problem,
        id: PseudoBooleanConstraintId,
    ) -> Result<String, PseudoBooleanError> {
        let constraint = Self::live_constraint(&self.constraints, id)?;

        let linear = self
            .linear_part(problem, constraint)
            .map(|(variable, coefficient)| {
                format!("{coefficient:+} {}", problem.variable_name(variable))
            });
        let terms = constraint.entries.iter().map(|entry| {
            let term = self.registry.term_of(&entry.handle);
            let product = term
                .variables()
                .iter()
                .map(|&variable| problem.variable_name(variable))
                .join("*");
            format!("{:+} {product}", entry.coefficient)
        });

        let mut activity = linear.chain(terms).join(" ");
        if activity.is_empty() {
            activity.push('0');
        }

        let formatted = match (constraint.lhs, constraint.rhs) {
            (Some(lhs), Some(rhs)) if lhs == rhs => format!("{activity} == {rhs}"),
            (Some(lhs), Some(rhs)) => format!("{lhs} <= {activity} <= {rhs}"),
            (Some(lhs), None) => format!("{activity} >= {lhs}"),
            (None, Some(rhs)) => format!("{activity} <= {rhs}"),
            (None, None) => format!("{activity} free"),
        };

        Ok(match constraint.soft {
            Some(soft) => format!(
                "[{}] {formatted} unless {}",
                soft.weight,
                problem.variable_name(soft.indicator)
            ),
            None => formatted,
        })
    }

    pub fn linear_carrier(
        &self,
        id: PseudoBooleanConstraintId,
    ) -> Result<(CarrierId, LinearConstraintType), PseudoBooleanError> {
        let constraint = Self::live_constraint(&self.constraints, id)?;
        Ok((constraint.carrier, constraint.carrier_type))
    }

    /// The AND-terms of the constraint with their coefficients, ordered by resultant.
    pub fn terms(
        &self,
        id: PseudoBooleanConstraintId,
    ) -> Result<Vec<(&Term, i64)>, PseudoBooleanError> {
        let constraint = Self::live_constraint(&self.constraints, id)?;
        Ok(constraint
            .entries
            .iter()
            .map(|entry| (self.registry.term_of(&entry.handle), entry.coefficient))
            .collect())
    }

    pub fn lhs(&self, id: PseudoBooleanConstraintId) -> Result<Option<i64>, PseudoBooleanError> {
        Ok(Self::live_constraint(&self.constraints, id)?.lhs)
    }

    pub fn rhs(&self, id: PseudoBooleanConstraintId) -> Result<Option<i64>, PseudoBooleanError> {
        Ok(Self::live_constraint(&self.constraints, id)?.rhs)
    }

    pub fn number_of_linear_variables(
        &self,
        id: PseudoBooleanConstraintId,
    ) -> Result<usize, PseudoBooleanError> {
        Ok(Self::live_constraint(&self.constraints, id)?.number_of_linear_variables)
    }

    /// The indicator and weight of a soft constraint, `None` for hard constraints.
    pub fn soft_constraint(
        &self,
        id: PseudoBooleanConstraintId,
    ) -> Result<Option<SoftConstraint>, PseudoBooleanError> {
        Ok(Self::live_constraint(&self.constraints, id)?.soft)
    }

    pub fn name(&self, id: PseudoBooleanConstraintId) -> Result<&str, PseudoBooleanError> {
        Ok(&Self::live_constraint(&self.constraints, id)?.name)
    }

    pub fn flags(
        &self,
        id: PseudoBooleanConstraintId,
    ) -> Result<ConstraintFlags, PseudoBooleanError> {
        let constraint = Self::live_constraint(&self.constraints, id)?;
        Ok(ConstraintFlags {
            changed: constraint.changed,
            propagated: constraint.propagated,
            presolved: constraint.presolved,
            upgrade_tried: constraint.upgrade_tried,
            modifiable: constraint.modifiable,
            checked: constraint.checked,
        })
    }

    /// Returns true if the constraint was deleted or never existed.
    pub fn is_deleted(&self, id: PseudoBooleanConstraintId) -> bool {
        self.constraints
            .get(id)
            .map_or(true, |constraint| constraint.deleted)
    }

    /// Iterates over the ids of the constraints which are not deleted.
    pub fn constraints(&self) -> impl Iterator<Item = PseudoBooleanConstraintId> + '_ {
        self.constraints
            .iter_with_keys()
            .filter(|(_, constraint)| !constraint.deleted)
            .map(|(id, _)| id)
    }

    /// Every live term is referenced exactly `use_count` times by the live constraints.
    fn is_consistent(&self) -> bool {
        let mut references: HashMap<TermId, u32> = HashMap::default();
        for constraint in self.constraints.iter().filter(|constraint| !constraint.deleted) {
            for entry in &constraint.entries {
                *references.entry(entry.handle.id()).or_default() += 1;
            }
        }

        references.len() == self.registry.num_live_terms()
            && self
                .registry
                .terms()
                .all(|(id, term)| references.get(&id) == Some(&term.use_count()))
    }
}

/// Sorts the pairs by their key and sums the values of equal keys, dropping zero sums.
fn merge_duplicates<Key: Ord>(mut pairs: Vec<(Key, i64)>) -> Vec<(Key, i64)> {
    pairs.sort_by(|(first, _), (second, _)| first.cmp(second));
    pairs
        .into_iter()
        .coalesce(|(first, a), (second, b)| {
            if first == second {
                Ok((first, a + b))
            } else {
                Err(((first, a), (second, b)))
            }
        })
        .filter(|&(_, coefficient)| coefficient != 0)
        .collect()
}

fn release_entries(registry: &mut TermRegistry, problem: &mut Problem, entries: Vec<TermEntry>) {
    for entry in entries {
        let _ = registry.release(problem, entry.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Setup {
        problem: Problem,
        handler: PseudoBooleanHandler,
        x: VariableId,
        y1: VariableId,
        y2: VariableId,
        y3: VariableId,
    }

    fn setup() -> Setup {
        let mut problem = Problem::default();
        let x = problem.new_variable("x");
        let y1 = problem.new_variable("y1");
        let y2 = problem.new_variable("y2");
        let y3 = problem.new_variable("y3");

        Setup {
            problem,
            handler: PseudoBooleanHandler::default(),
            x,
            y1,
            y2,
            y3,
        }
    }

    /// `x + 2 * y1 * y2 <= 3` with a linear carrier
    fn linear_constraint(setup: &mut Setup, name: &str) -> PseudoBooleanConstraintId {
        setup
            .handler
            .create_constraint(
                &mut setup.problem,
                PseudoBooleanConstraintArguments::new(name, None, Some(3))
                    .with_linear(setup.x, 1)
                    .with_term(vec![setup.y1, setup.y2], 2)
                    .with_carrier_type(LinearConstraintType::Linear),
            )
            .expect("valid constraint")
    }

    fn resultant_of(handler: &PseudoBooleanHandler, id: PseudoBooleanConstraintId) -> VariableId {
        handler.terms(id).expect("live constraint")[0].0.resultant()
    }

    #[test]
    fn duplicate_terms_and_variables_are_merged() {
        let mut setup = setup();

        let id = setup
            .handler
            .create_constraint(
                &mut setup.problem,
                PseudoBooleanConstraintArguments::new("c", None, Some(4))
                    .with_linear(setup.x, 1)
                    .with_linear(setup.x, -1)
                    .with_term(vec![setup.y2, setup.y1], 1)
                    .with_term(vec![setup.y1, setup.y2, setup.y1], 2),
            )
            .expect("valid constraint");

        let terms = setup.handler.terms(id).unwrap();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].0.variables(), &[setup.y1, setup.y2]);
        assert_eq!(terms[0].1, 3);
        assert_eq!(setup.handler.number_of_linear_variables(id), Ok(0));
        assert_eq!(
            setup.handler.linear_carrier(id).unwrap().1,
            LinearConstraintType::Knapsack
        );
    }

    #[test]
    fn invalid_input_is_rejected() {
        let mut setup = setup();

        assert_eq!(
            setup.handler.create_constraint(
                &mut setup.problem,
                PseudoBooleanConstraintArguments::new("c", Some(2), Some(1)),
            ),
            Err(PseudoBooleanError::InvalidData(InvalidData::InvalidSides {
                lhs: 2,
                rhs: 1
            }))
        );
        assert_eq!(
            setup.handler.create_constraint(
                &mut setup.problem,
                PseudoBooleanConstraintArguments::new("c", None, Some(1))
                    .with_term(Vec::<VariableId>::new(), 1),
            ),
            Err(PseudoBooleanError::InvalidData(InvalidData::EmptyTerm))
        );
        assert_eq!(
            setup.handler.create_constraint(
                &mut setup.problem,
                PseudoBooleanConstraintArguments::new("c", None, Some(1))
                    .with_term(vec![setup.y1, setup.y2], 1)
                    .with_carrier_type(LinearConstraintType::LogicOr),
            ),
            Err(PseudoBooleanError::InvalidData(InvalidData::UnsupportedSides(
                LinearConstraintType::LogicOr
            )))
        );
    }

    #[test]
    fn rejected_coefficients_do_not_leak_terms() {
        let mut setup = setup();

        let result = setup.handler.create_constraint(
            &mut setup.problem,
            PseudoBooleanConstraintArguments::new("c", Some(1), None)
                .with_term(vec![setup.y1, setup.y2], 2)
                .with_carrier_type(LinearConstraintType::LogicOr),
        );

        assert!(matches!(
            result,
            Err(PseudoBooleanError::InvalidData(
                InvalidData::UnsupportedCoefficient { .. }
            ))
        ));
        assert_eq!(setup.handler.registry().num_live_terms(), 0);
        assert_eq!(setup.problem.captures(setup.y1), 0);
        assert_eq!(setup.problem.locks(setup.y1), (0, 0));
    }

    #[test]
    fn creation_locks_term_variables_and_resultant() {
        let mut setup = setup();

        let id = linear_constraint(&mut setup, "c");
        let resultant = resultant_of(&setup.handler, id);

        assert_eq!(setup.problem.locks(setup.y1), (0, 1));
        assert_eq!(setup.problem.locks(setup.y2), (0, 1));
        assert_eq!(setup.problem.locks(resultant), (1, 1));
        assert_eq!(setup.problem.locks(setup.x), (0, 0));
    }

    #[test]
    fn adding_and_cancelling_a_term() {
        let mut setup = setup();
        let id = linear_constraint(&mut setup, "c");

        setup
            .handler
            .add_term(&mut setup.problem, id, vec![setup.y3, setup.y1], -1)
            .unwrap();

        assert_eq!(setup.handler.terms(id).unwrap().len(), 2);
        assert_eq!(setup.problem.locks(setup.y3), (1, 0));
        assert_eq!(setup.problem.locks(setup.y1), (1, 1));

        setup
            .handler
            .add_term(&mut setup.problem, id, vec![setup.y1, setup.y3], 1)
            .unwrap();

        assert_eq!(setup.handler.terms(id).unwrap().len(), 1);
        assert_eq!(setup.handler.registry().num_live_terms(), 1);
        assert_eq!(setup.problem.locks(setup.y3), (0, 0));
        assert_eq!(setup.problem.locks(setup.y1), (0, 1));
    }

    #[test]
    fn adding_to_an_existing_term_flips_its_locks() {
        let mut setup = setup();
        let id = linear_constraint(&mut setup, "c");

        setup
            .handler
            .add_term(&mut setup.problem, id, vec![setup.y1, setup.y2], -5)
            .unwrap();

        assert_eq!(setup.handler.terms(id).unwrap()[0].1, -3);
        assert_eq!(setup.handler.registry().num_live_terms(), 1);
        assert_eq!(setup.problem.locks(setup.y1), (1, 0));
    }

    #[test]
    fn linear_coefficients_are_added_to_the_carrier() {
        let mut setup = setup();
        let id = linear_constraint(&mut setup, "c");

        setup
            .handler
            .add_linear_coefficient(&mut setup.problem, id, setup.y3, 4)
            .unwrap();

        assert_eq!(setup.handler.number_of_linear_variables(id), Ok(2));
        assert_eq!(
            setup.handler.format_constraint(&setup.problem, id).unwrap(),
            "+1 x +4 y3 +2 y1*y2 <= 3"
        );
    }

    #[test]
    fn side_changes_resynchronise_locks() {
        let mut setup = setup();
        let id = linear_constraint(&mut setup, "c");
        let resultant = resultant_of(&setup.handler, id);

        setup
            .handler
            .change_lhs(&mut setup.problem, id, Some(-5))
            .unwrap();
        assert_eq!(setup.problem.locks(setup.y1), (1, 1));

        setup.handler.change_rhs(&mut setup.problem, id, None).unwrap();
        assert_eq!(setup.problem.locks(setup.y1), (1, 0));
        assert_eq!(setup.problem.locks(resultant), (1, 1));

        setup.handler.change_lhs(&mut setup.problem, id, None).unwrap();
        assert_eq!(setup.problem.locks(setup.y1), (0, 0));
        assert_eq!(setup.problem.locks(resultant), (0, 0));

        let (carrier, _) = setup.handler.linear_carrier(id).unwrap();
        assert_eq!(setup.problem.carrier(carrier).data().lhs(), None);
        assert_eq!(setup.problem.carrier(carrier).data().rhs(), None);
    }

    #[test]
    fn sides_of_specialised_carriers_cannot_change() {
        let mut setup = setup();
        let id = setup
            .handler
            .create_constraint(
                &mut setup.problem,
                PseudoBooleanConstraintArguments::new("c", None, Some(3))
                    .with_term(vec![setup.y1, setup.y2], 2),
            )
            .unwrap();

        assert_eq!(
            setup.handler.change_rhs(&mut setup.problem, id, Some(4)),
            Err(PseudoBooleanError::InvalidData(
                InvalidData::UnsupportedSideChange(LinearConstraintType::Knapsack)
            ))
        );
    }

    #[test]
    fn deleted_constraints_are_unknown() {
        let mut setup = setup();
        let id = linear_constraint(&mut setup, "c");
        let (carrier, _) = setup.handler.linear_carrier(id).unwrap();

        setup.handler.delete_constraint(&mut setup.problem, id).unwrap();

        assert!(setup.handler.is_deleted(id));
        assert!(setup.problem.carrier(carrier).is_deleted());
        assert_eq!(setup.problem.locks(setup.y1), (0, 0));
        assert_eq!(
            setup.handler.lhs(id),
            Err(PseudoBooleanError::UnknownConstraint(id.to_string()))
        );
        assert!(setup.handler.delete_constraint(&mut setup.problem, id).is_err());
    }

    #[test]
    fn solutions_are_checked_with_products() {
        let mut setup = setup();
        let id = setup
            .handler
            .create_constraint(
                &mut setup.problem,
                PseudoBooleanConstraintArguments::new("c", None, Some(2))
                    .with_linear(setup.x, 1)
                    .with_term(vec![setup.y1, setup.y2], 2),
            )
            .unwrap();
        let (x, y2) = (setup.x, setup.y2);

        assert_eq!(
            setup.handler.is_satisfied(&setup.problem, id, |_| 1),
            Ok(false)
        );
        assert_eq!(
            setup
                .handler
                .is_satisfied(&setup.problem, id, |variable| i64::from(variable != y2)),
            Ok(true)
        );
        assert_eq!(
            setup
                .handler
                .is_satisfied(&setup.problem, id, |variable| i64::from(variable != x)),
            Ok(true)
        );
    }

    #[test]
    fn constraints_are_formatted_with_their_sides() {
        let mut setup = setup();
        let id = setup
            .handler
            .create_constraint(
                &mut setup.problem,
                PseudoBooleanConstraintArguments::new("c", Some(1), Some(1))
                    .with_linear(setup.x, 1)
                    .with_term(vec![setup.y1, setup.y2], 1),
            )
            .unwrap();

        assert_eq!(
            setup.handler.format_constraint(&setup.problem, id).unwrap(),
            "+1 x +1 y1*y2 == 1"
        );

        let ranged = linear_constraint(&mut setup, "d");
        setup
            .handler
            .change_lhs(&mut setup.problem, ranged, Some(-1))
            .unwrap();
        assert_eq!(
            setup.handler.format_constraint(&setup.problem, ranged).unwrap(),
            "-1 <= +1 x +2 y1*y2 <= 3"
        );
    }

    #[test]
    fn unchanged_rounds_perform_no_lock_operations() {
        let mut setup = setup();
        let _ = linear_constraint(&mut setup, "a");
        let _ = linear_constraint(&mut setup, "b");
        let operations = setup.problem.lock_operations();

        assert_eq!(
            setup.handler.presolve_round(&mut setup.problem),
            Ok(PresolveResult::Unchanged)
        );
        assert_eq!(
            setup.handler.presolve_round(&mut setup.problem),
            Ok(PresolveResult::Unchanged)
        );
        assert_eq!(setup.problem.lock_operations(), operations);
    }

    #[test]
    fn aggregated_variables_move_locks_and_captures() {
        let mut setup = setup();
        let id = linear_constraint(&mut setup, "c");
        let and_constraint = setup.handler.terms(id).unwrap()[0].0.carrier();

        let _ = setup
            .problem
            .replace_in_and_constraint(and_constraint, setup.y2, setup.y3);
        let _ = setup.handler.presolve_round(&mut setup.problem).unwrap();

        assert_eq!(
            setup.handler.terms(id).unwrap()[0].0.variables(),
            &[setup.y1, setup.y3]
        );
        assert_eq!(setup.problem.locks(setup.y2), (0, 0));
        assert_eq!(setup.problem.locks(setup.y3), (0, 1));
        assert_eq!(setup.problem.captures(setup.y2), 0);
        assert_eq!(setup.problem.captures(setup.y3), 1);
        assert!(setup.handler.flags(id).unwrap().changed);
    }

    #[test]
    fn coefficient_sign_flip_in_the_carrier_relocks_the_term() {
        let mut setup = setup();
        let id = linear_constraint(&mut setup, "c");
        let resultant = resultant_of(&setup.handler, id);
        let (carrier, _) = setup.handler.linear_carrier(id).unwrap();

        setup
            .problem
            .carrier_mut(carrier)
            .data_mut()
            .add_coefficient(resultant, -4)
            .unwrap();

        assert_eq!(
            setup.handler.presolve_round(&mut setup.problem),
            Ok(PresolveResult::Changed)
        );
        assert_eq!(setup.handler.terms(id).unwrap()[0].1, -2);
        assert_eq!(setup.problem.locks(setup.y1), (1, 0));
        assert_eq!(setup.problem.locks(resultant), (1, 1));
        assert_eq!(
            setup.handler.last_round_statistics().changed_coefficients,
            1
        );
    }

    #[test]
    fn side_change_in_the_carrier_is_adopted() {
        let mut setup = setup();
        let id = linear_constraint(&mut setup, "c");
        let (carrier, _) = setup.handler.linear_carrier(id).unwrap();

        setup
            .problem
            .carrier_mut(carrier)
            .data_mut()
            .change_rhs(Some(5))
            .unwrap();

        assert_eq!(
            setup.handler.presolve_round(&mut setup.problem),
            Ok(PresolveResult::Changed)
        );
        assert_eq!(setup.handler.rhs(id), Ok(Some(5)));
        assert_eq!(setup.handler.last_round_statistics().changed_sides, 1);
        assert_eq!(setup.problem.locks(setup.y1), (0, 1));
    }

    #[test]
    fn removed_resultant_releases_the_term_and_promotes_the_carrier() {
        let mut setup = setup();
        let id = linear_constraint(&mut setup, "c");
        let resultant = resultant_of(&setup.handler, id);
        let (carrier, _) = setup.handler.linear_carrier(id).unwrap();

        let _ = setup
            .problem
            .carrier_mut(carrier)
            .data_mut()
            .remove_variable(resultant);

        assert_eq!(
            setup.handler.presolve_round(&mut setup.problem),
            Ok(PresolveResult::Changed)
        );
        assert!(setup.handler.is_deleted(id));
        assert!(setup.problem.carrier(carrier).is_marked_for_upgrade());
        assert!(!setup.problem.carrier(carrier).is_deleted());
        assert_eq!(setup.handler.registry().num_live_terms(), 0);
        assert_eq!(setup.problem.locks(setup.y1), (0, 0));
        assert_eq!(setup.problem.locks(resultant), (0, 0));
    }

    #[test]
    fn vanished_term_is_dropped_during_reconciliation() {
        let mut setup = setup();
        let id = linear_constraint(&mut setup, "c");
        let and_constraint = setup.handler.terms(id).unwrap()[0].0.carrier();

        setup.problem.delete_and_constraint(and_constraint);
        let _ = setup.handler.presolve_round(&mut setup.problem).unwrap();

        assert_eq!(setup.handler.registry().num_live_terms(), 0);
        assert_eq!(setup.problem.locks(setup.y1), (0, 0));
        assert_eq!(setup.problem.captures(setup.y1), 0);
        assert!(setup.handler.is_deleted(id));
    }

    #[test]
    fn deleted_carrier_deletes_the_wrapper() {
        let mut setup = setup();
        let a = linear_constraint(&mut setup, "a");
        let b = linear_constraint(&mut setup, "b");
        let (carrier, _) = setup.handler.linear_carrier(a).unwrap();
        let and_constraint = setup.handler.terms(a).unwrap()[0].0.carrier();

        setup.problem.delete_carrier(carrier);

        assert_eq!(
            setup.handler.presolve_round(&mut setup.problem),
            Ok(PresolveResult::Changed)
        );
        assert!(setup.handler.is_deleted(a));
        assert!(!setup.handler.is_deleted(b));
        assert!(setup.problem.and_constraint(and_constraint).is_checked());
        assert!(!setup.problem.and_constraint(and_constraint).is_deleted());
        assert_eq!(setup.handler.terms(b).unwrap()[0].0.use_count(), 1);
        assert_eq!(setup.problem.locks(setup.y1), (0, 1));
    }

    #[test]
    fn deleting_the_last_user_of_a_term_counts_its_and_constraint() {
        let mut setup = setup();
        let id = linear_constraint(&mut setup, "c");
        let (carrier, _) = setup.handler.linear_carrier(id).unwrap();
        let and_constraint = setup.handler.terms(id).unwrap()[0].0.carrier();

        setup.problem.delete_carrier(carrier);

        assert_eq!(
            setup.handler.presolve_round(&mut setup.problem),
            Ok(PresolveResult::Changed)
        );
        assert!(setup.problem.and_constraint(and_constraint).is_deleted());
        assert_eq!(
            setup.handler.last_round_statistics().deleted_constraints,
            2
        );
    }

    #[test]
    fn resultants_are_rejected_as_linear_variables() {
        let mut setup = setup();
        let id = setup
            .handler
            .create_constraint(
                &mut setup.problem,
                PseudoBooleanConstraintArguments::new("c", None, Some(3))
                    .with_term(vec![setup.y1, setup.y2], 2)
                    .with_carrier_type(LinearConstraintType::Linear),
            )
            .unwrap();
        let resultant = resultant_of(&setup.handler, id);
        let rejected = Err(PseudoBooleanError::InvalidData(
            InvalidData::ResultantAsLinearVariable(resultant),
        ));

        assert_eq!(
            setup
                .handler
                .add_linear_coefficient(&mut setup.problem, id, resultant, -2),
            rejected
        );
        assert_eq!(setup.handler.terms(id).unwrap()[0].1, 2);
        assert_eq!(setup.handler.number_of_linear_variables(id), Ok(0));
        assert_eq!(setup.problem.locks(resultant), (1, 1));
        assert_eq!(
            setup.handler.format_constraint(&setup.problem, id).unwrap(),
            "+2 y1*y2 <= 3"
        );

        assert_eq!(
            setup
                .handler
                .create_constraint(
                    &mut setup.problem,
                    PseudoBooleanConstraintArguments::new("d", None, Some(1))
                        .with_linear(resultant, 1),
                )
                .map(|_| ()),
            rejected
        );
        assert_eq!(setup.handler.constraints().count(), 1);
    }

    #[test]
    fn soft_constraints_are_relaxed_by_their_indicator() {
        let mut setup = setup();
        let indicator = setup.problem.new_variable("r");
        let id = setup
            .handler
            .create_constraint(
                &mut setup.problem,
                PseudoBooleanConstraintArguments::new("c", None, Some(2))
                    .with_linear(setup.x, 1)
                    .with_term(vec![setup.y1, setup.y2], 2)
                    .soft(indicator, 5),
            )
            .unwrap();

        assert_eq!(
            setup.handler.soft_constraint(id),
            Ok(Some(SoftConstraint {
                indicator,
                weight: 5
            }))
        );
        assert_eq!(
            setup.handler.is_satisfied(&setup.problem, id, |_| 1),
            Ok(true)
        );
        assert_eq!(
            setup
                .handler
                .is_satisfied(&setup.problem, id, |variable| i64::from(variable != indicator)),
            Ok(false)
        );
        assert_eq!(
            setup.handler.format_constraint(&setup.problem, id).unwrap(),
            "[5] +1 x +2 y1*y2 <= 2 unless r"
        );

        let hard = linear_constraint(&mut setup, "d");
        assert_eq!(setup.handler.soft_constraint(hard), Ok(None));
    }

    #[test]
    fn soft_constraints_need_a_weight_and_cannot_be_modifiable() {
        let mut setup = setup();
        let indicator = setup.problem.new_variable("r");
        let arguments = PseudoBooleanConstraintArguments::new("c", None, Some(2))
            .with_term(vec![setup.y1, setup.y2], 2);

        assert_eq!(
            setup.handler.create_constraint(
                &mut setup.problem,
                arguments.clone().soft(indicator, 0),
            ),
            Err(PseudoBooleanError::InvalidData(InvalidData::ZeroSoftWeight))
        );
        assert_eq!(
            setup.handler.create_constraint(
                &mut setup.problem,
                arguments.soft(indicator, 1).modifiable(true),
            ),
            Err(PseudoBooleanError::InvalidData(
                InvalidData::ModifiableSoftConstraint
            ))
        );
        assert_eq!(setup.handler.registry().num_live_terms(), 0);
    }

    #[test]
    fn soft_constraints_are_never_upgraded() {
        let mut setup = setup();
        let indicator = setup.problem.new_variable("r");
        let id = setup
            .handler
            .create_constraint(
                &mut setup.problem,
                PseudoBooleanConstraintArguments::new("c", Some(1), None)
                    .with_term(vec![setup.y1, setup.y2], 1)
                    .soft(indicator, 1),
            )
            .unwrap();
        assert_eq!(
            setup.handler.linear_carrier(id).unwrap().1,
            LinearConstraintType::LogicOr
        );

        assert_eq!(
            setup.handler.presolve_round(&mut setup.problem),
            Ok(PresolveResult::Unchanged)
        );
        assert!(!setup.handler.is_deleted(id));
        assert!(!setup.problem.is_fixed(setup.y1));
        assert!(!setup.handler.flags(id).unwrap().upgrade_tried);
    }

    #[test]
    fn modifiable_constraints_are_never_upgraded() {
        let mut setup = setup();
        let id = setup
            .handler
            .create_constraint(
                &mut setup.problem,
                PseudoBooleanConstraintArguments::new("c", Some(1), None)
                    .with_term(vec![setup.y1, setup.y2], 1)
                    .with_term(vec![setup.y1, setup.y3], 1)
                    .with_term(vec![setup.x, setup.y1], 1)
                    .modifiable(true),
            )
            .unwrap();

        assert_eq!(
            setup.handler.linear_carrier(id).unwrap().1,
            LinearConstraintType::Linear
        );
        let _ = setup.handler.presolve_round(&mut setup.problem).unwrap();

        assert!(!setup.handler.is_deleted(id));
        assert!(!setup.handler.flags(id).unwrap().upgrade_tried);
        assert!(setup.handler.flags(id).unwrap().presolved);
    }

    #[test]
    fn changes_reset_the_propagated_flag() {
        let mut setup = setup();
        let id = linear_constraint(&mut setup, "c");

        setup.handler.mark_propagated(id).unwrap();
        assert!(setup.handler.flags(id).unwrap().propagated);

        setup
            .handler
            .change_rhs(&mut setup.problem, id, Some(2))
            .unwrap();
        let flags = setup.handler.flags(id).unwrap();
        assert!(!flags.propagated);
        assert!(flags.changed);
        assert!(!flags.upgrade_tried);
    }

    #[test]
    fn exit_solve_releases_every_term() {
        let mut setup = setup();
        let id = linear_constraint(&mut setup, "c");
        let and_constraint = setup.handler.terms(id).unwrap()[0].0.carrier();

        setup.handler.exit_solve(&mut setup.problem);

        assert!(setup.handler.is_deleted(id));
        assert_eq!(setup.handler.registry().num_live_terms(), 0);
        assert!(setup.problem.and_constraint(and_constraint).is_deleted());
        assert_eq!(setup.problem.captures(setup.y1), 0);
        assert_eq!(setup.handler.constraints().count(), 0);
    }
}
