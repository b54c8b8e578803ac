use enumset::EnumSet;
use log::trace;

use crate::containers::KeyedVec;
use crate::engine::carriers::CarrierData;
use crate::engine::carriers::CarrierId;
use crate::engine::carriers::LinearCarrier;
use crate::engine::carriers::LinearConstraintType;
use crate::engine::AndConstraint;
use crate::engine::AndConstraintFlags;
use crate::engine::AndConstraintId;
use crate::engine::EmptyDomain;
use crate::engine::LockDirection;
use crate::engine::VariableId;
use crate::engine::VariableInfo;
use crate::pumpkin_assert_moderate;

/// A carrier constraint together with the bookkeeping the solver keeps for it.
#[derive(Clone, Debug)]
pub struct Carrier {
    name: String,
    constraint: LinearCarrier,
    modifiable: bool,
    deleted: bool,
    /// Set when the carrier should be promoted to an ordinary linear constraint
    marked_for_upgrade: bool,
}

impl Carrier {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constraint(&self) -> &LinearCarrier {
        &self.constraint
    }

    pub fn data(&self) -> &dyn CarrierData {
        self.constraint.data()
    }

    pub fn data_mut(&mut self) -> &mut dyn CarrierData {
        self.constraint.data_mut()
    }

    pub fn constraint_type(&self) -> LinearConstraintType {
        self.constraint.data().constraint_type()
    }

    pub fn is_modifiable(&self) -> bool {
        self.modifiable
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn is_marked_for_upgrade(&self) -> bool {
        self.marked_for_upgrade
    }
}

/// The problem the pseudo-boolean handler works on.
///
/// It owns every variable and constraint; the handler refers to them through [`VariableId`],
/// [`AndConstraintId`] and [`CarrierId`]. Operations which would be performed by other parts of a
/// solver (e.g. removing a fixed variable from an AND-constraint) are available as well, so that
/// the effect of such changes on the pseudo-boolean constraints can be reproduced.
#[derive(Debug, Default)]
pub struct Problem {
    variables: KeyedVec<VariableId, VariableInfo>,
    and_constraints: KeyedVec<AndConstraintId, AndConstraint>,
    carriers: KeyedVec<CarrierId, Carrier>,
    /// The number of lock and unlock calls which changed at least one lock
    lock_operations: usize,
}

impl Problem {
    /// Creates a new binary variable with bounds `[0, 1]`.
    pub fn new_variable(&mut self, name: impl Into<String>) -> VariableId {
        self.variables
            .push(VariableInfo::new(name.into(), false, 0))
    }

    /// Creates a binary variable on behalf of a constraint handler.
    pub fn new_artificial_variable(
        &mut self,
        name: impl Into<String>,
        branch_priority: i32,
    ) -> VariableId {
        self.variables
            .push(VariableInfo::new(name.into(), true, branch_priority))
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn variable_name(&self, variable: VariableId) -> &str {
        &self.variables[variable].name
    }

    pub fn lower_bound(&self, variable: VariableId) -> i64 {
        self.variables[variable].lower_bound
    }

    pub fn upper_bound(&self, variable: VariableId) -> i64 {
        self.variables[variable].upper_bound
    }

    pub fn is_fixed(&self, variable: VariableId) -> bool {
        self.variables[variable].is_fixed()
    }

    pub fn branch_priority(&self, variable: VariableId) -> i32 {
        self.variables[variable].branch_priority
    }

    pub fn is_artificial(&self, variable: VariableId) -> bool {
        self.variables[variable].artificial
    }

    /// Fixes the variable to `value`.
    ///
    /// Returns whether the bounds changed; fixing to a value outside of the current bounds results
    /// in [`EmptyDomain`].
    pub fn fix_variable(&mut self, variable: VariableId, value: i64) -> Result<bool, EmptyDomain> {
        let changed = self.variables[variable].fix(value)?;
        if changed {
            trace!("fixed {} to {value}", self.variables[variable].name);
        }
        Ok(changed)
    }

    pub fn capture_variable(&mut self, variable: VariableId) {
        self.variables[variable].captures += 1;
    }

    pub fn release_variable(&mut self, variable: VariableId) {
        let info = &mut self.variables[variable];
        pumpkin_assert_moderate!(
            info.captures > 0,
            "released {} more often than it was captured",
            info.name
        );
        info.captures -= 1;
    }

    pub fn captures(&self, variable: VariableId) -> u32 {
        self.variables[variable].captures
    }

    /// Returns the number of `(down, up)` locks of the variable.
    pub fn locks(&self, variable: VariableId) -> (u32, u32) {
        let info = &self.variables[variable];
        (info.locks_down, info.locks_up)
    }

    pub fn add_locks(&mut self, variable: VariableId, directions: EnumSet<LockDirection>) {
        if directions.is_empty() {
            return;
        }
        self.lock_operations += 1;

        let info = &mut self.variables[variable];
        if directions.contains(LockDirection::Down) {
            info.locks_down += 1;
        }
        if directions.contains(LockDirection::Up) {
            info.locks_up += 1;
        }
    }

    pub fn remove_locks(&mut self, variable: VariableId, directions: EnumSet<LockDirection>) {
        if directions.is_empty() {
            return;
        }
        self.lock_operations += 1;

        let info = &mut self.variables[variable];
        if directions.contains(LockDirection::Down) {
            pumpkin_assert_moderate!(info.locks_down > 0, "negative down-locks on {}", info.name);
            info.locks_down -= 1;
        }
        if directions.contains(LockDirection::Up) {
            pumpkin_assert_moderate!(info.locks_up > 0, "negative up-locks on {}", info.name);
            info.locks_up -= 1;
        }
    }

    /// The total number of lock changes performed so far.
    pub fn lock_operations(&self) -> usize {
        self.lock_operations
    }

    pub fn create_and_constraint(
        &mut self,
        name: impl Into<String>,
        resultant: VariableId,
        variables: Vec<VariableId>,
        flags: AndConstraintFlags,
    ) -> AndConstraintId {
        self.and_constraints
            .push(AndConstraint::new(name.into(), resultant, variables, flags))
    }

    pub fn and_constraint(&self, id: AndConstraintId) -> &AndConstraint {
        &self.and_constraints[id]
    }

    /// The number of AND-constraints ever created, including deleted ones.
    pub fn num_and_constraints(&self) -> usize {
        self.and_constraints.len()
    }

    pub fn and_constraints(&self) -> impl Iterator<Item = (AndConstraintId, &AndConstraint)> {
        self.and_constraints.iter_with_keys()
    }

    pub fn sort_and_constraint(&mut self, id: AndConstraintId) {
        self.and_constraints[id].sort();
    }

    pub fn delete_and_constraint(&mut self, id: AndConstraintId) {
        let constraint = &mut self.and_constraints[id];
        if !constraint.deleted {
            trace!("deleted {}", constraint.name);
            constraint.deleted = true;
        }
    }

    pub fn set_and_constraint_checked(&mut self, id: AndConstraintId, checked: bool) {
        self.and_constraints[id].checked = checked;
    }

    /// Removes a variable from an AND-constraint, as happens when it is fixed to 1.
    pub fn remove_from_and_constraint(&mut self, id: AndConstraintId, variable: VariableId) -> bool {
        self.and_constraints[id].remove_variable(variable)
    }

    /// Replaces a variable of an AND-constraint, as happens when it is aggregated.
    pub fn replace_in_and_constraint(
        &mut self,
        id: AndConstraintId,
        old: VariableId,
        new: VariableId,
    ) -> bool {
        self.and_constraints[id].replace_variable(old, new)
    }

    pub fn create_carrier(
        &mut self,
        name: impl Into<String>,
        constraint: LinearCarrier,
        modifiable: bool,
    ) -> CarrierId {
        let name = name.into();
        trace!(
            "created {} constraint {name}",
            constraint.data().constraint_type()
        );
        self.carriers.push(Carrier {
            name,
            constraint,
            modifiable,
            deleted: false,
            marked_for_upgrade: false,
        })
    }

    pub fn carrier(&self, id: CarrierId) -> &Carrier {
        &self.carriers[id]
    }

    pub fn carrier_mut(&mut self, id: CarrierId) -> &mut Carrier {
        &mut self.carriers[id]
    }

    pub fn carriers(&self) -> impl Iterator<Item = (CarrierId, &Carrier)> {
        self.carriers.iter_with_keys()
    }

    pub fn delete_carrier(&mut self, id: CarrierId) {
        let carrier = &mut self.carriers[id];
        if !carrier.deleted {
            trace!("deleted {}", carrier.name);
            carrier.deleted = true;
        }
    }

    pub fn mark_upgrade_linear(&mut self, id: CarrierId) {
        self.carriers[id].marked_for_upgrade = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::carriers::LinearConstraint;

    #[test]
    fn locks_are_counted_per_direction() {
        let mut problem = Problem::default();
        let x = problem.new_variable("x");

        problem.add_locks(x, LockDirection::both());
        problem.add_locks(x, LockDirection::Down.into());
        problem.remove_locks(x, LockDirection::Up.into());

        assert_eq!(problem.locks(x), (2, 0));
        assert_eq!(problem.lock_operations(), 3);
    }

    #[test]
    fn empty_direction_sets_are_not_lock_operations() {
        let mut problem = Problem::default();
        let x = problem.new_variable("x");

        problem.add_locks(x, EnumSet::empty());

        assert_eq!(problem.lock_operations(), 0);
    }

    #[test]
    fn deleted_carriers_keep_their_data() {
        let mut problem = Problem::default();
        let x = problem.new_variable("x");
        let carrier = LinearCarrier::Linear(
            LinearConstraint::new(vec![x], vec![2], None, Some(1)).unwrap(),
        );
        let id = problem.create_carrier("c", carrier, false);

        problem.delete_carrier(id);

        assert!(problem.carrier(id).is_deleted());
        assert_eq!(problem.carrier(id).data().variables(), &[x]);
    }

    #[test]
    fn artificial_variables_carry_their_branch_priority() {
        let mut problem = Problem::default();
        let resultant = problem.new_artificial_variable("andresultant_0", -1);

        assert!(problem.is_artificial(resultant));
        assert_eq!(problem.branch_priority(resultant), -1);
        assert_eq!(problem.variable_name(resultant), "andresultant_0");
    }
}
