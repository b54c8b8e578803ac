//! Keeps the rounding locks of AND-term variables in line with the pseudo-boolean constraints
//! which contain the terms.
use enumset::EnumSet;

use super::Term;
use crate::engine::LockDirection;
use crate::engine::Problem;
use crate::engine::VariableId;

/// The coefficient of a term together with the sides of the constraint it occurs in; this
/// determines which locks the term contributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TermLocking {
    pub(crate) coefficient: i64,
    pub(crate) lhs: Option<i64>,
    pub(crate) rhs: Option<i64>,
}

impl TermLocking {
    pub(crate) fn new(coefficient: i64, lhs: Option<i64>, rhs: Option<i64>) -> TermLocking {
        TermLocking {
            coefficient,
            lhs,
            rhs,
        }
    }

    /// The directions in which every variable of the term is locked.
    pub(crate) fn variable_directions(&self) -> EnumSet<LockDirection> {
        let mut directions = EnumSet::empty();
        let (lower, upper) = if self.coefficient > 0 {
            (LockDirection::Down, LockDirection::Up)
        } else {
            (LockDirection::Up, LockDirection::Down)
        };

        if self.lhs.is_some() {
            let _ = directions.insert(lower);
        }
        if self.rhs.is_some() {
            let _ = directions.insert(upper);
        }

        directions
    }

    /// The resultant is locked in both directions once, as soon as one side is finite.
    pub(crate) fn resultant_directions(&self) -> EnumSet<LockDirection> {
        if self.lhs.is_some() || self.rhs.is_some() {
            LockDirection::both()
        } else {
            EnumSet::empty()
        }
    }

    /// Whether switching from `self` to `other` keeps the lock directions of every variable.
    pub(crate) fn has_same_shape(&self, other: &TermLocking) -> bool {
        !sign_flipped(Some(self.coefficient), Some(other.coefficient))
            && !side_changed(self.lhs, other.lhs)
            && !side_changed(self.rhs, other.rhs)
    }
}

fn sign_flipped(old: Option<i64>, new: Option<i64>) -> bool {
    matches!((old, new), (Some(old), Some(new)) if (old < 0 && new > 0) || (old > 0 && new < 0))
}

fn side_changed(old: Option<i64>, new: Option<i64>) -> bool {
    old.is_some() != new.is_some() || sign_flipped(old, new)
}

fn lock_variables(problem: &mut Problem, variables: &[VariableId], locking: TermLocking) {
    let directions = locking.variable_directions();
    for &variable in variables {
        problem.add_locks(variable, directions);
    }
}

fn unlock_variables(problem: &mut Problem, variables: &[VariableId], locking: TermLocking) {
    let directions = locking.variable_directions();
    for &variable in variables {
        problem.remove_locks(variable, directions);
    }
}

/// Installs the locks of the term on its current variables.
pub(crate) fn lock_term(problem: &mut Problem, term: &Term, locking: TermLocking) {
    problem.add_locks(term.resultant(), locking.resultant_directions());
    lock_variables(problem, term.current_variables(), locking);
}

/// Removes the locks of the term from its committed variables.
pub(crate) fn unlock_term(problem: &mut Problem, term: &Term, locking: TermLocking) {
    problem.remove_locks(term.resultant(), locking.resultant_directions());
    unlock_variables(problem, term.variables(), locking);
}

/// Moves the locks of a term from `old` to `new`, also accounting for a pending change of its
/// variables.
///
/// Returns whether any lock changed.
pub(crate) fn resync_term(
    problem: &mut Problem,
    term: &Term,
    old: TermLocking,
    new: TermLocking,
) -> bool {
    if old.has_same_shape(&new) {
        let diff = term.diff();
        if diff.is_empty() {
            return false;
        }

        lock_variables(problem, &diff.added, new);
        unlock_variables(problem, &diff.removed, old);
    } else {
        unlock_term(problem, term, old);
        lock_term(problem, term, new);
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_coefficient_locks_follow_the_sides() {
        let locking = TermLocking::new(2, None, Some(3));

        assert_eq!(locking.variable_directions(), EnumSet::only(LockDirection::Up));
        assert_eq!(locking.resultant_directions(), LockDirection::both());
    }

    #[test]
    fn negative_coefficient_swaps_the_directions() {
        let locking = TermLocking::new(-2, None, Some(3));

        assert_eq!(locking.variable_directions(), EnumSet::only(LockDirection::Down));
    }

    #[test]
    fn free_constraints_lock_nothing() {
        let locking = TermLocking::new(1, None, None);

        assert!(locking.variable_directions().is_empty());
        assert!(locking.resultant_directions().is_empty());
    }

    #[test]
    fn shape_changes_on_sign_and_finiteness() {
        let base = TermLocking::new(2, Some(-1), Some(3));

        assert!(base.has_same_shape(&TermLocking::new(5, Some(-4), Some(0))));
        assert!(!base.has_same_shape(&TermLocking::new(-2, Some(-1), Some(3))));
        assert!(!base.has_same_shape(&TermLocking::new(2, None, Some(3))));
        assert!(!base.has_same_shape(&TermLocking::new(2, Some(1), Some(3))));
        assert!(!base.has_same_shape(&TermLocking::new(2, Some(-1), Some(-3))));
    }
}
