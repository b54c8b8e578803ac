use std::fmt::Display;
use std::fmt::Formatter;

use crate::containers::StorageKey;
use crate::engine::VariableId;

/// Identifies an AND-constraint `resultant == x_1 * ... * x_n` of the problem.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct AndConstraintId(pub(crate) u32);

impl Display for AndConstraintId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "and{}", self.0)
    }
}

impl StorageKey for AndConstraintId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        AndConstraintId(index as u32)
    }
}

/// The flags an AND-constraint is created with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AndConstraintFlags {
    pub separate: bool,
    pub propagate: bool,
    pub removable: bool,
}

/// An AND-constraint stating that `resultant` is 1 iff all of `variables` are 1.
///
/// The variable list is kept up to date by the surrounding solver; it may become unsorted when
/// variables are replaced, and shrinks when fixed variables are removed.
#[derive(Clone, Debug)]
pub struct AndConstraint {
    pub(crate) name: String,
    pub(crate) resultant: VariableId,
    pub(crate) variables: Vec<VariableId>,
    pub(crate) sorted: bool,
    pub(crate) flags: AndConstraintFlags,
    /// Whether the constraint takes part in feasibility checking
    pub(crate) checked: bool,
    pub(crate) deleted: bool,
}

impl AndConstraint {
    pub(crate) fn new(
        name: String,
        resultant: VariableId,
        variables: Vec<VariableId>,
        flags: AndConstraintFlags,
    ) -> Self {
        let sorted = variables.windows(2).all(|pair| pair[0] <= pair[1]);
        AndConstraint {
            name,
            resultant,
            variables,
            sorted,
            flags,
            checked: false,
            deleted: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resultant(&self) -> VariableId {
        self.resultant
    }

    pub fn variables(&self) -> &[VariableId] {
        &self.variables
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn flags(&self) -> AndConstraintFlags {
        self.flags
    }

    /// Sorts the variables by index and removes duplicates (`x * x = x`).
    pub(crate) fn sort(&mut self) {
        if !self.sorted {
            self.variables.sort_unstable();
            self.sorted = true;
        }
        self.variables.dedup();
    }

    pub(crate) fn remove_variable(&mut self, variable: VariableId) -> bool {
        let before = self.variables.len();
        self.variables.retain(|&other| other != variable);
        before != self.variables.len()
    }

    pub(crate) fn replace_variable(&mut self, old: VariableId, new: VariableId) -> bool {
        let mut replaced = false;
        for variable in self.variables.iter_mut().filter(|variable| **variable == old) {
            *variable = new;
            replaced = true;
        }
        if replaced {
            self.sorted = false;
        }
        replaced
    }
}
