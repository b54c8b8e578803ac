use std::fmt::Display;
use std::fmt::Formatter;

use enumset::EnumSet;
use enumset::EnumSetType;

use crate::containers::StorageKey;

/// A handle to a binary variable of the [`Problem`](crate::engine::Problem).
///
/// Variables are totally ordered by their index, which is stable for the lifetime of the problem.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct VariableId(pub(crate) u32);

impl Display for VariableId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl StorageKey for VariableId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        VariableId(index as u32)
    }
}

/// The direction of a rounding lock.
///
/// A down-lock on a variable states that decreasing its value may violate a constraint; an
/// up-lock states the same for increasing it.
#[derive(Debug, Hash, EnumSetType)]
pub enum LockDirection {
    Down,
    Up,
}

impl LockDirection {
    pub fn both() -> EnumSet<LockDirection> {
        EnumSet::all()
    }
}

/// Returned when fixing a variable would make its domain empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptyDomain;

/// The state of a single binary variable.
#[derive(Clone, Debug)]
pub(crate) struct VariableInfo {
    pub(crate) name: String,
    pub(crate) lower_bound: i64,
    pub(crate) upper_bound: i64,
    pub(crate) locks_down: u32,
    pub(crate) locks_up: u32,
    /// The number of times the variable was captured and not yet released
    pub(crate) captures: u32,
    pub(crate) branch_priority: i32,
    /// Whether the variable was introduced by a constraint handler rather than by the user
    pub(crate) artificial: bool,
}

impl VariableInfo {
    pub(crate) fn new(name: String, artificial: bool, branch_priority: i32) -> Self {
        VariableInfo {
            name,
            lower_bound: 0,
            upper_bound: 1,
            locks_down: 0,
            locks_up: 0,
            captures: 0,
            branch_priority,
            artificial,
        }
    }

    pub(crate) fn is_fixed(&self) -> bool {
        self.lower_bound == self.upper_bound
    }

    /// Fixes the variable to `value`.
    ///
    /// Returns whether the bounds changed, or [`EmptyDomain`] if `value` lies outside of the
    /// current bounds.
    pub(crate) fn fix(&mut self, value: i64) -> Result<bool, EmptyDomain> {
        if value < self.lower_bound || value > self.upper_bound {
            return Err(EmptyDomain);
        }

        let changed = !self.is_fixed();
        self.lower_bound = value;
        self.upper_bound = value;

        Ok(changed)
    }
}
