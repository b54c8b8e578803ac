use std::fmt::Display;
use std::fmt::Formatter;

use super::TermHandle;
use crate::containers::StorageKey;
use crate::engine::carriers::CarrierId;
use crate::engine::carriers::LinearConstraintType;
use crate::engine::VariableId;

/// Identifies a constraint of the [`PseudoBooleanHandler`](crate::PseudoBooleanHandler).
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct PseudoBooleanConstraintId(pub(crate) u32);

impl Display for PseudoBooleanConstraintId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "pb{}", self.0)
    }
}

impl StorageKey for PseudoBooleanConstraintId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        PseudoBooleanConstraintId(index as u32)
    }
}

/// Relaxes a constraint whenever `indicator` is 1; `weight` is the penalty paid for doing so.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SoftConstraint {
    pub indicator: VariableId,
    pub weight: i64,
}

/// The input for creating a pseudo-boolean constraint
/// `lhs <= sum(a_i * x_i) + sum(b_j * prod(y_jk)) <= rhs`.
#[derive(Clone, Debug)]
pub struct PseudoBooleanConstraintArguments {
    pub name: String,
    pub linear: Vec<(VariableId, i64)>,
    pub terms: Vec<(Vec<VariableId>, i64)>,
    pub lhs: Option<i64>,
    pub rhs: Option<i64>,
    /// Modifiable constraints may receive new variables during solving and are never upgraded.
    pub modifiable: bool,
    pub checked: bool,
    /// Forces the carrier type instead of selecting it from the coefficients and sides.
    pub carrier_type: Option<LinearConstraintType>,
    pub soft: Option<SoftConstraint>,
}

impl PseudoBooleanConstraintArguments {
    pub fn new(name: impl Into<String>, lhs: Option<i64>, rhs: Option<i64>) -> Self {
        PseudoBooleanConstraintArguments {
            name: name.into(),
            linear: vec![],
            terms: vec![],
            lhs,
            rhs,
            modifiable: false,
            checked: true,
            carrier_type: None,
            soft: None,
        }
    }

    pub fn with_linear(mut self, variable: VariableId, coefficient: i64) -> Self {
        self.linear.push((variable, coefficient));
        self
    }

    pub fn with_term(mut self, variables: impl Into<Vec<VariableId>>, coefficient: i64) -> Self {
        self.terms.push((variables.into(), coefficient));
        self
    }

    pub fn modifiable(mut self, modifiable: bool) -> Self {
        self.modifiable = modifiable;
        self
    }

    pub fn with_carrier_type(mut self, carrier_type: LinearConstraintType) -> Self {
        self.carrier_type = Some(carrier_type);
        self
    }

    /// Makes this a soft constraint which only has to hold while `indicator` is 0.
    pub fn soft(mut self, indicator: VariableId, weight: i64) -> Self {
        self.soft = Some(SoftConstraint { indicator, weight });
        self
    }
}

/// A term of a constraint together with its coefficient.
#[derive(Debug)]
pub(crate) struct TermEntry {
    pub(crate) handle: TermHandle,
    pub(crate) coefficient: i64,
}

#[derive(Debug)]
pub(crate) struct PseudoBooleanConstraint {
    pub(crate) name: String,
    pub(crate) carrier: CarrierId,
    pub(crate) carrier_type: LinearConstraintType,
    pub(crate) lhs: Option<i64>,
    pub(crate) rhs: Option<i64>,
    /// Sorted by the index of the resultant
    pub(crate) entries: Vec<TermEntry>,
    pub(crate) number_of_linear_variables: usize,
    pub(crate) changed: bool,
    pub(crate) propagated: bool,
    pub(crate) presolved: bool,
    pub(crate) upgrade_tried: bool,
    pub(crate) modifiable: bool,
    pub(crate) checked: bool,
    pub(crate) soft: Option<SoftConstraint>,
    pub(crate) deleted: bool,
}

impl PseudoBooleanConstraint {
    pub(crate) fn mark_changed(&mut self) {
        self.changed = true;
        self.propagated = false;
        self.presolved = false;
        self.upgrade_tried = false;
    }
}
