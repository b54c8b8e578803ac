use std::collections::TryReserveError;

use thiserror::Error;

use crate::engine::carriers::LinearConstraintType;
use crate::engine::VariableId;

/// The errors which can be reported by the pseudo-boolean handler and by the problem operations it
/// relies on.
///
/// Infeasibility is not an error; it is reported through
/// [`PresolveResult::Cutoff`](crate::PresolveResult::Cutoff).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PseudoBooleanError {
    #[error("Could not reserve memory for the variables of an AND-term")]
    OutOfMemory(#[from] TryReserveError),
    #[error("Invalid data: {0}")]
    InvalidData(#[from] InvalidData),
    #[error("Constraint {0} is deleted or unknown")]
    UnknownConstraint(String),
}

/// Describes which data passed to the pseudo-boolean handler or to a carrier was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidData {
    #[error("left-hand side {lhs} is greater than right-hand side {rhs}")]
    InvalidSides { lhs: i64, rhs: i64 },
    #[error("coefficient {coefficient} is not supported by a {carrier_type} constraint")]
    UnsupportedCoefficient {
        coefficient: i64,
        carrier_type: LinearConstraintType,
    },
    #[error("changing the sides is only supported for linear constraints, not for {0}")]
    UnsupportedSideChange(LinearConstraintType),
    #[error("a {0} constraint cannot represent the given sides")]
    UnsupportedSides(LinearConstraintType),
    #[error("an AND-term needs at least one variable")]
    EmptyTerm,
    #[error("{0} is the resultant of an AND-term and cannot be a linear variable")]
    ResultantAsLinearVariable(VariableId),
    #[error("a soft constraint needs a non-zero weight")]
    ZeroSoftWeight,
    #[error("a soft constraint cannot be modifiable")]
    ModifiableSoftConstraint,
}
