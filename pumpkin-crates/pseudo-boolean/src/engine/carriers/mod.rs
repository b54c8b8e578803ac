//! The linear-family constraints which carry the linear part of a pseudo-boolean constraint.
//!
//! Every carrier exposes the same contract through [`CarrierData`]; the concrete variant is
//! selected when the pseudo-boolean constraint is created.
mod knapsack;
mod linear;
mod logic_or;
mod set_ppc;

use std::fmt::Display;
use std::fmt::Formatter;

pub(crate) use linear::check_sides;
pub use knapsack::KnapsackConstraint;
pub use linear::LinearConstraint;
pub use logic_or::LogicOrConstraint;
pub use set_ppc::SetPpcConstraint;
pub use set_ppc::SetPpcType;

use crate::basic_types::InvalidData;
use crate::containers::StorageKey;
use crate::engine::VariableId;

/// Identifies a carrier constraint of the [`Problem`](crate::engine::Problem).
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct CarrierId(pub(crate) u32);

impl Display for CarrierId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl StorageKey for CarrierId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        CarrierId(index as u32)
    }
}

/// The type tag of a carrier.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum LinearConstraintType {
    Linear,
    LogicOr,
    Knapsack,
    SetPacking,
    SetPartitioning,
    SetCovering,
}

impl Display for LinearConstraintType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LinearConstraintType::Linear => write!(f, "linear"),
            LinearConstraintType::LogicOr => write!(f, "logic-or"),
            LinearConstraintType::Knapsack => write!(f, "knapsack"),
            LinearConstraintType::SetPacking => write!(f, "set-packing"),
            LinearConstraintType::SetPartitioning => write!(f, "set-partitioning"),
            LinearConstraintType::SetCovering => write!(f, "set-covering"),
        }
    }
}

/// The uniform view on a carrier: `lhs <= sum(coefficients[i] * variables[i]) <= rhs`, where a
/// side of `None` is infinite.
pub trait CarrierData {
    fn constraint_type(&self) -> LinearConstraintType;

    fn variables(&self) -> &[VariableId];

    /// The coefficients, in the same order as [`CarrierData::variables`].
    fn coefficients(&self) -> Vec<i64>;

    fn lhs(&self) -> Option<i64>;

    fn rhs(&self) -> Option<i64>;

    fn change_lhs(&mut self, lhs: Option<i64>) -> Result<(), InvalidData> {
        let _ = lhs;
        Err(InvalidData::UnsupportedSideChange(self.constraint_type()))
    }

    fn change_rhs(&mut self, rhs: Option<i64>) -> Result<(), InvalidData> {
        let _ = rhs;
        Err(InvalidData::UnsupportedSideChange(self.constraint_type()))
    }

    /// Adds `coefficient * variable` to the constraint. If the variable is already part of the
    /// constraint, the coefficients are summed.
    fn add_coefficient(&mut self, variable: VariableId, coefficient: i64)
        -> Result<(), InvalidData>;

    /// Removes the variable from the constraint, returning its coefficient if it was present.
    fn remove_variable(&mut self, variable: VariableId) -> Option<i64>;
}

/// The closed set of carrier variants.
#[derive(Clone, Debug)]
pub enum LinearCarrier {
    Linear(LinearConstraint),
    LogicOr(LogicOrConstraint),
    Knapsack(KnapsackConstraint),
    SetPpc(SetPpcConstraint),
}

impl LinearCarrier {
    pub fn data(&self) -> &dyn CarrierData {
        match self {
            LinearCarrier::Linear(constraint) => constraint,
            LinearCarrier::LogicOr(constraint) => constraint,
            LinearCarrier::Knapsack(constraint) => constraint,
            LinearCarrier::SetPpc(constraint) => constraint,
        }
    }

    pub fn data_mut(&mut self) -> &mut dyn CarrierData {
        match self {
            LinearCarrier::Linear(constraint) => constraint,
            LinearCarrier::LogicOr(constraint) => constraint,
            LinearCarrier::Knapsack(constraint) => constraint,
            LinearCarrier::SetPpc(constraint) => constraint,
        }
    }

    /// Creates an empty carrier of the given type with the given sides.
    ///
    /// The sides are only used by [`LinearConstraintType::Linear`] and
    /// [`LinearConstraintType::Knapsack`]; the other types have fixed sides.
    pub fn empty(
        constraint_type: LinearConstraintType,
        lhs: Option<i64>,
        rhs: Option<i64>,
    ) -> Result<LinearCarrier, InvalidData> {
        let carrier = match constraint_type {
            LinearConstraintType::Linear => {
                LinearCarrier::Linear(LinearConstraint::new(vec![], vec![], lhs, rhs)?)
            }
            LinearConstraintType::LogicOr => LinearCarrier::LogicOr(LogicOrConstraint::default()),
            LinearConstraintType::Knapsack => {
                LinearCarrier::Knapsack(KnapsackConstraint::new(rhs.unwrap_or(i64::MAX)))
            }
            LinearConstraintType::SetPacking => {
                LinearCarrier::SetPpc(SetPpcConstraint::new(SetPpcType::Packing))
            }
            LinearConstraintType::SetPartitioning => {
                LinearCarrier::SetPpc(SetPpcConstraint::new(SetPpcType::Partitioning))
            }
            LinearConstraintType::SetCovering => {
                LinearCarrier::SetPpc(SetPpcConstraint::new(SetPpcType::Covering))
            }
        };

        Ok(carrier)
    }
}

/// Returns whether the coefficient is the one every variable of a cardinality-style carrier
/// (logic-or, set-packing/partitioning/covering) must have.
fn check_unit_coefficient(
    constraint_type: LinearConstraintType,
    variables: &[VariableId],
    variable: VariableId,
    coefficient: i64,
) -> Result<(), InvalidData> {
    let resulting = if variables.contains(&variable) {
        coefficient + 1
    } else {
        coefficient
    };

    if resulting != 1 {
        return Err(InvalidData::UnsupportedCoefficient {
            coefficient: resulting,
            carrier_type: constraint_type,
        });
    }

    Ok(())
}

fn remove_unit_variable(variables: &mut Vec<VariableId>, variable: VariableId) -> Option<i64> {
    let position = variables.iter().position(|&other| other == variable)?;
    let _ = variables.remove(position);
    Some(1)
}
