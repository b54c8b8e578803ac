use super::check_unit_coefficient;
use super::remove_unit_variable;
use super::CarrierData;
use super::LinearConstraintType;
use crate::basic_types::InvalidData;
use crate::engine::VariableId;

/// Which of the set constraints `sum(x_i) ? 1` is represented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetPpcType {
    /// `sum(x_i) <= 1`
    Packing,
    /// `sum(x_i) == 1`
    Partitioning,
    /// `sum(x_i) >= 1`
    Covering,
}

/// A set-packing, set-partitioning or set-covering constraint.
#[derive(Clone, Debug)]
pub struct SetPpcConstraint {
    variables: Vec<VariableId>,
    set_ppc_type: SetPpcType,
}

impl SetPpcConstraint {
    pub fn new(set_ppc_type: SetPpcType) -> SetPpcConstraint {
        SetPpcConstraint {
            variables: vec![],
            set_ppc_type,
        }
    }

    pub fn set_ppc_type(&self) -> SetPpcType {
        self.set_ppc_type
    }
}

impl CarrierData for SetPpcConstraint {
    fn constraint_type(&self) -> LinearConstraintType {
        match self.set_ppc_type {
            SetPpcType::Packing => LinearConstraintType::SetPacking,
            SetPpcType::Partitioning => LinearConstraintType::SetPartitioning,
            SetPpcType::Covering => LinearConstraintType::SetCovering,
        }
    }

    fn variables(&self) -> &[VariableId] {
        &self.variables
    }

    fn coefficients(&self) -> Vec<i64> {
        vec![1; self.variables.len()]
    }

    fn lhs(&self) -> Option<i64> {
        match self.set_ppc_type {
            SetPpcType::Packing => None,
            SetPpcType::Partitioning | SetPpcType::Covering => Some(1),
        }
    }

    fn rhs(&self) -> Option<i64> {
        match self.set_ppc_type {
            SetPpcType::Packing | SetPpcType::Partitioning => Some(1),
            SetPpcType::Covering => None,
        }
    }

    fn add_coefficient(
        &mut self,
        variable: VariableId,
        coefficient: i64,
    ) -> Result<(), InvalidData> {
        check_unit_coefficient(
            self.constraint_type(),
            &self.variables,
            variable,
            coefficient,
        )?;
        self.variables.push(variable);
        Ok(())
    }

    fn remove_variable(&mut self, variable: VariableId) -> Option<i64> {
        remove_unit_variable(&mut self.variables, variable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sides_follow_the_set_type() {
        let packing = SetPpcConstraint::new(SetPpcType::Packing);
        let partitioning = SetPpcConstraint::new(SetPpcType::Partitioning);
        let covering = SetPpcConstraint::new(SetPpcType::Covering);

        assert_eq!((packing.lhs(), packing.rhs()), (None, Some(1)));
        assert_eq!((partitioning.lhs(), partitioning.rhs()), (Some(1), Some(1)));
        assert_eq!((covering.lhs(), covering.rhs()), (Some(1), None));
        assert_eq!(
            partitioning.constraint_type(),
            LinearConstraintType::SetPartitioning
        );
    }
}
