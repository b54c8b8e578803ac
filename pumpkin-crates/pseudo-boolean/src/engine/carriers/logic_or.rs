use super::check_unit_coefficient;
use super::remove_unit_variable;
use super::CarrierData;
use super::LinearConstraintType;
use crate::basic_types::InvalidData;
use crate::engine::VariableId;

/// A clause `sum(x_i) >= 1`.
#[derive(Clone, Debug, Default)]
pub struct LogicOrConstraint {
    variables: Vec<VariableId>,
}

impl CarrierData for LogicOrConstraint {
    fn constraint_type(&self) -> LinearConstraintType {
        LinearConstraintType::LogicOr
    }

    fn variables(&self) -> &[VariableId] {
        &self.variables
    }

    fn coefficients(&self) -> Vec<i64> {
        vec![1; self.variables.len()]
    }

    fn lhs(&self) -> Option<i64> {
        Some(1)
    }

    fn rhs(&self) -> Option<i64> {
        None
    }

    fn add_coefficient(
        &mut self,
        variable: VariableId,
        coefficient: i64,
    ) -> Result<(), InvalidData> {
        check_unit_coefficient(
            LinearConstraintType::LogicOr,
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
