use super::CarrierData;
use super::LinearConstraintType;
use crate::basic_types::InvalidData;
use crate::engine::VariableId;
use crate::pumpkin_assert_eq_simple;

/// A general linear constraint `lhs <= sum(a_i * x_i) <= rhs`.
#[derive(Clone, Debug)]
pub struct LinearConstraint {
    variables: Vec<VariableId>,
    coefficients: Vec<i64>,
    lhs: Option<i64>,
    rhs: Option<i64>,
}

impl LinearConstraint {
    pub fn new(
        variables: Vec<VariableId>,
        coefficients: Vec<i64>,
        lhs: Option<i64>,
        rhs: Option<i64>,
    ) -> Result<LinearConstraint, InvalidData> {
        pumpkin_assert_eq_simple!(variables.len(), coefficients.len());
        check_sides(lhs, rhs)?;

        Ok(LinearConstraint {
            variables,
            coefficients,
            lhs,
            rhs,
        })
    }
}

pub(crate) fn check_sides(lhs: Option<i64>, rhs: Option<i64>) -> Result<(), InvalidData> {
    match (lhs, rhs) {
        (Some(lhs), Some(rhs)) if lhs > rhs => Err(InvalidData::InvalidSides { lhs, rhs }),
        _ => Ok(()),
    }
}

impl CarrierData for LinearConstraint {
    fn constraint_type(&self) -> LinearConstraintType {
        LinearConstraintType::Linear
    }

    fn variables(&self) -> &[VariableId] {
        &self.variables
    }

    fn coefficients(&self) -> Vec<i64> {
        self.coefficients.clone()
    }

    fn lhs(&self) -> Option<i64> {
        self.lhs
    }

    fn rhs(&self) -> Option<i64> {
        self.rhs
    }

    fn change_lhs(&mut self, lhs: Option<i64>) -> Result<(), InvalidData> {
        check_sides(lhs, self.rhs)?;
        self.lhs = lhs;
        Ok(())
    }

    fn change_rhs(&mut self, rhs: Option<i64>) -> Result<(), InvalidData> {
        check_sides(self.lhs, rhs)?;
        self.rhs = rhs;
        Ok(())
    }

    fn add_coefficient(
        &mut self,
        variable: VariableId,
        coefficient: i64,
    ) -> Result<(), InvalidData> {
        if coefficient == 0 {
            return Ok(());
        }

        match self.variables.iter().position(|&other| other == variable) {
            Some(position) => {
                self.coefficients[position] += coefficient;
                if self.coefficients[position] == 0 {
                    let _ = self.remove_variable(variable);
                }
            }
            None => {
                self.variables.push(variable);
                self.coefficients.push(coefficient);
            }
        }

        Ok(())
    }

    fn remove_variable(&mut self, variable: VariableId) -> Option<i64> {
        let position = self.variables.iter().position(|&other| other == variable)?;
        let _ = self.variables.remove(position);
        Some(self.coefficients.remove(position))
    }
}
