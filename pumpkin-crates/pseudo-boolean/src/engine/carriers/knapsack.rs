use super::CarrierData;
use super::LinearConstraintType;
use crate::basic_types::InvalidData;
use crate::engine::VariableId;

/// A knapsack constraint `sum(w_i * x_i) <= capacity` with positive weights.
#[derive(Clone, Debug)]
pub struct KnapsackConstraint {
    variables: Vec<VariableId>,
    weights: Vec<i64>,
    capacity: i64,
}

impl KnapsackConstraint {
    pub fn new(capacity: i64) -> KnapsackConstraint {
        KnapsackConstraint {
            variables: vec![],
            weights: vec![],
            capacity,
        }
    }

    pub fn capacity(&self) -> i64 {
        self.capacity
    }
}

impl CarrierData for KnapsackConstraint {
    fn constraint_type(&self) -> LinearConstraintType {
        LinearConstraintType::Knapsack
    }

    fn variables(&self) -> &[VariableId] {
        &self.variables
    }

    fn coefficients(&self) -> Vec<i64> {
        self.weights.clone()
    }

    fn lhs(&self) -> Option<i64> {
        None
    }

    fn rhs(&self) -> Option<i64> {
        Some(self.capacity)
    }

    fn add_coefficient(
        &mut self,
        variable: VariableId,
        coefficient: i64,
    ) -> Result<(), InvalidData> {
        if coefficient <= 0 {
            return Err(InvalidData::UnsupportedCoefficient {
                coefficient,
                carrier_type: LinearConstraintType::Knapsack,
            });
        }

        match self.variables.iter().position(|&other| other == variable) {
            Some(position) => self.weights[position] += coefficient,
            None => {
                self.variables.push(variable);
                self.weights.push(coefficient);
            }
        }

        Ok(())
    }

    fn remove_variable(&mut self, variable: VariableId) -> Option<i64> {
        let position = self.variables.iter().position(|&other| other == variable)?;
        let _ = self.variables.remove(position);
        Some(self.weights.remove(position))
    }
}
