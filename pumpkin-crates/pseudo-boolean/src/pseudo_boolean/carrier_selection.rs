use super::CarrierSelection;
use crate::engine::carriers::LinearConstraintType;

/// Determines the carrier type for a constraint `lhs <= sum(coefficients[i] * x_i) <= rhs`, where
/// the coefficients are those of the plain linear variables and of the AND-terms together.
pub(crate) fn select_carrier_type(
    coefficients: &[i64],
    lhs: Option<i64>,
    rhs: Option<i64>,
    modifiable: bool,
    selection: CarrierSelection,
) -> LinearConstraintType {
    if modifiable || selection == CarrierSelection::LinearOnly || coefficients.is_empty() {
        return LinearConstraintType::Linear;
    }

    let all_unit = coefficients.iter().all(|&coefficient| coefficient == 1);
    let all_positive = coefficients.iter().all(|&coefficient| coefficient > 0);

    match (lhs, rhs) {
        (Some(1), None) if all_unit && coefficients.len() > 2 => LinearConstraintType::LogicOr,
        (Some(1), Some(1)) if all_unit => LinearConstraintType::SetPartitioning,
        (None, Some(1)) if all_unit => LinearConstraintType::SetPacking,
        (Some(1), None) if all_unit => LinearConstraintType::SetCovering,
        (None, Some(_)) if all_positive => LinearConstraintType::Knapsack,
        _ => LinearConstraintType::Linear,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(coefficients: &[i64], lhs: Option<i64>, rhs: Option<i64>) -> LinearConstraintType {
        select_carrier_type(
            coefficients,
            lhs,
            rhs,
            false,
            CarrierSelection::Specialised,
        )
    }

    #[test]
    fn unit_coefficients_select_set_constraints() {
        assert_eq!(select(&[1, 1, 1], Some(1), None), LinearConstraintType::LogicOr);
        assert_eq!(select(&[1, 1], Some(1), None), LinearConstraintType::SetCovering);
        assert_eq!(
            select(&[1, 1], Some(1), Some(1)),
            LinearConstraintType::SetPartitioning
        );
        assert_eq!(select(&[1, 1], None, Some(1)), LinearConstraintType::SetPacking);
    }

    #[test]
    fn positive_coefficients_with_capacity_select_knapsack() {
        assert_eq!(select(&[2, 5], None, Some(6)), LinearConstraintType::Knapsack);
        assert_eq!(select(&[2, -5], None, Some(6)), LinearConstraintType::Linear);
        assert_eq!(select(&[2, 5], Some(1), Some(6)), LinearConstraintType::Linear);
    }

    #[test]
    fn modifiable_constraints_are_always_linear() {
        assert_eq!(
            select_carrier_type(&[1, 1, 1], Some(1), None, true, CarrierSelection::Specialised),
            LinearConstraintType::Linear
        );
        assert_eq!(
            select_carrier_type(&[1, 1, 1], Some(1), None, false, CarrierSelection::LinearOnly),
            LinearConstraintType::Linear
        );
    }
}
