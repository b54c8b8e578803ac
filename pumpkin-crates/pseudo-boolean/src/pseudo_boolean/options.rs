use crate::engine::AndConstraintFlags;

/// Options of the [`PseudoBooleanHandler`](crate::PseudoBooleanHandler).
#[derive(Debug, Copy, Clone)]
pub struct PseudoBooleanOptions {
    /// Whether the AND-constraints created for terms should be separated during LP solving.
    pub and_separate: bool,
    /// Whether the AND-constraints created for terms should be propagated.
    pub and_propagate: bool,
    /// Whether the AND-constraints created for terms may be removed from the LP.
    pub and_removable: bool,
    /// The number of hash-consing buckets which are reserved up front.
    pub term_table_capacity: usize,
    /// Determines which carrier a new pseudo-boolean constraint receives.
    pub carrier_selection: CarrierSelection,
}

impl Default for PseudoBooleanOptions {
    fn default() -> Self {
        Self {
            and_separate: true,
            and_propagate: true,
            and_removable: true,
            term_table_capacity: 131101,
            carrier_selection: CarrierSelection::default(),
        }
    }
}

impl PseudoBooleanOptions {
    pub(crate) fn and_constraint_flags(&self) -> AndConstraintFlags {
        AndConstraintFlags {
            separate: self.and_separate,
            propagate: self.and_propagate,
            removable: self.and_removable,
        }
    }
}

/// The strategy used to choose the carrier of a pseudo-boolean constraint.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum CarrierSelection {
    /// Uses a logic-or, knapsack or set-packing/partitioning/covering constraint when the
    /// coefficients and sides allow it.
    #[default]
    Specialised,
    /// Always uses a linear constraint.
    LinearOnly,
}
