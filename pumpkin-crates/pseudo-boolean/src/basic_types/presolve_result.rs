use crate::create_statistics_struct;

/// The outcome of a single presolving round of the pseudo-boolean handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresolveResult {
    /// A fixing contradicted the current bounds; the remainder of the round was skipped.
    Cutoff,
    /// At least one reduction was found.
    Changed,
    /// Nothing changed.
    Unchanged,
}

create_statistics_struct!(
    /// The reductions found during a presolving round.
    PresolveStatistics {
        /// The number of variables which were fixed
        fixed_variables: usize,
        /// The number of pseudo-boolean constraints and AND-constraints which were deleted
        deleted_constraints: usize,
        /// The number of pseudo-boolean constraints replaced by a specialised constraint
        upgraded_constraints: usize,
        /// The number of changed AND-term coefficients
        changed_coefficients: usize,
        /// The number of changed constraint sides
        changed_sides: usize,
});

impl PresolveStatistics {
    pub(crate) fn found_reductions(&self) -> bool {
        self.fixed_variables > 0
            || self.deleted_constraints > 0
            || self.upgraded_constraints > 0
            || self.changed_coefficients > 0
            || self.changed_sides > 0
    }

    pub(crate) fn accumulate(&mut self, other: &PresolveStatistics) {
        self.fixed_variables += other.fixed_variables;
        self.deleted_constraints += other.deleted_constraints;
        self.upgraded_constraints += other.upgraded_constraints;
        self.changed_coefficients += other.changed_coefficients;
        self.changed_sides += other.changed_sides;
    }
}
