//! The in-memory model of the solver surface the pseudo-boolean handler operates on: binary
//! variables with bounds, rounding locks and captures, AND-constraints, and linear-family carrier
//! constraints.
mod and_constraint;
pub mod carriers;
mod problem;
mod variables;

pub use and_constraint::AndConstraint;
pub use and_constraint::AndConstraintFlags;
pub use and_constraint::AndConstraintId;
pub use problem::Carrier;
pub use problem::Problem;
pub(crate) use variables::VariableInfo;
pub use variables::EmptyDomain;
pub use variables::LockDirection;
pub use variables::VariableId;
