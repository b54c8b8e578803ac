//! The pseudo-boolean constraint handler and the shared AND-term management it is built on.
mod carrier_selection;
mod constraint;
mod handler;
mod lock_synchronizer;
mod options;
mod term;
mod term_registry;
mod upgrade;

pub use constraint::PseudoBooleanConstraintArguments;
pub use constraint::PseudoBooleanConstraintId;
pub use constraint::SoftConstraint;
pub(crate) use constraint::PseudoBooleanConstraint;
pub(crate) use constraint::TermEntry;
pub use handler::ConstraintFlags;
pub use handler::PseudoBooleanHandler;
pub use options::CarrierSelection;
pub use options::PseudoBooleanOptions;
pub use term::Term;
pub use term::TermDiff;
pub use term::TermHandle;
pub use term::TermId;
pub use term_registry::TermRegistry;
