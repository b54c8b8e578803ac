//! # Pumpkin pseudo-boolean
//!
//! Management of the AND-terms of pseudo-boolean constraints
//! `lhs <= sum(a_i * x_i) + sum(b_j * prod(y_jk)) <= rhs`.
//!
//! Every distinct product of binary variables is represented once, as an AND-constraint with a
//! resultant variable, and shared by all constraints which contain it. The
//! [`PseudoBooleanHandler`] keeps these shared terms, the rounding locks on their variables and
//! the linear carrier constraints consistent while the rest of the solver fixes, aggregates and
//! removes variables during presolving.
//!
//! ```rust
//! # use pumpkin_pseudo_boolean::engine::Problem;
//! # use pumpkin_pseudo_boolean::PseudoBooleanConstraintArguments;
//! # use pumpkin_pseudo_boolean::PseudoBooleanHandler;
//! # use pumpkin_pseudo_boolean::PresolveResult;
//! let mut problem = Problem::default();
//! let x = problem.new_variable("x");
//! let y1 = problem.new_variable("y1");
//! let y2 = problem.new_variable("y2");
//!
//! let mut handler = PseudoBooleanHandler::default();
//! let constraint = handler
//!     .create_constraint(
//!         &mut problem,
//!         PseudoBooleanConstraintArguments::new("c", None, Some(2))
//!             .with_linear(x, 1)
//!             .with_term(vec![y1, y2], 2),
//!     )
//!     .expect("valid constraint");
//!
//! assert_eq!(
//!     handler.format_constraint(&problem, constraint).unwrap(),
//!     "+1 x +2 y1*y2 <= 2"
//! );
//! assert_eq!(
//!     handler.presolve_round(&mut problem).unwrap(),
//!     PresolveResult::Unchanged
//! );
//! ```
#[doc(hidden)]
pub mod asserts;
pub(crate) mod basic_types;
pub mod containers;
pub mod engine;
pub(crate) mod pseudo_boolean;
pub mod statistics;

pub use basic_types::InvalidData;
pub use basic_types::PresolveResult;
pub use basic_types::PresolveStatistics;
pub use basic_types::PseudoBooleanError;
pub use pseudo_boolean::*;
