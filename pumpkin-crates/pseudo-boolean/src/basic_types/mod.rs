mod presolve_result;
mod pseudo_boolean_error;

pub use presolve_result::*;
pub use pseudo_boolean_error::*;
