pub mod sds_base;

// Publicly re-export all types and functions from the submodule to
// simplify access from external code.
pub use sds_base::*;
