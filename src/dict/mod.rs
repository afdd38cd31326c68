pub mod dict_base;
pub mod entry;
pub mod iter;

// Publicly re-export all types and functions from the submodules to
// simplify access from external code.
pub use dict_base::{Dict, DictConfig};
pub use entry::{Entry, OccupiedEntry, VacantEntry};
pub use iter::{DictIter, SafeDictIter};
