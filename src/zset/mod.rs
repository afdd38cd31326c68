//! Упорядоченное множество для Kvant.
//!
//! # Модули
//!
//! - `skiplist_base`: пропускной список со span-счётчиками.
//! - `zset_base`: `SortedSet` — хеш-индекс поверх списка.
//! - `safety`: валидация и статистика.

pub mod safety;
pub mod skiplist_base;
pub mod zset_base;

// Publicly re-export all error types and functions from the submodules to
// simplify access from external code.
pub use safety::*;
pub use skiplist_base::*;
pub use zset_base::*;
