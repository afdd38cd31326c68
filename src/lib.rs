/// Dict with incremental rehashing, entry API, iterators and scan.
pub mod dict;
/// Common error types for dict resizing operations.
pub mod error;
/// Seeded SipHash-1-3 hashing (case-sensitive and ASCII case-insensitive).
pub mod hashing;
/// Dynamic byte string with inline optimization (SDS).
pub mod sds;
/// Sorted set: span skiplist plus a hash index over the same members.
pub mod zset;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Hash table with incremental rehashing and its entry API.
pub use dict::{Dict, DictConfig, DictIter, Entry, OccupiedEntry, SafeDictIter, VacantEntry};
/// Operation errors and result types.
pub use error::{DictError, DictResult};
/// Keyed hashing: process seed control and hasher builders.
pub use hashing::{
    gen_case_hash, gen_hash, hash_seed, set_hash_seed, NocaseSipHashBuilder, SipHashBuilder,
};
/// Dynamic byte string.
pub use sds::Sds;
/// Sorted-set types: the set itself, the underlying skiplist, score
/// ranges and validation.
pub use zset::{
    Node, ReverseIter, ScoreRange, SkipList, SkipListIter, SkipListStatistics, SortedSet,
    ValidationError,
};
