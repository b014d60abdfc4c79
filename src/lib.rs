//! linked-hashtbl: single-threaded chained hash tables, one plain and
//! one threaded by an order-maintaining traversal list with pluggable
//! eviction.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: build the ordered table out of small, separately verifiable
//!   pieces so each invariant lives in one place.
//! - Layers:
//!   - BucketArray (internal): power-of-two array of chain heads plus
//!     the capacity/load-factor clamping and resize-threshold
//!     arithmetic both tables share.
//!   - HashTable<K, V, S>: plain chained table; entries live in a
//!     `SlotMap` arena with their hash stored alongside, chains link by
//!     generational key.
//!   - LinkedHashTable<K, V, S, P>: adds the intrusive doubly-linked
//!     traversal list (oldest to newest), insertion or access ordering,
//!     and an [`EvictionPolicy`] consulted once per new insert.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` by design (a raw-pointer marker
//!   in the debug guard enforces it).
//! - Entries store their hash once; rehashing and removal index by the
//!   stored hash and never re-invoke `K: Hash`.
//! - Chains and list links are `Option<DefaultKey>` into the arena, so
//!   there are no raw pointers and a stale id cannot alias a reused
//!   slot.
//! - The bucket array never shrinks; growth doubles the capacity and
//!   re-buckets along the traversal list so order survives resizing.
//! - Iterators borrow the table. Mutation during iteration is a borrow
//!   error at compile time, not a runtime hazard.
//!
//! Reentrancy policy
//! - Table methods call user code via `K: Eq/Hash` and the eviction
//!   policy while chains may be transiently inconsistent. A debug-only
//!   guard at each public entry point panics on nested entry; release
//!   builds compile it away. The policy itself only receives a
//!   [`TableStats`] snapshot, so it has nothing to reenter with.
//!
//! Sizing semantics
//! - Requested capacities clamp into `[1, MAX_TABLE_CAPACITY]` and
//!   round up to a power of two; load factors clamp into `[0.0, 1.0]`
//!   with negatives falling back to 0.75. Auto-resize triggers when the
//!   entry count reaches `round(capacity * max_load_factor)`.
//! - Allocation failure surfaces as [`AllocError`] from `try_build` and
//!   `resize`; the auto-resize path swallows it, since the insert that
//!   triggered growth has already succeeded.
//!
//! Eviction
//! - After linking a new key the table asks its policy whether to drop
//!   the entry at the oldest end; at most one entry goes per insert.
//!   [`CapacityLimit`] plus [`Order::Access`] yields a fixed-size LRU
//!   cache; a policy may even evict the entry that was just inserted.
//!
//! Notes and non-goals
//! - No entry API, no drain, no shrink.
//! - The [`hashers`] module ships cheap deterministic hashers for
//!   integer and byte-string keys, and [`PtrKey`] for identity keying;
//!   the default hasher is `RandomState`, as in std.

mod buckets;
mod debug_guard;
mod error;
pub mod hash_table;
pub mod hashers;
mod linked_table;
mod linked_table_proptest;
mod policy;

// Public surface
pub use buckets::{DEFAULT_MAX_LOAD_FACTOR, MAX_TABLE_CAPACITY};
pub use error::AllocError;
pub use hash_table::{HashTable, TableBuilder};
pub use hashers::{Djb2BuildHasher, DirectBuildHasher, PtrKey};
pub use linked_table::{IntoIter, Iter, LinkedHashTable, LinkedTableBuilder, Order};
pub use policy::{CapacityLimit, EvictFn, EvictionPolicy, NeverEvict, TableStats};
