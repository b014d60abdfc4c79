//! Eviction policies for [`LinkedHashTable`](crate::LinkedHashTable).
//!
//! After every insert of a new key the table asks its policy whether to
//! drop the entry at the oldest end of the traversal list (the least
//! recently inserted entry, or the least recently used one when the
//! table maintains access order). The policy sees only a [`TableStats`]
//! snapshot, so it cannot reenter the table.
//!
//! At most one entry is evicted per insert. A policy that always answers
//! yes therefore keeps the table empty: the freshly inserted entry is its
//! own oldest entry and is dropped immediately.

/// Snapshot handed to an eviction policy, taken after the new entry has
/// been linked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStats {
    /// Live entry count, including the entry that was just inserted.
    pub len: usize,
    /// Current bucket-array capacity.
    pub capacity: usize,
}

/// Decides whether the oldest entry should be evicted after an insert.
pub trait EvictionPolicy {
    fn should_evict(&mut self, stats: TableStats) -> bool;
}

/// Default policy: the table only grows, nothing is ever evicted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeverEvict;

impl EvictionPolicy for NeverEvict {
    #[inline]
    fn should_evict(&mut self, _stats: TableStats) -> bool {
        false
    }
}

/// Bounds the table at `max` entries, evicting the oldest entry whenever
/// an insert pushes the count past the limit. Combined with access order
/// this yields a fixed-size LRU cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityLimit {
    max: usize,
}

impl CapacityLimit {
    pub fn new(max: usize) -> Self {
        Self { max }
    }

    /// The bound this policy enforces.
    pub fn max(&self) -> usize {
        self.max
    }
}

impl EvictionPolicy for CapacityLimit {
    #[inline]
    fn should_evict(&mut self, stats: TableStats) -> bool {
        stats.len > self.max
    }
}

/// Adapter for closure policies: `EvictFn(|stats| ...)`.
#[derive(Debug, Clone, Copy)]
pub struct EvictFn<F>(pub F);

impl<F> EvictionPolicy for EvictFn<F>
where
    F: FnMut(TableStats) -> bool,
{
    #[inline]
    fn should_evict(&mut self, stats: TableStats) -> bool {
        (self.0)(stats)
    }
}
