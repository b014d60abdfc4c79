//! Order-maintaining chained hash table.
//!
//! Every live entry sits in exactly one bucket chain (by its stored
//! hash) and at exactly one position in an intrusive doubly-linked
//! traversal list. The list runs from the oldest entry to the newest;
//! new keys attach at the newest end, eviction pops the oldest end, and
//! in [`Order::Access`] mode a successful `get` promotes the entry to
//! the newest end (most-recently-used semantics).
//!
//! Entries live in a `SlotMap` arena and link to each other by
//! generational key, so there are no raw pointers anywhere and a stale
//! id can never alias a reused slot. Each entry stores its hash once;
//! resizing re-buckets by that stored hash and never re-invokes
//! `K: Hash`, and it walks the traversal list rather than the old
//! buckets, so order is untouched by growth.

use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::mem;
use std::collections::hash_map::RandomState;

use slotmap::{DefaultKey, SlotMap};

use crate::buckets::{clamp_capacity, clamp_load_factor, resize_threshold, BucketArray};
use crate::debug_guard::DebugGuard;
use crate::error::AllocError;
use crate::policy::{EvictionPolicy, NeverEvict, TableStats};

/// How the traversal list orders entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Entries keep their insertion positions; lookups never reorder.
    #[default]
    Insertion,
    /// Lookups promote the entry to the newest end, so iteration runs
    /// from least to most recently used.
    Access,
}

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
    /// Next entry in this entry's bucket chain.
    chain: Option<DefaultKey>,
    /// Traversal-list neighbor toward the oldest end.
    older: Option<DefaultKey>,
    /// Traversal-list neighbor toward the newest end.
    newer: Option<DefaultKey>,
}

/// Buckets, arena, and the traversal list. Split out from the table so
/// structural mutation borrows only this field while the reentrancy
/// token holds the guard.
struct Core<K, V> {
    buckets: BucketArray,
    slots: SlotMap<DefaultKey, Entry<K, V>>,
    oldest: Option<DefaultKey>,
    newest: Option<DefaultKey>,
}

impl<K, V> Core<K, V> {
    /// Scans the bucket chain for `hash`, matching the stored hash first
    /// and only then the key itself.
    fn find_id<Q>(&self, hash: u64, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut cursor = self.buckets.head(self.buckets.slot(hash));
        while let Some(id) = cursor {
            let entry = &self.slots[id];
            if entry.hash == hash && entry.key.borrow() == q {
                return Some(id);
            }
            cursor = entry.chain;
        }
        None
    }

    /// Links a new entry at its chain head and at the newest end of the
    /// traversal list.
    fn insert_new(&mut self, hash: u64, key: K, value: V) -> DefaultKey {
        let slot = self.buckets.slot(hash);
        let id = self.slots.insert(Entry {
            key,
            value,
            hash,
            chain: self.buckets.head(slot),
            older: None,
            newer: None,
        });
        self.buckets.set_head(slot, Some(id));
        self.attach_newest(id);
        id
    }

    fn attach_newest(&mut self, id: DefaultKey) {
        let prev_newest = self.newest;
        {
            let entry = &mut self.slots[id];
            entry.older = prev_newest;
            entry.newer = None;
        }
        match prev_newest {
            Some(tail) => self.slots[tail].newer = Some(id),
            None => self.oldest = Some(id),
        }
        self.newest = Some(id);
    }

    fn detach(&mut self, id: DefaultKey) {
        let (older, newer) = {
            let entry = &self.slots[id];
            (entry.older, entry.newer)
        };
        match older {
            Some(o) => self.slots[o].newer = newer,
            None => self.oldest = newer,
        }
        match newer {
            Some(n) => self.slots[n].older = older,
            None => self.newest = older,
        }
        let entry = &mut self.slots[id];
        entry.older = None;
        entry.newer = None;
    }

    fn promote(&mut self, id: DefaultKey) {
        if self.newest == Some(id) {
            return;
        }
        self.detach(id);
        self.attach_newest(id);
    }

    /// Unlinks `id` from its bucket chain and the traversal list, then
    /// frees its arena slot.
    fn remove_id(&mut self, id: DefaultKey) -> (K, V) {
        let hash = self.slots[id].hash;
        let slot = self.buckets.slot(hash);

        let mut cursor = self.buckets.head(slot);
        let mut prev: Option<DefaultKey> = None;
        while let Some(cur) = cursor {
            if cur == id {
                let next = self.slots[cur].chain;
                match prev {
                    Some(p) => self.slots[p].chain = next,
                    None => self.buckets.set_head(slot, next),
                }
                break;
            }
            prev = Some(cur);
            cursor = self.slots[cur].chain;
        }

        self.detach(id);
        let entry = self.slots.remove(id).expect("live entry missing from arena");
        (entry.key, entry.value)
    }

    /// Re-buckets every entry into a larger array, walking the traversal
    /// list so order is untouched. Chains are rebuilt from stored
    /// hashes; `K: Hash` is not invoked.
    fn grow(&mut self, requested: usize) -> Result<(), AllocError> {
        let capacity = clamp_capacity(requested);
        if capacity <= self.buckets.capacity() {
            return Ok(());
        }
        let mut buckets = BucketArray::try_with_capacity(capacity)?;

        let mut cursor = self.oldest;
        while let Some(id) = cursor {
            let slot = buckets.slot(self.slots[id].hash);
            let head = buckets.head(slot);
            let entry = &mut self.slots[id];
            entry.chain = head;
            buckets.set_head(slot, Some(id));
            cursor = entry.newer;
        }

        self.buckets = buckets;
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    fn debug_validate(&self) {
        use std::collections::HashSet;

        // Traversal list: closed, acyclic, covers every arena slot.
        let mut seen = HashSet::new();
        let mut cursor = self.oldest;
        let mut prev = None;
        while let Some(id) = cursor {
            assert!(seen.insert(id), "traversal list revisits an entry");
            let entry = &self.slots[id];
            assert_eq!(entry.older, prev);
            if entry.newer.is_none() {
                assert_eq!(self.newest, Some(id));
            }
            prev = Some(id);
            cursor = entry.newer;
        }
        assert_eq!(seen.len(), self.slots.len());
        if self.slots.is_empty() {
            assert!(self.oldest.is_none() && self.newest.is_none());
        }

        // Every entry is findable in the chain its hash selects.
        for (id, entry) in &self.slots {
            let mut chain = self.buckets.head(self.buckets.slot(entry.hash));
            let mut found = false;
            while let Some(cur) = chain {
                if cur == id {
                    found = true;
                    break;
                }
                chain = self.slots[cur].chain;
            }
            assert!(found, "entry not reachable from its bucket chain");
        }
    }
}

/// Chained hash table threaded by an insertion- or access-ordered
/// traversal list, with a pluggable eviction policy.
///
/// Single-threaded by design (`!Send`/`!Sync`). Iterators borrow the
/// table, so mutating during iteration is ruled out at compile time.
pub struct LinkedHashTable<K, V, S = RandomState, P = NeverEvict> {
    hasher: S,
    core: Core<K, V>,
    max_load_factor: f64,
    resize_threshold: usize,
    auto_resize: bool,
    order: Order,
    evictor: P,
    guard: DebugGuard,
}

impl<K, V> LinkedHashTable<K, V>
where
    K: Eq + Hash,
{
    /// Insertion-ordered table with default capacity and no eviction.
    pub fn new() -> Self {
        LinkedTableBuilder::new().build()
    }

    /// Like [`new`](Self::new) with an explicit initial capacity
    /// (clamped to a power of two).
    pub fn with_capacity(capacity: usize) -> Self {
        LinkedTableBuilder::new().capacity(capacity).build()
    }

    /// Starts a builder for non-default hashers, ordering, or eviction.
    pub fn builder() -> LinkedTableBuilder {
        LinkedTableBuilder::new()
    }
}

impl<K, V> Default for LinkedHashTable<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S, P> LinkedHashTable<K, V, S, P>
where
    K: Eq + Hash,
    S: BuildHasher,
    P: EvictionPolicy,
{
    /// Number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.core.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.core.slots.is_empty()
    }

    /// Current bucket-array capacity (always a power of two).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.core.buckets.capacity()
    }

    /// `len / capacity`.
    #[inline]
    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.capacity() as f64
    }

    /// Load factor at which auto-resize doubles the table.
    #[inline]
    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    /// The ordering mode this table was built with.
    #[inline]
    pub fn order(&self) -> Order {
        self.order
    }

    fn hash_of<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Inserts a key-value pair, returning the previous value if the key
    /// was already present.
    ///
    /// Replacing a value moves nothing: the entry keeps its bucket-chain
    /// and traversal-list positions, and neither the eviction policy nor
    /// auto-resize runs. A new key is linked at its chain head and at
    /// the newest end of the list; the eviction policy is then consulted
    /// once and may drop the single oldest entry, after which the table
    /// grows (best effort) if the resize threshold has been reached.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let _g = self.guard.enter();
        let hash = self.hash_of(&key);

        if let Some(id) = self.core.find_id(hash, &key) {
            return Some(mem::replace(&mut self.core.slots[id].value, value));
        }
        self.core.insert_new(hash, key, value);

        let stats = TableStats {
            len: self.core.slots.len(),
            capacity: self.core.buckets.capacity(),
        };
        if self.evictor.should_evict(stats) {
            // Even a just-inserted entry is fair game if it is oldest.
            if let Some(victim) = self.core.oldest {
                self.core.remove_id(victim);
            }
        }

        if self.auto_resize && self.core.slots.len() >= self.resize_threshold {
            // Growth failure is benign; the insert already happened.
            if self.core.grow(self.core.buckets.capacity() * 2).is_ok() {
                self.resize_threshold =
                    resize_threshold(self.core.buckets.capacity(), self.max_load_factor);
            }
        }
        None
    }

    /// Looks up a key. In [`Order::Access`] mode a hit promotes the
    /// entry to the newest end of the traversal list.
    pub fn get<Q>(&mut self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.guard.enter();
        let hash = self.hash_of(q);
        let id = self.core.find_id(hash, q)?;
        if self.order == Order::Access {
            self.core.promote(id);
        }
        Some(&self.core.slots[id].value)
    }

    /// Like [`get`](Self::get), yielding a mutable reference. Counts as
    /// an access in [`Order::Access`] mode.
    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.guard.enter();
        let hash = self.hash_of(q);
        let id = self.core.find_id(hash, q)?;
        if self.order == Order::Access {
            self.core.promote(id);
        }
        Some(&mut self.core.slots[id].value)
    }

    /// Reads a value without recording an access; the traversal list is
    /// never reordered.
    pub fn peek<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.guard.enter();
        let hash = self.hash_of(q);
        self.core.find_id(hash, q).map(|id| &self.core.slots[id].value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.peek(q).is_some()
    }

    /// Removes a key, returning its value if it was present.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    /// Removes a key, returning the owned pair if it was present.
    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.guard.enter();
        let hash = self.hash_of(q);
        let id = self.core.find_id(hash, q)?;
        Some(self.core.remove_id(id))
    }

    /// Entry at the oldest end of the traversal list (the next eviction
    /// victim), if any.
    pub fn oldest(&self) -> Option<(&K, &V)> {
        self.core.oldest.map(|id| {
            let entry = &self.core.slots[id];
            (&entry.key, &entry.value)
        })
    }

    /// Entry at the newest end of the traversal list, if any.
    pub fn newest(&self) -> Option<(&K, &V)> {
        self.core.newest.map(|id| {
            let entry = &self.core.slots[id];
            (&entry.key, &entry.value)
        })
    }

    /// Removes and returns the oldest entry.
    pub fn pop_oldest(&mut self) -> Option<(K, V)> {
        let _g = self.guard.enter();
        self.core.oldest.map(|id| self.core.remove_id(id))
    }

    /// Drops every entry. Bucket capacity is retained.
    pub fn clear(&mut self) {
        let _g = self.guard.enter();
        self.core.slots.clear();
        self.core.buckets.reset();
        self.core.oldest = None;
        self.core.newest = None;
    }

    /// Grows the bucket array to at least `new_capacity` (clamped to a
    /// power of two). Requests that do not exceed the current capacity
    /// are a successful no-op: the table never shrinks. On allocation
    /// failure the table is left unchanged.
    pub fn resize(&mut self, new_capacity: usize) -> Result<(), AllocError> {
        let _g = self.guard.enter();
        self.core.grow(new_capacity)?;
        self.resize_threshold =
            resize_threshold(self.core.buckets.capacity(), self.max_load_factor);
        Ok(())
    }

    /// Visits entries oldest-first, stopping early when `visit` returns
    /// `false`. Returns the number of entries visited, counting the one
    /// that stopped the walk.
    pub fn apply<F>(&self, mut visit: F) -> usize
    where
        F: FnMut(&K, &V) -> bool,
    {
        let mut visited = 0;
        let mut cursor = self.core.oldest;
        while let Some(id) = cursor {
            let entry = &self.core.slots[id];
            visited += 1;
            if !visit(&entry.key, &entry.value) {
                break;
            }
            cursor = entry.newer;
        }
        visited
    }

    /// Iterates oldest to newest; reverse with [`Iterator::rev`]. Does
    /// not record accesses.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: &self.core.slots,
            front: self.core.oldest,
            back: self.core.newest,
            remaining: self.core.slots.len(),
        }
    }

    /// Keys, oldest to newest.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    /// Values, oldest to newest.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    #[cfg(any(test, debug_assertions))]
    pub(crate) fn debug_validate(&self) {
        self.core.debug_validate();
    }
}

impl<'a, K, V, S, P> IntoIterator for &'a LinkedHashTable<K, V, S, P>
where
    K: Eq + Hash,
    S: BuildHasher,
    P: EvictionPolicy,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S, P> IntoIterator for LinkedHashTable<K, V, S, P>
where
    K: Eq + Hash,
    S: BuildHasher,
    P: EvictionPolicy,
{
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Consumes the table, yielding owned pairs oldest to newest.
    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            next: self.core.oldest,
            slots: self.core.slots,
        }
    }
}

/// Borrowing iterator over a [`LinkedHashTable`] in traversal order.
pub struct Iter<'a, K, V> {
    slots: &'a SlotMap<DefaultKey, Entry<K, V>>,
    front: Option<DefaultKey>,
    back: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.front?;
        let entry = &self.slots[id];
        if self.back == Some(id) {
            self.front = None;
            self.back = None;
        } else {
            self.front = entry.newer;
        }
        self.remaining -= 1;
        Some((&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let id = self.back?;
        let entry = &self.slots[id];
        if self.front == Some(id) {
            self.front = None;
            self.back = None;
        } else {
            self.back = entry.older;
        }
        self.remaining -= 1;
        Some((&entry.key, &entry.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

/// Owning iterator returned by [`LinkedHashTable::into_iter`].
pub struct IntoIter<K, V> {
    slots: SlotMap<DefaultKey, Entry<K, V>>,
    next: Option<DefaultKey>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let entry = self.slots.remove(id).expect("iterator ahead of arena");
        self.next = entry.newer;
        Some((entry.key, entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.slots.len(), Some(self.slots.len()))
    }
}

/// Configures and builds a [`LinkedHashTable`].
///
/// ```
/// use linked_hashtbl::{LinkedTableBuilder, Order, CapacityLimit};
///
/// let mut lru = LinkedTableBuilder::new()
///     .capacity(8)
///     .order(Order::Access)
///     .evictor(CapacityLimit::new(3))
///     .build::<u64, &str>();
/// lru.insert(1, "one");
/// assert_eq!(lru.get(&1), Some(&"one"));
/// ```
#[derive(Debug)]
pub struct LinkedTableBuilder<S = RandomState, P = NeverEvict> {
    capacity: usize,
    max_load_factor: f64,
    auto_resize: bool,
    order: Order,
    hasher: S,
    evictor: P,
}

impl LinkedTableBuilder {
    pub fn new() -> Self {
        Self {
            capacity: 16,
            max_load_factor: crate::buckets::DEFAULT_MAX_LOAD_FACTOR,
            auto_resize: true,
            order: Order::Insertion,
            hasher: RandomState::new(),
            evictor: NeverEvict,
        }
    }
}

impl Default for LinkedTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, P> LinkedTableBuilder<S, P> {
    /// Initial bucket capacity; clamped to a power of two in
    /// `[1, MAX_TABLE_CAPACITY]`.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Load factor that triggers auto-resize. Negative values fall back
    /// to 0.75, values above 1.0 saturate at 1.0.
    pub fn max_load_factor(mut self, factor: f64) -> Self {
        self.max_load_factor = factor;
        self
    }

    /// Whether inserts double the table once the threshold is reached.
    pub fn auto_resize(mut self, enabled: bool) -> Self {
        self.auto_resize = enabled;
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    pub fn hasher<S2>(self, hasher: S2) -> LinkedTableBuilder<S2, P> {
        LinkedTableBuilder {
            capacity: self.capacity,
            max_load_factor: self.max_load_factor,
            auto_resize: self.auto_resize,
            order: self.order,
            hasher,
            evictor: self.evictor,
        }
    }

    pub fn evictor<P2>(self, evictor: P2) -> LinkedTableBuilder<S, P2> {
        LinkedTableBuilder {
            capacity: self.capacity,
            max_load_factor: self.max_load_factor,
            auto_resize: self.auto_resize,
            order: self.order,
            hasher: self.hasher,
            evictor,
        }
    }
}

impl<S, P> LinkedTableBuilder<S, P>
where
    S: BuildHasher,
    P: EvictionPolicy,
{
    /// Builds the table, panicking if the initial bucket array cannot
    /// be allocated (the usual Rust allocation contract).
    pub fn build<K, V>(self) -> LinkedHashTable<K, V, S, P>
    where
        K: Eq + Hash,
    {
        match self.try_build() {
            Ok(table) => table,
            Err(err) => panic!("{err}"),
        }
    }

    /// Builds the table, surfacing bucket-array allocation failure.
    pub fn try_build<K, V>(self) -> Result<LinkedHashTable<K, V, S, P>, AllocError>
    where
        K: Eq + Hash,
    {
        let capacity = clamp_capacity(self.capacity);
        let max_load_factor = clamp_load_factor(self.max_load_factor);
        let buckets = BucketArray::try_with_capacity(capacity)?;
        Ok(LinkedHashTable {
            hasher: self.hasher,
            core: Core {
                buckets,
                slots: SlotMap::with_key(),
                oldest: None,
                newest: None,
            },
            max_load_factor,
            resize_threshold: resize_threshold(capacity, max_load_factor),
            auto_resize: self.auto_resize,
            order: self.order,
            evictor: self.evictor,
            guard: DebugGuard::new(),
        })
    }
}
