//! Plain chained hash table, without the traversal list.
//!
//! Same bones as [`LinkedHashTable`](crate::LinkedHashTable): a
//! power-of-two bucket array of chain heads, entries in a `SlotMap`
//! arena with their hash stored alongside, and growth by threshold.
//! What it drops is everything order-related, so iteration is in
//! unspecified order, lookups take `&self`, and there is no eviction.

use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::mem;
use std::collections::hash_map::RandomState;

use slotmap::{DefaultKey, SlotMap};

use crate::buckets::{clamp_capacity, clamp_load_factor, resize_threshold, BucketArray};
use crate::debug_guard::DebugGuard;
use crate::error::AllocError;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
    chain: Option<DefaultKey>,
}

/// Unordered chained hash table.
///
/// Single-threaded (`!Send`/`!Sync`), like its linked sibling.
pub struct HashTable<K, V, S = RandomState> {
    hasher: S,
    buckets: BucketArray,
    slots: SlotMap<DefaultKey, Entry<K, V>>,
    max_load_factor: f64,
    resize_threshold: usize,
    auto_resize: bool,
    guard: DebugGuard,
}

impl<K, V> HashTable<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        TableBuilder::new().build()
    }

    /// Like [`new`](Self::new) with an explicit initial capacity
    /// (clamped to a power of two).
    pub fn with_capacity(capacity: usize) -> Self {
        TableBuilder::new().capacity(capacity).build()
    }

    /// Starts a builder for a non-default hasher or growth settings.
    pub fn builder() -> TableBuilder {
        TableBuilder::new()
    }
}

impl<K, V> Default for HashTable<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> HashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Current bucket-array capacity (always a power of two).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buckets.capacity()
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

    fn hash_of<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

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

    /// Inserts a key-value pair, returning the previous value if the key
    /// was already present. Replacing a value neither moves the entry
    /// nor triggers auto-resize; a new key links at its chain head and
    /// the table grows (best effort) once the threshold is reached.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let _g = self.guard.enter();
        let hash = self.hash_of(&key);

        if let Some(id) = self.find_id(hash, &key) {
            return Some(mem::replace(&mut self.slots[id].value, value));
        }

        let slot = self.buckets.slot(hash);
        let id = self.slots.insert(Entry {
            key,
            value,
            hash,
            chain: self.buckets.head(slot),
        });
        self.buckets.set_head(slot, Some(id));

        if self.auto_resize && self.slots.len() >= self.resize_threshold {
            // Growth failure is benign; the insert already happened.
            let requested = self.buckets.capacity() * 2;
            if grow(&mut self.buckets, &mut self.slots, requested).is_ok() {
                self.resize_threshold =
                    resize_threshold(self.buckets.capacity(), self.max_load_factor);
            }
        }
        None
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.guard.enter();
        let hash = self.hash_of(q);
        self.find_id(hash, q).map(|id| &self.slots[id].value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.guard.enter();
        let hash = self.hash_of(q);
        let id = self.find_id(hash, q)?;
        Some(&mut self.slots[id].value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(q).is_some()
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
        let id = self.find_id(hash, q)?;

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

        let entry = self.slots.remove(id).expect("live entry missing from arena");
        Some((entry.key, entry.value))
    }

    /// Drops every entry. Bucket capacity is retained.
    pub fn clear(&mut self) {
        let _g = self.guard.enter();
        self.slots.clear();
        self.buckets.reset();
    }

    /// Grows the bucket array to at least `new_capacity` (clamped to a
    /// power of two). Requests that do not exceed the current capacity
    /// are a successful no-op: the table never shrinks. On allocation
    /// failure the table is left unchanged.
    pub fn resize(&mut self, new_capacity: usize) -> Result<(), AllocError> {
        let _g = self.guard.enter();
        grow(&mut self.buckets, &mut self.slots, new_capacity)?;
        self.resize_threshold =
            resize_threshold(self.buckets.capacity(), self.max_load_factor);
        Ok(())
    }

    /// Visits entries in unspecified order, stopping early when `visit`
    /// returns `false`. Returns the number of entries visited, counting
    /// the one that stopped the walk.
    pub fn apply<F>(&self, mut visit: F) -> usize
    where
        F: FnMut(&K, &V) -> bool,
    {
        let mut visited = 0;
        for (_, entry) in &self.slots {
            visited += 1;
            if !visit(&entry.key, &entry.value) {
                break;
            }
        }
        visited
    }

    /// Iterates in unspecified order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.slots.iter(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    #[cfg(any(test, debug_assertions))]
    pub(crate) fn debug_validate(&self) {
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

/// Re-buckets every entry into a larger array by its stored hash;
/// `K: Hash` is not invoked. Free-standing so callers can hold the
/// reentrancy token while growing.
fn grow<K, V>(
    buckets: &mut BucketArray,
    slots: &mut SlotMap<DefaultKey, Entry<K, V>>,
    requested: usize,
) -> Result<(), AllocError> {
    let capacity = clamp_capacity(requested);
    if capacity <= buckets.capacity() {
        return Ok(());
    }
    let mut grown = BucketArray::try_with_capacity(capacity)?;

    for (id, entry) in slots.iter_mut() {
        let slot = grown.slot(entry.hash);
        entry.chain = grown.head(slot);
        grown.set_head(slot, Some(id));
    }

    *buckets = grown;
    Ok(())
}

impl<'a, K, V, S> IntoIterator for &'a HashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> IntoIterator for HashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Consumes the table, yielding owned pairs in unspecified order.
    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.slots.into_iter(),
        }
    }
}

/// Borrowing iterator over a [`HashTable`] in unspecified order.
pub struct Iter<'a, K, V> {
    inner: slotmap::basic::Iter<'a, DefaultKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, e)| (&e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Owning iterator returned by [`HashTable::into_iter`].
pub struct IntoIter<K, V> {
    inner: slotmap::basic::IntoIter<DefaultKey, Entry<K, V>>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, e)| (e.key, e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Configures and builds a [`HashTable`].
#[derive(Debug)]
pub struct TableBuilder<S = RandomState> {
    capacity: usize,
    max_load_factor: f64,
    auto_resize: bool,
    hasher: S,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self {
            capacity: 16,
            max_load_factor: crate::buckets::DEFAULT_MAX_LOAD_FACTOR,
            auto_resize: true,
            hasher: RandomState::new(),
        }
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> TableBuilder<S> {
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

    pub fn hasher<S2>(self, hasher: S2) -> TableBuilder<S2> {
        TableBuilder {
            capacity: self.capacity,
            max_load_factor: self.max_load_factor,
            auto_resize: self.auto_resize,
            hasher,
        }
    }
}

impl<S> TableBuilder<S>
where
    S: BuildHasher,
{
    /// Builds the table, panicking if the initial bucket array cannot
    /// be allocated (the usual Rust allocation contract).
    pub fn build<K, V>(self) -> HashTable<K, V, S>
    where
        K: Eq + Hash,
    {
        match self.try_build() {
            Ok(table) => table,
            Err(err) => panic!("{err}"),
        }
    }

    /// Builds the table, surfacing bucket-array allocation failure.
    pub fn try_build<K, V>(self) -> Result<HashTable<K, V, S>, AllocError>
    where
        K: Eq + Hash,
    {
        let capacity = clamp_capacity(self.capacity);
        let max_load_factor = clamp_load_factor(self.max_load_factor);
        let buckets = BucketArray::try_with_capacity(capacity)?;
        Ok(HashTable {
            hasher: self.hasher,
            buckets,
            slots: SlotMap::with_key(),
            max_load_factor,
            resize_threshold: resize_threshold(capacity, max_load_factor),
            auto_resize: self.auto_resize,
            guard: DebugGuard::new(),
        })
    }
}
