// HashTable end-to-end suite.
//
// Each test documents what behavior is being verified and which
// invariants are assumed or asserted. The core invariants exercised:
// - Map semantics: distinct keys accumulate, repeats replace in place.
// - Clamping: capacities round to powers of two within bounds; load
//   factors clamp into [0.0, 1.0].
// - Growth: manual and automatic resizing keep every key reachable and
//   never shrink the table.
use linked_hashtbl::{
    AllocError, DirectBuildHasher, HashTable, TableBuilder, DEFAULT_MAX_LOAD_FACTOR,
    MAX_TABLE_CAPACITY,
};

// Test: basic map round-trip through the shared-reference API.
// Assumes: get takes &self; the plain table has no ordering to disturb.
// Verifies: values, len, and containment after inserts and a removal.
#[test]
fn basic_round_trip() {
    let mut t = HashTable::new();
    t.insert("one".to_string(), 1);
    t.insert("two".to_string(), 2);
    t.insert("three".to_string(), 3);

    let t_ref = &t;
    assert_eq!(t_ref.get("two"), Some(&2));
    assert_eq!(t_ref.len(), 3);

    assert_eq!(t.insert("two".to_string(), 22), Some(2));
    assert_eq!(t.remove("one"), Some(1));
    assert_eq!(t.len(), 2);
    assert!(!t.contains_key("one"));
}

// Test: capacity clamping at the documented boundaries.
// Assumes: clamping applies in the builder and in with_capacity.
// Verifies: 0 -> 1, 127 -> 128, max and beyond pin to the max.
#[test]
fn capacity_clamping_boundaries() {
    assert_eq!(HashTable::<i32, i32>::with_capacity(0).capacity(), 1);
    assert_eq!(HashTable::<i32, i32>::with_capacity(127).capacity(), 128);
    assert_eq!(
        TableBuilder::new().capacity(16).build::<i32, i32>().capacity(),
        16
    );
    // The max itself allocates 2^30 slots; only verify the arithmetic
    // constant here.
    assert_eq!(MAX_TABLE_CAPACITY, 1 << 30);
}

// Test: load-factor clamping through the builder.
// Assumes: negatives fall back to the default, >1.0 saturates.
// Verifies: the table reports the clamped value.
#[test]
fn load_factor_clamping() {
    let t = TableBuilder::new()
        .max_load_factor(-0.5)
        .build::<i32, i32>();
    assert_eq!(t.max_load_factor(), DEFAULT_MAX_LOAD_FACTOR);

    let t = TableBuilder::new().max_load_factor(3.0).build::<i32, i32>();
    assert_eq!(t.max_load_factor(), 1.0);

    let t = TableBuilder::new()
        .max_load_factor(0.5)
        .build::<i32, i32>();
    assert_eq!(t.max_load_factor(), 0.5);
}

// Test: a zero load factor with auto-resize disabled degenerates to a
// single ever-growing chain set.
// Assumes: auto_resize(false) means capacity is fixed forever.
// Verifies: hundreds of entries in one bucket still resolve correctly.
#[test]
fn fixed_capacity_chains() {
    let mut t = TableBuilder::new()
        .capacity(1)
        .auto_resize(false)
        .build::<i32, i32>();
    for k in 0..300 {
        t.insert(k, k * 3);
    }
    assert_eq!(t.capacity(), 1);
    assert_eq!(t.len(), 300);
    for k in 0..300 {
        assert_eq!(t.get(&k), Some(&(k * 3)));
    }
}

// Test: automatic growth under a deterministic hasher.
// Assumes: inserts double the table at the resize threshold.
// Verifies: final capacity covers the load; all keys reachable.
#[test]
fn auto_resize_scales_up() {
    let mut t = TableBuilder::new()
        .capacity(2)
        .hasher(DirectBuildHasher)
        .build::<u64, u64>();
    for k in 0..500 {
        t.insert(k, k);
    }
    assert!(t.capacity() >= 500);
    assert!(t.load_factor() <= t.max_load_factor());
    for k in 0..500 {
        assert_eq!(t.get(&k), Some(&k));
    }
}

// Test: try_build surfaces its error type.
// Assumes: a reasonable request succeeds; AllocError is the failure
// channel for the bucket array.
// Verifies: the Ok path, and that the error type is nameable by
// callers.
#[test]
fn try_build_ok_path() {
    let t: Result<HashTable<i32, i32>, AllocError> =
        TableBuilder::new().capacity(8).try_build();
    let t = t.unwrap();
    assert_eq!(t.capacity(), 8);
}

// Test: iteration and apply cover exactly the live entries.
// Assumes: order is unspecified; coverage is the contract.
// Verifies: sorted iteration output matches the inserted set after
// interleaved removals.
#[test]
fn iteration_after_churn() {
    let mut t = HashTable::new();
    for k in 0..50 {
        t.insert(k, k);
    }
    for k in (0..50).step_by(3) {
        t.remove(&k);
    }

    let expected: Vec<i32> = (0..50).filter(|k| k % 3 != 0).collect();
    let mut seen: Vec<i32> = t.iter().map(|(k, _)| *k).collect();
    seen.sort_unstable();
    assert_eq!(seen, expected);

    let mut count = 0;
    assert_eq!(
        t.apply(|_, _| {
            count += 1;
            true
        }),
        expected.len()
    );
    assert_eq!(count, expected.len());
}
