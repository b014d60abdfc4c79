//! Power-of-two bucket array shared by both table flavors.
//!
//! Each slot holds the head of a singly-linked chain of entries; the
//! chain links themselves live inside the entries (by arena key), so the
//! array is nothing more than `Vec<Option<DefaultKey>>` plus the clamping
//! and threshold arithmetic both tables share.
//!
//! Capacity rules:
//! - requested < 1 becomes 1
//! - requested >= [`MAX_TABLE_CAPACITY`] is clamped to it
//! - anything else rounds up to the next power of two
//!
//! The array never shrinks; growth is driven by the tables' resize
//! threshold, `round(capacity * max_load_factor)`.

use slotmap::DefaultKey;

use crate::error::AllocError;

/// Upper bound on the bucket array length (2^30 slots).
pub const MAX_TABLE_CAPACITY: usize = 1 << 30;

/// Default maximum load factor used when a negative value is supplied.
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.75;

/// Clamps a requested capacity to a valid bucket-array length.
pub(crate) fn clamp_capacity(requested: usize) -> usize {
    if requested < 1 {
        1
    } else if requested >= MAX_TABLE_CAPACITY {
        MAX_TABLE_CAPACITY
    } else {
        requested.next_power_of_two()
    }
}

/// Clamps a maximum load factor the way the tables accept it: negative
/// values fall back to the default, values above 1.0 saturate at 1.0.
pub(crate) fn clamp_load_factor(factor: f64) -> f64 {
    if factor < 0.0 {
        DEFAULT_MAX_LOAD_FACTOR
    } else if factor > 1.0 {
        1.0
    } else {
        factor
    }
}

/// Entry count at which a table of `capacity` buckets should grow.
pub(crate) fn resize_threshold(capacity: usize, max_load_factor: f64) -> usize {
    (capacity as f64 * max_load_factor + 0.5) as usize
}

#[derive(Debug)]
pub(crate) struct BucketArray {
    heads: Vec<Option<DefaultKey>>,
}

impl BucketArray {
    /// Allocates an array of `capacity` empty chains. `capacity` must
    /// already be clamped to a power of two.
    pub(crate) fn try_with_capacity(capacity: usize) -> Result<Self, AllocError> {
        debug_assert!(capacity.is_power_of_two());
        let mut heads = Vec::new();
        heads
            .try_reserve_exact(capacity)
            .map_err(|_| AllocError::new(capacity))?;
        heads.resize(capacity, None);
        Ok(Self { heads })
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.heads.len()
    }

    /// Slot index for a stored hash.
    #[inline]
    pub(crate) fn slot(&self, hash: u64) -> usize {
        (hash as usize) & (self.heads.len() - 1)
    }

    #[inline]
    pub(crate) fn head(&self, slot: usize) -> Option<DefaultKey> {
        self.heads[slot]
    }

    #[inline]
    pub(crate) fn set_head(&mut self, slot: usize, head: Option<DefaultKey>) {
        self.heads[slot] = head;
    }

    /// Empties every chain, keeping the allocation.
    pub(crate) fn reset(&mut self) {
        self.heads.fill(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_clamping_boundaries() {
        assert_eq!(clamp_capacity(0), 1);
        assert_eq!(clamp_capacity(1), 1);
        assert_eq!(clamp_capacity(2), 2);
        assert_eq!(clamp_capacity(127), 128);
        assert_eq!(clamp_capacity(128), 128);
        assert_eq!(clamp_capacity(MAX_TABLE_CAPACITY), MAX_TABLE_CAPACITY);
        assert_eq!(clamp_capacity(MAX_TABLE_CAPACITY + 1), MAX_TABLE_CAPACITY);
    }

    #[test]
    fn load_factor_clamping() {
        assert_eq!(clamp_load_factor(-1.0), DEFAULT_MAX_LOAD_FACTOR);
        assert_eq!(clamp_load_factor(0.0), 0.0);
        assert_eq!(clamp_load_factor(0.5), 0.5);
        assert_eq!(clamp_load_factor(1.0), 1.0);
        assert_eq!(clamp_load_factor(1.1), 1.0);
    }

    #[test]
    fn threshold_rounds_to_nearest() {
        assert_eq!(resize_threshold(4, 0.75), 3);
        assert_eq!(resize_threshold(2, 0.75), 2); // 1.5 rounds up
        assert_eq!(resize_threshold(8, 1.0), 8);
        assert_eq!(resize_threshold(8, 0.0), 0);
    }

    #[test]
    fn slot_masks_high_bits() {
        let buckets = BucketArray::try_with_capacity(8).unwrap();
        assert_eq!(buckets.slot(0), 0);
        assert_eq!(buckets.slot(7), 7);
        assert_eq!(buckets.slot(8), 0);
        assert_eq!(buckets.slot(u64::MAX), 7);
    }

    #[test]
    fn reset_empties_every_chain() {
        let mut buckets = BucketArray::try_with_capacity(4).unwrap();
        let mut arena = slotmap::SlotMap::new();
        let id = arena.insert(());
        buckets.set_head(2, Some(id));
        assert!(buckets.head(2).is_some());
        buckets.reset();
        assert!((0..4).all(|s| buckets.head(s).is_none()));
        assert_eq!(buckets.capacity(), 4);
    }
}
