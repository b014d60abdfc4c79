//! Hasher families for common key kinds.
//!
//! The tables take any `S: BuildHasher`, and `RandomState` is the
//! default. The hashers here are deliberately cheap and deterministic,
//! for integer-heavy and short-string workloads where SipHash is
//! overkill and a stable iteration-independent hash is handy in tests:
//!
//! - [`DirectBuildHasher`]: takes the last machine word written and
//!   spreads its bits (the classic Java 1.4 supplemental mix). Suited to
//!   `i32`/`i64`/`usize` keys and [`PtrKey`] identity keys.
//! - [`Djb2BuildHasher`]: the djb2 byte-string hash
//!   (`h = 33 * h ^ byte`, seeded with 5381).
//! - [`PtrKey`]: wraps a reference so equality and hashing go by
//!   address, never by the pointed-to contents.

use core::hash::{BuildHasher, Hash, Hasher};
use core::marker::PhantomData;

/// Bit spread applied by [`DirectHasher::finish`]. Folds the high word
/// into the low one first so 64-bit values still influence the result.
#[inline]
fn spread(word: u64) -> u64 {
    let mut h = (word as u32) ^ ((word >> 32) as u32);
    h ^= (h >> 20) ^ (h >> 12);
    (h ^ (h >> 7) ^ (h >> 4)) as u64
}

/// Word-identity hasher with a finishing bit spread.
#[derive(Debug, Default, Clone)]
pub struct DirectHasher {
    word: u64,
}

impl Hasher for DirectHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        // Byte streams fold in eight bytes at a time.
        for &b in bytes {
            self.word = self.word.rotate_left(8) ^ u64::from(b);
        }
    }

    #[inline]
    fn write_u32(&mut self, i: u32) {
        self.word = u64::from(i);
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.word = i;
    }

    #[inline]
    fn write_usize(&mut self, i: usize) {
        self.word = i as u64;
    }

    #[inline]
    fn write_i32(&mut self, i: i32) {
        self.word = i as u32 as u64;
    }

    #[inline]
    fn write_i64(&mut self, i: i64) {
        self.word = i as u64;
    }

    #[inline]
    fn finish(&self) -> u64 {
        spread(self.word)
    }
}

#[derive(Debug, Default, Clone)]
pub struct DirectBuildHasher;

impl BuildHasher for DirectBuildHasher {
    type Hasher = DirectHasher;

    #[inline]
    fn build_hasher(&self) -> Self::Hasher {
        DirectHasher::default()
    }
}

/// djb2 string hasher.
#[derive(Debug, Clone)]
pub struct Djb2Hasher {
    state: u32,
}

impl Default for Djb2Hasher {
    fn default() -> Self {
        Self { state: 5381 }
    }
}

impl Hasher for Djb2Hasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state = self.state.wrapping_mul(33) ^ u32::from(b);
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        u64::from(self.state)
    }
}

#[derive(Debug, Default, Clone)]
pub struct Djb2BuildHasher;

impl BuildHasher for Djb2BuildHasher {
    type Hasher = Djb2Hasher;

    #[inline]
    fn build_hasher(&self) -> Self::Hasher {
        Djb2Hasher::default()
    }
}

/// Identity key: two `PtrKey`s are equal iff they were made from the
/// same referent, and the hash is derived from the address alone.
///
/// The wrapped lifetime keeps the referent alive for as long as the key
/// is in a table, so stale addresses cannot be observed.
#[derive(Debug)]
pub struct PtrKey<'a, T> {
    addr: *const T,
    _life: PhantomData<&'a T>,
}

impl<'a, T> PtrKey<'a, T> {
    pub fn new(referent: &'a T) -> Self {
        Self {
            addr: referent as *const T,
            _life: PhantomData,
        }
    }

    /// Borrows the referent back.
    pub fn get(&self) -> &'a T {
        // Valid for 'a by construction.
        unsafe { &*self.addr }
    }
}

impl<T> Clone for PtrKey<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PtrKey<'_, T> {}

impl<T> PartialEq for PtrKey<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.addr, other.addr)
    }
}

impl<T> Eq for PtrKey<'_, T> {}

impl<T> Hash for PtrKey<'_, T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.addr as usize);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direct_hash_of<T: Hash>(v: T) -> u64 {
        DirectBuildHasher.hash_one(v)
    }

    #[test]
    fn direct_hasher_spreads_low_bits() {
        // Sequential keys must not collapse onto the same low bits.
        let slots: std::collections::BTreeSet<u64> =
            (0u64..64).map(|k| direct_hash_of(k) & 63).collect();
        assert!(slots.len() > 16, "spread left {} distinct slots", slots.len());
    }

    #[test]
    fn direct_hasher_is_deterministic_across_widths() {
        assert_eq!(direct_hash_of(7i32), direct_hash_of(7i32));
        assert_eq!(direct_hash_of(7i64), direct_hash_of(7i64));
        // The fold makes a 64-bit value differ from its truncation.
        assert_ne!(direct_hash_of(1u64 << 32), direct_hash_of(0u64));
    }

    #[test]
    fn djb2_matches_reference_values() {
        // djb2("") == 5381, and one step of h = 33*h ^ b.
        let mut h = Djb2Hasher::default();
        assert_eq!(h.finish(), 5381);
        h.write(b"a");
        assert_eq!(h.finish(), u64::from(5381u32.wrapping_mul(33) ^ u32::from(b'a')));
    }

    #[test]
    fn djb2_differs_for_different_strings() {
        let a = Djb2BuildHasher.hash_one("100");
        let b = Djb2BuildHasher.hash_one("200");
        assert_ne!(a, b);
    }

    #[test]
    fn ptr_key_identity_semantics() {
        let x = 41;
        let y = 41;
        let kx = PtrKey::new(&x);
        let ky = PtrKey::new(&y);
        assert_eq!(kx, kx);
        assert_ne!(kx, ky, "equal contents, distinct addresses");
        assert_eq!(*kx.get(), 41);

        let hx = DirectBuildHasher.hash_one(kx);
        assert_eq!(hx, DirectBuildHasher.hash_one(kx));
        assert_ne!(hx, DirectBuildHasher.hash_one(ky));
    }
}
