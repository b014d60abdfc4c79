//! Error types for the linked-hashtbl library.
//!
//! The only recoverable failure a table can report is running out of
//! memory while (re)building its bucket array. A missing key is never an
//! error; lookups and removals report absence through `Option`.

use std::fmt;

/// Error returned when a bucket array cannot be allocated.
///
/// Produced by `try_build()` on the table builders and by `resize()`.
/// A failed resize leaves the table untouched; the entries and their
/// traversal order are preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocError {
    requested: usize,
}

impl AllocError {
    pub(crate) fn new(requested: usize) -> Self {
        Self { requested }
    }

    /// Number of bucket slots that could not be allocated.
    #[inline]
    pub fn requested(&self) -> usize {
        self.requested
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to allocate bucket array of {} slots",
            self.requested
        )
    }
}

impl std::error::Error for AllocError {}
