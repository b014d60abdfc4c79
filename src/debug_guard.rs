//! Debug-only guard against reentrant table mutation.
//!
//! The tables call user code (`Hash`, `Eq`, eviction policies) while
//! their chain and traversal links may be mid-update. A well-behaved key
//! never touches the table from inside those callbacks, but a buggy one
//! can, and the resulting corruption is hard to trace. In debug builds
//! this guard turns such reentry into an immediate panic; in release
//! builds it compiles away entirely.

use core::cell::Cell;
use core::marker::PhantomData;

/// Embedded in each table; public entry points hold a [`GuardToken`]
/// for their whole body via `let _g = self.guard.enter();`.
///
/// The raw-pointer marker also keeps the owning table `!Send`/`!Sync`,
/// matching its single-threaded contract.
#[derive(Debug, Default)]
pub(crate) struct DebugGuard {
    #[cfg(debug_assertions)]
    busy: Cell<bool>,
    _not_sync: PhantomData<*mut ()>,
}

impl DebugGuard {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            busy: Cell::new(false),
            _not_sync: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn enter(&self) -> GuardToken<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.busy.replace(true),
                "table re-entered from user code while an operation is in progress"
            );
            GuardToken { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            GuardToken {
                _life: PhantomData,
            }
        }
    }
}

pub(crate) struct GuardToken<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugGuard,
    #[cfg(not(debug_assertions))]
    _life: PhantomData<&'a ()>,
}

impl Drop for GuardToken<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.busy.set(false);
    }
}
