//! Caller-visible locking.
//!
//! Every store operation takes the store's reentrant lock internally. Callers
//! that need several operations to run as one atomic unit hold the lock
//! across them, either with the scoped [`AttributeStore::lock`] guard or with
//! the explicit [`AttributeStore::lock_store`] / [`AttributeStore::unlock_store`]
//! pair. Both nest on the owning thread.
//!
//! Explicit holds are recorded per thread, so an `unlock_store` can only
//! release a lock the calling thread actually took.

use std::cell::RefCell;
use std::fmt;

use parking_lot::lock_api::ArcReentrantMutexGuard;
use parking_lot::{RawMutex, RawThreadId, ReentrantMutexGuard};

use crate::array::AttributeArray;
use crate::error::{AttributeError, AttributeResult};
use crate::store::AttributeStore;

type HeldGuard = ArcReentrantMutexGuard<RawMutex, RawThreadId, RefCell<AttributeArray>>;

struct HeldLock {
    store: u64,
    _guard: HeldGuard,
}

thread_local! {
    static HELD: RefCell<Vec<HeldLock>> = const { RefCell::new(Vec::new()) };
}

/// Scoped hold on a store's lock. Released when dropped.
pub struct StoreLock<'a> {
    _guard: ReentrantMutexGuard<'a, RefCell<AttributeArray>>,
}

impl fmt::Debug for StoreLock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreLock").finish_non_exhaustive()
    }
}

impl AttributeStore {
    /// Hold the store's lock until the returned guard is dropped.
    pub fn lock(&self) -> StoreLock<'_> {
        StoreLock {
            _guard: self.shared.lock(),
        }
    }

    /// Acquire the store's lock until a matching [`unlock_store`](Self::unlock_store).
    ///
    /// Blocks while another thread holds the lock. Nested calls on the same
    /// thread succeed immediately and must each be balanced.
    pub fn lock_store(&self) {
        let guard = self.shared.lock_arc();
        HELD.with(|held| {
            held.borrow_mut().push(HeldLock {
                store: self.id,
                _guard: guard,
            })
        });
    }

    /// Release one level of a lock taken with [`lock_store`](Self::lock_store).
    ///
    /// Fails with [`AttributeError::NotLocked`] if the calling thread holds
    /// no explicit lock on this store.
    pub fn unlock_store(&self) -> AttributeResult<()> {
        let released = HELD.with(|held| {
            let mut held = held.borrow_mut();
            let index = held.iter().rposition(|lock| lock.store == self.id)?;
            Some(held.remove(index))
        });
        match released {
            Some(lock) => {
                drop(lock);
                Ok(())
            }
            None => Err(AttributeError::NotLocked),
        }
    }
}

/// Drop every explicit hold the current thread still has on `store`.
pub(crate) fn release_all(store: u64) {
    let released: Vec<HeldLock> = HELD.with(|held| {
        let mut held = held.borrow_mut();
        let (mine, rest): (Vec<HeldLock>, Vec<HeldLock>) =
            held.drain(..).partition(|lock| lock.store == store);
        *held = rest;
        mine
    });
    drop(released);
}
