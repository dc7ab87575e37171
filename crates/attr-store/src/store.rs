use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use attr_types::{Identifier, Variant, VariantKind};
use parking_lot::ReentrantMutex;
use tracing::debug;

use crate::array::{Attribute, AttributeArray};
use crate::config::StoreConfig;
use crate::error::{AttributeError, AttributeResult};
use crate::lock;

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

/// Result of a bulk copy, plus the values to release once the borrow ends.
type CopyOutcome = (AttributeResult<()>, Vec<Variant>, Vec<Attribute>);

/// Thread-safe, insertion-ordered attribute store.
///
/// All attributes live in an [`AttributeArray`] behind a reentrant lock.
/// Every operation holds the lock for its duration; the lock is reentrant so
/// a caller already holding it (see [`lock`](Self::lock)) can call any
/// operation. Values are copied on the way in and on the way out, so callers
/// never alias the store's buffers.
///
/// Replaced and deleted values are released after the internal borrow ends,
/// which lets an object's destructor call back into the same store.
pub struct AttributeStore {
    pub(crate) id: u64,
    pub(crate) shared: Arc<ReentrantMutex<RefCell<AttributeArray>>>,
}

impl AttributeStore {
    /// Create a new empty store with capacity 0.
    pub fn new() -> Self {
        Self::from_array(AttributeArray::new())
    }

    /// Create an empty store with room for at least `hint` attributes.
    pub fn with_capacity(hint: usize) -> AttributeResult<Self> {
        let mut array = AttributeArray::new();
        array.reserve(hint)?;
        debug!(hint, capacity = array.capacity(), "created attribute store");
        Ok(Self::from_array(array))
    }

    /// Create an empty store from a [`StoreConfig`].
    pub fn from_config(config: &StoreConfig) -> AttributeResult<Self> {
        Self::with_capacity(config.initial_capacity)
    }

    fn from_array(array: AttributeArray) -> Self {
        Self {
            id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
            shared: Arc::new(ReentrantMutex::new(RefCell::new(array))),
        }
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&AttributeArray) -> R) -> R {
        let guard = self.shared.lock();
        let array = guard.borrow();
        f(&array)
    }

    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut AttributeArray) -> R) -> R {
        let guard = self.shared.lock();
        let mut array = guard.borrow_mut();
        f(&mut array)
    }

    pub(crate) fn same_store(&self, other: &AttributeStore) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    // -----------------------------------------------------------------------
    // Untyped access
    // -----------------------------------------------------------------------

    /// Copy of the value stored under `key`.
    ///
    /// Object values come back as a new strong reference owned by the caller.
    pub fn get_item(&self, key: Identifier) -> AttributeResult<Variant> {
        self.read(|array| array.get(&key).cloned())
            .ok_or(AttributeError::NotFound(key))
    }

    /// Returns `true` if an attribute with this key exists.
    pub fn contains(&self, key: Identifier) -> bool {
        self.read(|array| array.position(&key).is_some())
    }

    /// Tag of the value stored under `key`.
    pub fn item_kind(&self, key: Identifier) -> AttributeResult<VariantKind> {
        self.read(|array| array.get(&key).map(Variant::kind))
            .ok_or(AttributeError::NotFound(key))
    }

    /// Whether the value under `key` equals `candidate`.
    ///
    /// Tags must match; strings compare by content and objects by identity.
    pub fn compare_item(&self, key: Identifier, candidate: &Variant) -> AttributeResult<bool> {
        self.read(|array| array.get(&key).map(|value| value == candidate))
            .ok_or(AttributeError::NotFound(key))
    }

    /// Store `value` under `key`.
    ///
    /// An existing key is overwritten in place and its old value released. A
    /// new key is appended. Fails with [`AttributeError::OutOfMemory`] if the
    /// store cannot grow, in which case nothing changes. Strings are cut at
    /// their first NUL.
    pub fn set_item(&self, key: Identifier, value: impl Into<Variant>) -> AttributeResult<()> {
        let value = value.into().into_terminated();
        match self.write(|array| array.set(key, value)) {
            Ok(displaced) => {
                drop(displaced);
                Ok(())
            }
            Err((err, rejected)) => {
                drop(rejected);
                Err(err)
            }
        }
    }

    /// Remove the attribute stored under `key`.
    ///
    /// Later attributes shift down by one index.
    pub fn delete_item(&self, key: Identifier) -> AttributeResult<()> {
        match self.write(|array| array.remove(&key)) {
            Some(removed) => {
                drop(removed);
                Ok(())
            }
            None => Err(AttributeError::NotFound(key)),
        }
    }

    /// Remove every attribute. Capacity is retained.
    pub fn delete_all_items(&self) {
        let released = self.write(AttributeArray::clear);
        debug!(count = released.len(), "deleted all attributes");
        drop(released);
    }

    // -----------------------------------------------------------------------
    // Enumeration
    // -----------------------------------------------------------------------

    /// Number of attributes.
    pub fn count(&self) -> usize {
        self.read(AttributeArray::len)
    }

    /// Returns `true` if the store holds no attributes.
    pub fn is_empty(&self) -> bool {
        self.read(AttributeArray::is_empty)
    }

    /// Number of attributes the store can hold without growing.
    pub fn capacity(&self) -> usize {
        self.read(AttributeArray::capacity)
    }

    /// Key and a copy of the value at `index`.
    ///
    /// Indices are only stable between mutations. Hold the lock across a
    /// [`count`](Self::count) and the index walk for a consistent view.
    pub fn item_by_index(&self, index: usize) -> AttributeResult<(Identifier, Variant)> {
        self.read(|array| match array.get_index(index) {
            Some(attr) => Ok((attr.key, attr.value.clone())),
            None => Err(AttributeError::IndexOutOfRange {
                index,
                count: array.len(),
            }),
        })
    }

    /// Consistent copy of every attribute, in index order.
    pub fn items(&self) -> Vec<Attribute> {
        self.read(|array| array.as_slice().to_vec())
    }

    /// Store a copy of every attribute of `self` into `dest`.
    ///
    /// Keys already in `dest` are overwritten; keys only in `dest` are kept.
    /// Room for every new key is reserved before the first write, so an
    /// [`AttributeError::OutOfMemory`] leaves `dest` unchanged.
    pub fn copy_all_items(&self, dest: &AttributeStore) -> AttributeResult<()> {
        if self.same_store(dest) {
            return Ok(());
        }
        let source = self.items();
        let count = source.len();

        // Everything the closure does not keep comes back out, so it is
        // released after the borrow ends.
        let (outcome, released, unused): CopyOutcome = dest.write(|array| {
            let incoming = source
                .iter()
                .filter(|attr| array.position(&attr.key).is_none())
                .count();
            if let Err(err) = array.reserve(array.len() + incoming) {
                return (Err(err), Vec::new(), source);
            }

            let mut released = Vec::new();
            let mut source = source.into_iter();
            while let Some(attr) = source.next() {
                match array.set(attr.key, attr.value) {
                    Ok(old) => released.extend(old),
                    Err((err, value)) => {
                        released.push(value);
                        return (Err(err), released, source.collect());
                    }
                }
            }
            (Ok(()), released, Vec::new())
        });
        drop(released);
        drop(unused);
        outcome?;

        debug!(count, "copied attributes");
        Ok(())
    }
}

impl Default for AttributeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AttributeStore {
    fn drop(&mut self) {
        lock::release_all(self.id);
    }
}

impl std::fmt::Debug for AttributeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (count, capacity) = self.read(|array| (array.len(), array.capacity()));
        f.debug_struct("AttributeStore")
            .field("attribute_count", &count)
            .field("capacity", &capacity)
            .finish()
    }
}
