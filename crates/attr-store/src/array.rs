//! Backing sequence for an attribute store.
//!
//! [`AttributeArray`] is a contiguous, insertion-ordered list of attributes
//! with an explicit logical capacity. Capacity only grows, following
//! [`grown_capacity`], and never shrinks on deletion.

use attr_types::{Identifier, Variant};
use tracing::trace;

use crate::error::{AttributeError, AttributeResult};

/// Smallest capacity allocated by the first growth.
pub const MIN_CAPACITY: usize = 4;

/// A single `(key, value)` pair held by a store.
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    pub key: Identifier,
    pub value: Variant,
}

impl Attribute {
    /// Pair `key` with `value`.
    pub fn new(key: Identifier, value: impl Into<Variant>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

/// Largest number of attributes a single allocation can describe.
pub fn max_capacity() -> usize {
    isize::MAX as usize / std::mem::size_of::<Attribute>().max(1)
}

/// Capacity needed to hold `required` elements, starting from `current`.
///
/// Starts at `max(MIN_CAPACITY, current)` and doubles while short, as long
/// as doubling stays within `max`. If doubling cannot reach `required`, the
/// result is clamped to `max`. Returns `None` when `required` exceeds `max`.
pub fn grown_capacity(current: usize, required: usize, max: usize) -> Option<usize> {
    if required <= current {
        return Some(current);
    }
    if required > max {
        return None;
    }

    let mut capacity = current.max(MIN_CAPACITY);
    while capacity < required && capacity <= max / 2 {
        capacity *= 2;
    }
    if capacity < required {
        capacity = max;
    }
    Some(capacity)
}

/// Insertion-ordered attributes with unique keys.
#[derive(Debug)]
pub struct AttributeArray {
    items: Vec<Attribute>,
    capacity: usize,
    limit: usize,
}

impl Default for AttributeArray {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributeArray {
    /// Create an empty array with capacity 0.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            capacity: 0,
            limit: max_capacity(),
        }
    }

    /// Lower the growth ceiling so allocation failure can be exercised.
    #[cfg(test)]
    pub(crate) fn limit_capacity(&mut self, limit: usize) {
        self.limit = limit;
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the array holds no attributes.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Logical capacity. Always `>= len()`.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Position of `key`, if present.
    pub fn position(&self, key: &Identifier) -> Option<usize> {
        self.items.iter().position(|attr| attr.key == *key)
    }

    /// Value stored under `key`, if present.
    pub fn get(&self, key: &Identifier) -> Option<&Variant> {
        self.items
            .iter()
            .find(|attr| attr.key == *key)
            .map(|attr| &attr.value)
    }

    /// Attribute at `index`, if in range.
    pub fn get_index(&self, index: usize) -> Option<&Attribute> {
        self.items.get(index)
    }

    /// Iterate attributes in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.items.iter()
    }

    /// All attributes in index order.
    pub fn as_slice(&self) -> &[Attribute] {
        &self.items
    }

    /// Make room for `required` attributes.
    ///
    /// On failure the array is left exactly as it was.
    pub fn reserve(&mut self, required: usize) -> AttributeResult<()> {
        if required <= self.capacity {
            return Ok(());
        }
        let new_capacity = grown_capacity(self.capacity, required, self.limit)
            .ok_or(AttributeError::OutOfMemory)?;
        self.items
            .try_reserve_exact(new_capacity - self.items.len())
            .map_err(|_| AttributeError::OutOfMemory)?;

        trace!(
            old_capacity = self.capacity,
            new_capacity,
            "grew attribute array"
        );
        self.capacity = new_capacity;
        Ok(())
    }

    /// Store `value` under `key`.
    ///
    /// An existing key keeps its position and the displaced value is
    /// returned so the caller decides when it is released. A new key is
    /// appended, growing the array if needed. If growth fails, `value` is
    /// handed back with the error, again for the caller to release.
    pub fn set(
        &mut self,
        key: Identifier,
        value: Variant,
    ) -> Result<Option<Variant>, (AttributeError, Variant)> {
        if let Some(index) = self.position(&key) {
            return Ok(Some(std::mem::replace(&mut self.items[index].value, value)));
        }
        if let Err(err) = self.reserve(self.items.len() + 1) {
            return Err((err, value));
        }
        self.items.push(Attribute { key, value });
        Ok(None)
    }

    /// Remove `key`, shifting later attributes down by one.
    pub fn remove(&mut self, key: &Identifier) -> Option<Attribute> {
        let index = self.position(key)?;
        Some(self.items.remove(index))
    }

    /// Remove every attribute, keeping the capacity. The removed attributes
    /// are handed back for release.
    pub fn clear(&mut self) -> Vec<Attribute> {
        self.items.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u128) -> Identifier {
        Identifier::from_u128(n)
    }

    // -----------------------------------------------------------------------
    // Growth policy
    // -----------------------------------------------------------------------

    #[test]
    fn first_growth_allocates_minimum() {
        assert_eq!(grown_capacity(0, 1, 1000), Some(4));
        assert_eq!(grown_capacity(0, 4, 1000), Some(4));
    }

    #[test]
    fn growth_doubles_until_sufficient() {
        assert_eq!(grown_capacity(4, 5, 1000), Some(8));
        assert_eq!(grown_capacity(4, 33, 1000), Some(64));
        assert_eq!(grown_capacity(0, 100, 1000), Some(128));
    }

    #[test]
    fn sufficient_capacity_is_unchanged() {
        assert_eq!(grown_capacity(16, 10, 1000), Some(16));
    }

    #[test]
    fn growth_clamps_to_maximum() {
        assert_eq!(grown_capacity(8, 9, 10), Some(10));
        assert_eq!(grown_capacity(4, 7, 7), Some(7));
    }

    #[test]
    fn growth_past_maximum_fails() {
        assert_eq!(grown_capacity(0, 11, 10), None);
        assert_eq!(grown_capacity(0, usize::MAX, max_capacity()), None);
    }

    #[test]
    fn reserve_failure_leaves_array_unchanged() {
        let mut array = AttributeArray::new();
        array.set(key(1), Variant::from(1u32)).unwrap();
        let before = array.capacity();

        assert_eq!(array.reserve(usize::MAX), Err(AttributeError::OutOfMemory));
        assert_eq!(array.capacity(), before);
        assert_eq!(array.len(), 1);
        assert_eq!(array.get(&key(1)), Some(&Variant::from(1u32)));
    }

    #[test]
    fn failed_append_hands_value_back() {
        let mut array = AttributeArray::new();
        array.limit_capacity(4);
        for n in 0..4 {
            array.set(key(n), Variant::from(n as u32)).unwrap();
        }

        let (err, rejected) = array.set(key(9), Variant::from("late")).unwrap_err();
        assert_eq!(err, AttributeError::OutOfMemory);
        assert_eq!(rejected, Variant::from("late"));
        assert_eq!(array.len(), 4);
        assert_eq!(array.capacity(), 4);

        // Overwrites need no growth and still succeed at the limit.
        assert_eq!(
            array.set(key(0), Variant::Null).unwrap(),
            Some(Variant::from(0u32))
        );
    }

    #[test]
    fn capacity_tracks_appends() {
        let mut array = AttributeArray::new();
        assert_eq!(array.capacity(), 0);
        for n in 0..5 {
            array.set(key(n), Variant::from(n as u32)).unwrap();
        }
        assert_eq!(array.len(), 5);
        assert_eq!(array.capacity(), 8);
    }

    // -----------------------------------------------------------------------
    // Set / remove / clear
    // -----------------------------------------------------------------------

    #[test]
    fn set_existing_key_replaces_in_place() {
        let mut array = AttributeArray::new();
        array.set(key(1), Variant::from(1u32)).unwrap();
        array.set(key(2), Variant::from(2u32)).unwrap();

        let old = array.set(key(1), Variant::from("one")).unwrap();
        assert_eq!(old, Some(Variant::from(1u32)));
        assert_eq!(array.len(), 2);
        assert_eq!(array.position(&key(1)), Some(0));
        assert_eq!(array.get(&key(1)), Some(&Variant::from("one")));
    }

    #[test]
    fn remove_shifts_later_items() {
        let mut array = AttributeArray::new();
        for n in 0..4 {
            array.set(key(n), Variant::from(n as u32)).unwrap();
        }
        let removed = array.remove(&key(1)).unwrap();
        assert_eq!(removed.key, key(1));

        let keys: Vec<_> = array.iter().map(|a| a.key).collect();
        assert_eq!(keys, vec![key(0), key(2), key(3)]);
        assert_eq!(array.capacity(), 4);
        assert!(array.remove(&key(1)).is_none());
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut array = AttributeArray::new();
        for n in 0..6 {
            array.set(key(n), Variant::from(n as u32)).unwrap();
        }
        let released = array.clear();
        assert_eq!(released.len(), 6);
        assert!(array.is_empty());
        assert_eq!(array.capacity(), 8);
    }

    #[test]
    fn get_index_bounds() {
        let mut array = AttributeArray::new();
        array.set(key(9), Variant::Null).unwrap();
        assert_eq!(array.get_index(0).map(|a| a.key), Some(key(9)));
        assert!(array.get_index(1).is_none());
    }
}
