//! Structural comparison between stores.

use attr_types::{Identifier, Variant};
use serde::{Deserialize, Serialize};

use crate::array::Attribute;
use crate::store::AttributeStore;

/// How two stores' key sets are matched by [`AttributeStore::compare`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchType {
    /// Same keys on both sides, every value equal.
    AllItems,
    /// Every attribute of ours exists with an equal value in theirs.
    OurItems,
    /// Every attribute of theirs exists with an equal value in ours.
    TheirItems,
    /// Keys present on both sides have equal values.
    Intersection,
    /// Every attribute of the store with fewer items exists with an equal
    /// value in the other. On a tie ours is checked against theirs.
    Smaller,
}

impl MatchType {
    /// Apply this match to two attribute lists with unique keys.
    pub fn matches(self, ours: &[Attribute], theirs: &[Attribute]) -> bool {
        match self {
            Self::AllItems => ours.len() == theirs.len() && contained_in(ours, theirs),
            Self::OurItems => contained_in(ours, theirs),
            Self::TheirItems => contained_in(theirs, ours),
            Self::Intersection => ours.iter().all(|attr| {
                find(theirs, &attr.key).map_or(true, |value| *value == attr.value)
            }),
            Self::Smaller => {
                if theirs.len() < ours.len() {
                    contained_in(theirs, ours)
                } else {
                    contained_in(ours, theirs)
                }
            }
        }
    }
}

fn find<'a>(attrs: &'a [Attribute], key: &Identifier) -> Option<&'a Variant> {
    attrs
        .iter()
        .find(|attr| attr.key == *key)
        .map(|attr| &attr.value)
}

fn contained_in(subset: &[Attribute], superset: &[Attribute]) -> bool {
    subset
        .iter()
        .all(|attr| find(superset, &attr.key) == Some(&attr.value))
}

impl AttributeStore {
    /// Compare this store with `other` under `match_type`.
    ///
    /// `other` is snapshotted under its own lock before this store is
    /// locked, so the two locks are never held together. A store always
    /// matches itself.
    pub fn compare(&self, other: &AttributeStore, match_type: MatchType) -> bool {
        if self.same_store(other) {
            return true;
        }
        let theirs = other.items();
        self.read(|ours| match_type.matches(ours.as_slice(), &theirs))
    }
}
