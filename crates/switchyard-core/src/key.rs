//! Field keys and the [`KeySet`] capability bitmask.
//!
//! Each mutable field of an action is named by a [`FieldKey`]. An action
//! variant exposes a subset of the keys; the subset is a [`KeySet`] checked
//! at every `set`/`get` call instead of any runtime attribute lookup.
//! [`FieldKey::ALL`] fixes the declaration order that the flat-vector codec
//! derives its region layout from — reordering it is a wire-format break.

use std::fmt;

/// Names one mutable field of a topology action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKey {
    /// Per-slot busbar assignments.
    SetBus,
    /// Per-slot busbar toggles.
    ChangeBus,
    /// Per-load detachment flags.
    DetachLoad,
    /// Per-generator detachment flags.
    DetachGen,
    /// Per-storage detachment flags.
    DetachStorage,
}

impl FieldKey {
    /// Every key, in field declaration order.
    ///
    /// This order is load-bearing: the flat-vector codec lays out one region
    /// per authorized key by iterating this array.
    pub const ALL: [FieldKey; 5] = [
        FieldKey::SetBus,
        FieldKey::ChangeBus,
        FieldKey::DetachLoad,
        FieldKey::DetachGen,
        FieldKey::DetachStorage,
    ];

    /// The stable string name used by the document and JSON forms.
    pub fn name(self) -> &'static str {
        match self {
            Self::SetBus => "set_bus",
            Self::ChangeBus => "change_bus",
            Self::DetachLoad => "detach_load",
            Self::DetachGen => "detach_gen",
            Self::DetachStorage => "detach_storage",
        }
    }

    /// Parse a stable string name back into a key.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    fn bit(self) -> u8 {
        match self {
            Self::SetBus => 1 << 0,
            Self::ChangeBus => 1 << 1,
            Self::DetachLoad => 1 << 2,
            Self::DetachGen => 1 << 3,
            Self::DetachStorage => 1 << 4,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of field keys an action variant is authorized to use.
///
/// # Examples
///
/// ```
/// use switchyard_core::{FieldKey, KeySet};
///
/// let mut keys = KeySet::empty();
/// keys.insert(FieldKey::SetBus);
/// assert!(keys.contains(FieldKey::SetBus));
/// assert!(!keys.contains(FieldKey::ChangeBus));
/// assert_eq!(keys.len(), 1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct KeySet(u8);

impl KeySet {
    /// The empty key set.
    pub fn empty() -> Self {
        Self(0)
    }

    /// The set of every key.
    pub fn all() -> Self {
        FieldKey::ALL.iter().copied().collect()
    }

    /// Insert a key.
    pub fn insert(&mut self, key: FieldKey) {
        self.0 |= key.bit();
    }

    /// Remove a key.
    pub fn remove(&mut self, key: FieldKey) {
        self.0 &= !key.bit();
    }

    /// Check whether the set contains a key.
    pub fn contains(self, key: FieldKey) -> bool {
        self.0 & key.bit() != 0
    }

    /// Returns `true` if no key is authorized.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of keys in the set.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate over the keys in declaration order.
    pub fn iter(self) -> impl Iterator<Item = FieldKey> {
        FieldKey::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl FromIterator<FieldKey> for KeySet {
    fn from_iter<I: IntoIterator<Item = FieldKey>>(iter: I) -> Self {
        let mut set = Self::empty();
        for key in iter {
            set.insert(key);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_parse_round_trip() {
        for key in FieldKey::ALL {
            assert_eq!(FieldKey::parse(key.name()), Some(key));
        }
        assert_eq!(FieldKey::parse("redispatch"), None);
    }

    #[test]
    fn all_contains_everything() {
        let keys = KeySet::all();
        assert_eq!(keys.len(), FieldKey::ALL.len());
        for key in FieldKey::ALL {
            assert!(keys.contains(key));
        }
    }

    #[test]
    fn remove_then_absent() {
        let mut keys = KeySet::all();
        keys.remove(FieldKey::ChangeBus);
        assert!(!keys.contains(FieldKey::ChangeBus));
        assert_eq!(keys.len(), 4);
    }

    #[test]
    fn iter_follows_declaration_order() {
        let keys: Vec<_> = KeySet::all().iter().collect();
        assert_eq!(keys, FieldKey::ALL.to_vec());
    }
}
