//! The [`SlotSet`] bitset over topology-vector slots.

use crate::id::SlotId;

/// A set of slot IDs implemented as a dynamically-sized bitset.
///
/// Backs the `change_bus` membership of an action and the touched-slot
/// tracking consumed by downstream legality checks. Cheap to clone, and
/// equality ignores trailing zero words so sets built from different slot
/// ranges compare by content.
#[derive(Clone, Debug, Default)]
pub struct SlotSet {
    bits: Vec<u64>,
}

impl SlotSet {
    const BITS_PER_WORD: usize = 64;

    /// Create an empty slot set.
    pub fn empty() -> Self {
        Self { bits: Vec::new() }
    }

    /// Insert a slot ID into the set.
    pub fn insert(&mut self, slot: SlotId) {
        let word = slot.0 as usize / Self::BITS_PER_WORD;
        let bit = slot.0 as usize % Self::BITS_PER_WORD;
        if word >= self.bits.len() {
            self.bits.resize(word + 1, 0);
        }
        self.bits[word] |= 1u64 << bit;
    }

    /// Remove a slot ID from the set.
    pub fn remove(&mut self, slot: SlotId) {
        let word = slot.0 as usize / Self::BITS_PER_WORD;
        let bit = slot.0 as usize % Self::BITS_PER_WORD;
        if word < self.bits.len() {
            self.bits[word] &= !(1u64 << bit);
        }
    }

    /// Check whether the set contains a slot ID.
    pub fn contains(&self, slot: SlotId) -> bool {
        let word = slot.0 as usize / Self::BITS_PER_WORD;
        let bit = slot.0 as usize % Self::BITS_PER_WORD;
        word < self.bits.len() && (self.bits[word] & (1u64 << bit)) != 0
    }

    /// Return the union of two sets (`self | other`).
    pub fn union(&self, other: &Self) -> Self {
        let max_len = self.bits.len().max(other.bits.len());
        let mut bits = Vec::with_capacity(max_len);
        for i in 0..max_len {
            let a = self.bits.get(i).copied().unwrap_or(0);
            let b = other.bits.get(i).copied().unwrap_or(0);
            bits.push(a | b);
        }
        Self { bits }
    }

    /// Returns `true` if the set contains no slots.
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&w| w == 0)
    }

    /// Returns the number of slots in the set.
    pub fn len(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate over the slot IDs in the set, in ascending order.
    pub fn iter(&self) -> SlotSetIter<'_> {
        SlotSetIter {
            bits: &self.bits,
            word_idx: 0,
            bit_idx: 0,
        }
    }
}

impl PartialEq for SlotSet {
    fn eq(&self, other: &Self) -> bool {
        let max_len = self.bits.len().max(other.bits.len());
        for i in 0..max_len {
            let a = self.bits.get(i).copied().unwrap_or(0);
            let b = other.bits.get(i).copied().unwrap_or(0);
            if a != b {
                return false;
            }
        }
        true
    }
}

impl Eq for SlotSet {}

impl FromIterator<SlotId> for SlotSet {
    fn from_iter<I: IntoIterator<Item = SlotId>>(iter: I) -> Self {
        let mut set = Self::empty();
        for slot in iter {
            set.insert(slot);
        }
        set
    }
}

impl<'a> IntoIterator for &'a SlotSet {
    type Item = SlotId;
    type IntoIter = SlotSetIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over slot IDs in a [`SlotSet`], yielding IDs in ascending order.
pub struct SlotSetIter<'a> {
    bits: &'a [u64],
    word_idx: usize,
    bit_idx: usize,
}

impl Iterator for SlotSetIter<'_> {
    type Item = SlotId;

    fn next(&mut self) -> Option<Self::Item> {
        while self.word_idx < self.bits.len() {
            let word = self.bits[self.word_idx];
            while self.bit_idx < 64 {
                let bit = self.bit_idx;
                self.bit_idx += 1;
                if word & (1u64 << bit) != 0 {
                    return Some(SlotId((self.word_idx * 64 + bit) as u32));
                }
            }
            self.word_idx += 1;
            self.bit_idx = 0;
        }
        None
    }
}
