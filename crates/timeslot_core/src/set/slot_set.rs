//! Ordered, gap-tolerant slot container.
//!
//! # Responsibility
//! - Hold slots by position and apply set algebra in place.
//! - Produce per-slot records merged with set-level data.
//!
//! # Invariants
//! - Positions are sparse: a removed or never-written position is a gap that
//!   iteration skips and `get` reports as absent. Storage grows with the
//!   number of slots, not with the highest position.
//! - Filtering operations keep survivor positions; `merge` and `sort`
//!   renumber positions from zero.
//! - Single writer: mutation is not synchronized.

use crate::model::record::{self, Record};
use crate::model::slot::{Payload, Slot};
use crate::set::ops;
use log::debug;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::{btree_map, BTreeMap};

/// Ordered collection of slots with bulk set operations.
///
/// Equality compares positions as well as slots: two sets holding the same
/// slots in the same order are unequal when their gaps differ. Call
/// `compact` on both sides to compare contents only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotSet {
    slots: BTreeMap<usize, Slot>,
    data: Payload,
}

impl SlotSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set holding `slots` at positions `0..n`.
    pub fn from_slots(slots: impl IntoIterator<Item = Slot>) -> Self {
        Self {
            slots: slots.into_iter().enumerate().collect(),
            data: Payload::new(),
        }
    }

    /// Replaces set-level data merged into every record.
    pub fn with_data(mut self, data: Payload) -> Self {
        self.data = data;
        self
    }

    pub fn data(&self) -> &Payload {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Payload {
        &mut self.data
    }

    /// Appends a slot after the highest position and returns its position.
    ///
    /// When the highest position is `usize::MAX` the set is compacted first.
    pub fn push(&mut self, slot: Slot) -> usize {
        let last = self.slots.last_key_value().map(|(&index, _)| index);
        let index = match last.map(|index| index.checked_add(1)) {
            None => 0,
            Some(Some(next)) => next,
            Some(None) => {
                self.compact();
                debug!("event=slot_set_push module=set status=ok compacted=true");
                self.slots.len()
            }
        };
        self.slots.insert(index, slot);
        index
    }

    /// Stores `slot` at `index`, returning the slot previously stored there.
    ///
    /// Any position is accepted; positions skipped over stay gaps.
    pub fn set(&mut self, index: usize, slot: Slot) -> Option<Slot> {
        self.slots.insert(index, slot)
    }

    /// Returns the slot at `index`, or `None` for gaps and unset positions.
    pub fn get(&self, index: usize) -> Option<&Slot> {
        self.slots.get(&index)
    }

    pub fn contains_index(&self, index: usize) -> bool {
        self.slots.contains_key(&index)
    }

    /// Removes the slot at `index`, leaving a gap.
    pub fn remove(&mut self, index: usize) -> Option<Slot> {
        self.slots.remove(&index)
    }

    /// Number of stored slots, gaps excluded.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterates stored slots in position order, skipping gaps.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            slots: self.slots.values(),
        }
    }

    /// Iterates `(position, slot)` pairs, skipping gaps.
    pub fn iter_indexed(&self) -> impl Iterator<Item = (usize, &Slot)> + '_ {
        self.slots.iter().map(|(&index, slot)| (index, slot))
    }

    /// Drops gaps and renumbers positions from zero.
    pub fn compact(&mut self) {
        let slots = std::mem::take(&mut self.slots).into_values().collect();
        self.renumber(slots);
    }

    /// Consumes the set, returning stored slots in order.
    pub fn into_vec(self) -> Vec<Slot> {
        self.slots.into_values().collect()
    }

    /// Keeps only slots intersecting at least one target slot.
    pub fn intersect<'t, T>(&mut self, target: T)
    where
        T: IntoIterator<Item = &'t Slot> + Clone,
    {
        let before = self.len();
        self.slots
            .retain(|_, slot| ops::intersects_any(&*slot, target.clone()));
        debug!(
            "event=slot_set_intersect module=set status=ok before={} after={}",
            before,
            self.len()
        );
    }

    /// Keeps only slots intersecting no target slot.
    pub fn subtract<'t, T>(&mut self, target: T)
    where
        T: IntoIterator<Item = &'t Slot> + Clone,
    {
        let before = self.len();
        self.slots
            .retain(|_, slot| !ops::intersects_any(&*slot, target.clone()));
        debug!(
            "event=slot_set_subtract module=set status=ok before={} after={}",
            before,
            self.len()
        );
    }

    /// Replaces contents with `ops::merge(self, target, cut_intersections)`.
    ///
    /// Target slots are appended after surviving own slots.
    pub fn merge<'t, T>(&mut self, target: T, cut_intersections: bool)
    where
        T: IntoIterator<Item = &'t Slot> + Clone,
    {
        let merged = ops::merge(self.slots.values(), target, cut_intersections);
        self.renumber(merged);
        debug!(
            "event=slot_set_merge module=set status=ok cut_intersections={} after={}",
            cut_intersections,
            self.len()
        );
    }

    /// Keeps slots for which `predicate` returns `true`.
    pub fn filter(&mut self, mut predicate: impl FnMut(&Slot) -> bool) {
        self.slots.retain(|_, slot| predicate(&*slot));
    }

    /// Stable sort by `compare`; gaps are dropped.
    pub fn sort<F>(&mut self, compare: F) -> &mut Self
    where
        F: FnMut(&Slot, &Slot) -> Ordering,
    {
        let mut live: Vec<Slot> = std::mem::take(&mut self.slots).into_values().collect();
        live.sort_by(compare);
        self.renumber(live);
        self
    }

    /// Sorts by start, then end.
    pub fn sort_by_start(&mut self) -> &mut Self {
        self.sort(|left, right| {
            left.start()
                .cmp(&right.start())
                .then_with(|| left.end().cmp(&right.end()))
        })
    }

    /// Removes slots equal to an earlier slot; the first occurrence stays.
    pub fn remove_duplicates(&mut self) {
        let mut kept: Vec<&Slot> = Vec::with_capacity(self.slots.len());
        let mut duplicates = Vec::new();
        for (&index, slot) in &self.slots {
            if kept.contains(&slot) {
                duplicates.push(index);
            } else {
                kept.push(slot);
            }
        }
        for index in &duplicates {
            self.slots.remove(index);
        }
        debug!(
            "event=slot_set_dedup module=set status=ok removed={}",
            duplicates.len()
        );
    }

    /// Returns one record per slot, each merged over set-level data.
    pub fn to_records(&self) -> Vec<Record> {
        self.iter()
            .map(|slot| record::overlay(self.data.clone(), &slot.to_record()))
            .collect()
    }

    /// Serializes `to_records()` as compact JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    fn renumber(&mut self, slots: Vec<Slot>) {
        self.slots = slots.into_iter().enumerate().collect();
    }
}

impl Serialize for SlotSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.to_records())
    }
}

impl From<Vec<Slot>> for SlotSet {
    fn from(slots: Vec<Slot>) -> Self {
        Self::from_slots(slots)
    }
}

impl FromIterator<Slot> for SlotSet {
    fn from_iter<I: IntoIterator<Item = Slot>>(iter: I) -> Self {
        Self::from_slots(iter)
    }
}

impl Extend<Slot> for SlotSet {
    fn extend<I: IntoIterator<Item = Slot>>(&mut self, iter: I) {
        for slot in iter {
            self.push(slot);
        }
    }
}

impl<'a> IntoIterator for &'a SlotSet {
    type Item = &'a Slot;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for SlotSet {
    type Item = Slot;
    type IntoIter = btree_map::IntoValues<usize, Slot>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.into_values()
    }
}

/// Gap-skipping iterator over a `SlotSet`.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    slots: btree_map::Values<'a, usize, Slot>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Slot;

    fn next(&mut self) -> Option<Self::Item> {
        self.slots.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.slots.next_back()
    }
}

impl ExactSizeIterator for Iter<'_> {}

#[cfg(test)]
mod tests {
    use super::SlotSet;
    use crate::model::slot::Slot;
    use serde_json::Map;

    fn slot(start: &str, end: &str) -> Slot {
        Slot::parse_rfc3339(start, end, Map::new()).unwrap()
    }

    #[test]
    fn filtering_keeps_survivor_positions() {
        let mut set = SlotSet::from_slots([
            slot("2024-03-01T09:00:00Z", "2024-03-01T10:00:00Z"),
            slot("2024-03-01T10:00:00Z", "2024-03-01T11:00:00Z"),
            slot("2024-03-01T11:00:00Z", "2024-03-01T12:00:00Z"),
        ]);
        set.filter(|slot| slot.start().format("%H").to_string() != "10");

        assert_eq!(set.len(), 2);
        assert!(set.get(1).is_none());
        assert_eq!(set.get(2).unwrap().start().format("%H").to_string(), "11");

        set.compact();
        assert_eq!(set.get(1).unwrap().start().format("%H").to_string(), "11");
    }

    #[test]
    fn iterator_skips_gaps_from_both_ends() {
        let mut set = SlotSet::new();
        set.set(1, slot("2024-03-01T09:00:00Z", "2024-03-01T10:00:00Z"));
        set.set(3, slot("2024-03-01T11:00:00Z", "2024-03-01T12:00:00Z"));

        assert_eq!(set.iter().count(), 2);
        let last = set.iter().next_back().unwrap();
        assert_eq!(last.start().format("%H").to_string(), "11");
    }

    #[test]
    fn set_accepts_any_position_without_dense_storage() {
        let mut set = SlotSet::new();
        set.set(1 << 40, slot("2024-03-01T09:00:00Z", "2024-03-01T10:00:00Z"));
        set.set(usize::MAX, slot("2024-03-01T10:00:00Z", "2024-03-01T11:00:00Z"));

        assert_eq!(set.len(), 2);
        assert!(set.get(0).is_none());
        assert!(set.contains_index(1 << 40));
        assert!(set.contains_index(usize::MAX));
    }

    #[test]
    fn push_after_highest_position_compacts() {
        let mut set = SlotSet::new();
        set.set(usize::MAX, slot("2024-03-01T09:00:00Z", "2024-03-01T10:00:00Z"));

        let index = set.push(slot("2024-03-01T10:00:00Z", "2024-03-01T11:00:00Z"));
        assert_eq!(index, 1);
        assert_eq!(set.iter_indexed().map(|(i, _)| i).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn equality_takes_gap_layout_into_account() {
        let first = slot("2024-03-01T09:00:00Z", "2024-03-01T10:00:00Z");
        let second = slot("2024-03-01T10:00:00Z", "2024-03-01T11:00:00Z");
        let dense = SlotSet::from_slots([first.clone(), second.clone()]);
        let mut sparse = SlotSet::new();
        sparse.set(0, first);
        sparse.set(2, second);

        assert_ne!(dense, sparse);
        sparse.compact();
        assert_eq!(dense, sparse);
    }
}
