//! Bulk set operations over slot sequences.
//!
//! All operations are `O(|source| * |target|)` and clone surviving slots into
//! a fresh vector. Inputs are any iterables of `&Slot`, so slices, vectors and
//! `&SlotSet` can be mixed freely.

use crate::model::slot::Slot;

/// Returns whether any slot in `target` intersects `slot`.
pub fn intersects_any<'t, T>(slot: &Slot, target: T) -> bool
where
    T: IntoIterator<Item = &'t Slot>,
{
    target.into_iter().any(|item| item.intersects(slot))
}

/// Keeps source slots that intersect no target slot.
pub fn subtract<'s, 't, S, T>(source: S, target: T) -> Vec<Slot>
where
    S: IntoIterator<Item = &'s Slot>,
    T: IntoIterator<Item = &'t Slot> + Clone,
{
    source
        .into_iter()
        .filter(|slot| !intersects_any(slot, target.clone()))
        .cloned()
        .collect()
}

/// Keeps source slots that intersect at least one target slot.
pub fn intersect<'s, 't, S, T>(source: S, target: T) -> Vec<Slot>
where
    S: IntoIterator<Item = &'s Slot>,
    T: IntoIterator<Item = &'t Slot> + Clone,
{
    source
        .into_iter()
        .filter(|slot| intersects_any(slot, target.clone()))
        .cloned()
        .collect()
}

/// Concatenates source and target, target last.
///
/// With `cut_intersections`, source slots overlapping any target slot are
/// dropped first, so target slots win. Without it, overlapping coverage is
/// kept as is.
pub fn merge<'s, 't, S, T>(source: S, target: T, cut_intersections: bool) -> Vec<Slot>
where
    S: IntoIterator<Item = &'s Slot>,
    T: IntoIterator<Item = &'t Slot> + Clone,
{
    let mut merged = if cut_intersections {
        subtract(source, target.clone())
    } else {
        source.into_iter().cloned().collect()
    };
    merged.extend(target.into_iter().cloned());
    merged
}
