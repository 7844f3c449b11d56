//! Set algebra over ordered slot collections.
//!
//! # Responsibility
//! - Provide subtract/intersect/merge over any ordered sequence of slots.
//! - Provide the `SlotSet` container that applies them in place.
//!
//! # Invariants
//! - Every operation preserves the relative order of surviving slots.
//! - Overlap is decided by `Slot::intersects` with the target slot as receiver.

pub mod ops;
pub mod slot_set;
