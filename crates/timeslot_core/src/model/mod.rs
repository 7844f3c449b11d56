//! Interval domain model.
//!
//! # Responsibility
//! - Define the `Slot` value and its record (serialized) shape.
//!
//! # Invariants
//! - Every slot carries canonical `Instant` values regardless of input form.
//! - Records always expose `start`/`end` as ISO-8601 strings.

pub mod record;
pub mod slot;
