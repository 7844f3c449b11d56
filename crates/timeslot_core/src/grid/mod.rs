//! Grid generation: partitioning a period into fixed-stride slots.
//!
//! # Responsibility
//! - Build slot sets from a period, a slot duration and an optional stride.
//! - Load grid parameters from serde-friendly configuration.
//!
//! # Invariants
//! - Non-positive durations and strides are rejected before any iteration.
//! - Grid slots carry an empty payload.

pub mod config;
pub mod generator;
