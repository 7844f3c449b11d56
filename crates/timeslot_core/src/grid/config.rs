//! Grid configuration with ISO-8601 duration strings.
//!
//! # Responsibility
//! - Accept grid parameters from serialized settings (`PT30M`, `PT1H15M`).
//! - Convert them into generator calls.
//!
//! # Invariants
//! - Only day/hour/minute/second components are accepted; calendar units
//!   (years, months, weeks) have no fixed length and are rejected.

use crate::grid::generator::{make_aligned_grid, GridError, GridResult};
use crate::model::slot::Instant;
use crate::set::slot_set::SlotSet;
use chrono::Duration;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static ISO_DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
        .expect("valid duration regex")
});

const UNIT_SECONDS: [i64; 4] = [86_400, 3_600, 60, 1];

/// Grid parameters as stored in settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Length of every slot, e.g. `PT30M`.
    pub slot_duration: String,
    /// Stride between slot starts; defaults to `slot_duration`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,
}

impl GridConfig {
    pub fn new(slot_duration: impl Into<String>) -> Self {
        Self {
            slot_duration: slot_duration.into(),
            alignment: None,
        }
    }

    pub fn aligned(mut self, alignment: impl Into<String>) -> Self {
        self.alignment = Some(alignment.into());
        self
    }

    pub fn slot_duration(&self) -> GridResult<Duration> {
        parse_iso_duration(&self.slot_duration)
    }

    /// Effective stride: configured alignment or the slot duration.
    pub fn alignment(&self) -> GridResult<Duration> {
        match self.alignment.as_deref() {
            Some(value) => parse_iso_duration(value),
            None => self.slot_duration(),
        }
    }

    /// Builds the configured grid over `[period_start, period_end)`.
    pub fn build(&self, period_start: Instant, period_end: Instant) -> GridResult<SlotSet> {
        make_aligned_grid(
            period_start,
            period_end,
            self.slot_duration()?,
            self.alignment()?,
        )
    }
}

/// Parses an ISO-8601 duration such as `PT45M` or `P1DT2H`.
///
/// # Errors
/// - `GridError::InvalidDuration` for unsupported syntax, empty durations
///   (`P`, `PT`) and values overflowing the duration range.
pub fn parse_iso_duration(value: &str) -> GridResult<Duration> {
    let normalized = value.trim().to_ascii_uppercase();
    let invalid = || GridError::InvalidDuration(value.to_string());

    if normalized.ends_with('P') || normalized.ends_with('T') {
        return Err(invalid());
    }
    let captures = ISO_DURATION_RE.captures(&normalized).ok_or_else(invalid)?;

    let mut total: i64 = 0;
    for (group, unit) in UNIT_SECONDS.iter().enumerate() {
        let Some(component) = captures.get(group + 1) else {
            continue;
        };
        let amount: i64 = component.as_str().parse().map_err(|_| invalid())?;
        total = amount
            .checked_mul(*unit)
            .and_then(|seconds| total.checked_add(seconds))
            .ok_or_else(invalid)?;
    }

    Duration::try_seconds(total).ok_or_else(invalid)
}
