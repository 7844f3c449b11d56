//! Fixed and aligned grid generators.

use crate::model::slot::{Instant, Payload, Slot};
use crate::set::slot_set::SlotSet;
use chrono::Duration;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type GridResult<T> = Result<T, GridError>;

/// Invalid-argument and arithmetic errors raised while building a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    NonPositiveDuration(Duration),
    NonPositiveAlignment(Duration),
    /// A slot boundary past `at` is not representable.
    Overflow {
        at: Instant,
    },
    /// Configured duration string is not an ISO-8601 duration.
    InvalidDuration(String),
}

impl Display for GridError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveDuration(value) => {
                write!(f, "slot duration must be positive, got {value}")
            }
            Self::NonPositiveAlignment(value) => {
                write!(f, "grid alignment must be positive, got {value}")
            }
            Self::Overflow { at } => write!(f, "grid boundary overflows after {at}"),
            Self::InvalidDuration(value) => write!(f, "invalid ISO-8601 duration `{value}`"),
        }
    }
}

impl Error for GridError {}

/// Partitions `[period_start, period_end)` into back-to-back slots of
/// `duration`.
///
/// The last slot keeps its full length even when it ends past `period_end`.
///
/// # Errors
/// - `GridError::NonPositiveDuration` when `duration <= 0`.
pub fn make_grid(
    period_start: Instant,
    period_end: Instant,
    duration: Duration,
) -> GridResult<SlotSet> {
    make_aligned_grid(period_start, period_end, duration, duration)
}

/// Builds slots of `duration` starting every `alignment` from `period_start`
/// while the start stays before `period_end`.
///
/// `duration > alignment` yields overlapping slots and `duration < alignment`
/// leaves gaps between them.
///
/// # Errors
/// - `GridError::NonPositiveDuration` when `duration <= 0`.
/// - `GridError::NonPositiveAlignment` when `alignment <= 0`.
/// - `GridError::Overflow` when a boundary leaves the instant range.
pub fn make_aligned_grid(
    period_start: Instant,
    period_end: Instant,
    duration: Duration,
    alignment: Duration,
) -> GridResult<SlotSet> {
    if duration <= Duration::zero() {
        return Err(GridError::NonPositiveDuration(duration));
    }
    if alignment <= Duration::zero() {
        return Err(GridError::NonPositiveAlignment(alignment));
    }

    let mut grid = SlotSet::new();
    let mut start = period_start;
    while start < period_end {
        let end = start
            .checked_add_signed(duration)
            .ok_or(GridError::Overflow { at: start })?;
        grid.push(Slot::new(start, end, Payload::new()));
        start = start
            .checked_add_signed(alignment)
            .ok_or(GridError::Overflow { at: start })?;
    }

    debug!(
        "event=grid_build module=grid status=ok duration_s={} alignment_s={} slots={}",
        duration.num_seconds(),
        alignment.num_seconds(),
        grid.len()
    );
    Ok(grid)
}
