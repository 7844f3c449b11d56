//! Slot domain model.
//!
//! # Responsibility
//! - Define the half-open `[start, end)` interval used by all set algebra.
//! - Normalize every supported input form into one canonical instant type.
//! - Render slots as records (`start`/`end` ISO-8601 strings plus payload).
//!
//! # Invariants
//! - `start <= end` is not enforced at construction; every algorithm reads
//!   slots through `Slot::intersects` only.
//! - Payload is attached at construction and is never rewritten by set
//!   operations.
//! - Timezones are always explicit: naive values require a caller-provided
//!   `TimeZone`, epoch values require a caller-provided offset.

use crate::model::record::{self, Record, END_KEY, START_KEY};
use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDateTime, SecondsFormat, TimeZone, Utc,
};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Canonical instant type carried by every slot.
///
/// Equality and ordering compare the absolute point in time; the offset is
/// kept only for rendering.
pub type Instant = DateTime<FixedOffset>;

/// Open key/value data attached to a slot or a slot set.
pub type Payload = Map<String, Value>;

pub type SlotResult<T> = Result<T, SlotError>;

/// Construction error for slots built from external time representations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    /// Epoch seconds cannot be represented by the instant type.
    TimestampOutOfRange(i64),
    /// Wall-clock value maps to two instants in the supplied timezone.
    AmbiguousLocalTime(NaiveDateTime),
    /// Wall-clock value does not exist in the supplied timezone.
    NonexistentLocalTime(NaiveDateTime),
    /// ISO-8601 input rejected by the date/time parser.
    Parse {
        input: String,
        source: chrono::ParseError,
    },
    MissingField(&'static str),
    InvalidField {
        field: &'static str,
        message: String,
    },
}

impl Display for SlotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimestampOutOfRange(value) => {
                write!(f, "timestamp {value} is out of the supported range")
            }
            Self::AmbiguousLocalTime(value) => {
                write!(f, "local time {value} is ambiguous in the given timezone")
            }
            Self::NonexistentLocalTime(value) => {
                write!(f, "local time {value} does not exist in the given timezone")
            }
            Self::Parse { input, source } => write!(f, "invalid instant `{input}`: {source}"),
            Self::MissingField(field) => write!(f, "record is missing `{field}`"),
            Self::InvalidField { field, message } => {
                write!(f, "record field `{field}` is invalid: {message}")
            }
        }
    }
}

impl Error for SlotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse { source, .. } => Some(source),
            Self::TimestampOutOfRange(_)
            | Self::AmbiguousLocalTime(_)
            | Self::NonexistentLocalTime(_)
            | Self::MissingField(_)
            | Self::InvalidField { .. } => None,
        }
    }
}

/// Half-open time interval `[start, end)` with attached payload.
///
/// Two slots are equal when `start`, `end` and `payload` are equal; this is
/// the equality used for duplicate removal.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    start: Instant,
    end: Instant,
    payload: Payload,
}

impl Slot {
    /// Creates a slot from canonical instants.
    ///
    /// All other factories normalize their input and delegate here.
    pub fn new(start: Instant, end: Instant, payload: Payload) -> Self {
        Self {
            start,
            end,
            payload,
        }
    }

    /// Creates a slot from unix epoch seconds rendered at `offset`.
    ///
    /// # Errors
    /// - `SlotError::TimestampOutOfRange` when either value cannot be
    ///   represented.
    pub fn from_timestamps(
        start: i64,
        end: i64,
        offset: FixedOffset,
        payload: Payload,
    ) -> SlotResult<Self> {
        let start = instant_from_timestamp(start, &offset)?;
        let end = instant_from_timestamp(end, &offset)?;
        Ok(Self::new(start, end, payload))
    }

    /// Creates a slot from datetimes in any timezone.
    ///
    /// The offset in effect at each instant is kept for rendering.
    pub fn from_datetimes<Tz: TimeZone>(
        start: &DateTime<Tz>,
        end: &DateTime<Tz>,
        payload: Payload,
    ) -> Self {
        Self::new(start.fixed_offset(), end.fixed_offset(), payload)
    }

    /// Creates a slot from wall-clock values interpreted in `tz`.
    ///
    /// # Errors
    /// - `SlotError::AmbiguousLocalTime` / `SlotError::NonexistentLocalTime`
    ///   when a value falls into a timezone transition.
    pub fn from_naive<Tz: TimeZone>(
        start: NaiveDateTime,
        end: NaiveDateTime,
        tz: &Tz,
        payload: Payload,
    ) -> SlotResult<Self> {
        let start = instant_from_local(start, tz)?;
        let end = instant_from_local(end, tz)?;
        Ok(Self::new(start, end, payload))
    }

    /// Creates a slot from two RFC 3339 / ISO-8601 strings.
    ///
    /// # Errors
    /// - `SlotError::Parse` carrying the parser error unchanged.
    pub fn parse_rfc3339(start: &str, end: &str, payload: Payload) -> SlotResult<Self> {
        let start = parse_instant(start)?;
        let end = parse_instant(end)?;
        Ok(Self::new(start, end, payload))
    }

    /// Rebuilds a slot from its record form.
    ///
    /// `start`/`end` must be ISO-8601 strings; every other key becomes payload.
    pub fn from_record(mut record: Record) -> SlotResult<Self> {
        let start = record::take_instant(&mut record, START_KEY)?;
        let end = record::take_instant(&mut record, END_KEY)?;
        Ok(Self::new(start, end, record))
    }

    /// Returns a copy of this slot carrying `payload` instead.
    pub fn with_payload(self, payload: Payload) -> Self {
        Self { payload, ..self }
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn end(&self) -> Instant {
        self.end
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Length of the slot; negative for reversed slots.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks whether `other` overlaps this slot.
    ///
    /// Adjacent slots (`self.end == other.start`) do not intersect. A
    /// zero-length slot intersects any slot containing its instant, including
    /// a slot that merely starts or ends there.
    pub fn intersects(&self, other: &Slot) -> bool {
        // other crosses our start
        (other.start <= self.start && other.end > self.start)
            // other crosses our end
            || (other.start < self.end && other.end >= self.end)
            // other covers us
            || (other.start <= self.start && other.end >= self.end)
            // we contain other
            || (other.start >= self.start && other.end <= self.end)
    }

    /// Returns payload merged with ISO-8601 `start`/`end` strings.
    ///
    /// Reserved keys overwrite payload keys of the same name.
    pub fn to_record(&self) -> Record {
        let mut record = self.payload.clone();
        record.insert(START_KEY.to_string(), Value::String(format_instant(&self.start)));
        record.insert(END_KEY.to_string(), Value::String(format_instant(&self.end)));
        record
    }
}

/// Renders `start` normalized to UTC.
impl Display for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_instant(&self.start.with_timezone(&Utc)))
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_record().serialize(serializer)
    }
}

/// Formats an instant as ISO-8601 with whole seconds and a numeric offset
/// (`+00:00` for UTC).
pub fn format_instant<Tz: TimeZone>(instant: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    instant.to_rfc3339_opts(SecondsFormat::Secs, false)
}

pub(crate) fn parse_instant(value: &str) -> SlotResult<Instant> {
    DateTime::parse_from_rfc3339(value.trim()).map_err(|source| SlotError::Parse {
        input: value.to_string(),
        source,
    })
}

fn instant_from_timestamp(secs: i64, offset: &FixedOffset) -> SlotResult<Instant> {
    match offset.timestamp_opt(secs, 0) {
        LocalResult::Single(value) => Ok(value),
        _ => Err(SlotError::TimestampOutOfRange(secs)),
    }
}

fn instant_from_local<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> SlotResult<Instant> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(value) => Ok(value.fixed_offset()),
        LocalResult::Ambiguous(_, _) => Err(SlotError::AmbiguousLocalTime(naive)),
        LocalResult::None => Err(SlotError::NonexistentLocalTime(naive)),
    }
}
