//! Record shape shared by slots and slot sets.
//!
//! A record is an open JSON object: payload keys plus the reserved `start` and
//! `end` keys holding ISO-8601 strings.

use crate::model::slot::{parse_instant, Instant, SlotError, SlotResult};
use serde_json::{Map, Value};

/// Reserved record key holding the slot start.
pub const START_KEY: &str = "start";
/// Reserved record key holding the slot end.
pub const END_KEY: &str = "end";

pub type Record = Map<String, Value>;

/// Writes every key of `top` over `base` and returns the result.
///
/// Keys present in both keep the value from `top`.
pub fn overlay(mut base: Record, top: &Record) -> Record {
    for (key, value) in top {
        base.insert(key.clone(), value.clone());
    }
    base
}

pub(crate) fn take_instant(record: &mut Record, field: &'static str) -> SlotResult<Instant> {
    match record.remove(field) {
        Some(Value::String(text)) => parse_instant(&text),
        Some(other) => Err(SlotError::InvalidField {
            field,
            message: format!("expected ISO-8601 string, got {other}"),
        }),
        None => Err(SlotError::MissingField(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::{overlay, take_instant, Record, START_KEY};
    use crate::model::slot::SlotError;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn overlay_prefers_top_keys() {
        let base = record(json!({"room": "A", "owner": "set"}));
        let top = record(json!({"owner": "slot", "seats": 4}));

        let merged = overlay(base, &top);
        assert_eq!(
            serde_json::Value::Object(merged),
            json!({"room": "A", "owner": "slot", "seats": 4})
        );
    }

    #[test]
    fn take_instant_reports_missing_and_mistyped_fields() {
        let mut empty = Record::new();
        assert_eq!(
            take_instant(&mut empty, START_KEY).unwrap_err(),
            SlotError::MissingField("start")
        );

        let mut numeric = record(json!({"start": 1_700_000_000}));
        let err = take_instant(&mut numeric, START_KEY).unwrap_err();
        assert!(matches!(err, SlotError::InvalidField { field: "start", .. }));
    }
}
