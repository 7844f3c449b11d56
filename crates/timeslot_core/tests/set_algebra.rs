use serde_json::{json, Map};
use timeslot_core::set::ops::{intersect, intersects_any, merge, subtract};
use timeslot_core::Slot;

fn slot(start: &str, end: &str) -> Slot {
    Slot::parse_rfc3339(
        &format!("2024-03-01T{start}:00Z"),
        &format!("2024-03-01T{end}:00Z"),
        Map::new(),
    )
    .unwrap()
}

fn labels(slots: &[Slot]) -> Vec<String> {
    slots
        .iter()
        .map(|slot| format!("{}-{}", slot.start().format("%H:%M"), slot.end().format("%H:%M")))
        .collect()
}

#[test]
fn subtract_with_empty_target_is_identity() {
    let source = vec![slot("09:00", "10:00"), slot("11:00", "12:00")];
    assert_eq!(subtract(&source, &[]), source);
}

#[test]
fn intersect_with_empty_target_is_empty() {
    let source = vec![slot("09:00", "10:00"), slot("11:00", "12:00")];
    assert!(intersect(&source, &[]).is_empty());
}

#[test]
fn subtract_removes_overlapping_and_keeps_adjacent() {
    let availability = vec![
        slot("09:00", "10:00"),
        slot("10:00", "11:00"),
        slot("11:00", "12:00"),
        slot("12:00", "13:00"),
    ];
    let bookings = vec![slot("10:30", "11:00"), slot("12:00", "12:15")];

    assert_eq!(
        labels(&subtract(&availability, &bookings)),
        vec!["09:00-10:00", "11:00-12:00"]
    );
}

#[test]
fn intersect_keeps_source_order() {
    let source = vec![
        slot("13:00", "14:00"),
        slot("09:00", "10:00"),
        slot("11:00", "12:00"),
    ];
    let target = vec![slot("09:30", "09:45"), slot("12:30", "13:30")];

    assert_eq!(
        labels(&intersect(&source, &target)),
        vec!["13:00-14:00", "09:00-10:00"]
    );
}

#[test]
fn merge_with_cut_lets_target_win() {
    let source = vec![slot("09:00", "10:00")];
    let target = vec![slot("09:30", "10:30")];

    assert_eq!(labels(&merge(&source, &target, true)), vec!["09:30-10:30"]);
}

#[test]
fn merge_without_cut_keeps_both_source_first() {
    let source = vec![slot("09:00", "10:00")];
    let target = vec![slot("09:30", "10:30")];

    assert_eq!(
        labels(&merge(&source, &target, false)),
        vec!["09:00-10:00", "09:30-10:30"]
    );
}

#[test]
fn merge_appends_target_after_surviving_source() {
    let source = vec![
        slot("08:00", "09:00"),
        slot("09:00", "10:00"),
        slot("10:00", "11:00"),
    ];
    let mut booked = slot("09:15", "09:45");
    booked = booked.with_payload(json!({"who": "ana"}).as_object().cloned().unwrap());
    let target = vec![booked];

    let merged = merge(&source, &target, true);
    assert_eq!(
        labels(&merged),
        vec!["08:00-09:00", "10:00-11:00", "09:15-09:45"]
    );
    assert_eq!(merged[2].payload()["who"], "ana");
}

#[test]
fn intersects_any_uses_every_target() {
    let probe = slot("10:00", "11:00");
    let target = [slot("08:00", "09:00"), slot("10:59", "11:30")];

    assert!(intersects_any(&probe, &target));
    assert!(!intersects_any(&probe, &target[..1]));
}
