use std::fs::OpenOptions;
use std::io::Write;

use chrono::{NaiveDate, NaiveDateTime, Weekday};
use daygrid_core::continuation::Continuation;
use daygrid_core::error::StoreError;
use daygrid_core::event::{EventDraft, EventPatch};
use daygrid_core::layout::layout_view;
use daygrid_core::position::Placement;
use daygrid_core::store::{EventSource, FileEventStore};
use daygrid_core::view::{ViewDescriptor, ViewKind};
use tempfile::tempdir;

const EPSILON: f64 = 1e-9;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
    date.and_hms_opt(h, m, 0).expect("valid time")
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {expected}, got {actual}"
    );
}

fn seeded_store(dir: &std::path::Path) -> FileEventStore {
    let mut store = FileEventStore::open(dir).expect("open store");

    store
        .create_event(EventDraft::new(
            "Standup",
            at(ymd(2024, 1, 2), 9, 0),
            at(ymd(2024, 1, 2), 10, 30),
        ))
        .expect("create standup");
    store
        .create_event(EventDraft::new(
            "Conference",
            at(ymd(2024, 1, 3), 18, 0),
            at(ymd(2024, 1, 5), 12, 0),
        ))
        .expect("create conference");

    let mut holiday = EventDraft::new(
        "Holiday",
        at(ymd(2024, 1, 6), 0, 0),
        at(ymd(2024, 1, 6), 0, 0),
    );
    holiday.all_day = true;
    store.create_event(holiday).expect("create holiday");

    store
}

#[test]
fn week_view_places_stored_events() {
    let temp = tempdir().expect("tempdir");
    let store = seeded_store(temp.path());
    let events = store.fetch_events().expect("fetch events");
    assert_eq!(events.len(), 3);

    let view = ViewDescriptor::new(ViewKind::Week, ymd(2024, 1, 4));
    let now = at(ymd(2024, 1, 3), 12, 0);
    let layout = layout_view(&events, &view, now);

    assert!(layout.errors.is_empty());
    let columns = layout.columns();
    assert_eq!(columns.len(), 7);
    assert_eq!(columns[0].date, ymd(2024, 1, 1));
    assert!(columns[0].slots.is_empty());

    let standup = &columns[1].slots[0];
    assert_eq!(standup.event.title, "Standup");
    assert_eq!(standup.continuation, Continuation::Single);
    assert_close(standup.top(), 37.5);
    assert_close(standup.height(), 6.25);

    let first = &columns[2].slots[0];
    assert_eq!(first.continuation, Continuation::First);
    assert!(first.shows_label());
    assert_close(first.top(), 75.0);
    assert_close(first.height(), 25.0);

    let middle = &columns[3].slots[0];
    assert_eq!(middle.continuation, Continuation::Middle);
    assert!(!middle.shows_label());
    assert_eq!(middle.placement, Placement::FULL);

    let last = &columns[4].slots[0];
    assert_eq!(last.continuation, Continuation::Last);
    assert_close(last.top(), 0.0);
    assert_close(last.height(), 50.0);

    let holiday = &columns[5].slots[0];
    assert_eq!(holiday.event.title, "Holiday");
    assert_eq!(holiday.placement, Placement::FULL);
    assert!(columns[6].slots.is_empty());

    let marked = columns
        .iter()
        .filter(|column| column.now_position.is_some())
        .map(|column| column.date)
        .collect::<Vec<_>>();
    assert_eq!(marked, vec![ymd(2024, 1, 3)]);
    assert!(columns[2].is_today);
    assert_close(columns[2].now_position.unwrap_or_default(), 12.0);
}

#[test]
fn work_week_skips_weekend_events() {
    let temp = tempdir().expect("tempdir");
    let store = seeded_store(temp.path());
    let events = store.fetch_events().expect("fetch events");

    let view = ViewDescriptor::new(ViewKind::WorkWeek, ymd(2024, 1, 6));
    let layout = layout_view(&events, &view, at(ymd(2024, 2, 1), 8, 0));

    assert_eq!(layout.columns().len(), 5);
    assert!(layout.slots().all(|slot| slot.event.title != "Holiday"));
    assert_eq!(layout.slots().count(), 4);
    assert!(layout.columns().iter().all(|column| column.now_position.is_none()));
}

#[test]
fn malformed_clock_is_reported_without_aborting_the_pass() {
    let temp = tempdir().expect("tempdir");
    let store = seeded_store(temp.path());

    let mut file = OpenOptions::new()
        .append(true)
        .open(&store.events_path)
        .expect("open events file");
    writeln!(
        file,
        r#"{{"_id":"broken","title":"Bad clock","startDate":"2024-01-04","endDate":"2024-01-04","startTime":"25:00","endTime":""}}"#
    )
    .expect("append raw event");

    let events = store.fetch_events().expect("fetch events");
    assert_eq!(events.len(), 4);
    assert_eq!(events[3].end_time, None);

    let view = ViewDescriptor::new(ViewKind::Day, ymd(2024, 1, 4));
    let layout = layout_view(&events, &view, at(ymd(2024, 1, 4), 9, 0));

    assert_eq!(layout.errors.len(), 1);
    assert_eq!(layout.errors[0].event_id, "broken");
    assert_eq!(layout.errors[0].column_date, ymd(2024, 1, 4));

    let titles = layout.slots().map(|slot| slot.event.title.as_str()).collect::<Vec<_>>();
    assert_eq!(titles, vec!["Conference"]);
}

#[test]
fn month_view_fills_padded_grid() {
    let temp = tempdir().expect("tempdir");
    let mut store = FileEventStore::open(temp.path()).expect("open store");
    store
        .create_event(EventDraft::new(
            "Offsite",
            at(ymd(2024, 1, 31), 9, 0),
            at(ymd(2024, 2, 2), 17, 0),
        ))
        .expect("create offsite");
    let events = store.fetch_events().expect("fetch events");

    let view = ViewDescriptor::new(ViewKind::Month, ymd(2024, 2, 14));
    let layout = layout_view(&events, &view, at(ymd(2024, 2, 1), 10, 0));
    let cells = layout.cells();

    assert_eq!(cells.len(), 42);
    assert_eq!(cells[0].cell.date, ymd(2024, 1, 29));
    assert_eq!(cells[41].cell.date, ymd(2024, 3, 10));
    assert!(layout.columns().is_empty());

    let busy = cells
        .iter()
        .enumerate()
        .filter(|(_, cell)| !cell.slots.is_empty())
        .map(|(idx, _)| idx)
        .collect::<Vec<_>>();
    assert_eq!(busy, vec![2, 3, 4]);
    assert!(!cells[2].cell.in_anchor_period);
    assert!(cells[3].cell.in_anchor_period);
    assert!(cells[3].is_today);
    assert_eq!(cells[3].slots[0].continuation, Continuation::Middle);

    let sunday_view = view.with_week_start(Weekday::Sun);
    let sunday = layout_view(&events, &sunday_view, at(ymd(2024, 2, 1), 10, 0));
    assert_eq!(sunday.cells()[0].cell.date, ymd(2024, 1, 28));
    assert_eq!(sunday.cells().len(), 42);
}

#[test]
fn edits_resolve_id_prefixes() {
    let temp = tempdir().expect("tempdir");
    let mut store = seeded_store(temp.path());
    let events = store.fetch_events().expect("fetch events");
    let standup_id = events
        .iter()
        .find(|e| e.title == "Standup")
        .map(|e| e.id.clone())
        .expect("standup stored");

    let patch = EventPatch {
        title: Some("Daily standup".to_string()),
        location: Some(Some("Room 2".to_string())),
        ..EventPatch::default()
    };
    let updated = store
        .update_event(&standup_id[..8], patch)
        .expect("update by prefix");
    assert_eq!(updated.id, standup_id);
    assert_eq!(updated.title, "Daily standup");
    assert_eq!(updated.location.as_deref(), Some("Room 2"));

    let bad_range = EventPatch {
        end_date: Some(at(ymd(2023, 12, 31), 9, 0)),
        ..EventPatch::default()
    };
    assert!(store.update_event(&standup_id, bad_range).is_err());

    store.delete_event(&standup_id).expect("delete");
    let remaining = store.fetch_events().expect("fetch events");
    assert_eq!(remaining.len(), 2);

    let err = store
        .delete_event(&standup_id)
        .expect_err("deleting twice should fail");
    assert_eq!(
        err.downcast_ref::<StoreError>(),
        Some(&StoreError::NotFound(standup_id.clone()))
    );
}
