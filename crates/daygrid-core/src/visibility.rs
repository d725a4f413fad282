//! Which events show up on which days.
//!
//! Intervals are closed on both ends: an event ending on a date and another
//! starting on it are both visible on that date.

use chrono::NaiveDate;

use crate::dates::{
  CalendarDay,
  normalize
};
use crate::event::Event;

#[must_use]
pub fn visible_on(
  event: &Event,
  date: impl CalendarDay
) -> bool {
  let day = normalize(date);
  normalize(event.start_date) <= day
    && day <= normalize(event.end_date)
}

/// True when `[start_date, end_date]` intersects `[range_start, range_end]`.
#[must_use]
pub fn visible_in_range(
  event: &Event,
  range_start: impl CalendarDay,
  range_end: impl CalendarDay
) -> bool {
  normalize(event.start_date)
    <= normalize(range_end)
    && normalize(range_start)
      <= normalize(event.end_date)
}

/// Events visible on `date`, in input order.
pub fn events_on<'a>(
  events: &'a [Event],
  date: NaiveDate
) -> Vec<&'a Event> {
  events
    .iter()
    .filter(|event| visible_on(event, date))
    .collect()
}

/// Events intersecting the inclusive range, in input order.
pub fn events_in_range<'a>(
  events: &'a [Event],
  range_start: NaiveDate,
  range_end: NaiveDate
) -> Vec<&'a Event> {
  events
    .iter()
    .filter(|event| {
      visible_in_range(
        event,
        range_start,
        range_end
      )
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDateTime;

  use super::*;
  use crate::event::EventDraft;

  fn ymd(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  fn at(
    date: NaiveDate,
    h: u32
  ) -> NaiveDateTime {
    date
      .and_hms_opt(h, 0, 0)
      .expect("valid time")
  }

  fn event(
    id: &str,
    start: NaiveDateTime,
    end: NaiveDateTime
  ) -> Event {
    Event::from_draft(
      id.to_string(),
      EventDraft::new(id, start, end)
    )
  }

  #[test]
  fn single_day_event_visible_only_on_its_day()
  {
    let day = ymd(2024, 2, 29);
    let e = event(
      "a",
      at(day, 23),
      at(day, 23)
    );
    assert!(visible_on(&e, day));
    assert!(!visible_on(&e, ymd(2024, 2, 28)));
    assert!(!visible_on(&e, ymd(2024, 3, 1)));
  }

  #[test]
  fn date_time_argument_is_normalized() {
    let day = ymd(2024, 2, 29);
    let e =
      event("a", at(day, 9), at(day, 10));
    assert!(visible_on(&e, at(day, 23)));
  }

  #[test]
  fn closed_intervals_share_boundary_day() {
    let ending = event(
      "ending",
      at(ymd(2024, 1, 1), 9),
      at(ymd(2024, 1, 2), 8)
    );
    let starting = event(
      "starting",
      at(ymd(2024, 1, 2), 17),
      at(ymd(2024, 1, 3), 8)
    );
    let events = vec![ending, starting];

    let on_boundary =
      events_on(&events, ymd(2024, 1, 2));
    assert_eq!(on_boundary.len(), 2);
    assert_eq!(on_boundary[0].id, "ending");
    assert_eq!(
      on_boundary[1].id,
      "starting"
    );
  }

  #[test]
  fn range_intersection() {
    let e = event(
      "a",
      at(ymd(2024, 1, 5), 9),
      at(ymd(2024, 1, 10), 9)
    );
    assert!(visible_in_range(
      &e,
      ymd(2024, 1, 10),
      ymd(2024, 1, 20)
    ));
    assert!(visible_in_range(
      &e,
      ymd(2024, 1, 1),
      ymd(2024, 1, 5)
    ));
    assert!(visible_in_range(
      &e,
      ymd(2024, 1, 6),
      ymd(2024, 1, 7)
    ));
    assert!(!visible_in_range(
      &e,
      ymd(2024, 1, 11),
      ymd(2024, 1, 20)
    ));
    assert!(!visible_in_range(
      &e,
      ymd(2023, 12, 1),
      ymd(2024, 1, 4)
    ));
  }

  #[test]
  fn range_filter_keeps_input_order() {
    let events = vec![
      event(
        "late",
        at(ymd(2024, 1, 7), 9),
        at(ymd(2024, 1, 7), 10)
      ),
      event(
        "outside",
        at(ymd(2024, 1, 9), 9),
        at(ymd(2024, 1, 9), 10)
      ),
      event(
        "early",
        at(ymd(2024, 1, 1), 9),
        at(ymd(2024, 1, 1), 10)
      ),
    ];
    let ids = events_in_range(
      &events,
      ymd(2024, 1, 1),
      ymd(2024, 1, 7)
    )
    .into_iter()
    .map(|e| e.id.as_str())
    .collect::<Vec<_>>();
    assert_eq!(ids, vec!["late", "early"]);
  }
}
