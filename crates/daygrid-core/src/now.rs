//! The "current time" marker of timed views.
//!
//! The caller owns the clock and the refresh cadence; everything here is a
//! pure function of the `now` it is handed.

use chrono::{
  NaiveDate,
  NaiveDateTime
};

use crate::dates::same_day;
use crate::time_fraction::{
  from_date_time,
  to_percent
};

/// Fractional hour of `now`.
#[must_use]
pub fn position(
  now: NaiveDateTime
) -> f64 {
  from_date_time(now)
}

/// Marker position for `column`, present only when it is today's column.
#[must_use]
pub fn position_for_column(
  column: NaiveDate,
  now: NaiveDateTime
) -> Option<f64> {
  same_day(column, now)
    .then(|| position(now))
}

/// Marker offset on the 0-100 column axis.
#[must_use]
pub fn position_percent(
  now: NaiveDateTime
) -> f64 {
  to_percent(position(now))
}

/// Index of today's column, if the view shows it.
#[must_use]
pub fn today_index(
  columns: &[NaiveDate],
  now: NaiveDateTime
) -> Option<usize> {
  columns
    .iter()
    .position(|column| {
      same_day(*column, now)
    })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ymd(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  #[test]
  fn position_is_fractional_hour() {
    let now = ymd(2024, 1, 2)
      .and_hms_opt(13, 45, 30)
      .expect("valid time");
    assert_eq!(position(now), 13.75);
    assert_eq!(
      position_percent(now),
      13.75 / 24.0 * 100.0
    );
  }

  #[test]
  fn only_todays_column_gets_marker() {
    let now = ymd(2024, 1, 3)
      .and_hms_opt(8, 30, 0)
      .expect("valid time");
    let columns = (1..=7)
      .map(|d| ymd(2024, 1, d))
      .collect::<Vec<_>>();

    let marked = columns
      .iter()
      .filter_map(|c| {
        position_for_column(*c, now)
      })
      .collect::<Vec<_>>();
    assert_eq!(marked, vec![8.5]);
    assert_eq!(
      today_index(&columns, now),
      Some(2)
    );
  }

  #[test]
  fn no_marker_outside_visible_period() {
    let now = ymd(2024, 1, 13)
      .and_hms_opt(0, 0, 0)
      .expect("valid time");
    let columns = (1..=5)
      .map(|d| ymd(2024, 1, d))
      .collect::<Vec<_>>();
    assert_eq!(today_index(&columns, now), None);
    assert!(columns.iter().all(|c| {
      position_for_column(*c, now).is_none()
    }));
  }
}
