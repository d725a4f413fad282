//! Calendar-day primitives.
//!
//! Everything here works at day granularity: a date-time is reduced to the
//! local calendar date it falls on and the time of day is discarded.

use chrono::{
  Datelike,
  Duration,
  NaiveDate,
  NaiveDateTime,
  Weekday
};

/// Anything that falls on a single local calendar day.
pub trait CalendarDay {
  fn calendar_day(&self) -> NaiveDate;
}

impl CalendarDay for NaiveDate {
  fn calendar_day(&self) -> NaiveDate {
    *self
  }
}

impl CalendarDay for NaiveDateTime {
  fn calendar_day(&self) -> NaiveDate {
    self.date()
  }
}

impl<T: CalendarDay + ?Sized> CalendarDay
  for &T
{
  fn calendar_day(&self) -> NaiveDate {
    (**self).calendar_day()
  }
}

/// Strips the time of day, returning the date at local midnight.
#[must_use]
pub fn normalize(
  value: impl CalendarDay
) -> NaiveDate {
  value.calendar_day()
}

#[must_use]
pub fn same_day(
  a: impl CalendarDay,
  b: impl CalendarDay
) -> bool {
  normalize(a) == normalize(b)
}

/// Signed number of days from `a` to `b`.
#[must_use]
pub fn days_between(
  a: impl CalendarDay,
  b: impl CalendarDay
) -> i64 {
  normalize(b)
    .signed_duration_since(normalize(a))
    .num_days()
}

/// `date` moved by `days`, or `None` past the representable range.
#[must_use]
pub fn checked_add_days(
  date: NaiveDate,
  days: i64
) -> Option<NaiveDate> {
  date.checked_add_signed(
    Duration::try_days(days)?
  )
}

/// Saturating form of [`checked_add_days`] for the grid arithmetic, whose
/// offsets stay within a few weeks of a valid date.
#[must_use]
pub fn add_days(
  date: NaiveDate,
  days: i64
) -> NaiveDate {
  checked_add_days(date, days)
    .unwrap_or(date)
}

/// First day of the week containing `day`.
#[must_use]
pub fn start_of_week(
  day: NaiveDate,
  week_start: Weekday
) -> NaiveDate {
  let day_idx = day
    .weekday()
    .num_days_from_monday()
    as i64;
  let start_idx = week_start
    .num_days_from_monday()
    as i64;
  let diff =
    (7 + day_idx - start_idx) % 7;
  add_days(day, -diff)
}

#[must_use]
pub fn first_day_of_month(
  year: i32,
  month: u32
) -> Option<NaiveDate> {
  NaiveDate::from_ymd_opt(
    year, month, 1
  )
}

#[must_use]
pub fn last_day_of_month(
  year: i32,
  month: u32
) -> Option<NaiveDate> {
  first_day_of_month(year, month)?;
  let (next_year, next_month) =
    if month >= 12 {
      (year.checked_add(1)?, 1_u32)
    } else {
      (year, month + 1)
    };
  first_day_of_month(
    next_year, next_month
  )?
  .pred_opt()
}

#[must_use]
pub fn days_in_month(
  year: i32,
  month: u32
) -> u32 {
  last_day_of_month(year, month)
    .map(|day| day.day())
    .unwrap_or(0)
}

/// Moves `date` by whole months, clamping the day to the target month's
/// length (Jan 31 + 1 month is Feb 28/29). `None` past the representable
/// range.
#[must_use]
pub fn checked_shift_months(
  date: NaiveDate,
  months: i32
) -> Option<NaiveDate> {
  let total = date.year() as i64 * 12
    + date.month0() as i64
    + months as i64;
  let year =
    i32::try_from(total.div_euclid(12))
      .ok()?;
  let month =
    total.rem_euclid(12) as u32 + 1;

  let day = date
    .day()
    .min(days_in_month(year, month));
  NaiveDate::from_ymd_opt(
    year, month, day
  )
}

/// Saturating form of [`checked_shift_months`] used for view navigation.
#[must_use]
pub fn shift_months(
  date: NaiveDate,
  months: i32
) -> NaiveDate {
  checked_shift_months(date, months)
    .unwrap_or(date)
}
