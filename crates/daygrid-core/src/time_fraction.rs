//! Clock time to fractional-hour conversion.
//!
//! A fractional hour is `hour + minute / 60`, always within `[0, 24)` for
//! valid inputs. Seconds are ignored.

use std::sync::OnceLock;

use chrono::{
  NaiveDateTime,
  Timelike
};
use regex::Regex;

use crate::error::LayoutError;

pub const HOURS_PER_DAY: f64 = 24.0;

fn clock_regex() -> Option<&'static Regex>
{
  static CLOCK_RE: OnceLock<
    Option<Regex>
  > = OnceLock::new();
  CLOCK_RE
    .get_or_init(|| {
      match Regex::new(
        r"^(?P<hour>\d{1,2}):(?P<minute>\d{2})$"
      ) {
        | Ok(re) => Some(re),
        | Err(err) => {
          tracing::error!(
            error = %err,
            "clock regex failed to compile"
          );
          None
        }
      }
    })
    .as_ref()
}

/// Parses `"HH:MM"` into a fractional hour.
///
/// Accepts one or two hour digits and exactly two minute digits, with the
/// hour in `0..=23` and the minute in `0..=59`.
pub fn from_clock(
  hhmm: &str
) -> Result<f64, LayoutError> {
  let (hour, minute) =
    parse_clock(hhmm).ok_or_else(
      || LayoutError::malformed(hhmm)
    )?;
  Ok(
    f64::from(hour)
      + f64::from(minute) / 60.0
  )
}

/// Splits a valid `"HH:MM"` string into its hour and minute.
#[must_use]
pub fn parse_clock(
  hhmm: &str
) -> Option<(u32, u32)> {
  let captures =
    clock_regex()?.captures(hhmm)?;
  let hour = captures
    .name("hour")?
    .as_str()
    .parse::<u32>()
    .ok()?;
  let minute = captures
    .name("minute")?
    .as_str()
    .parse::<u32>()
    .ok()?;
  if hour > 23 || minute > 59 {
    return None;
  }
  Some((hour, minute))
}

/// Fractional hour of the wall-clock time embedded in `value`.
#[must_use]
pub fn from_date_time(
  value: NaiveDateTime
) -> f64 {
  f64::from(value.hour())
    + f64::from(value.minute()) / 60.0
}

/// Maps a fractional hour onto the 0-100 axis of a day column.
#[must_use]
pub fn to_percent(hours: f64) -> f64 {
  hours / HOURS_PER_DAY * 100.0
}
