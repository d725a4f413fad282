//! Vertical placement of an event inside a 24-hour day column.
//!
//! Each column is laid out on its own: the first day of a multi-day event
//! runs from its start time to midnight, middle days fill the column and the
//! last day runs from midnight to the end time.

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates::same_day;
use crate::error::LayoutError;
use crate::event::Event;
use crate::time_fraction::{
  HOURS_PER_DAY,
  to_percent
};

/// Top offset and height as percentages of the column.
#[derive(
  Debug, Clone, Copy, PartialEq, Serialize,
)]
pub struct Placement {
  pub top:    f64,
  pub height: f64
}

impl Placement {
  pub const FULL: Self = Self {
    top:    0.0,
    height: 100.0
  };

  pub fn bottom(&self) -> f64 {
    self.top + self.height
  }
}

/// Fractional hours an event occupies on one column, before clamping.
#[derive(
  Debug, Clone, Copy, PartialEq,
)]
pub struct HourSpan {
  pub start: f64,
  pub end:   f64
}

impl HourSpan {
  /// True when the end precedes the start on the same column.
  pub fn is_inverted(&self) -> bool {
    self.end < self.start
  }

  pub fn duration(&self) -> f64 {
    (self.end - self.start).max(0.0)
  }
}

/// Start and end hour of `event` on `column`, clipped to the column.
pub fn hour_span(
  event: &Event,
  column: NaiveDate
) -> Result<HourSpan, LayoutError> {
  if event.all_day {
    return Ok(HourSpan {
      start: 0.0,
      end:   HOURS_PER_DAY
    });
  }

  let start =
    if same_day(column, event.start_date)
    {
      event.start_hour()?
    } else {
      0.0
    };
  let end =
    if same_day(column, event.end_date) {
      event.end_hour()?
    } else {
      HOURS_PER_DAY
    };

  Ok(HourSpan {
    start,
    end
  })
}

/// Placement of `event` on `column`.
///
/// `column` must be a day the event is visible on. Inverted spans (end
/// before start on the same day) collapse to zero height at the start
/// position.
pub fn position(
  event: &Event,
  column: NaiveDate
) -> Result<Placement, LayoutError> {
  if event.all_day {
    return Ok(Placement::FULL);
  }

  let span = hour_span(event, column)?;
  Ok(Placement {
    top:    to_percent(span.start),
    height: to_percent(span.duration())
  })
}
