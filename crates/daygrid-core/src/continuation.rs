//! Multi-day continuation of an event across day columns.

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates::same_day;
use crate::event::Event;

/// Which segment of an event a column shows.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Continuation {
  /// Starts and ends on this column.
  Single,
  /// First column of a multi-day event.
  First,
  /// Neither the first nor the last column.
  Middle,
  /// Last column of a multi-day event.
  Last
}

impl Continuation {
  /// Classifies `column` for an event already known to be visible on it.
  pub fn classify(
    event: &Event,
    column: NaiveDate
  ) -> Self {
    if !event.is_multi_day() {
      return Self::Single;
    }

    if same_day(column, event.start_date)
    {
      Self::First
    } else if same_day(
      column,
      event.end_date
    ) {
      Self::Last
    } else {
      Self::Middle
    }
  }

  pub fn is_first_day(self) -> bool {
    matches!(self, Self::Single | Self::First)
  }

  pub fn is_last_day(self) -> bool {
    matches!(self, Self::Single | Self::Last)
  }

  pub fn is_multi_day(self) -> bool {
    !matches!(self, Self::Single)
  }

  /// Title and time range are drawn on the first segment only.
  pub fn shows_label(self) -> bool {
    self.is_first_day()
  }

  /// Leading (left/top) edge keeps its rounding unless the event continues
  /// from the previous column.
  pub fn rounds_leading_edge(
    self
  ) -> bool {
    self.is_first_day()
  }

  pub fn rounds_trailing_edge(
    self
  ) -> bool {
    self.is_last_day()
  }

  pub fn as_key(self) -> &'static str {
    match self {
      | Self::Single => "single",
      | Self::First => "first",
      | Self::Middle => "middle",
      | Self::Last => "last"
    }
  }
}
