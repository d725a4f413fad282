use chrono::{
  Datelike,
  NaiveDate,
  Weekday
};
use serde::{
  Deserialize,
  Serialize
};

use crate::dates::{
  add_days,
  shift_months,
  start_of_week
};
use crate::month_grid::{
  GRID_CELLS,
  grid_start
};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize
)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
  Day,
  Week,
  WorkWeek,
  Month
}

impl ViewKind {
  pub fn all() -> [Self; 4] {
    [
      Self::Day,
      Self::Week,
      Self::WorkWeek,
      Self::Month
    ]
  }

  pub fn as_key(self) -> &'static str {
    match self {
      | Self::Day => "day",
      | Self::Week => "week",
      | Self::WorkWeek => "workweek",
      | Self::Month => "month"
    }
  }

  pub fn from_key(
    raw: &str
  ) -> Option<Self> {
    match raw
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "day" => Some(Self::Day),
      | "week" => Some(Self::Week),
      | "workweek" | "work-week" => {
        Some(Self::WorkWeek)
      }
      | "month" => Some(Self::Month),
      | _ => None
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | Self::Day => "Day",
      | Self::Week => "Week",
      | Self::WorkWeek => "Work week",
      | Self::Month => "Month"
    }
  }

  /// Number of day columns in a timed view; `None` for the month grid.
  pub fn column_count(
    self
  ) -> Option<usize> {
    match self {
      | Self::Day => Some(1),
      | Self::Week => Some(7),
      | Self::WorkWeek => Some(5),
      | Self::Month => None
    }
  }
}

/// Which period a view displays.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize,
)]
pub struct ViewDescriptor {
  pub kind:       ViewKind,
  pub anchor:     NaiveDate,
  pub week_start: Weekday
}

impl ViewDescriptor {
  /// A view with ISO (Monday) weeks.
  pub fn new(
    kind: ViewKind,
    anchor: NaiveDate
  ) -> Self {
    Self {
      kind,
      anchor,
      week_start: Weekday::Mon
    }
  }

  #[must_use]
  pub fn with_week_start(
    mut self,
    week_start: Weekday
  ) -> Self {
    self.week_start = week_start;
    self
  }

  /// Day columns of a timed view. Empty for the month view, whose cells
  /// come from the month grid.
  pub fn columns(
    &self
  ) -> Vec<NaiveDate> {
    let Some(count) =
      self.kind.column_count()
    else {
      return Vec::new();
    };
    let first = self.first_day();
    (0..count as i64)
      .map(|offset| {
        add_days(first, offset)
      })
      .collect()
  }

  /// Inclusive first and last visible date.
  pub fn range(
    &self
  ) -> (NaiveDate, NaiveDate) {
    match self.kind {
      | ViewKind::Month => {
        let start = grid_start(
          self.anchor,
          self.week_start
        );
        (
          start,
          add_days(
            start,
            GRID_CELLS as i64 - 1
          )
        )
      }
      | kind => {
        let start = self.first_day();
        let count = kind
          .column_count()
          .unwrap_or(1)
          as i64;
        (start, add_days(start, count - 1))
      }
    }
  }

  fn first_day(&self) -> NaiveDate {
    match self.kind {
      | ViewKind::Day => self.anchor,
      | ViewKind::Week
      | ViewKind::WorkWeek => {
        start_of_week(
          self.anchor,
          self.week_start
        )
      }
      | ViewKind::Month => {
        self
          .anchor
          .with_day(1)
          .unwrap_or(self.anchor)
      }
    }
  }

  /// The adjacent period, `step` periods away.
  #[must_use]
  pub fn shift(
    &self,
    step: i32
  ) -> Self {
    let anchor = match self.kind {
      | ViewKind::Day => {
        add_days(
          self.anchor,
          i64::from(step)
        )
      }
      | ViewKind::Week
      | ViewKind::WorkWeek => {
        add_days(
          self.anchor,
          i64::from(step) * 7
        )
      }
      | ViewKind::Month => {
        shift_months(self.anchor, step)
      }
    };
    Self {
      anchor,
      ..*self
    }
  }

  pub fn title(&self) -> String {
    match self.kind {
      | ViewKind::Day => {
        self
          .anchor
          .format("%A %Y-%m-%d")
          .to_string()
      }
      | ViewKind::Week
      | ViewKind::WorkWeek => {
        let (start, end) = self.range();
        format!(
          "{} - {}",
          start.format("%Y-%m-%d"),
          end.format("%Y-%m-%d")
        )
      }
      | ViewKind::Month => {
        self
          .anchor
          .format("%B %Y")
          .to_string()
      }
    }
  }
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
  fn week_spans_monday_to_sunday() {
    // Thursday
    let view = ViewDescriptor::new(
      ViewKind::Week,
      ymd(2024, 2, 29)
    );
    let columns = view.columns();
    assert_eq!(columns.len(), 7);
    assert_eq!(columns[0], ymd(2024, 2, 26));
    assert_eq!(columns[6], ymd(2024, 3, 3));
    assert_eq!(
      view.range(),
      (ymd(2024, 2, 26), ymd(2024, 3, 3))
    );
  }

  #[test]
  fn sunday_anchor_belongs_to_preceding_monday()
  {
    let view = ViewDescriptor::new(
      ViewKind::WorkWeek,
      ymd(2024, 3, 3)
    );
    let columns = view.columns();
    assert_eq!(
      columns,
      vec![
        ymd(2024, 2, 26),
        ymd(2024, 2, 27),
        ymd(2024, 2, 28),
        ymd(2024, 2, 29),
        ymd(2024, 3, 1),
      ]
    );
  }

  #[test]
  fn day_view_has_single_column() {
    let view = ViewDescriptor::new(
      ViewKind::Day,
      ymd(2024, 7, 14)
    );
    assert_eq!(
      view.columns(),
      vec![ymd(2024, 7, 14)]
    );
    assert_eq!(
      view.title(),
      "Sunday 2024-07-14"
    );
  }

  #[test]
  fn month_range_covers_padded_grid() {
    let view = ViewDescriptor::new(
      ViewKind::Month,
      ymd(2024, 2, 10)
    );
    assert!(view.columns().is_empty());
    assert_eq!(
      view.range(),
      (ymd(2024, 1, 29), ymd(2024, 3, 10))
    );
    assert_eq!(view.title(), "February 2024");
  }

  #[test]
  fn shift_moves_by_view_period() {
    let day = ViewDescriptor::new(
      ViewKind::Day,
      ymd(2024, 12, 31)
    );
    assert_eq!(
      day.shift(1).anchor,
      ymd(2025, 1, 1)
    );

    let week = ViewDescriptor::new(
      ViewKind::WorkWeek,
      ymd(2024, 1, 3)
    );
    assert_eq!(
      week.shift(-1).anchor,
      ymd(2023, 12, 27)
    );

    let month = ViewDescriptor::new(
      ViewKind::Month,
      ymd(2024, 3, 31)
    );
    assert_eq!(
      month.shift(-1).anchor,
      ymd(2024, 2, 29)
    );
  }

  #[test]
  fn sunday_weeks_are_supported() {
    let view = ViewDescriptor::new(
      ViewKind::Week,
      ymd(2024, 1, 3)
    )
    .with_week_start(Weekday::Sun);
    assert_eq!(
      view.range(),
      (ymd(2023, 12, 31), ymd(2024, 1, 6))
    );
  }

  #[test]
  fn view_keys_round_trip() {
    for kind in ViewKind::all() {
      assert_eq!(
        ViewKind::from_key(kind.as_key()),
        Some(kind)
      );
    }
    assert_eq!(
      ViewKind::from_key("work-week"),
      Some(ViewKind::WorkWeek)
    );
  }
}
