//! The fixed 6x7 day grid of the month view.
//!
//! The grid opens with the tail of the previous month (as many days as it
//! takes to reach the configured week start), continues with every day of the
//! anchor month and is topped up with the head of the next month until it
//! holds exactly [`GRID_CELLS`] days.

use chrono::{
  Datelike,
  NaiveDate,
  Weekday
};
use serde::Serialize;

use crate::dates::{
  add_days,
  first_day_of_month,
  start_of_week
};
use crate::error::LayoutError;

pub const GRID_WEEKS: usize = 6;
pub const GRID_CELLS: usize =
  GRID_WEEKS * 7;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize,
)]
pub struct GridCell {
  pub date:              NaiveDate,
  /// False for the padding days borrowed from adjacent months.
  pub in_anchor_period: bool
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
  pub year:       i32,
  pub month:      u32,
  pub week_start: Weekday,
  cells:          Vec<GridCell>
}

impl MonthGrid {
  /// Grid for the month containing `anchor`.
  pub fn build(
    anchor: NaiveDate,
    week_start: Weekday
  ) -> Self {
    let year = anchor.year();
    let month = anchor.month();
    let start =
      grid_start(anchor, week_start);

    let cells = (0..GRID_CELLS as i64)
      .map(|offset| {
        let date =
          add_days(start, offset);
        GridCell {
          date,
          in_anchor_period: date.year()
            == year
            && date.month() == month
        }
      })
      .collect();

    Self {
      year,
      month,
      week_start,
      cells
    }
  }

  pub fn for_month(
    year: i32,
    month: u32,
    week_start: Weekday
  ) -> Result<Self, LayoutError> {
    let first =
      first_day_of_month(year, month)
        .ok_or(
          LayoutError::InvalidMonth {
            year,
            month
          }
        )?;
    Ok(Self::build(first, week_start))
  }

  pub fn cells(&self) -> &[GridCell] {
    &self.cells
  }

  pub fn into_cells(
    self
  ) -> Vec<GridCell> {
    self.cells
  }

  /// The grid as six rows of seven days.
  pub fn weeks(
    &self
  ) -> impl Iterator<Item = &[GridCell]>
  {
    self.cells.chunks(7)
  }

  /// Number of leading cells borrowed from the previous month.
  pub fn leading_padding(&self) -> usize {
    self
      .cells
      .iter()
      .take_while(|cell| {
        !cell.in_anchor_period
      })
      .count()
  }
}

/// First date shown in the grid of the month containing `anchor`.
pub fn grid_start(
  anchor: NaiveDate,
  week_start: Weekday
) -> NaiveDate {
  let first =
    anchor.with_day(1).unwrap_or(anchor);
  start_of_week(first, week_start)
}

/// Short weekday headings in grid column order.
pub fn weekday_labels(
  week_start: Weekday
) -> Vec<&'static str> {
  let mut day = week_start;
  let mut labels =
    Vec::with_capacity(7);
  for _ in 0..7 {
    labels.push(match day {
      | Weekday::Mon => "Mon",
      | Weekday::Tue => "Tue",
      | Weekday::Wed => "Wed",
      | Weekday::Thu => "Thu",
      | Weekday::Fri => "Fri",
      | Weekday::Sat => "Sat",
      | Weekday::Sun => "Sun"
    });
    day = day.succ();
  }
  labels
}
