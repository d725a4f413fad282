//! One layout pass over an event snapshot for a single view.
//!
//! The pass fixes "today" from the `now` it is given, finds the events
//! visible in each column or grid cell, and places every (event, day) pair.
//! A malformed clock string on one pair is reported in
//! [`ViewLayout::errors`] and does not stop the rest of the pass.

use chrono::{
  NaiveDate,
  NaiveDateTime
};
use serde::ser::SerializeStruct;
use serde::{
  Serialize,
  Serializer
};
use tracing::{
  debug,
  trace,
  warn
};

use crate::continuation::Continuation;
use crate::dates::normalize;
use crate::error::LayoutError;
use crate::event::Event;
use crate::month_grid::{
  GridCell,
  MonthGrid
};
use crate::now;
use crate::position::{
  Placement,
  hour_span,
  position
};
use crate::view::{
  ViewDescriptor,
  ViewKind
};
use crate::visibility::{
  events_in_range,
  visible_on
};

/// Geometry and decoration of one event on one day.
///
/// Serializes with the derived `is_first_day`, `is_last_day` and
/// `is_multi_day` flags next to the continuation.
#[derive(Debug, Clone)]
pub struct RenderSlot<'a> {
  pub event:        &'a Event,
  pub column_date:  NaiveDate,
  pub placement:    Placement,
  pub continuation: Continuation
}

impl<'a> RenderSlot<'a> {
  pub fn new(
    event: &'a Event,
    column_date: NaiveDate
  ) -> Result<Self, LayoutError> {
    let placement =
      position(event, column_date)?;
    Ok(Self {
      event,
      column_date,
      placement,
      continuation: Continuation::classify(
        event,
        column_date
      )
    })
  }

  pub fn top(&self) -> f64 {
    self.placement.top
  }

  pub fn height(&self) -> f64 {
    self.placement.height
  }

  pub fn is_first_day(&self) -> bool {
    self.continuation.is_first_day()
  }

  pub fn is_last_day(&self) -> bool {
    self.continuation.is_last_day()
  }

  pub fn is_multi_day(&self) -> bool {
    self.continuation.is_multi_day()
  }

  pub fn shows_label(&self) -> bool {
    self.continuation.shows_label()
  }
}

impl Serialize for RenderSlot<'_> {
  fn serialize<S>(
    &self,
    serializer: S
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer
  {
    let mut state = serializer
      .serialize_struct("RenderSlot", 7)?;
    state.serialize_field("event", self.event)?;
    state.serialize_field(
      "column_date",
      &self.column_date
    )?;
    state.serialize_field(
      "placement",
      &self.placement
    )?;
    state.serialize_field(
      "continuation",
      &self.continuation
    )?;
    state.serialize_field(
      "is_first_day",
      &self.is_first_day()
    )?;
    state.serialize_field(
      "is_last_day",
      &self.is_last_day()
    )?;
    state.serialize_field(
      "is_multi_day",
      &self.is_multi_day()
    )?;
    state.end()
  }
}

/// A placement that could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotError {
  pub event_id:    String,
  pub column_date: NaiveDate,
  #[serde(serialize_with = "as_display")]
  pub error:       LayoutError
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnLayout<'a> {
  pub date:         NaiveDate,
  pub is_today:     bool,
  /// Fractional hour of the now marker; only set on today's column.
  pub now_position: Option<f64>,
  pub slots:        Vec<RenderSlot<'a>>
}

#[derive(Debug, Clone, Serialize)]
pub struct CellLayout<'a> {
  pub cell:     GridCell,
  pub is_today: bool,
  pub slots:    Vec<RenderSlot<'a>>
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewBody<'a> {
  Columns(Vec<ColumnLayout<'a>>),
  Month(Vec<CellLayout<'a>>)
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewLayout<'a> {
  pub view:   ViewDescriptor,
  pub today:  NaiveDate,
  pub body:   ViewBody<'a>,
  pub errors: Vec<SlotError>
}

impl<'a> ViewLayout<'a> {
  pub fn columns(
    &self
  ) -> &[ColumnLayout<'a>] {
    match &self.body {
      | ViewBody::Columns(columns) => {
        columns
      }
      | ViewBody::Month(_) => &[]
    }
  }

  pub fn cells(&self) -> &[CellLayout<'a>] {
    match &self.body {
      | ViewBody::Month(cells) => cells,
      | ViewBody::Columns(_) => &[]
    }
  }

  /// Every slot of the pass, column by column.
  pub fn slots(
    &self
  ) -> impl Iterator<Item = &RenderSlot<'a>>
  {
    let from_columns = self
      .columns()
      .iter()
      .flat_map(|column| &column.slots);
    let from_cells = self
      .cells()
      .iter()
      .flat_map(|cell| &cell.slots);
    from_columns.chain(from_cells)
  }
}

/// Lays out `events` for `view` as seen at `now`.
#[tracing::instrument(
  skip(events, view, now),
  fields(
    kind = view.kind.as_key(),
    anchor = %view.anchor,
    events = events.len()
  )
)]
pub fn layout_view<'a>(
  events: &'a [Event],
  view: &ViewDescriptor,
  now: NaiveDateTime
) -> ViewLayout<'a> {
  let today = normalize(now);
  let (range_start, range_end) =
    view.range();
  let candidates = events_in_range(
    events,
    range_start,
    range_end
  );
  debug!(
    candidates = candidates.len(),
    %range_start,
    %range_end,
    "events in visible range"
  );

  let mut errors = Vec::new();
  let body = match view.kind {
    | ViewKind::Month => {
      let grid = MonthGrid::build(
        view.anchor,
        view.week_start
      );
      ViewBody::Month(
        grid
          .into_cells()
          .into_iter()
          .map(|cell| CellLayout {
            cell,
            is_today: cell.date == today,
            slots: slots_for_day(
              &candidates,
              cell.date,
              &mut errors
            )
          })
          .collect()
      )
    }
    | ViewKind::Day
    | ViewKind::Week
    | ViewKind::WorkWeek => {
      ViewBody::Columns(
        view
          .columns()
          .into_iter()
          .map(|date| {
            layout_column(
              &candidates,
              date,
              now,
              &mut errors
            )
          })
          .collect()
      )
    }
  };

  if !errors.is_empty() {
    warn!(
      count = errors.len(),
      "some events could not be placed"
    );
  }

  ViewLayout {
    view: *view,
    today,
    body,
    errors
  }
}

/// Lays out a single day column of a timed view.
pub fn layout_column<'a>(
  events: &[&'a Event],
  date: NaiveDate,
  now: NaiveDateTime,
  errors: &mut Vec<SlotError>
) -> ColumnLayout<'a> {
  ColumnLayout {
    date,
    is_today: normalize(now) == date,
    now_position:
      now::position_for_column(date, now),
    slots: slots_for_day(
      events, date, errors
    )
  }
}

fn slots_for_day<'a>(
  events: &[&'a Event],
  date: NaiveDate,
  errors: &mut Vec<SlotError>
) -> Vec<RenderSlot<'a>> {
  let mut slots = Vec::new();

  for event in events
    .iter()
    .copied()
    .filter(|event| visible_on(event, date))
  {
    match RenderSlot::new(event, date) {
      | Ok(slot) => {
        trace!(
          event = %event.id,
          %date,
          top = slot.top(),
          height = slot.height(),
          continuation = slot.continuation.as_key(),
          "placed event"
        );
        if !event.all_day
          && hour_span(event, date)
            .is_ok_and(|span| {
              span.is_inverted()
            })
        {
          debug!(
            event = %event.id,
            %date,
            "end precedes start; clamped to zero height"
          );
        }
        slots.push(slot);
      }
      | Err(error) => {
        warn!(
          event = %event.id,
          %date,
          %error,
          "failed to place event"
        );
        errors.push(SlotError {
          event_id: event.id.clone(),
          column_date: date,
          error
        });
      }
    }
  }

  slots
}

fn as_display<S, T>(
  value: &T,
  serializer: S
) -> Result<S::Ok, S::Error>
where
  S: Serializer,
  T: std::fmt::Display
{
  serializer
    .collect_str(value)
}
