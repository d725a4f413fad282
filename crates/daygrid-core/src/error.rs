//! Error types for the layout engine and the event store.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by the pure layout functions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
  #[error(
    "malformed clock time `{input}`; \
     expected HH:MM within 00:00-23:59"
  )]
  MalformedTimeString { input: String },

  #[error(
    "invalid calendar month \
     {year}-{month:02}"
  )]
  InvalidMonth { year: i32, month: u32 }
}

impl LayoutError {
  pub(crate) fn malformed(
    input: &str
  ) -> Self {
    Self::MalformedTimeString {
      input: input.to_string()
    }
  }
}

/// Errors raised when an event is checked at the creation/update boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
  #[error(
    "event ends ({end}) before it \
     starts ({start})"
  )]
  InvalidDateRange {
    start: NaiveDate,
    end:   NaiveDate
  },

  #[error("event title cannot be empty")]
  EmptyTitle,

  #[error(transparent)]
  Time(#[from] LayoutError)
}

/// Errors raised by event-store lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
  #[error("event not found: {0}")]
  NotFound(String),

  #[error(
    "event id prefix `{0}` matches \
     more than one event"
  )]
  AmbiguousId(String)
}
