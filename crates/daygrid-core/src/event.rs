use chrono::NaiveDateTime;
use serde::{
  Deserialize,
  Serialize
};

use crate::error::EventError;
use crate::time_fraction;

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  Serialize,
  Deserialize,
  PartialEq,
  Eq
)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
  #[default]
  None,
  Daily,
  Weekly,
  Monthly,
  Yearly
}

impl Recurrence {
  pub fn as_key(self) -> &'static str {
    match self {
      | Self::None => "none",
      | Self::Daily => "daily",
      | Self::Weekly => "weekly",
      | Self::Monthly => "monthly",
      | Self::Yearly => "yearly"
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
      | "" | "none" => Some(Self::None),
      | "daily" => Some(Self::Daily),
      | "weekly" => Some(Self::Weekly),
      | "monthly" => Some(Self::Monthly),
      | "yearly" => Some(Self::Yearly),
      | _ => None
    }
  }
}

/// A schedulable event as supplied by the event store.
///
/// Recurrence, location and description are carried for display only; the
/// layout engine never expands or interprets them.
#[derive(
  Debug, Clone, Serialize, Deserialize, PartialEq,
)]
#[serde(rename_all = "camelCase")]
pub struct Event {
  #[serde(alias = "_id")]
  pub id: String,

  pub title: String,

  #[serde(with = "event_date_serde")]
  pub start_date: NaiveDateTime,

  #[serde(with = "event_date_serde")]
  pub end_date: NaiveDateTime,

  #[serde(
    default,
    deserialize_with = "blank_as_none",
    skip_serializing_if = "Option::is_none"
  )]
  pub start_time: Option<String>,

  #[serde(
    default,
    deserialize_with = "blank_as_none",
    skip_serializing_if = "Option::is_none"
  )]
  pub end_time: Option<String>,

  #[serde(default)]
  pub all_day: bool,

  #[serde(default)]
  pub recurrence: Recurrence,

  #[serde(
    default,
    deserialize_with = "blank_as_none",
    skip_serializing_if = "Option::is_none"
  )]
  pub location: Option<String>,

  #[serde(
    default,
    deserialize_with = "blank_as_none",
    skip_serializing_if = "Option::is_none"
  )]
  pub description: Option<String>
}

/// Input of `create_event`: an event without its identifier.
#[derive(
  Debug, Clone, Serialize, Deserialize, PartialEq,
)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
  pub title: String,

  #[serde(with = "event_date_serde")]
  pub start_date: NaiveDateTime,

  #[serde(with = "event_date_serde")]
  pub end_date: NaiveDateTime,

  #[serde(
    default,
    deserialize_with = "blank_as_none"
  )]
  pub start_time: Option<String>,

  #[serde(
    default,
    deserialize_with = "blank_as_none"
  )]
  pub end_time: Option<String>,

  #[serde(default)]
  pub all_day: bool,

  #[serde(default)]
  pub recurrence: Recurrence,

  #[serde(
    default,
    deserialize_with = "blank_as_none"
  )]
  pub location: Option<String>,

  #[serde(
    default,
    deserialize_with = "blank_as_none"
  )]
  pub description: Option<String>
}

impl EventDraft {
  pub fn new(
    title: impl Into<String>,
    start_date: NaiveDateTime,
    end_date: NaiveDateTime
  ) -> Self {
    Self {
      title: title.into(),
      start_date,
      end_date,
      start_time: None,
      end_time: None,
      all_day: false,
      recurrence: Recurrence::None,
      location: None,
      description: None
    }
  }
}

/// Input of `update_event`. `None` leaves a field unchanged; for the optional
/// fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
  pub title:       Option<String>,
  pub start_date:  Option<NaiveDateTime>,
  pub end_date:    Option<NaiveDateTime>,
  pub start_time:  Option<Option<String>>,
  pub end_time:    Option<Option<String>>,
  pub all_day:     Option<bool>,
  pub recurrence:  Option<Recurrence>,
  pub location:    Option<Option<String>>,
  pub description: Option<Option<String>>
}

impl EventPatch {
  pub fn is_empty(&self) -> bool {
    *self == Self::default()
  }
}

impl Event {
  pub fn from_draft(
    id: String,
    draft: EventDraft
  ) -> Self {
    Self {
      id,
      title: draft.title,
      start_date: draft.start_date,
      end_date: draft.end_date,
      start_time: draft.start_time,
      end_time: draft.end_time,
      all_day: draft.all_day,
      recurrence: draft.recurrence,
      location: draft.location,
      description: draft.description
    }
  }

  pub fn apply_patch(
    &mut self,
    patch: EventPatch
  ) {
    if let Some(title) = patch.title {
      self.title = title;
    }
    if let Some(start) = patch.start_date
    {
      self.start_date = start;
    }
    if let Some(end) = patch.end_date {
      self.end_date = end;
    }
    if let Some(start_time) =
      patch.start_time
    {
      self.start_time = start_time;
    }
    if let Some(end_time) = patch.end_time
    {
      self.end_time = end_time;
    }
    if let Some(all_day) = patch.all_day {
      self.all_day = all_day;
    }
    if let Some(recurrence) =
      patch.recurrence
    {
      self.recurrence = recurrence;
    }
    if let Some(location) = patch.location
    {
      self.location = location;
    }
    if let Some(description) =
      patch.description
    {
      self.description = description;
    }
  }

  /// Checks the invariants the layout engine assumes but never enforces.
  pub fn validate(
    &self
  ) -> Result<(), EventError> {
    if self.title.trim().is_empty() {
      return Err(EventError::EmptyTitle);
    }

    let start = self.start_date.date();
    let end = self.end_date.date();
    if end < start {
      return Err(
        EventError::InvalidDateRange {
          start,
          end
        }
      );
    }

    for clock in [
      self.start_time.as_deref(),
      self.end_time.as_deref()
    ]
    .into_iter()
    .flatten()
    {
      time_fraction::from_clock(clock)?;
    }

    Ok(())
  }

  #[must_use]
  pub fn is_multi_day(&self) -> bool {
    self.start_date.date()
      != self.end_date.date()
  }

  /// Fractional start hour on the event's first day: the explicit clock
  /// string when present, else the time embedded in `start_date`.
  pub fn start_hour(
    &self
  ) -> Result<f64, crate::error::LayoutError>
  {
    match self.start_time.as_deref() {
      | Some(clock) => {
        time_fraction::from_clock(clock)
      }
      | None => {
        Ok(time_fraction::from_date_time(
          self.start_date
        ))
      }
    }
  }

  /// Fractional end hour on the event's last day.
  pub fn end_hour(
    &self
  ) -> Result<f64, crate::error::LayoutError>
  {
    match self.end_time.as_deref() {
      | Some(clock) => {
        time_fraction::from_clock(clock)
      }
      | None => {
        Ok(time_fraction::from_date_time(
          self.end_date
        ))
      }
    }
  }

  /// `"HH:MM - HH:MM"`, or `"all day"` for all-day events.
  pub fn time_range_label(
    &self
  ) -> String {
    if self.all_day {
      return "all day".to_string();
    }

    let start = self
      .start_time
      .clone()
      .unwrap_or_else(|| {
        self
          .start_date
          .format("%H:%M")
          .to_string()
      });
    let end = self
      .end_time
      .clone()
      .unwrap_or_else(|| {
        self
          .end_date
          .format("%H:%M")
          .to_string()
      });
    format!("{start} - {end}")
  }
}

fn blank_as_none<'de, D>(
  deserializer: D
) -> Result<Option<String>, D::Error>
where
  D: serde::Deserializer<'de>
{
  let opt =
    Option::<String>::deserialize(
      deserializer
    )?;
  Ok(opt.and_then(|raw| {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      None
    } else {
      Some(trimmed.to_string())
    }
  }))
}

/// Parses the date forms the event store hands out.
///
/// Offsets in RFC 3339 values are dropped and the wall-clock part kept.
#[must_use]
pub fn parse_event_date(
  raw: &str
) -> Option<NaiveDateTime> {
  let token = raw.trim();

  for fmt in [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M"
  ] {
    if let Ok(ndt) =
      NaiveDateTime::parse_from_str(
        token, fmt
      )
    {
      return Some(ndt);
    }
  }

  if let Ok(dt) =
    chrono::DateTime::parse_from_rfc3339(
      token
    )
  {
    return Some(dt.naive_local());
  }

  chrono::NaiveDate::parse_from_str(
    token, "%Y-%m-%d"
  )
  .ok()
  .and_then(|date| {
    date.and_hms_opt(0, 0, 0)
  })
}

pub mod event_date_serde {
  use chrono::NaiveDateTime;
  use serde::{
    Deserialize,
    Deserializer,
    Serializer
  };

  const FORMAT: &str =
    "%Y-%m-%dT%H:%M:%S";

  pub fn serialize<S>(
    dt: &NaiveDateTime,
    serializer: S
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer
  {
    serializer.serialize_str(
      &dt.format(FORMAT).to_string()
    )
  }

  pub fn deserialize<'de, D>(
    deserializer: D
  ) -> Result<NaiveDateTime, D::Error>
  where
    D: Deserializer<'de>
  {
    let raw = String::deserialize(
      deserializer
    )?;
    super::parse_event_date(&raw)
      .ok_or_else(|| {
        serde::de::Error::custom(
          format!(
            "unrecognized event date: \
             {raw}"
          )
        )
      })
  }
}
