use anyhow::anyhow;
use chrono::{
  Duration,
  NaiveDate,
  NaiveDateTime
};
use tracing::instrument;

use crate::clock::parse_date_time_expr;
use crate::event::{
  EventDraft,
  EventPatch,
  Recurrence
};
use crate::time_fraction::parse_clock;

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Mod {
  Start(NaiveDateTime),
  End(NaiveDateTime),
  From(Option<String>),
  To(Option<String>),
  AllDay(bool),
  Recur(Recurrence),
  Location(Option<String>),
  Description(Option<String>)
}

/// Splits `args` into title words and `key:value` modifiers. Everything
/// after a bare `--` is title text.
#[instrument(skip(args, today))]
pub(super) fn parse_title_and_mods(
  args: &[String],
  today: NaiveDate
) -> anyhow::Result<(String, Vec<Mod>)>
{
  let mut title_parts = Vec::new();
  let mut mods = Vec::new();

  let mut literal = false;
  for arg in args {
    if arg == "--" {
      literal = true;
      continue;
    }

    if !literal
      && let Some(one_mod) =
        parse_one_mod(arg, today)?
    {
      mods.push(one_mod);
      continue;
    }

    title_parts.push(arg.clone());
  }

  Ok((title_parts.join(" "), mods))
}

fn parse_one_mod(
  tok: &str,
  today: NaiveDate
) -> anyhow::Result<Option<Mod>> {
  let Some((key, value)) =
    tok.split_once(':')
  else {
    return Ok(None);
  };

  let key = key.to_ascii_lowercase();

  match key.as_str() {
    | "start" => {
      Ok(Some(Mod::Start(
        parse_date_time_expr(
          value, today
        )?
      )))
    }
    | "end" => {
      Ok(Some(Mod::End(
        parse_date_time_expr(
          value, today
        )?
      )))
    }
    | "from" => {
      Ok(Some(Mod::From(clock_value(
        value
      )?)))
    }
    | "to" => {
      Ok(Some(Mod::To(clock_value(
        value
      )?)))
    }
    | "allday" => {
      Ok(Some(Mod::AllDay(
        parse_flag(value)?
      )))
    }
    | "recur" | "recurrence" => {
      let recurrence =
        Recurrence::from_key(value)
          .ok_or_else(|| {
            anyhow!(
              "unknown recurrence: \
               {value} (expected \
               none, daily, weekly, \
               monthly or yearly)"
            )
          })?;
      Ok(Some(Mod::Recur(recurrence)))
    }
    | "location" | "loc" => {
      Ok(Some(Mod::Location(
        text_value(value)
      )))
    }
    | "desc" | "description" => {
      Ok(Some(Mod::Description(
        text_value(value)
      )))
    }
    | _ => Ok(None)
  }
}

/// Folds modifiers into a patch; later modifiers win.
pub(super) fn mods_to_patch(
  mods: Vec<Mod>
) -> EventPatch {
  let mut patch = EventPatch::default();
  for one_mod in mods {
    match one_mod {
      | Mod::Start(dt) => {
        patch.start_date = Some(dt);
      }
      | Mod::End(dt) => {
        patch.end_date = Some(dt);
      }
      | Mod::From(clock) => {
        patch.start_time = Some(clock);
      }
      | Mod::To(clock) => {
        patch.end_time = Some(clock);
      }
      | Mod::AllDay(flag) => {
        patch.all_day = Some(flag);
      }
      | Mod::Recur(recurrence) => {
        patch.recurrence =
          Some(recurrence);
      }
      | Mod::Location(location) => {
        patch.location = Some(location);
      }
      | Mod::Description(text) => {
        patch.description = Some(text);
      }
    }
  }
  patch
}

/// Builds a new event from `add` arguments. `start:` is required; a missing
/// `end:` means one hour later, or the same day for all-day events.
pub(super) fn draft_from_mods(
  title: String,
  mods: Vec<Mod>
) -> anyhow::Result<EventDraft> {
  if title.trim().is_empty() {
    return Err(anyhow!(
      "add: a title is required"
    ));
  }

  let patch = mods_to_patch(mods);
  let start =
    patch.start_date.ok_or_else(|| {
      anyhow!(
        "add: start:<date> is required"
      )
    })?;
  let all_day =
    patch.all_day.unwrap_or(false);
  let end = patch.end_date.unwrap_or(
    if all_day {
      start
    } else {
      start + Duration::hours(1)
    }
  );

  let mut draft =
    EventDraft::new(title, start, end);
  draft.all_day = all_day;
  draft.start_time =
    patch.start_time.flatten();
  draft.end_time =
    patch.end_time.flatten();
  draft.recurrence =
    patch.recurrence.unwrap_or_default();
  draft.location =
    patch.location.flatten();
  draft.description =
    patch.description.flatten();
  Ok(draft)
}

fn clock_value(
  value: &str
) -> anyhow::Result<Option<String>> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Ok(None);
  }
  let (hour, minute) =
    parse_clock(trimmed).ok_or_else(
      || {
        anyhow!(
          "invalid clock time: \
           {trimmed} (expected HH:MM)"
        )
      }
    )?;
  Ok(Some(format!(
    "{hour:02}:{minute:02}"
  )))
}

fn text_value(
  value: &str
) -> Option<String> {
  let trimmed = value.trim();
  (!trimmed.is_empty())
    .then(|| trimmed.to_string())
}

fn parse_flag(
  value: &str
) -> anyhow::Result<bool> {
  match value
    .trim()
    .to_ascii_lowercase()
    .as_str()
  {
    | "1" | "y" | "yes" | "on"
    | "true" => Ok(true),
    | "0" | "n" | "no" | "off"
    | "false" => Ok(false),
    | other => {
      Err(anyhow!(
        "invalid allday value: \
         {other}"
      ))
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1)
      .expect("valid date")
  }

  fn args(raw: &[&str]) -> Vec<String> {
    raw
      .iter()
      .map(|s| s.to_string())
      .collect()
  }

  #[test]
  fn splits_title_from_modifiers() {
    let (title, mods) =
      parse_title_and_mods(
        &args(&[
          "Team",
          "start:2024-01-02T09:00",
          "sync",
          "from:9:00",
          "location:Room 4",
          "--",
          "desc:literal"
        ]),
        today()
      )
      .expect("parse");

    assert_eq!(
      title,
      "Team sync desc:literal"
    );
    assert_eq!(mods.len(), 3);
    assert_eq!(
      mods[1],
      Mod::From(Some(
        "09:00".to_string()
      ))
    );
  }

  #[test]
  fn add_defaults_to_one_hour() {
    let (title, mods) =
      parse_title_and_mods(
        &args(&[
          "Dentist",
          "start:tomorrow@14:30",
          "recur:yearly"
        ]),
        today()
      )
      .expect("parse");
    let draft =
      draft_from_mods(title, mods)
        .expect("draft");

    let start =
      NaiveDate::from_ymd_opt(2024, 1, 2)
        .expect("valid date")
        .and_hms_opt(14, 30, 0)
        .expect("valid time");
    assert_eq!(draft.start_date, start);
    assert_eq!(
      draft.end_date,
      start + Duration::hours(1)
    );
    assert_eq!(
      draft.recurrence,
      Recurrence::Yearly
    );
  }

  #[test]
  fn all_day_add_ends_same_day() {
    let (title, mods) =
      parse_title_and_mods(
        &args(&[
          "Holiday",
          "start:2024-01-05",
          "allday:yes"
        ]),
        today()
      )
      .expect("parse");
    let draft =
      draft_from_mods(title, mods)
        .expect("draft");
    assert!(draft.all_day);
    assert_eq!(
      draft.end_date,
      draft.start_date
    );
  }

  #[test]
  fn add_requires_start_and_title() {
    assert!(
      draft_from_mods(
        "Nothing".to_string(),
        vec![]
      )
      .is_err()
    );
    assert!(
      draft_from_mods(
        " ".to_string(),
        vec![Mod::AllDay(true)]
      )
      .is_err()
    );
  }

  #[test]
  fn empty_values_clear_fields() {
    let (_, mods) =
      parse_title_and_mods(
        &args(&["location:", "to:"]),
        today()
      )
      .expect("parse");
    let patch = mods_to_patch(mods);
    assert_eq!(
      patch.location,
      Some(None)
    );
    assert_eq!(patch.end_time, Some(None));
    assert!(patch.title.is_none());
  }

  #[test]
  fn rejects_bad_values() {
    for bad in [
      "from:25:00",
      "allday:maybe",
      "recur:hourly",
      "start:someday"
    ] {
      assert!(
        parse_title_and_mods(
          &args(&[bad]),
          today()
        )
        .is_err(),
        "{bad} should be rejected"
      );
    }
  }
}
