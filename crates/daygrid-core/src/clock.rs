//! Wall clock and anchor-date expressions.
//!
//! The layout engine never reads the clock. This module turns the system
//! clock into the local `now` handed to a layout pass, using the configured
//! timezone only to find the local wall-clock time.

use anyhow::{
  Context,
  anyhow
};
use chrono::{
  Datelike,
  NaiveDate,
  NaiveDateTime,
  Utc,
  Weekday
};
use chrono_tz::Tz;
use regex::Regex;

use crate::config::Config;
use crate::dates::{
  add_days,
  checked_add_days,
  checked_shift_months,
  first_day_of_month
};

pub const TIMEZONE_ENV_VAR: &str =
  "DAYGRID_TIMEZONE";

/// Timezone used to read the wall clock; `None` means the system local time.
pub fn resolve_timezone(
  cfg: &Config
) -> Option<Tz> {
  if let Ok(raw) =
    std::env::var(TIMEZONE_ENV_VAR)
    && let Some(tz) =
      parse_timezone(&raw, TIMEZONE_ENV_VAR)
  {
    return Some(tz);
  }

  cfg
    .get("calendar.timezone")
    .and_then(|raw| {
      parse_timezone(
        &raw,
        "calendar.timezone"
      )
    })
}

fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::warn!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => {
      tracing::debug!(
        source,
        timezone = %trimmed,
        "configured timezone"
      );
      Some(tz)
    }
    | Err(err) => {
      tracing::error!(
        source,
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}

/// Local wall-clock time right now.
pub fn local_now(
  timezone: Option<Tz>
) -> NaiveDateTime {
  match timezone {
    | Some(tz) => {
      Utc::now()
        .with_timezone(&tz)
        .naive_local()
    }
    | None => {
      chrono::Local::now().naive_local()
    }
  }
}

/// Resolves an anchor expression relative to `today`.
///
/// Supported: `today`, `tomorrow`, `yesterday`, weekday names (next
/// occurrence), month names (first day of the next occurrence), `+Nd`,
/// `-Nd`, `+Nw`, `-Nw`, `+Nm`, `-Nm` and `YYYY-MM-DD`.
#[tracing::instrument(skip(today), fields(input = input))]
pub fn parse_anchor_expr(
  input: &str,
  today: NaiveDate
) -> anyhow::Result<NaiveDate> {
  let token = input.trim();
  let lower =
    token.to_ascii_lowercase();

  match lower.as_str() {
    | "today" | "now" => {
      return Ok(today);
    }
    | "tomorrow" => {
      return offset_days(today, 1, token);
    }
    | "yesterday" => {
      return offset_days(today, -1, token);
    }
    | _ => {}
  }

  if let Some(target) =
    parse_weekday_name(&lower)
  {
    return Ok(next_weekday_date(
      today, target
    ));
  }

  if let Some(target_month) =
    parse_month_name(&lower)
  {
    let mut year = today.year();
    if target_month <= today.month() {
      year = year.saturating_add(1);
    }
    return first_day_of_month(
      year,
      target_month
    )
    .ok_or_else(|| {
      anyhow!(
        "invalid month/year \
         candidate"
      )
    });
  }

  let rel_re = Regex::new(
    r"^(?P<sign>[+-])(?P<num>\d+)(?P<unit>[dwm])$"
  )
  .map_err(|e| {
    anyhow!(
      "internal regex compile \
       failure: {e}"
    )
  })?;

  if let Some(caps) =
    rel_re.captures(&lower)
  {
    let negative = caps
      .name("sign")
      .is_some_and(|m| m.as_str() == "-");
    let num: i32 = caps
      .name("num")
      .map(|m| m.as_str())
      .ok_or_else(|| {
        anyhow!(
          "missing relative amount"
        )
      })?
      .parse()
      .context(
        "invalid relative number"
      )?;
    let num =
      if negative { -num } else { num };

    return match caps
      .name("unit")
      .map(|m| m.as_str())
    {
      | Some("d") => {
        offset_days(
          today,
          i64::from(num),
          token
        )
      }
      | Some("w") => {
        offset_days(
          today,
          i64::from(num) * 7,
          token
        )
      }
      | Some("m") => {
        checked_shift_months(today, num)
          .ok_or_else(|| {
            out_of_range(token)
          })
      }
      | other => {
        Err(anyhow!(
          "unknown relative unit: \
           {other:?}"
        ))
      }
    };
  }

  if let Ok(date) =
    NaiveDate::parse_from_str(
      token, "%Y-%m-%d"
    )
  {
    return Ok(date);
  }

  Err(anyhow!(
    "unrecognized date expression: \
     {input}"
  ))
  .with_context(|| {
    "supported formats: \
     today/tomorrow/yesterday, \
     weekday names (e.g. monday), \
     month names (e.g. march), \
     +Nd/-Nd/+Nw/-Nw/+Nm/-Nm, \
     YYYY-MM-DD"
  })
}

/// Parses a date-time given on the command line: `YYYY-MM-DD`,
/// `YYYY-MM-DDTHH:MM` or `YYYY-MM-DD HH:MM`, or an anchor expression
/// optionally followed by `@HH:MM` (e.g. `tomorrow@09:30`).
pub fn parse_date_time_expr(
  input: &str,
  today: NaiveDate
) -> anyhow::Result<NaiveDateTime> {
  if let Some(parsed) =
    crate::event::parse_event_date(input)
  {
    return Ok(parsed);
  }

  let (day_part, clock_part) =
    match input.split_once('@') {
      | Some((day, clock)) => {
        (day, Some(clock))
      }
      | None => (input, None)
    };

  let day =
    parse_anchor_expr(day_part, today)?;
  let (hour, minute) = match clock_part {
    | Some(clock) => {
      crate::time_fraction::parse_clock(
        clock.trim()
      )
      .ok_or_else(|| {
        anyhow!(
          "invalid clock time: {clock}"
        )
      })?
    }
    | None => (0, 0)
  };

  day
    .and_hms_opt(hour, minute, 0)
    .ok_or_else(|| {
      anyhow!(
        "failed to construct date \
         time for {input}"
      )
    })
}

fn offset_days(
  today: NaiveDate,
  days: i64,
  token: &str
) -> anyhow::Result<NaiveDate> {
  checked_add_days(today, days)
    .ok_or_else(|| out_of_range(token))
}

fn out_of_range(
  token: &str
) -> anyhow::Error {
  anyhow!(
    "date expression is out of \
     range: {token}"
  )
}

fn parse_weekday_name(
  token: &str
) -> Option<Weekday> {
  match token.trim() {
    | "monday" | "mon" => {
      Some(Weekday::Mon)
    }
    | "tuesday" | "tue" | "tues" => {
      Some(Weekday::Tue)
    }
    | "wednesday" | "wed" => {
      Some(Weekday::Wed)
    }
    | "thursday" | "thu" | "thur"
    | "thurs" => Some(Weekday::Thu),
    | "friday" | "fri" => {
      Some(Weekday::Fri)
    }
    | "saturday" | "sat" => {
      Some(Weekday::Sat)
    }
    | "sunday" | "sun" => {
      Some(Weekday::Sun)
    }
    | _ => None
  }
}

fn next_weekday_date(
  from: NaiveDate,
  target: Weekday
) -> NaiveDate {
  let from_idx = from
    .weekday()
    .num_days_from_monday()
    as i64;
  let target_idx = target
    .num_days_from_monday()
    as i64;
  let mut delta =
    (7 + target_idx - from_idx) % 7;
  if delta == 0 {
    delta = 7;
  }
  add_days(from, delta)
}

fn parse_month_name(
  token: &str
) -> Option<u32> {
  match token.trim() {
    | "january" | "jan" => Some(1),
    | "february" | "feb" => Some(2),
    | "march" | "mar" => Some(3),
    | "april" | "apr" => Some(4),
    | "may" => Some(5),
    | "june" | "jun" => Some(6),
    | "july" | "jul" => Some(7),
    | "august" | "aug" => Some(8),
    | "september" | "sep" | "sept" => {
      Some(9)
    }
    | "october" | "oct" => Some(10),
    | "november" | "nov" => Some(11),
    | "december" | "dec" => Some(12),
    | _ => None
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::{
    parse_anchor_expr,
    parse_date_time_expr
  };

  fn ymd(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  #[test]
  fn parses_relative_keywords() {
    let today = ymd(2024, 2, 29);
    assert_eq!(
      parse_anchor_expr("Tomorrow", today)
        .expect("tomorrow"),
      ymd(2024, 3, 1)
    );
    assert_eq!(
      parse_anchor_expr("-1w", today)
        .expect("last week"),
      ymd(2024, 2, 22)
    );
    assert_eq!(
      parse_anchor_expr("+1m", today)
        .expect("next month"),
      ymd(2024, 3, 29)
    );
  }

  #[test]
  fn rejects_relative_offsets_past_calendar_range() {
    let today = ymd(2026, 2, 17);
    for expr in [
      "+2000000000d",
      "-2000000000w",
      "+2000000000m"
    ] {
      let err = parse_anchor_expr(expr, today)
        .expect_err("offset should overflow");
      assert!(
        format!("{err:#}")
          .contains("out of range"),
        "{expr}: {err:#}"
      );
    }
  }

  #[test]
  fn parses_weekday_name() {
    // 2026-02-17 is a Tuesday.
    let today = ymd(2026, 2, 17);
    assert_eq!(
      parse_anchor_expr("wednesday", today)
        .expect("parse weekday"),
      ymd(2026, 2, 18)
    );
    assert_eq!(
      parse_anchor_expr("tue", today)
        .expect("parse weekday"),
      ymd(2026, 2, 24)
    );
  }

  #[test]
  fn parses_month_name() {
    let today = ymd(2026, 2, 17);
    assert_eq!(
      parse_anchor_expr("march", today)
        .expect("parse month"),
      ymd(2026, 3, 1)
    );
    assert_eq!(
      parse_anchor_expr("feb", today)
        .expect("parse month"),
      ymd(2027, 2, 1)
    );
  }

  #[test]
  fn parses_iso_dates_and_rejects_noise() {
    let today = ymd(2026, 2, 17);
    assert_eq!(
      parse_anchor_expr(
        "2024-01-03",
        today
      )
      .expect("iso date"),
      ymd(2024, 1, 3)
    );
    assert!(
      parse_anchor_expr("soonish", today)
        .is_err()
    );
  }

  #[test]
  fn parses_date_times() {
    let today = ymd(2026, 2, 17);
    assert_eq!(
      parse_date_time_expr(
        "2024-01-01T09:00",
        today
      )
      .expect("iso date time"),
      ymd(2024, 1, 1)
        .and_hms_opt(9, 0, 0)
        .expect("valid time")
    );
    assert_eq!(
      parse_date_time_expr(
        "tomorrow@14:30",
        today
      )
      .expect("relative date time"),
      ymd(2026, 2, 18)
        .and_hms_opt(14, 30, 0)
        .expect("valid time")
    );
    assert!(
      parse_date_time_expr(
        "tomorrow@25:00",
        today
      )
      .is_err()
    );
  }
}
