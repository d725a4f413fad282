use std::io::{self, IsTerminal, Write};

use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::event::Event;
use crate::layout::{ColumnLayout, RenderSlot, ViewBody, ViewLayout};
use crate::month_grid::weekday_labels;
use crate::time_fraction::to_percent;

const SHORT_ID_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color = cfg.get_bool("color")?.unwrap_or(true);

        Ok(Self {
            color: color && io::stdout().is_terminal(),
        })
    }

    #[tracing::instrument(skip(self, events))]
    pub fn print_event_table(&mut self, events: &[Event]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        self.write_event_table(&mut out, events)
    }

    #[tracing::instrument(skip(self, event), fields(id = %event.id))]
    pub fn print_event_info(&mut self, event: &Event) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        self.write_event_info(&mut out, event)
    }

    #[tracing::instrument(skip(self, layout))]
    pub fn print_view(&mut self, layout: &ViewLayout<'_>) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        match layout.body {
            ViewBody::Columns(_) => self.write_time_grid(&mut out, layout),
            ViewBody::Month(_) => self.write_month_grid(&mut out, layout),
        }
    }

    fn write_event_table<W: Write>(&self, mut out: W, events: &[Event]) -> anyhow::Result<()> {
        let headers = vec![
            "ID".to_string(),
            "Start".to_string(),
            "End".to_string(),
            "Time".to_string(),
            "Title".to_string(),
            "Location".to_string(),
            "Recur".to_string(),
        ];

        let rows = events
            .iter()
            .map(|event| {
                vec![
                    self.paint(short_id(&event.id), "33"),
                    event.start_date.format("%Y-%m-%d").to_string(),
                    event.end_date.format("%Y-%m-%d").to_string(),
                    event.time_range_label(),
                    event.title.clone(),
                    event.location.clone().unwrap_or_default(),
                    recurrence_cell(event),
                ]
            })
            .collect();

        write_table(&mut out, headers, rows)?;
        writeln!(out, "\n{} event(s)", events.len())?;
        Ok(())
    }

    fn write_event_info<W: Write>(&self, mut out: W, event: &Event) -> anyhow::Result<()> {
        writeln!(out, "id          {}", event.id)?;
        writeln!(out, "title       {}", event.title)?;
        writeln!(out, "start       {}", event.start_date.format("%Y-%m-%d %H:%M"))?;
        writeln!(out, "end         {}", event.end_date.format("%Y-%m-%d %H:%M"))?;
        writeln!(out, "time        {}", event.time_range_label())?;
        writeln!(out, "all day     {}", if event.all_day { "yes" } else { "no" })?;
        writeln!(out, "recurrence  {}", event.recurrence.as_key())?;
        if let Some(location) = &event.location {
            writeln!(out, "location    {location}")?;
        }
        if let Some(description) = &event.description {
            writeln!(out, "description {description}")?;
        }
        Ok(())
    }

    /// One row per slot, column by column, with the now marker on today's column.
    fn write_time_grid<W: Write>(&self, mut out: W, layout: &ViewLayout<'_>) -> anyhow::Result<()> {
        writeln!(
            out,
            "{}  {}",
            self.paint(layout.view.kind.label(), "1"),
            layout.view.title()
        )?;
        writeln!(out)?;

        let headers = vec![
            "Day".to_string(),
            "Top".to_string(),
            "Height".to_string(),
            "Span".to_string(),
            "Time".to_string(),
            "Title".to_string(),
        ];

        let mut rows = Vec::new();
        for column in layout.columns() {
            rows.extend(self.column_rows(column));
        }

        write_table(&mut out, headers, rows)?;
        self.write_slot_errors(&mut out, layout)?;
        Ok(())
    }

    fn column_rows(&self, column: &ColumnLayout<'_>) -> Vec<Vec<String>> {
        let day = column.date.format("%a %m-%d").to_string();
        let day = if column.is_today {
            self.paint(&day, "36")
        } else {
            day
        };

        let mut rows = Vec::with_capacity(column.slots.len() + 1);
        if column.slots.is_empty() && column.now_position.is_none() {
            rows.push(vec![
                day.clone(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                "-".to_string(),
            ]);
        }

        for slot in &column.slots {
            rows.push(vec![
                day.clone(),
                format!("{:.1}%", slot.top()),
                format!("{:.1}%", slot.height()),
                slot.continuation.as_key().to_string(),
                slot.event.time_range_label(),
                self.slot_title(slot),
            ]);
        }

        if let Some(hours) = column.now_position {
            rows.push(vec![
                day,
                self.paint(&format!("{:.1}%", to_percent(hours)), "31"),
                String::new(),
                String::new(),
                format_hours(hours),
                self.paint("now", "31"),
            ]);
        }

        rows
    }

    fn slot_title(&self, slot: &RenderSlot<'_>) -> String {
        if slot.shows_label() {
            slot.event.title.clone()
        } else {
            self.paint(&format!("({})", slot.event.title), "2")
        }
    }

    /// The 6x7 grid with the number of events on each day.
    fn write_month_grid<W: Write>(&self, mut out: W, layout: &ViewLayout<'_>) -> anyhow::Result<()> {
        writeln!(out, "{}", self.paint(&layout.view.title(), "1"))?;
        writeln!(out)?;

        let headers = weekday_labels(layout.view.week_start)
            .into_iter()
            .map(str::to_string)
            .collect();

        let rows = layout
            .cells()
            .chunks(7)
            .map(|week| {
                week.iter()
                    .map(|cell| {
                        let mut text = cell.cell.date.format("%d").to_string();
                        if !cell.slots.is_empty() {
                            text.push_str(&format!(" ({})", cell.slots.len()));
                        }
                        if cell.is_today {
                            self.paint(&text, "36")
                        } else if !cell.cell.in_anchor_period {
                            self.paint(&text, "2")
                        } else {
                            text
                        }
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        write_table(&mut out, headers, rows)?;
        self.write_slot_errors(&mut out, layout)?;
        Ok(())
    }

    fn write_slot_errors<W: Write>(&self, mut out: W, layout: &ViewLayout<'_>) -> anyhow::Result<()> {
        for failure in &layout.errors {
            writeln!(
                out,
                "{} {} on {}: {}",
                self.paint("skipped", "31"),
                short_id(&failure.event_id),
                failure.column_date,
                failure.error
            )?;
        }
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

fn recurrence_cell(event: &Event) -> String {
    match event.recurrence.as_key() {
        "none" => String::new(),
        key => key.to_string(),
    }
}

fn format_hours(hours: f64) -> String {
    let total_minutes = (hours * 60.0).floor() as u32;
    format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for (header, &width) in headers.iter().zip(&widths) {
        write!(writer, "{header:width$} ")?;
    }
    writeln!(writer)?;

    for &width in &widths {
        write!(writer, "{:-<width$} ", "")?;
    }
    writeln!(writer)?;

    for row in rows {
        for (cell, &width) in row.iter().zip(&widths) {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = width.saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
