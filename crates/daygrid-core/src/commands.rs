use anyhow::{Context, anyhow};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, instrument};

use crate::cli::Invocation;
use crate::clock::{local_now, parse_anchor_expr, resolve_timezone};
use crate::config::Config;
use crate::layout::layout_view;
use crate::render::Renderer;
use crate::store::{EventSource, FileEventStore};
use crate::view::{ViewDescriptor, ViewKind};
use crate::visibility::events_in_range;

mod modifiers;

use modifiers::{draft_from_mods, mods_to_patch, parse_title_and_mods};

pub fn known_command_names() -> Vec<&'static str> {
    vec![
        "day", "week", "workweek", "month", "list", "add", "modify", "delete", "info", "export",
        "help", "version",
    ]
}

pub fn expand_command_abbrev<'a>(token: &'a str, known: &[&'a str]) -> Option<&'a str> {
    if known.contains(&token) {
        return Some(token);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

#[instrument(skip(store, cfg, renderer, inv))]
pub fn dispatch(
    store: &mut FileEventStore,
    cfg: &Config,
    renderer: &mut Renderer,
    inv: Invocation,
) -> anyhow::Result<()> {
    let now = local_now(resolve_timezone(cfg));
    let command = inv.command.as_str();

    debug!(command, args = ?inv.command_args, %now, "dispatching command");

    match command {
        "day" | "week" | "workweek" | "month" => {
            let kind = ViewKind::from_key(command)
                .ok_or_else(|| anyhow!("unknown view: {command}"))?;
            cmd_view(store, cfg, renderer, kind, &inv.command_args, now)
        }
        "list" => cmd_list(store, renderer, &inv.command_args, now),
        "add" => cmd_add(store, renderer, &inv.command_args, now),
        "modify" => cmd_modify(store, renderer, &inv.command_args, now),
        "delete" => cmd_delete(store, &inv.command_args),
        "info" => cmd_info(store, renderer, &inv.command_args),
        "export" => cmd_export(store, cfg, &inv.command_args, now),
        "help" => cmd_help(),
        "version" => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => Err(anyhow!("unknown command: {other}")),
    }
}

/// The view for `args[0]` (an anchor expression, default today) using the
/// configured week start.
pub fn resolve_view(
    cfg: &Config,
    kind: ViewKind,
    args: &[String],
    today: NaiveDate,
) -> anyhow::Result<ViewDescriptor> {
    let anchor = match args {
        [] => today,
        [expr] => parse_anchor_expr(expr, today)?,
        _ => return Err(anyhow!("{}: expected at most one anchor date", kind.as_key())),
    };
    Ok(ViewDescriptor::new(kind, anchor).with_week_start(cfg.week_start()))
}

#[instrument(skip(store, cfg, renderer, args, now))]
fn cmd_view(
    store: &FileEventStore,
    cfg: &Config,
    renderer: &mut Renderer,
    kind: ViewKind,
    args: &[String],
    now: NaiveDateTime,
) -> anyhow::Result<()> {
    let view = resolve_view(cfg, kind, args, now.date())?;
    info!(kind = kind.as_key(), anchor = %view.anchor, "command view");

    let events = store.fetch_events()?;
    let layout = layout_view(&events, &view, now);
    renderer.print_view(&layout)
}

/// `export <view> [anchor]`: the computed layout as JSON.
#[instrument(skip(store, cfg, args, now))]
fn cmd_export(
    store: &FileEventStore,
    cfg: &Config,
    args: &[String],
    now: NaiveDateTime,
) -> anyhow::Result<()> {
    let (kind_arg, rest) = args
        .split_first()
        .ok_or_else(|| anyhow!("export: expected a view (day, week, workweek, month)"))?;
    let kind =
        ViewKind::from_key(kind_arg).ok_or_else(|| anyhow!("export: unknown view: {kind_arg}"))?;
    let view = resolve_view(cfg, kind, rest, now.date())?;

    let events = store.fetch_events()?;
    let layout = layout_view(&events, &view, now);
    let json = serde_json::to_string_pretty(&layout).context("failed to serialize layout")?;
    println!("{json}");
    Ok(())
}

/// `list [from [to]]`: every event, or those touching the given days.
#[instrument(skip(store, renderer, args, now))]
fn cmd_list(
    store: &FileEventStore,
    renderer: &mut Renderer,
    args: &[String],
    now: NaiveDateTime,
) -> anyhow::Result<()> {
    info!("command list");
    let today = now.date();
    let events = store.fetch_events()?;

    let range = match args {
        [] => None,
        [from] => {
            let day = parse_anchor_expr(from, today)?;
            Some((day, day))
        }
        [from, to] => Some((parse_anchor_expr(from, today)?, parse_anchor_expr(to, today)?)),
        _ => return Err(anyhow!("list: expected at most two dates")),
    };

    match range {
        Some((start, end)) => {
            if end < start {
                return Err(anyhow!("list: {end} is before {start}"));
            }
            let selected = events_in_range(&events, start, end)
                .into_iter()
                .cloned()
                .collect::<Vec<_>>();
            renderer.print_event_table(&selected)
        }
        None => renderer.print_event_table(&events),
    }
}

#[instrument(skip(store, renderer, args, now))]
fn cmd_add(
    store: &mut FileEventStore,
    renderer: &mut Renderer,
    args: &[String],
    now: NaiveDateTime,
) -> anyhow::Result<()> {
    info!("command add");

    let (title, mods) = parse_title_and_mods(args, now.date())?;
    let draft = draft_from_mods(title, mods)?;
    let created = store.create_event(draft)?;

    println!("Created event {}.", created.id);
    renderer.print_event_info(&created)
}

#[instrument(skip(store, renderer, args, now))]
fn cmd_modify(
    store: &mut FileEventStore,
    renderer: &mut Renderer,
    args: &[String],
    now: NaiveDateTime,
) -> anyhow::Result<()> {
    info!("command modify");

    let (id, rest) = args
        .split_first()
        .ok_or_else(|| anyhow!("modify: an event id is required"))?;
    let (title, mods) = parse_title_and_mods(rest, now.date())?;

    let mut patch = mods_to_patch(mods);
    if !title.trim().is_empty() {
        patch.title = Some(title);
    }
    if patch.is_empty() {
        return Err(anyhow!("modify: nothing to change"));
    }

    let updated = store.update_event(id, patch)?;
    println!("Modified event {}.", updated.id);
    renderer.print_event_info(&updated)
}

#[instrument(skip(store, args))]
fn cmd_delete(store: &mut FileEventStore, args: &[String]) -> anyhow::Result<()> {
    info!("command delete");

    if args.is_empty() {
        return Err(anyhow!("delete: at least one event id is required"));
    }
    for id in args {
        store.delete_event(id)?;
        println!("Deleted event {id}.");
    }
    Ok(())
}

#[instrument(skip(store, renderer, args))]
fn cmd_info(
    store: &FileEventStore,
    renderer: &mut Renderer,
    args: &[String],
) -> anyhow::Result<()> {
    let [needle] = args else {
        return Err(anyhow!("info: expected exactly one event id"));
    };

    let events = store.fetch_events()?;
    let id = store.resolve_id(&events, needle)?;
    let event = events
        .iter()
        .find(|e| e.id == id)
        .ok_or_else(|| anyhow!("event vanished: {id}"))?;
    renderer.print_event_info(event)
}

fn cmd_help() -> anyhow::Result<()> {
    println!(
        "usage: daygrid [-v|-q] [--rc KEY=VALUE] [--rcfile PATH] [--data DIR] [COMMAND] [ARGS]\n\
         \n\
         views:    day|week|workweek|month [ANCHOR]\n\
         events:   list [FROM [TO]], info ID, add TITLE start:WHEN [MODS], modify ID [TITLE] [MODS], delete ID...\n\
         other:    export VIEW [ANCHOR], help, version\n\
         \n\
         anchors:  today, tomorrow, yesterday, monday.., january.., +3d, -1w, +1m, 2024-01-31\n\
         mods:     start:WHEN end:WHEN from:HH:MM to:HH:MM allday:yes|no recur:none|daily|weekly|monthly|yearly\n\
         \x20         location:TEXT desc:TEXT (an empty value clears the field)"
    );
    Ok(())
}
