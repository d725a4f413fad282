use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreError;
use crate::event::{Event, EventDraft, EventPatch};

/// Where event snapshots come from and where edits go.
///
/// The layout engine only ever consumes the `Vec<Event>` returned by
/// [`EventSource::fetch_events`].
pub trait EventSource {
    fn fetch_events(&self) -> anyhow::Result<Vec<Event>>;

    fn create_event(&mut self, draft: EventDraft) -> anyhow::Result<Event>;

    fn update_event(&mut self, id: &str, patch: EventPatch) -> anyhow::Result<Event>;

    fn delete_event(&mut self, id: &str) -> anyhow::Result<()>;
}

/// Events kept as JSON lines in `<data_dir>/events.data`.
#[derive(Debug)]
pub struct FileEventStore {
    pub data_dir: PathBuf,
    pub events_path: PathBuf,
}

impl FileEventStore {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        let events_path = data_dir.join("events.data");
        if !events_path.exists() {
            fs::write(&events_path, "")?;
        }

        info!(
            data_dir = %data_dir.display(),
            events = %events_path.display(),
            "opened event store"
        );

        Ok(Self {
            data_dir,
            events_path,
        })
    }

    /// Resolves a full id or a unique id prefix.
    pub fn resolve_id(&self, events: &[Event], needle: &str) -> Result<String, StoreError> {
        if let Some(exact) = events.iter().find(|e| e.id == needle) {
            return Ok(exact.id.clone());
        }

        let mut matches = events
            .iter()
            .filter(|e| !needle.is_empty() && e.id.starts_with(needle));
        let first = matches
            .next()
            .ok_or_else(|| StoreError::NotFound(needle.to_string()))?;
        if matches.next().is_some() {
            return Err(StoreError::AmbiguousId(needle.to_string()));
        }
        Ok(first.id.clone())
    }

    #[tracing::instrument(skip(self, events))]
    fn save(&self, events: &mut Vec<Event>) -> anyhow::Result<()> {
        events.sort_by(|a, b| a.start_date.cmp(&b.start_date).then_with(|| a.id.cmp(&b.id)));
        save_jsonl_atomic(&self.events_path, events).context("failed to save events.data")
    }
}

impl EventSource for FileEventStore {
    #[tracing::instrument(skip(self))]
    fn fetch_events(&self) -> anyhow::Result<Vec<Event>> {
        load_jsonl(&self.events_path).context("failed to load events.data")
    }

    #[tracing::instrument(skip(self, draft), fields(title = %draft.title))]
    fn create_event(&mut self, draft: EventDraft) -> anyhow::Result<Event> {
        let event = Event::from_draft(Uuid::new_v4().to_string(), draft);
        event.validate().context("refusing to create event")?;

        let mut events = self.fetch_events()?;
        events.push(event.clone());
        self.save(&mut events)?;

        debug!(id = %event.id, count = events.len(), "event created");
        Ok(event)
    }

    #[tracing::instrument(skip(self, patch))]
    fn update_event(&mut self, id: &str, patch: EventPatch) -> anyhow::Result<Event> {
        let mut events = self.fetch_events()?;
        let id = self.resolve_id(&events, id)?;
        let idx = events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| anyhow!("event vanished during update: {id}"))?;

        let mut updated = events[idx].clone();
        updated.apply_patch(patch);
        updated
            .validate()
            .with_context(|| format!("refusing to update event {id}"))?;

        events[idx] = updated.clone();
        self.save(&mut events)?;

        debug!(id = %updated.id, "event updated");
        Ok(updated)
    }

    #[tracing::instrument(skip(self))]
    fn delete_event(&mut self, id: &str) -> anyhow::Result<()> {
        let mut events = self.fetch_events()?;
        let id = self.resolve_id(&events, id)?;
        let before = events.len();
        events.retain(|e| e.id != id);
        self.save(&mut events)?;

        info!(id = %id, before, after = events.len(), "event deleted");
        Ok(())
    }
}

#[tracing::instrument(skip(path))]
fn load_jsonl(path: &Path) -> anyhow::Result<Vec<Event>> {
    debug!(file = %path.display(), "loading jsonl");
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let event: Event = serde_json::from_str(trimmed)
            .with_context(|| format!("failed parsing {} line {}", path.display(), idx + 1))?;
        out.push(event);
    }

    debug!(count = out.len(), "loaded events from jsonl");
    Ok(out)
}

#[tracing::instrument(skip(path, events))]
fn save_jsonl_atomic(path: &Path, events: &[Event]) -> anyhow::Result<()> {
    debug!(file = %path.display(), count = events.len(), "saving jsonl atomically");

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    for event in events {
        let serialized = serde_json::to_string(event)?;
        writeln!(temp, "{serialized}")?;
    }
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

    Ok(())
}
