//! Event log persistence.
//!
//! Events are appended to a JSONL (JSON Lines) file with file locking
//! so concurrent `caffeine` invocations never interleave partial lines.

use crate::{ConsumptionEvent, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Destination for newly recorded events
pub trait EventSink {
    fn append(&mut self, event: &ConsumptionEvent) -> Result<()>;
}

/// Range query over recorded events
pub trait EventSource {
    /// Events with `start <= timestamp <= end`, oldest first.
    fn fetch_events(&self, start: DateTime<Utc>, end: DateTime<Utc>)
        -> Result<Vec<ConsumptionEvent>>;
}

/// JSONL-backed event log
pub struct JsonlEventLog {
    path: PathBuf,
}

impl JsonlEventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl EventSink for JsonlEventLog {
    fn append(&mut self, event: &ConsumptionEvent) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(event)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended event {} ({}) to log", event.id, event.description);
        Ok(())
    }
}

impl EventSource for JsonlEventLog {
    fn fetch_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ConsumptionEvent>> {
        let mut events: Vec<_> = read_events(&self.path)?
            .into_iter()
            .filter(|e| e.timestamp >= start && e.timestamp <= end)
            .collect();
        events.sort_by_key(|e| e.timestamp);
        Ok(events)
    }
}

/// Read every event in a log file, in file order.
///
/// A missing file is an empty log. Lines that fail to parse are skipped with
/// a warning.
pub fn read_events(path: &Path) -> Result<Vec<ConsumptionEvent>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let mut reader = BufReader::new(&file);
    let mut events = Vec::new();
    let mut buf = Vec::new();
    let mut line_num = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_num += 1;
        if buf.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match serde_json::from_slice::<ConsumptionEvent>(&buf) {
            Ok(event) => events.push(event),
            Err(e) => {
                tracing::warn!("Skipping malformed event at line {}: {}", line_num, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} events from {:?}", events.len(), path);
    Ok(events)
}
