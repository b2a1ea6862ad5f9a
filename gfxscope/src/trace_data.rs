//! Trace document model
//!
//! The trace document is produced by an external decoder and handed to the
//! viewer read-only. Event lists are stored as `Arc<[Event]>` so that several
//! type-filtered views can alias the same list without copying it.
//!
//! ```text
//! {
//!   "duration": 1500000,
//!   "cpu":     { "events": [[[3, 0, 7], ...], ...], "threads": { "7": {"pid": 7, "name": "surfaceflinger"} } },
//!   "chrome":  { "buffers": [[[500, 10], ...]], "global_events": [...] },
//!   "android": { "buffers": [[[403, 10], ...]], "global_events": [...] },
//!   "views":   [ { "task_id": 2, "activity": "...", "buffers": [...], "global_events": [...] } ],
//!   "tasks":   { "2": { "title": "Maps", "icon": "<base64 png>" } }
//! }
//! ```

use log::info;
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::domain::{Micros, Pid, TaskId, Tid, TimelineError, TraceError};

/// Single timestamped event: `[type, timestamp, tid?]` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: u32,
    pub timestamp: Micros,
    /// Only CPU activity events carry a thread id
    pub tid: Option<Tid>,
}

impl Event {
    #[must_use]
    pub fn new(kind: u32, timestamp: Micros) -> Self {
        Self { kind, timestamp, tid: None }
    }

    #[must_use]
    pub fn with_tid(kind: u32, timestamp: Micros, tid: Tid) -> Self {
        Self { kind, timestamp, tid: Some(tid) }
    }
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EventVisitor;

        impl<'de> Visitor<'de> for EventVisitor {
            type Value = Event;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an event array [type, timestamp] or [type, timestamp, tid]")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Event, A::Error> {
                let kind: u32 =
                    seq.next_element()?.ok_or_else(|| de::Error::invalid_length(0, &self))?;
                // Producers may serialize large timestamps as doubles
                let timestamp: f64 =
                    seq.next_element()?.ok_or_else(|| de::Error::invalid_length(1, &self))?;
                let tid: Option<Tid> = seq.next_element()?;
                // Ignore any trailing fields from newer producers
                while seq.next_element::<de::IgnoredAny>()?.is_some() {}
                #[allow(clippy::cast_possible_truncation)]
                Ok(Event { kind, timestamp: timestamp as Micros, tid })
            }
        }

        deserializer.deserialize_seq(EventVisitor)
    }
}

/// Shared, immutable list of events sorted by timestamp.
pub type EventList = Arc<[Event]>;

fn empty_events() -> EventList {
    Arc::from(Vec::new())
}

/// Name and owning process of a thread.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadInfo {
    pub pid: Pid,
    pub name: String,
}

/// CPU scheduling events, one list per core, plus the thread table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CpuModel {
    #[serde(default)]
    pub events: Vec<EventList>,
    #[serde(default)]
    pub threads: HashMap<Tid, ThreadInfo>,
}

impl CpuModel {
    /// Look up a thread in the thread table.
    pub fn thread_info(&self, tid: Tid) -> Result<&ThreadInfo, TimelineError> {
        self.threads.get(&tid).ok_or(TimelineError::UnknownThread(tid))
    }
}

/// Per-buffer event lists and global events of one subsystem.
#[derive(Debug, Clone, Deserialize)]
pub struct EventsContainer {
    #[serde(default)]
    pub buffers: Vec<EventList>,
    #[serde(default = "empty_events")]
    pub global_events: EventList,
}

impl Default for EventsContainer {
    fn default() -> Self {
        Self { buffers: Vec::new(), global_events: empty_events() }
    }
}

/// Buffer events of one Android view (activity within a task).
#[derive(Debug, Clone, Deserialize)]
pub struct ViewModel {
    pub task_id: TaskId,
    #[serde(default)]
    pub activity: String,
    #[serde(default)]
    pub buffers: Vec<EventList>,
    #[serde(default = "empty_events")]
    pub global_events: EventList,
}

/// Task title and icon (base64 PNG payload).
#[derive(Debug, Clone, Deserialize)]
pub struct TaskInfo {
    pub title: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Whole trace document (immutable, loaded once)
#[derive(Debug, Clone, Deserialize)]
pub struct TraceModel {
    pub duration: Micros,
    #[serde(default)]
    pub cpu: CpuModel,
    #[serde(default)]
    pub chrome: EventsContainer,
    #[serde(default)]
    pub android: EventsContainer,
    #[serde(default)]
    pub views: Vec<ViewModel>,
    #[serde(default)]
    pub tasks: HashMap<TaskId, TaskInfo>,
}

impl TraceModel {
    /// Parse a trace document from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a trace document from a JSON string and validate event ordering
    pub fn from_json(json: &str) -> Result<Self, TraceError> {
        let model: TraceModel = serde_json::from_str(json)?;
        model.validate()?;
        info!(
            "Loaded trace: {:.1} ms, {} cpus, {} chrome buffers, {} android buffers, {} views",
            model.duration as f64 / 1000.0,
            model.cpu.events.len(),
            model.chrome.buffers.len(),
            model.android.buffers.len(),
            model.views.len()
        );
        Ok(model)
    }

    /// Every event list must be sorted by timestamp; searches depend on it.
    fn validate(&self) -> Result<(), TraceError> {
        if self.duration < 0 {
            return Err(TraceError::InvalidTrace(format!("negative duration {}", self.duration)));
        }
        let lists = self
            .cpu
            .events
            .iter()
            .enumerate()
            .map(|(i, events)| (format!("cpu core {i}"), events))
            .chain(Self::named_lists("chrome", &self.chrome.buffers, &self.chrome.global_events))
            .chain(Self::named_lists("android", &self.android.buffers, &self.android.global_events))
            .chain(self.views.iter().enumerate().flat_map(|(i, view)| {
                Self::named_lists(&format!("view {i}"), &view.buffers, &view.global_events)
            }));
        for (name, events) in lists {
            if let Some(pos) = events.windows(2).position(|w| w[0].timestamp > w[1].timestamp) {
                return Err(TraceError::InvalidTrace(format!(
                    "{name} is not sorted by timestamp at event {}",
                    pos + 1
                )));
            }
        }
        Ok(())
    }

    fn named_lists<'a>(
        prefix: &str,
        buffers: &'a [EventList],
        global_events: &'a EventList,
    ) -> Vec<(String, &'a EventList)> {
        buffers
            .iter()
            .enumerate()
            .map(|(i, events)| (format!("{prefix} buffer {i}"), events))
            .chain(std::iter::once((format!("{prefix} global events"), global_events)))
            .collect()
    }

    /// Title of a view section: task title when known, task id otherwise.
    #[must_use]
    pub fn view_title(&self, view: &ViewModel) -> (String, Option<&str>) {
        match self.tasks.get(&view.task_id) {
            Some(task) => (format!("{} - {}", task.title, view.activity), task.icon.as_deref()),
            None => (format!("Task #{} - {}", view.task_id, view.activity), None),
        }
    }
}
