//! Event and trace stream model
//!
//! A process log is a totally ordered sequence of traces (cases), each a
//! sequence of events. The segmenter consumes the log as a flat stream of
//! [`StreamItem`]s, whose granularity is chosen by [`ReadAs`].

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One event of a running case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Activity label
    pub activity: String,
    /// Completion timestamp
    pub timestamp: DateTime<Utc>,
    /// Numeric event attributes (e.g. duration, cost), keyed by name
    #[serde(default)]
    pub attributes: BTreeMap<String, f64>,
}

impl Event {
    pub fn new(activity: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            activity: activity.into(),
            timestamp,
            attributes: BTreeMap::new(),
        }
    }

    /// Attach a numeric attribute, builder-style
    pub fn with_attribute(mut self, name: impl Into<String>, value: f64) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }
}

/// One case: an ordered sequence of events sharing a case identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub case_id: String,
    pub events: Vec<Event>,
}

impl Trace {
    pub fn new(case_id: impl Into<String>, events: Vec<Event>) -> Self {
        Self {
            case_id: case_id.into(),
            events,
        }
    }

    /// Reference timestamp of the trace: its first event's timestamp
    pub fn start_timestamp(&self) -> Option<DateTime<Utc>> {
        self.events.first().map(|e| e.timestamp)
    }
}

/// Stream granularity: segment by whole traces or by individual events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadAs {
    Trace,
    Event,
}

impl FromStr for ReadAs {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" | "traces" => Ok(ReadAs::Trace),
            "event" | "events" => Ok(ReadAs::Event),
            other => Err(Error::unknown_read_as(other)),
        }
    }
}

/// One item of the ordered stream the segmenter consumes
#[derive(Debug, Clone, PartialEq)]
pub enum StreamItem {
    Trace(Trace),
    Event(Event),
}

impl StreamItem {
    /// Reference timestamp used by time-based window policies.
    ///
    /// Trace items use their first event's timestamp; event items their own.
    /// `None` only for empty traces.
    pub fn reference_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            StreamItem::Trace(t) => t.start_timestamp(),
            StreamItem::Event(e) => Some(e.timestamp),
        }
    }

    /// Events carried by this item, in order
    pub fn events(&self) -> &[Event] {
        match self {
            StreamItem::Trace(t) => &t.events,
            StreamItem::Event(e) => std::slice::from_ref(e),
        }
    }
}

/// Flatten a trace log into the stream the segmenter consumes
pub fn stream_items(traces: Vec<Trace>, read_as: ReadAs) -> Vec<StreamItem> {
    match read_as {
        ReadAs::Trace => traces.into_iter().map(StreamItem::Trace).collect(),
        ReadAs::Event => traces
            .into_iter()
            .flat_map(|t| t.events)
            .map(StreamItem::Event)
            .collect(),
    }
}
