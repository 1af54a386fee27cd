//! Window model and windowing configuration
//!
//! Windows are contiguous, non-overlapping (tumbling) slices of the stream,
//! produced in order with 1-based, strictly increasing indices. Window *i*
//! is only ever compared against window *i − 1*.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::stream::ReadAs;

/// Window unit policy
///
/// `Items` counts consumed stream items; `Hours` compares elapsed time from
/// the window's first reference timestamp; `Days` compares calendar-day
/// difference (not 24 h multiples).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowUnit {
    Items,
    Hours,
    Days,
}

impl FromStr for WindowUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "items" | "item" | "count" => Ok(WindowUnit::Items),
            "hours" | "hour" => Ok(WindowUnit::Hours),
            "days" | "day" => Ok(WindowUnit::Days),
            other => Err(Error::unknown_window_unit(other)),
        }
    }
}

/// Complete windowing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowingConfig {
    pub unit: WindowUnit,
    /// Unit size: item count, hours, or days depending on `unit`
    pub size: u64,
    pub read_as: ReadAs,
}

impl WindowingConfig {
    pub fn new(unit: WindowUnit, size: u64, read_as: ReadAs) -> crate::Result<Self> {
        if size == 0 {
            return Err(Error::Configuration(
                "Window unit size must be positive".to_string(),
            ));
        }
        Ok(Self {
            unit,
            size,
            read_as,
        })
    }

    /// Parse from string inputs, the boundary where unrecognized policies
    /// fail with a configuration error
    pub fn parse(unit: &str, size: u64, read_as: &str) -> crate::Result<Self> {
        Self::new(unit.parse()?, size, read_as.parse()?)
    }

    /// Short signature used to key per-run storage paths
    pub fn signature(&self) -> String {
        let unit = match self.unit {
            WindowUnit::Items => "items",
            WindowUnit::Hours => "hours",
            WindowUnit::Days => "days",
        };
        let read_as = match self.read_as {
            ReadAs::Trace => "trace",
            ReadAs::Event => "event",
        };
        format!("{unit}-{}-{read_as}", self.size)
    }
}

/// One closed window of the stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    /// 1-based sequence index, strictly increasing
    pub index: u64,
    /// Offset of the first stream item in this window (0-based)
    pub start_offset: u64,
    /// Offset one past the last stream item in this window
    pub end_offset: u64,
    /// Reference timestamp of the first item, when available
    pub start_ts: Option<DateTime<Utc>>,
    /// Reference timestamp of the last item, when available
    pub end_ts: Option<DateTime<Utc>>,
}

impl Window {
    /// Number of stream items in the window
    pub fn len(&self) -> u64 {
        self.end_offset - self.start_offset
    }

    pub fn is_empty(&self) -> bool {
        self.end_offset == self.start_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_unit_parsing() {
        assert_eq!("items".parse::<WindowUnit>().unwrap(), WindowUnit::Items);
        assert_eq!("Hours".parse::<WindowUnit>().unwrap(), WindowUnit::Hours);
        assert_eq!(" days ".parse::<WindowUnit>().unwrap(), WindowUnit::Days);

        let err = "weeks".parse::<WindowUnit>().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_config_rejects_zero_size() {
        assert!(WindowingConfig::new(WindowUnit::Items, 0, ReadAs::Trace).is_err());
    }

    #[test]
    fn test_config_parse_and_signature() {
        let cfg = WindowingConfig::parse("items", 100, "trace").unwrap();
        assert_eq!(cfg.signature(), "items-100-trace");

        assert!(WindowingConfig::parse("items", 100, "sample").is_err());
        assert!(WindowingConfig::parse("sliding", 100, "trace").is_err());
    }

    #[test]
    fn test_window_len() {
        let w = Window {
            index: 1,
            start_offset: 200,
            end_offset: 300,
            start_ts: None,
            end_ts: None,
        };
        assert_eq!(w.len(), 100);
        assert!(!w.is_empty());
    }
}
