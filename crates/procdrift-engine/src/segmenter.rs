//! Window segmentation
//!
//! Converts the ordered item stream into tumbling windows under one of the
//! three unit policies. The stream is consumed once, forward-only; each
//! closed window is handed to the caller's sink (which notifies the model
//! miner) before segmentation advances.
//!
//! Trailing items that do not fill or close a window are dropped, not
//! emitted as a partial window. This is a deliberate policy the property
//! tests pin down, not a bug.

use chrono::{DateTime, Datelike, Utc};
use log::debug;
use procdrift_core::{Error, Result, StreamItem, Window, WindowUnit, WindowingConfig};

/// True when `current` lies outside the window opened at `first`.
///
/// Hours: the elapsed time strictly exceeds `size` hours. Days: the
/// calendar-day difference strictly exceeds `size` days (a day window can
/// span midnight without closing; 23:00 and 01:00 are one day apart but
/// less than two).
fn closes_window(config: &WindowingConfig, first: DateTime<Utc>, current: DateTime<Utc>) -> bool {
    match config.unit {
        WindowUnit::Items => unreachable!("item windows close by count"),
        WindowUnit::Hours => {
            current.signed_duration_since(first) > chrono::Duration::hours(config.size as i64)
        }
        WindowUnit::Days => {
            let day_diff = current.date_naive().num_days_from_ce() as i64
                - first.date_naive().num_days_from_ce() as i64;
            day_diff > config.size as i64
        }
    }
}

struct Cursor {
    window_count: u64,
    window_start_offset: u64,
    first_ts: Option<DateTime<Utc>>,
    last_ts: Option<DateTime<Utc>>,
}

impl Cursor {
    fn close<F>(
        &mut self,
        buffer: &mut Vec<StreamItem>,
        end_offset: u64,
        on_window: &mut F,
    ) -> Result<()>
    where
        F: FnMut(&Window, &[StreamItem]) -> Result<()>,
    {
        self.window_count += 1;
        let window = Window {
            index: self.window_count,
            start_offset: self.window_start_offset,
            end_offset,
            start_ts: self.first_ts,
            end_ts: self.last_ts,
        };
        debug!(
            "window {} closed: offsets [{}, {}), {} items",
            window.index,
            window.start_offset,
            window.end_offset,
            buffer.len()
        );
        on_window(&window, buffer)?;
        buffer.clear();
        self.window_start_offset = end_offset;
        self.first_ts = None;
        self.last_ts = None;
        Ok(())
    }
}

/// Segment the stream into tumbling windows, invoking `on_window` for each
/// closed window with its sublog. Returns the final window count.
///
/// Window indices are 1-based and strictly increasing. Items under a
/// time-based policy must carry a reference timestamp; an item without one
/// fails the whole segmentation.
pub fn segment<F>(
    items: impl IntoIterator<Item = StreamItem>,
    config: &WindowingConfig,
    mut on_window: F,
) -> Result<u64>
where
    F: FnMut(&Window, &[StreamItem]) -> Result<()>,
{
    let mut offset = 0u64;
    let mut buffer: Vec<StreamItem> = Vec::new();
    let mut cursor = Cursor {
        window_count: 0,
        window_start_offset: 0,
        first_ts: None,
        last_ts: None,
    };

    for item in items {
        match config.unit {
            WindowUnit::Items => {
                buffer.push(item);
                offset += 1;
                if buffer.len() as u64 == config.size {
                    cursor.close(&mut buffer, offset, &mut on_window)?;
                }
            }
            WindowUnit::Hours | WindowUnit::Days => {
                let ts = item
                    .reference_timestamp()
                    .ok_or_else(|| Error::missing_timestamp(offset))?;

                if let Some(first) = cursor.first_ts {
                    if closes_window(config, first, ts) {
                        cursor.close(&mut buffer, offset, &mut on_window)?;
                    }
                }
                if cursor.first_ts.is_none() {
                    cursor.first_ts = Some(ts);
                }
                cursor.last_ts = Some(ts);
                buffer.push(item);
                offset += 1;
            }
        }
    }

    // Trailing remainder deliberately dropped
    if !buffer.is_empty() {
        debug!("dropping trailing partial window of {} items", buffer.len());
    }

    Ok(cursor.window_count)
}
