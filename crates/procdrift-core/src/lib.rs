//! Core types for process concept-drift analysis
//!
//! This crate provides the shared vocabulary of the procdrift workspace:
//! the event/trace stream model, window and windowing-configuration types,
//! the persisted record types, per-run storage paths, and the unified error
//! taxonomy.
//!
//! Configuration inputs are parsed at the string boundary (`FromStr` on
//! [`WindowUnit`] and [`ReadAs`]); past that boundary invalid policies are
//! unrepresentable.

pub mod error;
pub mod paths;
pub mod record;
pub mod stream;
pub mod window;

// Re-export core types
pub use error::{Error, Result};
pub use paths::RunPaths;
pub use record::{ChangePointRecord, MetricResult, MetricValue};
pub use stream::{stream_items, Event, ReadAs, StreamItem, Trace};
pub use window::{Window, WindowUnit, WindowingConfig};
