//! One-way mirroring engine and its scheduler.
//!
//! The engine reconciles a replica tree against a source tree using content
//! fingerprints; the scheduler repeats that on an interval with backoff.

pub mod engine;
pub mod entry;
pub mod error;
pub mod exclude;
pub mod report;
pub mod scheduler;

pub use engine::MirrorEngine;
pub use entry::EntryOutcome;
pub use error::{PassError, SyncError};
pub use exclude::ExcludePatterns;
pub use report::{EventSink, RecordingSink, SyncAction, SyncEvent, SyncStats, TracingSink};
pub use scheduler::{Backoff, Scheduler, SchedulerState, StopReason, DEFAULT_MAX_BACKOFF};
