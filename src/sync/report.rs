//! Pass outcomes and the sink they are reported to.
//!
//! The engine never logs directly: every applied action and every isolated
//! failure becomes a [`SyncEvent`] handed to an [`EventSink`]. Production code
//! uses [`TracingSink`]; tests capture events with [`RecordingSink`].

use std::path::PathBuf;
use std::sync::Mutex;

use crate::fs::EntryKind;

/// Decision taken for one path pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Replica was missing; file copied.
    Create,
    /// Replica was missing; symlink recreated with the same target.
    CreateSymlink,
    /// Replica directory had to be created.
    CreateDir,
    /// Replica differed and was rewritten.
    Update,
    /// Replica entry had no source counterpart and was removed.
    Delete,
    /// Already identical.
    Skip,
}

impl SyncAction {
    /// Whether this action changed the replica
    pub fn is_mutation(&self) -> bool {
        !matches!(self, SyncAction::Skip)
    }
}

/// Something that happened during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    Applied {
        action: SyncAction,
        /// Kind of the entry acted on (the source's, or the replica's for deletes)
        kind: EntryKind,
        source: Option<PathBuf>,
        replica: PathBuf,
    },
    Failed {
        path: PathBuf,
        message: String,
    },
}

/// Receiver for pass events.
pub trait EventSink: Send + Sync {
    fn record(&self, event: &SyncEvent);
}

/// Forwards events to `tracing`: INFO for changes, ERROR for failures,
/// TRACE for unchanged entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &SyncEvent) {
        match event {
            SyncEvent::Applied {
                action,
                kind,
                source,
                replica,
            } => {
                let source = source
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                let replica = replica.display();
                match action {
                    SyncAction::Create => {
                        tracing::info!(%source, %replica, "copied new file")
                    }
                    SyncAction::CreateSymlink => {
                        tracing::info!(%source, %replica, "created symlink")
                    }
                    SyncAction::CreateDir => {
                        tracing::info!(%replica, "created directory")
                    }
                    SyncAction::Update => {
                        tracing::info!(%source, %replica, kind = kind.label(), "updated")
                    }
                    SyncAction::Delete => {
                        tracing::info!(path = %replica, kind = kind.label(), "removed")
                    }
                    SyncAction::Skip => {
                        tracing::trace!(%replica, "unchanged")
                    }
                }
            }
            SyncEvent::Failed { path, message } => {
                tracing::error!(path = %path.display(), error = %message, "sync failed")
            }
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SyncEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SyncEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Applied actions, skips included
    pub fn actions(&self) -> Vec<(SyncAction, PathBuf)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SyncEvent::Applied {
                    action, replica, ..
                } => Some((action, replica)),
                SyncEvent::Failed { .. } => None,
            })
            .collect()
    }

    /// Applied actions that changed the replica
    pub fn mutations(&self) -> Vec<(SyncAction, PathBuf)> {
        self.actions()
            .into_iter()
            .filter(|(action, _)| action.is_mutation())
            .collect()
    }

    pub fn failures(&self) -> Vec<PathBuf> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SyncEvent::Failed { path, .. } => Some(path),
                SyncEvent::Applied { .. } => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: &SyncEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Per-pass counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub files_created: usize,
    pub files_updated: usize,
    pub symlinks_created: usize,
    pub dirs_created: usize,
    pub entries_deleted: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub bytes_copied: u64,
}

impl SyncStats {
    pub(crate) fn count(&mut self, event: &SyncEvent) {
        match event {
            SyncEvent::Applied { action, .. } => match action {
                SyncAction::Create => self.files_created += 1,
                SyncAction::CreateSymlink => self.symlinks_created += 1,
                SyncAction::CreateDir => self.dirs_created += 1,
                SyncAction::Update => self.files_updated += 1,
                SyncAction::Delete => self.entries_deleted += 1,
                SyncAction::Skip => self.unchanged += 1,
            },
            SyncEvent::Failed { .. } => self.failed += 1,
        }
    }

    /// Number of replica mutations in the pass
    pub fn changes(&self) -> usize {
        self.files_created
            + self.files_updated
            + self.symlinks_created
            + self.dirs_created
            + self.entries_deleted
    }
}
