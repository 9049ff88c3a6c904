//! Mirror engine: one-way reconciliation of a replica tree against a source.
//!
//! A pass walks the source depth-first. Leaves go to the entry syncer
//! (see `entry.rs`), subdirectories recurse, and once a directory's children
//! are settled its replica-only entries are pruned. Failures are recorded per
//! entry and never stop the walk; only problems with the roots themselves
//! fail the pass.

use std::collections::HashSet;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::fs::{Backend, EntryKind, LocalFs};
use crate::hash::Fingerprinter;
use crate::sync::error::{PassError, SyncError};
use crate::sync::exclude::ExcludePatterns;
use crate::sync::report::{EventSink, SyncAction, SyncEvent, SyncStats, TracingSink};

/// Sync engine for one source/replica pair.
pub struct MirrorEngine {
    source_root: PathBuf,
    replica_root: PathBuf,
    pub(crate) backend: Arc<dyn Backend>,
    sink: Arc<dyn EventSink>,
    pub(crate) fingerprinter: Fingerprinter,
    exclude: ExcludePatterns,
}

impl MirrorEngine {
    /// Engine over the local filesystem, reporting through `tracing`.
    pub fn new(source_root: impl Into<PathBuf>, replica_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            replica_root: replica_root.into(),
            backend: Arc::new(LocalFs),
            sink: Arc::new(TracingSink),
            fingerprinter: Fingerprinter::new(),
            exclude: ExcludePatterns::new(),
        }
    }

    pub fn with_backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_fingerprinter(mut self, fingerprinter: Fingerprinter) -> Self {
        self.fingerprinter = fingerprinter;
        self
    }

    pub fn with_exclude(mut self, exclude: ExcludePatterns) -> Self {
        self.exclude = exclude;
        self
    }

    /// Run one full pass.
    ///
    /// The source root decides the shape of the pass: a directory is
    /// reconciled as a tree, a regular file as a single entry. Anything else
    /// is a pass-level error.
    ///
    /// Both roots are inspected through symlinks, and the replica root is
    /// never removed. A file root whose replica root is a directory is copied
    /// into that directory under its own name.
    pub fn run_pass(&self) -> Result<SyncStats, PassError> {
        let mut stats = SyncStats::default();

        let root_kind = self
            .backend
            .resolve_kind(&self.source_root)
            .map_err(|source| PassError::Inspect {
                path: self.source_root.clone(),
                source,
            })?;

        match root_kind {
            EntryKind::Directory => {
                let replica_kind = self.replica_root_kind()?;
                if replica_kind.exists() && !replica_kind.is_dir() {
                    return Err(PassError::ReplicaRootNotDir {
                        path: self.replica_root.clone(),
                    });
                }
                self.reconcile_dir(
                    &self.source_root,
                    &self.replica_root,
                    Path::new(""),
                    &mut stats,
                );
            }
            EntryKind::RegularFile | EntryKind::Symlink => {
                let replica = match (self.replica_root_kind()?, self.source_root.file_name()) {
                    (EntryKind::Directory, Some(name)) => self.replica_root.join(name),
                    _ => self.replica_root.clone(),
                };
                self.sync_leaf(&self.source_root, &replica, &mut stats);
            }
            EntryKind::Missing => {
                return Err(PassError::SourceMissing {
                    path: self.source_root.clone(),
                })
            }
            EntryKind::Other => {
                return Err(PassError::UnsupportedRoot {
                    path: self.source_root.clone(),
                })
            }
        }

        Ok(stats)
    }

    fn replica_root_kind(&self) -> Result<EntryKind, PassError> {
        self.backend
            .resolve_kind(&self.replica_root)
            .map_err(|source| PassError::InspectReplica {
                path: self.replica_root.clone(),
                source,
            })
    }

    /// Make `replica_dir` match `source_dir`, recursively.
    pub fn reconcile(&self, source_dir: &Path, replica_dir: &Path) -> SyncStats {
        let mut stats = SyncStats::default();
        let relative = source_dir
            .strip_prefix(&self.source_root)
            .unwrap_or(Path::new(""))
            .to_path_buf();
        self.reconcile_dir(source_dir, replica_dir, &relative, &mut stats);
        stats
    }

    // `relative` is `source_dir` below the source root, used for exclude matching
    fn reconcile_dir(
        &self,
        source_dir: &Path,
        replica_dir: &Path,
        relative: &Path,
        stats: &mut SyncStats,
    ) {
        let is_root = relative.as_os_str().is_empty();
        if let Err(e) = self.ensure_dir(replica_dir, is_root, stats) {
            self.fail(stats, e);
            return;
        }

        let entries = match self.backend.list_dir(source_dir) {
            Ok(entries) => entries,
            Err(e) => {
                self.fail(stats, SyncError::io("list directory", source_dir, e));
                return;
            }
        };

        let mut kept: HashSet<OsString> = HashSet::with_capacity(entries.len());

        for entry in entries {
            let child_relative = relative.join(&entry.name);
            if self.exclude.is_excluded(&entry.name, &child_relative) {
                tracing::trace!(path = %child_relative.display(), "excluded");
                continue;
            }

            let source_path = source_dir.join(&entry.name);
            let replica_path = replica_dir.join(&entry.name);

            if entry.kind.is_dir() {
                self.reconcile_dir(&source_path, &replica_path, &child_relative, stats);
            } else {
                self.sync_leaf(&source_path, &replica_path, stats);
            }

            kept.insert(entry.name);
        }

        self.prune(replica_dir, &kept, stats);
    }

    /// Make sure `replica_dir` is a directory, replacing a non-directory in
    /// its way. A root is looked at through symlinks, so a link to a
    /// directory is kept and mirrored into.
    fn ensure_dir(
        &self,
        replica_dir: &Path,
        is_root: bool,
        stats: &mut SyncStats,
    ) -> Result<(), SyncError> {
        let kind = if is_root {
            self.backend.resolve_kind(replica_dir)
        } else {
            self.backend.kind(replica_dir)
        }
        .map_err(|e| SyncError::io("inspect", replica_dir, e))?;

        match kind {
            EntryKind::Directory => return Ok(()),
            EntryKind::Missing => {}
            _ if is_root => {
                let err = io::Error::new(io::ErrorKind::AlreadyExists, "not a directory");
                return Err(SyncError::io("mirror into", replica_dir, err));
            }
            EntryKind::RegularFile | EntryKind::Symlink | EntryKind::Other => {
                self.backend
                    .remove_file(replica_dir)
                    .map_err(|e| SyncError::io("remove", replica_dir, e))?;
                self.emit(
                    stats,
                    SyncEvent::Applied {
                        action: SyncAction::Delete,
                        kind,
                        source: None,
                        replica: replica_dir.to_path_buf(),
                    },
                );
            }
        }

        self.backend
            .create_dir(replica_dir)
            .map_err(|e| SyncError::io("create directory", replica_dir, e))?;
        self.emit(
            stats,
            SyncEvent::Applied {
                action: SyncAction::CreateDir,
                kind: EntryKind::Directory,
                source: None,
                replica: replica_dir.to_path_buf(),
            },
        );
        Ok(())
    }

    /// Delete replica entries whose names were not kept on the source side.
    fn prune(&self, replica_dir: &Path, kept: &HashSet<OsString>, stats: &mut SyncStats) {
        let entries = match self.backend.list_dir(replica_dir) {
            Ok(entries) => entries,
            Err(e) => {
                self.fail(stats, SyncError::io("list directory", replica_dir, e));
                return;
            }
        };

        for entry in entries {
            if kept.contains(&entry.name) {
                continue;
            }

            let path = replica_dir.join(&entry.name);
            let removed = if entry.kind.is_dir() {
                self.backend.remove_dir_all(&path)
            } else {
                self.backend.remove_file(&path)
            };

            match removed {
                Ok(()) => self.emit(
                    stats,
                    SyncEvent::Applied {
                        action: SyncAction::Delete,
                        kind: entry.kind,
                        source: None,
                        replica: path,
                    },
                ),
                Err(e) => self.fail(stats, SyncError::io("remove", &path, e)),
            }
        }
    }

    /// Sync one non-directory pair and record the outcome.
    fn sync_leaf(&self, source: &Path, replica: &Path, stats: &mut SyncStats) {
        match self.sync_entry(source, replica) {
            Ok(outcome) => {
                stats.bytes_copied += outcome.bytes_copied;
                self.emit(
                    stats,
                    SyncEvent::Applied {
                        action: outcome.action,
                        kind: outcome.kind,
                        source: Some(source.to_path_buf()),
                        replica: replica.to_path_buf(),
                    },
                );
            }
            Err(e) => self.fail(stats, e),
        }
    }

    fn emit(&self, stats: &mut SyncStats, event: SyncEvent) {
        stats.count(&event);
        self.sink.record(&event);
    }

    fn fail(&self, stats: &mut SyncStats, error: SyncError) {
        let event = SyncEvent::Failed {
            path: error.path().to_path_buf(),
            message: error.to_string(),
        };
        self.emit(stats, event);
    }
}
