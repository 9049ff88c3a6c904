//! Entry syncer: reconciles one file or symlink.

use std::path::Path;

use crate::fs::EntryKind;
use crate::sync::engine::MirrorEngine;
use crate::sync::error::SyncError;
use crate::sync::report::SyncAction;

/// What happened to a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryOutcome {
    pub action: SyncAction,
    /// Kind of the source entry
    pub kind: EntryKind,
    pub bytes_copied: u64,
}

impl EntryOutcome {
    fn new(action: SyncAction, kind: EntryKind, bytes_copied: u64) -> Self {
        Self {
            action,
            kind,
            bytes_copied,
        }
    }
}

impl MirrorEngine {
    /// Make `replica` match the file or symlink at `source`.
    ///
    /// Regular files are compared by fingerprint only. If either side cannot
    /// be fingerprinted the replica is left alone and the error returned.
    /// Symlinks are compared by target and never dereferenced. A replica
    /// entry of the wrong kind is removed and recreated.
    pub fn sync_entry(&self, source: &Path, replica: &Path) -> Result<EntryOutcome, SyncError> {
        let source_kind = self
            .backend
            .kind(source)
            .map_err(|e| SyncError::io("inspect", source, e))?;

        match source_kind {
            EntryKind::RegularFile | EntryKind::Symlink => {}
            EntryKind::Missing => {
                return Err(SyncError::SourceVanished {
                    path: source.to_path_buf(),
                })
            }
            EntryKind::Directory => {
                return Err(SyncError::NotAnEntry {
                    path: source.to_path_buf(),
                })
            }
            EntryKind::Other => {
                return Err(SyncError::Unsupported {
                    path: source.to_path_buf(),
                })
            }
        }

        let replica_kind = self
            .backend
            .kind(replica)
            .map_err(|e| SyncError::io("inspect", replica, e))?;

        if replica_kind == EntryKind::Missing {
            return self.create(source, source_kind, replica);
        }

        if replica_kind != source_kind {
            self.remove(replica, replica_kind)?;
            let created = self.create(source, source_kind, replica)?;
            return Ok(EntryOutcome::new(
                SyncAction::Update,
                source_kind,
                created.bytes_copied,
            ));
        }

        match source_kind {
            EntryKind::Symlink => self.update_symlink(source, replica),
            _ => self.update_file(source, replica),
        }
    }

    fn create(
        &self,
        source: &Path,
        source_kind: EntryKind,
        replica: &Path,
    ) -> Result<EntryOutcome, SyncError> {
        if source_kind == EntryKind::Symlink {
            let target = self
                .backend
                .read_link(source)
                .map_err(|e| SyncError::io("read link", source, e))?;
            self.backend
                .symlink(&target, replica)
                .map_err(|e| SyncError::io("create symlink", replica, e))?;
            return Ok(EntryOutcome::new(SyncAction::CreateSymlink, source_kind, 0));
        }

        let bytes = self
            .backend
            .copy_file(source, replica)
            .map_err(|e| SyncError::io("copy", source, e))?;
        Ok(EntryOutcome::new(SyncAction::Create, source_kind, bytes))
    }

    fn update_file(&self, source: &Path, replica: &Path) -> Result<EntryOutcome, SyncError> {
        let source_fp = self.fingerprinter.fingerprint(&*self.backend, source)?;
        let replica_fp = self.fingerprinter.fingerprint(&*self.backend, replica)?;

        if source_fp == replica_fp {
            return Ok(EntryOutcome::new(SyncAction::Skip, EntryKind::RegularFile, 0));
        }

        let bytes = self
            .backend
            .copy_file(source, replica)
            .map_err(|e| SyncError::io("copy", source, e))?;
        Ok(EntryOutcome::new(SyncAction::Update, EntryKind::RegularFile, bytes))
    }

    fn update_symlink(&self, source: &Path, replica: &Path) -> Result<EntryOutcome, SyncError> {
        let target = self
            .backend
            .read_link(source)
            .map_err(|e| SyncError::io("read link", source, e))?;
        let current = self
            .backend
            .read_link(replica)
            .map_err(|e| SyncError::io("read link", replica, e))?;

        if target == current {
            return Ok(EntryOutcome::new(SyncAction::Skip, EntryKind::Symlink, 0));
        }

        self.backend
            .remove_file(replica)
            .map_err(|e| SyncError::io("remove", replica, e))?;
        self.backend
            .symlink(&target, replica)
            .map_err(|e| SyncError::io("create symlink", replica, e))?;
        Ok(EntryOutcome::new(SyncAction::Update, EntryKind::Symlink, 0))
    }

    fn remove(&self, path: &Path, kind: EntryKind) -> Result<(), SyncError> {
        let removed = if kind.is_dir() {
            self.backend.remove_dir_all(path)
        } else {
            self.backend.remove_file(path)
        };
        removed.map_err(|e| SyncError::io("remove", path, e))
    }
}
