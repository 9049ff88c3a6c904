//! Error types for the sync engine.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::hash::HashError;

/// Failure confined to a single entry or directory. Logged, then the pass
/// moves on to the next sibling.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Source disappeared between the parent listing and the sync.
    #[error("source vanished before it could be synced: {}", path.display())]
    SourceVanished { path: PathBuf },

    /// Directories are reconciled as trees, not as single entries.
    #[error("not a file or symlink: {}", path.display())]
    NotAnEntry { path: PathBuf },

    /// FIFOs, sockets and device nodes are not mirrored.
    #[error("unsupported file type: {}", path.display())]
    Unsupported { path: PathBuf },

    /// Content could not be fingerprinted; the replica is left untouched.
    #[error("cannot compare contents: {0}")]
    Fingerprint(#[from] HashError),

    /// A filesystem primitive failed.
    #[error("failed to {op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SyncError {
    pub fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        SyncError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Path the failure is attributed to
    pub fn path(&self) -> &Path {
        match self {
            SyncError::SourceVanished { path }
            | SyncError::NotAnEntry { path }
            | SyncError::Unsupported { path }
            | SyncError::Io { path, .. } => path,
            SyncError::Fingerprint(e) => e.path(),
        }
    }
}

/// Failure of a whole pass. Caught by the scheduler, which backs off.
#[derive(Debug, Error)]
pub enum PassError {
    #[error("source root does not exist: {}", path.display())]
    SourceMissing { path: PathBuf },

    #[error("source root is neither a file nor a directory: {}", path.display())]
    UnsupportedRoot { path: PathBuf },

    #[error("cannot inspect source root {}: {source}", path.display())]
    Inspect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot inspect replica root {}: {source}", path.display())]
    InspectReplica {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A tree is never mirrored over a file.
    #[error("replica root exists and is not a directory: {}", path.display())]
    ReplicaRootNotDir { path: PathBuf },

    #[error("sync pass aborted: {0}")]
    Aborted(String),
}
