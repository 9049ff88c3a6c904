// Fingerprint error type
// Keeps the failing path and the operation so callers can log and skip the entry

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure to compute a fingerprint.
///
/// Never treated as "equal" or "different": the caller decides whether to
/// skip the entry.
#[derive(Debug, Error)]
pub enum HashError {
    #[error("file not found while {operation}: {}", path.display())]
    NotFound { path: PathBuf, operation: String },

    #[error("permission denied while {operation}: {}", path.display())]
    PermissionDenied { path: PathBuf, operation: String },

    #[error("I/O error while {operation} {}: {source}", path.display())]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl HashError {
    /// Classify an io::Error, keeping the operation and path for context
    pub fn from_io_error(err: io::Error, operation: &str, path: &Path) -> Self {
        let path = path.to_path_buf();
        let operation = operation.to_string();
        match err.kind() {
            io::ErrorKind::NotFound => HashError::NotFound { path, operation },
            io::ErrorKind::PermissionDenied => HashError::PermissionDenied { path, operation },
            _ => HashError::Io {
                path,
                operation,
                source: err,
            },
        }
    }

    /// Path whose fingerprint could not be computed
    pub fn path(&self) -> &Path {
        match self {
            HashError::NotFound { path, .. }
            | HashError::PermissionDenied { path, .. }
            | HashError::Io { path, .. } => path,
        }
    }
}
