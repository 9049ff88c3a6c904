use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::fs::types::{DirEntry, EntryKind};

/// Filesystem primitives the sync engine is built on.
///
/// Every read and write the engine performs goes through this trait, so a
/// pass can be run against a wrapper that injects failures or counts writes.
/// Implementations report raw `io::Error`s; the engine attaches path and
/// operation context.
pub trait Backend: Send + Sync {
    /// Kind of `path` without following symlinks; `Missing` if absent
    fn kind(&self, path: &Path) -> io::Result<EntryKind>;

    /// Kind of `path` after following symlinks; `Missing` if absent or dangling
    fn resolve_kind(&self, path: &Path) -> io::Result<EntryKind>;

    /// Children of a directory, sorted by name
    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Create a directory and any missing parents
    fn create_dir(&self, path: &Path) -> io::Result<()>;

    /// Copy file contents and timestamps, returning the number of bytes copied
    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<u64>;

    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;

    /// Create a symlink at `link` pointing to `target`
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Remove a directory and everything beneath it
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Open a file for streaming reads
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;
}
