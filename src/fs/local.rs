use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use filetime::FileTime;

use crate::fs::backend::Backend;
use crate::fs::types::{DirEntry, EntryKind};

/// Local filesystem backend
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    fn kind_of(metadata: io::Result<fs::Metadata>) -> io::Result<EntryKind> {
        match metadata {
            Ok(metadata) => Ok(EntryKind::from_file_type(metadata.file_type())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(EntryKind::Missing),
            Err(e) => Err(e),
        }
    }
}

impl Backend for LocalFs {
    fn kind(&self, path: &Path) -> io::Result<EntryKind> {
        Self::kind_of(fs::symlink_metadata(path))
    }

    fn resolve_kind(&self, path: &Path) -> io::Result<EntryKind> {
        Self::kind_of(fs::metadata(path))
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();

        for entry in fs::read_dir(path)? {
            let entry = entry?;
            // DirEntry::file_type does not traverse symlinks
            let kind = EntryKind::from_file_type(entry.file_type()?);
            entries.push(DirEntry::new(entry.file_name(), kind));
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<u64> {
        let bytes = fs::copy(from, to)?;

        let metadata = fs::metadata(from)?;
        let atime = FileTime::from_last_access_time(&metadata);
        let mtime = FileTime::from_last_modification_time(&metadata);
        filetime::set_file_times(to, atime, mtime)?;

        Ok(bytes)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        fs::read_link(path)
    }

    #[cfg(unix)]
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        std::os::unix::fs::symlink(target, link)
    }

    #[cfg(windows)]
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        // Windows needs to know the target kind; relative targets resolve
        // against the link's parent directory
        let resolved = match link.parent() {
            Some(parent) if target.is_relative() => parent.join(target),
            _ => target.to_path_buf(),
        };
        if resolved.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        }
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(fs::File::open(path)?))
    }
}
