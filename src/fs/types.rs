use std::ffi::OsString;
use std::fs::FileType;

/// What a path currently is on disk, inspected without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    RegularFile,
    Symlink,
    Directory,
    Missing,
    /// FIFOs, sockets, device nodes
    Other,
}

impl EntryKind {
    pub fn from_file_type(file_type: FileType) -> Self {
        if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::RegularFile
        } else {
            EntryKind::Other
        }
    }

    pub fn exists(&self) -> bool {
        !matches!(self, EntryKind::Missing)
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, EntryKind::Directory)
    }

    /// Short label for log output
    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::RegularFile => "file",
            EntryKind::Symlink => "symlink",
            EntryKind::Directory => "directory",
            EntryKind::Missing => "missing",
            EntryKind::Other => "special file",
        }
    }
}

/// One child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: OsString,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn new(name: impl Into<OsString>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}
