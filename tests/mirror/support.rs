// Shared fixtures for mirror tests

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::TempDir;
use treemirror::fs::{Backend, DirEntry, EntryKind, LocalFs};
use treemirror::sync::{MirrorEngine, RecordingSink};

/// Local filesystem with injectable failures and a write counter.
///
/// Failures are keyed by path suffix, so `"sub"` matches both `src/sub` and
/// `dst/sub` while `"dst/sub"` matches only the replica side.
#[derive(Default)]
pub struct FaultyFs {
    inner: LocalFs,
    fail_copy: Vec<PathBuf>,
    fail_open: Vec<PathBuf>,
    fail_list: Vec<PathBuf>,
    fail_create_dir: Vec<PathBuf>,
    fail_remove: Vec<PathBuf>,
    copies: AtomicUsize,
}

impl FaultyFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies from a matching source fail
    pub fn failing_copy(mut self, suffix: &str) -> Self {
        self.fail_copy.push(PathBuf::from(suffix));
        self
    }

    /// Opening a matching file for reading fails
    pub fn failing_open(mut self, suffix: &str) -> Self {
        self.fail_open.push(PathBuf::from(suffix));
        self
    }

    /// Listing a matching directory fails
    pub fn failing_list(mut self, suffix: &str) -> Self {
        self.fail_list.push(PathBuf::from(suffix));
        self
    }

    /// Creating a matching directory fails
    pub fn failing_create_dir(mut self, suffix: &str) -> Self {
        self.fail_create_dir.push(PathBuf::from(suffix));
        self
    }

    /// Removing a matching file or tree fails
    pub fn failing_remove(mut self, suffix: &str) -> Self {
        self.fail_remove.push(PathBuf::from(suffix));
        self
    }

    pub fn copies(&self) -> usize {
        self.copies.load(Ordering::SeqCst)
    }

    fn check(rules: &[PathBuf], path: &Path, what: &str) -> io::Result<()> {
        if rules.iter().any(|suffix| path.ends_with(suffix)) {
            let message = format!("simulated {what} failure");
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, message));
        }
        Ok(())
    }
}

impl Backend for FaultyFs {
    fn kind(&self, path: &Path) -> io::Result<EntryKind> {
        self.inner.kind(path)
    }

    fn resolve_kind(&self, path: &Path) -> io::Result<EntryKind> {
        self.inner.resolve_kind(path)
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        Self::check(&self.fail_list, path, "list")?;
        self.inner.list_dir(path)
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        Self::check(&self.fail_create_dir, path, "create directory")?;
        self.inner.create_dir(path)
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<u64> {
        Self::check(&self.fail_copy, from, "copy")?;
        self.copies.fetch_add(1, Ordering::SeqCst);
        self.inner.copy_file(from, to)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        self.inner.read_link(path)
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        self.inner.symlink(target, link)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        Self::check(&self.fail_remove, path, "remove")?;
        self.inner.remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        Self::check(&self.fail_remove, path, "remove")?;
        self.inner.remove_dir_all(path)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        Self::check(&self.fail_open, path, "read")?;
        self.inner.open(path)
    }
}

/// A temp directory holding `src/` and `dst/`
pub struct Fixture {
    _dir: TempDir,
    pub source: PathBuf,
    pub replica: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src");
        let replica = dir.path().join("dst");
        fs::create_dir(&source).unwrap();
        Self {
            _dir: dir,
            source,
            replica,
        }
    }

    pub fn write_source(&self, relative: &str, content: &str) {
        write(&self.source.join(relative), content);
    }

    pub fn write_replica(&self, relative: &str, content: &str) {
        write(&self.replica.join(relative), content);
    }

    pub fn replica_content(&self, relative: &str) -> String {
        fs::read_to_string(self.replica.join(relative)).unwrap()
    }

    pub fn engine(&self, backend: Arc<FaultyFs>) -> (MirrorEngine, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let engine = MirrorEngine::new(&self.source, &self.replica)
            .with_backend(backend)
            .with_sink(sink.clone());
        (engine, sink)
    }
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Every path below `root`, relative and sorted
pub fn tree(root: &Path) -> Vec<String> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
        for entry in fs::read_dir(dir).unwrap() {
            let entry = entry.unwrap();
            let path = entry.path();
            let relative = path
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            out.push(relative);
            if entry.file_type().unwrap().is_dir() {
                walk(root, &path, out);
            }
        }
    }

    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}
