//! Exclude rules for source entries.
//!
//! Hidden entries (leading `.`) are always excluded. Extra glob patterns can be
//! added; they are matched against both the entry name and its path relative
//! to the source root. An excluded source entry is treated as absent: it is
//! not synced and does not protect a replica entry of the same name.

use std::ffi::OsStr;
use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};

/// Pattern matching for file exclusion.
#[derive(Debug, Clone)]
pub struct ExcludePatterns {
    /// Compiled glob set for matching.
    glob_set: GlobSet,
    /// Raw pattern strings (for display).
    patterns: Vec<String>,
}

impl Default for ExcludePatterns {
    fn default() -> Self {
        Self::new()
    }
}

impl ExcludePatterns {
    /// Only the hidden-entry rule, no globs.
    pub fn new() -> Self {
        Self {
            glob_set: GlobSet::empty(),
            patterns: Vec::new(),
        }
    }

    /// Hidden-entry rule plus the given globs.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self, globset::Error> {
        let mut builder = GlobSetBuilder::new();
        let mut pattern_list = Vec::new();

        for pattern in patterns {
            let pattern = pattern.as_ref();
            builder.add(Glob::new(pattern)?);
            pattern_list.push(pattern.to_string());
        }

        Ok(Self {
            glob_set: builder.build()?,
            patterns: pattern_list,
        })
    }

    /// Names starting with a dot
    pub fn is_hidden(name: &OsStr) -> bool {
        name.to_string_lossy().starts_with('.')
    }

    /// Whether a source entry should be left out of the pass.
    pub fn is_excluded(&self, name: &OsStr, relative: &Path) -> bool {
        if Self::is_hidden(name) {
            return true;
        }
        if self.patterns.is_empty() {
            return false;
        }
        self.glob_set.is_match(Path::new(name)) || self.glob_set.is_match(relative)
    }

    /// User patterns (the hidden rule is implicit)
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}
