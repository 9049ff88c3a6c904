use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::hash::DEFAULT_CHUNK_SIZE;
use crate::sync::DEFAULT_MAX_BACKOFF;

/// Contents of the optional TOML config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub general: GeneralConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    #[serde(default = "default_max_backoff")]
    pub max_backoff_secs: u64,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            max_backoff_secs: default_max_backoff(),
            chunk_size: default_chunk_size(),
            exclude: Vec::new(),
        }
    }
}

fn default_max_backoff() -> u64 {
    DEFAULT_MAX_BACKOFF.as_secs()
}
fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

/// Settings given on the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub max_backoff_secs: Option<u64>,
    pub chunk_size: Option<usize>,
    pub exclude: Vec<String>,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    pub source: PathBuf,
    pub replica: PathBuf,
    pub interval: Duration,
    pub max_backoff: Duration,
    pub chunk_size: usize,
    pub exclude: Vec<String>,
    pub log_file: PathBuf,
}

impl MirrorConfig {
    /// Merge file settings with command-line overrides. Command-line values
    /// win; exclude lists are concatenated.
    pub fn resolve(
        source: PathBuf,
        replica: PathBuf,
        interval_secs: u64,
        log_file: PathBuf,
        file: FileConfig,
        overrides: Overrides,
    ) -> Result<Self> {
        if interval_secs == 0 {
            anyhow::bail!("interval must be at least one second");
        }

        let general = file.general;
        let chunk_size = overrides.chunk_size.unwrap_or(general.chunk_size);
        if chunk_size == 0 {
            anyhow::bail!("chunk_size must be greater than zero");
        }

        check_disjoint(&source, &replica)?;

        let interval = Duration::from_secs(interval_secs);
        let max_backoff = Duration::from_secs(
            overrides
                .max_backoff_secs
                .unwrap_or(general.max_backoff_secs),
        )
        .max(interval);

        let mut exclude = general.exclude;
        exclude.extend(overrides.exclude);

        Ok(Self {
            source,
            replica,
            interval,
            max_backoff,
            chunk_size,
            exclude,
            log_file,
        })
    }
}

/// Refuse roots that contain one another: a replica inside the source would
/// be mirrored into itself, and a source inside the replica would be pruned.
fn check_disjoint(source: &Path, replica: &Path) -> Result<()> {
    let source_abs = std::path::absolute(source)
        .with_context(|| format!("Failed to resolve source path: {}", source.display()))?;
    let replica_abs = std::path::absolute(replica)
        .with_context(|| format!("Failed to resolve replica path: {}", replica.display()))?;

    if replica_abs.starts_with(&source_abs) || source_abs.starts_with(&replica_abs) {
        anyhow::bail!(
            "source {} and replica {} must not contain one another",
            source.display(),
            replica.display()
        );
    }
    Ok(())
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("treemirror").join("config.toml"))
}

/// Load the config file.
///
/// An explicit path must exist. Without one, the default location is used
/// when present and built-in defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<FileConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => return Ok(FileConfig::default()),
        },
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

pub fn parse_config(content: &str) -> Result<FileConfig> {
    Ok(toml::from_str(content)?)
}
