use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{ConfigError, Result};

pub const DEFAULT_EXTENSIONS: &[&str] = &["php"];

/// A source file, identified by its resolved absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceUnit {
    path: PathBuf,
}

impl SourceUnit {
    /// Resolves symlinks and relative components; fails if the file is gone.
    pub fn resolve(path: &Path) -> std::io::Result<Self> {
        Ok(Self {
            path: fs::canonicalize(path)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub struct FileScanner {
    extensions: Vec<String>,
}

impl FileScanner {
    pub fn new() -> Self {
        Self::with_extensions(DEFAULT_EXTENSIONS)
    }

    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    /// Every root must exist and be readable. Checked up front so that a
    /// bad root never surfaces halfway through a walk.
    pub fn ensure_readable(roots: &[PathBuf]) -> Result<()> {
        for root in roots {
            let readable = if root.is_dir() {
                fs::read_dir(root).is_ok()
            } else {
                fs::File::open(root).is_ok()
            };
            if !readable {
                return Err(ConfigError::UnreadableSource { path: root.clone() }.into());
            }
        }
        Ok(())
    }

    /// Collects matching files under every root, deduplicated by resolved
    /// path and sorted.
    pub fn scan(&self, roots: &[PathBuf]) -> Result<BTreeSet<SourceUnit>> {
        Self::ensure_readable(roots)?;

        let mut units = BTreeSet::new();
        for root in roots {
            units.extend(self.scan_root(root));
        }
        debug!(roots = roots.len(), files = units.len(), "scan complete");
        Ok(units)
    }

    fn scan_root(&self, root: &Path) -> Vec<SourceUnit> {
        // Following links lets walkdir detect loops; those surface as
        // entry errors and are skipped with the other unreadable entries.
        let entries: Vec<_> = WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("skipping unreadable entry: {err}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .collect();

        entries
            .par_iter()
            .filter(|entry| self.matches_extension(entry.path()))
            .filter_map(|entry| match SourceUnit::resolve(entry.path()) {
                Ok(unit) => Some(unit),
                Err(err) => {
                    warn!("skipping {}: {err}", entry.path().display());
                    None
                }
            })
            .collect()
    }

    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}
