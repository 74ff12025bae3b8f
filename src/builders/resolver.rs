use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::error::{ConfigError, Result};

/// Turns configured paths into the concrete files they stand for.
pub trait PathResolver {
    /// Returns the absolute, symlink-free form of `path`. Fails if it does not exist.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;

    /// Returns the canonical files denoted by `path`: the file itself, or every
    /// file below it when `path` is a directory.
    fn expand(&self, path: &Path) -> Result<BTreeSet<PathBuf>>;
}

/// Resolves paths against the real filesystem.
pub struct FileSystemResolver;

impl FileSystemResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSystemResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PathResolver for FileSystemResolver {
    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path).map_err(|e| {
            ConfigError::Parse(format!("path {} doesn't exist! ({e})", path.display()))
        })
    }

    fn expand(&self, path: &Path) -> Result<BTreeSet<PathBuf>> {
        let root = self.canonicalize(path)?;
        let mut files = BTreeSet::new();

        if root.is_file() {
            files.insert(root);
            return Ok(files);
        }

        for entry in WalkDir::new(&root) {
            let entry = entry.map_err(|e| {
                ConfigError::Parse(format!("Failed to walk {}: {e}", root.display()))
            })?;
            // Directories, and symlinks to them, are never members. Everything else
            // must canonicalize, so a dangling symlink is an error.
            if entry.file_type().is_dir() || entry.path().is_dir() {
                continue;
            }
            files.insert(self.canonicalize(entry.path())?);
        }

        Ok(files)
    }
}
