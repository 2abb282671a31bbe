//! Path resolver
//!
//! Turns any path into its absolute, symlink-free form.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ResolveError;

/// Absolute, symlink-free path. Two paths naming the same directory on disk
/// resolve to equal values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalPath(PathBuf);

impl CanonicalPath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for CanonicalPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Resolves `path` to its canonical form.
///
/// Relative paths are taken against the current working directory, then
/// every symbolic link is followed to its final target. Fails when the path
/// does not exist or a link in the chain is broken or unreadable.
pub fn resolve(path: impl AsRef<Path>) -> Result<CanonicalPath, ResolveError> {
    let path = path.as_ref();
    let absolute = std::path::absolute(path).map_err(|source| ResolveError::Absolute {
        path: path.to_path_buf(),
        source,
    })?;

    let resolved = fs::canonicalize(&absolute).map_err(|source| ResolveError::Canonicalize {
        path: absolute.clone(),
        source,
    })?;

    Ok(CanonicalPath(resolved))
}

/// Resolves the directory containing `path`.
pub fn resolve_parent(path: impl AsRef<Path>) -> Result<CanonicalPath, ResolveError> {
    let path = path.as_ref();
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => resolve("."),
        Some(parent) => resolve(parent),
        None => Err(ResolveError::NoParent(path.to_path_buf())),
    }
}
