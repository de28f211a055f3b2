//! Header sources: where header text comes from and how includes resolve.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// Supplies header text to the parser.
pub trait HeaderSource {
    /// Resolve an `#include "name"` seen in `includer`.
    ///
    /// The includer's directory is searched first, then the search paths.
    fn resolve(&self, name: &str, includer: Option<&Path>) -> Option<PathBuf>;

    /// Read the whole file.
    fn load(&self, path: &Path) -> io::Result<String>;

    /// Key under which `path` is recorded as visited.
    fn canonicalize(&self, path: &Path) -> PathBuf {
        path.to_path_buf()
    }
}

impl<S: HeaderSource + ?Sized> HeaderSource for &S {
    fn resolve(&self, name: &str, includer: Option<&Path>) -> Option<PathBuf> {
        (**self).resolve(name, includer)
    }

    fn load(&self, path: &Path) -> io::Result<String> {
        (**self).load(path)
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        (**self).canonicalize(path)
    }
}

/// Headers on disk, with a list of include directories.
#[derive(Debug, Clone, Default)]
pub struct FsHeaderSource {
    include_paths: Vec<PathBuf>,
}

impl FsHeaderSource {
    pub fn new<I, P>(include_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            include_paths: include_paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn include_paths(&self) -> &[PathBuf] {
        &self.include_paths
    }

    pub fn add_include_path(&mut self, path: impl Into<PathBuf>) {
        self.include_paths.push(path.into());
    }
}

impl HeaderSource for FsHeaderSource {
    fn resolve(&self, name: &str, includer: Option<&Path>) -> Option<PathBuf> {
        let local = includer
            .and_then(Path::parent)
            .map(|dir| dir.join(name));

        local
            .into_iter()
            .chain(self.include_paths.iter().map(|dir| dir.join(name)))
            .find(|candidate| candidate.is_file())
            .map(|found| self.canonicalize(&found))
    }

    fn load(&self, path: &Path) -> io::Result<String> {
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
    }
}

/// Headers held in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryHeaderSource {
    files: BTreeMap<PathBuf, String>,
}

impl MemoryHeaderSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_file(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.files.insert(path.into(), text.into());
    }
}

impl HeaderSource for MemoryHeaderSource {
    fn resolve(&self, name: &str, includer: Option<&Path>) -> Option<PathBuf> {
        let local = includer
            .and_then(Path::parent)
            .map(|dir| dir.join(name));

        local
            .into_iter()
            .chain(std::iter::once(PathBuf::from(name)))
            .find(|candidate| self.files.contains_key(candidate))
    }

    fn load(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }
}
