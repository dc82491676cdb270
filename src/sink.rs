//! Where generated files go.
//!
//! Generators build an in-memory manifest; a [`FileSink`] is the single place
//! that performs I/O. [`FsSink`] writes below a root directory, [`MemorySink`]
//! keeps everything in a map for tests and dry runs.
//!
//! Paths handed to a sink are root-relative and `/`-separated. Absolute paths
//! and `..` components are rejected before anything is written, so a
//! malicious or broken manifest can never escape the target directory.
//! A path may appear only once per batch: parallel writes to one path would
//! leave whichever file finished last.

use crate::types::GeneratedFile;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("refusing to write outside the output directory: {0}")]
    UnsafePath(String),
    #[error("more than one file for {0}")]
    DuplicatePath(String),
}

/// Destination for generated files. Must be `Sync`: files are written in
/// parallel.
pub trait FileSink: Sync {
    fn write(&self, file: &GeneratedFile) -> Result<(), SinkError>;

    /// Write every file. The default writes in parallel and stops at the
    /// first error. Nothing is written when a path is unsafe or repeated.
    fn write_all(&self, files: &[GeneratedFile]) -> Result<(), SinkError> {
        for file in files {
            check_relative(&file.path)?;
        }
        if let Some(path) = duplicate_paths(files).into_iter().next() {
            return Err(SinkError::DuplicatePath(path));
        }
        files.par_iter().try_for_each(|file| self.write(file))
    }
}

/// Paths that occur more than once, sorted.
pub fn duplicate_paths(files: &[GeneratedFile]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(files.len());
    let repeated: BTreeSet<&str> = files
        .iter()
        .map(|f| f.path.as_str())
        .filter(|path| !seen.insert(*path))
        .collect();
    repeated.into_iter().map(str::to_string).collect()
}

/// Reject absolute paths, `..`, and empty paths.
pub fn check_relative(path: &str) -> Result<(), SinkError> {
    let p = Path::new(path);
    let safe = !path.is_empty()
        && !path.starts_with('/')
        && p.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if safe {
        Ok(())
    } else {
        Err(SinkError::UnsafePath(path.to_string()))
    }
}

/// Writes files below `root`, creating parent directories as needed.
#[derive(Debug, Clone)]
pub struct FsSink {
    root: PathBuf,
}

impl FsSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileSink for FsSink {
    fn write(&self, file: &GeneratedFile) -> Result<(), SinkError> {
        check_relative(&file.path)?;
        let target = self.root.join(&file.path);
        let io_err = |source| SinkError::Io {
            path: target.clone(),
            source,
        };
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&target, file.bytes()).map_err(io_err)?;
        if file.executable {
            set_executable(&target).map_err(io_err)?;
        }
        tracing::trace!(path = %file.path, bytes = file.bytes().len(), "wrote file");
        Ok(())
    }
}

#[cfg(unix)]
fn set_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Collects files in memory, keyed by path.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<BTreeMap<String, GeneratedFile>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn get(&self, path: &str) -> Option<GeneratedFile> {
        self.lock().get(path).cloned()
    }

    pub fn paths(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, GeneratedFile>> {
        // A panic while holding the lock leaves the map intact, so recover it.
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl FileSink for MemorySink {
    fn write(&self, file: &GeneratedFile) -> Result<(), SinkError> {
        check_relative(&file.path)?;
        self.lock().insert(file.path.clone(), file.clone());
        Ok(())
    }
}
