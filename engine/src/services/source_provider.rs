//! Source provider abstraction (`spec.md` §2.1, §6).
//!
//! Two implementations: a live filesystem reader, and an in-memory
//! snapshot keyed by a historical commit, used by the trend engine so it
//! never has to materialize a worktree per sampling point.

use crate::error::EngineError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub trait SourceProvider: Send + Sync {
    fn read(&self, path: &Path) -> Result<Vec<u8>, EngineError>;
    fn stat(&self, path: &Path) -> Result<(u64, SystemTime), EngineError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FilesystemProvider;

impl SourceProvider for FilesystemProvider {
    fn read(&self, path: &Path) -> Result<Vec<u8>, EngineError> {
        std::fs::read(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn stat(&self, path: &Path) -> Result<(u64, SystemTime), EngineError> {
        let meta = std::fs::metadata(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mtime = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        Ok((meta.len(), mtime))
    }
}

/// In-memory view of a repository rooted at one historical commit. Built
/// once per trend sampling point from a `VcsReader`'s blob contents.
#[derive(Debug, Clone)]
pub struct SnapshotProvider {
    files: HashMap<PathBuf, Vec<u8>>,
    mtime: SystemTime,
}

impl Default for SnapshotProvider {
    fn default() -> Self {
        Self {
            files: HashMap::default(),
            mtime: SystemTime::UNIX_EPOCH,
        }
    }
}

impl SnapshotProvider {
    pub fn new(files: HashMap<PathBuf, Vec<u8>>, mtime: SystemTime) -> Self {
        Self { files, mtime }
    }

    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.keys()
    }
}

impl SourceProvider for SnapshotProvider {
    fn read(&self, path: &Path) -> Result<Vec<u8>, EngineError> {
        self.files.get(path).cloned().ok_or_else(|| EngineError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not in snapshot"),
        })
    }

    fn stat(&self, path: &Path) -> Result<(u64, SystemTime), EngineError> {
        self.files
            .get(path)
            .map(|bytes| (bytes.len() as u64, self.mtime))
            .ok_or_else(|| EngineError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not in snapshot"),
            })
    }
}
