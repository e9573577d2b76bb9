//! Error kinds surfaced by the analytical core.
//!
//! Per-file failures never abort a batch: they accumulate in
//! [`AnalysisErrors`] alongside whatever results were produced for the
//! other files. Only option validation and internal-invariant violations
//! are returned as a top-level `Result::Err`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to parse {path} as {language}: {source}")]
    Parse {
        path: PathBuf,
        language: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{path} ({size} bytes) exceeds the configured size cap of {limit} bytes")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        limit: u64,
    },

    #[error("no version-control reader available: {reason}")]
    VcsUnavailable { reason: String },

    #[error("cache I/O error: {0}")]
    CacheIo(#[source] std::io::Error),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("analysis was cancelled")]
    Cancelled,

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A batch of per-file failures, returned alongside the successful results
/// of a `map_files`-style operation. Never fatal on its own.
#[derive(Debug, Default)]
pub struct AnalysisErrors(pub Vec<(PathBuf, EngineError)>);

impl AnalysisErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, path: PathBuf, err: EngineError) {
        self.0.push((path, err));
    }

    pub fn merge(&mut self, other: AnalysisErrors) {
        self.0.extend(other.0);
    }
}
