//! Parse-and-cache pipeline entry point (`spec.md` §4.1).
//!
//! `map_files` is the one place every analyzer funnels its per-file work
//! through: parallel across all CPU cores via `rayon`, indexed result
//! collection (no mutex on the collector), size-cap enforcement, and
//! cooperative cancellation.

use crate::error::{AnalysisErrors, EngineError};
use crate::models::file::Language;
use crate::services::progress::ProgressSink;
use crate::services::source_provider::SourceProvider;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 0 means unlimited, matching `spec.md` §4.1's documented default/override.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Runs `f` over every file in `files`, in parallel, preserving input
/// order in the returned `Vec`. A file whose size exceeds `max_file_size`
/// (0 = unlimited) produces an error entry rather than a silent drop; the
/// result slot for any failed file is `T::default()`.
pub fn map_files<T, F>(
    files: &[PathBuf],
    provider: &dyn SourceProvider,
    max_file_size: u64,
    cancel: &CancellationToken,
    progress: &dyn ProgressSink,
    f: F,
) -> (Vec<T>, AnalysisErrors)
where
    T: Default + Send,
    F: Fn(&Path, Language, &[u8]) -> Result<T, EngineError> + Send + Sync,
{
    let outputs: Vec<(T, Option<(PathBuf, EngineError)>)> = files
        .par_iter()
        .map(|path| {
            if cancel.is_cancelled() {
                return (T::default(), Some((path.clone(), EngineError::Cancelled)));
            }

            let Some(language) = Language::from_extension(path) else {
                progress.tick();
                return (
                    T::default(),
                    Some((
                        path.clone(),
                        EngineError::InvalidOption(format!(
                            "unsupported file extension: {}",
                            path.display()
                        )),
                    )),
                );
            };

            let result = provider
                .stat(path)
                .and_then(|(size, _mtime)| {
                    if max_file_size > 0 && size > max_file_size {
                        return Err(EngineError::FileTooLarge {
                            path: path.clone(),
                            size,
                            limit: max_file_size,
                        });
                    }
                    provider.read(path)
                })
                .and_then(|bytes| f(path, language, &bytes));

            progress.tick();
            match result {
                Ok(value) => (value, None),
                Err(e) => (T::default(), Some((path.clone(), e))),
            }
        })
        .collect();

    let mut results = Vec::with_capacity(outputs.len());
    let mut errors = AnalysisErrors::default();
    for (value, err) in outputs {
        results.push(value);
        if let Some((path, e)) = err {
            errors.push(path, e);
        }
    }
    (results, errors)
}
