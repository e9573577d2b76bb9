//! Shared analysis context (`spec.md` §9: "A logger and a progress sink
//! are passed in the analysis context").
//!
//! Analyzers are built by composing these dependencies explicitly rather
//! than through inheritance, per the design notes.

use crate::services::cache::CacheStore;
use crate::services::parser_pool::ParserPool;
use crate::services::pipeline::CancellationToken;
use crate::services::progress::{NullProgress, ProgressSink};
use crate::services::source_provider::SourceProvider;
use crate::services::vcs::VcsReader;
use std::sync::Arc;

pub struct AnalysisContext<'a> {
    pub source: &'a dyn SourceProvider,
    pub vcs: Option<&'a dyn VcsReader>,
    pub parsers: &'a ParserPool,
    pub cache: Option<&'a CacheStore>,
    pub progress: &'a dyn ProgressSink,
    pub cancel: CancellationToken,
    pub max_file_size: u64,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(source: &'a dyn SourceProvider, parsers: &'a ParserPool) -> Self {
        static NULL: NullProgress = NullProgress;
        Self {
            source,
            vcs: None,
            parsers,
            cache: None,
            progress: &NULL,
            cancel: CancellationToken::new(),
            max_file_size: crate::services::pipeline::DEFAULT_MAX_FILE_SIZE,
        }
    }

    pub fn with_vcs(mut self, vcs: &'a dyn VcsReader) -> Self {
        self.vcs = Some(vcs);
        self
    }

    pub fn with_cache(mut self, cache: &'a CacheStore) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = progress;
        self
    }
}

/// Shared capability set every analyzer exposes (`spec.md` §9).
pub trait Analyzer {
    type Options;
    type Result: Default;

    fn name(&self) -> &'static str;

    fn analyze(
        &self,
        ctx: &AnalysisContext,
        files: &[std::path::PathBuf],
        options: &Self::Options,
    ) -> (Self::Result, crate::error::AnalysisErrors);

    /// Most analyzers hold no resources that need explicit teardown.
    fn close(&self) {}
}

pub type Progress = Arc<dyn ProgressSink>;
