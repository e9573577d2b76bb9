//! CodeQual: a multi-language static analysis engine.
//!
//! This crate is the analytical core only. File enumeration, CLI surface,
//! progress rendering, report templating, and config-file loading live in
//! the embedding application; this crate consumes their output through the
//! [`services::source_provider::SourceProvider`] and [`services::vcs::VcsReader`]
//! traits and a plain `Vec<PathBuf>` of files to analyze.

pub mod error;
pub mod models;
pub mod services;

pub use error::{AnalysisErrors, EngineError};

/// Re-exported for convenience: every public result struct round-trips
/// through `serde_json` with stable, snake_case field names.
pub use serde_json::Value as JsonValue;
