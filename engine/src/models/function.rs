//! Function/method record produced by the shared extractors (`spec.md` §4.2).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub file: PathBuf,
    pub name: String,
    pub line_start: u32,
    pub line_end: u32,
    pub param_count: u32,
    /// McCabe cyclomatic complexity. Always >= 1 for a function with a body.
    pub cyclomatic: u32,
    /// Sonar-style cognitive complexity. Always >= 0.
    pub cognitive: u32,
    pub nesting_max: u32,
    pub is_test: bool,
    /// Whether the declaration carries an explicit visibility modifier
    /// (e.g. Rust's `pub`). `false` for languages without one, in which
    /// case export-ness is inferred from naming convention instead.
    pub is_public: bool,
}

impl FunctionRecord {
    pub fn scope_id(&self) -> String {
        format!("{}:{}", self.file.display(), self.name)
    }
}
