//! VCS-derived records: commits and blame slices (`spec.md` §3, §6).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDiffStat {
    pub path: PathBuf,
    pub lines_added: u32,
    pub lines_deleted: u32,
    pub diff_hunks: Vec<(u32, u32)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    pub hash: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub parents: Vec<String>,
    pub files: Vec<FileDiffStat>,
    pub is_bug_fix: bool,
}

/// Commit-message heuristic from `spec.md` §3: full-word, case-insensitive
/// match against `{fix, bug, defect, patch, hotfix, issue #<n>}`.
pub fn is_bug_fix_message(message: &str) -> bool {
    use once_cell::sync::Lazy;
    use regex::Regex;

    static RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?i)\b(fix|bug|defect|patch|hotfix)\b|issue\s*#\d+").unwrap()
    });
    RE.is_match(message)
}

/// A file's contributor -> effective-line-count map on HEAD.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlameSlice {
    pub by_author: BTreeMap<String, u64>,
}

impl BlameSlice {
    pub fn total_lines(&self) -> u64 {
        self.by_author.values().sum()
    }
}

/// Lines that are blank, pure braces, or pure imports, excluded from blame
/// unless the caller opts into trivial-line inclusion.
pub fn is_trivial_line(line: &str) -> bool {
    let t = line.trim();
    if t.is_empty() {
        return true;
    }
    if t.chars().all(|c| matches!(c, '{' | '}' | '(' | ')' | ';' | ',')) {
        return true;
    }
    let import_prefixes = [
        "import ", "use ", "require(", "require \"", "#include", "from ", "using ",
    ];
    import_prefixes.iter().any(|p| t.starts_with(p))
}
