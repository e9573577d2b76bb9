//! Self-Admitted Technical Debt line-level scan (`spec.md` §4.2).
//!
//! This is a source-text scan, not a tree walk: SATD markers live in
//! comments, and comment node kinds vary too much across grammars to be
//! worth a tree-based approach here — the teacher's own
//! `services/satd_detector.rs` takes the same line-oriented shortcut.

use once_cell::sync::Lazy;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    fn bump(self) -> Self {
        match self {
            Severity::Low => Severity::Medium,
            Severity::Medium => Severity::High,
            Severity::High => Severity::High,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SatdMarker {
    pub line: u32,
    pub marker: String,
    pub severity: Severity,
    pub description: String,
}

const HIGH_MARKERS: &[&str] = &["FIXME", "BUG", "HACK", "XXX"];
const MEDIUM_MARKERS: &[&str] = &["TODO", "REFACTOR", "KLUDGE"];
const LOW_MARKERS: &[&str] = &["OPTIMIZE", "SMELL"];

fn default_markers() -> Vec<&'static str> {
    HIGH_MARKERS
        .iter()
        .chain(MEDIUM_MARKERS)
        .chain(LOW_MARKERS)
        .copied()
        .collect()
}

fn severity_of(marker: &str) -> Severity {
    let upper = marker.to_ascii_uppercase();
    if HIGH_MARKERS.contains(&upper.as_str()) {
        Severity::High
    } else if MEDIUM_MARKERS.contains(&upper.as_str()) {
        Severity::Medium
    } else {
        Severity::Low
    }
}

static URGENCY_RE: Lazy<regex::Regex> = Lazy::new(|| {
    regex::Regex::new(r"(?i)\b(critical|security|urgent|asap)\b").unwrap()
});

/// Scans `source` for SATD markers. `custom_patterns` are treated like
/// `LOW_MARKERS` unless the matched line also contains an urgency word.
pub fn scan(source: &str, custom_patterns: &[String]) -> Vec<SatdMarker> {
    let mut markers = default_markers();
    let custom_refs: Vec<&str> = custom_patterns.iter().map(String::as_str).collect();
    markers.extend(custom_refs.iter().copied());

    let pattern = format!(r"\b({})\b", markers.join("|"));
    let re = RegexBuilder::new(&pattern)
        .case_insensitive(false)
        .build()
        .unwrap_or_else(|_| regex::Regex::new(r"\bTODO\b").unwrap());

    let mut out = Vec::new();
    for (idx, line) in source.lines().enumerate() {
        let Some(m) = re.find(line) else { continue };
        let marker = m.as_str().to_string();
        let mut severity = if custom_patterns.iter().any(|p| p == &marker) {
            Severity::Low
        } else {
            severity_of(&marker)
        };
        if URGENCY_RE.is_match(line) {
            severity = severity.bump();
        }
        let description = line[m.end()..].trim_start_matches([':', '-', ' ']).trim().to_string();
        out.push(SatdMarker {
            line: idx as u32 + 1,
            marker,
            severity,
            description,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_high_severity_marker() {
        let src = "// FIXME: this leaks memory\nfn ok() {}\n";
        let found = scan(src, &[]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity, Severity::High);
        assert_eq!(found[0].marker, "FIXME");
    }

    #[test]
    fn urgency_word_bumps_severity() {
        let src = "// TODO: critical security hole here\n";
        let found = scan(src, &[]);
        assert_eq!(found[0].severity, Severity::High);
    }

    #[test]
    fn todo_is_medium_by_default() {
        let src = "// TODO clean this up later\n";
        let found = scan(src, &[]);
        assert_eq!(found[0].severity, Severity::Medium);
    }
}
