//! SATD analyzer (`spec.md` §4.4, "SATD").

use crate::error::AnalysisErrors;
use crate::models::file::Language;
use crate::models::options::SatdOptions;
use crate::services::analyzers::context::{AnalysisContext, Analyzer};
use crate::services::extractors::satd::{scan, SatdMarker, Severity};
use crate::services::pipeline::map_files;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SatdItem {
    pub file: PathBuf,
    pub line: u32,
    pub marker: String,
    pub severity: Severity,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SatdSummary {
    pub by_severity: BTreeMap<String, usize>,
    pub by_marker: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SatdResult {
    pub items: Vec<SatdItem>,
    pub summary: SatdSummary,
}

pub struct SatdAnalyzer;

impl Analyzer for SatdAnalyzer {
    type Options = SatdOptions;
    type Result = SatdResult;

    fn name(&self) -> &'static str {
        "satd"
    }

    fn analyze(
        &self,
        ctx: &AnalysisContext,
        files: &[PathBuf],
        options: &SatdOptions,
    ) -> (SatdResult, AnalysisErrors) {
        let (per_file, errors) = map_files(
            files,
            ctx.source,
            0,
            &ctx.cancel,
            ctx.progress,
            |path, _language, bytes| {
                if !options.include_tests && Language::is_test_path(path) {
                    return Ok(Vec::<SatdMarker>::new());
                }
                let text = String::from_utf8_lossy(bytes);
                Ok(scan(&text, &options.custom_patterns))
            },
        );

        let mut items = Vec::new();
        let mut by_severity = BTreeMap::new();
        let mut by_marker = BTreeMap::new();

        for (path, markers) in files.iter().zip(per_file) {
            for m in markers {
                *by_severity.entry(format!("{:?}", m.severity).to_lowercase()).or_insert(0) += 1;
                *by_marker.entry(m.marker.clone()).or_insert(0) += 1;
                items.push(SatdItem {
                    file: path.clone(),
                    line: m.line,
                    marker: m.marker,
                    severity: m.severity,
                    description: m.description,
                });
            }
        }

        (
            SatdResult {
                items,
                summary: SatdSummary { by_severity, by_marker },
            },
            errors,
        )
    }
}

/// Per-file SATD density in [0, 1], normalized by the run maximum.
/// Shared with the defect and TDG analyzers.
pub fn normalized_satd_scores(result: &SatdResult, files: &[PathBuf]) -> BTreeMap<PathBuf, f64> {
    let mut counts: BTreeMap<PathBuf, f64> = files.iter().map(|p| (p.clone(), 0.0)).collect();
    for item in &result.items {
        *counts.entry(item.file.clone()).or_insert(0.0) += 1.0;
    }
    let max = counts.values().cloned().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return counts;
    }
    counts.into_iter().map(|(p, v)| (p, v / max)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_satd_scores_rank_by_marker_count() {
        let files = vec![PathBuf::from("a.rs"), PathBuf::from("b.rs")];
        let result = SatdResult {
            items: vec![
                SatdItem {
                    file: files[0].clone(),
                    line: 1,
                    marker: "TODO".into(),
                    severity: Severity::Low,
                    description: String::new(),
                },
                SatdItem {
                    file: files[0].clone(),
                    line: 2,
                    marker: "FIXME".into(),
                    severity: Severity::Medium,
                    description: String::new(),
                },
            ],
            summary: SatdSummary::default(),
        };
        let scores = normalized_satd_scores(&result, &files);
        assert_eq!(scores[&files[0]], 1.0);
        assert_eq!(scores[&files[1]], 0.0);
    }
}
