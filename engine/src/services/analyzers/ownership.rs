//! Ownership analyzer: blame-derived primary owner, concentration, bus
//! factor (`spec.md` §4.4, "Ownership").

use crate::error::AnalysisErrors;
use crate::models::options::OwnershipOptions;
use crate::services::analyzers::context::{AnalysisContext, Analyzer};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOwnership {
    pub path: PathBuf,
    pub primary_owner: String,
    pub ownership_percent: f64,
    pub concentration: f64,
    pub is_silo: bool,
    pub contributor_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnershipResult {
    pub files: Vec<FileOwnership>,
    pub bus_factor: u32,
    pub unavailable_reason: Option<String>,
}

pub struct OwnershipAnalyzer;

const SILO_MIN_LINES: u64 = 20;

impl Analyzer for OwnershipAnalyzer {
    type Options = OwnershipOptions;
    type Result = OwnershipResult;

    fn name(&self) -> &'static str {
        "ownership"
    }

    fn analyze(
        &self,
        ctx: &AnalysisContext,
        files: &[PathBuf],
        _options: &OwnershipOptions,
    ) -> (OwnershipResult, AnalysisErrors) {
        let Some(vcs) = ctx.vcs else {
            return (
                OwnershipResult {
                    files: Vec::new(),
                    bus_factor: 0,
                    unavailable_reason: Some("no VCS reader configured".to_string()),
                },
                AnalysisErrors::default(),
            );
        };

        let mut errors = AnalysisErrors::default();
        let mut out = Vec::new();
        let mut repo_totals: std::collections::BTreeMap<String, u64> = std::collections::BTreeMap::new();

        for path in files {
            let slice = match vcs.blame(path) {
                Ok(s) => s,
                Err(e) => {
                    errors.push(path.clone(), e);
                    continue;
                }
            };
            let total = slice.total_lines();
            if total == 0 {
                continue;
            }
            for (author, lines) in &slice.by_author {
                *repo_totals.entry(author.clone()).or_insert(0) += lines;
            }

            let (primary_owner, primary_lines) = slice
                .by_author
                .iter()
                .max_by_key(|(_, lines)| **lines)
                .map(|(a, l)| (a.clone(), *l))
                .unwrap_or_default();
            let ownership_percent = primary_lines as f64 / total as f64;
            let concentration: f64 = slice
                .by_author
                .values()
                .map(|lines| {
                    let p = *lines as f64 / total as f64;
                    p * p
                })
                .sum();
            let contributor_count = slice.by_author.len();
            let is_silo = is_silo(concentration, contributor_count, total);

            out.push(FileOwnership {
                path: path.clone(),
                primary_owner,
                ownership_percent,
                concentration,
                is_silo,
                contributor_count,
            });
        }

        let sorted_totals: Vec<u64> = repo_totals.into_values().collect();

        (
            OwnershipResult {
                files: out,
                bus_factor: bus_factor(&sorted_totals),
                unavailable_reason: None,
            },
            errors,
        )
    }
}

fn is_silo(concentration: f64, contributor_count: usize, total_lines: u64) -> bool {
    (concentration >= 0.9 && contributor_count >= 2)
        || (contributor_count == 1 && total_lines >= SILO_MIN_LINES)
}

/// Smallest number of top contributors (by lines owned, repo-wide) whose
/// combined share reaches at least half of all tracked lines.
fn bus_factor(totals: &[u64]) -> u32 {
    let grand_total: u64 = totals.iter().sum();
    if grand_total == 0 {
        return 0;
    }
    let mut sorted = totals.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    let mut count = 0u32;
    let mut cumulative = 0u64;
    for lines in sorted {
        cumulative += lines;
        count += 1;
        if cumulative as f64 >= grand_total as f64 * 0.5 {
            break;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silo_flags_concentrated_multi_author_files() {
        assert!(is_silo(0.95, 2, 100));
        assert!(!is_silo(0.5, 2, 100));
    }

    #[test]
    fn silo_flags_single_author_files_above_the_line_floor() {
        assert!(is_silo(1.0, 1, 25));
        assert!(!is_silo(1.0, 1, 5));
    }

    #[test]
    fn bus_factor_is_zero_with_no_history() {
        assert_eq!(bus_factor(&[]), 0);
    }

    #[test]
    fn bus_factor_counts_top_contributors_to_half_the_lines() {
        // 100 total lines: one author owns 60, reaching the 50% mark alone.
        assert_eq!(bus_factor(&[60, 30, 10]), 1);
        // Evenly split among 4 authors: need the top 2 to reach 50%.
        assert_eq!(bus_factor(&[25, 25, 25, 25]), 2);
    }
}
