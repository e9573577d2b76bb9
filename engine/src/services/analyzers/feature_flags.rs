//! Feature-flags analyzer: per flag-key provider, reference list,
//! staleness, and priority (`spec.md` §4.4, "Feature flags").

use crate::error::AnalysisErrors;
use crate::models::options::FeatureFlagOptions;
use crate::services::analyzers::context::{AnalysisContext, Analyzer};
use crate::services::extractors::feature_flags::{scan, FlagProvider};
use crate::services::pipeline::map_files;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagPriority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagReport {
    pub flag_key: String,
    pub provider: FlagProvider,
    pub references: Vec<(PathBuf, u32)>,
    pub staleness_days: Option<u32>,
    pub priority: FlagPriority,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureFlagsResult {
    pub flags: Vec<FlagReport>,
}

pub struct FeatureFlagsAnalyzer;

/// Heuristic nesting depth: leading-whitespace columns divided by a
/// 4-space (or one-tab) indent unit. A text-level proxy, consistent with
/// this extractor's line-scan approach rather than an AST walk.
fn indent_depth(line: &str) -> u32 {
    let leading = line.len() - line.trim_start().len();
    let tabs = line.chars().take(leading).filter(|c| *c == '\t').count();
    let spaces = leading - tabs;
    (tabs + spaces / 4) as u32
}

fn priority_for(file_spread: usize, max_nesting: u32) -> FlagPriority {
    if file_spread >= 10 || max_nesting >= 4 {
        FlagPriority::Critical
    } else if file_spread >= 5 || max_nesting >= 3 {
        FlagPriority::High
    } else if file_spread >= 2 || max_nesting >= 1 {
        FlagPriority::Medium
    } else {
        FlagPriority::Low
    }
}

impl Analyzer for FeatureFlagsAnalyzer {
    type Options = FeatureFlagOptions;
    type Result = FeatureFlagsResult;

    fn name(&self) -> &'static str {
        "feature_flags"
    }

    fn analyze(
        &self,
        ctx: &AnalysisContext,
        files: &[PathBuf],
        options: &FeatureFlagOptions,
    ) -> (FeatureFlagsResult, AnalysisErrors) {
        let (per_file, errors) = map_files(
            files,
            ctx.source,
            0,
            &ctx.cancel,
            ctx.progress,
            |_path, _language, bytes| {
                let text = String::from_utf8_lossy(bytes);
                Ok(scan(&text, &options.providers))
            },
        );

        struct Accum {
            provider: FlagProvider,
            references: Vec<(PathBuf, u32)>,
            files: std::collections::BTreeSet<PathBuf>,
            max_nesting: u32,
        }
        let mut by_key: BTreeMap<String, Accum> = BTreeMap::new();

        for (path, refs) in files.iter().zip(per_file) {
            for r in refs {
                let nesting = ctx
                    .source
                    .read(path)
                    .ok()
                    .and_then(|bytes| {
                        String::from_utf8_lossy(&bytes)
                            .lines()
                            .nth(r.line.saturating_sub(1) as usize)
                            .map(indent_depth)
                    })
                    .unwrap_or(0);
                let entry = by_key.entry(r.flag_key.clone()).or_insert_with(|| Accum {
                    provider: r.provider,
                    references: Vec::new(),
                    files: std::collections::BTreeSet::new(),
                    max_nesting: 0,
                });
                entry.max_nesting = entry.max_nesting.max(nesting);
                entry.references.push((path.clone(), r.line));
                entry.files.insert(path.clone());
            }
        }

        let since_far_past = Utc::now() - chrono::Duration::days(365 * 5);
        let all_commits = if options.include_git {
            ctx.vcs.and_then(|v| v.commits(since_far_past).ok())
        } else {
            None
        };

        let mut flags = Vec::new();
        for (flag_key, accum) in by_key {
            let staleness_days = all_commits.as_ref().and_then(|commits| {
                let touched_paths: std::collections::BTreeSet<&PathBuf> = accum.files.iter().collect();
                commits
                    .iter()
                    .filter(|c| c.files.iter().any(|f| touched_paths.contains(&f.path)))
                    .map(|c| c.timestamp)
                    .min()
                    .map(|oldest| (Utc::now() - oldest).num_days().max(0) as u32)
            });

            let priority = priority_for(accum.files.len(), accum.max_nesting);
            flags.push(FlagReport {
                flag_key,
                provider: accum.provider,
                references: accum.references,
                staleness_days,
                priority,
            });
        }

        (FeatureFlagsResult { flags }, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indent_depth_counts_tabs_and_four_space_groups() {
        assert_eq!(indent_depth("no indent"), 0);
        assert_eq!(indent_depth("    one level"), 1);
        assert_eq!(indent_depth("\t\ttwo tabs"), 2);
        assert_eq!(indent_depth("\t    tab plus one level"), 2);
    }

    #[test]
    fn priority_escalates_with_spread_or_nesting() {
        assert_eq!(priority_for(1, 0), FlagPriority::Low);
        assert_eq!(priority_for(2, 0), FlagPriority::Medium);
        assert_eq!(priority_for(5, 0), FlagPriority::High);
        assert_eq!(priority_for(10, 0), FlagPriority::Critical);
        assert_eq!(priority_for(1, 4), FlagPriority::Critical);
    }
}
