//! Composite score engine: maps seven component scores to a weighted
//! 0-100 total, with configured thresholds (`spec.md` §4.5, "Composite").

use crate::error::EngineError;
use crate::models::options::ScoreOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentScores {
    pub complexity: f64,
    pub duplication: f64,
    pub satd: f64,
    pub tdg: f64,
    pub coupling: f64,
    pub smells: f64,
    pub cohesion: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdFailure {
    pub component: String,
    pub score: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeResult {
    pub total: f64,
    pub components: ComponentScores,
    pub threshold_failures: Vec<ThresholdFailure>,
    pub passed: bool,
}

/// Every per-analyzer score is "badness in [0, 1]"; the composite wants
/// "goodness in [0, 100]", so each component is inverted and rescaled
/// here rather than inside the analyzer that produced it.
pub fn inverse_badness(badness_0_1: f64) -> f64 {
    (1.0 - badness_0_1.clamp(0.0, 1.0)) * 100.0
}

/// `spec.md` §4.5, "Composite": weighted mean, rounded, with weights that
/// must already sum to 100 (validated by [`ScoreOptions::validate`]).
pub fn compute(components: ComponentScores, options: &ScoreOptions) -> Result<CompositeResult, EngineError> {
    options.validate()?;

    let mut named: BTreeMap<&str, f64> = BTreeMap::new();
    named.insert("complexity", components.complexity);
    named.insert("duplication", components.duplication);
    named.insert("satd", components.satd);
    named.insert("tdg", components.tdg);
    named.insert("coupling", components.coupling);
    named.insert("smells", components.smells);
    if let Some(cohesion) = components.cohesion {
        named.insert("cohesion", cohesion);
    }

    let mut total = 0.0;
    for (name, weight) in &options.weights {
        let score = named.get(name.as_str()).copied().unwrap_or(0.0);
        total += score * weight / 100.0;
    }
    let total = (total * 100.0).round() / 100.0;

    let mut threshold_failures = Vec::new();
    for (name, threshold) in &options.thresholds {
        if let Some(&score) = named.get(name.as_str()) {
            if score < *threshold {
                threshold_failures.push(ThresholdFailure {
                    component: name.clone(),
                    score,
                    threshold: *threshold,
                });
            }
        }
    }
    if let Some(&overall_threshold) = options.thresholds.get("overall") {
        if total < overall_threshold {
            threshold_failures.push(ThresholdFailure {
                component: "overall".to_string(),
                score: total,
                threshold: overall_threshold,
            });
        }
    }

    Ok(CompositeResult {
        total,
        components,
        passed: threshold_failures.is_empty(),
        threshold_failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_scores_yield_total_100() {
        let components = ComponentScores {
            complexity: 100.0,
            duplication: 100.0,
            satd: 100.0,
            tdg: 100.0,
            coupling: 100.0,
            smells: 100.0,
            cohesion: None,
        };
        let result = compute(components, &ScoreOptions::default()).unwrap();
        assert!((result.total - 100.0).abs() < 1e-6);
        assert!(result.passed);
    }

    #[test]
    fn threshold_miss_fails() {
        let mut options = ScoreOptions::default();
        options.thresholds.insert("overall".to_string(), 90.0);
        let components = ComponentScores {
            complexity: 50.0,
            duplication: 50.0,
            satd: 50.0,
            tdg: 50.0,
            coupling: 50.0,
            smells: 50.0,
            cohesion: None,
        };
        let result = compute(components, &options).unwrap();
        assert!(!result.passed);
    }

    #[test]
    fn rejects_bad_weight_sum() {
        let mut options = ScoreOptions::default();
        options.weights.insert("complexity".to_string(), 1000.0);
        let components = ComponentScores::default();
        assert!(compute(components, &options).is_err());
    }
}
