//! One options struct per analyzer, enumerated in `spec.md` §6.
//!
//! These are plain data; loading them from a config file or CLI flags is
//! the embedding application's job. `validate()` catches the one
//! synchronously-surfaced failure mode named in §7 ("Invalid option").

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexityOptions {
    pub cyclomatic_threshold: u32,
    pub cognitive_threshold: u32,
    pub functions_only: bool,
    pub max_file_size: u64,
}

impl Default for ComplexityOptions {
    fn default() -> Self {
        Self {
            cyclomatic_threshold: 10,
            cognitive_threshold: 15,
            functions_only: false,
            max_file_size: 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SatdOptions {
    pub include_tests: bool,
    pub strict_mode: bool,
    pub custom_patterns: Vec<String>,
}

impl Default for SatdOptions {
    fn default() -> Self {
        Self {
            include_tests: false,
            strict_mode: false,
            custom_patterns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadCodeOptions {
    pub confidence: f64,
}

impl Default for DeadCodeOptions {
    fn default() -> Self {
        Self { confidence: 0.8 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnOptions {
    pub days: u32,
}

impl Default for ChurnOptions {
    fn default() -> Self {
        Self { days: 30 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicatesOptions {
    pub min_lines: u32,
    pub similarity_threshold: f64,
    pub shingle_size: usize,
    pub num_hash_functions: usize,
    pub num_bands: usize,
}

impl Default for DuplicatesOptions {
    fn default() -> Self {
        Self {
            min_lines: 6,
            similarity_threshold: 0.7,
            shingle_size: 5,
            num_hash_functions: 200,
            num_bands: 20,
        }
    }
}

impl DuplicatesOptions {
    pub fn rows_per_band(&self) -> usize {
        self.num_hash_functions / self.num_bands.max(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotspotOptions {
    pub days: u32,
}

impl Default for HotspotOptions {
    fn default() -> Self {
        Self { days: 30 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalCouplingOptions {
    pub days: u32,
    pub min_cochanges: u32,
}

impl Default for TemporalCouplingOptions {
    fn default() -> Self {
        Self {
            days: 90,
            min_cochanges: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnershipOptions {
    pub include_trivial: bool,
}

impl Default for OwnershipOptions {
    fn default() -> Self {
        Self {
            include_trivial: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohesionOptions {
    pub include_tests: bool,
}

impl Default for CohesionOptions {
    fn default() -> Self {
        Self {
            include_tests: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefectOptions {
    pub high_risk_only: bool,
}

impl Default for DefectOptions {
    fn default() -> Self {
        Self {
            high_risk_only: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphScopeOption {
    File,
    Module,
    Function,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyGraphOptions {
    pub scope: GraphScopeOption,
}

impl Default for DependencyGraphOptions {
    fn default() -> Self {
        Self {
            scope: GraphScopeOption::File,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TdgOptions {
    pub include_tests: bool,
}

impl Default for TdgOptions {
    fn default() -> Self {
        Self {
            include_tests: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmellsOptions {
    pub hub_threshold: u32,
    pub god_fan_in: u32,
    pub god_fan_out: u32,
    pub instability_difference: f64,
}

impl Default for SmellsOptions {
    fn default() -> Self {
        Self {
            hub_threshold: 20,
            god_fan_in: 10,
            god_fan_out: 10,
            instability_difference: 0.4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureFlagOptions {
    pub providers: BTreeSet<String>,
    pub include_git: bool,
}

impl Default for FeatureFlagOptions {
    fn default() -> Self {
        Self {
            providers: ["launchdarkly", "split", "unleash", "posthog", "flipper"]
                .into_iter()
                .map(String::from)
                .collect(),
            include_git: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendPeriod {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendOptions {
    pub since_days: u32,
    pub period: TrendPeriod,
    pub snap: bool,
    /// Weights/thresholds the trend engine replays composite scoring with
    /// at each sampled commit (`spec.md` §4.5: "re-run the composite
    /// scoring over the project").
    pub score: ScoreOptions,
}

impl Default for TrendOptions {
    fn default() -> Self {
        Self {
            since_days: 90,
            period: TrendPeriod::Weekly,
            snap: true,
            score: ScoreOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreOptions {
    pub weights: BTreeMap<String, f64>,
    pub thresholds: BTreeMap<String, f64>,
    pub enable_cohesion: bool,
}

impl Default for ScoreOptions {
    fn default() -> Self {
        let mut weights = BTreeMap::new();
        weights.insert("complexity".to_string(), 20.0);
        weights.insert("duplication".to_string(), 15.0);
        weights.insert("satd".to_string(), 10.0);
        weights.insert("tdg".to_string(), 25.0);
        weights.insert("coupling".to_string(), 15.0);
        weights.insert("smells".to_string(), 15.0);
        Self {
            weights,
            thresholds: BTreeMap::new(),
            enable_cohesion: false,
        }
    }
}

impl ScoreOptions {
    pub fn with_cohesion() -> Self {
        let mut weights = BTreeMap::new();
        weights.insert("complexity".to_string(), 18.0);
        weights.insert("duplication".to_string(), 12.0);
        weights.insert("satd".to_string(), 10.0);
        weights.insert("tdg".to_string(), 20.0);
        weights.insert("coupling".to_string(), 15.0);
        weights.insert("smells".to_string(), 15.0);
        weights.insert("cohesion".to_string(), 10.0);
        Self {
            weights,
            thresholds: BTreeMap::new(),
            enable_cohesion: true,
        }
    }

    /// `spec.md` §8: "Sum of configured weights equals 100 in every
    /// supported profile (cohesion on/off)."
    pub fn validate(&self) -> Result<(), EngineError> {
        let sum: f64 = self.weights.values().sum();
        if (sum - 100.0).abs() > 1e-6 {
            return Err(EngineError::InvalidOption(format!(
                "composite score weights must sum to 100, got {sum}"
            )));
        }
        if self.enable_cohesion != self.weights.contains_key("cohesion") {
            return Err(EngineError::InvalidOption(
                "enable_cohesion must agree with presence of a cohesion weight".to_string(),
            ));
        }
        Ok(())
    }
}
