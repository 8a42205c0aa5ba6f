use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::ConfigError;

/// How GFCI looks for a separating set when pruning an adjacency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SepsetStrategy {
    /// First conditioning set that yields independence.
    #[default]
    Greedy,
    /// Independent conditioning set with the smallest p-value.
    MinP,
    /// Independent conditioning set with the largest p-value.
    MaxP,
}

impl SepsetStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greedy => "greedy",
            Self::MinP => "min_p",
            Self::MaxP => "max_p",
        }
    }

    /// Parse from string (matching the serde rename).
    pub fn from_str_name(s: &str) -> Result<Self, ConfigError> {
        match s {
            "greedy" => Ok(Self::Greedy),
            "min_p" => Ok(Self::MinP),
            "max_p" => Ok(Self::MaxP),
            other => Err(ConfigError::UnknownSepsetStrategy(other.to_string())),
        }
    }
}

/// Parameter bag for a single search invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Registry key of the algorithm, e.g. "pc", "cpc-stable", "gfci".
    pub algorithm: String,
    /// Significance level for independence tests.
    pub alpha: f64,
    /// Maximum conditioning-set size. -1 = unbounded.
    pub depth: i32,
    /// Maximum discriminating path length. -1 = unbounded.
    pub max_path_length: i32,
    /// Use Zhang's complete FCI rule set (R1-R10) rather than R1-R4.
    pub complete_rule_set: bool,
    /// Apply the discriminating path rule (R4).
    pub discriminating_path_rule: bool,
    /// Run the possible-d-sep removal step in FCI.
    pub possible_dsep: bool,
    /// Run the best-effort PAG repair pass after FCI orientation.
    pub guarantee_pag: bool,
    /// Sepset search used by GFCI.
    pub sepset_strategy: SepsetStrategy,
    /// Worker threads for adjacency search.
    pub num_threads: usize,
    /// BIC penalty discount for score-based steps.
    pub penalty_discount: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            algorithm: defaults::DEFAULT_ALGORITHM.to_string(),
            alpha: defaults::DEFAULT_ALPHA,
            depth: defaults::DEFAULT_DEPTH,
            max_path_length: defaults::DEFAULT_MAX_PATH_LENGTH,
            complete_rule_set: defaults::DEFAULT_COMPLETE_RULE_SET,
            discriminating_path_rule: defaults::DEFAULT_DISCRIMINATING_PATH_RULE,
            possible_dsep: defaults::DEFAULT_POSSIBLE_DSEP,
            guarantee_pag: defaults::DEFAULT_GUARANTEE_PAG,
            sepset_strategy: SepsetStrategy::default(),
            num_threads: defaults::DEFAULT_NUM_THREADS,
            penalty_discount: defaults::DEFAULT_PENALTY_DISCOUNT,
        }
    }
}

impl SearchConfig {
    /// Check every knob independently. No knob constrains another.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_depth(self.depth)?;
        validate_path_length(self.max_path_length)?;
        validate_alpha(self.alpha)?;
        validate_penalty(self.penalty_discount)?;
        validate_threads(self.num_threads)?;
        Ok(())
    }
}

/// -1 means unbounded; any other negative value is rejected.
pub fn validate_depth(depth: i32) -> Result<(), ConfigError> {
    if depth < -1 {
        return Err(ConfigError::InvalidDepth { depth });
    }
    Ok(())
}

pub fn validate_path_length(length: i32) -> Result<(), ConfigError> {
    if length < -1 {
        return Err(ConfigError::InvalidPathLength { length });
    }
    Ok(())
}

pub fn validate_alpha(alpha: f64) -> Result<(), ConfigError> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(ConfigError::InvalidAlpha { alpha });
    }
    Ok(())
}

pub fn validate_penalty(penalty: f64) -> Result<(), ConfigError> {
    if !(penalty > 0.0 && penalty.is_finite()) {
        return Err(ConfigError::InvalidPenalty { penalty });
    }
    Ok(())
}

pub fn validate_threads(threads: usize) -> Result<(), ConfigError> {
    if threads == 0 {
        return Err(ConfigError::ZeroThreads);
    }
    Ok(())
}

/// Convert a validated depth to an optional bound.
pub fn depth_limit(depth: i32) -> Option<usize> {
    usize::try_from(depth).ok()
}
