use crate::error::{IdsError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Relevance bands, all in `[0, 1]`.
///
/// `min_relevance <= adapt <= reuse <= high_confidence`. A candidate below
/// `min_relevance` is discarded, `[adapt, reuse)` is the ADAPT band and
/// anything at or above `reuse` is a REUSE match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_min_relevance")]
    pub min_relevance: f64,
    #[serde(default = "default_adapt")]
    pub adapt: f64,
    #[serde(default = "default_reuse")]
    pub reuse: f64,
    #[serde(default = "default_high_confidence")]
    pub high_confidence: f64,
}

fn default_min_relevance() -> f64 {
    0.2
}

fn default_adapt() -> f64 {
    0.5
}

fn default_reuse() -> f64 {
    0.8
}

fn default_high_confidence() -> f64 {
    0.9
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_relevance: default_min_relevance(),
            adapt: default_adapt(),
            reuse: default_reuse(),
            high_confidence: default_high_confidence(),
        }
    }
}

// ---------------------------------------------------------------------------
// ReviewConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Days between a CREATE decision and its scheduled review.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: i64,
    /// Reuse count at which a created artifact becomes a promotion candidate.
    #[serde(default = "default_promotion_threshold")]
    pub promotion_threshold: u32,
}

/// Largest review horizon accepted by [`Config::validate`], in days.
pub const MAX_HORIZON_DAYS: i64 = 36_500;

fn default_horizon_days() -> i64 {
    30
}

fn default_promotion_threshold() -> u32 {
    3
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            horizon_days: default_horizon_days(),
            promotion_threshold: default_promotion_threshold(),
        }
    }
}

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Limits {
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,
    /// Cap on the candidates recorded in a CREATE justification; unset
    /// records every candidate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_evaluated_patterns: Option<usize>,
}

fn default_max_recommendations() -> usize {
    5
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_recommendations: default_max_recommendations(),
            max_evaluated_patterns: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub review: ReviewConfig,
    #[serde(default)]
    pub limits: Limits,
    /// Share of the registry an ADAPT candidate's consumers may reach before
    /// the analysis warns about the blast radius.
    #[serde(default = "default_adapt_impact_warning_ratio")]
    pub adapt_impact_warning_ratio: f64,
}

fn default_version() -> u32 {
    1
}

fn default_adapt_impact_warning_ratio() -> f64 {
    0.3
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            thresholds: Thresholds::default(),
            review: ReviewConfig::default(),
            limits: Limits::default(),
            adapt_impact_warning_ratio: default_adapt_impact_warning_ratio(),
        }
    }
}

impl Config {
    /// Load `.ids/config.yaml`, falling back to defaults when it is absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Fail on the first error-level warning.
    pub fn ensure_valid(&self) -> Result<()> {
        match self
            .validate()
            .into_iter()
            .find(|w| w.level == WarnLevel::Error)
        {
            Some(w) => Err(IdsError::InvalidConfig(w.message)),
            None => Ok(()),
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let t = &self.thresholds;

        for (name, value) in [
            ("min_relevance", t.min_relevance),
            ("adapt", t.adapt),
            ("reuse", t.reuse),
            ("high_confidence", t.high_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("thresholds.{name}={value} is outside [0, 1]"),
                });
            }
        }

        if !(t.min_relevance <= t.adapt && t.adapt <= t.reuse && t.reuse <= t.high_confidence) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "thresholds must satisfy min_relevance <= adapt <= reuse <= high_confidence \
                     (got {} / {} / {} / {})",
                    t.min_relevance, t.adapt, t.reuse, t.high_confidence
                ),
            });
        }

        if t.min_relevance == 0.0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "thresholds.min_relevance=0 keeps every entity as a match".to_string(),
            });
        }

        if self.review.promotion_threshold == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "review.promotion_threshold must be at least 1".to_string(),
            });
        }

        if self.review.horizon_days.unsigned_abs() > MAX_HORIZON_DAYS.unsigned_abs() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "review.horizon_days={} exceeds {MAX_HORIZON_DAYS} days",
                    self.review.horizon_days
                ),
            });
        } else if self.review.horizon_days <= 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "review.horizon_days={} schedules reviews immediately",
                    self.review.horizon_days
                ),
            });
        }

        if self.limits.max_recommendations == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "limits.max_recommendations=0 hides every REUSE/ADAPT match".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_is_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_empty());
        assert_eq!(cfg.review.horizon_days, 30);
        assert_eq!(cfg.review.promotion_threshold, 3);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.thresholds.reuse, 0.8);
        assert_eq!(cfg.limits.max_recommendations, 5);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = "thresholds:\n  reuse: 0.85\nreview:\n  promotion_threshold: 5\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.thresholds.reuse, 0.85);
        assert_eq!(cfg.thresholds.adapt, 0.5);
        assert_eq!(cfg.review.promotion_threshold, 5);
        assert_eq!(cfg.review.horizon_days, 30);
        assert_eq!(cfg.version, 1);
    }

    #[test]
    fn load_reads_config_file() {
        let dir = TempDir::new().unwrap();
        let path = paths::config_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "review:\n  horizon_days: 14\n").unwrap();
        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.review.horizon_days, 14);
        assert_eq!(loaded.review.promotion_threshold, 3);
    }

    #[test]
    fn validate_out_of_order_thresholds() {
        let mut cfg = Config::default();
        cfg.thresholds.adapt = 0.9;
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("must satisfy")));
        assert!(cfg.ensure_valid().is_err());
    }

    #[test]
    fn validate_out_of_range_threshold() {
        let mut cfg = Config::default();
        cfg.thresholds.high_confidence = 1.5;
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("thresholds.high_confidence=1.5")));
    }

    #[test]
    fn validate_zero_promotion_threshold() {
        let mut cfg = Config::default();
        cfg.review.promotion_threshold = 0;
        assert!(matches!(
            cfg.ensure_valid(),
            Err(IdsError::InvalidConfig(msg)) if msg.contains("promotion_threshold")
        ));
    }

    #[test]
    fn validate_rejects_oversized_horizon() {
        let mut cfg = Config::default();
        cfg.review.horizon_days = 1_000_000_000;
        assert!(matches!(
            cfg.ensure_valid(),
            Err(IdsError::InvalidConfig(msg)) if msg.contains("review.horizon_days=1000000000")
        ));

        cfg.review.horizon_days = MAX_HORIZON_DAYS;
        assert!(cfg.ensure_valid().is_ok());
    }

    #[test]
    fn evaluated_patterns_are_uncapped_by_default() {
        let cfg: Config = serde_yaml::from_str("limits:\n  max_recommendations: 3\n").unwrap();
        assert_eq!(cfg.limits.max_evaluated_patterns, None);
        let cfg: Config =
            serde_yaml::from_str("limits:\n  max_evaluated_patterns: 4\n").unwrap();
        assert_eq!(cfg.limits.max_evaluated_patterns, Some(4));
    }

    #[test]
    fn validate_warnings_do_not_fail() {
        let mut cfg = Config::default();
        cfg.thresholds.min_relevance = 0.0;
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Warning);
        assert!(cfg.ensure_valid().is_ok());
    }
}
