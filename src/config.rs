use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::constants;
use crate::error::{AccuracyError, Result};

/// How per-bookmaker implied probabilities are combined into one market view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMethod {
    /// Arithmetic mean across bookmakers
    #[default]
    Mean,
    /// Median across bookmakers, robust to a single stale or outlying book
    Median,
}

/// Penalties and cut-offs used to turn raw quality flags into a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QualityPolicy {
    /// Points deducted from 100 per raised flag
    pub penalty_per_flag: f64,
    /// Minimum score for HIGH
    pub high_min_score: f64,
    /// Minimum score for MEDIUM; anything below is LOW
    pub medium_min_score: f64,
}

impl Default for QualityPolicy {
    fn default() -> Self {
        Self {
            penalty_per_flag: 15.0,
            high_min_score: 80.0,
            medium_min_score: 50.0,
        }
    }
}

/// Bounds on the weight given to the statistical model when blending with the market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlendPolicy {
    pub min_model_weight: f64,
    pub max_model_weight: f64,
}

impl Default for BlendPolicy {
    fn default() -> Self {
        Self {
            min_model_weight: 0.15,
            max_model_weight: 0.5,
        }
    }
}

/// Lower bounds (as probability fractions) of the LOW, MEDIUM and HIGH edge bands.
/// Anything below `low` is NONE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EdgeBands {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for EdgeBands {
    fn default() -> Self {
        Self {
            low: 0.02,
            medium: 0.05,
            high: 0.10,
        }
    }
}

/// Weights of the statistical team-strength model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelWeights {
    pub win_rate: f64,
    pub goal_difference: f64,
    pub form: f64,
    pub head_to_head: f64,
    /// Rating bonus applied to the home side
    pub home_advantage: f64,
    /// Steepness of the logistic mapping rating -> home share
    pub logistic_scale: f64,
    /// Draw share for two evenly matched teams in a three-way market
    pub base_draw: f64,
}

impl Default for ModelWeights {
    fn default() -> Self {
        Self {
            win_rate: 0.35,
            goal_difference: 0.20,
            form: 0.25,
            head_to_head: 0.10,
            home_advantage: 0.10,
            logistic_scale: 2.5,
            base_draw: 0.26,
        }
    }
}

/// All policy for one pipeline run. Passed explicitly with every input;
/// the pipeline keeps no module-level state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    pub aggregation: AggregationMethod,
    /// avgCV at or above which the market is considered HIGH volatility
    pub volatility_threshold: f64,
    pub quality: QualityPolicy,
    pub blend: BlendPolicy,
    pub edge_bands: EdgeBands,
    pub model: ModelWeights,
    /// Signals the caller to persist the result; the pipeline itself never writes
    pub log_predictions: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            aggregation: AggregationMethod::default(),
            volatility_threshold: 0.3,
            quality: QualityPolicy::default(),
            blend: BlendPolicy::default(),
            edge_bands: EdgeBands::default(),
            model: ModelWeights::default(),
            log_predictions: false,
        }
    }
}

impl PipelineConfig {
    /// Reject policy combinations that would make the interpreters inconsistent
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(AccuracyError::InvalidConfig(msg));

        if !(self.volatility_threshold.is_finite() && self.volatility_threshold > 0.0) {
            return invalid(format!(
                "volatilityThreshold must be positive, got {}",
                self.volatility_threshold
            ));
        }

        let q = &self.quality;
        if !(q.penalty_per_flag > 0.0 && q.penalty_per_flag <= 100.0) {
            return invalid(format!(
                "quality.penaltyPerFlag must be in (0, 100], got {}",
                q.penalty_per_flag
            ));
        }
        if !(0.0..=100.0).contains(&q.medium_min_score)
            || !(0.0..=100.0).contains(&q.high_min_score)
            || q.medium_min_score > q.high_min_score
        {
            return invalid(format!(
                "quality score cut-offs must satisfy 0 <= medium ({}) <= high ({}) <= 100",
                q.medium_min_score, q.high_min_score
            ));
        }

        let b = &self.blend;
        if !(0.0..=1.0).contains(&b.min_model_weight)
            || !(0.0..=1.0).contains(&b.max_model_weight)
            || b.min_model_weight > b.max_model_weight
        {
            return invalid(format!(
                "blend weights must satisfy 0 <= min ({}) <= max ({}) <= 1",
                b.min_model_weight, b.max_model_weight
            ));
        }

        let e = &self.edge_bands;
        if !(e.low > 0.0 && e.low < e.medium && e.medium < e.high) {
            return invalid(format!(
                "edge bands must be strictly increasing and positive, got {}/{}/{}",
                e.low, e.medium, e.high
            ));
        }

        let m = &self.model;
        if !(m.logistic_scale > 0.0) || !(0.0..1.0).contains(&m.base_draw) {
            return invalid(format!(
                "model.logisticScale must be positive and model.baseDraw in [0, 1), got {} and {}",
                m.logistic_scale, m.base_draw
            ));
        }

        Ok(())
    }
}

/// Top-level application configuration read from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub prediction_log: PredictionLogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionLogConfig {
    /// NDJSON file that receives prediction records
    pub path: String,
}

impl Default for PredictionLogConfig {
    fn default() -> Self {
        Self {
            path: "output/predictions.ndjson".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an explicit path, the `ACCURACY_CONFIG` env var,
    /// or `accuracy.toml`. A missing file yields defaults; a malformed one is an error.
    pub fn load(explicit_path: Option<&str>) -> Result<Self> {
        let path = explicit_path
            .map(str::to_string)
            .or_else(|| std::env::var(constants::CONFIG_PATH_ENV).ok())
            .unwrap_or_else(|| constants::DEFAULT_CONFIG_PATH.to_string());

        if !Path::new(&path).exists() {
            if explicit_path.is_some() {
                return Err(AccuracyError::Config(format!(
                    "Config file '{}' does not exist",
                    path
                )));
            }
            debug!("No config file at '{}', using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| {
                AccuracyError::Config(format!("Failed to read config file '{}': {}", path, e))
            })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path);
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.pipeline.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_inverted_blend_weights() {
        let mut config = PipelineConfig::default();
        config.blend.min_model_weight = 0.8;
        config.blend.max_model_weight = 0.2;
        let err = config.validate().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_rejects_unordered_edge_bands() {
        let mut config = PipelineConfig::default();
        config.edge_bands.medium = 0.01;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_positive_volatility_threshold() {
        let mut config = PipelineConfig::default();
        config.volatility_threshold = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml = r#"
            [pipeline]
            aggregation = "median"
            volatilityThreshold = 0.2

            [pipeline.blend]
            maxModelWeight = 0.4

            [prediction_log]
            path = "/tmp/preds.ndjson"
        "#;
        let config = AppConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.pipeline.aggregation, AggregationMethod::Median);
        assert_eq!(config.pipeline.volatility_threshold, 0.2);
        assert_eq!(config.pipeline.blend.max_model_weight, 0.4);
        assert_eq!(config.pipeline.blend.min_model_weight, 0.15);
        assert_eq!(config.pipeline.quality, QualityPolicy::default());
        assert_eq!(config.prediction_log.path, "/tmp/preds.ndjson");
    }

    #[test]
    fn test_invalid_toml_policy_is_rejected() {
        let toml = r#"
            [pipeline.quality]
            highMinScore = 40.0
            mediumMinScore = 60.0
        "#;
        assert!(AppConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let result = AppConfig::load(Some("/definitely/not/here/accuracy.toml"));
        assert!(matches!(result, Err(AccuracyError::Config(_))));
    }
}
