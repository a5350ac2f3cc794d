//! Measurement constants shared by the extraction layer and the calibration metrics.
//! Policy values (penalties, thresholds, blend weights) live in `PipelineConfig` instead.

// Data quality extraction minimums
pub const MIN_SAMPLE_MATCHES: u32 = 5;
pub const MIN_FORM_LENGTH: usize = 5;
pub const MIN_ROBUST_BOOKMAKERS: usize = 3;

// Environment variables
pub const CONFIG_PATH_ENV: &str = "ACCURACY_CONFIG";
pub const METRICS_ADDR_ENV: &str = "ACCURACY_METRICS_ADDR";
pub const DEFAULT_CONFIG_PATH: &str = "accuracy.toml";

/// Probability clamp used by log-loss so ln(0) never occurs
pub const LOG_LOSS_EPSILON: f64 = 1e-15;

/// Default number of reliability bins for calibration reports
pub const DEFAULT_RELIABILITY_BINS: usize = 10;
