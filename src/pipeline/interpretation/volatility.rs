use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pipeline::extraction::RawVolatilityStats;

/// Qualitative market-disagreement level. `Unknown` is returned when fewer than
/// two bookmakers quoted, so dispersion cannot be measured at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VolatilityLevel {
    Low,
    Medium,
    High,
    Unknown,
}

impl fmt::Display for VolatilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VolatilityLevel::Low => "LOW",
            VolatilityLevel::Medium => "MEDIUM",
            VolatilityLevel::High => "HIGH",
            VolatilityLevel::Unknown => "UNKNOWN",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilityAssessment {
    pub level: VolatilityLevel,
    #[serde(rename = "avgCV")]
    pub avg_cv: f64,
    pub threshold: f64,
}

/// Classify dispersion against `threshold` on avgCV:
/// LOW below threshold/2, MEDIUM up to threshold, HIGH at or above it.
pub fn interpret_volatility(stats: &RawVolatilityStats, threshold: f64) -> VolatilityAssessment {
    let level = if stats.bookmaker_count < 2 {
        VolatilityLevel::Unknown
    } else if stats.avg_cv >= threshold {
        VolatilityLevel::High
    } else if stats.avg_cv >= threshold / 2.0 {
        VolatilityLevel::Medium
    } else {
        VolatilityLevel::Low
    };

    VolatilityAssessment {
        level,
        avg_cv: stats.avg_cv,
        threshold,
    }
}
