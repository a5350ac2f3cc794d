use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::QualityPolicy;
use crate::constants::{MIN_FORM_LENGTH, MIN_ROBUST_BOOKMAKERS, MIN_SAMPLE_MATCHES};
use crate::pipeline::extraction::{QualityFlag, RawDataQualityFlags};

/// Qualitative data-quality level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QualityLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QualityLevel::Low => "LOW",
            QualityLevel::Medium => "MEDIUM",
            QualityLevel::High => "HIGH",
        };
        write!(f, "{}", s)
    }
}

/// Interpreted data quality for one match. Lives only inside a pipeline result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityAssessment {
    pub level: QualityLevel,
    /// 0 to 100, 100 meaning nothing was missing
    pub score: f64,
    /// Human-readable issues: home, then away, then head-to-head, then market
    pub issues: Vec<String>,
}

/// Turns raw quality flags into a judgment
pub trait QualityInterpreter {
    fn interpret(&self, flags: &RawDataQualityFlags) -> QualityAssessment;
}

/// Fixed-penalty rule table driven by a `QualityPolicy`
pub struct DefaultQualityInterpreter {
    pub policy: QualityPolicy,
}

impl DefaultQualityInterpreter {
    /// Create an interpreter with the default policy
    pub fn new() -> Self {
        Self {
            policy: QualityPolicy::default(),
        }
    }

    /// Create an interpreter with a custom policy
    pub fn with_policy(policy: QualityPolicy) -> Self {
        Self { policy }
    }

    fn calculate_score(&self, raised: usize) -> f64 {
        (100.0 - self.policy.penalty_per_flag * raised as f64).max(0.0)
    }

    fn determine_level(&self, score: f64) -> QualityLevel {
        if score >= self.policy.high_min_score {
            QualityLevel::High
        } else if score >= self.policy.medium_min_score {
            QualityLevel::Medium
        } else {
            QualityLevel::Low
        }
    }

    fn describe(flag: QualityFlag, flags: &RawDataQualityFlags) -> String {
        let sample = |side: &str, played: Option<u32>| match played {
            Some(p) => format!(
                "{} team has only {} matches played (minimum {})",
                side, p, MIN_SAMPLE_MATCHES
            ),
            None => format!("{} team season statistics unavailable", side),
        };
        let form = |side: &str, len: Option<usize>| match len {
            Some(l) => format!(
                "{} team form covers only {} matches (minimum {})",
                side, l, MIN_FORM_LENGTH
            ),
            None => format!("{} team recent form unavailable", side),
        };

        match flag {
            QualityFlag::InsufficientHomeSample => sample("Home", flags.home_matches_played),
            QualityFlag::ShortHomeForm => form("Home", flags.home_form_length),
            QualityFlag::InsufficientAwaySample => sample("Away", flags.away_matches_played),
            QualityFlag::ShortAwayForm => form("Away", flags.away_form_length),
            QualityFlag::NoHeadToHead => "No head-to-head history between these teams".to_string(),
            QualityFlag::SingleSourceOdds => format!(
                "Odds from {} bookmaker(s) only; cross-market comparison impossible",
                flags.bookmaker_count
            ),
            QualityFlag::ThinMarket => format!(
                "Only {} bookmaker(s) quoted (robust aggregation wants {})",
                flags.bookmaker_count, MIN_ROBUST_BOOKMAKERS
            ),
        }
    }
}

impl QualityInterpreter for DefaultQualityInterpreter {
    fn interpret(&self, flags: &RawDataQualityFlags) -> QualityAssessment {
        let raised = flags.raised();
        let score = self.calculate_score(raised.len());

        QualityAssessment {
            level: self.determine_level(score),
            score,
            issues: raised.iter().map(|f| Self::describe(*f, flags)).collect(),
        }
    }
}

impl Default for DefaultQualityInterpreter {
    fn default() -> Self {
        Self::new()
    }
}
