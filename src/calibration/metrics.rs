use serde::{Deserialize, Serialize};

use crate::constants::LOG_LOSS_EPSILON;
use crate::types::Outcome;

/// A forecast probability paired with what actually happened
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibratedPrediction {
    /// Forecast probability in [0, 1]
    pub predicted: f64,
    /// 1 if the event happened, 0 otherwise
    pub actual: u8,
}

impl CalibratedPrediction {
    pub fn new(predicted: f64, happened: bool) -> Self {
        Self {
            predicted,
            actual: u8::from(happened),
        }
    }

    fn actual_f64(&self) -> f64 {
        if self.actual > 0 {
            1.0
        } else {
            0.0
        }
    }
}

/// A logged probability for one outcome of a settled match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPrediction {
    pub match_id: String,
    pub outcome: Outcome,
    pub predicted: f64,
    pub won: bool,
}

impl From<&ResolvedPrediction> for CalibratedPrediction {
    fn from(resolved: &ResolvedPrediction) -> Self {
        CalibratedPrediction::new(resolved.predicted, resolved.won)
    }
}

/// Mean squared error between prediction and outcome. 0 is perfect, 1 is worst.
/// `None` for an empty collection.
pub fn brier_score(predictions: &[CalibratedPrediction]) -> Option<f64> {
    if predictions.is_empty() {
        return None;
    }
    let total: f64 = predictions
        .iter()
        .map(|p| (p.predicted.clamp(0.0, 1.0) - p.actual_f64()).powi(2))
        .sum();
    Some(total / predictions.len() as f64)
}

/// Mean negative log-likelihood of the outcomes. Predictions are clamped to
/// [eps, 1 - eps] so the result is always finite. `None` for an empty collection.
pub fn log_loss(predictions: &[CalibratedPrediction]) -> Option<f64> {
    if predictions.is_empty() {
        return None;
    }
    let total: f64 = predictions
        .iter()
        .map(|p| {
            let q = p.predicted.clamp(LOG_LOSS_EPSILON, 1.0 - LOG_LOSS_EPSILON);
            let a = p.actual_f64();
            -(a * q.ln() + (1.0 - a) * (1.0 - q).ln())
        })
        .sum();
    Some(total / predictions.len() as f64)
}
