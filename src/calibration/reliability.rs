use serde::{Deserialize, Serialize};

use super::metrics::{brier_score, log_loss, CalibratedPrediction};

/// One equal-width probability bucket of a reliability diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReliabilityBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    pub mean_predicted: f64,
    pub observed_frequency: f64,
}

/// Group predictions into `bins` equal-width buckets over [0, 1].
/// Empty buckets are omitted. A prediction of exactly 1.0 lands in the last bucket.
pub fn reliability_bins(predictions: &[CalibratedPrediction], bins: usize) -> Vec<ReliabilityBin> {
    let bins = bins.max(1);
    let mut sums = vec![(0usize, 0.0f64, 0.0f64); bins];

    for p in predictions {
        let predicted = p.predicted.clamp(0.0, 1.0);
        let index = ((predicted * bins as f64) as usize).min(bins - 1);
        let entry = &mut sums[index];
        entry.0 += 1;
        entry.1 += predicted;
        entry.2 += if p.actual > 0 { 1.0 } else { 0.0 };
    }

    sums.into_iter()
        .enumerate()
        .filter(|(_, (count, _, _))| *count > 0)
        .map(|(i, (count, predicted_sum, actual_sum))| ReliabilityBin {
            lower: i as f64 / bins as f64,
            upper: (i + 1) as f64 / bins as f64,
            count,
            mean_predicted: predicted_sum / count as f64,
            observed_frequency: actual_sum / count as f64,
        })
        .collect()
}

/// Count-weighted mean gap between predicted and observed frequency
pub fn expected_calibration_error(
    predictions: &[CalibratedPrediction],
    bins: usize,
) -> Option<f64> {
    if predictions.is_empty() {
        return None;
    }
    let total = predictions.len() as f64;
    Some(
        reliability_bins(predictions, bins)
            .iter()
            .map(|b| (b.count as f64 / total) * (b.observed_frequency - b.mean_predicted).abs())
            .sum(),
    )
}

/// Summary of forecast accuracy over a set of settled predictions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationReport {
    pub sample_count: usize,
    pub brier_score: Option<f64>,
    pub log_loss: Option<f64>,
    /// Share of predictions whose event happened
    pub base_rate: Option<f64>,
    pub expected_calibration_error: Option<f64>,
    pub bins: Vec<ReliabilityBin>,
}

impl CalibrationReport {
    pub fn evaluate(predictions: &[CalibratedPrediction], bins: usize) -> Self {
        let base_rate = (!predictions.is_empty()).then(|| {
            predictions.iter().filter(|p| p.actual > 0).count() as f64 / predictions.len() as f64
        });

        Self {
            sample_count: predictions.len(),
            brier_score: brier_score(predictions),
            log_loss: log_loss(predictions),
            base_rate,
            expected_calibration_error: expected_calibration_error(predictions, bins),
            bins: reliability_bins(predictions, bins),
        }
    }
}
