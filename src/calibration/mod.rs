//! Offline forecast evaluation.
//!
//! These functions score historical, already-settled predictions. They are not
//! part of the live per-match pipeline and share no state with it.

pub mod metrics;
pub mod reliability;

pub use metrics::{brier_score, log_loss, CalibratedPrediction, ResolvedPrediction};
pub use reliability::{
    expected_calibration_error, reliability_bins, CalibrationReport, ReliabilityBin,
};
