//! Metrics for the accuracy pipeline and offline evaluation
//!
//! Recording goes through the `metrics` facade; without an installed recorder
//! every call is a no-op, so tests and library callers pay nothing.

use std::fmt;
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::calibration::CalibrationReport;
use crate::constants::METRICS_ADDR_ENV;

static INSTALLED: OnceLock<std::net::SocketAddr> = OnceLock::new();

/// Enum representing all metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Pipeline metrics
    PipelineRunsSuccess,
    PipelineRunsError,
    PipelineEdgeSuppressed,
    PipelineQualityScore,
    PipelineMarketMargin,
    PipelineAvgCv,
    PipelineEdgeMagnitude,
    PipelinePredictionsLogged,

    // Evaluation metrics
    EvaluationBrierScore,
    EvaluationLogLoss,
    EvaluationCalibrationError,
    EvaluationSamples,
}

impl MetricName {
    /// Get the metric name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::PipelineRunsSuccess => "accuracy_pipeline_runs_success_total",
            MetricName::PipelineRunsError => "accuracy_pipeline_runs_error_total",
            MetricName::PipelineEdgeSuppressed => "accuracy_pipeline_edge_suppressed_total",
            MetricName::PipelineQualityScore => "accuracy_pipeline_quality_score",
            MetricName::PipelineMarketMargin => "accuracy_pipeline_market_margin",
            MetricName::PipelineAvgCv => "accuracy_pipeline_avg_cv",
            MetricName::PipelineEdgeMagnitude => "accuracy_pipeline_edge_magnitude_points",
            MetricName::PipelinePredictionsLogged => "accuracy_pipeline_predictions_logged_total",

            MetricName::EvaluationBrierScore => "accuracy_evaluation_brier_score",
            MetricName::EvaluationLogLoss => "accuracy_evaluation_log_loss",
            MetricName::EvaluationCalibrationError => "accuracy_evaluation_calibration_error",
            MetricName::EvaluationSamples => "accuracy_evaluation_samples",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Install a Prometheus recorder and HTTP exporter when `ACCURACY_METRICS_ADDR`
/// is set. Idempotent; does nothing when the variable is absent.
/// Must be called from within a tokio runtime.
pub fn init_metrics() {
    if INSTALLED.get().is_some() {
        return;
    }
    let Ok(addr_str) = std::env::var(METRICS_ADDR_ENV) else {
        return;
    };
    let addr = match addr_str.parse::<std::net::SocketAddr>() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics addr '{}': {}", addr_str, e);
            return;
        }
    };

    let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => {
            let _ = INSTALLED.set(addr);
            info!("Prometheus exporter listening at http://{}/metrics", addr);
        }
        Err(e) => warn!("Failed to install Prometheus exporter: {}", e),
    }
}

/// Address of the running exporter, if one was installed
pub fn exporter_addr() -> Option<std::net::SocketAddr> {
    INSTALLED.get().copied()
}

pub mod pipeline {
    use super::MetricName;
    use crate::pipeline::PipelineResult;

    /// Record a completed pipeline run
    pub fn run_completed(result: &PipelineResult) {
        let output = &result.output;
        ::metrics::counter!(
            MetricName::PipelineRunsSuccess.as_str(),
            "confidence" => output.confidence.to_string(),
            "data_quality" => output.data_quality.to_string(),
            "volatility" => output.volatility.to_string()
        )
        .increment(1);

        if output.suppress_edge {
            ::metrics::counter!(MetricName::PipelineEdgeSuppressed.as_str()).increment(1);
        }

        let details = &result.details;
        ::metrics::histogram!(MetricName::PipelineQualityScore.as_str())
            .record(details.quality_assessment.score);
        ::metrics::histogram!(MetricName::PipelineMarketMargin.as_str())
            .record(details.market_probabilities.market_margin);
        ::metrics::histogram!(MetricName::PipelineAvgCv.as_str())
            .record(details.raw_volatility.avg_cv);
        ::metrics::histogram!(MetricName::PipelineEdgeMagnitude.as_str())
            .record(output.edge.value.abs());
    }

    /// Record a failed pipeline run
    pub fn run_failed(validation: bool) {
        let kind = if validation { "validation" } else { "internal" };
        ::metrics::counter!(MetricName::PipelineRunsError.as_str(), "kind" => kind).increment(1);
    }

    /// Record that a result was handed to the prediction log
    pub fn prediction_logged() {
        ::metrics::counter!(MetricName::PipelinePredictionsLogged.as_str()).increment(1);
    }
}

pub mod evaluation {
    use super::{CalibrationReport, MetricName};

    /// Publish the headline numbers of a calibration report as gauges
    pub fn report_computed(report: &CalibrationReport) {
        ::metrics::gauge!(MetricName::EvaluationSamples.as_str())
            .set(report.sample_count as f64);
        if let Some(brier) = report.brier_score {
            ::metrics::gauge!(MetricName::EvaluationBrierScore.as_str()).set(brier);
        }
        if let Some(loss) = report.log_loss {
            ::metrics::gauge!(MetricName::EvaluationLogLoss.as_str()).set(loss);
        }
        if let Some(ece) = report.expected_calibration_error {
            ::metrics::gauge!(MetricName::EvaluationCalibrationError.as_str()).set(ece);
        }
    }
}
