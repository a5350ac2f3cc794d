use anyhow::Result;
use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use crate::app::ports::{PredictionLogPort, PredictionRecord};
use crate::observability::metrics;
use crate::pipeline::{run_accuracy_pipeline, PipelineResult};
use crate::types::PipelineInput;

/// Use case for producing a forecast for one match and, when asked, logging it
pub struct ForecastUseCase {
    prediction_log: Option<Box<dyn PredictionLogPort>>,
}

impl ForecastUseCase {
    pub fn new(prediction_log: Box<dyn PredictionLogPort>) -> Self {
        Self {
            prediction_log: Some(prediction_log),
        }
    }

    /// A use case that never persists, regardless of `logPredictions`
    pub fn without_logging() -> Self {
        Self { prediction_log: None }
    }

    /// Hex sha256 of the input's JSON form
    pub fn fingerprint(input: &PipelineInput) -> Result<String> {
        let canonical = serde_json::to_vec(input)?;
        Ok(hex::encode(Sha256::digest(&canonical)))
    }

    /// Run the pipeline for one match
    pub async fn forecast(&self, input: &PipelineInput) -> Result<PipelineResult> {
        let result = match run_accuracy_pipeline(input) {
            Ok(result) => result,
            Err(e) => {
                metrics::pipeline::run_failed(e.is_validation());
                warn!(match_id = %input.match_id, "Accuracy pipeline failed: {}", e);
                return Err(e.into());
            }
        };

        metrics::pipeline::run_completed(&result);
        info!(
            match_id = %result.match_id,
            favored = %result.output.favored,
            confidence = %result.output.confidence,
            data_quality = %result.output.data_quality,
            volatility = %result.output.volatility,
            suppress_edge = result.output.suppress_edge,
            "Forecast produced"
        );

        if input.config.log_predictions {
            match &self.prediction_log {
                Some(log) => {
                    let record = PredictionRecord {
                        id: Uuid::new_v4(),
                        logged_at: Utc::now(),
                        match_id: result.match_id.clone(),
                        input_fingerprint: Self::fingerprint(input)?,
                        result: result.clone(),
                    };
                    log.write_prediction(&record).await?;
                    metrics::pipeline::prediction_logged();
                }
                None => warn!(
                    match_id = %input.match_id,
                    "logPredictions set but no prediction log configured"
                ),
            }
        }

        Ok(result)
    }

    /// Run the pipeline for several matches, stopping at the first validation failure
    pub async fn forecast_batch(&self, inputs: &[PipelineInput]) -> Result<Vec<PipelineResult>> {
        let mut results = Vec::with_capacity(inputs.len());
        for input in inputs {
            results.push(self.forecast(input).await?);
        }
        Ok(results)
    }
}
