use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calibration::ResolvedPrediction;
use crate::pipeline::PipelineResult;

/// A pipeline result as handed to persistence when `logPredictions` is set
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    pub id: Uuid,
    pub logged_at: DateTime<Utc>,
    pub match_id: String,
    /// sha256 of the canonical input JSON; identical inputs share a fingerprint
    pub input_fingerprint: String,
    pub result: PipelineResult,
}

#[async_trait]
pub trait PredictionLogPort: Send + Sync {
    async fn write_prediction(&self, record: &PredictionRecord) -> anyhow::Result<()>;
}

/// Source of settled predictions for offline evaluation
#[async_trait]
pub trait ResolvedPredictionSource: Send + Sync {
    async fn load_resolved(&self) -> anyhow::Result<Vec<ResolvedPrediction>>;
}
