use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use crate::app::ports::ResolvedPredictionSource;
use crate::calibration::ResolvedPrediction;

/// Reads settled predictions from a JSON file: either one JSON array or
/// newline-delimited objects.
pub struct JsonFileResolvedSource {
    path: PathBuf,
}

impl JsonFileResolvedSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse(content: &str) -> anyhow::Result<Vec<ResolvedPrediction>> {
        let trimmed = content.trim_start();
        if trimmed.starts_with('[') {
            return Ok(serde_json::from_str(trimmed)?);
        }
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(anyhow::Error::from))
            .collect()
    }
}

#[async_trait]
impl ResolvedPredictionSource for JsonFileResolvedSource {
    async fn load_resolved(&self) -> anyhow::Result<Vec<ResolvedPrediction>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            anyhow::anyhow!("Failed to read predictions file '{}': {}", self.path.display(), e)
        })?;
        let resolved = Self::parse(&content)?;
        debug!(count = resolved.len(), path = %self.path.display(), "Loaded resolved predictions");
        Ok(resolved)
    }
}
