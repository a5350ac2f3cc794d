use crate::app::ports::{PredictionLogPort, PredictionRecord};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// File-based implementation of PredictionLogPort
/// Appends prediction records to an NDJSON file
pub struct FilePredictionLogAdapter {
    file_writer: Mutex<BufWriter<std::fs::File>>,
    file_path: String,
}

impl FilePredictionLogAdapter {
    pub fn new(file_path: &str) -> anyhow::Result<Self> {
        let path = Path::new(file_path);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        info!("Appending prediction records to {}", file_path);

        let file_writer = BufWriter::new(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)?,
        );

        Ok(Self {
            file_writer: Mutex::new(file_writer),
            file_path: file_path.to_string(),
        })
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }
}

#[async_trait::async_trait]
impl PredictionLogPort for FilePredictionLogAdapter {
    async fn write_prediction(&self, record: &PredictionRecord) -> anyhow::Result<()> {
        let json_line = serde_json::to_string(record)?;

        let mut writer = self
            .file_writer
            .lock()
            .map_err(|_| anyhow::anyhow!("prediction log writer lock poisoned"))?;
        writeln!(writer, "{}", json_line)?;
        writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::run_accuracy_pipeline;
    use crate::types::{BookmakerQuote, PipelineInput};
    use chrono::Utc;
    use tempfile::tempdir;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_appends_one_line_per_record() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested/predictions.ndjson");
        let path_str = path.to_str().unwrap();

        let quotes = vec![BookmakerQuote::new("A", 1.9, 2.0, None)];
        let input = PipelineInput::new("m1", "H", "A", quotes);
        let result = run_accuracy_pipeline(&input)?;
        let record = PredictionRecord {
            id: Uuid::new_v4(),
            logged_at: Utc::now(),
            match_id: "m1".to_string(),
            input_fingerprint: "abc".to_string(),
            result,
        };

        let adapter = FilePredictionLogAdapter::new(path_str)?;
        adapter.write_prediction(&record).await?;
        adapter.write_prediction(&record).await?;
        assert_eq!(adapter.file_path(), path_str);

        let content = std::fs::read_to_string(&path)?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: PredictionRecord = serde_json::from_str(lines[0])?;
        assert_eq!(parsed.match_id, "m1");
        assert_eq!(parsed.result, record.result);
        Ok(())
    }

    #[tokio::test]
    async fn test_logged_floats_read_back_bit_for_bit() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("predictions.ndjson");
        let path_str = path.to_string_lossy().to_string();

        let quotes = vec![
            BookmakerQuote::new("A", 1.85, 4.20, Some(3.60)),
            BookmakerQuote::new("B", 1.95, 4.00, Some(3.50)),
            BookmakerQuote::new("C", 1.87, 4.10, Some(3.55)),
        ];
        let mut result = run_accuracy_pipeline(&PipelineInput::new("m2", "H", "A", quotes))?;
        result.details.raw_volatility.home_std_dev = 0.05000000000000005;
        let record = PredictionRecord {
            id: Uuid::new_v4(),
            logged_at: Utc::now(),
            match_id: "m2".to_string(),
            input_fingerprint: "def".to_string(),
            result,
        };

        FilePredictionLogAdapter::new(&path_str)?
            .write_prediction(&record)
            .await?;

        let content = std::fs::read_to_string(&path)?;
        let parsed: PredictionRecord = serde_json::from_str(content.trim_end())?;
        assert_eq!(
            parsed.result.details.raw_volatility.home_std_dev.to_bits(),
            0.05000000000000005_f64.to_bits()
        );
        assert_eq!(parsed.result, record.result);
        Ok(())
    }
}
