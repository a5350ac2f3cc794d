use anyhow::Result;
use std::collections::BTreeMap;
use tracing::info;

use crate::app::ports::ResolvedPredictionSource;
use crate::calibration::{CalibratedPrediction, CalibrationReport, ResolvedPrediction};
use crate::observability::metrics;
use crate::types::Outcome;

/// Use case for scoring historical, settled predictions
pub struct EvaluationUseCase {
    source: Box<dyn ResolvedPredictionSource>,
    bins: usize,
}

/// Overall report plus one report per outcome
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSummary {
    pub overall: CalibrationReport,
    pub by_outcome: BTreeMap<String, CalibrationReport>,
}

impl EvaluationUseCase {
    pub fn new(source: Box<dyn ResolvedPredictionSource>, bins: usize) -> Self {
        Self { source, bins }
    }

    pub fn summarize(resolved: &[ResolvedPrediction], bins: usize) -> EvaluationSummary {
        let all: Vec<CalibratedPrediction> =
            resolved.iter().map(CalibratedPrediction::from).collect();

        let by_outcome = Outcome::ORDER
            .iter()
            .filter_map(|outcome| {
                let subset: Vec<CalibratedPrediction> = resolved
                    .iter()
                    .filter(|r| r.outcome == *outcome)
                    .map(CalibratedPrediction::from)
                    .collect();
                (!subset.is_empty())
                    .then(|| (outcome.to_string(), CalibrationReport::evaluate(&subset, bins)))
            })
            .collect();

        EvaluationSummary {
            overall: CalibrationReport::evaluate(&all, bins),
            by_outcome,
        }
    }

    pub async fn evaluate(&self) -> Result<EvaluationSummary> {
        let resolved = self.source.load_resolved().await?;
        let summary = Self::summarize(&resolved, self.bins);

        metrics::evaluation::report_computed(&summary.overall);
        info!(
            samples = summary.overall.sample_count,
            brier = ?summary.overall.brier_score,
            log_loss = ?summary.overall.log_loss,
            "Calibration evaluation complete"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StaticSource(Vec<ResolvedPrediction>);

    #[async_trait]
    impl ResolvedPredictionSource for StaticSource {
        async fn load_resolved(&self) -> anyhow::Result<Vec<ResolvedPrediction>> {
            Ok(self.0.clone())
        }
    }

    fn resolved(match_id: &str, outcome: Outcome, predicted: f64, won: bool) -> ResolvedPrediction {
        ResolvedPrediction {
            match_id: match_id.to_string(),
            outcome,
            predicted,
            won,
        }
    }

    #[tokio::test]
    async fn test_summary_splits_by_outcome() {
        let source = StaticSource(vec![
            resolved("m1", Outcome::Home, 0.6, true),
            resolved("m1", Outcome::Draw, 0.25, false),
            resolved("m1", Outcome::Away, 0.15, false),
            resolved("m2", Outcome::Home, 0.4, false),
            resolved("m2", Outcome::Away, 0.6, true),
        ]);
        let summary = EvaluationUseCase::new(Box::new(source), 10).evaluate().await.unwrap();
        assert_eq!(summary.overall.sample_count, 5);
        assert_eq!(summary.by_outcome["home"].sample_count, 2);
        assert_eq!(summary.by_outcome["draw"].sample_count, 1);
        assert!(summary.overall.brier_score.unwrap() < 0.25);
    }

    #[tokio::test]
    async fn test_empty_history_is_not_an_error() {
        let summary = EvaluationUseCase::new(Box::new(StaticSource(Vec::new())), 10)
            .evaluate()
            .await
            .unwrap();
        assert_eq!(summary.overall.sample_count, 0);
        assert!(summary.by_outcome.is_empty());
    }
}
