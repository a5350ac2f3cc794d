use serde::{Deserialize, Serialize};

use crate::types::BookmakerQuote;

/// Cross-bookmaker dispersion of quoted odds. Pure measurement, no levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVolatilityStats {
    pub bookmaker_count: usize,
    pub home_std_dev: f64,
    pub away_std_dev: f64,
    pub draw_std_dev: Option<f64>,
    /// Mean coefficient of variation over the outcomes present
    #[serde(rename = "avgCV")]
    pub avg_cv: f64,
}

/// Sample standard deviation (n - 1). Zero for fewer than two values.
///
/// Deviations are taken on data shifted by the first value, so repeated
/// identical values give exactly zero for any n.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let origin = values[0];
    let shifted_mean = values.iter().map(|v| v - origin).sum::<f64>() / n as f64;
    let variance = values
        .iter()
        .map(|v| (v - origin - shifted_mean).powi(2))
        .sum::<f64>()
        / (n - 1) as f64;
    variance.max(0.0).sqrt()
}

/// stddev / mean, or zero when the mean is not positive
fn coefficient_of_variation(values: &[f64], std_dev: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if mean > 0.0 && mean.is_finite() {
        std_dev / mean
    } else {
        0.0
    }
}

fn sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(|a, b| a.total_cmp(b));
    values
}

/// Compute dispersion statistics over already-validated quotes.
/// Draw statistics are produced only when every quote prices the draw.
pub fn analyze_volatility(quotes: &[BookmakerQuote]) -> RawVolatilityStats {
    let home = sorted(quotes.iter().map(|q| q.home_odds).collect());
    let away = sorted(quotes.iter().map(|q| q.away_odds).collect());
    let prices_draw = !quotes.is_empty() && quotes.iter().all(|q| q.draw_odds.is_some());
    let draw: Option<Vec<f64>> =
        prices_draw.then(|| sorted(quotes.iter().filter_map(|q| q.draw_odds).collect()));

    let home_std_dev = sample_std_dev(&home);
    let away_std_dev = sample_std_dev(&away);
    let draw_std_dev = draw.as_ref().map(|d| sample_std_dev(d));

    let mut cvs = vec![
        coefficient_of_variation(&home, home_std_dev),
        coefficient_of_variation(&away, away_std_dev),
    ];
    if let (Some(values), Some(sd)) = (draw.as_ref(), draw_std_dev) {
        cvs.push(coefficient_of_variation(values, sd));
    }
    let avg_cv = cvs.iter().sum::<f64>() / cvs.len() as f64;

    RawVolatilityStats {
        bookmaker_count: quotes.len(),
        home_std_dev,
        away_std_dev,
        draw_std_dev,
        avg_cv,
    }
}
