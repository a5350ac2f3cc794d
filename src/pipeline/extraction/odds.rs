use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AggregationMethod;
use crate::error::{AccuracyError, Result};
use crate::types::{BookmakerQuote, OutcomeProbabilities};

/// Market view of a match after combining every valid bookmaker quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketProbabilities {
    /// Aggregated 1/odds per outcome; sums to 1 + margin
    pub implied_probabilities_raw: OutcomeProbabilities,
    /// Raw probabilities rescaled to sum to 1
    pub implied_probabilities_no_vig: OutcomeProbabilities,
    /// Overround: sum of raw probabilities minus 1, never negative
    pub market_margin: f64,
    /// Number of quotes that survived validation
    pub bookmaker_count: usize,
    pub aggregation: AggregationMethod,
}

/// Quotes that passed validation, plus warnings for the ones that did not
#[derive(Debug, Clone, Default)]
pub struct QuoteSelection {
    pub valid: Vec<BookmakerQuote>,
    pub warnings: Vec<String>,
    /// True when the market prices a draw
    pub three_way: bool,
}

impl QuoteSelection {
    pub fn dropped(&self) -> usize {
        self.warnings.len()
    }
}

/// Output of the odds normalizer
#[derive(Debug, Clone)]
pub struct NormalizedOdds {
    pub market: MarketProbabilities,
    pub selection: QuoteSelection,
}

fn is_valid_odds(odds: f64) -> bool {
    odds.is_finite() && odds > 1.0
}

/// Split quotes into usable and dropped. A market is three-way as soon as one
/// otherwise-valid quote carries draw odds; quotes without a draw price are then
/// excluded so every outcome is averaged over the same books.
pub fn select_valid_quotes(quotes: &[BookmakerQuote]) -> QuoteSelection {
    let mut selection = QuoteSelection::default();
    let mut candidates = Vec::with_capacity(quotes.len());

    for quote in quotes {
        let draw_ok = quote.draw_odds.map_or(true, is_valid_odds);
        if is_valid_odds(quote.home_odds) && is_valid_odds(quote.away_odds) && draw_ok {
            candidates.push(quote.clone());
        } else {
            let message = format!(
                "Dropped quote from {}: decimal odds must exceed 1.0 (home {}, away {}, draw {})",
                quote.bookmaker,
                quote.home_odds,
                quote.away_odds,
                quote
                    .draw_odds
                    .map_or_else(|| "-".to_string(), |d| d.to_string())
            );
            warn!(bookmaker = %quote.bookmaker, "{}", message);
            selection.warnings.push(message);
        }
    }

    selection.three_way = candidates.iter().any(|q| q.draw_odds.is_some());

    for quote in candidates {
        if selection.three_way && quote.draw_odds.is_none() {
            let message = format!(
                "Dropped quote from {}: missing draw odds in a three-way market",
                quote.bookmaker
            );
            warn!(bookmaker = %quote.bookmaker, "{}", message);
            selection.warnings.push(message);
        } else {
            selection.valid.push(quote);
        }
    }

    selection
}

fn inverse_odds(quotes: &[BookmakerQuote], pick: impl Fn(&BookmakerQuote) -> f64) -> Vec<f64> {
    quotes.iter().map(|q| 1.0 / pick(q)).collect()
}

/// Combine values into one. Values are sorted first so the result does not
/// depend on the order bookmakers were supplied in.
pub fn aggregate(values: &[f64], method: AggregationMethod) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    match method {
        AggregationMethod::Mean => sorted.iter().sum::<f64>() / sorted.len() as f64,
        AggregationMethod::Median => {
            let mid = sorted.len() / 2;
            if sorted.len() % 2 == 0 {
                (sorted[mid - 1] + sorted[mid]) / 2.0
            } else {
                sorted[mid]
            }
        }
    }
}

/// Convert bookmaker quotes into raw and margin-free implied probabilities.
///
/// Fails fast when no quotes are supplied or none survive validation; invalid
/// individual quotes are dropped with a warning.
pub fn normalize_odds(
    quotes: &[BookmakerQuote],
    method: AggregationMethod,
) -> Result<NormalizedOdds> {
    if quotes.is_empty() {
        return Err(AccuracyError::EmptyOdds);
    }

    let selection = select_valid_quotes(quotes);
    if selection.valid.is_empty() {
        return Err(AccuracyError::NoValidOdds {
            dropped: selection.dropped(),
        });
    }

    let home = aggregate(&inverse_odds(&selection.valid, |q| q.home_odds), method);
    let away = aggregate(&inverse_odds(&selection.valid, |q| q.away_odds), method);
    let draw = selection.three_way.then(|| {
        let draws: Vec<f64> = selection
            .valid
            .iter()
            .filter_map(|q| q.draw_odds.map(|d| 1.0 / d))
            .collect();
        aggregate(&draws, method)
    });

    let raw = OutcomeProbabilities::new(home, away, draw);
    let market_margin = (raw.sum() - 1.0).max(0.0);
    let no_vig = raw.normalized();

    debug!(
        bookmakers = selection.valid.len(),
        margin = market_margin,
        "Normalized market odds"
    );

    Ok(NormalizedOdds {
        market: MarketProbabilities {
            implied_probabilities_raw: raw,
            implied_probabilities_no_vig: no_vig,
            market_margin,
            bookmaker_count: selection.valid.len(),
            aggregation: method,
        },
        selection,
    })
}
