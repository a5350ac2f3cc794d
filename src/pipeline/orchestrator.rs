//! Orchestration layer: runs extraction, interpretation and the statistical model,
//! blends model and market, and applies the edge suppression guardrail.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info_span};

use crate::config::{BlendPolicy, EdgeBands};
use crate::error::Result;
use crate::pipeline::extraction::{
    analyze_volatility, extract_data_quality, normalize_odds, DataQualitySources,
    MarketProbabilities, RawDataQualityFlags, RawVolatilityStats,
};
use crate::pipeline::interpretation::{
    interpret_volatility, DefaultQualityInterpreter, QualityAssessment, QualityInterpreter,
    QualityLevel, VolatilityAssessment, VolatilityLevel,
};
use crate::pipeline::model::{estimate_team_strength, ModelEstimate, ModelInputs};
use crate::types::{Outcome, OutcomeProbabilities, PipelineInput};

/// Magnitude band of the primary edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EdgeQuality {
    None,
    Low,
    Medium,
    High,
}

impl EdgeQuality {
    pub fn classify(magnitude: f64, bands: &EdgeBands) -> Self {
        if magnitude >= bands.high {
            EdgeQuality::High
        } else if magnitude >= bands.medium {
            EdgeQuality::Medium
        } else if magnitude >= bands.low {
            EdgeQuality::Low
        } else {
            EdgeQuality::None
        }
    }
}

impl fmt::Display for EdgeQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EdgeQuality::None => "NONE",
            EdgeQuality::Low => "LOW",
            EdgeQuality::Medium => "MEDIUM",
            EdgeQuality::High => "HIGH",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Confidence::Low => "LOW",
            Confidence::Medium => "MEDIUM",
            Confidence::High => "HIGH",
        };
        write!(f, "{}", s)
    }
}

/// The outcome with the largest calibrated-vs-market gap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeSummary {
    pub outcome: Outcome,
    /// Signed, in percentage points
    pub value: f64,
    pub quality: EdgeQuality,
}

/// Full intermediate state, kept for audit and debugging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineDetails {
    pub market_probabilities: MarketProbabilities,
    pub raw_volatility: RawVolatilityStats,
    pub volatility_assessment: VolatilityAssessment,
    pub raw_quality_flags: RawDataQualityFlags,
    pub quality_assessment: QualityAssessment,
    pub model: ModelEstimate,
    pub model_weight: f64,
    pub calibrated_probabilities: OutcomeProbabilities,
    /// calibrated minus market no-vig, as fractions
    pub edges: OutcomeProbabilities,
}

/// Decision-ready view. Probabilities are percentages rounded to one decimal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutput {
    pub probabilities: OutcomeProbabilities,
    pub edge: EdgeSummary,
    pub favored: Outcome,
    pub confidence: Confidence,
    pub data_quality: QualityLevel,
    pub volatility: VolatilityLevel,
    pub suppress_edge: bool,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub match_id: String,
    pub details: PipelineDetails,
    pub output: PipelineOutput,
}

fn round_percent(fraction: f64) -> f64 {
    (fraction * 1000.0).round() / 10.0
}

/// Weight given to the statistical model; the market gets the remainder
pub fn model_weight(quality_score: f64, blend: &BlendPolicy) -> f64 {
    (quality_score / 100.0).clamp(blend.min_model_weight, blend.max_model_weight)
}

/// Blend model and market vectors outcome-by-outcome and renormalize
pub fn blend_probabilities(
    model: &OutcomeProbabilities,
    market: &OutcomeProbabilities,
    weight_model: f64,
) -> OutcomeProbabilities {
    model
        .zip_with(market, |m, k| weight_model * m + (1.0 - weight_model) * k)
        .normalized()
}

/// Outcome with the largest absolute edge; ties resolved in `Outcome::ORDER`
pub fn primary_edge(edges: &OutcomeProbabilities) -> (Outcome, f64) {
    let mut best = (Outcome::Home, edges.home);
    for (outcome, value) in edges.entries() {
        if value.abs() > best.1.abs() {
            best = (outcome, value);
        }
    }
    best
}

/// Confidence rule table. Volatility gates first, then data quality, then edge size:
/// a large disagreement with the market lowers confidence rather than raising it.
pub fn determine_confidence(
    data_quality: QualityLevel,
    volatility: VolatilityLevel,
    edge: EdgeQuality,
) -> Confidence {
    use Confidence as C;
    use EdgeQuality as E;
    use QualityLevel as Q;
    use VolatilityLevel as V;

    match (data_quality, volatility, edge) {
        (_, V::High | V::Unknown, _) => C::Low,

        (Q::Low, V::Low, E::None) => C::Medium,
        (Q::Low, _, _) => C::Low,

        (Q::Medium, V::Low, E::None | E::Low) => C::Medium,
        (Q::Medium, V::Medium, E::None) => C::Medium,
        (Q::Medium, _, _) => C::Low,

        (Q::High, V::Low, E::High) => C::Medium,
        (Q::High, V::Low, _) => C::High,
        (Q::High, V::Medium, E::High) => C::Low,
        (Q::High, V::Medium, _) => C::Medium,
    }
}

/// The guardrail: never surface an edge computed from unreliable data or a noisy market.
/// Unknown volatility (fewer than two books) counts as noisy.
pub fn should_suppress_edge(data_quality: QualityLevel, volatility: VolatilityLevel) -> bool {
    data_quality == QualityLevel::Low
        || matches!(volatility, VolatilityLevel::High | VolatilityLevel::Unknown)
}

fn degraded_data_warnings(input: &PipelineInput) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut missing = |present: bool, what: &str| {
        if !present {
            warnings.push(format!("{} unavailable; using neutral values", what));
        }
    };
    missing(input.home_stats.is_some(), "Home team statistics");
    missing(input.away_stats.is_some(), "Away team statistics");
    missing(input.home_form.is_some(), "Home team form");
    missing(input.away_form.is_some(), "Away team form");
    missing(input.h2h.is_some(), "Head-to-head history");
    warnings
}

/// Run the full accuracy pipeline for one match.
///
/// Pure and deterministic: identical input yields an identical result. Fails only
/// on invalid configuration or when no usable odds exist; missing optional data
/// produces a degraded but complete result.
pub fn run_accuracy_pipeline(input: &PipelineInput) -> Result<PipelineResult> {
    let span = info_span!("accuracy_pipeline", match_id = %input.match_id);
    let _enter = span.enter();

    let config = &input.config;
    config.validate()?;

    // 1. Market probabilities
    let normalized = normalize_odds(&input.odds, config.aggregation)?;
    let market = normalized.market;
    let selection = normalized.selection;

    // 2. Dispersion, then its interpretation
    let raw_volatility = analyze_volatility(&selection.valid);
    let volatility_assessment = interpret_volatility(&raw_volatility, config.volatility_threshold);

    // 3. Data quality flags, then their interpretation
    let raw_quality_flags = extract_data_quality(&DataQualitySources {
        home_stats: input.home_stats.as_ref(),
        away_stats: input.away_stats.as_ref(),
        home_form: input.home_form.as_deref(),
        away_form: input.away_form.as_deref(),
        h2h: input.h2h.as_ref(),
        bookmaker_count: market.bookmaker_count,
    });
    let quality_assessment = DefaultQualityInterpreter::with_policy(config.quality.clone())
        .interpret(&raw_quality_flags);

    // 4. Market-independent team strength
    let model = estimate_team_strength(
        &ModelInputs {
            home_stats: input.home_stats.as_ref(),
            away_stats: input.away_stats.as_ref(),
            home_form: input.home_form.as_deref(),
            away_form: input.away_form.as_deref(),
            h2h: input.h2h.as_ref(),
            three_way: selection.three_way,
        },
        &config.model,
    );

    // 5. Quality-weighted blend
    let weight = model_weight(quality_assessment.score, &config.blend);
    let calibrated = blend_probabilities(
        &model.probabilities,
        &market.implied_probabilities_no_vig,
        weight,
    );

    // 6. Edge
    let edges = calibrated.zip_with(&market.implied_probabilities_no_vig, |c, m| c - m);
    let (edge_outcome, edge_value) = primary_edge(&edges);
    let edge_quality = EdgeQuality::classify(edge_value.abs(), &config.edge_bands);

    // 7-9. Favored side, confidence, guardrail
    let favored = calibrated.argmax();
    let confidence = determine_confidence(
        quality_assessment.level,
        volatility_assessment.level,
        edge_quality,
    );
    let suppress_edge = should_suppress_edge(quality_assessment.level, volatility_assessment.level);

    let mut warnings = selection.warnings.clone();
    warnings.extend(degraded_data_warnings(input));
    if suppress_edge {
        warnings.push(format!(
            "Edge suppressed: data quality {}, market volatility {}",
            quality_assessment.level, volatility_assessment.level
        ));
    }

    debug!(
        model_weight = weight,
        edge_outcome = %edge_outcome,
        edge_value,
        %confidence,
        suppress_edge,
        "Accuracy pipeline complete"
    );

    // 10. Assemble
    let output = PipelineOutput {
        probabilities: calibrated.map(round_percent),
        edge: EdgeSummary {
            outcome: edge_outcome,
            value: round_percent(edge_value),
            quality: edge_quality,
        },
        favored,
        confidence,
        data_quality: quality_assessment.level,
        volatility: volatility_assessment.level,
        suppress_edge,
        warnings,
    };

    Ok(PipelineResult {
        match_id: input.match_id.clone(),
        details: PipelineDetails {
            market_probabilities: market,
            raw_volatility,
            volatility_assessment,
            raw_quality_flags,
            quality_assessment,
            model,
            model_weight: weight,
            calibrated_probabilities: calibrated,
            edges,
        },
        output,
    })
}
