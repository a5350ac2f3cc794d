//! Statistical team-strength estimate, independent of market odds.
//!
//! Each signal is expressed as a home-minus-away differential so a missing input
//! contributes exactly zero. The weighted sum (plus a home-advantage constant) is a
//! rating; a logistic maps it to the home share of non-draw probability, and in
//! three-way markets the draw share shrinks as the rating moves away from zero.

use serde::{Deserialize, Serialize};

use crate::config::ModelWeights;
use crate::types::{HeadToHead, OutcomeProbabilities, TeamStats};

/// Per-signal differentials, kept for audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrengthComponents {
    pub win_rate_differential: f64,
    pub goal_differential: f64,
    pub form_differential: f64,
    pub head_to_head_balance: f64,
    pub home_advantage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelEstimate {
    pub probabilities: OutcomeProbabilities,
    /// Positive favours the home side
    pub rating: f64,
    pub components: StrengthComponents,
}

pub struct ModelInputs<'a> {
    pub home_stats: Option<&'a TeamStats>,
    pub away_stats: Option<&'a TeamStats>,
    pub home_form: Option<&'a str>,
    pub away_form: Option<&'a str>,
    pub h2h: Option<&'a HeadToHead>,
    pub three_way: bool,
}

/// Recency-weighted points share of a form string, oldest result first.
/// W = 3, D = 1, L = 0 points; the newest result weighs the most.
/// `None` when the string holds no results.
pub fn form_score(form: &str) -> Option<f64> {
    let points: Vec<f64> = form
        .chars()
        .filter_map(|c| match c.to_ascii_uppercase() {
            'W' => Some(3.0),
            'D' => Some(1.0),
            'L' => Some(0.0),
            _ => None,
        })
        .collect();
    if points.is_empty() {
        return None;
    }

    let (weighted, total_weight) = points
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(acc, w_sum), (i, p)| {
            let w = (i + 1) as f64;
            (acc + w * p / 3.0, w_sum + w)
        });
    Some(weighted / total_weight)
}

fn differential(home: Option<f64>, away: Option<f64>) -> f64 {
    match (home, away) {
        (Some(h), Some(a)) => h - a,
        _ => 0.0,
    }
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

pub fn estimate_team_strength(inputs: &ModelInputs<'_>, weights: &ModelWeights) -> ModelEstimate {
    let win_rate_differential = differential(
        inputs.home_stats.and_then(TeamStats::win_rate),
        inputs.away_stats.and_then(TeamStats::win_rate),
    );
    // Goals per game are unbounded; tanh keeps a rout from dominating the rating.
    let goal_differential = (differential(
        inputs.home_stats.and_then(TeamStats::goal_difference_per_game),
        inputs.away_stats.and_then(TeamStats::goal_difference_per_game),
    ) / 2.0)
        .tanh();
    let form_differential = differential(
        inputs.home_form.and_then(form_score),
        inputs.away_form.and_then(form_score),
    );
    let head_to_head_balance = inputs
        .h2h
        .filter(|h| h.total > 0)
        .map(|h| (h.home_wins as f64 - h.away_wins as f64) / h.total as f64)
        .unwrap_or(0.0);

    let components = StrengthComponents {
        win_rate_differential,
        goal_differential,
        form_differential,
        head_to_head_balance,
        home_advantage: weights.home_advantage,
    };

    let rating = weights.win_rate * win_rate_differential
        + weights.goal_difference * goal_differential
        + weights.form * form_differential
        + weights.head_to_head * head_to_head_balance
        + weights.home_advantage;

    let home_share = logistic(weights.logistic_scale * rating);
    let probabilities = if inputs.three_way {
        let draw = weights.base_draw * (-rating.abs()).exp();
        OutcomeProbabilities::new(
            (1.0 - draw) * home_share,
            (1.0 - draw) * (1.0 - home_share),
            Some(draw),
        )
    } else {
        OutcomeProbabilities::new(home_share, 1.0 - home_share, None)
    };

    ModelEstimate {
        probabilities: probabilities.normalized(),
        rating,
        components,
    }
}
