use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::PipelineConfig;

/// One of the settled outcomes of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Outcome {
    /// Fixed evaluation order. Used to break ties deterministically.
    pub const ORDER: [Outcome; 3] = [Outcome::Home, Outcome::Draw, Outcome::Away];

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Home => "home",
            Outcome::Draw => "draw",
            Outcome::Away => "away",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A probability (or probability-like value) per outcome.
/// `draw` is `None` for two-outcome sports and is never coerced to 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeProbabilities {
    pub home: f64,
    pub away: f64,
    pub draw: Option<f64>,
}

impl OutcomeProbabilities {
    pub fn new(home: f64, away: f64, draw: Option<f64>) -> Self {
        Self { home, away, draw }
    }

    pub fn has_draw(&self) -> bool {
        self.draw.is_some()
    }

    pub fn get(&self, outcome: Outcome) -> Option<f64> {
        match outcome {
            Outcome::Home => Some(self.home),
            Outcome::Away => Some(self.away),
            Outcome::Draw => self.draw,
        }
    }

    /// Present outcomes in `Outcome::ORDER`
    pub fn entries(&self) -> Vec<(Outcome, f64)> {
        Outcome::ORDER
            .iter()
            .filter_map(|o| self.get(*o).map(|p| (*o, p)))
            .collect()
    }

    pub fn sum(&self) -> f64 {
        self.home + self.away + self.draw.unwrap_or(0.0)
    }

    /// Apply `f` to every present outcome, keeping an absent draw absent
    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        Self {
            home: f(self.home),
            away: f(self.away),
            draw: self.draw.map(&f),
        }
    }

    /// Combine two vectors outcome-by-outcome. The draw is present only if both have one.
    pub fn zip_with<F: Fn(f64, f64) -> f64>(&self, other: &Self, f: F) -> Self {
        Self {
            home: f(self.home, other.home),
            away: f(self.away, other.away),
            draw: match (self.draw, other.draw) {
                (Some(a), Some(b)) => Some(f(a, b)),
                _ => None,
            },
        }
    }

    /// Rescale so the present outcomes sum to 1. A zero or non-finite sum
    /// falls back to a uniform vector instead of dividing by zero.
    pub fn normalized(&self) -> Self {
        let total = self.sum();
        if total.is_finite() && total > 0.0 {
            self.map(|p| p / total)
        } else {
            let n = if self.has_draw() { 3.0 } else { 2.0 };
            self.map(|_| 1.0 / n)
        }
    }

    /// The outcome with the largest value, ties resolved in `Outcome::ORDER`
    pub fn argmax(&self) -> Outcome {
        let mut best = (Outcome::Home, self.home);
        for (outcome, p) in self.entries() {
            if p > best.1 {
                best = (outcome, p);
            }
        }
        best.0
    }
}

/// A single bookmaker's decimal odds for a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmakerQuote {
    pub bookmaker: String,
    pub home_odds: f64,
    pub away_odds: f64,
    #[serde(default)]
    pub draw_odds: Option<f64>,
}

impl BookmakerQuote {
    pub fn new(bookmaker: &str, home_odds: f64, away_odds: f64, draw_odds: Option<f64>) -> Self {
        Self {
            bookmaker: bookmaker.to_string(),
            home_odds,
            away_odds,
            draw_odds,
        }
    }
}

/// Season aggregates for one team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    #[serde(default)]
    pub goals_for: Option<u32>,
    #[serde(default)]
    pub goals_against: Option<u32>,
}

impl TeamStats {
    pub fn new(played: u32, wins: u32, draws: u32, losses: u32) -> Self {
        Self {
            played,
            wins,
            draws,
            losses,
            goals_for: None,
            goals_against: None,
        }
    }

    pub fn with_goals(mut self, goals_for: u32, goals_against: u32) -> Self {
        self.goals_for = Some(goals_for);
        self.goals_against = Some(goals_against);
        self
    }

    pub fn win_rate(&self) -> Option<f64> {
        (self.played > 0).then(|| self.wins as f64 / self.played as f64)
    }

    pub fn goal_difference_per_game(&self) -> Option<f64> {
        match (self.goals_for, self.goals_against) {
            (Some(gf), Some(ga)) if self.played > 0 => {
                Some((gf as f64 - ga as f64) / self.played as f64)
            }
            _ => None,
        }
    }
}

/// Head-to-head summary from the perspective of this match's home team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadToHead {
    pub total: u32,
    pub home_wins: u32,
    pub draws: u32,
    pub away_wins: u32,
}

impl HeadToHead {
    pub fn new(total: u32, home_wins: u32, draws: u32, away_wins: u32) -> Self {
        Self {
            total,
            home_wins,
            draws,
            away_wins,
        }
    }
}

/// Everything the pipeline needs for one match, resolved upstream by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineInput {
    pub match_id: String,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub kickoff: Option<DateTime<Utc>>,
    #[serde(default)]
    pub home_stats: Option<TeamStats>,
    #[serde(default)]
    pub away_stats: Option<TeamStats>,
    /// Result string such as "WWDLW", oldest first
    #[serde(default)]
    pub home_form: Option<String>,
    #[serde(default)]
    pub away_form: Option<String>,
    #[serde(default)]
    pub h2h: Option<HeadToHead>,
    pub odds: Vec<BookmakerQuote>,
    #[serde(default)]
    pub config: PipelineConfig,
}

impl PipelineInput {
    /// Minimal input with only odds; everything optional left unset
    pub fn new(
        match_id: &str,
        home_team: &str,
        away_team: &str,
        odds: Vec<BookmakerQuote>,
    ) -> Self {
        Self {
            match_id: match_id.to_string(),
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            kickoff: None,
            home_stats: None,
            away_stats: None,
            home_form: None,
            away_form: None,
            h2h: None,
            odds,
            config: PipelineConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_keeps_missing_draw_absent() {
        let p = OutcomeProbabilities::new(0.6, 0.5, None).normalized();
        assert!(p.draw.is_none());
        assert!((p.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalized_zero_vector_falls_back_to_uniform() {
        let p = OutcomeProbabilities::new(0.0, 0.0, Some(0.0)).normalized();
        assert!((p.home - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(p.draw, Some(p.home));
    }

    #[test]
    fn test_argmax_breaks_ties_in_fixed_order() {
        let p = OutcomeProbabilities::new(0.4, 0.4, Some(0.2));
        assert_eq!(p.argmax(), Outcome::Home);
        let p = OutcomeProbabilities::new(0.3, 0.35, Some(0.35));
        assert_eq!(p.argmax(), Outcome::Draw);
    }

    #[test]
    fn test_team_stats_rates() {
        let stats = TeamStats::new(15, 10, 3, 2).with_goals(30, 12);
        assert!((stats.win_rate().unwrap() - 10.0 / 15.0).abs() < 1e-12);
        assert!((stats.goal_difference_per_game().unwrap() - 1.2).abs() < 1e-12);
        assert!(TeamStats::new(0, 0, 0, 0).win_rate().is_none());
        assert!(TeamStats::new(5, 1, 1, 3).goal_difference_per_game().is_none());
    }

    #[test]
    fn test_input_deserializes_camel_case_with_defaults() {
        let json = r#"{
            "matchId": "m1",
            "homeTeam": "Arsenal",
            "awayTeam": "Chelsea",
            "homeStats": {"played": 15, "wins": 10, "draws": 3, "losses": 2},
            "odds": [{"bookmaker": "Bet365", "homeOdds": 1.85, "awayOdds": 4.2, "drawOdds": 3.6}],
            "config": {"logPredictions": true}
        }"#;
        let input: PipelineInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.home_stats.unwrap().wins, 10);
        assert!(input.away_stats.is_none());
        assert_eq!(input.odds[0].draw_odds, Some(3.6));
        assert!(input.config.log_predictions);
        assert_eq!(input.config.volatility_threshold, 0.3);
    }
}
