use serde::{Deserialize, Serialize};

use crate::constants::{MIN_FORM_LENGTH, MIN_ROBUST_BOOKMAKERS, MIN_SAMPLE_MATCHES};
use crate::types::{HeadToHead, TeamStats};

/// Raw data-availability signals for one match. Measurement only: no scores,
/// no levels, no knowledge of downstream penalties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDataQualityFlags {
    pub insufficient_home_sample: bool,
    pub short_home_form: bool,
    pub insufficient_away_sample: bool,
    pub short_away_form: bool,
    pub no_head_to_head: bool,
    pub single_source_odds: bool,
    pub thin_market: bool,

    // Counts the flags were derived from. `None` means the field was not supplied.
    pub home_matches_played: Option<u32>,
    pub away_matches_played: Option<u32>,
    pub home_form_length: Option<usize>,
    pub away_form_length: Option<usize>,
    pub head_to_head_total: Option<u32>,
    pub bookmaker_count: usize,
}

impl RawDataQualityFlags {
    /// Flags in reporting order: home, away, head-to-head, market
    pub fn raised(&self) -> Vec<QualityFlag> {
        [
            (QualityFlag::InsufficientHomeSample, self.insufficient_home_sample),
            (QualityFlag::ShortHomeForm, self.short_home_form),
            (QualityFlag::InsufficientAwaySample, self.insufficient_away_sample),
            (QualityFlag::ShortAwayForm, self.short_away_form),
            (QualityFlag::NoHeadToHead, self.no_head_to_head),
            (QualityFlag::SingleSourceOdds, self.single_source_odds),
            (QualityFlag::ThinMarket, self.thin_market),
        ]
        .into_iter()
        .filter_map(|(flag, raised)| raised.then_some(flag))
        .collect()
    }

    pub fn raised_count(&self) -> usize {
        self.raised().len()
    }
}

/// Identifies a single raw flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QualityFlag {
    InsufficientHomeSample,
    ShortHomeForm,
    InsufficientAwaySample,
    ShortAwayForm,
    NoHeadToHead,
    SingleSourceOdds,
    ThinMarket,
}

/// Everything the extractor looks at, borrowed from the pipeline input
pub struct DataQualitySources<'a> {
    pub home_stats: Option<&'a TeamStats>,
    pub away_stats: Option<&'a TeamStats>,
    pub home_form: Option<&'a str>,
    pub away_form: Option<&'a str>,
    pub h2h: Option<&'a HeadToHead>,
    /// Number of quotes that survived odds validation
    pub bookmaker_count: usize,
}

/// Number of W/D/L characters in a form string; anything else is ignored
pub fn form_length(form: &str) -> usize {
    form.chars()
        .filter(|c| matches!(c.to_ascii_uppercase(), 'W' | 'D' | 'L'))
        .count()
}

pub fn extract_data_quality(sources: &DataQualitySources<'_>) -> RawDataQualityFlags {
    let home_played = sources.home_stats.map(|s| s.played);
    let away_played = sources.away_stats.map(|s| s.played);
    let home_form_length = sources.home_form.map(form_length);
    let away_form_length = sources.away_form.map(form_length);
    let h2h_total = sources.h2h.map(|h| h.total);

    let short_sample = |played: Option<u32>| played.map_or(true, |p| p < MIN_SAMPLE_MATCHES);
    let short_form = |len: Option<usize>| len.map_or(true, |l| l < MIN_FORM_LENGTH);

    RawDataQualityFlags {
        insufficient_home_sample: short_sample(home_played),
        short_home_form: short_form(home_form_length),
        insufficient_away_sample: short_sample(away_played),
        short_away_form: short_form(away_form_length),
        no_head_to_head: h2h_total.map_or(true, |t| t == 0),
        single_source_odds: sources.bookmaker_count < 2,
        thin_market: sources.bookmaker_count < MIN_ROBUST_BOOKMAKERS,
        home_matches_played: home_played,
        away_matches_played: away_played,
        home_form_length,
        away_form_length,
        head_to_head_total: h2h_total,
        bookmaker_count: sources.bookmaker_count,
    }
}
