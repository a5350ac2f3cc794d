use accuracy_core::pipeline::interpretation::{QualityLevel, VolatilityLevel};
use accuracy_core::pipeline::{format_for_llm, run_accuracy_pipeline, Confidence};
use accuracy_core::{AccuracyError, BookmakerQuote, HeadToHead, PipelineInput, TeamStats};
use anyhow::Result;

fn premier_league_fixture() -> PipelineInput {
    let mut input = PipelineInput::new(
        "epl-2024-0412",
        "Arsenal",
        "Chelsea",
        vec![
            BookmakerQuote::new("Bet365", 1.85, 4.20, Some(3.60)),
            BookmakerQuote::new("Unibet", 1.90, 4.00, Some(3.50)),
            BookmakerQuote::new("WilliamHill", 1.87, 4.10, Some(3.55)),
        ],
    );
    input.home_stats = Some(TeamStats::new(15, 10, 3, 2));
    input.away_stats = Some(TeamStats::new(15, 8, 4, 3));
    input.home_form = Some("WWDWW".to_string());
    input.away_form = Some("WLDWL".to_string());
    input.h2h = Some(HeadToHead::new(10, 4, 3, 3));
    input
}

#[test]
fn test_full_pipeline_on_complete_fixture() -> Result<()> {
    let result = run_accuracy_pipeline(&premier_league_fixture())?;
    let market = &result.details.market_probabilities;

    // Averaged implied home probability before margin removal
    let raw_home = market.implied_probabilities_raw.home;
    assert!((0.52..=0.54).contains(&raw_home), "raw home was {}", raw_home);

    // Proportional de-vig of the same market
    let no_vig_home = market.implied_probabilities_no_vig.home;
    assert!((no_vig_home - 0.504).abs() < 0.002, "no-vig home was {}", no_vig_home);
    assert!((market.implied_probabilities_no_vig.sum() - 1.0).abs() < 1e-9);
    assert!(market.market_margin > 0.0);
    assert_eq!(market.bookmaker_count, 3);

    let output = &result.output;
    assert!((output.probabilities.sum() - 100.0).abs() < 0.2);
    assert!(output.probabilities.draw.is_some());
    assert_eq!(output.data_quality, QualityLevel::High);
    assert_eq!(output.volatility, VolatilityLevel::Low);
    assert!(!output.suppress_edge);
    assert!(output.warnings.is_empty());
    Ok(())
}

#[test]
fn test_pipeline_output_is_idempotent() -> Result<()> {
    let input = premier_league_fixture();
    let first = serde_json::to_string(&run_accuracy_pipeline(&input)?)?;
    let second = serde_json::to_string(&run_accuracy_pipeline(&input)?)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_quote_order_does_not_change_result() -> Result<()> {
    let input = premier_league_fixture();
    let mut reversed = input.clone();
    reversed.odds.reverse();
    let a = run_accuracy_pipeline(&input)?;
    let b = run_accuracy_pipeline(&reversed)?;
    assert_eq!(a.output, b.output);
    Ok(())
}

#[test]
fn test_single_bookmaker_suppresses_edge() -> Result<()> {
    let mut input = premier_league_fixture();
    input.odds.truncate(1);
    let result = run_accuracy_pipeline(&input)?;

    assert_eq!(result.output.volatility, VolatilityLevel::Unknown);
    assert!(result.output.suppress_edge);
    assert!(result.details.raw_quality_flags.single_source_odds);
    assert!(result.details.raw_quality_flags.thin_market);
    Ok(())
}

#[test]
fn test_two_way_market_has_no_draw() -> Result<()> {
    let input = PipelineInput::new(
        "nba-1",
        "Celtics",
        "Knicks",
        vec![
            BookmakerQuote::new("A", 1.60, 2.40, None),
            BookmakerQuote::new("B", 1.62, 2.35, None),
            BookmakerQuote::new("C", 1.58, 2.45, None),
        ],
    );
    let result = run_accuracy_pipeline(&input)?;
    assert!(result.output.probabilities.draw.is_none());
    assert!(result.details.calibrated_probabilities.draw.is_none());
    assert!((result.details.calibrated_probabilities.sum() - 1.0).abs() < 1e-9);

    let text = format_for_llm(&result, "Celtics", "Knicks");
    assert!(!text.contains("Draw:"));
    Ok(())
}

#[test]
fn test_all_invalid_odds_is_an_error() {
    let input = PipelineInput::new(
        "bad",
        "H",
        "A",
        vec![
            BookmakerQuote::new("A", 0.9, 2.0, None),
            BookmakerQuote::new("B", 1.0, f64::NAN, None),
        ],
    );
    let err = run_accuracy_pipeline(&input).unwrap_err();
    assert!(matches!(err, AccuracyError::NoValidOdds { .. }));
    assert!(err.is_validation());
}

#[test]
fn test_empty_odds_is_an_error() {
    let input = PipelineInput::new("empty", "H", "A", Vec::new());
    assert!(matches!(
        run_accuracy_pipeline(&input).unwrap_err(),
        AccuracyError::EmptyOdds
    ));
}

#[test]
fn test_missing_optional_data_degrades_without_failing() -> Result<()> {
    let mut input = premier_league_fixture();
    input.home_stats = None;
    input.away_stats = None;
    input.home_form = None;
    input.away_form = None;
    input.h2h = None;

    let result = run_accuracy_pipeline(&input)?;
    assert_eq!(result.output.data_quality, QualityLevel::Low);
    assert!(result.output.suppress_edge);
    assert!(result
        .output
        .warnings
        .iter()
        .any(|w| w.contains("Head-to-head")));
    Ok(())
}

#[test]
fn test_quality_score_never_increases_as_data_is_removed() -> Result<()> {
    let mut input = premier_league_fixture();
    let mut last_score = run_accuracy_pipeline(&input)?.details.quality_assessment.score;

    let removals: Vec<Box<dyn Fn(&mut PipelineInput)>> = vec![
        Box::new(|i: &mut PipelineInput| i.h2h = None),
        Box::new(|i: &mut PipelineInput| i.home_form = Some("WW".to_string())),
        Box::new(|i: &mut PipelineInput| i.away_stats = None),
        Box::new(|i: &mut PipelineInput| i.odds.truncate(2)),
        Box::new(|i: &mut PipelineInput| i.odds.truncate(1)),
    ];
    for remove in removals {
        remove(&mut input);
        let score = run_accuracy_pipeline(&input)?.details.quality_assessment.score;
        assert!(score <= last_score, "score rose from {} to {}", last_score, score);
        last_score = score;
    }
    assert!(last_score < 50.0);
    Ok(())
}

#[test]
fn test_text_rendering_mentions_teams_and_labels() -> Result<()> {
    let result = run_accuracy_pipeline(&premier_league_fixture())?;
    let text = format_for_llm(&result, "Arsenal", "Chelsea");
    assert!(text.starts_with("MATCH ANALYSIS: Arsenal vs Chelsea"));
    assert!(text.contains("Confidence:"));
    assert_eq!(text, format_for_llm(&result, "Arsenal", "Chelsea"));
    Ok(())
}

#[test]
fn test_dispersed_market_suppresses_edge_despite_complete_data() -> Result<()> {
    let mut input = premier_league_fixture();
    input.odds = vec![
        BookmakerQuote::new("Bet365", 1.50, 6.00, Some(3.00)),
        BookmakerQuote::new("Unibet", 3.00, 2.50, Some(3.40)),
        BookmakerQuote::new("WilliamHill", 5.00, 1.60, Some(4.50)),
    ];
    let result = run_accuracy_pipeline(&input)?;

    assert_eq!(result.details.quality_assessment.score, 100.0);
    assert_eq!(result.output.data_quality, QualityLevel::High);
    assert!(result.details.raw_volatility.avg_cv >= result.details.volatility_assessment.threshold);
    assert_eq!(result.output.volatility, VolatilityLevel::High);
    assert!(result.output.suppress_edge);
    assert_eq!(result.output.confidence, Confidence::Low);
    assert!(result
        .output
        .warnings
        .iter()
        .any(|w| w.contains("market volatility HIGH")));
    Ok(())
}
