use accuracy_core::pipeline::extraction::{analyze_volatility, normalize_odds};
use accuracy_core::pipeline::interpretation::{QualityLevel, VolatilityLevel};
use accuracy_core::pipeline::orchestrator::{
    determine_confidence, should_suppress_edge, EdgeQuality,
};
use accuracy_core::pipeline::{run_accuracy_pipeline, Confidence};
use accuracy_core::{AggregationMethod, BookmakerQuote, PipelineInput};
use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const QUALITY_LEVELS: [QualityLevel; 3] =
    [QualityLevel::Low, QualityLevel::Medium, QualityLevel::High];
const VOLATILITY_LEVELS: [VolatilityLevel; 4] = [
    VolatilityLevel::Low,
    VolatilityLevel::Medium,
    VolatilityLevel::High,
    VolatilityLevel::Unknown,
];
const EDGE_QUALITIES: [EdgeQuality; 4] = [
    EdgeQuality::None,
    EdgeQuality::Low,
    EdgeQuality::Medium,
    EdgeQuality::High,
];

fn random_quotes(rng: &mut StdRng, three_way: bool) -> Vec<BookmakerQuote> {
    let books = rng.gen_range(1..=8);
    (0..books)
        .map(|i| {
            let draw = three_way.then(|| rng.gen_range(1.01..15.0));
            BookmakerQuote::new(
                &format!("book-{}", i),
                rng.gen_range(1.01..15.0),
                rng.gen_range(1.01..15.0),
                draw,
            )
        })
        .collect()
}

#[test]
fn test_suppression_holds_for_every_level_combination() {
    for quality in QUALITY_LEVELS {
        for volatility in VOLATILITY_LEVELS {
            let expected = quality == QualityLevel::Low
                || matches!(volatility, VolatilityLevel::High | VolatilityLevel::Unknown);
            assert_eq!(
                should_suppress_edge(quality, volatility),
                expected,
                "quality {} volatility {}",
                quality,
                volatility
            );
        }
    }
}

#[test]
fn test_noisy_market_never_yields_above_low_confidence() {
    for quality in QUALITY_LEVELS {
        for edge in EDGE_QUALITIES {
            for volatility in [VolatilityLevel::High, VolatilityLevel::Unknown] {
                assert_eq!(determine_confidence(quality, volatility, edge), Confidence::Low);
            }
        }
    }
}

#[test]
fn test_high_confidence_requires_high_quality_and_calm_market() {
    for quality in QUALITY_LEVELS {
        for volatility in VOLATILITY_LEVELS {
            for edge in EDGE_QUALITIES {
                if determine_confidence(quality, volatility, edge) == Confidence::High {
                    assert_eq!(quality, QualityLevel::High);
                    assert_eq!(volatility, VolatilityLevel::Low);
                }
            }
        }
    }
}

#[test]
fn test_no_vig_probabilities_form_a_distribution() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(7);
    for round in 0..500 {
        let three_way = round % 2 == 0;
        let quotes = random_quotes(&mut rng, three_way);
        for method in [AggregationMethod::Mean, AggregationMethod::Median] {
            let market = normalize_odds(&quotes, method)?.market;
            let no_vig = &market.implied_probabilities_no_vig;

            assert!((no_vig.sum() - 1.0).abs() < 1e-9);
            assert!(no_vig.entries().iter().all(|(_, p)| *p > 0.0 && *p < 1.0));
            assert_eq!(no_vig.has_draw(), three_way);
            assert!(market.market_margin >= 0.0);
        }
    }
    Ok(())
}

#[test]
fn test_random_matches_produce_consistent_outputs() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(42);
    for round in 0..200 {
        let quotes = random_quotes(&mut rng, round % 3 != 0);
        let input = PipelineInput::new(&format!("m{}", round), "H", "A", quotes);
        let result = run_accuracy_pipeline(&input)?;

        let calibrated = &result.details.calibrated_probabilities;
        assert!((calibrated.sum() - 1.0).abs() < 1e-9);
        assert_eq!(result.output.favored, calibrated.argmax());
        assert_eq!(
            result.output.suppress_edge,
            should_suppress_edge(result.output.data_quality, result.output.volatility)
        );
        let weight = result.details.model_weight;
        assert!((0.15..=0.5).contains(&weight));
    }
    Ok(())
}

#[test]
fn test_identical_quotes_have_zero_dispersion() {
    let quotes: Vec<BookmakerQuote> = (0..5)
        .map(|i| BookmakerQuote::new(&format!("book-{}", i), 2.2, 3.1, Some(3.4)))
        .collect();
    let stats = analyze_volatility(&quotes);
    assert_eq!(stats.bookmaker_count, 5);
    assert_eq!(stats.home_std_dev, 0.0);
    assert_eq!(stats.away_std_dev, 0.0);
    assert_eq!(stats.draw_std_dev, Some(0.0));
    assert_eq!(stats.avg_cv, 0.0);
}
