use std::fmt::Write;

use crate::pipeline::orchestrator::PipelineResult;
use crate::types::Outcome;

fn outcome_label(outcome: Outcome, home_team: &str, away_team: &str) -> String {
    match outcome {
        Outcome::Home => format!("{} (home)", home_team),
        Outcome::Away => format!("{} (away)", away_team),
        Outcome::Draw => "Draw".to_string(),
    }
}

/// Render a pipeline result as a fixed-layout text block for prompt injection.
/// Performs no computation; the same result always renders to the same text.
pub fn format_for_llm(result: &PipelineResult, home_team: &str, away_team: &str) -> String {
    let output = &result.output;
    let market = &result.details.market_probabilities;
    let mut text = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(text, "MATCH ANALYSIS: {} vs {}", home_team, away_team);
    let _ = writeln!(text, "Calibrated probabilities:");
    let _ = writeln!(text, "- {} win: {:.1}%", home_team, output.probabilities.home);
    if let Some(draw) = output.probabilities.draw {
        let _ = writeln!(text, "- Draw: {:.1}%", draw);
    }
    let _ = writeln!(text, "- {} win: {:.1}%", away_team, output.probabilities.away);
    let _ = writeln!(
        text,
        "Favored: {}",
        outcome_label(output.favored, home_team, away_team)
    );
    let _ = writeln!(
        text,
        "Market: {} bookmaker(s), margin {:.2}%",
        market.bookmaker_count,
        market.market_margin * 100.0
    );

    if output.suppress_edge {
        let _ = writeln!(
            text,
            "Edge: SUPPRESSED (inputs too unreliable to state an edge)"
        );
    } else {
        let _ = writeln!(
            text,
            "Edge: {} {:+.1} pts vs market ({})",
            outcome_label(output.edge.outcome, home_team, away_team),
            output.edge.value,
            output.edge.quality
        );
    }

    let _ = writeln!(text, "Confidence: {}", output.confidence);
    let _ = writeln!(text, "Data quality: {}", output.data_quality);
    let _ = writeln!(text, "Market volatility: {}", output.volatility);

    if !output.warnings.is_empty() {
        let _ = writeln!(text, "Warnings:");
        for warning in &output.warnings {
            let _ = writeln!(text, "- {}", warning);
        }
    }

    text
}
