use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use accuracy_core::app::{EvaluationUseCase, ForecastUseCase};
use accuracy_core::constants::DEFAULT_RELIABILITY_BINS;
use accuracy_core::infra::{FilePredictionLogAdapter, JsonFileResolvedSource};
use accuracy_core::observability::{init_logging, init_metrics};
use accuracy_core::{format_for_llm, AppConfig, PipelineInput, PipelineResult};

#[derive(Parser)]
#[command(name = "accuracy_core")]
#[command(about = "Calibrated match-outcome forecasts from bookmaker odds and team statistics")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the accuracy pipeline for one match or an array of matches
    Forecast {
        /// JSON file holding a pipeline input object or an array of them
        #[arg(long)]
        input: String,
        /// TOML config file (defaults to $ACCURACY_CONFIG or accuracy.toml)
        #[arg(long)]
        config: Option<String>,
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
        /// Override the prediction log path from the config file
        #[arg(long)]
        log_file: Option<String>,
    },
    /// Score settled predictions (Brier, log loss, reliability)
    Evaluate {
        /// JSON array or NDJSON of resolved predictions
        #[arg(long)]
        predictions: String,
        #[arg(long, default_value_t = DEFAULT_RELIABILITY_BINS)]
        bins: usize,
    },
    /// Load and validate the configuration, then print it
    CheckConfig {
        #[arg(long)]
        config: Option<String>,
    },
}

/// Parse the input file. Matches without their own `config` inherit the
/// pipeline section of the loaded configuration.
fn read_inputs(path: &str, app_config: &AppConfig) -> Result<Vec<PipelineInput>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file '{}'", path))?;
    let value: serde_json::Value =
        serde_json::from_str(&content).with_context(|| format!("Invalid JSON in '{}'", path))?;
    let default_config = serde_json::to_value(&app_config.pipeline)?;

    let items = match value {
        serde_json::Value::Array(items) => items,
        other => vec![other],
    };

    items
        .into_iter()
        .map(|mut item| {
            if let Some(obj) = item.as_object_mut() {
                obj.entry("config").or_insert_with(|| default_config.clone());
            }
            serde_json::from_value(item).context("Input does not match the pipeline input shape")
        })
        .collect()
}

fn print_results(
    results: &[PipelineResult],
    inputs: &[PipelineInput],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            if results.len() == 1 {
                println!("{}", serde_json::to_string_pretty(&results[0])?);
            } else {
                println!("{}", serde_json::to_string_pretty(results)?);
            }
        }
        OutputFormat::Text => {
            for (result, input) in results.iter().zip(inputs) {
                println!("{}", format_for_llm(result, &input.home_team, &input.away_team));
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let _log_guard = init_logging();
    init_metrics();

    let cli = Cli::parse();

    match cli.command {
        Commands::Forecast {
            input,
            config,
            format,
            log_file,
        } => {
            let app_config = AppConfig::load(config.as_deref())?;
            let inputs = read_inputs(&input, &app_config)?;
            info!("Forecasting {} match(es) from {}", inputs.len(), input);

            let wants_log = inputs.iter().any(|i| i.config.log_predictions);
            let use_case = if wants_log {
                let path = log_file.unwrap_or_else(|| app_config.prediction_log.path.clone());
                ForecastUseCase::new(Box::new(FilePredictionLogAdapter::new(&path)?))
            } else {
                if log_file.is_some() {
                    warn!("--log-file given but no input sets logPredictions; nothing logged");
                }
                ForecastUseCase::without_logging()
            };

            let results = use_case.forecast_batch(&inputs).await?;
            print_results(&results, &inputs, format)?;
        }
        Commands::Evaluate { predictions, bins } => {
            let source = JsonFileResolvedSource::new(&predictions);
            let summary = EvaluationUseCase::new(Box::new(source), bins).evaluate().await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::CheckConfig { config } => {
            let app_config = AppConfig::load(config.as_deref())?;
            println!("Configuration OK");
            println!("{}", toml::to_string_pretty(&app_config)?);
        }
    }

    Ok(())
}
