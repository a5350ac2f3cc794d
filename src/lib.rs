pub mod calibration;
pub mod config;
pub mod constants;
pub mod error;
pub mod observability;
pub mod pipeline;
pub mod types;

// Layered boundaries for application and infrastructure
pub mod app;
pub mod infra;

pub use config::{AggregationMethod, AppConfig, PipelineConfig};
pub use error::{AccuracyError, Result};
pub use pipeline::{format_for_llm, run_accuracy_pipeline, PipelineResult};
pub use types::{
    BookmakerQuote, HeadToHead, Outcome, OutcomeProbabilities, PipelineInput, TeamStats,
};
