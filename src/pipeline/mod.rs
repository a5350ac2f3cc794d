// Accuracy pipeline: extraction -> interpretation -> orchestration.
// Dependencies point strictly downward; nothing here performs I/O.

pub mod extraction;
pub mod formatter;
pub mod interpretation;
pub mod model;
pub mod orchestrator;

// Re-export the public entry points
pub use formatter::format_for_llm;
pub use orchestrator::{run_accuracy_pipeline, Confidence, EdgeQuality, PipelineResult};
