pub mod prediction_log_adapter;
pub mod resolved_prediction_file;

pub use prediction_log_adapter::FilePredictionLogAdapter;
pub use resolved_prediction_file::JsonFileResolvedSource;
