pub mod evaluation_use_case;
pub mod forecast_use_case;
pub mod ports;

pub use evaluation_use_case::{EvaluationSummary, EvaluationUseCase};
pub use forecast_use_case::ForecastUseCase;
pub use ports::{PredictionLogPort, PredictionRecord, ResolvedPredictionSource};
