// Interpretation layer: turns raw extraction output into qualitative levels.
// Policy (penalties, thresholds) enters here and nowhere below.

pub mod quality;
pub mod volatility;

pub use quality::{DefaultQualityInterpreter, QualityAssessment, QualityInterpreter, QualityLevel};
pub use volatility::{interpret_volatility, VolatilityAssessment, VolatilityLevel};
