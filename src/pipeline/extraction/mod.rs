// Raw extraction layer: measurements over the pipeline input, no judgment.
// Nothing here depends on the interpretation or orchestration layers.

pub mod data_quality;
pub mod odds;
pub mod volatility;

pub use data_quality::{extract_data_quality, DataQualitySources, QualityFlag, RawDataQualityFlags};
pub use odds::{normalize_odds, MarketProbabilities, NormalizedOdds, QuoteSelection};
pub use volatility::{analyze_volatility, RawVolatilityStats};
