use thiserror::Error;

#[derive(Error, Debug)]
pub enum AccuracyError {
    #[error("Cannot compute market probabilities: odds list is empty")]
    EmptyOdds,

    #[error("Cannot compute market probabilities: all {dropped} bookmaker quotes were invalid")]
    NoValidOdds { dropped: usize },

    #[error("Invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AccuracyError {
    /// True for errors caused by the caller's input rather than the environment.
    /// HTTP callers map these to a 4xx response.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AccuracyError::EmptyOdds
                | AccuracyError::NoValidOdds { .. }
                | AccuracyError::InvalidConfig(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AccuracyError>;
