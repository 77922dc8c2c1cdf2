use thiserror::Error;

/// Main error type for the match engine
#[derive(Error, Debug)]
pub enum MatchError {
    /// Filesystem errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parse/write errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// YAML config errors
    #[error("Config file error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input table is unusable (missing column, unreadable file)
    #[error("Input format error in '{source_name}': {message}")]
    InputFormat { source_name: String, message: String },

    /// One output partition could not be written
    #[error("Failed to write partition '{partition}': {message}")]
    Write { partition: String, message: String },

    /// Invalid or missing configuration values
    #[error("Config error: {0}")]
    Config(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl MatchError {
    pub fn input_format(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        MatchError::InputFormat {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

impl From<String> for MatchError {
    fn from(s: String) -> Self {
        MatchError::Other(s)
    }
}

impl From<&str> for MatchError {
    fn from(s: &str) -> Self {
        MatchError::Other(s.to_string())
    }
}

/// Recoverable failure while scoring one candidate.
///
/// Never aborts a run: the resolver logs it and scores the candidate 0.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    #[error("field '{field}' is empty after normalization")]
    EmptyField { field: &'static str },

    #[error("field '{field}' contains undecodable bytes")]
    InvalidEncoding { field: &'static str },
}

impl ScoringError {
    /// Column the failure originated from
    pub fn field(&self) -> &'static str {
        match self {
            ScoringError::EmptyField { field } | ScoringError::InvalidEncoding { field } => field,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, MatchError>;
