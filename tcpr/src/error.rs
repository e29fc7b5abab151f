//! Error types for tcpr
//!
//! Per-line parse failures are recoverable; model/corpus failures raised while
//! loading the prediction context are fatal and stop the process before any
//! request is served.

use thiserror::Error;

/// Result type for tcpr operations
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a single input line is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Line is empty or whitespace only
    #[error("empty input")]
    EmptyInput,

    /// Line does not have the `TCID, step_count, steps` shape
    #[error("malformed structure: {0}")]
    MalformedStructure(String),

    /// Step count field is not a non-negative integer
    #[error("step count is not a non-negative integer: {0:?}")]
    NonNumericStepCount(String),

    /// Declared step count disagrees with the detected step markers
    #[error("declared {declared} steps but found {found} step markers")]
    StepCountMismatch { declared: u32, found: usize },
}

/// Priority is undefined for a record whose predicted duration is zero
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("priority undefined for {case_id}: predicted duration is zero")]
pub struct ZeroDurationError {
    pub case_id: String,
}

/// Errors raised by the prediction pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Single line failed to parse
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A line of a batch failed to parse; the whole batch is aborted
    #[error("invalid format on line {line_number}: {line}: {source}")]
    InvalidLine {
        line_number: usize,
        line: String,
        #[source]
        source: ParseError,
    },

    /// An artifact could not be loaded (fatal, startup only)
    #[error("model unavailable ({artifact}): {reason}")]
    ModelUnavailable { artifact: String, reason: String },

    /// Feature width disagrees with the models or corpus (version skew)
    #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// A model produced a non-finite output
    #[error("{model} returned a non-finite value ({value})")]
    PredictionFailed {
        model: &'static str,
        value: f64,
    },

    /// Batch too small to rank
    #[error("at least 2 valid test cases are required for ranking, got {size}")]
    DegenerateBatch { size: usize },

    /// Export output could not be written
    #[error("export failed: {0}")]
    Export(#[from] std::io::Error),

    /// Delimited table could not be written
    #[error("export failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Coarse class of a failure as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserFacing {
    EmptyInput,
    InvalidFormat,
    PredictionFailed,
}

impl Error {
    /// Shorthand for building a `ModelUnavailable`
    pub fn model_unavailable(artifact: impl Into<String>, reason: impl ToString) -> Self {
        Error::ModelUnavailable {
            artifact: artifact.into(),
            reason: reason.to_string(),
        }
    }

    /// Which user-facing class this error belongs to
    pub fn user_facing(&self) -> UserFacing {
        match self {
            Error::Parse(ParseError::EmptyInput) => UserFacing::EmptyInput,
            Error::Parse(_) | Error::InvalidLine { .. } | Error::DegenerateBatch { .. } => {
                UserFacing::InvalidFormat
            }
            Error::ModelUnavailable { .. }
            | Error::DimensionMismatch { .. }
            | Error::PredictionFailed { .. }
            | Error::Export(_)
            | Error::Csv(_) => UserFacing::PredictionFailed,
        }
    }

    /// Message suitable for showing to the user
    ///
    /// Batch failures name the literal offending line.
    pub fn user_message(&self) -> String {
        match self {
            Error::Parse(ParseError::EmptyInput) => {
                "Please enter a test case first.".to_string()
            }
            Error::Parse(e) => format!("Invalid format! Please check your input ({}).", e),
            Error::InvalidLine { line, source, .. } => {
                format!("Invalid format: {} ({})", line, source)
            }
            Error::DegenerateBatch { .. } => {
                "Please enter at least 2 valid test cases.".to_string()
            }
            other => format!("Prediction failed: {}", other),
        }
    }
}
