use std::fmt;
use thiserror::Error;

/// Which adjustable quantity a range violation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeField {
    Value,
    Weight,
}

impl fmt::Display for RangeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeField::Value => write!(f, "value"),
            RangeField::Weight => write!(f, "weight"),
        }
    }
}

/// Errors raised by the parameter model and the submission validator.
///
/// None of these are fatal: the store is left untouched and the caller may
/// adjust inputs and retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("unknown parameter '{0}'")]
    NotFound(String),

    #[error("{field} for '{id}' must be between {min} and {max}, got {got}")]
    OutOfRange {
        id: String,
        field: RangeField,
        min: i64,
        max: i64,
        got: i64,
    },

    #[error("Please select at least one parameter for analysis.")]
    NoActiveParameters,

    #[error("Total weight must equal 100%. Current total: {0}%")]
    WeightMismatch(u32),
}

/// Failures talking to the scoring service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("scoring service error: status={status}, body={body}")]
    Status { status: u16, body: String },

    #[error("scoring service returned invalid response: {0}")]
    InvalidResponse(String),
}

impl ServiceError {
    /// Connection failures, dropped connections and timeouts are worth
    /// another attempt; anything the service actually answered is not.
    pub fn is_transient(&self) -> bool {
        match self {
            ServiceError::Network(e) => {
                e.is_connect() || e.is_timeout() || e.is_request() || e.is_body()
            }
            _ => false,
        }
    }
}

/// Outcome of a submission attempt that did not succeed.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("an analysis is already in progress")]
    AlreadyAnalyzing,

    #[error("no analysis is in progress")]
    NotAnalyzing,

    #[error(transparent)]
    Rejected(#[from] ModelError),

    #[error(transparent)]
    Failed(#[from] ServiceError),
}
