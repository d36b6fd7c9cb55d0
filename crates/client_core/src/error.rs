use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowErrorKind {
    /// Required input is missing or invalid; nothing was sent.
    Validation,
    /// The entered code did not match; nothing was sent.
    Verification,
    /// The remote API failed or answered with something unusable.
    Submission,
    /// The operation does not apply to the current step.
    State,
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("required fields are missing: {}", .fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },
    #[error("{field} must be a whole number, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("a rate is required for paid cooperation")]
    RateRequired,
    #[error("review rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(u8),
    #[error("verification code does not match")]
    CodeMismatch,
    #[error("operation expects step {expected} but flow is at {actual}")]
    InvalidStep {
        expected: &'static str,
        actual: &'static str,
    },
    #[error("cover photo {file_name} could not be encoded: {reason}")]
    PhotoEncoding { file_name: String, reason: String },
    #[error("submission failed: {source}")]
    Submission { source: anyhow::Error },
}

impl FlowError {
    pub fn kind(&self) -> FlowErrorKind {
        match self {
            Self::MissingFields { .. }
            | Self::InvalidNumber { .. }
            | Self::RateRequired
            | Self::RatingOutOfRange(_)
            | Self::PhotoEncoding { .. } => FlowErrorKind::Validation,
            Self::CodeMismatch => FlowErrorKind::Verification,
            Self::InvalidStep { .. } => FlowErrorKind::State,
            Self::Submission { .. } => FlowErrorKind::Submission,
        }
    }
}
