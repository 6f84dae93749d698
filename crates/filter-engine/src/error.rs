use model::core::value::ValueKind;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CompileError {
    #[error("Unsupported filter shape: {0}")]
    UnsupportedShape(String),

    #[error("Invalid arguments for {function}: {message}")]
    InvalidArguments { function: String, message: String },

    #[error("Range bounds have mismatching kinds: {min} vs {max}")]
    HeterogeneousRange { min: ValueKind, max: ValueKind },

    #[error("Unknown analyzer: {0}")]
    UnknownAnalyzer(String),
}

impl CompileError {
    pub fn invalid_arguments(function: &str, message: impl Into<String>) -> Self {
        CompileError::InvalidArguments {
            function: function.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
