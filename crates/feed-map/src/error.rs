use thiserror::Error;

/// Failure of a single field transform. Never aborts a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("missing input column: {0}")]
    MissingColumn(String),
    #[error("invalid number in {column}: {value:?}")]
    InvalidNumber { column: String, value: String },
    #[error("{0}")]
    Message(String),
}
