use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// No filter or mapper is registered for the requested pair.
    #[error(
        "unknown {kind} registration: {entity}/{role} (known: {})",
        known.join(", ")
    )]
    UnknownRegistration {
        kind: &'static str,
        entity: String,
        role: String,
        known: Vec<String>,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("{0}")]
    Message(String),
}

impl FeedError {
    /// True for errors raised while resolving configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            FeedError::UnknownRegistration { .. } | FeedError::InvalidConfig(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;
