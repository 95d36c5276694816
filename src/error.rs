use crate::mutation::MutationKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, KisekiError>;

#[derive(Debug, Error)]
pub enum KisekiError {
    #[error("Invalid position order: {lower:?} must sort before {upper:?}")]
    InvalidOrder { lower: String, upper: String },

    #[error("Invalid position key: {0}")]
    InvalidPositionKey(String),

    #[error("Position key space exhausted")]
    KeySpaceExhausted,

    #[error("Unknown card: {0}")]
    UnknownCard(String),

    #[error("Job application not found: {0}")]
    ApplicationNotFound(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("{kind} mutation rejected: {source}")]
    MutationRejected {
        kind: MutationKind,
        #[source]
        source: Box<KisekiError>,
    },

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Project not initialized. Run 'kiseki init' first.")]
    ProjectNotInitialized,
}

impl KisekiError {
    /// True for errors raised after an optimistic write was rolled back
    pub fn is_rejected_mutation(&self) -> bool {
        matches!(self, Self::MutationRejected { .. })
    }
}
