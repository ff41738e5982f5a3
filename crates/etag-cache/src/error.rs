use thiserror::Error;

/// Errors that can occur while computing an entity tag.
#[derive(Debug, Error)]
pub enum TagError {
    /// The representation could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for entity tag operations.
pub type Result<T> = std::result::Result<T, TagError>;
