use thiserror::Error;

/// Top-level error type for Recap.
#[derive(Debug, Error)]
pub enum RecapError {
    /// Error from a text-generation provider.
    #[error("provider error: {0}")]
    Provider(String),

    /// Error from a messaging channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Memory/storage error.
    #[error("memory error: {0}")]
    Memory(String),

    /// Input rejected before any I/O took place.
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
