use thiserror::Error;

/// Errors that can occur during notification fan-out.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FanoutError {
    #[error("Fanout connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Publish failed: {0}")]
    PublishFailed(String),
    #[error("Subscribe failed: {0}")]
    SubscribeFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for fan-out operations.
pub type Result<T> = std::result::Result<T, FanoutError>;
