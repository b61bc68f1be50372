//! Error types for featureboard

use thiserror::Error;
use std::io;

/// Result type alias for featureboard operations
pub type Result<T> = std::result::Result<T, FeatureBoardError>;

/// Custom error types for featureboard
#[derive(Error, Debug)]
pub enum FeatureBoardError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Protocol parse error: {0}")]
    Protocol(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Client error: {0}")]
    Client(String),
}

impl From<nom::Err<nom::error::Error<&[u8]>>> for FeatureBoardError {
    fn from(err: nom::Err<nom::error::Error<&[u8]>>) -> Self {
        FeatureBoardError::Protocol(format!("Parse error: {:?}", err))
    }
}
