//! Error types for HashLedger

use crate::blockchain::Finding;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid block: {0}")]
    InvalidBlock(String),

    #[error("A chain must contain at least the genesis block")]
    EmptyChain,

    #[error("Audit aborted: {finding}")]
    AuditAborted { finding: Box<Finding> },
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        ChainError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::Config(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
