//! Error types for minichain

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// `mine` was called while the pending pool was empty. No state changed.
    NoPendingTransactions,
    /// The proof-of-work search was stopped through its cancellation flag.
    MiningCancelled,
    InvalidBlock { index: u64, reason: String },
    ConfigError(String),
    IoError(String),
    WorkerError(String),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChainError::NoPendingTransactions => write!(f, "No pending transactions to mine"),
            ChainError::MiningCancelled => write!(f, "Mining cancelled"),
            ChainError::InvalidBlock { index, reason } => {
                write!(f, "Invalid block at index {}: {}", index, reason)
            }
            ChainError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            ChainError::IoError(msg) => write!(f, "IO error: {}", msg),
            ChainError::WorkerError(msg) => write!(f, "Mining worker error: {}", msg),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::ConfigError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
