//! Error types shared by the stakeflow crates
//!
//! These cover failures of the collaborators around the staking core
//! (fee service, chain data, submission, storage). They are passed through
//! unchanged; validation failures live in `stakeflow-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid amount: {0}")]
    Amount(String),

    #[error("Invalid address: {0}")]
    Address(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// Collaborator failures the user may simply retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Storage(_) | Error::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
