use thiserror::Error;

/// Errors raised while encoding, deriving or signing Solana data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid seeds: {0}")]
    InvalidSeeds(String),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),
}
