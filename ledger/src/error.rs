//! Error types for the ledger host.
//!
//! Every fallible ledger operation returns a [`LedgerError`]. Contracts
//! never recover from these; they surface as store failures and abort the
//! invocation.

use thiserror::Error;

/// Errors raised by the world state, the transaction context, or the
/// commit runtime.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The underlying sled database failed.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// A stored or supplied value could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A key was empty or malformed.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A composite key could not be built or split.
    #[error("invalid composite key: {0}")]
    InvalidCompositeKey(String),

    /// A rich query selector could not be parsed.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The caller identity could not be produced.
    #[error("identity unavailable: {0}")]
    Identity(String),

    /// A key read by the invocation changed before commit.
    #[error("mvcc read conflict on key {key:?}")]
    MvccReadConflict {
        /// The key whose committed value no longer matches the read set.
        key: String,
    },
}

/// Convenience alias used throughout the ledger crate.
pub type LedgerResult<T> = Result<T, LedgerError>;

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for LedgerError {
    fn from(err: bincode::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<sled::transaction::TransactionError<LedgerError>> for LedgerError {
    fn from(err: sled::transaction::TransactionError<LedgerError>) -> Self {
        match err {
            sled::transaction::TransactionError::Abort(inner) => inner,
            sled::transaction::TransactionError::Storage(e) => LedgerError::Sled(e),
        }
    }
}
