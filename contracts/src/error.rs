//! # Wallet Errors
//!
//! Every wallet operation fails with a [`WalletError`]. Each variant belongs
//! to exactly one [`ErrorKind`], and the kind name is what callers outside
//! the chaincode see in front of the message (`StateError: insufficient
//! balance ...`).

use jedo_ledger::LedgerError;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::model::WalletStatus;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Failures to turn a caller identity into a role.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The decoded identity is not `<prefix>::<subject>[::<issuer>]`.
    #[error("unexpected client identity format: {0}")]
    Format(String),

    /// The identity parsed but matched no role rule.
    #[error("unknown role for identity: {0}")]
    UnknownRole(String),

    /// The identity is not base64 or not UTF-8.
    #[error("failed to decode client identity: {0}")]
    Decode(String),

    /// The host could not produce the identity or an attribute.
    #[error("failed to get client identity: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

/// Errors raised by wallet operations.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Malformed id, non-positive amount, bad argument.
    #[error("{0}")]
    InvalidInput(String),

    #[error("wallet {wallet_id} does not exist")]
    WalletNotFound { wallet_id: String },

    #[error("gens {gens_id} does not exist")]
    GensNotFound { gens_id: String },

    #[error("wallet {wallet_id} already exists")]
    WalletExists { wallet_id: String },

    #[error("gens {gens_id} already exists")]
    GensExists { gens_id: String },

    /// Role mismatch, ownership mismatch or namespace violation.
    #[error("{0}")]
    Unauthorized(String),

    /// A balance change was attempted on a wallet that is not active.
    #[error("wallet {wallet_id} is not active (status: {status})")]
    WalletNotActive {
        wallet_id: String,
        status: WalletStatus,
    },

    /// A debit or transfer would take the balance below zero.
    #[error("insufficient balance: wallet {wallet_id} has {balance} but operation requires {required}")]
    InsufficientBalance {
        wallet_id: String,
        balance: Decimal,
        required: Decimal,
    },

    /// A lifecycle action is not allowed from the wallet's current status.
    #[error("cannot {action} wallet {wallet_id} with status {status}")]
    InvalidTransition {
        wallet_id: String,
        status: WalletStatus,
        /// `freeze`, `unfreeze` or `close`.
        action: &'static str,
    },

    /// Closing requires an empty wallet.
    #[error("cannot delete wallet with non-zero balance (current: {balance})")]
    NonZeroBalance { wallet_id: String, balance: Decimal },

    /// A balance or a sum of balances left the decimal range.
    #[error("{what} overflow")]
    Overflow { what: &'static str },

    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Malformed stored document or malformed JSON argument.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The world state failed underneath the operation.
    #[error("store error: {0}")]
    Store(#[source] LedgerError),
}

/// Convenience alias used throughout the contracts crate.
pub type WalletResult<T> = Result<T, WalletError>;

impl From<LedgerError> for WalletError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Identity(msg) => WalletError::Identity(IdentityError::Unavailable(msg)),
            LedgerError::Serialization(msg) => WalletError::Serialization(msg),
            other => WalletError::Store(other),
        }
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        WalletError::Serialization(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// The coarse category of a [`WalletError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Duplicate,
    Authorization,
    State,
    Identity,
    Serialization,
    Store,
}

impl ErrorKind {
    /// The name callers see, e.g. `ValidationError`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "ValidationError",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::Duplicate => "DuplicateError",
            ErrorKind::Authorization => "AuthorizationError",
            ErrorKind::State => "StateError",
            ErrorKind::Identity => "IdentityError",
            ErrorKind::Serialization => "SerializationError",
            ErrorKind::Store => "StoreError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WalletError {
    /// The category this error reports as.
    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::InvalidInput(_) => ErrorKind::Validation,
            WalletError::WalletNotFound { .. } | WalletError::GensNotFound { .. } => {
                ErrorKind::NotFound
            }
            WalletError::WalletExists { .. } | WalletError::GensExists { .. } => {
                ErrorKind::Duplicate
            }
            WalletError::Unauthorized(_) => ErrorKind::Authorization,
            WalletError::WalletNotActive { .. }
            | WalletError::InsufficientBalance { .. }
            | WalletError::InvalidTransition { .. }
            | WalletError::NonZeroBalance { .. }
            | WalletError::Overflow { .. } => ErrorKind::State,
            WalletError::Identity(_) => ErrorKind::Identity,
            WalletError::Serialization(_) => ErrorKind::Serialization,
            WalletError::Store(_) => ErrorKind::Store,
        }
    }
}
