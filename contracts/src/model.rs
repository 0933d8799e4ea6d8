//! # Ledger Documents
//!
//! The three document kinds the wallet chaincode persists. All of them are
//! camelCase JSON with a `docType` discriminator so selector queries can
//! tell them apart.
//!
//! Money is [`Decimal`]. It is written as a JSON string (`"100.50"`) and
//! read from either a string or a number.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::{CURRENCY, DOC_TYPE_GENS, DOC_TYPE_TRANSACTION, DOC_TYPE_WALLET};

/// Free-form string metadata attached to a wallet.
pub type Metadata = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Status enums
// ---------------------------------------------------------------------------

/// Lifecycle status of a wallet.
///
/// ```text
/// active ──freeze──▶ frozen
///   ▲                  │
///   └─────unfreeze─────┘
/// active ──close──▶ closed   (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletStatus {
    /// Accepts every operation.
    Active,
    /// Rejects all balance changes until unfrozen.
    Frozen,
    /// Permanently retired. Balance is zero.
    Closed,
}

impl std::fmt::Display for WalletStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalletStatus::Active => write!(f, "active"),
            WalletStatus::Frozen => write!(f, "frozen"),
            WalletStatus::Closed => write!(f, "closed"),
        }
    }
}

/// Kind of a transaction record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Credit,
    Debit,
    TransferIn,
    TransferOut,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Credit => write!(f, "credit"),
            TransactionType::Debit => write!(f, "debit"),
            TransactionType::TransferIn => write!(f, "transfer_in"),
            TransactionType::TransferOut => write!(f, "transfer_out"),
        }
    }
}

/// Status of a registered gens. Registration is the only gens write, so
/// every stored gens is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GensStatus {
    Active,
}

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

/// A wallet document, stored under its `walletId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    /// Always [`DOC_TYPE_WALLET`].
    pub doc_type: String,
    pub wallet_id: String,
    /// Dotted identity of the owning human, e.g. `hans.worb.alps.ea.jedo.cc`.
    pub owner_id: String,
    /// Never negative.
    pub balance: Decimal,
    /// Always [`CURRENCY`].
    pub currency: String,
    pub status: WalletStatus,
    pub created_at: DateTime<Utc>,
    /// Never earlier than `created_at` or any previous `updated_at`.
    pub updated_at: DateTime<Utc>,
    /// Never absent: `null` or a missing field reads back as `{}`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub metadata: Metadata,
}

impl Wallet {
    /// A fresh `active` wallet created at `now`.
    pub fn new(
        wallet_id: impl Into<String>,
        owner_id: impl Into<String>,
        balance: Decimal,
        metadata: Metadata,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            doc_type: DOC_TYPE_WALLET.to_string(),
            wallet_id: wallet_id.into(),
            owner_id: owner_id.into(),
            balance,
            currency: CURRENCY.to_string(),
            status: WalletStatus::Active,
            created_at: now,
            updated_at: now,
            metadata,
        }
    }

    /// Returns `true` if the wallet accepts balance changes.
    pub fn is_active(&self) -> bool {
        self.status == WalletStatus::Active
    }

    /// Advances `updated_at` to `now`, never backwards.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Metadata, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Metadata>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// One immutable balance movement of one wallet.
///
/// A transfer produces two of these, one per wallet, sharing a `txId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Always [`DOC_TYPE_TRANSACTION`].
    pub doc_type: String,
    pub tx_id: String,
    pub wallet_id: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    /// Positive for `credit` and `transfer_in`, negative otherwise.
    pub amount: Decimal,
    /// Balance of `wallet_id` right after this movement.
    pub balance: Decimal,
    /// The other wallet of a transfer; empty for credit and debit.
    #[serde(default)]
    pub counterparty: String,
    #[serde(default)]
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Builds a record. `amount` must already carry its sign.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tx_id: impl Into<String>,
        wallet_id: impl Into<String>,
        tx_type: TransactionType,
        amount: Decimal,
        balance: Decimal,
        counterparty: impl Into<String>,
        description: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            doc_type: DOC_TYPE_TRANSACTION.to_string(),
            tx_id: tx_id.into(),
            wallet_id: wallet_id.into(),
            tx_type,
            amount,
            balance,
            counterparty: counterparty.into(),
            description: description.into(),
            timestamp,
        }
    }
}

// ---------------------------------------------------------------------------
// Gens
// ---------------------------------------------------------------------------

/// A registered gens, stored under composite key `(gens, gensId)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gens {
    /// Always [`DOC_TYPE_GENS`].
    pub doc_type: String,
    pub gens_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub status: GensStatus,
}

impl Gens {
    /// A freshly registered, active gens.
    pub fn new(gens_id: impl Into<String>, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            doc_type: DOC_TYPE_GENS.to_string(),
            gens_id: gens_id.into(),
            name: name.into(),
            created_at: now,
            status: GensStatus::Active,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn wallet_serializes_camel_case_with_string_balance() {
        let wallet = Wallet::new(
            "W1",
            "hans.worb.alps.ea.jedo.cc",
            Decimal::new(10050, 2),
            Metadata::new(),
            ts("2025-03-01T12:00:00Z"),
        );
        let value = serde_json::to_value(&wallet).unwrap();
        assert_eq!(value["docType"], "wallet");
        assert_eq!(value["walletId"], "W1");
        assert_eq!(value["ownerId"], "hans.worb.alps.ea.jedo.cc");
        assert_eq!(value["balance"], "100.50");
        assert_eq!(value["currency"], "JEDO");
        assert_eq!(value["status"], "active");
        assert_eq!(value["metadata"], json!({}));
    }

    #[test]
    fn wallet_reads_null_or_missing_metadata_as_empty() {
        let base = json!({
            "docType": "wallet",
            "walletId": "W1",
            "ownerId": "hans.worb.alps.ea.jedo.cc",
            "balance": 100,
            "currency": "JEDO",
            "status": "frozen",
            "createdAt": "2025-03-01T12:00:00Z",
            "updatedAt": "2025-03-01T12:00:00Z"
        });
        let missing: Wallet = serde_json::from_value(base.clone()).unwrap();
        assert!(missing.metadata.is_empty());
        assert_eq!(missing.balance, Decimal::from(100));
        assert_eq!(missing.status, WalletStatus::Frozen);

        let mut with_null = base;
        with_null["metadata"] = serde_json::Value::Null;
        let null: Wallet = serde_json::from_value(with_null).unwrap();
        assert!(null.metadata.is_empty());
    }

    #[test]
    fn touch_never_moves_backwards() {
        let mut wallet = Wallet::new("W1", "o.w.n.e.r", Decimal::ZERO, Metadata::new(), ts("2025-03-02T00:00:00Z"));
        wallet.touch(ts("2025-03-01T00:00:00Z"));
        assert_eq!(wallet.updated_at, ts("2025-03-02T00:00:00Z"));
        wallet.touch(ts("2025-03-03T00:00:00Z"));
        assert_eq!(wallet.updated_at, ts("2025-03-03T00:00:00Z"));
    }

    #[test]
    fn transaction_type_uses_snake_case() {
        let tx = Transaction::new(
            "tx1",
            "W1",
            TransactionType::TransferOut,
            Decimal::from(-30),
            Decimal::from(70),
            "W2",
            "rent",
            ts("2025-03-01T12:00:00Z"),
        );
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["type"], "transfer_out");
        assert_eq!(value["amount"], "-30");
        assert_eq!(value["counterparty"], "W2");
        assert_eq!(value["docType"], "transaction");
    }

    #[test]
    fn gens_starts_active() {
        let gens = Gens::new("worb", "Worb AG", ts("2025-03-01T12:00:00Z"));
        let value = serde_json::to_value(&gens).unwrap();
        assert_eq!(value["status"], "active");
        assert_eq!(value["gensId"], "worb");
        assert!(serde_json::from_value::<GensStatus>(json!("inactive")).is_err());
    }
}
