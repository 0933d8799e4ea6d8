//! Event payloads raised by the wallet chaincode.

use chrono::{DateTime, Utc};
use jedo_ledger::ChaincodeStub;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{EVENT_TRANSFER_COMPLETED, EVENT_WALLET_CREATED};
use crate::error::WalletResult;

/// Something that can be raised as a chaincode event.
pub trait WalletEvent: Serialize {
    const NAME: &'static str;

    /// Sets this payload as the invocation's event.
    fn emit(&self, stub: &dyn ChaincodeStub) -> WalletResult<()> {
        stub.set_event(Self::NAME, serde_json::to_vec(self)?)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletCreated {
    pub wallet_id: String,
    pub owner_id: String,
    pub initial_balance: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl WalletEvent for WalletCreated {
    const NAME: &'static str = EVENT_WALLET_CREATED;
}

/// Both balances are post-transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferCompleted {
    pub tx_id: String,
    pub from_wallet_id: String,
    pub to_wallet_id: String,
    pub amount: Decimal,
    pub from_balance: Decimal,
    pub to_balance: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl WalletEvent for TransferCompleted {
    const NAME: &'static str = EVENT_TRANSFER_COMPLETED;
}
