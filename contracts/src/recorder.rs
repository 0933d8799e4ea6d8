//! # Transaction Recorder
//!
//! Append-only ledger of balance movements. Every record is stored under
//! `(transaction, walletId, txId)`, so one wallet's records form a single
//! contiguous key range regardless of when they were committed.
//!
//! History comes back in key order, which is `txId` order within a wallet.
//! Transaction ids are hashes, so that is not chronological; sort on
//! `timestamp` if order matters.

use jedo_ledger::ChaincodeStub;
use tracing::debug;

use crate::config::TRANSACTION_NAMESPACE;
use crate::error::{WalletError, WalletResult};
use crate::model::Transaction;

pub struct TransactionRecorder<'a> {
    stub: &'a dyn ChaincodeStub,
}

impl<'a> TransactionRecorder<'a> {
    pub fn new(stub: &'a dyn ChaincodeStub) -> Self {
        Self { stub }
    }

    /// Stages `record` under its composite key.
    pub fn append(&self, record: &Transaction) -> WalletResult<()> {
        let key = self.stub.create_composite_key(
            TRANSACTION_NAMESPACE,
            &[record.wallet_id.as_str(), record.tx_id.as_str()],
        )?;
        self.stub.put_state(&key, serde_json::to_vec(record)?)?;
        debug!(
            wallet_id = %record.wallet_id,
            tx_type = %record.tx_type,
            amount = %record.amount,
            "transaction recorded"
        );
        Ok(())
    }

    /// Committed records of `wallet_id`, at most `limit` of them (0 = all).
    pub fn history(&self, wallet_id: &str, limit: usize) -> WalletResult<Vec<Transaction>> {
        let limit = if limit == 0 { usize::MAX } else { limit };
        let mut records = Vec::new();
        for item in self
            .stub
            .get_state_by_partial_composite_key(TRANSACTION_NAMESPACE, &[wallet_id])?
            .take(limit)
        {
            let kv = item?;
            let record = serde_json::from_slice(&kv.value).map_err(|e| {
                WalletError::Serialization(format!("failed to unmarshal transaction: {e}"))
            })?;
            records.push(record);
        }
        Ok(records)
    }
}
