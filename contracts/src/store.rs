//! # Wallet Store
//!
//! Typed access to wallet and gens documents on top of a [`ChaincodeStub`].
//!
//! Wallets live under their bare `walletId`. Gens live under the composite
//! key `(gens, gensId)`, which starts with `\0`. Wallet ids are validated on
//! every read and write and may not contain control characters, so a wallet
//! document never lands in the composite keyspace.

use jedo_ledger::ChaincodeStub;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::config::{DOC_TYPE_GENS, DOC_TYPE_WALLET, GENS_NAMESPACE};
use crate::error::{WalletError, WalletResult};
use crate::model::{Gens, Wallet};
use crate::validation::{validate_gens_id, validate_wallet_id};

/// Wallet and gens persistence for one invocation.
pub struct WalletStore<'a> {
    stub: &'a dyn ChaincodeStub,
}

impl<'a> WalletStore<'a> {
    pub fn new(stub: &'a dyn ChaincodeStub) -> Self {
        Self { stub }
    }

    // -----------------------------------------------------------------------
    // Wallets
    // -----------------------------------------------------------------------

    /// Loads a wallet. The id is validated before the store is touched.
    ///
    /// # Errors
    ///
    /// [`WalletError::InvalidInput`] for a malformed id,
    /// [`WalletError::WalletNotFound`] if nothing is stored under it.
    pub fn get(&self, wallet_id: &str) -> WalletResult<Wallet> {
        validate_wallet_id(wallet_id)?;
        let bytes = self
            .stub
            .get_state(wallet_id)?
            .ok_or_else(|| WalletError::WalletNotFound {
                wallet_id: wallet_id.to_string(),
            })?;
        decode(&bytes, "wallet")
    }

    /// Writes a wallet under its own id.
    pub fn put(&self, wallet: &Wallet) -> WalletResult<()> {
        validate_wallet_id(&wallet.wallet_id)?;
        self.stub.put_state(&wallet.wallet_id, encode(wallet)?)?;
        debug!(wallet_id = %wallet.wallet_id, status = %wallet.status, balance = %wallet.balance, "wallet staged");
        Ok(())
    }

    pub fn exists(&self, wallet_id: &str) -> WalletResult<bool> {
        Ok(self.stub.state_exists(wallet_id)?)
    }

    /// Runs a selector and decodes every match as a wallet. The selector
    /// is narrowed to `docType: wallet`.
    pub fn query_wallets(&self, mut selector: serde_json::Value) -> WalletResult<Vec<Wallet>> {
        selector["docType"] = json!(DOC_TYPE_WALLET);
        self.query(selector, "wallet")
    }

    // -----------------------------------------------------------------------
    // Gens
    // -----------------------------------------------------------------------

    fn gens_key(&self, gens_id: &str) -> WalletResult<String> {
        Ok(self.stub.create_composite_key(GENS_NAMESPACE, &[gens_id])?)
    }

    pub fn get_gens(&self, gens_id: &str) -> WalletResult<Gens> {
        validate_gens_id(gens_id)?;
        let bytes = self
            .stub
            .get_state(&self.gens_key(gens_id)?)?
            .ok_or_else(|| WalletError::GensNotFound {
                gens_id: gens_id.to_string(),
            })?;
        decode(&bytes, "gens")
    }

    pub fn put_gens(&self, gens: &Gens) -> WalletResult<()> {
        self.stub.put_state(&self.gens_key(&gens.gens_id)?, encode(gens)?)?;
        debug!(gens_id = %gens.gens_id, "gens staged");
        Ok(())
    }

    pub fn gens_exists(&self, gens_id: &str) -> WalletResult<bool> {
        Ok(self.stub.state_exists(&self.gens_key(gens_id)?)?)
    }

    /// Runs a selector and decodes every match as a gens.
    pub fn query_gens(&self, mut selector: serde_json::Value) -> WalletResult<Vec<Gens>> {
        selector["docType"] = json!(DOC_TYPE_GENS);
        self.query(selector, "gens")
    }

    fn query<T: DeserializeOwned>(&self, selector: serde_json::Value, what: &str) -> WalletResult<Vec<T>> {
        let query = json!({ "selector": selector }).to_string();
        let mut results = Vec::new();
        for item in self.stub.get_query_result(&query)? {
            let kv = item?;
            results.push(decode(&kv.value, what)?);
        }
        debug!(what, matches = results.len(), "selector query");
        Ok(results)
    }
}

fn encode<T: Serialize>(document: &T) -> WalletResult<Vec<u8>> {
    Ok(serde_json::to_vec(document)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8], what: &str) -> WalletResult<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| WalletError::Serialization(format!("failed to unmarshal {what}: {e}")))
}
