//! # Queries
//!
//! Role-scoped listings. A caller that may not see something gets an
//! error, never an empty list, so "no data" and "not permitted" stay
//! distinguishable.

use rust_decimal::Decimal;
use serde_json::json;
use tracing::debug;

use crate::context::Invocation;
use crate::contract::{deny, WalletContract};
use crate::error::{WalletError, WalletResult};
use crate::identity::{Role, RoleResolver};
use crate::model::{Gens, Transaction, Wallet};
use crate::recorder::TransactionRecorder;
use crate::store::WalletStore;

impl<R: RoleResolver> WalletContract<R> {
    /// Records of one wallet, at most `limit` (0 = all). Owner or admin.
    pub fn get_wallet_history(
        &self,
        inv: &Invocation<'_>,
        wallet_id: &str,
        limit: usize,
    ) -> WalletResult<Vec<Transaction>> {
        let caller = self.caller(inv)?;
        let wallet = WalletStore::new(inv.stub).get(wallet_id)?;
        if !caller.is_admin() && !caller.owns(&wallet.owner_id) {
            return Err(deny(&caller, "you can only view your own wallet history"));
        }
        TransactionRecorder::new(inv.stub).history(wallet_id, limit)
    }

    /// Wallets whose owner id has `gens_id` as an inner dotted label.
    /// Admin, or the gens itself.
    pub fn get_wallets_by_gens(&self, inv: &Invocation<'_>, gens_id: &str) -> WalletResult<Vec<Wallet>> {
        let caller = self.caller(inv)?;
        if !caller.is_admin() && !(caller.role == Role::Gens && caller.owns(gens_id)) {
            return Err(deny(&caller, "you can only view wallets of your own gens"));
        }
        if gens_id.is_empty() {
            return Err(WalletError::InvalidInput("gens ID cannot be empty".into()));
        }

        let pattern = format!(r".*\.{}\..*", regex::escape(gens_id));
        let wallets = WalletStore::new(inv.stub).query_wallets(json!({
            "ownerId": { "$regex": pattern }
        }))?;
        debug!(gens_id, count = wallets.len(), "wallets by gens");
        Ok(wallets)
    }

    /// Wallets owned by exactly `human_id`. Admin, or that human.
    pub fn get_wallets_by_human(&self, inv: &Invocation<'_>, human_id: &str) -> WalletResult<Vec<Wallet>> {
        let caller = self.caller(inv)?;
        if !caller.is_admin() && !(caller.role == Role::Human && caller.owns(human_id)) {
            return Err(deny(&caller, "you can only view your own wallets"));
        }
        WalletStore::new(inv.stub).query_wallets(json!({ "ownerId": human_id }))
    }

    /// Every wallet. Admin only.
    pub fn get_all_wallets(&self, inv: &Invocation<'_>) -> WalletResult<Vec<Wallet>> {
        self.require_role(inv, Role::Admin, "only admin can list all wallets")?;
        WalletStore::new(inv.stub).query_wallets(json!({}))
    }

    /// Every registered gens. Admin only.
    pub fn list_gens(&self, inv: &Invocation<'_>) -> WalletResult<Vec<Gens>> {
        self.require_role(inv, Role::Admin, "only admin can list gens")?;
        WalletStore::new(inv.stub).query_gens(json!({}))
    }

    /// Sum of all wallet balances. Admin only.
    pub fn get_total_balance(&self, inv: &Invocation<'_>) -> WalletResult<Decimal> {
        self.get_all_wallets(inv)?
            .iter()
            .try_fold(Decimal::ZERO, |total, wallet| total.checked_add(wallet.balance))
            .ok_or(WalletError::Overflow { what: "total balance" })
    }
}
