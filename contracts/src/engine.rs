//! # Balance Engine
//!
//! The three operations that move money: `Transfer` between two wallets,
//! and admin `Credit`/`Debit` against one.
//!
//! Every balance change is staged together with its transaction record in
//! the same invocation. The host commits both or neither, so a wallet's
//! balance always equals the sum of its records.
//!
//! Reads see committed state only. A second read of a wallet after staging
//! a write returns the old document, which is why a transfer to the same
//! wallet is rejected outright.

use rust_decimal::Decimal;
use tracing::info;

use crate::context::Invocation;
use crate::contract::{deny, WalletContract};
use crate::error::{WalletError, WalletResult};
use crate::events::{TransferCompleted, WalletEvent};
use crate::identity::{Role, RoleResolver};
use crate::model::{Transaction, TransactionType, Wallet};
use crate::recorder::TransactionRecorder;
use crate::store::WalletStore;
use crate::validation::validate_positive_amount;

impl<R: RoleResolver> WalletContract<R> {
    /// Moves `amount` from a wallet the calling human owns to any other
    /// active wallet.
    ///
    /// Preconditions, first failure wins: positive amount, distinct wallets,
    /// source exists, caller owns source, destination exists, both active,
    /// sufficient balance.
    ///
    /// Writes both wallets, a `transfer_out` and a `transfer_in` record, and
    /// emits `TransferCompleted`, which is also returned.
    pub fn transfer(
        &self,
        inv: &Invocation<'_>,
        from_wallet_id: &str,
        to_wallet_id: &str,
        amount: Decimal,
        description: &str,
    ) -> WalletResult<TransferCompleted> {
        let caller = self.require_role(inv, Role::Human, "only humans can transfer funds")?;
        validate_positive_amount(amount)?;
        if from_wallet_id == to_wallet_id {
            return Err(WalletError::InvalidInput(
                "cannot transfer to the same wallet".into(),
            ));
        }

        let store = WalletStore::new(inv.stub);
        let mut from = store.get(from_wallet_id)?;
        if !caller.owns(&from.owner_id) {
            return Err(deny(&caller, "you can only transfer from your own wallet"));
        }
        let mut to = store.get(to_wallet_id)?;

        ensure_active(&from)?;
        ensure_active(&to)?;
        ensure_covers(&from, amount)?;

        from.balance = checked(from.balance.checked_sub(amount))?;
        to.balance = checked(to.balance.checked_add(amount))?;

        let now = inv.timestamp();
        from.touch(now);
        to.touch(now);
        store.put(&from)?;
        store.put(&to)?;

        let tx_id = inv.tx_id();
        let recorder = TransactionRecorder::new(inv.stub);
        recorder.append(&Transaction::new(
            tx_id,
            &from.wallet_id,
            TransactionType::TransferOut,
            -amount,
            from.balance,
            &to.wallet_id,
            description,
            now,
        ))?;
        recorder.append(&Transaction::new(
            tx_id,
            &to.wallet_id,
            TransactionType::TransferIn,
            amount,
            to.balance,
            &from.wallet_id,
            description,
            now,
        ))?;

        let event = TransferCompleted {
            tx_id: tx_id.to_string(),
            from_wallet_id: from.wallet_id.clone(),
            to_wallet_id: to.wallet_id.clone(),
            amount,
            from_balance: from.balance,
            to_balance: to.balance,
            timestamp: now,
        };
        event.emit(inv.stub)?;

        info!(
            tx_id,
            from = %from.wallet_id,
            to = %to.wallet_id,
            %amount,
            "transfer staged"
        );
        Ok(event)
    }

    /// Adds `amount` to an active wallet. Admin only.
    pub fn credit(
        &self,
        inv: &Invocation<'_>,
        wallet_id: &str,
        amount: Decimal,
        description: &str,
    ) -> WalletResult<Transaction> {
        self.require_role(inv, Role::Admin, "only admin can credit wallets")?;
        validate_positive_amount(amount)?;

        let store = WalletStore::new(inv.stub);
        let mut wallet = store.get(wallet_id)?;
        ensure_active(&wallet)?;
        wallet.balance = checked(wallet.balance.checked_add(amount))?;

        self.book(inv, &store, wallet, TransactionType::Credit, amount, description)
    }

    /// Removes `amount` from an active wallet that holds at least that
    /// much. Admin only.
    pub fn debit(
        &self,
        inv: &Invocation<'_>,
        wallet_id: &str,
        amount: Decimal,
        description: &str,
    ) -> WalletResult<Transaction> {
        self.require_role(inv, Role::Admin, "only admin can debit wallets")?;
        validate_positive_amount(amount)?;

        let store = WalletStore::new(inv.stub);
        let mut wallet = store.get(wallet_id)?;
        ensure_active(&wallet)?;
        ensure_covers(&wallet, amount)?;
        wallet.balance = checked(wallet.balance.checked_sub(amount))?;

        self.book(inv, &store, wallet, TransactionType::Debit, -amount, description)
    }

    /// Stages the updated wallet and its single signed record.
    fn book(
        &self,
        inv: &Invocation<'_>,
        store: &WalletStore<'_>,
        mut wallet: Wallet,
        tx_type: TransactionType,
        signed_amount: Decimal,
        description: &str,
    ) -> WalletResult<Transaction> {
        let now = inv.timestamp();
        wallet.touch(now);
        store.put(&wallet)?;

        let record = Transaction::new(
            inv.tx_id(),
            &wallet.wallet_id,
            tx_type,
            signed_amount,
            wallet.balance,
            "",
            description,
            now,
        );
        TransactionRecorder::new(inv.stub).append(&record)?;

        info!(
            wallet_id = %wallet.wallet_id,
            %tx_type,
            amount = %signed_amount,
            balance = %wallet.balance,
            "balance adjusted"
        );
        Ok(record)
    }
}

fn ensure_active(wallet: &Wallet) -> WalletResult<()> {
    if !wallet.is_active() {
        return Err(WalletError::WalletNotActive {
            wallet_id: wallet.wallet_id.clone(),
            status: wallet.status,
        });
    }
    Ok(())
}

fn ensure_covers(wallet: &Wallet, amount: Decimal) -> WalletResult<()> {
    if wallet.balance < amount {
        return Err(WalletError::InsufficientBalance {
            wallet_id: wallet.wallet_id.clone(),
            balance: wallet.balance,
            required: amount,
        });
    }
    Ok(())
}

fn checked(result: Option<Decimal>) -> WalletResult<Decimal> {
    result.ok_or(WalletError::Overflow { what: "amount" })
}
