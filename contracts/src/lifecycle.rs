//! # Wallet Lifecycle
//!
//! Creation, metadata updates and status transitions of wallets, plus gens
//! registration and the single-wallet reads.
//!
//! | Action   | Caller | From     | To       | Extra precondition |
//! |----------|--------|----------|----------|--------------------|
//! | create   | gens   | -        | active   | owner in the gens's namespace |
//! | freeze   | admin  | active   | frozen   | |
//! | unfreeze | admin  | frozen   | active   | |
//! | close    | admin  | active   | closed   | balance is zero |
//!
//! Nothing leaves `closed`.

use rust_decimal::Decimal;
use tracing::info;

use crate::config::INITIAL_BALANCE_DESCRIPTION;
use crate::context::Invocation;
use crate::contract::{deny, WalletContract};
use crate::error::{WalletError, WalletResult};
use crate::events::{WalletCreated, WalletEvent};
use crate::identity::{Role, RoleResolver};
use crate::model::{Gens, Transaction, TransactionType, Wallet, WalletStatus};
use crate::recorder::TransactionRecorder;
use crate::store::WalletStore;
use crate::validation::{parse_metadata, validate_gens_id, validate_owner_id, validate_wallet_id};

impl<R: RoleResolver> WalletContract<R> {
    /// Creates an active wallet for a human under the calling gens.
    ///
    /// A positive `initial_balance` is recorded as one `credit` record.
    /// Emits `WalletCreated`.
    ///
    /// # Errors
    ///
    /// - [`WalletError::Unauthorized`] if the caller is not a gens, or the
    ///   owner is outside the gens's namespace.
    /// - [`WalletError::InvalidInput`] for malformed ids or a negative
    ///   opening balance.
    /// - [`WalletError::WalletExists`] if the id is taken.
    pub fn create_wallet(
        &self,
        inv: &Invocation<'_>,
        wallet_id: &str,
        owner_id: &str,
        initial_balance: Decimal,
        metadata_json: &str,
    ) -> WalletResult<Wallet> {
        let caller = self.require_role(inv, Role::Gens, "only gens can create wallets")?;
        let gens_name = caller
            .gens_name()
            .ok_or_else(|| deny(&caller, "cannot derive gens name from caller identity"))?;
        if !(owner_id.starts_with(&format!("{gens_name}.")) || owner_id.contains(&format!(".{gens_name}."))) {
            return Err(deny(&caller, "you can only create wallets for your own humans"));
        }

        validate_wallet_id(wallet_id)?;
        validate_owner_id(owner_id)?;

        let store = WalletStore::new(inv.stub);
        if store.exists(wallet_id)? {
            return Err(WalletError::WalletExists {
                wallet_id: wallet_id.to_string(),
            });
        }
        if initial_balance < Decimal::ZERO {
            return Err(WalletError::InvalidInput(
                "initial balance cannot be negative".into(),
            ));
        }
        let metadata = parse_metadata(metadata_json)?;

        let now = inv.timestamp();
        let wallet = Wallet::new(wallet_id, owner_id, initial_balance, metadata, now);
        store.put(&wallet)?;

        if initial_balance > Decimal::ZERO {
            TransactionRecorder::new(inv.stub).append(&Transaction::new(
                inv.tx_id(),
                wallet_id,
                TransactionType::Credit,
                initial_balance,
                initial_balance,
                "",
                INITIAL_BALANCE_DESCRIPTION,
                now,
            ))?;
        }

        WalletCreated {
            wallet_id: wallet_id.to_string(),
            owner_id: owner_id.to_string(),
            initial_balance,
            timestamp: now,
        }
        .emit(inv.stub)?;

        info!(wallet_id, owner_id, gens = gens_name, %initial_balance, "wallet created");
        Ok(wallet)
    }

    /// Replaces a wallet's metadata wholesale. Owner or admin.
    pub fn update_wallet(
        &self,
        inv: &Invocation<'_>,
        wallet_id: &str,
        metadata_json: &str,
    ) -> WalletResult<Wallet> {
        let caller = self.caller(inv)?;
        let store = WalletStore::new(inv.stub);
        let mut wallet = store.get(wallet_id)?;
        if !caller.is_admin() && !caller.owns(&wallet.owner_id) {
            return Err(deny(&caller, "you can only update your own wallet"));
        }

        wallet.metadata = parse_metadata(metadata_json)?;
        wallet.touch(inv.timestamp());
        store.put(&wallet)?;

        info!(wallet_id, entries = wallet.metadata.len(), "wallet metadata updated");
        Ok(wallet)
    }

    /// `active → frozen`. Admin only.
    pub fn freeze_wallet(&self, inv: &Invocation<'_>, wallet_id: &str) -> WalletResult<Wallet> {
        self.require_role(inv, Role::Admin, "only admin can freeze wallets")?;
        self.transition(inv, wallet_id, WalletStatus::Active, WalletStatus::Frozen, "freeze")
    }

    /// `frozen → active`. Admin only.
    pub fn unfreeze_wallet(&self, inv: &Invocation<'_>, wallet_id: &str) -> WalletResult<Wallet> {
        self.require_role(inv, Role::Admin, "only admin can unfreeze wallets")?;
        self.transition(inv, wallet_id, WalletStatus::Frozen, WalletStatus::Active, "unfreeze")
    }

    /// `active → closed`, for an empty wallet. Admin only. Irreversible;
    /// the document stays in the world state.
    pub fn close_wallet(&self, inv: &Invocation<'_>, wallet_id: &str) -> WalletResult<Wallet> {
        self.require_role(inv, Role::Admin, "only admin can delete wallets")?;
        let wallet = WalletStore::new(inv.stub).get(wallet_id)?;
        if wallet.status == WalletStatus::Active && !wallet.balance.is_zero() {
            return Err(WalletError::NonZeroBalance {
                wallet_id: wallet.wallet_id,
                balance: wallet.balance,
            });
        }
        self.apply_transition(inv, wallet, WalletStatus::Active, WalletStatus::Closed, "close")
    }

    fn transition(
        &self,
        inv: &Invocation<'_>,
        wallet_id: &str,
        from: WalletStatus,
        to: WalletStatus,
        action: &'static str,
    ) -> WalletResult<Wallet> {
        let wallet = WalletStore::new(inv.stub).get(wallet_id)?;
        self.apply_transition(inv, wallet, from, to, action)
    }

    fn apply_transition(
        &self,
        inv: &Invocation<'_>,
        mut wallet: Wallet,
        from: WalletStatus,
        to: WalletStatus,
        action: &'static str,
    ) -> WalletResult<Wallet> {
        if wallet.status != from {
            return Err(WalletError::InvalidTransition {
                wallet_id: wallet.wallet_id,
                status: wallet.status,
                action,
            });
        }
        wallet.status = to;
        wallet.touch(inv.timestamp());
        WalletStore::new(inv.stub).put(&wallet)?;

        info!(wallet_id = %wallet.wallet_id, %from, %to, "wallet status changed");
        Ok(wallet)
    }

    // -----------------------------------------------------------------------
    // Gens
    // -----------------------------------------------------------------------

    /// Registers a gens. Admin only.
    pub fn register_gens(&self, inv: &Invocation<'_>, gens_id: &str, name: &str) -> WalletResult<Gens> {
        self.require_role(inv, Role::Admin, "only admin can register gens")?;
        validate_gens_id(gens_id)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(WalletError::InvalidInput("gens name cannot be empty".into()));
        }

        let store = WalletStore::new(inv.stub);
        if store.gens_exists(gens_id)? {
            return Err(WalletError::GensExists {
                gens_id: gens_id.to_string(),
            });
        }

        let gens = Gens::new(gens_id, name, inv.timestamp());
        store.put_gens(&gens)?;
        info!(gens_id, name, "gens registered");
        Ok(gens)
    }

    /// Reads a gens. Admin, or the gens itself.
    pub fn get_gens(&self, inv: &Invocation<'_>, gens_id: &str) -> WalletResult<Gens> {
        let caller = self.caller(inv)?;
        if !caller.is_admin() && !(caller.role == Role::Gens && caller.owns(gens_id)) {
            return Err(deny(&caller, "you can only view your own gens"));
        }
        WalletStore::new(inv.stub).get_gens(gens_id)
    }

    // -----------------------------------------------------------------------
    // Single-wallet reads
    // -----------------------------------------------------------------------

    /// Owner or admin.
    pub fn get_wallet(&self, inv: &Invocation<'_>, wallet_id: &str) -> WalletResult<Wallet> {
        let caller = self.caller(inv)?;
        let wallet = WalletStore::new(inv.stub).get(wallet_id)?;
        if !caller.is_admin() && !caller.owns(&wallet.owner_id) {
            return Err(deny(&caller, "you can only view your own wallet"));
        }
        Ok(wallet)
    }

    /// Any resolved caller.
    pub fn wallet_exists(&self, inv: &Invocation<'_>, wallet_id: &str) -> WalletResult<bool> {
        self.caller(inv)?;
        validate_wallet_id(wallet_id)?;
        WalletStore::new(inv.stub).exists(wallet_id)
    }

    /// The owning human only.
    pub fn get_balance(&self, inv: &Invocation<'_>, wallet_id: &str) -> WalletResult<Decimal> {
        let caller = self.require_role(inv, Role::Human, "only humans can check balance")?;
        let wallet = WalletStore::new(inv.stub).get(wallet_id)?;
        if !caller.owns(&wallet.owner_id) {
            return Err(deny(&caller, "you can only check your own balance"));
        }
        Ok(wallet.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::identity::IdentityConfig;
    use jedo_ledger::{Ledger, MemoryState, TxContext, X509Identity};

    const GENS: &str = "worb.alps.ea.jedo.cc";
    const HANS: &str = "hans.worb.alps.ea.jedo.cc";
    const ADMIN: &str = "admin.alps.ea.jedo.cc";

    struct Fixture {
        ledger: Ledger<MemoryState>,
        contract: WalletContract,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                ledger: Ledger::new(MemoryState::new()),
                contract: WalletContract::new(IdentityConfig::default()),
            }
        }

        fn submit<T>(
            &self,
            cn: &str,
            f: impl FnOnce(&WalletContract, &Invocation<'_>) -> WalletResult<T>,
        ) -> WalletResult<T> {
            let identity = X509Identity::from_common_name(cn);
            self.ledger
                .submit("test", |ctx: &TxContext<'_>| {
                    f(&self.contract, &Invocation::new(ctx, &identity))
                })
                .map(|c| c.value)
        }

        fn create(&self, wallet_id: &str, balance: i64) -> WalletResult<Wallet> {
            self.submit(GENS, |c, inv| {
                c.create_wallet(inv, wallet_id, HANS, Decimal::from(balance), "")
            })
        }
    }

    #[test]
    fn gens_creates_wallet_with_opening_credit() {
        let fx = Fixture::new();
        let wallet = fx.create("W001", 100).unwrap();
        assert_eq!(wallet.status, WalletStatus::Active);
        assert_eq!(wallet.balance, Decimal::from(100));
        assert_eq!(wallet.created_at, wallet.updated_at);

        let history = fx
            .submit(ADMIN, |c, inv| c.get_wallet_history(inv, "W001", 0))
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].tx_type, TransactionType::Credit);
        assert_eq!(history[0].description, "Initial balance");
    }

    #[test]
    fn zero_opening_balance_writes_no_record() {
        let fx = Fixture::new();
        fx.create("W001", 0).unwrap();
        let history = fx
            .submit(ADMIN, |c, inv| c.get_wallet_history(inv, "W001", 0))
            .unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn only_gens_in_namespace_may_create() {
        let fx = Fixture::new();
        let err = fx
            .submit(HANS, |c, inv| c.create_wallet(inv, "W001", HANS, Decimal::ONE, ""))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);

        let err = fx
            .submit("bern.alps.ea.jedo.cc", |c, inv| {
                c.create_wallet(inv, "W001", HANS, Decimal::ONE, "")
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "you can only create wallets for your own humans");
    }

    #[test]
    fn duplicate_and_negative_are_rejected() {
        let fx = Fixture::new();
        fx.create("W001", 5).unwrap();
        let err = fx.create("W001", 7).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Duplicate);

        let err = fx.create("W002", -1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn freeze_unfreeze_close_follow_state_machine() {
        let fx = Fixture::new();
        fx.create("W001", 0).unwrap();

        let err = fx.submit(ADMIN, |c, inv| c.unfreeze_wallet(inv, "W001")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);

        let frozen = fx.submit(ADMIN, |c, inv| c.freeze_wallet(inv, "W001")).unwrap();
        assert_eq!(frozen.status, WalletStatus::Frozen);
        assert!(fx.submit(ADMIN, |c, inv| c.close_wallet(inv, "W001")).is_err());

        fx.submit(ADMIN, |c, inv| c.unfreeze_wallet(inv, "W001")).unwrap();
        let closed = fx.submit(ADMIN, |c, inv| c.close_wallet(inv, "W001")).unwrap();
        assert_eq!(closed.status, WalletStatus::Closed);

        for result in [
            fx.submit(ADMIN, |c, inv| c.freeze_wallet(inv, "W001")),
            fx.submit(ADMIN, |c, inv| c.unfreeze_wallet(inv, "W001")),
            fx.submit(ADMIN, |c, inv| c.close_wallet(inv, "W001")),
        ] {
            assert_eq!(result.unwrap_err().kind(), ErrorKind::State);
        }
    }

    #[test]
    fn non_admin_cannot_freeze() {
        let fx = Fixture::new();
        fx.create("W001", 0).unwrap();
        let err = fx.submit(GENS, |c, inv| c.freeze_wallet(inv, "W001")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }

    #[test]
    fn owner_updates_metadata_wholesale() {
        let fx = Fixture::new();
        fx.submit(GENS, |c, inv| {
            c.create_wallet(inv, "W001", HANS, Decimal::ZERO, r#"{"a":"1","b":"2"}"#)
        })
        .unwrap();

        let updated = fx
            .submit(HANS, |c, inv| c.update_wallet(inv, "W001", r#"{"c":"3"}"#))
            .unwrap();
        assert_eq!(updated.metadata.len(), 1);
        assert_eq!(updated.metadata["c"], "3");

        let cleared = fx.submit(ADMIN, |c, inv| c.update_wallet(inv, "W001", "null")).unwrap();
        assert!(cleared.metadata.is_empty());

        let err = fx
            .submit("anna.worb.alps.ea.jedo.cc", |c, inv| c.update_wallet(inv, "W001", "{}"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }

    #[test]
    fn gens_registration() {
        let fx = Fixture::new();
        let gens = fx.submit(ADMIN, |c, inv| c.register_gens(inv, "worb", "Worb AG")).unwrap();
        assert_eq!(gens.name, "Worb AG");

        let err = fx.submit(ADMIN, |c, inv| c.register_gens(inv, "worb", "Again")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Duplicate);
        let err = fx.submit(ADMIN, |c, inv| c.register_gens(inv, "bern", " ")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = fx.submit(GENS, |c, inv| c.register_gens(inv, "bern", "Bern")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);

        let own = fx.submit(GENS, |c, inv| c.get_gens(inv, "worb")).unwrap();
        assert_eq!(own, gens);
        let err = fx.submit(HANS, |c, inv| c.get_gens(inv, "worb")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }

    #[test]
    fn balance_is_for_the_owning_human() {
        let fx = Fixture::new();
        fx.create("W001", 42).unwrap();
        let balance = fx.submit(HANS, |c, inv| c.get_balance(inv, "W001")).unwrap();
        assert_eq!(balance, Decimal::from(42));

        let err = fx.submit(ADMIN, |c, inv| c.get_balance(inv, "W001")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        let err = fx
            .submit("anna.worb.alps.ea.jedo.cc", |c, inv| c.get_balance(inv, "W001"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }

    #[test]
    fn exists_needs_only_a_resolved_caller() {
        let fx = Fixture::new();
        fx.create("W001", 0).unwrap();
        assert!(fx.submit(HANS, |c, inv| c.wallet_exists(inv, "W001")).unwrap());
        assert!(!fx.submit(GENS, |c, inv| c.wallet_exists(inv, "W002")).unwrap());
        let err = fx.submit("jedo", |c, inv| c.wallet_exists(inv, "W001")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Identity);
    }
}
