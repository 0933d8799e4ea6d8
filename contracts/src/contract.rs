//! # Wallet Contract
//!
//! The chaincode entry point. [`WalletContract`] owns the role resolver and
//! exposes one method per ledger function; the methods themselves live in
//! [`lifecycle`](crate::lifecycle), [`engine`](crate::engine) and
//! [`queries`](crate::queries).
//!
//! [`WalletContract::invoke`] maps function names and string arguments, as
//! they arrive from a client, onto those methods and returns JSON.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::CONTRACT_VERSION;
use crate::context::Invocation;
use crate::error::{WalletError, WalletResult};
use crate::identity::{Caller, CertificateRoleResolver, IdentityConfig, Role, RoleResolver};
use crate::validation::parse_amount;

/// The wallet chaincode.
#[derive(Debug, Clone, Default)]
pub struct WalletContract<R = CertificateRoleResolver> {
    resolver: R,
}

impl WalletContract<CertificateRoleResolver> {
    /// A contract that resolves roles by certificate naming convention.
    pub fn new(config: IdentityConfig) -> Self {
        Self::with_resolver(CertificateRoleResolver::new(config))
    }
}

impl<R: RoleResolver> WalletContract<R> {
    pub fn with_resolver(resolver: R) -> Self {
        Self { resolver }
    }

    /// Resolves the caller of `inv`.
    pub(crate) fn caller(&self, inv: &Invocation<'_>) -> WalletResult<Caller> {
        Ok(self.resolver.resolve(inv.identity)?)
    }

    /// Resolves the caller and requires `role`.
    pub(crate) fn require_role(
        &self,
        inv: &Invocation<'_>,
        role: Role,
        denial: &str,
    ) -> WalletResult<Caller> {
        let caller = self.caller(inv)?;
        if caller.role != role {
            return Err(deny(&caller, denial));
        }
        Ok(caller)
    }

    // -----------------------------------------------------------------------
    // Housekeeping
    // -----------------------------------------------------------------------

    /// Nothing to seed: wallets only come from `CreateWallet`.
    pub fn init_ledger(&self, inv: &Invocation<'_>) -> WalletResult<()> {
        info!(tx_id = inv.tx_id(), version = CONTRACT_VERSION, "wallet ledger initialized");
        Ok(())
    }

    pub fn contract_version(&self) -> &'static str {
        CONTRACT_VERSION
    }

    pub fn ping(&self) -> &'static str {
        "pong"
    }

    // -----------------------------------------------------------------------
    // Router
    // -----------------------------------------------------------------------

    /// Runs `function` with positional string `args` and returns its result
    /// as JSON.
    ///
    /// # Errors
    ///
    /// [`WalletError::InvalidInput`] for an unknown function or a wrong
    /// argument count, otherwise whatever the function returns.
    pub fn invoke(&self, inv: &Invocation<'_>, function: &str, args: &[String]) -> WalletResult<Value> {
        let args = Args::new(function, args);
        match function {
            "InitLedger" => {
                args.arity(0, 0)?;
                to_json(self.init_ledger(inv)?)
            }
            "GetContractVersion" => {
                args.arity(0, 0)?;
                to_json(self.contract_version())
            }
            "Ping" => {
                args.arity(0, 0)?;
                to_json(self.ping())
            }

            // Lifecycle
            "CreateWallet" => {
                args.arity(3, 4)?;
                to_json(self.create_wallet(
                    inv,
                    args.get(0),
                    args.get(1),
                    args.amount(2)?,
                    args.get(3),
                )?)
            }
            "UpdateWallet" => {
                args.arity(2, 2)?;
                to_json(self.update_wallet(inv, args.get(0), args.get(1))?)
            }
            "FreezeWallet" => {
                args.arity(1, 1)?;
                to_json(self.freeze_wallet(inv, args.get(0))?)
            }
            "UnfreezeWallet" => {
                args.arity(1, 1)?;
                to_json(self.unfreeze_wallet(inv, args.get(0))?)
            }
            "DeleteWallet" | "CloseWallet" => {
                args.arity(1, 1)?;
                to_json(self.close_wallet(inv, args.get(0))?)
            }
            "RegisterGens" => {
                args.arity(2, 2)?;
                to_json(self.register_gens(inv, args.get(0), args.get(1))?)
            }
            "GetGens" => {
                args.arity(1, 1)?;
                to_json(self.get_gens(inv, args.get(0))?)
            }
            "GetWallet" => {
                args.arity(1, 1)?;
                to_json(self.get_wallet(inv, args.get(0))?)
            }
            "WalletExists" => {
                args.arity(1, 1)?;
                to_json(self.wallet_exists(inv, args.get(0))?)
            }
            "GetBalance" => {
                args.arity(1, 1)?;
                to_json(self.get_balance(inv, args.get(0))?)
            }

            // Balance engine
            "Transfer" => {
                args.arity(3, 4)?;
                to_json(self.transfer(
                    inv,
                    args.get(0),
                    args.get(1),
                    args.amount(2)?,
                    args.get(3),
                )?)
            }
            "Credit" => {
                args.arity(2, 3)?;
                to_json(self.credit(inv, args.get(0), args.amount(1)?, args.get(2))?)
            }
            "Debit" => {
                args.arity(2, 3)?;
                to_json(self.debit(inv, args.get(0), args.amount(1)?, args.get(2))?)
            }

            // Queries
            "GetWalletHistory" => {
                args.arity(1, 2)?;
                to_json(self.get_wallet_history(inv, args.get(0), args.limit(1)?)?)
            }
            "GetWalletsByGens" => {
                args.arity(1, 1)?;
                to_json(self.get_wallets_by_gens(inv, args.get(0))?)
            }
            "GetWalletsByHuman" => {
                args.arity(1, 1)?;
                to_json(self.get_wallets_by_human(inv, args.get(0))?)
            }
            "GetAllWallets" => {
                args.arity(0, 0)?;
                to_json(self.get_all_wallets(inv)?)
            }
            "ListGens" => {
                args.arity(0, 0)?;
                to_json(self.list_gens(inv)?)
            }
            "GetTotalBalance" => {
                args.arity(0, 0)?;
                to_json(self.get_total_balance(inv)?)
            }

            other => Err(WalletError::InvalidInput(format!("unknown function {other}"))),
        }
    }
}

/// Whether `function` only reads, so the host can evaluate it instead of
/// submitting it.
pub fn is_read_only(function: &str) -> bool {
    matches!(
        function,
        "GetContractVersion"
            | "Ping"
            | "GetGens"
            | "GetWallet"
            | "WalletExists"
            | "GetBalance"
            | "GetWalletHistory"
            | "GetWalletsByGens"
            | "GetWalletsByHuman"
            | "GetAllWallets"
            | "ListGens"
            | "GetTotalBalance"
    )
}

/// Logs and builds an authorization failure.
pub(crate) fn deny(caller: &Caller, message: &str) -> WalletError {
    warn!(role = %caller.role, msp_id = ?caller.msp_id, reason = message, "authorization denied");
    WalletError::Unauthorized(message.to_string())
}

fn to_json<T: Serialize>(value: T) -> WalletResult<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Positional arguments of one routed call.
struct Args<'a> {
    function: &'a str,
    values: &'a [String],
}

impl<'a> Args<'a> {
    fn new(function: &'a str, values: &'a [String]) -> Self {
        Self { function, values }
    }

    fn arity(&self, min: usize, max: usize) -> WalletResult<()> {
        let n = self.values.len();
        if n < min || n > max {
            let expected = if min == max {
                min.to_string()
            } else {
                format!("{min} to {max}")
            };
            return Err(WalletError::InvalidInput(format!(
                "{} expects {expected} arguments, got {n}",
                self.function
            )));
        }
        Ok(())
    }

    /// The argument at `index`, or `""` if an optional one was omitted.
    fn get(&self, index: usize) -> &'a str {
        self.values.get(index).map(String::as_str).unwrap_or("")
    }

    fn amount(&self, index: usize) -> WalletResult<Decimal> {
        parse_amount(self.get(index))
    }

    fn limit(&self, index: usize) -> WalletResult<usize> {
        let raw = self.get(index).trim();
        if raw.is_empty() {
            return Ok(0);
        }
        raw.parse()
            .map_err(|_| WalletError::InvalidInput(format!("invalid limit {raw:?}")))
    }
}
