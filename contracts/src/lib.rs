//! # JEDO Wallet Chaincode
//!
//! Wallet accounting for the JEDO ledger: balances, a role-gated wallet
//! lifecycle, and an append-only transaction history next to every
//! balance change.
//!
//! - **identity**: Caller → role (`admin`, `gens`, `human`) by certificate
//!   naming convention, behind the [`RoleResolver`](identity::RoleResolver) trait.
//! - **store** / **recorder**: Typed wallet and gens documents, and the
//!   per-wallet transaction records under composite keys.
//! - **lifecycle**: Create, update, freeze, unfreeze, close; gens registry.
//! - **engine**: Transfer, credit, debit.
//! - **queries**: History and role-scoped listings.
//! - **contract**: [`WalletContract`] and the function-name router.
//!
//! ## Design Principles
//!
//! 1. Money is `Decimal`, and every sum uses `checked_add`/`checked_sub`.
//! 2. Status is an enum with explicit transitions; `closed` is terminal.
//! 3. Every operation resolves its caller first. Resolution failure denies.
//! 4. The chaincode never commits. It stages writes on the stub and the
//!    host commits them all or none.

pub mod config;
pub mod context;
pub mod contract;
pub mod engine;
pub mod error;
pub mod events;
pub mod identity;
pub mod lifecycle;
pub mod model;
pub mod queries;
pub mod recorder;
pub mod store;
pub mod validation;

pub use context::Invocation;
pub use contract::{is_read_only, WalletContract};
pub use error::{ErrorKind, IdentityError, WalletError, WalletResult};
pub use identity::{CertificateRoleResolver, IdentityConfig, Role, RoleResolver};
