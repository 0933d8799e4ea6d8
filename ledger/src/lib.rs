// Copyright (c) 2026 JEDO Contributors. MIT License.
// See LICENSE for details.

//! # JEDO Ledger: Chaincode Host
//!
//! Everything a wallet chaincode needs from its peer, and nothing it
//! should know about.
//!
//! ## Architecture
//!
//! - **stub**: The [`ChaincodeStub`](stub::ChaincodeStub) contract a chaincode programs against.
//! - **identity**: Caller identity: attributes plus the encoded x509 id.
//! - **composite**: Composite keys for range-scannable secondary records.
//! - **query**: Selector engine for rich queries over JSON documents.
//! - **context**: Per-invocation read set, write set and event.
//! - **runtime**: Submit/evaluate around a context, with MVCC commit.
//! - **storage**: Committed world state: sled on disk, BTreeMap in memory.
//! - **events**: Chaincode events and the committed event log.
//! - **config**: Key encoding, tree names and identity defaults.
//!
//! ## Guarantees
//!
//! 1. Reads see committed state only. A chaincode never observes its own
//!    uncommitted writes.
//! 2. An invocation commits in full or not at all.
//! 3. A read that went stale before commit fails the whole invocation.

pub mod composite;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod identity;
pub mod query;
pub mod runtime;
pub mod storage;
pub mod stub;

pub use context::TxContext;
pub use error::{LedgerError, LedgerResult};
pub use events::{ChaincodeEvent, CommittedEvent};
pub use identity::{ClientIdentity, X509Identity};
pub use runtime::{Committed, Ledger};
pub use storage::{LedgerDb, MemoryState, WorldState};
pub use stub::{ChaincodeStub, KeyValue, StateIter};
