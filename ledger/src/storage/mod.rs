//! # Storage Module
//!
//! The committed world state behind every [`TxContext`](crate::context::TxContext).
//!
//! ## Architecture
//!
//! ```text
//! memory.rs: MemoryState: BTreeMap behind a RwLock, for tests and benches
//! db.rs    : LedgerDb: sled trees for world state, events and metadata
//! ```
//!
//! ## Commit Model
//!
//! An invocation never writes to a [`WorldState`] directly. It hands over a
//! [`StateUpdate`] holding its read set (key → digest of the value it saw,
//! or `None` if the key was absent) and its write set. `commit` checks the
//! read set against what is committed *now* and applies the write set in
//! the same atomic step. One stale read and nothing lands.
//!
//! ## Design Decisions
//!
//! 1. **Keys are UTF-8 strings.** Composite keys use `\0` separators, which
//!    sort below every printable character, so prefix scans return one
//!    wallet's records contiguously.
//! 2. **Values are opaque bytes.** The world state holds JSON documents
//!    because selector queries need them, but it never parses them itself.
//! 3. **Every commit gets a sequence number**, stored big-endian so sled's
//!    lexicographic order matches numeric order for the event log.

pub mod db;
pub mod memory;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::LedgerResult;
use crate::events::{ChaincodeEvent, CommittedEvent};
use crate::stub::StateIter;

pub use db::LedgerDb;
pub use memory::MemoryState;

/// BLAKE3 digest of a value as seen by a read.
pub type ValueDigest = [u8; 32];

/// Hashes a stored value for the read set.
pub fn digest(value: &[u8]) -> ValueDigest {
    *blake3::hash(value).as_bytes()
}

/// Everything a successful invocation wants to commit.
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    /// Id of the invocation.
    pub tx_id: String,
    /// Timestamp of the invocation.
    pub timestamp: DateTime<Utc>,
    /// Keys read, with the digest of the committed value at read time.
    pub reads: BTreeMap<String, Option<ValueDigest>>,
    /// Keys written, with their new values.
    pub writes: BTreeMap<String, Vec<u8>>,
    /// The event to append to the event log, if any.
    pub event: Option<ChaincodeEvent>,
}

/// Committed key-value state plus its event log.
pub trait WorldState: Send + Sync {
    /// Reads the committed value of `key`.
    fn get(&self, key: &str) -> LedgerResult<Option<Vec<u8>>>;

    /// Iterates committed entries whose key starts with `prefix`, in key
    /// order. An empty prefix scans everything.
    fn scan_prefix(&self, prefix: &str) -> StateIter<'_>;

    /// Validates the read set and applies the write set atomically.
    /// Returns the commit sequence assigned to the update.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MvccReadConflict`](crate::error::LedgerError::MvccReadConflict)
    /// if any read is stale; nothing is written in that case.
    fn commit(&self, update: &StateUpdate) -> LedgerResult<u64>;

    /// Committed events with sequence `>= from_sequence`, oldest first,
    /// at most `limit` of them (0 = all).
    fn events(&self, from_sequence: u64, limit: usize) -> LedgerResult<Vec<CommittedEvent>>;

    /// Sequence of the latest commit, 0 if nothing has been committed.
    fn latest_sequence(&self) -> LedgerResult<u64>;
}
