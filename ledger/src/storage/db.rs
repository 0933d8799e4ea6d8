//! # LedgerDb: Persistent World State
//!
//! The persistence layer for the JEDO ledger, built on sled's embedded
//! key-value store.
//!
//! ## Tree Layout
//!
//! | Tree          | Key                     | Value                      |
//! |---------------|-------------------------|----------------------------|
//! | `world_state` | simple or composite key | JSON document bytes        |
//! | `events`      | `sequence` (8B BE)      | `bincode(CommittedEvent)`  |
//! | `metadata`    | key (UTF-8)             | value (bytes)              |
//!
//! Sequences are stored as big-endian u64 so that sled's lexicographic
//! ordering matches numeric ordering and the event log range-scans in
//! commit order.
//!
//! ## Atomicity
//!
//! A commit is one sled transaction spanning all three trees: read-set
//! validation, write-set application, the sequence bump and the event
//! append either all land or none do.

use std::path::Path;

use sled::transaction::ConflictableTransactionError;
use sled::{Db, Transactional, Tree};
use tracing::debug;

use super::{digest, StateUpdate, WorldState};
use crate::config::{META_LATEST_SEQUENCE, TREE_EVENTS, TREE_METADATA, TREE_WORLD_STATE};
use crate::error::{LedgerError, LedgerResult};
use crate::events::CommittedEvent;
use crate::stub::{KeyValue, StateIter};

/// Persistent world state for the JEDO ledger.
///
/// # Thread Safety
///
/// sled trees support lock-free concurrent reads and serialized
/// transactions, so a `LedgerDb` can be shared via `Arc<LedgerDb>`
/// without external synchronization.
#[derive(Debug, Clone)]
pub struct LedgerDb {
    /// The underlying sled database handle.
    db: Db,
    /// Committed documents keyed by world-state key.
    world_state: Tree,
    /// Committed events keyed by commit sequence.
    events: Tree,
    /// Bookkeeping (latest sequence).
    metadata: Tree,
}

impl LedgerDb {
    /// Open or create a database at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> LedgerResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a temporary database that is removed when dropped.
    pub fn open_temporary() -> LedgerResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> LedgerResult<Self> {
        let world_state = db.open_tree(TREE_WORLD_STATE)?;
        let events = db.open_tree(TREE_EVENTS)?;
        let metadata = db.open_tree(TREE_METADATA)?;

        Ok(Self {
            db,
            world_state,
            events,
            metadata,
        })
    }

    /// Number of committed world-state keys.
    pub fn key_count(&self) -> usize {
        self.world_state.len()
    }

    /// Number of committed events.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Force a flush of all pending writes to disk.
    pub fn flush(&self) -> LedgerResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

fn decode_sequence(bytes: &[u8]) -> LedgerResult<u64> {
    let array: [u8; 8] = bytes
        .try_into()
        .map_err(|_| LedgerError::Serialization("invalid sequence bytes".to_string()))?;
    Ok(u64::from_be_bytes(array))
}

fn decode_entry(result: sled::Result<(sled::IVec, sled::IVec)>) -> LedgerResult<KeyValue> {
    let (key, value) = result?;
    let key = String::from_utf8(key.to_vec())
        .map_err(|e| LedgerError::Serialization(format!("non UTF-8 key: {e}")))?;
    Ok(KeyValue {
        key,
        value: value.to_vec(),
    })
}

impl WorldState for LedgerDb {
    fn get(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        Ok(self.world_state.get(key.as_bytes())?.map(|v| v.to_vec()))
    }

    fn scan_prefix(&self, prefix: &str) -> StateIter<'_> {
        Box::new(self.world_state.scan_prefix(prefix.as_bytes()).map(decode_entry))
    }

    fn commit(&self, update: &StateUpdate) -> LedgerResult<u64> {
        let sequence = (&self.world_state, &self.events, &self.metadata).transaction(
            |(state, events, metadata)| {
                for (key, seen) in &update.reads {
                    let current = state.get(key.as_bytes())?.map(|v| digest(&v));
                    if current != *seen {
                        return Err(ConflictableTransactionError::Abort(
                            LedgerError::MvccReadConflict { key: key.clone() },
                        ));
                    }
                }

                for (key, value) in &update.writes {
                    state.insert(key.as_bytes(), value.as_slice())?;
                }

                let previous = match metadata.get(META_LATEST_SEQUENCE)? {
                    Some(bytes) => {
                        decode_sequence(&bytes).map_err(ConflictableTransactionError::Abort)?
                    }
                    None => 0,
                };
                let sequence = previous + 1;
                metadata.insert(META_LATEST_SEQUENCE, sequence.to_be_bytes().to_vec())?;

                if let Some(event) = &update.event {
                    let record = CommittedEvent {
                        sequence,
                        tx_id: update.tx_id.clone(),
                        timestamp: update.timestamp,
                        event: event.clone(),
                    };
                    let bytes = bincode::serialize(&record)
                        .map_err(|e| ConflictableTransactionError::Abort(LedgerError::from(e)))?;
                    events.insert(sequence.to_be_bytes().to_vec(), bytes)?;
                }

                Ok(sequence)
            },
        )?;

        self.db.flush()?;
        debug!(sequence, writes = update.writes.len(), "state update committed");
        Ok(sequence)
    }

    fn events(&self, from_sequence: u64, limit: usize) -> LedgerResult<Vec<CommittedEvent>> {
        let start = from_sequence.to_be_bytes().to_vec();
        let limit = if limit == 0 { usize::MAX } else { limit };

        let mut events = Vec::new();
        for result in self.events.range(start..).take(limit) {
            let (_key, value) = result?;
            events.push(bincode::deserialize(&value)?);
        }
        Ok(events)
    }

    fn latest_sequence(&self) -> LedgerResult<u64> {
        match self.metadata.get(META_LATEST_SEQUENCE)? {
            Some(bytes) => decode_sequence(&bytes),
            None => Ok(0),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
