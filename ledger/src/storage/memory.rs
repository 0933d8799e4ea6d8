//! In-memory world state.
//!
//! Same commit semantics as [`LedgerDb`](super::LedgerDb), no disk. The
//! whole commit runs under one write lock, which is what makes read-set
//! validation and write-set application a single atomic step here.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::{digest, StateUpdate, WorldState};
use crate::error::{LedgerError, LedgerResult};
use crate::events::CommittedEvent;
use crate::stub::{KeyValue, StateIter};

#[derive(Debug, Default)]
struct Inner {
    state: BTreeMap<String, Vec<u8>>,
    events: Vec<CommittedEvent>,
    sequence: u64,
}

/// World state held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryState {
    inner: RwLock<Inner>,
}

impl MemoryState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed keys.
    pub fn key_count(&self) -> usize {
        self.inner.read().state.len()
    }
}

impl WorldState for MemoryState {
    fn get(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        Ok(self.inner.read().state.get(key).cloned())
    }

    fn scan_prefix(&self, prefix: &str) -> StateIter<'_> {
        // Snapshot under the read lock; the lock guard cannot outlive this call.
        let entries: Vec<_> = self
            .inner
            .read()
            .state
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| {
                Ok(KeyValue {
                    key: key.clone(),
                    value: value.clone(),
                })
            })
            .collect();
        Box::new(entries.into_iter())
    }

    fn commit(&self, update: &StateUpdate) -> LedgerResult<u64> {
        let mut inner = self.inner.write();

        for (key, seen) in &update.reads {
            let current = inner.state.get(key).map(|v| digest(v));
            if current != *seen {
                return Err(LedgerError::MvccReadConflict { key: key.clone() });
            }
        }

        for (key, value) in &update.writes {
            inner.state.insert(key.clone(), value.clone());
        }

        inner.sequence += 1;
        let sequence = inner.sequence;

        if let Some(event) = &update.event {
            inner.events.push(CommittedEvent {
                sequence,
                tx_id: update.tx_id.clone(),
                timestamp: update.timestamp,
                event: event.clone(),
            });
        }

        Ok(sequence)
    }

    fn events(&self, from_sequence: u64, limit: usize) -> LedgerResult<Vec<CommittedEvent>> {
        let inner = self.inner.read();
        let selected = inner
            .events
            .iter()
            .filter(|e| e.sequence >= from_sequence)
            .take(if limit == 0 { usize::MAX } else { limit })
            .cloned()
            .collect();
        Ok(selected)
    }

    fn latest_sequence(&self) -> LedgerResult<u64> {
        Ok(self.inner.read().sequence)
    }
}
