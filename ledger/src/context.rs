//! # Transaction Context
//!
//! One [`TxContext`] exists per invocation. It is the chaincode's only door
//! to the world state:
//!
//! - reads go to *committed* state and are remembered in the read set,
//! - writes are buffered in the write set and are invisible until commit,
//! - at most one event is kept (the last one set).
//!
//! When the invocation returns, the runtime either turns the context into a
//! [`StateUpdate`] and commits it, or drops it, which discards everything.

use std::cell::RefCell;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::composite;
use crate::error::{LedgerError, LedgerResult};
use crate::events::ChaincodeEvent;
use crate::query::RichQuery;
use crate::storage::{digest, StateUpdate, ValueDigest, WorldState};
use crate::stub::{ChaincodeStub, StateIter};

/// The per-invocation stub handed to a chaincode.
pub struct TxContext<'a> {
    state: &'a dyn WorldState,
    tx_id: String,
    timestamp: DateTime<Utc>,
    reads: RefCell<BTreeMap<String, Option<ValueDigest>>>,
    writes: RefCell<BTreeMap<String, Vec<u8>>>,
    event: RefCell<Option<ChaincodeEvent>>,
}

impl<'a> TxContext<'a> {
    /// Opens a context over `state` for the invocation `tx_id`.
    pub fn new(state: &'a dyn WorldState, tx_id: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            state,
            tx_id,
            timestamp,
            reads: RefCell::new(BTreeMap::new()),
            writes: RefCell::new(BTreeMap::new()),
            event: RefCell::new(None),
        }
    }

    /// Number of keys buffered for writing.
    pub fn write_count(&self) -> usize {
        self.writes.borrow().len()
    }

    /// The value this invocation will write under `key`, if any.
    pub fn pending_write(&self, key: &str) -> Option<Vec<u8>> {
        self.writes.borrow().get(key).cloned()
    }

    /// Consumes the context into the update the runtime commits.
    pub fn into_update(self) -> StateUpdate {
        StateUpdate {
            tx_id: self.tx_id,
            timestamp: self.timestamp,
            reads: self.reads.into_inner(),
            writes: self.writes.into_inner(),
            event: self.event.into_inner(),
        }
    }
}

impl ChaincodeStub for TxContext<'_> {
    fn tx_id(&self) -> &str {
        &self.tx_id
    }

    fn tx_timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn get_state(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        composite::validate_state_key(key)?;
        let value = self.state.get(key)?;
        // First read wins: that is the version the invocation's decisions
        // were based on.
        self.reads
            .borrow_mut()
            .entry(key.to_string())
            .or_insert_with(|| value.as_deref().map(digest));
        trace!(tx_id = %self.tx_id, key, found = value.is_some(), "get_state");
        Ok(value)
    }

    fn put_state(&self, key: &str, value: Vec<u8>) -> LedgerResult<()> {
        composite::validate_state_key(key)?;
        trace!(tx_id = %self.tx_id, key, bytes = value.len(), "put_state");
        self.writes.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }

    fn get_state_by_partial_composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> LedgerResult<StateIter<'_>> {
        let prefix = composite::create_composite_key(object_type, attributes)?;
        Ok(self.state.scan_prefix(&prefix))
    }

    fn get_query_result(&self, query: &str) -> LedgerResult<StateIter<'_>> {
        let query = RichQuery::parse(query)?;
        let limit = query.limit().unwrap_or(usize::MAX);
        let results = self
            .state
            .scan_prefix("")
            .filter(move |item| match item {
                Ok(kv) => query.matches_bytes(&kv.value),
                Err(_) => true,
            })
            .take(limit);
        Ok(Box::new(results))
    }

    fn set_event(&self, name: &str, payload: Vec<u8>) -> LedgerResult<()> {
        if name.is_empty() {
            return Err(LedgerError::InvalidKey("event name must not be empty".into()));
        }
        *self.event.borrow_mut() = Some(ChaincodeEvent {
            name: name.to_string(),
            payload,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryState;

    fn seeded() -> MemoryState {
        let state = MemoryState::new();
        let mut update = StateUpdate::default();
        update
            .writes
            .insert("W1".into(), br#"{"docType":"wallet","ownerId":"a.b.c.d.e"}"#.to_vec());
        update
            .writes
            .insert("G1".into(), br#"{"docType":"gens"}"#.to_vec());
        state.commit(&update).unwrap();
        state
    }

    #[test]
    fn writes_are_not_visible_to_reads() {
        let state = seeded();
        let ctx = TxContext::new(&state, "tx".into(), Utc::now());
        ctx.put_state("W2", b"{}".to_vec()).unwrap();
        assert_eq!(ctx.get_state("W2").unwrap(), None);
        assert_eq!(ctx.pending_write("W2"), Some(b"{}".to_vec()));
        assert_eq!(ctx.write_count(), 1);
    }

    #[test]
    fn reads_are_recorded_once() {
        let state = seeded();
        let ctx = TxContext::new(&state, "tx".into(), Utc::now());
        assert!(ctx.state_exists("W1").unwrap());
        assert!(!ctx.state_exists("nope").unwrap());

        let update = ctx.into_update();
        assert_eq!(update.reads.len(), 2);
        assert_eq!(update.reads["nope"], None);
        assert!(update.reads["W1"].is_some());
    }

    #[test]
    fn dropped_context_leaves_state_untouched() {
        let state = seeded();
        {
            let ctx = TxContext::new(&state, "tx".into(), Utc::now());
            ctx.put_state("W9", b"{}".to_vec()).unwrap();
        }
        assert_eq!(state.get("W9").unwrap(), None);
    }

    #[test]
    fn rich_query_filters_documents() {
        let state = seeded();
        let ctx = TxContext::new(&state, "tx".into(), Utc::now());
        let keys: Vec<String> = ctx
            .get_query_result(r#"{"selector":{"docType":"wallet"}}"#)
            .unwrap()
            .map(|kv| kv.unwrap().key)
            .collect();
        assert_eq!(keys, vec!["W1"]);
    }

    #[test]
    fn last_event_wins() {
        let state = seeded();
        let ctx = TxContext::new(&state, "tx".into(), Utc::now());
        ctx.set_event("First", vec![1]).unwrap();
        ctx.set_event("Second", vec![2]).unwrap();
        assert!(ctx.set_event("", vec![]).is_err());
        let update = ctx.into_update();
        assert_eq!(update.event.unwrap().name, "Second");
    }

    #[test]
    fn empty_keys_rejected() {
        let state = seeded();
        let ctx = TxContext::new(&state, "tx".into(), Utc::now());
        assert!(ctx.get_state("").is_err());
        assert!(ctx.put_state("", vec![]).is_err());
    }

    #[test]
    fn simple_keys_cannot_reach_composite_keyspace() {
        let state = seeded();
        let ctx = TxContext::new(&state, "tx".into(), Utc::now());
        assert!(ctx.put_state("W1\u{0}", b"{}".to_vec()).is_err());
        assert!(ctx.put_state("\u{0}transaction\u{0}W1", b"{}".to_vec()).is_err());
        assert!(ctx.get_state("\u{0}").is_err());
        assert_eq!(ctx.write_count(), 0);

        let key = ctx.create_composite_key("transaction", &["W1", "tx-1"]).unwrap();
        ctx.put_state(&key, b"{}".to_vec()).unwrap();
        assert_eq!(ctx.pending_write(&key), Some(b"{}".to_vec()));
    }
}
