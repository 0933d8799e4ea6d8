//! # Invocation Runtime
//!
//! [`Ledger`] plays the peer's part around a chaincode invocation:
//!
//! ```text
//! submit:   new tx id ─▶ TxContext ─▶ chaincode ─┬─ Ok  ─▶ commit (MVCC) ─▶ Committed<T>
//!                                                └─ Err ─▶ discard
//! evaluate: new tx id ─▶ TxContext ─▶ chaincode ─▶ discard, return value
//! ```
//!
//! Commits are serialized by the underlying [`WorldState`]. Two invocations
//! racing on the same key both run; the one that commits second fails its
//! read-set validation and leaves no trace.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::context::TxContext;
use crate::error::{LedgerError, LedgerResult};
use crate::events::{ChaincodeEvent, CommittedEvent};
use crate::storage::WorldState;

/// Outcome of a committed invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Committed<T> {
    /// Id assigned to the invocation.
    pub tx_id: String,
    /// Timestamp assigned to the invocation.
    pub timestamp: DateTime<Utc>,
    /// Commit sequence of the write set.
    pub sequence: u64,
    /// What the chaincode returned.
    pub value: T,
    /// The event that was committed with the invocation, if any.
    pub event: Option<ChaincodeEvent>,
}

/// Host runtime over a world state.
#[derive(Debug)]
pub struct Ledger<S: WorldState> {
    state: S,
}

impl<S: WorldState> Ledger<S> {
    /// Wraps a world state.
    pub fn new(state: S) -> Self {
        Self { state }
    }

    /// The underlying world state.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Runs `f` as a state-changing invocation stamped with the current time.
    pub fn submit<T, E, F>(&self, function: &str, f: F) -> Result<Committed<T>, E>
    where
        F: FnOnce(&TxContext<'_>) -> Result<T, E>,
        E: From<LedgerError>,
    {
        self.submit_at(function, Utc::now(), f)
    }

    /// Runs `f` as a state-changing invocation with a caller-chosen timestamp.
    ///
    /// On `Ok` the read set is validated and the write set and event are
    /// committed atomically. On `Err` nothing is written.
    ///
    /// # Errors
    ///
    /// Whatever `f` returns, or [`LedgerError::MvccReadConflict`] converted
    /// into `E` if a key the invocation read changed before commit.
    pub fn submit_at<T, E, F>(
        &self,
        function: &str,
        timestamp: DateTime<Utc>,
        f: F,
    ) -> Result<Committed<T>, E>
    where
        F: FnOnce(&TxContext<'_>) -> Result<T, E>,
        E: From<LedgerError>,
    {
        let tx_id = new_tx_id(function, timestamp);
        let ctx = TxContext::new(&self.state, tx_id.clone(), timestamp);

        let value = match f(&ctx) {
            Ok(value) => value,
            Err(err) => {
                debug!(%tx_id, function, "invocation failed, write set discarded");
                return Err(err);
            }
        };

        let update = ctx.into_update();
        let writes = update.writes.len();
        let sequence = self.state.commit(&update)?;

        info!(%tx_id, function, sequence, writes, "invocation committed");
        Ok(Committed {
            tx_id,
            timestamp,
            sequence,
            value,
            event: update.event,
        })
    }

    /// Runs `f` as a read-only invocation. Any writes it makes are dropped.
    pub fn evaluate<T, E, F>(&self, function: &str, f: F) -> Result<T, E>
    where
        F: FnOnce(&TxContext<'_>) -> Result<T, E>,
    {
        let timestamp = Utc::now();
        let tx_id = new_tx_id(function, timestamp);
        let ctx = TxContext::new(&self.state, tx_id, timestamp);
        let value = f(&ctx)?;
        if ctx.write_count() > 0 {
            debug!(function, writes = ctx.write_count(), "evaluate discarded writes");
        }
        Ok(value)
    }

    /// Committed events from `from_sequence` on, at most `limit` (0 = all).
    pub fn events(&self, from_sequence: u64, limit: usize) -> LedgerResult<Vec<CommittedEvent>> {
        self.state.events(from_sequence, limit)
    }
}

/// Derives a fresh transaction id: hex BLAKE3 over a random nonce, the
/// timestamp and the function name.
pub fn new_tx_id(function: &str, timestamp: DateTime<Utc>) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(Uuid::new_v4().as_bytes());
    hasher.update(&timestamp.timestamp().to_be_bytes());
    hasher.update(&timestamp.timestamp_subsec_nanos().to_be_bytes());
    hasher.update(function.as_bytes());
    hex::encode(hasher.finalize().as_bytes())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TX_ID_LENGTH;
    use crate::storage::MemoryState;
    use crate::stub::ChaincodeStub;

    fn ledger() -> Ledger<MemoryState> {
        Ledger::new(MemoryState::new())
    }

    #[test]
    fn tx_ids_are_unique_hex() {
        let now = Utc::now();
        let a = new_tx_id("Transfer", now);
        let b = new_tx_id("Transfer", now);
        assert_ne!(a, b);
        assert_eq!(a.len(), TX_ID_LENGTH * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn submit_commits_writes_and_event() {
        let ledger = ledger();
        let committed = ledger
            .submit("Put", |ctx| -> LedgerResult<&str> {
                ctx.put_state("k", b"v".to_vec())?;
                ctx.set_event("Stored", b"{}".to_vec())?;
                Ok("done")
            })
            .unwrap();

        assert_eq!(committed.value, "done");
        assert_eq!(committed.sequence, 1);
        assert_eq!(committed.event.unwrap().name, "Stored");
        assert_eq!(ledger.state().get("k").unwrap(), Some(b"v".to_vec()));

        let events = ledger.events(0, 0).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].tx_id, committed.tx_id);
    }

    #[test]
    fn failed_invocation_discards_everything() {
        let ledger = ledger();
        let result = ledger.submit("Put", |ctx| -> LedgerResult<()> {
            ctx.put_state("k", b"v".to_vec())?;
            ctx.set_event("Stored", b"{}".to_vec())?;
            Err(LedgerError::InvalidKey("boom".into()))
        });

        assert!(result.is_err());
        assert_eq!(ledger.state().get("k").unwrap(), None);
        assert!(ledger.events(0, 0).unwrap().is_empty());
        assert_eq!(ledger.state().latest_sequence().unwrap(), 0);
    }

    #[test]
    fn evaluate_never_writes() {
        let ledger = ledger();
        let seen = ledger
            .evaluate("Peek", |ctx| -> LedgerResult<bool> {
                ctx.put_state("k", b"v".to_vec())?;
                ctx.state_exists("k")
            })
            .unwrap();
        assert!(!seen);
        assert_eq!(ledger.state().get("k").unwrap(), None);
    }

    #[test]
    fn submit_at_uses_given_timestamp() {
        let ledger = ledger();
        let ts = DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let committed = ledger
            .submit_at("Stamp", ts, |ctx| -> LedgerResult<DateTime<Utc>> {
                Ok(ctx.tx_timestamp())
            })
            .unwrap();
        assert_eq!(committed.value, ts);
        assert_eq!(committed.timestamp, ts);
    }

    #[test]
    fn concurrent_writer_causes_read_conflict() {
        let ledger = ledger();
        ledger
            .submit("Seed", |ctx| -> LedgerResult<()> {
                ctx.put_state("balance", b"10".to_vec())
            })
            .unwrap();

        let result = ledger.submit("Spend", |ctx| -> LedgerResult<()> {
            let _ = ctx.get_state("balance")?;
            // Another invocation commits between our read and our commit.
            let mut other = crate::storage::StateUpdate::default();
            other.writes.insert("balance".into(), b"0".to_vec());
            ledger.state().commit(&other)?;
            ctx.put_state("balance", b"5".to_vec())
        });

        assert!(matches!(result, Err(LedgerError::MvccReadConflict { .. })));
        assert_eq!(ledger.state().get("balance").unwrap(), Some(b"0".to_vec()));
    }
}
