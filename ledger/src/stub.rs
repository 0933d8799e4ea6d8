//! # Chaincode Stub
//!
//! The narrow contract between a chaincode and the world state. A chaincode
//! sees nothing of sled, MVCC or commit ordering; it reads keys, writes
//! keys, scans composite-key ranges, runs selector queries and raises at
//! most one event. Everything it does lands in the enclosing invocation's
//! write set and becomes visible only if the invocation commits.

use chrono::{DateTime, Utc};

use crate::composite;
use crate::error::LedgerResult;

/// A key and the raw bytes stored under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    /// World-state key (simple or composite).
    pub key: String,
    /// Stored value.
    pub value: Vec<u8>,
}

/// Lazily evaluated result set of a range scan or rich query.
pub type StateIter<'a> = Box<dyn Iterator<Item = LedgerResult<KeyValue>> + 'a>;

/// State access available to a chaincode during one invocation.
pub trait ChaincodeStub {
    /// The id the host assigned to this invocation.
    fn tx_id(&self) -> &str;

    /// The timestamp the host assigned to this invocation. Identical for
    /// every read of the same invocation.
    fn tx_timestamp(&self) -> DateTime<Utc>;

    /// Reads the committed value of `key`.
    ///
    /// Writes made earlier in the same invocation are not visible.
    fn get_state(&self, key: &str) -> LedgerResult<Option<Vec<u8>>>;

    /// Buffers a write of `value` under `key`.
    fn put_state(&self, key: &str, value: Vec<u8>) -> LedgerResult<()>;

    /// Returns `true` if `key` has a committed value.
    fn state_exists(&self, key: &str) -> LedgerResult<bool> {
        Ok(self.get_state(key)?.is_some())
    }

    /// Builds a composite key. See [`composite::create_composite_key`].
    fn create_composite_key(&self, object_type: &str, attributes: &[&str]) -> LedgerResult<String> {
        composite::create_composite_key(object_type, attributes)
    }

    /// Scans every committed key that starts with the composite key built
    /// from `object_type` and the leading `attributes`, in key order.
    fn get_state_by_partial_composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> LedgerResult<StateIter<'_>>;

    /// Runs a selector query over committed JSON documents.
    fn get_query_result(&self, query: &str) -> LedgerResult<StateIter<'_>>;

    /// Sets the event emitted if this invocation commits. A later call
    /// replaces an earlier one.
    fn set_event(&self, name: &str, payload: Vec<u8>) -> LedgerResult<()>;
}
