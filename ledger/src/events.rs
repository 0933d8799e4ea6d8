//! Chaincode events and their committed form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LedgerResult;

/// A named event raised by a chaincode during an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeEvent {
    /// Event name, e.g. `TransferCompleted`.
    pub name: String,
    /// Opaque payload; JSON by convention.
    pub payload: Vec<u8>,
}

impl ChaincodeEvent {
    /// Decodes the payload as JSON.
    pub fn payload_json(&self) -> LedgerResult<Value> {
        Ok(serde_json::from_slice(&self.payload)?)
    }
}

/// An event as it sits in the event log after its invocation committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedEvent {
    /// Commit sequence of the invocation that raised the event.
    pub sequence: u64,
    /// Id of the invocation that raised the event.
    pub tx_id: String,
    /// Timestamp of the invocation that raised the event.
    pub timestamp: DateTime<Utc>,
    /// The event itself.
    pub event: ChaincodeEvent,
}
