//! The two host handles every wallet operation receives.

use chrono::{DateTime, Utc};
use jedo_ledger::{ChaincodeStub, ClientIdentity};

/// State access and caller identity for one invocation.
#[derive(Clone, Copy)]
pub struct Invocation<'a> {
    pub stub: &'a dyn ChaincodeStub,
    pub identity: &'a dyn ClientIdentity,
}

impl<'a> Invocation<'a> {
    pub fn new(stub: &'a dyn ChaincodeStub, identity: &'a dyn ClientIdentity) -> Self {
        Self { stub, identity }
    }

    /// Id the host assigned to this invocation.
    pub fn tx_id(&self) -> &str {
        self.stub.tx_id()
    }

    /// Timestamp the host assigned to this invocation.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.stub.tx_timestamp()
    }
}
