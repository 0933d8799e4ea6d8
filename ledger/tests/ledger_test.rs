//! Integration tests for the chaincode host.
//!
//! Each test drives the public surface only: a `Ledger` over a temporary
//! sled database, invocations that go through `ChaincodeStub`, and the
//! committed event log.

use std::sync::Arc;
use std::thread;

use serde_json::json;

use jedo_ledger::composite::split_composite_key;
use jedo_ledger::{ChaincodeStub, Ledger, LedgerDb, LedgerError, LedgerResult, WorldState};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn temp_ledger() -> Ledger<LedgerDb> {
    Ledger::new(LedgerDb::open_temporary().expect("temp db"))
}

fn put_json(ledger: &Ledger<LedgerDb>, key: &str, doc: serde_json::Value) {
    ledger
        .submit("Seed", |ctx| -> LedgerResult<()> {
            ctx.put_state(key, serde_json::to_vec(&doc)?)
        })
        .expect("seed commit");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn composite_records_scan_per_wallet() {
    let ledger = temp_ledger();
    ledger
        .submit("Record", |ctx| -> LedgerResult<()> {
            for (wallet, tx) in [("W1", "t1"), ("W1", "t2"), ("W10", "t3"), ("W2", "t4")] {
                let key = ctx.create_composite_key("transaction", &[wallet, tx])?;
                ctx.put_state(&key, serde_json::to_vec(&json!({ "txId": tx }))?)?;
            }
            Ok(())
        })
        .unwrap();

    let tx_ids = ledger
        .evaluate("History", |ctx| -> LedgerResult<Vec<String>> {
            ctx.get_state_by_partial_composite_key("transaction", &["W1"])?
                .map(|kv| -> LedgerResult<String> {
                    let (_, attrs) = split_composite_key(&kv?.key)?;
                    Ok(attrs[1].clone())
                })
                .collect()
        })
        .unwrap();

    assert_eq!(tx_ids, vec!["t1", "t2"]);
}

#[test]
fn rich_query_over_persisted_documents() {
    let ledger = temp_ledger();
    put_json(&ledger, "W1", json!({"docType": "wallet", "ownerId": "anna.worb.alps.ea.jedo.cc", "balance": "10"}));
    put_json(&ledger, "W2", json!({"docType": "wallet", "ownerId": "hans.bern.alps.ea.jedo.cc", "balance": "5"}));
    put_json(&ledger, "G1", json!({"docType": "gens", "gensId": "worb"}));

    let owners = ledger
        .evaluate("ByGens", |ctx| -> LedgerResult<Vec<String>> {
            let query = json!({
                "selector": {"docType": "wallet", "ownerId": {"$regex": ".*\\.worb\\..*"}}
            });
            ctx.get_query_result(&query.to_string())?
                .map(|kv| kv.map(|kv| kv.key))
                .collect()
        })
        .unwrap();
    assert_eq!(owners, vec!["W1"]);

    let rich = ledger
        .evaluate("Rich", |ctx| -> LedgerResult<usize> {
            Ok(ctx
                .get_query_result(r#"{"selector":{"balance":{"$gte":6}}}"#)?
                .count())
        })
        .unwrap();
    assert_eq!(rich, 1);
}

#[test]
fn losing_writer_of_a_race_leaves_no_trace() {
    let ledger = Arc::new(temp_ledger());
    put_json(&ledger, "counter", json!({"n": 0}));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                ledger.submit("Increment", |ctx| -> LedgerResult<()> {
                    let bytes = ctx.get_state("counter")?.unwrap_or_default();
                    let doc: serde_json::Value = serde_json::from_slice(&bytes)?;
                    let n = doc["n"].as_u64().unwrap_or(0);
                    ctx.put_state("counter", serde_json::to_vec(&json!({ "n": n + 1 }))?)
                })
            })
        })
        .collect();

    let mut committed = 0;
    for handle in handles {
        match handle.join().expect("thread") {
            Ok(_) => committed += 1,
            Err(LedgerError::MvccReadConflict { key }) => assert_eq!(key, "counter"),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    // Every committed increment is reflected exactly once.
    let bytes = ledger.state().get("counter").unwrap().unwrap();
    let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(doc["n"].as_u64().unwrap(), committed);
}

#[test]
fn events_survive_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tx_id = {
        let ledger = Ledger::new(LedgerDb::open(dir.path()).unwrap());
        let committed = ledger
            .submit("Emit", |ctx| -> LedgerResult<()> {
                ctx.put_state("k", b"{}".to_vec())?;
                ctx.set_event("WalletCreated", br#"{"walletId":"W1"}"#.to_vec())
            })
            .unwrap();
        committed.tx_id
    };

    let ledger = Ledger::new(LedgerDb::open(dir.path()).unwrap());
    let events = ledger.events(0, 0).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].tx_id, tx_id);
    assert_eq!(
        events[0].event.payload_json().unwrap(),
        json!({"walletId": "W1"})
    );
}
