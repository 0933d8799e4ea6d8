// Copyright (c) 2026 JEDO Contributors. MIT License.
// See LICENSE for details.

//! # JEDO Node
//!
//! Entry point for the `jedo-node` binary. Parses CLI arguments, initializes
//! logging, opens the persistent ledger and runs one chaincode call.
//!
//! The binary supports five subcommands:
//!
//! - `init`: create the data directory and run `InitLedger`
//! - `invoke`: submit a function and commit its writes
//! - `query`: evaluate a function, committing nothing
//! - `events`: list committed chaincode events
//! - `version`: print build version information
//!
//! Results go to stdout as JSON. Failures go to stderr as
//! `<Kind>: <message>` and the process exits non-zero.

mod cli;
mod logging;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{json, Value};

use jedo_contracts::config::CONTRACT_VERSION;
use jedo_contracts::{is_read_only, Invocation, WalletContract, WalletError};
use jedo_ledger::events::ChaincodeEvent;
use jedo_ledger::{ClientIdentity, Ledger, LedgerDb, X509Identity};

use cli::{CallArgs, Commands, EventsArgs, JedoNodeCli, RoleArgs};
use logging::LogFormat;

fn main() -> ExitCode {
    let cli = JedoNodeCli::parse();
    logging::init_logging(&cli.log_level, LogFormat::from_str_lossy(&cli.log_format));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: JedoNodeCli) -> Result<()> {
    let contract = WalletContract::new(cli.roles.to_config());

    let output = match cli.command {
        Commands::Version => {
            print_version();
            return Ok(());
        }
        Commands::Init => {
            std::fs::create_dir_all(&cli.data_dir).with_context(|| {
                format!("failed to create data directory: {}", cli.data_dir.display())
            })?;
            let ledger = open_ledger(&cli.data_dir)?;
            init_ledger(&ledger, &contract, &cli.roles)?
        }
        Commands::Invoke(call) => submit(&open_ledger(&cli.data_dir)?, &contract, &call)?,
        Commands::Query(call) => evaluate(&open_ledger(&cli.data_dir)?, &contract, &call)?,
        Commands::Events(args) => list_events(&open_ledger(&cli.data_dir)?, &args)?,
    };

    let rendered = serde_json::to_string_pretty(&output).context("failed to render result")?;
    println!("{rendered}");
    Ok(())
}

/// Opens the sled world state under `<data_dir>/db`.
fn open_ledger(data_dir: &Path) -> Result<Ledger<LedgerDb>> {
    let db_path = data_dir.join("db");
    let db = LedgerDb::open(&db_path)
        .with_context(|| format!("failed to open ledger at {}", db_path.display()))?;
    tracing::debug!(path = %db_path.display(), keys = db.key_count(), "ledger opened");
    Ok(Ledger::new(db))
}

/// Runs `InitLedger` as the root administrator.
fn init_ledger(ledger: &Ledger<LedgerDb>, contract: &WalletContract, roles: &RoleArgs) -> Result<Value> {
    let identity = X509Identity::from_common_name(&roles.root_admin_cn);
    call_and_commit(ledger, contract, &identity, "InitLedger", &[])
}

/// Submits `call` and reports the committed transaction.
fn submit(ledger: &Ledger<LedgerDb>, contract: &WalletContract, call: &CallArgs) -> Result<Value> {
    if is_read_only(&call.function) {
        tracing::warn!(function = %call.function, "read-only function submitted; `query` avoids a commit");
    }
    call_and_commit(ledger, contract, &call.identity(), &call.function, &call.args)
}

fn call_and_commit(
    ledger: &Ledger<LedgerDb>,
    contract: &WalletContract,
    identity: &dyn ClientIdentity,
    function: &str,
    args: &[String],
) -> Result<Value> {
    let committed = ledger
        .submit(function, |ctx| {
            contract.invoke(&Invocation::new(ctx, identity), function, args)
        })
        .with_context(|| format!("{function} was not committed"))?;
    ledger.state().flush().context("failed to flush ledger")?;

    let event = committed.event.as_ref().map(event_json).transpose()?;
    Ok(json!({
        "txId": committed.tx_id,
        "sequence": committed.sequence,
        "timestamp": committed.timestamp,
        "result": committed.value,
        "event": event,
    }))
}

/// Evaluates `call`; anything it writes is dropped.
fn evaluate(ledger: &Ledger<LedgerDb>, contract: &WalletContract, call: &CallArgs) -> Result<Value> {
    let identity = call.identity();
    let value = ledger
        .evaluate(&call.function, |ctx| {
            contract.invoke(&Invocation::new(ctx, &identity), &call.function, &call.args)
        })
        .with_context(|| format!("{} failed", call.function))?;
    Ok(value)
}

fn list_events(ledger: &Ledger<LedgerDb>, args: &EventsArgs) -> Result<Value> {
    let events = ledger
        .events(args.from, args.limit)
        .context("failed to read the event log")?;

    let mut out = Vec::with_capacity(events.len());
    for committed in &events {
        out.push(json!({
            "sequence": committed.sequence,
            "txId": committed.tx_id,
            "timestamp": committed.timestamp,
            "event": event_json(&committed.event)?,
        }));
    }
    Ok(Value::Array(out))
}

/// An event with its payload decoded, falling back to the raw bytes as
/// lossy UTF-8 when the payload is not JSON.
fn event_json(event: &ChaincodeEvent) -> Result<Value> {
    let payload = event
        .payload_json()
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&event.payload).into_owned()));
    Ok(json!({ "name": event.name, "payload": payload }))
}

/// Prints a failure the way clients expect it: `<Kind>: <message>` for
/// chaincode errors, the full context chain otherwise.
fn report(err: &anyhow::Error) {
    match err.downcast_ref::<WalletError>() {
        Some(wallet_err) => eprintln!("{}: {}", wallet_err.kind(), wallet_err),
        None => eprintln!("error: {err:#}"),
    }
}

/// Prints version information to stdout.
fn print_version() {
    println!("jedo-node {}", env!("CARGO_PKG_VERSION"));
    println!("contract  {}", CONTRACT_VERSION);
    println!("rustc     {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
