// Wallet chaincode benchmarks.
//
// Covers role resolution, a full Transfer invocation (resolve, read two
// wallets, stage four writes, commit) against the in-memory and the sled
// world state, and history scans of growing length.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_decimal::Decimal;

use jedo_contracts::{CertificateRoleResolver, IdentityConfig, Invocation, RoleResolver, WalletContract};
use jedo_ledger::{Ledger, LedgerDb, MemoryState, WorldState, X509Identity};

const GENS: &str = "worb.alps.ea.jedo.cc";
const HANS: &str = "hans.worb.alps.ea.jedo.cc";
const ANNA: &str = "anna.worb.alps.ea.jedo.cc";
const ADMIN: &str = "admin.alps.ea.jedo.cc";

/// Creates `W-hans` with a large balance and `W-anna` empty.
fn setup<S: WorldState>(ledger: &Ledger<S>, contract: &WalletContract) {
    let gens = X509Identity::from_common_name(GENS);
    for (wallet_id, owner, balance) in [("W-hans", HANS, 1_000_000_000i64), ("W-anna", ANNA, 0)] {
        ledger
            .submit("CreateWallet", |ctx| {
                contract.create_wallet(
                    &Invocation::new(ctx, &gens),
                    wallet_id,
                    owner,
                    Decimal::from(balance),
                    "",
                )
            })
            .unwrap();
    }
}

fn transfer_once<S: WorldState>(ledger: &Ledger<S>, contract: &WalletContract, hans: &X509Identity) {
    ledger
        .submit("Transfer", |ctx| {
            contract.transfer(
                &Invocation::new(ctx, hans),
                "W-hans",
                "W-anna",
                Decimal::new(1, 2),
                "bench",
            )
        })
        .unwrap();
}

fn bench_role_resolution(c: &mut Criterion) {
    let resolver = CertificateRoleResolver::new(IdentityConfig::default());
    let identity = X509Identity::from_common_name(HANS);

    c.bench_function("identity/resolve_human", |b| {
        b.iter(|| resolver.resolve(&identity).unwrap());
    });
}

fn bench_transfer_memory(c: &mut Criterion) {
    let ledger = Ledger::new(MemoryState::new());
    let contract = WalletContract::new(IdentityConfig::default());
    let hans = X509Identity::from_common_name(HANS);
    setup(&ledger, &contract);

    c.bench_function("transfer/memory", |b| {
        b.iter(|| transfer_once(&ledger, &contract, &hans));
    });
}

fn bench_transfer_sled(c: &mut Criterion) {
    let ledger = Ledger::new(LedgerDb::open_temporary().unwrap());
    let contract = WalletContract::new(IdentityConfig::default());
    let hans = X509Identity::from_common_name(HANS);
    setup(&ledger, &contract);

    c.bench_function("transfer/sled", |b| {
        b.iter(|| transfer_once(&ledger, &contract, &hans));
    });
}

fn bench_history_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("history/scan");
    let admin = X509Identity::from_common_name(ADMIN);

    for size in [10, 100, 1000] {
        let ledger = Ledger::new(MemoryState::new());
        let contract = WalletContract::new(IdentityConfig::default());
        let hans = X509Identity::from_common_name(HANS);
        setup(&ledger, &contract);
        for _ in 0..size {
            transfer_once(&ledger, &contract, &hans);
        }

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                ledger
                    .evaluate("GetWalletHistory", |ctx| {
                        contract.get_wallet_history(&Invocation::new(ctx, &admin), "W-anna", 0)
                    })
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_role_resolution,
    bench_transfer_memory,
    bench_transfer_sled,
    bench_history_scan,
);
criterion_main!(benches);
