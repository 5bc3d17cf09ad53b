//! Benchmark suite for the purchase path
//!
//! Measures the in-process purchase saga and the store primitives it is built
//! on, using the divan benchmarking framework.
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//! ```

use rust_decimal::Decimal;
use rust_storefront::{
    AccountService, GoodInput, InventoryService, SalesCoordinator, Store, UserProfile,
};
use std::sync::Arc;
use std::time::Duration;

fn main() {
    divan::main();
}

fn profile(username: &str) -> UserProfile {
    UserProfile {
        fullname: "Bench User".to_string(),
        username: username.to_string(),
        password: "1234".to_string(),
        age: "30".to_string(),
        address: "Beirut".to_string(),
        gender: "female".to_string(),
        marital_status: "single".to_string(),
    }
}

fn good(name: &str, count: u32) -> GoodInput {
    GoodInput {
        name: name.to_string(),
        category: "food".to_string(),
        price: Decimal::new(15, 1),
        description: String::new(),
        count,
    }
}

/// A store with `buyers` funded users and one good with plenty of stock
fn seeded(buyers: usize) -> (AccountService, InventoryService, SalesCoordinator) {
    let store = Arc::new(Store::in_memory());
    let accounts = AccountService::new(Arc::clone(&store));
    let inventory = InventoryService::new(Arc::clone(&store));

    for i in 0..buyers {
        let username = format!("buyer{i}");
        accounts.register(profile(&username)).expect("register");
        accounts
            .credit(&username, Decimal::new(1_000_000, 0))
            .expect("credit");
    }
    inventory.add(good("kinder", u32::MAX)).expect("add good");

    let sales = SalesCoordinator::new(
        Arc::new(accounts.clone()),
        Arc::new(inventory.clone()),
        store,
        Duration::from_secs(5),
    );
    (accounts, inventory, sales)
}

/// Sequential purchases of one good by one buyer
#[divan::bench(args = [10, 100, 1000])]
fn purchase_sequential(bencher: divan::Bencher, purchases: usize) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("runtime");

    bencher
        .with_inputs(|| seeded(1))
        .bench_local_values(|(_, _, sales)| {
            runtime.block_on(async {
                for _ in 0..purchases {
                    sales
                        .purchase("buyer0", "kinder", 1)
                        .await
                        .expect("purchase");
                }
            })
        });
}

/// Concurrent purchases of the same good, serialized by the per-good lock
#[divan::bench(args = [4, 16])]
fn purchase_contended(bencher: divan::Bencher, buyers: usize) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_time()
        .build()
        .expect("runtime");

    bencher
        .with_inputs(|| seeded(buyers))
        .bench_local_values(|(_, _, sales)| {
            runtime.block_on(async {
                let tasks: Vec<_> = (0..buyers)
                    .map(|i| {
                        let sales = sales.clone();
                        tokio::spawn(async move {
                            for _ in 0..25 {
                                sales
                                    .purchase(&format!("buyer{i}"), "kinder", 1)
                                    .await
                                    .expect("purchase");
                            }
                        })
                    })
                    .collect();
                for task in futures::future::join_all(tasks).await {
                    task.expect("join");
                }
            })
        });
}

/// Debit and credit back on a single row
#[divan::bench]
fn debit_credit_round(bencher: divan::Bencher) {
    let (accounts, _, _) = seeded(1);
    let amount = Decimal::new(15, 1);

    bencher.bench_local(|| {
        accounts.debit("buyer0", amount).expect("debit");
        accounts.credit("buyer0", amount).expect("credit");
    });
}
