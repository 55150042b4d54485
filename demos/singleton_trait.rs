//! `Singleton` trait example for lazy-singleton-registry.
//!
//! Demonstrates:
//! - Types declaring their own constructor via `Singleton`
//! - A failing constructor leaving the entry free for a retry
//! - The `Poison` failure policy keeping the first failure
//!
//! Run with: `cargo run --example singleton_trait`

use lazy_singleton_registry::{
    global, FailurePolicy, LazyRegistry, RegistryConfig, RegistryError, Singleton,
};
use std::sync::atomic::{AtomicBool, Ordering};

static DATABASE_ONLINE: AtomicBool = AtomicBool::new(false);

#[derive(Debug)]
struct Database {
    url: &'static str,
}

#[derive(Debug, thiserror::Error)]
#[error("database at {0} is not reachable")]
struct Unreachable(&'static str);

impl Singleton for Database {
    type Error = Unreachable;

    fn create() -> Result<Self, Self::Error> {
        let url = "postgres://localhost/app";
        if DATABASE_ONLINE.load(Ordering::SeqCst) {
            Ok(Database { url })
        } else {
            Err(Unreachable(url))
        }
    }
}

fn main() {
    tracing_subscriber::fmt().init();

    println!("=== lazy-singleton-registry: Singleton Trait ===\n");

    // -------------------------------------------------------------------------
    // 1. Retry policy (default): a failure leaves the entry uninitialized
    // -------------------------------------------------------------------------
    println!("1. Asking for the database while it is offline...");
    match global::instance::<Database>() {
        Ok(db) => println!("   unexpected: connected to {}", db.url),
        Err(err) => println!("   failed as expected: {err}"),
    }

    // -------------------------------------------------------------------------
    // 2. Retry policy: the next caller constructs again
    // -------------------------------------------------------------------------
    DATABASE_ONLINE.store(true, Ordering::SeqCst);

    println!("\n2. Asking again once it is online...");
    match global::instance::<Database>() {
        Ok(db) => println!("   connected to {}", db.url),
        Err(err) => println!("   still failing: {err}"),
    }

    // -------------------------------------------------------------------------
    // 3. Poison policy: the first failure is recorded
    // -------------------------------------------------------------------------
    DATABASE_ONLINE.store(false, Ordering::SeqCst);

    let strict = LazyRegistry::with_config(
        RegistryConfig::new()
            .with_name("strict")
            .with_failure_policy(FailurePolicy::Poison),
    );

    println!("\n3. Strict registry, database offline...");
    if let Err(err) = strict.instance::<Database>() {
        println!("   {err}");
    }

    // -------------------------------------------------------------------------
    // 4. Poison policy: the first failure sticks
    // -------------------------------------------------------------------------
    DATABASE_ONLINE.store(true, Ordering::SeqCst);

    println!("\n4. Strict registry, database back online...");
    match strict.instance::<Database>() {
        Err(err @ RegistryError::Poisoned { .. }) => println!("   still refused: {err}"),
        Err(err) => println!("   other error: {err}"),
        Ok(db) => println!("   unexpected: connected to {}", db.url),
    }

    println!("\n=== Done ===");
}
