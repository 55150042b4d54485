//! Lazy logger singleton example for lazy-singleton-registry.
//!
//! Demonstrates:
//! - 100 threads racing on first access to the same key
//! - The factory running exactly once
//! - Hit/miss diagnostics through `tracing` and the trace callback
//!
//! Run with: `RUST_LOG=lazy_singleton_registry=debug cargo run --example logger_singleton`

use lazy_singleton_registry::{define_registry, RegistryEvent};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use tracing_subscriber::EnvFilter;

define_registry!(app);

static LOGGERS_BUILT: AtomicUsize = AtomicUsize::new(0);

/// A logger that would normally own a file handle or a socket.
struct Logger {
    prefix: String,
}

impl Logger {
    fn log(&self, message: &str) {
        println!("{} {}", self.prefix, message);
    }
}

fn make_logger() -> Logger {
    let n = LOGGERS_BUILT.fetch_add(1, Ordering::SeqCst);
    Logger {
        prefix: format!("[logger #{n}]"),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== lazy-singleton-registry: Logger Singleton ===\n");

    let misses = Arc::new(AtomicUsize::new(0));
    let hits = Arc::new(AtomicUsize::new(0));
    {
        let (misses, hits) = (misses.clone(), hits.clone());
        app::set_trace_callback(move |event| match event {
            RegistryEvent::Miss { .. } => {
                misses.fetch_add(1, Ordering::Relaxed);
            }
            RegistryEvent::Hit { .. } => {
                hits.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        });
    }

    // -------------------------------------------------------------------------
    // 1. Race 100 threads on the first access
    // -------------------------------------------------------------------------
    println!("1. Spawning 100 threads that all ask for \"logger\"...");

    const THREADS: usize = 100;
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                app::get_or_init("logger", make_logger)
            })
        })
        .collect();

    let mut loggers = Vec::with_capacity(THREADS);
    for handle in handles {
        match handle.join() {
            Ok(Ok(logger)) => loggers.push(logger),
            Ok(Err(err)) => eprintln!("   lookup failed: {err}"),
            Err(_) => eprintln!("   worker thread panicked"),
        }
    }

    // -------------------------------------------------------------------------
    // 2. Verify the outcome
    // -------------------------------------------------------------------------
    let identical = loggers.iter().all(|l| Arc::ptr_eq(l, &loggers[0]));

    println!("\n2. Results:");
    println!("   Loggers built:           {}", LOGGERS_BUILT.load(Ordering::SeqCst));
    println!("   References returned:     {}", loggers.len());
    println!("   All references identical: {identical}");
    println!("   Fast-path hits:          {}", hits.load(Ordering::Relaxed));
    println!("   Misses (took the lock):  {}", misses.load(Ordering::Relaxed));

    if let Some(logger) = loggers.first() {
        logger.log("every thread logs through me");
    }

    app::clear_trace_callback();
    println!("\n=== Done ===");
}
