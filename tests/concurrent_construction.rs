//! Integration tests for concurrent first access.
//!
//! These tests race many threads against keys that have not been constructed yet
//! and check that every key's factory runs exactly once.

use lazy_singleton_registry::{LazyRegistry, RegistryKey};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Barrier};
use std::thread;
use std::time::Duration;

#[derive(Debug)]
struct Logger {
    id: usize,
}

#[test]
fn test_hundred_threads_share_one_logger() {
    const THREADS: usize = 100;

    let registry = Arc::new(LazyRegistry::new());
    let constructed = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = registry.clone();
            let constructed = constructed.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                registry
                    .get_or_init("logger", || {
                        let id = constructed.fetch_add(1, Ordering::SeqCst);
                        // Widen the race window.
                        thread::sleep(Duration::from_millis(10));
                        Logger { id }
                    })
                    .unwrap()
            })
        })
        .collect();

    let loggers: Vec<Arc<Logger>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(constructed.load(Ordering::SeqCst), 1);
    assert_eq!(loggers.len(), THREADS);
    assert!(loggers.iter().all(|l| Arc::ptr_eq(l, &loggers[0])));
    assert_eq!(loggers[0].id, 0);
    assert_eq!(registry.construction_attempts("logger"), 1);
}

#[test]
fn test_many_keys_each_constructed_once() {
    const THREADS: usize = 32;
    const KEYS: usize = 8;

    let registry = LazyRegistry::new();
    let per_key: Vec<AtomicUsize> = (0..KEYS).map(|_| AtomicUsize::new(0)).collect();
    let barrier = Barrier::new(THREADS);

    thread::scope(|s| {
        for t in 0..THREADS {
            let (registry, per_key, barrier) = (&registry, &per_key, &barrier);
            s.spawn(move || {
                barrier.wait();
                for round in 0..KEYS {
                    let k = (t + round) % KEYS;
                    let value: Arc<usize> = registry
                        .get_or_init(format!("key-{k}"), || {
                            per_key[k].fetch_add(1, Ordering::SeqCst);
                            k
                        })
                        .unwrap();
                    assert_eq!(*value, k);
                }
            });
        }
    });

    for (k, count) in per_key.iter().enumerate() {
        assert_eq!(count.load(Ordering::SeqCst), 1, "key-{k} constructed more than once");
    }
    assert_eq!(registry.len(), KEYS);
}

#[test]
fn test_construction_of_one_key_does_not_block_another() {
    let registry = Arc::new(LazyRegistry::new());
    let (ready_tx, ready_rx) = mpsc::channel::<()>();
    let (entered_tx, entered_rx) = mpsc::channel::<()>();

    // "slow" holds its construction lock until "fast" has been built elsewhere.
    let slow = {
        let registry = registry.clone();
        thread::spawn(move || {
            registry.get_instance("slow", move || {
                entered_tx.send(()).unwrap();
                ready_rx
                    .recv_timeout(Duration::from_secs(5))
                    .map(|_| "slow".to_string())
                    .map_err(|_| "fast key was blocked behind slow key")
            })
        })
    };

    entered_rx.recv().unwrap();
    let fast: Arc<String> = registry.get_or_init("fast", || "fast".to_string()).unwrap();
    ready_tx.send(()).unwrap();

    let slow = slow.join().unwrap().unwrap();
    assert_eq!(&*fast, "fast");
    assert_eq!(&*slow, "slow");
}

#[test]
fn test_hits_proceed_while_another_key_is_constructing() {
    let registry = Arc::new(LazyRegistry::new());
    let hot: Arc<u32> = registry.get_or_init("hot", || 1).unwrap();

    let (release_tx, release_rx) = mpsc::channel::<()>();
    let (entered_tx, entered_rx) = mpsc::channel::<()>();

    let cold = {
        let registry = registry.clone();
        thread::spawn(move || {
            registry.get_instance("cold", move || {
                entered_tx.send(()).unwrap();
                release_rx
                    .recv_timeout(Duration::from_secs(5))
                    .map(|_| 2u32)
                    .map_err(|_| "cold factory was never released")
            })
        })
    };

    // "cold" now holds its construction lock; hits on "hot" must not wait for it.
    entered_rx.recv().unwrap();
    for _ in 0..1000 {
        let seen: Arc<u32> = registry.get_or_init("hot", || 99).unwrap();
        assert!(Arc::ptr_eq(&seen, &hot));
    }
    assert!(!registry.contains("cold"));
    release_tx.send(()).unwrap();

    assert_eq!(*cold.join().unwrap().unwrap(), 2);
    assert_eq!(registry.construction_attempts("hot"), 1);
}

#[test]
fn test_readers_after_publication_see_same_instance() {
    let registry = LazyRegistry::new();
    let built: Arc<Vec<u32>> = registry.singleton(|| (0..1000).collect()).unwrap();

    thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..1000 {
                    let seen: Arc<Vec<u32>> = registry.get(RegistryKey::of::<Vec<u32>>()).unwrap();
                    assert!(Arc::ptr_eq(&seen, &built));
                    assert_eq!(seen.len(), 1000);
                }
            });
        }
    });
}
