//! # Lazy Singleton Registry
//!
//! A thread-safe registry that constructs each keyed instance at most once, on first
//! access, and hands out the same `Arc` for the rest of the registry's lifetime.
//!
//! Construction uses double-checked locking per key: an acquire-load fast path,
//! then a per-key construction lock, a re-check, the factory call and a release
//! publication. Concurrent first-time callers run exactly one factory.
//!
//! ## Quick Start
//!
//! ```rust
//! use lazy_singleton_registry::global;
//! use std::sync::Arc;
//!
//! struct Logger {
//!     prefix: String,
//! }
//!
//! let logger: Arc<Logger> = global::get_or_init("logger", || Logger {
//!     prefix: "[app]".to_string(),
//! })
//! .unwrap();
//!
//! let again: Arc<Logger> = global::get("logger").unwrap();
//! assert!(Arc::ptr_eq(&logger, &again));
//! assert_eq!(again.prefix, "[app]");
//! ```
//!
//! ## Features
//!
//! - **Exactly-once construction**: concurrent first callers share one factory run
//! - **Retry on failure**: a failed factory leaves the key uninitialized (configurable)
//! - **Type or name keys**: [`RegistryKey::of`] and [`RegistryKey::named`]
//! - **Isolated registries**: [`define_registry!`] generates independent static registries
//! - **Tracing support**: `tracing` logs plus an optional [`RegistryEvent`] callback
//!
//! ## Main Types
//!
//! - [`LazyRegistry`] - the registry itself
//! - [`Singleton`] - trait for types that construct their own instance
//! - [`RegistryConfig`] / [`FailurePolicy`] - registry settings
//! - [`RegistryError`] - everything a lookup can fail with

#[macro_use]
mod macros;
mod registry;
mod registry_config;
mod registry_error;
mod registry_event;
mod registry_key;
mod registry_slot;
mod singleton;

pub use registry::{LazyRegistry, TraceCallback};
pub use registry_config::{FailurePolicy, RegistryConfig};
pub use registry_error::{BoxError, RegistryError};
pub use registry_event::RegistryEvent;
pub use registry_key::RegistryKey;
pub use singleton::Singleton;

define_registry!(
    /// The crate-wide default registry, named `"global"`.
    global
);
