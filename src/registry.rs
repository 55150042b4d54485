//! A thread-safe registry that constructs each keyed instance at most once.
//!
//! Every key owns a slot with its own construction lock, so first-time
//! construction of one key never blocks another. Once an instance is published,
//! lookups take only a shared read lock on the key directory and a lock-free
//! acquire load.
//!
//! # Examples
//!
//! ```
//! use lazy_singleton_registry::LazyRegistry;
//! use std::sync::Arc;
//!
//! let registry = LazyRegistry::new();
//!
//! let first: Arc<String> = registry.get_or_init("greeting", || "hello".to_string()).unwrap();
//! let second: Arc<String> = registry.get_or_init("greeting", || "ignored".to_string()).unwrap();
//!
//! assert!(Arc::ptr_eq(&first, &second));
//! assert_eq!(&*second, "hello");
//! ```

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, PoisonError, RwLock},
};

use tracing::{debug, trace, warn};

use crate::registry_slot::{Initialized, Instance, Slot, SlotError};
use crate::{BoxError, RegistryConfig, RegistryError, RegistryEvent, RegistryKey, Singleton};

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a reference to a `RegistryEvent` every time the registry is
/// interacted with. It must be thread-safe because registries are shared across threads.
pub type TraceCallback = dyn Fn(&RegistryEvent) + Send + Sync + 'static;

/// Registry of lazily constructed, shared instances.
///
/// Each [`RegistryKey`] maps to at most one instance for the registry's lifetime.
/// Instances are never replaced or removed once published.
pub struct LazyRegistry {
    config: RegistryConfig,
    slots: RwLock<HashMap<RegistryKey, Arc<Slot>>>,
    trace: Mutex<Option<Arc<TraceCallback>>>,
}

impl LazyRegistry {
    /// Create an empty registry with the default [`RegistryConfig`].
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with the given configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_singleton_registry::{FailurePolicy, LazyRegistry, RegistryConfig};
    ///
    /// let registry = LazyRegistry::with_config(
    ///     RegistryConfig::new().with_failure_policy(FailurePolicy::Poison),
    /// );
    /// assert_eq!(registry.config().failure_policy(), FailurePolicy::Poison);
    /// ```
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            slots: RwLock::new(HashMap::new()),
            trace: Mutex::new(None),
        }
    }

    /// The configuration this registry was created with.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Set a tracing callback for registry operations.
    ///
    /// The callback is cloned out of its lock before it runs, so it may call back
    /// into this registry.
    pub fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        let mut guard = self.trace.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(Arc::new(callback));
    }

    /// Clear the tracing callback. Published instances are not affected.
    pub fn clear_trace_callback(&self) {
        let mut guard = self.trace.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }

    /// Builds the event only when a callback is installed.
    fn emit_event(&self, event: impl FnOnce() -> RegistryEvent) {
        let callback = self
            .trace
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(callback) = callback {
            callback(&event());
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Registry
    // -------------------------------------------------------------------------------------------------

    /// Returns the instance for `key`, constructing it with `factory` on first access.
    ///
    /// Concurrent first-time callers for the same key run exactly one factory;
    /// the others block on the key's construction lock and then receive the
    /// instance it published. Once a key is initialized, later factories are
    /// never invoked.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Construction`] if this caller's factory failed. Under
    ///   [`FailurePolicy::Retry`](crate::FailurePolicy::Retry) the key stays
    ///   uninitialized and a later call may try again.
    /// - [`RegistryError::Poisoned`] if an earlier factory failed under
    ///   [`FailurePolicy::Poison`](crate::FailurePolicy::Poison).
    /// - [`RegistryError::TypeMismatch`] if the key holds another type.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_singleton_registry::{LazyRegistry, RegistryError};
    ///
    /// let registry = LazyRegistry::new();
    ///
    /// let failed = registry.get_instance("port", || "not a number".parse::<u16>());
    /// assert!(matches!(failed, Err(RegistryError::Construction { .. })));
    ///
    /// let port = registry.get_instance("port", || "8080".parse::<u16>()).unwrap();
    /// assert_eq!(*port, 8080);
    /// ```
    pub fn get_instance<T, E, F>(
        &self,
        key: impl Into<RegistryKey>,
        factory: F,
    ) -> Result<Arc<T>, RegistryError>
    where
        T: Send + Sync + 'static,
        E: Into<BoxError>,
        F: FnOnce() -> Result<T, E>,
    {
        let key = key.into();
        let instance = self.resolve(&key, || {
            factory()
                .map(|value| Arc::new(value) as Instance)
                .map_err(Into::into)
        })?;
        downcast(&key, instance)
    }

    /// Like [`get_instance`](Self::get_instance) for a factory that cannot fail.
    pub fn get_or_init<T, F>(
        &self,
        key: impl Into<RegistryKey>,
        factory: F,
    ) -> Result<Arc<T>, RegistryError>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        self.get_instance(key, || Ok::<T, std::convert::Infallible>(factory()))
    }

    /// Returns the instance of `T` keyed by its type, constructing it on first access.
    pub fn singleton<T, F>(&self, factory: F) -> Result<Arc<T>, RegistryError>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        self.get_or_init(RegistryKey::of::<T>(), factory)
    }

    /// Returns the instance of `T` keyed by its type, built with [`Singleton::create`].
    pub fn instance<T: Singleton>(&self) -> Result<Arc<T>, RegistryError> {
        self.get_instance(RegistryKey::of::<T>(), T::create)
    }

    /// Retrieve an already constructed instance without constructing one.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] if the key is not initialized
    /// - [`RegistryError::TypeMismatch`] if the key holds another type
    pub fn get<T: Send + Sync + 'static>(
        &self,
        key: impl Into<RegistryKey>,
    ) -> Result<Arc<T>, RegistryError> {
        let key = key.into();
        let published = self
            .existing_slot(&key)
            .and_then(|slot| slot.get().cloned());

        let result = match published {
            Some(instance) => downcast(&key, instance),
            None => Err(RegistryError::NotFound {
                key: key.to_string(),
            }),
        };

        self.emit_event(|| RegistryEvent::Get {
            key: key.to_string(),
            found: result.is_ok(),
        });

        result
    }

    /// Check whether the instance for `key` has been published.
    pub fn contains(&self, key: impl Into<RegistryKey>) -> bool {
        let key = key.into();
        let found = self
            .existing_slot(&key)
            .is_some_and(|slot| slot.get().is_some());

        self.emit_event(|| RegistryEvent::Contains {
            key: key.to_string(),
            found,
        });

        found
    }

    /// Number of factory invocations made for `key` so far.
    pub fn construction_attempts(&self, key: impl Into<RegistryKey>) -> usize {
        self.existing_slot(&key.into())
            .map_or(0, |slot| slot.attempts())
    }

    /// Keys whose instance has been published, in no particular order.
    pub fn keys(&self) -> Vec<RegistryKey> {
        self.read_slots()
            .iter()
            .filter(|(_, slot)| slot.get().is_some())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Number of published instances.
    pub fn len(&self) -> usize {
        self.read_slots()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    /// True when no instance has been published yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop directory entries for keys that were never published.
    ///
    /// A key whose factory failed under [`FailurePolicy::Retry`](crate::FailurePolicy::Retry)
    /// keeps its entry so [`construction_attempts`](Self::construction_attempts) can
    /// report it. Callers generating many such keys can reclaim them here. Entries
    /// that are published, poisoned, or currently held by another caller are kept,
    /// and their attempt counts restart from zero if the key is used again.
    ///
    /// Returns the number of entries removed.
    pub fn prune_unpublished(&self) -> usize {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        let before = slots.len();
        // The directory holds one reference; any other means a caller may be inside
        // `resolve` holding the slot's construction lock, so check that before locking it.
        slots.retain(|_, slot| {
            Arc::strong_count(slot) > 1 || slot.get().is_some() || slot.is_poisoned()
        });
        let removed = before - slots.len();
        if removed > 0 {
            debug!(registry = self.config.name(), removed, "pruned unpublished entries");
        }
        removed
    }

    /// Double-checked lookup shared by every constructing operation.
    ///
    /// The hit path clones the key's slot out of the directory under a shared
    /// read lock, then does a lock-free acquire load. It never touches a
    /// construction lock, so hits are not blocked by a factory running for
    /// any key. The directory write lock is taken only to insert a key seen for
    /// the first time, which briefly stalls lookups while one `HashMap` insert
    /// runs.
    fn resolve<F>(&self, key: &RegistryKey, factory: F) -> Result<Instance, RegistryError>
    where
        F: FnOnce() -> Result<Instance, BoxError>,
    {
        let registry = self.config.name();
        let slot = self.slot(key);

        if let Some(instance) = slot.get() {
            trace!(registry, key = %key, "singleton hit");
            self.emit_event(|| RegistryEvent::Hit {
                key: key.to_string(),
            });
            return Ok(Arc::clone(instance));
        }

        debug!(registry, key = %key, "singleton miss, taking construction lock");
        self.emit_event(|| RegistryEvent::Miss {
            key: key.to_string(),
        });

        match slot.initialize(self.config.failure_policy(), factory) {
            Ok(Initialized::Constructed(instance)) => {
                debug!(registry, key = %key, "singleton constructed");
                self.emit_event(|| RegistryEvent::Constructed {
                    key: key.to_string(),
                });
                Ok(instance)
            }
            Ok(Initialized::Raced(instance)) => {
                trace!(registry, key = %key, "singleton published by another thread");
                Ok(instance)
            }
            Err(SlotError::Factory(source)) => {
                warn!(registry, key = %key, error = %source, "singleton construction failed");
                self.emit_event(|| RegistryEvent::Failed {
                    key: key.to_string(),
                    reason: source.to_string(),
                });
                Err(RegistryError::Construction {
                    key: key.to_string(),
                    source,
                })
            }
            Err(SlotError::Poisoned(message)) => Err(RegistryError::Poisoned {
                key: key.to_string(),
                message,
            }),
        }
    }

    /// Returns the slot for `key`, creating an empty one on first access.
    fn slot(&self, key: &RegistryKey) -> Arc<Slot> {
        if let Some(slot) = self.existing_slot(key) {
            return slot;
        }

        // Inserting an empty slot is idempotent, so a poisoned directory is safe to reuse.
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(key.clone()).or_default())
    }

    fn existing_slot(&self, key: &RegistryKey) -> Option<Arc<Slot>> {
        self.read_slots().get(key).cloned()
    }

    fn read_slots(&self) -> std::sync::RwLockReadGuard<'_, HashMap<RegistryKey, Arc<Slot>>> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LazyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LazyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyRegistry")
            .field("config", &self.config)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

fn downcast<T: Send + Sync + 'static>(
    key: &RegistryKey,
    instance: Instance,
) -> Result<Arc<T>, RegistryError> {
    instance
        .downcast::<T>()
        .map_err(|_| RegistryError::TypeMismatch {
            key: key.to_string(),
            expected: std::any::type_name::<T>(),
        })
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
