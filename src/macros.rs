//! Macros for creating isolated, process-lifetime registries.

/// Creates an isolated singleton registry with a single macro invocation.
///
/// The macro generates a module containing:
/// - A `LazyLock<LazyRegistry>` static (hidden), named after the module
/// - `registry()`, returning the `&'static LazyRegistry`
/// - Free functions delegating to it
///
/// An optional second argument supplies the [`RegistryConfig`](crate::RegistryConfig).
///
/// # Examples
///
/// ```rust
/// use lazy_singleton_registry::define_registry;
/// use std::sync::Arc;
///
/// define_registry!(services);
///
/// let a: Arc<String> = services::get_or_init("dsn", || "postgres://localhost".to_string()).unwrap();
/// let b: Arc<String> = services::get("dsn").unwrap();
///
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_eq!(services::registry().config().name(), "services");
/// ```
///
/// # Multiple Registries
///
/// Each generated module is completely isolated:
///
/// ```rust
/// use lazy_singleton_registry::define_registry;
///
/// define_registry!(database);
/// define_registry!(
///     strict,
///     lazy_singleton_registry::RegistryConfig::new()
///         .with_failure_policy(lazy_singleton_registry::FailurePolicy::Poison)
/// );
///
/// database::singleton(|| 5432u16).unwrap();
///
/// assert!(database::contains(lazy_singleton_registry::RegistryKey::of::<u16>()));
/// assert!(!strict::contains(lazy_singleton_registry::RegistryKey::of::<u16>()));
/// ```
#[macro_export]
macro_rules! define_registry {
    ($(#[$meta:meta])* $name:ident) => {
        $crate::define_registry!(
            $(#[$meta])*
            $name,
            $crate::RegistryConfig::new().with_name(stringify!($name))
        );
    };

    ($(#[$meta:meta])* $name:ident, $config:expr) => {
        $(#[$meta])*
        pub mod $name {
            // Lets `$config` name items imported by the invoking module.
            #[allow(unused_imports)]
            use super::*;
            use std::sync::{Arc, LazyLock};

            static REGISTRY: LazyLock<$crate::LazyRegistry> =
                LazyLock::new(|| $crate::LazyRegistry::with_config($config));

            /// The registry backing this module. Lives for the whole process.
            pub fn registry() -> &'static $crate::LazyRegistry {
                &REGISTRY
            }

            /// Return the instance for `key`, constructing it with a fallible factory on first access.
            pub fn get_instance<T, E, F>(
                key: impl Into<$crate::RegistryKey>,
                factory: F,
            ) -> Result<Arc<T>, $crate::RegistryError>
            where
                T: Send + Sync + 'static,
                E: Into<$crate::BoxError>,
                F: FnOnce() -> Result<T, E>,
            {
                REGISTRY.get_instance(key, factory)
            }

            /// Return the instance for `key`, constructing it on first access.
            pub fn get_or_init<T, F>(
                key: impl Into<$crate::RegistryKey>,
                factory: F,
            ) -> Result<Arc<T>, $crate::RegistryError>
            where
                T: Send + Sync + 'static,
                F: FnOnce() -> T,
            {
                REGISTRY.get_or_init(key, factory)
            }

            /// Return the instance of `T` keyed by its type.
            pub fn singleton<T, F>(factory: F) -> Result<Arc<T>, $crate::RegistryError>
            where
                T: Send + Sync + 'static,
                F: FnOnce() -> T,
            {
                REGISTRY.singleton(factory)
            }

            /// Return the instance of a `Singleton` implementor.
            pub fn instance<T: $crate::Singleton>() -> Result<Arc<T>, $crate::RegistryError> {
                REGISTRY.instance()
            }

            /// Retrieve an already constructed instance.
            pub fn get<T: Send + Sync + 'static>(
                key: impl Into<$crate::RegistryKey>,
            ) -> Result<Arc<T>, $crate::RegistryError> {
                REGISTRY.get(key)
            }

            /// Check whether `key` has a published instance.
            pub fn contains(key: impl Into<$crate::RegistryKey>) -> bool {
                REGISTRY.contains(key)
            }

            /// Set a tracing callback for registry operations.
            pub fn set_trace_callback(
                callback: impl Fn(&$crate::RegistryEvent) + Send + Sync + 'static,
            ) {
                REGISTRY.set_trace_callback(callback)
            }

            /// Clear the tracing callback.
            pub fn clear_trace_callback() {
                REGISTRY.clear_trace_callback()
            }
        }
    };
}
