//! Capability contract for types that know how to build their own single instance.

use crate::BoxError;

/// A type that can construct its own process-wide instance.
///
/// Implementors are keyed by their type in a [`LazyRegistry`](crate::LazyRegistry)
/// and built through [`LazyRegistry::instance`](crate::LazyRegistry::instance).
///
/// # Examples
///
/// ```rust
/// use lazy_singleton_registry::{LazyRegistry, Singleton};
/// use std::convert::Infallible;
/// use std::sync::Arc;
///
/// struct Clock {
///     offset_ms: i64,
/// }
///
/// impl Singleton for Clock {
///     type Error = Infallible;
///
///     fn create() -> Result<Self, Self::Error> {
///         Ok(Clock { offset_ms: 0 })
///     }
/// }
///
/// let registry = LazyRegistry::new();
/// let a: Arc<Clock> = registry.instance().unwrap();
/// let b: Arc<Clock> = registry.instance().unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_eq!(a.offset_ms, 0);
/// ```
pub trait Singleton: Sized + Send + Sync + 'static {
    type Error: Into<BoxError>;

    fn create() -> Result<Self, Self::Error>;
}
