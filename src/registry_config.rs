//! Registry configuration.

use std::borrow::Cow;

/// What a registry does with a key whose factory failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Leave the key uninitialized so the next caller runs a factory again.
    #[default]
    Retry,
    /// Remember the first failure; every later call for the key fails with
    /// `RegistryError::Poisoned` and no further factory is invoked.
    Poison,
}

/// Settings for a [`LazyRegistry`](crate::LazyRegistry).
///
/// ```rust
/// use lazy_singleton_registry::{FailurePolicy, LazyRegistry, RegistryConfig};
///
/// let registry = LazyRegistry::with_config(
///     RegistryConfig::default()
///         .with_name("services")
///         .with_failure_policy(FailurePolicy::Poison),
/// );
/// assert_eq!(registry.config().name(), "services");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    name: Cow<'static, str>,
    failure_policy: FailurePolicy,
}

impl RegistryConfig {
    pub const DEFAULT_NAME: &'static str = "default";

    pub const fn new() -> Self {
        Self {
            name: Cow::Borrowed(Self::DEFAULT_NAME),
            failure_policy: FailurePolicy::Retry,
        }
    }

    /// Name reported in log fields.
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new()
    }
}
