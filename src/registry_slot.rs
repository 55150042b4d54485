//! Per-key cell implementing double-checked construction.
//!
//! A slot publishes its instance through a `OnceLock`, whose `get` is a
//! lock-free acquire load and whose `set` is a release store. Construction is
//! serialized by a separate mutex that is held only for re-check, factory call
//! and publication.

use std::any::Any;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::{BoxError, FailurePolicy};

/// Type-erased shared instance.
pub(crate) type Instance = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Default)]
struct SlotState {
    attempts: usize,
    failure: Option<String>,
}

/// How a locked initialization attempt ended.
#[derive(Debug)]
pub(crate) enum Initialized {
    /// This caller ran the factory and published its result.
    Constructed(Instance),
    /// Another caller published while this one waited for the lock.
    Raced(Instance),
}

#[derive(Debug)]
pub(crate) enum SlotError {
    Factory(BoxError),
    Poisoned(String),
}

#[derive(Debug, Default)]
pub(crate) struct Slot {
    instance: OnceLock<Instance>,
    state: Mutex<SlotState>,
}

impl Slot {
    /// Fast path. Never blocks.
    pub(crate) fn get(&self) -> Option<&Instance> {
        self.instance.get()
    }

    /// Slow path: take the construction lock, re-check, then construct.
    ///
    /// A factory that panics unwinds through the held guard and poisons the
    /// mutex. Nothing was published at that point, so the poison is recovered
    /// and the next caller simply tries again.
    pub(crate) fn initialize<F>(
        &self,
        policy: FailurePolicy,
        factory: F,
    ) -> Result<Initialized, SlotError>
    where
        F: FnOnce() -> Result<Instance, BoxError>,
    {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(instance) = self.instance.get() {
            return Ok(Initialized::Raced(Arc::clone(instance)));
        }

        if let Some(message) = &state.failure {
            return Err(SlotError::Poisoned(message.clone()));
        }

        state.attempts += 1;

        match factory() {
            Ok(instance) => {
                // Cannot be occupied: every writer holds `state` and re-checked above.
                let _ = self.instance.set(Arc::clone(&instance));
                Ok(Initialized::Constructed(instance))
            }
            Err(source) => {
                if policy == FailurePolicy::Poison {
                    state.failure = Some(source.to_string());
                }
                Err(SlotError::Factory(source))
            }
        }
    }

    pub(crate) fn is_poisoned(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .failure
            .is_some()
    }

    pub(crate) fn attempts(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn boxed(value: i32) -> Result<Instance, BoxError> {
        Ok(Arc::new(value))
    }

    #[test]
    fn test_empty_slot_has_no_instance() {
        let slot = Slot::default();
        assert!(slot.get().is_none());
        assert_eq!(slot.attempts(), 0);
    }

    #[test]
    fn test_initialize_publishes() {
        let slot = Slot::default();
        let result = slot.initialize(FailurePolicy::Retry, || boxed(7)).unwrap();
        assert!(matches!(result, Initialized::Constructed(_)));

        let published = slot.get().unwrap();
        assert_eq!(published.downcast_ref::<i32>(), Some(&7));
        assert_eq!(slot.attempts(), 1);
    }

    #[test]
    fn test_second_initialize_sees_published_instance() {
        let slot = Slot::default();
        slot.initialize(FailurePolicy::Retry, || boxed(1)).unwrap();

        let result = slot
            .initialize(FailurePolicy::Retry, || panic!("factory must not run"))
            .unwrap();
        match result {
            Initialized::Raced(instance) => {
                assert_eq!(instance.downcast_ref::<i32>(), Some(&1))
            }
            Initialized::Constructed(_) => panic!("expected the published instance"),
        }
        assert_eq!(slot.attempts(), 1);
    }

    #[test]
    fn test_retry_policy_leaves_slot_empty() {
        let slot = Slot::default();
        let err = slot
            .initialize(FailurePolicy::Retry, || Err("boom".into()))
            .unwrap_err();
        assert!(matches!(err, SlotError::Factory(ref e) if e.to_string() == "boom"));
        assert!(slot.get().is_none());

        slot.initialize(FailurePolicy::Retry, || boxed(2)).unwrap();
        assert_eq!(slot.get().unwrap().downcast_ref::<i32>(), Some(&2));
        assert_eq!(slot.attempts(), 2);
    }

    #[test]
    fn test_poison_policy_remembers_failure() {
        let slot = Slot::default();
        let _ = slot.initialize(FailurePolicy::Poison, || Err("boom".into()));

        let err = slot
            .initialize(FailurePolicy::Poison, || boxed(3))
            .unwrap_err();
        assert!(matches!(err, SlotError::Poisoned(ref m) if m == "boom"));
        assert!(slot.get().is_none());
        assert!(slot.is_poisoned());
        assert_eq!(slot.attempts(), 1);
    }

    #[test]
    fn test_panicking_factory_does_not_wedge_slot() {
        let slot = Slot::default();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let _ = slot.initialize(FailurePolicy::Retry, || panic!("factory panicked"));
        }));
        assert!(outcome.is_err());
        assert!(slot.get().is_none());

        slot.initialize(FailurePolicy::Retry, || boxed(4)).unwrap();
        assert_eq!(slot.get().unwrap().downcast_ref::<i32>(), Some(&4));
        assert_eq!(slot.attempts(), 2);
    }
}
