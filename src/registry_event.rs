use std::fmt;

/// Events emitted by a registry during operations.
///
/// These events are passed to the tracing callback set via `set_trace_callback`.
/// The `Clone` derive allows callbacks to store or forward events if needed.
///
/// # Examples
///
/// ```rust
/// use lazy_singleton_registry::RegistryEvent;
///
/// let event = RegistryEvent::Hit { key: "logger".to_string() };
/// assert_eq!(event.to_string(), "hit { key: logger }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// The instance was already published; no lock was taken.
    Hit {
        /// Display form of the key (type name or explicit name).
        key: String,
    },

    /// The instance was not yet published; the caller went for the construction lock.
    Miss { key: String },

    /// A factory ran and its result was published.
    Constructed { key: String },

    /// A factory ran and failed; nothing was published.
    Failed {
        key: String,
        /// Rendered factory error.
        reason: String,
    },

    /// A non-constructing lookup was performed.
    Get { key: String, found: bool },

    /// An initialization check was performed.
    Contains { key: String, found: bool },
}

impl RegistryEvent {
    pub fn key(&self) -> &str {
        match self {
            RegistryEvent::Hit { key }
            | RegistryEvent::Miss { key }
            | RegistryEvent::Constructed { key }
            | RegistryEvent::Failed { key, .. }
            | RegistryEvent::Get { key, .. }
            | RegistryEvent::Contains { key, .. } => key,
        }
    }
}

impl fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryEvent::Hit { key } => write!(f, "hit {{ key: {key} }}"),
            RegistryEvent::Miss { key } => write!(f, "miss {{ key: {key} }}"),
            RegistryEvent::Constructed { key } => write!(f, "constructed {{ key: {key} }}"),
            RegistryEvent::Failed { key, reason } => {
                write!(f, "failed {{ key: {key}, reason: {reason} }}")
            }
            RegistryEvent::Get { key, found } => {
                write!(f, "get {{ key: {key}, found: {found} }}")
            }
            RegistryEvent::Contains { key, found } => {
                write!(f, "contains {{ key: {key}, found: {found} }}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_event_display() {
        let event = RegistryEvent::Miss {
            key: "i32".to_string(),
        };
        assert_eq!(event.to_string(), "miss { key: i32 }");

        let event = RegistryEvent::Constructed {
            key: "logger".to_string(),
        };
        assert_eq!(event.to_string(), "constructed { key: logger }");

        let event = RegistryEvent::Failed {
            key: "db".to_string(),
            reason: "refused".to_string(),
        };
        assert_eq!(event.to_string(), "failed { key: db, reason: refused }");

        let event = RegistryEvent::Get {
            key: "String".to_string(),
            found: true,
        };
        assert_eq!(event.to_string(), "get { key: String, found: true }");

        let event = RegistryEvent::Contains {
            key: "u8".to_string(),
            found: false,
        };
        assert_eq!(event.to_string(), "contains { key: u8, found: false }");
    }

    #[test]
    fn test_registry_event_key() {
        let event = RegistryEvent::Failed {
            key: "db".to_string(),
            reason: "refused".to_string(),
        };
        assert_eq!(event.key(), "db");
    }

    #[test]
    fn test_registry_event_clone() {
        let event = RegistryEvent::Hit {
            key: "i32".to_string(),
        };
        assert_eq!(event.clone(), event);
    }
}
