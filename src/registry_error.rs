use thiserror::Error;

/// Boxed error produced by a failing factory.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// The factory for `key` failed; nothing was published.
    #[error("Failed to construct instance for {key}: {source}")]
    Construction {
        key: String,
        #[source]
        source: BoxError,
    },

    /// An earlier construction for `key` failed and the registry keeps that failure.
    #[error("Registry entry {key} is poisoned: {message}")]
    Poisoned { key: String, message: String },

    #[error("Key not found in registry: {key}")]
    NotFound { key: String },

    #[error("Type mismatch in registry for {key}: expected {expected}")]
    TypeMismatch { key: String, expected: &'static str },
}

impl RegistryError {
    /// Returns the display form of the key the error refers to.
    pub fn key(&self) -> &str {
        match self {
            RegistryError::Construction { key, .. }
            | RegistryError::Poisoned { key, .. }
            | RegistryError::NotFound { key }
            | RegistryError::TypeMismatch { key, .. } => key,
        }
    }

    /// True when a later call for the same key may still succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RegistryError::Construction { .. } | RegistryError::NotFound { .. }
        )
    }
}
