//! Keys that registry entries are stored under.

use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;

/// Identity of a registry entry.
///
/// A key is either the identity of a Rust type or an explicit name. The two
/// kinds never compare equal, even when the type name and the explicit name
/// are the same text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RegistryKey {
    Type {
        id: TypeId,
        name: &'static str,
    },
    Named(Cow<'static, str>),
}

impl RegistryKey {
    /// Key for the type `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        RegistryKey::Type {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Key for an explicit name, e.g. `"logger"`.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        RegistryKey::Named(name.into())
    }

    pub fn is_type(&self) -> bool {
        matches!(self, RegistryKey::Type { .. })
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryKey::Type { name, .. } => f.write_str(name),
            RegistryKey::Named(name) => f.write_str(name),
        }
    }
}

impl From<&'static str> for RegistryKey {
    fn from(name: &'static str) -> Self {
        RegistryKey::named(name)
    }
}

impl From<String> for RegistryKey {
    fn from(name: String) -> Self {
        RegistryKey::named(name)
    }
}
