//! Namespaced resource identifiers (`minecraft:stone`).

use core::fmt;
use core::str::FromStr;

use crate::{WorldError, WorldResult};

/// Namespace used when an identifier is given without one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// A namespaced identifier such as `minecraft:chest`.
///
/// Stored in its canonical `namespace:path` form so that hashing and
/// comparison are plain string operations.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceLocation(String);

impl ResourceLocation {
    /// Parse an identifier, defaulting the namespace to `minecraft`.
    pub fn new(raw: &str) -> WorldResult<Self> {
        let (namespace, path) = raw.split_once(':').unwrap_or((DEFAULT_NAMESPACE, raw));

        if namespace.is_empty() || path.is_empty() || path.contains(':') {
            return Err(WorldError::InvalidResourceLocation(raw.to_string()));
        }

        Ok(Self(format!("{namespace}:{path}")))
    }

    /// Build a `minecraft:` identifier from a path known to be valid.
    #[must_use]
    pub fn minecraft(path: &str) -> Self {
        Self(format!("{DEFAULT_NAMESPACE}:{path}"))
    }

    /// The namespace part.
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.0.split_once(':').map_or(DEFAULT_NAMESPACE, |(ns, _)| ns)
    }

    /// The path part.
    #[must_use]
    pub fn path(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(_, path)| path)
    }

    /// The canonical `namespace:path` form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ResourceLocation {
    type Err = WorldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceLocation({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_namespace() {
        let id = ResourceLocation::new("stone").unwrap();
        assert_eq!(id.as_str(), "minecraft:stone");
        assert_eq!(id.namespace(), "minecraft");
        assert_eq!(id.path(), "stone");
        assert_eq!(id, ResourceLocation::minecraft("stone"));
    }

    #[test]
    fn test_explicit_namespace() {
        let id: ResourceLocation = "thaumcraft:crystal".parse().unwrap();
        assert_eq!(id.namespace(), "thaumcraft");
        assert_eq!(id.path(), "crystal");
        assert_eq!(id.to_string(), "thaumcraft:crystal");
    }

    #[test]
    fn test_invalid() {
        for raw in ["", ":", "minecraft:", ":stone", "a:b:c"] {
            assert!(
                ResourceLocation::new(raw).is_err(),
                "{raw:?} should be rejected"
            );
        }
    }
}
