//! Per-store field permissions.

use indexmap::IndexMap;
use pathguard_types::AccessLevel;

/// Maps top-level field names to access levels.
///
/// Fields without an explicit entry inherit the registry's default policy.
/// Lookups never fail: an absent entry is a meaningful state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PermissionRegistry {
    default_policy: AccessLevel,
    overrides: IndexMap<String, AccessLevel>,
}

impl PermissionRegistry {
    /// Create a registry with the given default policy and no overrides.
    pub fn new(default_policy: AccessLevel) -> Self {
        Self {
            default_policy,
            overrides: IndexMap::new(),
        }
    }

    /// Declare an explicit level for `field`, replacing any earlier one.
    ///
    /// Declarations happen while a store is being defined; the default
    /// policy for undeclared fields is unaffected.
    pub fn declare(&mut self, field: impl Into<String>, level: AccessLevel) {
        self.overrides.insert(field.into(), level);
    }

    /// Builder-style [`declare`](Self::declare).
    pub fn with(mut self, field: impl Into<String>, level: AccessLevel) -> Self {
        self.declare(field, level);
        self
    }

    /// The level applied to undeclared fields.
    pub fn default_policy(&self) -> AccessLevel {
        self.default_policy
    }

    /// The explicit level for `field`, if one was declared.
    pub fn explicit(&self, field: &str) -> Option<AccessLevel> {
        self.overrides.get(field).copied()
    }

    /// The resolved level for `field`: explicit override, else the default.
    pub fn level_of(&self, field: &str) -> AccessLevel {
        self.explicit(field).unwrap_or(self.default_policy)
    }

    pub fn allowed_to_read(&self, field: &str) -> bool {
        self.level_of(field).can_read()
    }

    pub fn allowed_to_write(&self, field: &str) -> bool {
        self.level_of(field).can_write()
    }

    /// Explicit overrides in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, AccessLevel)> {
        self.overrides.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of explicit overrides.
    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}
