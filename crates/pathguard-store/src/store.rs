//! The [`Store`] handle and its definition-time builders.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use pathguard_types::{AccessLevel, Path};

use crate::error::StoreResult;
use crate::registry::PermissionRegistry;
use crate::value::{Fields, Value};
use crate::{read, write};

/// Default bound on consecutive descents through plain structures.
pub const DEFAULT_MAX_DEPTH: usize = 100;

pub(crate) struct StoreState {
    pub(crate) registry: PermissionRegistry,
    pub(crate) fields: Fields,
    pub(crate) max_depth: usize,
}

/// A node in the hierarchy owning a set of fields and a permission registry.
///
/// `Store` is a cheap, shared handle: clones refer to the same fields, so a
/// store embedded in another store (or returned by a deferred producer)
/// observes writes made through any handle. The handle is single-threaded.
///
/// A store that holds a handle to itself, directly or through a deferred
/// producer, forms a reference cycle and is never freed.
#[derive(Clone)]
pub struct Store {
    state: Rc<RefCell<StoreState>>,
}

impl Store {
    /// An empty read-write store.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start defining a store.
    pub fn builder() -> StoreBuilder {
        StoreBuilder::default()
    }

    /// Build a store from a static [`StoreDefinition`].
    pub fn define<D: StoreDefinition>() -> Self {
        let mut builder = Self::builder()
            .default_policy(D::DEFAULT_POLICY)
            .max_depth(D::MAX_DEPTH);
        for (field, level) in D::PERMISSIONS {
            builder = builder.permission(*field, *level);
        }
        for (name, value) in D::fields() {
            builder = builder.field(name, value);
        }
        builder.build()
    }

    pub(crate) fn state(&self) -> Ref<'_, StoreState> {
        self.state.borrow()
    }

    pub(crate) fn state_mut(&self) -> RefMut<'_, StoreState> {
        self.state.borrow_mut()
    }

    /// Whether the registry lets `field` be read.
    pub fn allowed_to_read(&self, field: &str) -> bool {
        self.state().registry.allowed_to_read(field)
    }

    /// Whether the registry lets `field` be written.
    pub fn allowed_to_write(&self, field: &str) -> bool {
        self.state().registry.allowed_to_write(field)
    }

    /// Resolved access level of `field`.
    pub fn level_of(&self, field: &str) -> AccessLevel {
        self.state().registry.level_of(field)
    }

    pub fn default_policy(&self) -> AccessLevel {
        self.state().registry.default_policy()
    }

    /// A copy of this store's registry.
    pub fn registry(&self) -> PermissionRegistry {
        self.state().registry.clone()
    }

    pub fn max_depth(&self) -> usize {
        self.state().max_depth
    }

    /// Read the value at `path`.
    ///
    /// The first segment is checked against this store's registry. Absent
    /// data yields [`Value::Missing`]; a deferred value at the end of the
    /// path is invoked and its result returned.
    ///
    /// ```
    /// use pathguard_store::{Store, Value};
    /// use pathguard_types::AccessLevel;
    ///
    /// let store = Store::builder()
    ///     .permission("secret", AccessLevel::None)
    ///     .field("name", "Ann")
    ///     .build();
    /// assert_eq!(store.read("name").unwrap(), Value::from("Ann"));
    /// assert!(store.read("secret").is_err());
    /// assert!(store.read("nickname").unwrap().is_missing());
    /// ```
    pub fn read(&self, path: &str) -> StoreResult<Value> {
        self.read_path(&Path::parse(path))
    }

    /// [`read`](Self::read) with a pre-parsed path.
    pub fn read_path(&self, path: &Path) -> StoreResult<Value> {
        read::read_segments(self, path.segments())
    }

    /// Write `value` at `path`, creating missing intermediate objects.
    ///
    /// Returns the written value.
    pub fn write(&self, path: &str, value: impl Into<Value>) -> StoreResult<Value> {
        self.write_path(&Path::parse(path), value)
    }

    /// [`write`](Self::write) with a pre-parsed path.
    pub fn write_path(&self, path: &Path, value: impl Into<Value>) -> StoreResult<Value> {
        write::write_segments(self, path.segments(), value.into())
    }

    /// Write each `(path, value)` pair in iteration order.
    ///
    /// Stops at the first failure; earlier writes are kept.
    pub fn write_entries<I, K, V>(&self, entries: I) -> StoreResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (path, value) in entries {
            self.write(path.as_ref(), value)?;
        }
        Ok(())
    }

    /// Shallow snapshot of every readable direct field.
    ///
    /// Values are returned as stored: deferred producers are not invoked and
    /// nested stores are returned as handles.
    pub fn entries(&self) -> Fields {
        let state = self.state();
        state
            .fields
            .iter()
            .filter(|(name, _)| state.registry.allowed_to_read(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Names of all direct fields, readable or not.
    pub fn field_names(&self) -> Vec<String> {
        self.state().fields.keys().cloned().collect()
    }

    /// Number of direct fields.
    pub fn len(&self) -> usize {
        self.state().fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().fields.is_empty()
    }

    /// Returns `true` if both handles refer to the same store.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Field values may point back at this store, so only names are shown.
        match self.state.try_borrow() {
            Ok(state) => f
                .debug_struct("Store")
                .field("default_policy", &state.registry.default_policy())
                .field("permissions", &state.registry)
                .field("fields", &state.fields.keys().collect::<Vec<_>>())
                .finish(),
            Err(_) => f.write_str("Store(<borrowed>)"),
        }
    }
}

/// Definition-time builder for [`Store`].
///
/// Permissions and initial field values are attached here, before any
/// read or write runs. Initial values bypass the registry.
#[derive(Debug)]
pub struct StoreBuilder {
    registry: PermissionRegistry,
    fields: Fields,
    max_depth: usize,
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self {
            registry: PermissionRegistry::default(),
            fields: Fields::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl StoreBuilder {
    /// Level applied to fields without an explicit permission.
    pub fn default_policy(mut self, level: AccessLevel) -> Self {
        let mut registry = PermissionRegistry::new(level);
        for (field, explicit) in self.registry.iter() {
            registry.declare(field, explicit);
        }
        self.registry = registry;
        self
    }

    /// Declare an explicit level for `field`.
    pub fn permission(mut self, field: impl Into<String>, level: AccessLevel) -> Self {
        self.registry.declare(field, level);
        self
    }

    /// Set an initial field value.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Bound on consecutive descents through plain structures.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn build(self) -> Store {
        Store {
            state: Rc::new(RefCell::new(StoreState {
                registry: self.registry,
                fields: self.fields,
                max_depth: self.max_depth,
            })),
        }
    }
}

/// Static permission table for a kind of store.
///
/// ```
/// use pathguard_store::{Store, StoreDefinition};
/// use pathguard_types::AccessLevel;
///
/// struct Account;
///
/// impl StoreDefinition for Account {
///     const PERMISSIONS: &'static [(&'static str, AccessLevel)] = &[
///         ("password", AccessLevel::Write),
///         ("id", AccessLevel::Read),
///     ];
/// }
///
/// let account = Store::define::<Account>();
/// assert!(!account.allowed_to_read("password"));
/// assert!(account.allowed_to_write("password"));
/// assert!(!account.allowed_to_write("id"));
/// ```
pub trait StoreDefinition {
    /// Level for fields missing from [`PERMISSIONS`](Self::PERMISSIONS).
    const DEFAULT_POLICY: AccessLevel = AccessLevel::ReadWrite;

    /// Explicit per-field levels.
    const PERMISSIONS: &'static [(&'static str, AccessLevel)] = &[];

    const MAX_DEPTH: usize = DEFAULT_MAX_DEPTH;

    /// Initial field values.
    fn fields() -> Vec<(String, Value)> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Profile;

    impl StoreDefinition for Profile {
        const DEFAULT_POLICY: AccessLevel = AccessLevel::Read;
        const PERMISSIONS: &'static [(&'static str, AccessLevel)] =
            &[("bio", AccessLevel::ReadWrite), ("token", AccessLevel::None)];
        const MAX_DEPTH: usize = 4;

        fn fields() -> Vec<(String, Value)> {
            vec![("bio".into(), "hello".into()), ("token".into(), "t0k".into())]
        }
    }

    #[test]
    fn define_applies_static_table() {
        let store = Store::define::<Profile>();
        assert_eq!(store.default_policy(), AccessLevel::Read);
        assert_eq!(store.max_depth(), 4);
        assert!(store.allowed_to_write("bio"));
        assert!(!store.allowed_to_write("other"));
        assert!(store.allowed_to_read("other"));
        assert!(!store.allowed_to_read("token"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn builder_default_policy_keeps_earlier_permissions() {
        let store = Store::builder()
            .permission("x", AccessLevel::None)
            .default_policy(AccessLevel::Read)
            .build();
        assert_eq!(store.level_of("x"), AccessLevel::None);
        assert_eq!(store.level_of("y"), AccessLevel::Read);
    }

    #[test]
    fn clones_share_fields() {
        let store = Store::new();
        let alias = store.clone();
        alias.write("k", 1i64).unwrap();
        assert_eq!(store.read("k").unwrap(), Value::from(1i64));
        assert!(store.ptr_eq(&alias));
        assert!(!store.ptr_eq(&Store::new()));
    }

    #[test]
    fn entries_filters_unreadable_fields() {
        let store = Store::builder()
            .permission("secret", AccessLevel::None)
            .permission("inbox", AccessLevel::Write)
            .field("name", "Ann")
            .field("secret", "s3cr3t")
            .field("inbox", Value::object())
            .field("role", "admin")
            .build();
        let entries = store.entries();
        let names: Vec<&str> = entries.keys().map(String::as_str).collect();
        assert_eq!(names, ["name", "role"]);
        for name in store.field_names() {
            assert_eq!(entries.contains_key(&name), store.allowed_to_read(&name));
        }
    }

    #[test]
    fn entries_returns_deferred_unevaluated() {
        let store = Store::builder()
            .field("compute", Value::deferred(|| Value::from(42i64)))
            .build();
        let entries = store.entries();
        assert!(entries["compute"].is_deferred());
        assert_eq!(store.read("compute").unwrap(), Value::from(42i64));
    }

    #[test]
    fn write_entries_stops_at_first_failure() {
        let store = Store::builder()
            .permission("locked", AccessLevel::Read)
            .build();
        let err = store
            .write_entries([("a", Value::from(1i64)), ("locked", 2i64.into()), ("c", 3i64.into())])
            .unwrap_err();
        assert!(err.is_permission_denied());
        assert_eq!(store.read("a").unwrap(), Value::from(1i64));
        assert!(store.read("c").unwrap().is_missing());
    }

    #[test]
    fn write_entries_accepts_json_maps() {
        let store = Store::new();
        let serde_json::Value::Object(map) = serde_json::json!({"a:b": 1, "c": "x"}) else {
            unreachable!()
        };
        store.write_entries(map).unwrap();
        assert_eq!(store.read("a:b").unwrap(), Value::from(1i64));
        assert_eq!(store.read("c").unwrap(), Value::from("x"));
    }

    #[test]
    fn debug_lists_field_names_only() {
        let store = Store::builder().field("self_ref", Value::Null).build();
        store.write("self_ref", store.clone()).unwrap();
        let rendered = format!("{store:?}");
        assert!(rendered.contains("self_ref"));
    }
}
