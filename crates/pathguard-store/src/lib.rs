//! Permission-guarded, path-addressable nested data store.
//!
//! A [`Store`] holds named fields whose values may be primitives, plain
//! nested structures, other stores, or deferred producers. Every store has a
//! [`PermissionRegistry`] mapping its own top-level fields to an
//! [`AccessLevel`](pathguard_types::AccessLevel); fields without an entry
//! inherit the store's default policy.
//!
//! Nested data is addressed with colon-delimited paths:
//!
//! ```rust
//! use pathguard_store::{Store, Value};
//! use pathguard_types::AccessLevel;
//!
//! let store = Store::builder()
//!     .permission("secret", AccessLevel::None)
//!     .field("name", "Ann")
//!     .build();
//!
//! store.write("address:city", "Paris").unwrap();
//! assert_eq!(store.read("address:city").unwrap(), Value::from("Paris"));
//! assert!(store.read("secret").unwrap_err().is_permission_denied());
//! ```
//!
//! # Enforcement Rules
//!
//! 1. A read checks the first segment against the registry of the store it
//!    enters; plain structures below that field are not checked again.
//! 2. A write checks the terminal segment against the registry of the store
//!    that owns it, however deep inside plain structures it sits.
//! 3. Reaching a nested store (directly or through a deferred producer)
//!    hands the remaining segments to that store's registry.
//! 4. Descent through plain structures is bounded by the store's
//!    `max_depth`; crossing into a nested store starts a fresh count. The
//!    number of crossings in one call is bounded by the `max_depth` of the
//!    store the call started on, so cycles through stores terminate.
//! 5. Missing data is a value ([`Value::Missing`]), never an error.

pub mod config;
pub mod error;
mod read;
pub mod registry;
pub mod store;
mod traversal;
pub mod value;
mod write;

// Re-export primary types at crate root for ergonomic imports.
pub use config::StoreConfig;
pub use error::{Access, StoreError, StoreResult};
pub use registry::PermissionRegistry;
pub use store::{Store, StoreBuilder, StoreDefinition, DEFAULT_MAX_DEPTH};
pub use value::{Deferred, Fields, Value};
