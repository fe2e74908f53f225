//! Foundation types for PathGuard.
//!
//! This crate provides the small vocabulary shared by every other PathGuard
//! crate: the access levels attached to store fields and the colon-delimited
//! paths used to address nested data.
//!
//! # Key Types
//!
//! - [`AccessLevel`] — Per-field permission (`read`, `write`, `read-write`, `none`)
//! - [`Path`] — A parsed `"a:b:c"` path split into its segments
//! - [`TypeError`] — Parse failures for the types above

pub mod access;
pub mod error;
pub mod path;

pub use access::AccessLevel;
pub use error::TypeError;
pub use path::{Path, SEPARATOR};
