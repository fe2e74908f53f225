use std::fmt;

use pathguard_types::TypeError;

/// The kind of access that was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
        }
    }
}

/// Errors from store operations.
///
/// Missing data is never an error: reading an absent field yields
/// [`Value::Missing`](crate::Value::Missing).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The owning store's registry refused access to a field.
    #[error("permission denied: cannot {access} field '{field}'")]
    PermissionDenied { field: String, access: Access },

    /// Traversal through plain structures went deeper than the store allows.
    #[error("depth limit of {limit} exceeded")]
    DepthLimitExceeded { limit: usize },

    /// A deferred producer in the middle of a path did not yield a store.
    #[error("deferred value at '{segment}' did not produce a store")]
    DeferredNotStore { segment: String },

    /// A write tried to descend into, or set a field on, a primitive value.
    #[error("value at '{segment}' is not a container")]
    NotAContainer { segment: String },

    /// An array was addressed with a segment that is not an index.
    #[error("invalid array index: '{segment}'")]
    InvalidIndex { segment: String },

    /// A document handed to the store has the wrong shape.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// Store configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error while loading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Foundation type error.
    #[error(transparent)]
    Type(#[from] TypeError),
}

impl StoreError {
    /// Create a permission error for `field`.
    pub fn denied(field: impl Into<String>, access: Access) -> Self {
        Self::PermissionDenied {
            field: field.into(),
            access,
        }
    }

    /// Returns `true` for [`PermissionDenied`](Self::PermissionDenied).
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
