use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown access level: {0:?} (expected read, write, read-write or none)")]
    UnknownAccessLevel(String),
}
