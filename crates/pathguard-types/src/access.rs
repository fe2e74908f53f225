use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Access level attached to a store field.
///
/// A field's access level decides whether the path engine lets a caller
/// read it, write it, both, or neither. Fields without an explicit level
/// inherit the store's default policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessLevel {
    /// Reads allowed, writes denied.
    #[serde(alias = "r")]
    Read,
    /// Writes allowed, reads denied.
    #[serde(alias = "w")]
    Write,
    /// Reads and writes allowed.
    #[default]
    #[serde(alias = "rw", alias = "readwrite")]
    ReadWrite,
    /// Every access denied.
    None,
}

impl AccessLevel {
    /// All access levels, in declaration order.
    pub const ALL: [AccessLevel; 4] = [
        AccessLevel::Read,
        AccessLevel::Write,
        AccessLevel::ReadWrite,
        AccessLevel::None,
    ];

    /// Returns `true` for [`Read`](Self::Read) and [`ReadWrite`](Self::ReadWrite).
    pub const fn can_read(self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }

    /// Returns `true` for [`Write`](Self::Write) and [`ReadWrite`](Self::ReadWrite).
    pub const fn can_write(self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }

    /// Canonical lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::ReadWrite => "read-write",
            Self::None => "none",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" | "r" => Ok(Self::Read),
            "write" | "w" => Ok(Self::Write),
            "read-write" | "readwrite" | "rw" => Ok(Self::ReadWrite),
            "none" => Ok(Self::None),
            _ => Err(TypeError::UnknownAccessLevel(s.to_string())),
        }
    }
}
