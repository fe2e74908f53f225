//! Colon-delimited store paths.
//!
//! A path such as `"address:city"` names a route from a store to a nested
//! value. Every segment is kept literally: empty segments produced by
//! leading, trailing or doubled separators are field names like any other
//! (they rarely match a real field).

use std::fmt;

/// Separator between path segments.
pub const SEPARATOR: char = ':';

/// A parsed path. Always holds at least one segment.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// Split `raw` on [`SEPARATOR`].
    ///
    /// ```
    /// use pathguard_types::Path;
    ///
    /// let path = Path::parse("address:city");
    /// assert_eq!(path.segments(), ["address", "city"]);
    /// assert_eq!(Path::parse("").segments(), [""]);
    /// ```
    pub fn parse(raw: &str) -> Self {
        Self {
            segments: raw.split(SEPARATOR).map(str::to_string).collect(),
        }
    }

    /// Build a path from already separated segments.
    ///
    /// Returns `None` when `segments` is empty.
    pub fn from_segments<I, S>(segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            None
        } else {
            Some(Self { segments })
        }
    }

    /// All segments, in traversal order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always `false`; a path holds at least one segment.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Rejoin a slice of segments with [`SEPARATOR`].
    pub fn join(segments: &[String]) -> String {
        let mut out = String::new();
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                out.push(SEPARATOR);
            }
            out.push_str(segment);
        }
        out
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Self::join(&self.segments))
    }
}

impl From<&str> for Path {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for Path {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<Path> for String {
    fn from(path: Path) -> Self {
        path.to_string()
    }
}
