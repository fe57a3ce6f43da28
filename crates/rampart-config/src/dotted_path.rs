use std::fmt;

use serde::{Deserialize, Serialize};

/// The sentinel path naming the catch-all module for code that sits inside a
/// source root but under no declared module (`<root>`).
pub const ROOT_SENTINEL: &str = "<root>";

/// An ordered sequence of identifier segments separated by `.`.
///
/// Equality and hashing are segment-wise, not string-wise, so that a
/// `DottedPath` built by splitting on `.` compares equal to one built
/// incrementally by pushing segments. Every `Import`, `ModuleConfig::path`,
/// and resolver lookup in this crate family is expressed in terms of this
/// type.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct DottedPath {
    segments: Vec<String>,
}

impl DottedPath {
    /// The empty path (zero segments). Used to represent the implicit root
    /// of a source tree before any segment has been consumed.
    pub fn empty() -> DottedPath {
        DottedPath { segments: Vec::new() }
    }

    /// Parse a dotted string into its segments. An empty string yields the
    /// empty path, not a path with one empty segment.
    pub fn parse(s: &str) -> DottedPath {
        if s.is_empty() {
            return DottedPath::empty();
        }
        DottedPath { segments: s.split('.').map(str::to_string).collect() }
    }

    /// Build a path directly from segments.
    pub fn from_segments<I, S>(segments: I) -> DottedPath
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DottedPath { segments: segments.into_iter().map(Into::into).collect() }
    }

    /// The segments making up this path.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether this is the empty path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether `self` is a strict prefix of `other` ("X is an
    /// ancestor of Y iff X's segments are a strict prefix of Y's").
    pub fn is_ancestor_of(&self, other: &DottedPath) -> bool {
        self.len() < other.len() && self.segments == other.segments[..self.len()]
    }

    /// Whether `self` equals `other` or is an ancestor of it.
    pub fn is_ancestor_of_or_eq(&self, other: &DottedPath) -> bool {
        self == other || self.is_ancestor_of(other)
    }

    /// The path with its final segment removed, or `None` for the empty
    /// path. Used to resolve relative imports (rule 3).
    pub fn parent(&self) -> Option<DottedPath> {
        if self.segments.is_empty() {
            return None;
        }
        Some(DottedPath { segments: self.segments[..self.segments.len() - 1].to_vec() })
    }

    /// Append one segment, returning the extended path.
    pub fn join(&self, segment: &str) -> DottedPath {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        DottedPath { segments }
    }

    /// Append another path's segments wholesale.
    pub fn extend(&self, other: &DottedPath) -> DottedPath {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        DottedPath { segments }
    }

    /// The leaf (final) segment, or `None` for the empty path. For
    /// `a.b.c` this is `c` -- the symbol name in a from-import.
    pub fn leaf(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The first segment, or `None` for the empty path. This is the
    /// top-level package name used by the external-package index.
    pub fn root_segment(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// Whether this path is the `<root>` sentinel.
    pub fn is_root_sentinel(&self) -> bool {
        self.segments.len() == 1 && self.segments[0] == ROOT_SENTINEL
    }

    /// The `<root>` sentinel path.
    pub fn root_sentinel() -> DottedPath {
        DottedPath { segments: vec![ROOT_SENTINEL.to_string()] }
    }
}

impl fmt::Display for DottedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl From<&str> for DottedPath {
    fn from(s: &str) -> DottedPath {
        DottedPath::parse(s)
    }
}

impl From<String> for DottedPath {
    fn from(s: String) -> DottedPath {
        DottedPath::parse(&s)
    }
}

impl From<DottedPath> for String {
    fn from(p: DottedPath) -> String {
        p.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ancestor_is_strict_prefix() {
        let a = DottedPath::parse("a.b");
        let b = DottedPath::parse("a.b.c");
        assert!(a.is_ancestor_of(&b));
        assert!(!b.is_ancestor_of(&a));
        assert!(!a.is_ancestor_of(&a));
    }

    #[test]
    fn parent_of_empty_is_none() {
        assert!(DottedPath::empty().parent().is_none());
    }

    #[test]
    fn parent_strips_last_segment() {
        let p = DottedPath::parse("a.b.c");
        assert_eq!(p.parent().unwrap(), DottedPath::parse("a.b"));
    }

    #[test]
    fn display_roundtrips_through_parse() {
        let p = DottedPath::parse("a.b.c");
        assert_eq!(p.to_string(), "a.b.c");
    }

    #[test]
    fn root_sentinel_is_recognized() {
        assert!(DottedPath::parse("<root>").is_root_sentinel());
        assert!(!DottedPath::parse("root").is_root_sentinel());
    }
}
