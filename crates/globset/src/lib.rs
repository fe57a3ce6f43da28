/*!
The `globset` crate provides cross platform single glob and glob set
matching.

Glob set matching is the process of matching one or more glob patterns
against a single candidate path simultaneously, and returning all of the
globs that matched. This crate is used by `ignore` (file discovery) to
implement excludes and by `rampart-config` to validate `visibility` glob
lists, but it has no dependency on either.

# Example: one glob

```
use globset::Glob;

let glob = Glob::new("*.py")?.compile_matcher();
assert!(glob.is_match("foo.py"));
assert!(!glob.is_match("dir/foo.py"));
# Ok::<(), Box<dyn std::error::Error>>(())
```

# Example: a set of globs

```
use globset::GlobSetBuilder;
use globset::Glob;

let mut builder = GlobSetBuilder::new();
builder.add(Glob::new("*.pyc")?);
builder.add(Glob::new("**/__pycache__")?);
let set = builder.build()?;

assert!(set.is_match("foo.pyc"));
assert!(set.is_match("a/b/__pycache__"));
assert!(!set.is_match("foo.py"));
# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

#![deny(missing_docs)]

mod glob;
mod pathutil;

pub use crate::glob::{Error, Glob, GlobBuilder, GlobMatcher};
pub use crate::pathutil::normalize_to_forward_slash;

/// A set of compiled globs that can be matched against a single candidate
/// path in one pass.
#[derive(Clone, Debug, Default)]
pub struct GlobSet {
    globs: Vec<Glob>,
}

impl GlobSet {
    /// An empty glob set that matches nothing.
    pub fn empty() -> GlobSet {
        GlobSet { globs: Vec::new() }
    }

    /// Whether this set has no patterns.
    pub fn is_empty(&self) -> bool {
        self.globs.is_empty()
    }

    /// Test whether any glob in this set matches `path`.
    pub fn is_match<P: AsRef<str>>(&self, path: P) -> bool {
        let path = path.as_ref();
        self.globs.iter().any(|g| g.compile_matcher().is_match(path))
    }

    /// Return the indices (in insertion order) of every glob that matches
    /// `path`. Useful when a caller needs to report *which* exclude pattern
    /// was responsible.
    pub fn matches<P: AsRef<str>>(&self, path: P) -> Vec<usize> {
        let path = path.as_ref();
        self.globs
            .iter()
            .enumerate()
            .filter(|(_, g)| g.compile_matcher().is_match(path))
            .map(|(i, _)| i)
            .collect()
    }

    /// The globs backing this set, in insertion order.
    pub fn globs(&self) -> &[Glob] {
        &self.globs
    }
}

/// Incrementally builds a `GlobSet`.
#[derive(Clone, Debug, Default)]
pub struct GlobSetBuilder {
    globs: Vec<Glob>,
}

impl GlobSetBuilder {
    /// Create a new, empty builder.
    pub fn new() -> GlobSetBuilder {
        GlobSetBuilder { globs: Vec::new() }
    }

    /// Add a compiled glob to this set.
    pub fn add(&mut self, glob: Glob) -> &mut GlobSetBuilder {
        self.globs.push(glob);
        self
    }

    /// Finalize the set. Building never fails: compilation errors surface
    /// earlier, from `Glob::new`/`GlobBuilder::build`.
    pub fn build(&self) -> Result<GlobSet, Error> {
        Ok(GlobSet { globs: self.globs.clone() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_matches_nothing() {
        let set = GlobSet::empty();
        assert!(!set.is_match("anything"));
    }

    #[test]
    fn reports_matching_indices() {
        let mut b = GlobSetBuilder::new();
        b.add(Glob::new("*.pyc").unwrap());
        b.add(Glob::new("*.pyo").unwrap());
        let set = b.build().unwrap();
        assert_eq!(set.matches("a.pyc"), vec![0]);
        assert!(set.matches("a.rs").is_empty());
    }
}
