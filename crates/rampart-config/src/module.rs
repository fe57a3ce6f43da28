use serde::{Deserialize, Serialize};

use crate::dotted_path::DottedPath;

/// One entry of a `depends_on` / `cannot_depend_on` list: a module path,
/// optionally flagged deprecated (`ModuleConfig.depends_on`).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencyEdge {
    /// `"other.module"` shorthand -- never deprecated.
    Bare(DottedPath),
    /// `{ path = "other.module", deprecated = true }` table form.
    Table {
        /// The depended-on module's path.
        path: DottedPath,
        /// Whether this edge is deprecated: still allowed,
        /// but reported as a warning rather than passing silently.
        #[serde(default)]
        deprecated: bool,
    },
}

impl DependencyEdge {
    /// The target module path, regardless of which form was used.
    pub fn path(&self) -> &DottedPath {
        match self {
            DependencyEdge::Bare(p) => p,
            DependencyEdge::Table { path, .. } => path,
        }
    }

    /// Whether this edge is marked deprecated.
    pub fn is_deprecated(&self) -> bool {
        match self {
            DependencyEdge::Bare(_) => false,
            DependencyEdge::Table { deprecated, .. } => *deprecated,
        }
    }
}

/// An entry of `depends_on_external` / `cannot_depend_on_external`: the name
/// of a third-party package as it appears in the dependency manifest.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ExternalDependencyEdge {
    /// The package name.
    pub name: String,
}

/// One declared module (`ModuleConfig`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Dotted path identifying this module. The sentinel `<root>` denotes
    /// the catch-all module for code outside every declared module.
    pub path: DottedPath,

    /// Modules this module may import from. `None` means "unchecked --
    /// allow anything"; an empty list means "allow nothing".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<Vec<DependencyEdge>>,

    /// Blacklist evaluated after `depends_on`; always wins over it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cannot_depend_on: Option<Vec<DottedPath>>,

    /// External packages this module may use. `None` means the project-wide
    /// `external.exclude` allowlist governs instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on_external: Option<Vec<ExternalDependencyEdge>>,

    /// External packages this module may never use, regardless of
    /// `depends_on_external`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cannot_depend_on_external: Option<Vec<ExternalDependencyEdge>>,

    /// Dotted-path glob patterns naming modules permitted to import this
    /// one. Absent means everyone may.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Vec<String>>,

    /// Optional tag referencing the project's `layers` ordering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,

    /// If true, cross-module imports into this module must reference a
    /// symbol exposed by an interface naming this module in `from_modules`.
    #[serde(default)]
    pub strict: bool,

    /// If true, every module may import from this one without declaring the
    /// dependency (.a, the utility bypass).
    #[serde(default)]
    pub utility: bool,

    /// If true, this module is excluded from all checks (its own imports
    /// are still resolved, so other modules can still be checked against
    /// it as a target).
    #[serde(default)]
    pub unchecked: bool,
}

impl ModuleConfig {
    /// A bare module declaration with no rules attached, as produced by
    /// `sync` for a module discovered on disk but not yet configured.
    pub fn new(path: DottedPath) -> ModuleConfig {
        ModuleConfig {
            path,
            depends_on: None,
            cannot_depend_on: None,
            depends_on_external: None,
            cannot_depend_on_external: None,
            visibility: None,
            layer: None,
            strict: false,
            utility: false,
            unchecked: false,
        }
    }

    /// Whether `path` is declared as a (non-deprecated) dependency.
    pub fn depends_on_path(&self, path: &DottedPath) -> bool {
        self.depends_on
            .as_ref()
            .is_some_and(|deps| deps.iter().any(|d| d.path() == path))
    }

    /// The declared edge for `path`, if any, regardless of deprecation.
    pub fn dependency_edge(&self, path: &DottedPath) -> Option<&DependencyEdge> {
        self.depends_on.as_ref().and_then(|deps| deps.iter().find(|d| d.path() == path))
    }

    /// Whether `path` appears in the `cannot_depend_on` blacklist.
    pub fn forbids_path(&self, path: &DottedPath) -> bool {
        self.cannot_depend_on.as_ref().is_some_and(|deps| deps.contains(path))
    }

    /// Whether `name` appears in `depends_on_external`.
    pub fn depends_on_external_name(&self, name: &str) -> bool {
        self.depends_on_external
            .as_ref()
            .is_some_and(|deps| deps.iter().any(|d| d.name == name))
    }

    /// Whether `name` appears in `cannot_depend_on_external`.
    pub fn forbids_external_name(&self, name: &str) -> bool {
        self.cannot_depend_on_external
            .as_ref()
            .is_some_and(|deps| deps.iter().any(|d| d.name == name))
    }

    /// Whether this module is the `<root>` sentinel.
    pub fn is_root(&self) -> bool {
        self.path.is_root_sentinel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_edge_is_never_deprecated() {
        let edge = DependencyEdge::Bare(DottedPath::parse("b"));
        assert!(!edge.is_deprecated());
        assert_eq!(edge.path(), &DottedPath::parse("b"));
    }

    #[test]
    fn table_edge_reports_deprecated() {
        let edge =
            DependencyEdge::Table { path: DottedPath::parse("b"), deprecated: true };
        assert!(edge.is_deprecated());
    }

    #[test]
    fn depends_on_path_ignores_form() {
        let mut m = ModuleConfig::new(DottedPath::parse("a"));
        m.depends_on = Some(vec![DependencyEdge::Bare(DottedPath::parse("b"))]);
        assert!(m.depends_on_path(&DottedPath::parse("b")));
        assert!(!m.depends_on_path(&DottedPath::parse("c")));
    }
}
