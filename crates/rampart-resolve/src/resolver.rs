use std::collections::HashSet;
use std::path::Path;

use rampart_config::{DottedPath, ModuleConfig, ProjectConfig};

use crate::external::{self, ExternalIndex};
use crate::interface_index::InterfaceIndex;
use crate::tree::ModuleTree;

/// How a dotted import path resolves against a project's declared modules,
/// source roots, and external-package index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Owned by a declared module. `exact` is true when the import path
    /// names the module itself rather than a descendant of it.
    Internal { module: DottedPath, exact: bool },
    /// A third-party package, named by its distribution name where known.
    External { package: String },
    /// Project-internal (its top-level segment is one of the project's
    /// source roots) but outside every declared module -- owned by the
    /// `<root>` sentinel, if one is declared.
    Root,
    /// Neither a declared module, a recognized external package, nor
    /// project-internal: can't be classified with the information
    /// available. Callers generally treat this permissively, since a wrong
    /// `Unknown` must never produce a false violation.
    Unknown,
}

/// The module resolver: built once per project, shared read-only
/// across worker threads while the checker checks files in parallel.
pub struct Resolver {
    tree: ModuleTree,
    external: ExternalIndex,
    interfaces: InterfaceIndex,
    internal_prefixes: HashSet<String>,
    root_treatment_declared: bool,
}

impl Resolver {
    /// Build a resolver from a validated project config and the filesystem
    /// locations of its source roots (used only to list top-level prefixes,
    /// never to walk the whole tree -- that's the directory walker's job).
    pub fn build(config: &ProjectConfig, project_dir: &Path) -> Resolver {
        let tree = ModuleTree::build(&module_list(config));
        let interfaces = InterfaceIndex::build(&config.interfaces);

        let manifest_names = discover_manifest_names(project_dir);
        let rename: Vec<(String, String)> = config
            .external
            .rename
            .iter()
            .map(|r| (r.distribution_name.clone(), r.import_name.clone()))
            .collect();
        let external = ExternalIndex::build(manifest_names, &rename);

        let internal_prefixes = discover_internal_prefixes(project_dir, &config.source_roots);

        Resolver {
            tree,
            external,
            interfaces,
            internal_prefixes,
            root_treatment_declared: config.modules.iter().any(|m| m.is_root()),
        }
    }

    /// Resolve one dotted import path to a `Resolution`.
    pub fn resolve(&self, path: &DottedPath) -> Resolution {
        if let Some(module) = self.tree.find_nearest(path) {
            return Resolution::Internal { module: module.path.clone(), exact: &module.path == path };
        }
        let Some(top) = path.root_segment() else {
            return Resolution::Unknown;
        };
        if self.external.contains(top) {
            return Resolution::External { package: self.external.package_name(top) };
        }
        if self.internal_prefixes.contains(top) {
            return Resolution::Root;
        }
        Resolution::Unknown
    }

    /// The module owning `path` exactly or by nearest ancestry, regardless
    /// of whether it resolves as external/root/unknown. Used by the checker
    /// to find the importing file's own module.
    pub fn owning_module(&self, path: &DottedPath) -> Option<&ModuleConfig> {
        self.tree.find_nearest(path)
    }

    /// The `<root>` sentinel module config, if declared.
    pub fn root_module(&self) -> Option<&ModuleConfig> {
        self.tree.root_module()
    }

    /// Whether a `<root>` module was declared at all (distinguishes "no
    /// `<root>` module declared" from "`<root>` declared with default
    /// settings" when applying `root_module_treatment`).
    pub fn root_module_declared(&self) -> bool {
        self.root_treatment_declared
    }

    /// The compiled interface index, for interface-strictness checks.
    pub fn interfaces(&self) -> &InterfaceIndex {
        &self.interfaces
    }
}

fn module_list(config: &ProjectConfig) -> Vec<ModuleConfig> {
    config.modules.clone()
}

/// Look for a dependency manifest at the project root. Checked in order of
/// specificity: `pyproject.toml` (most projects in the retrieval pack use
/// this), then `requirements.txt`. Only the first found is parsed -- most
/// projects declare dependencies in exactly one place.
fn discover_manifest_names(project_dir: &Path) -> Vec<String> {
    for candidate in ["pyproject.toml", "requirements.txt"] {
        let path = project_dir.join(candidate);
        if path.is_file() {
            return external::parse_manifest_names(&path);
        }
    }
    Vec::new()
}

/// List each source root's immediate children to build the set of
/// top-level names that are project-internal even when not owned by any
/// declared module (`Root` resolution). A single shallow
/// listing per source root, not a recursive walk -- the directory walker
/// owns file discovery.
fn discover_internal_prefixes(project_dir: &Path, source_roots: &[std::path::PathBuf]) -> HashSet<String> {
    let mut prefixes = HashSet::new();
    for root in source_roots {
        let dir = project_dir.join(root);
        let Ok(entries) = std::fs::read_dir(&dir) else {
            log::debug!("resolve: could not list source root {}", dir.display());
            continue;
        };
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_package = entry.path().is_dir() || name.ends_with(".py");
            if is_package {
                let name = name.strip_suffix(".py").unwrap_or(&name).to_string();
                prefixes.insert(name);
            }
        }
    }
    prefixes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(modules: Vec<ModuleConfig>) -> ProjectConfig {
        let mut config = ProjectConfig::default();
        config.modules = modules;
        config
    }

    #[test]
    fn resolves_stdlib_as_external() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with(vec![]);
        let resolver = Resolver::build(&config, dir.path());
        assert_eq!(
            resolver.resolve(&DottedPath::parse("os.path")),
            Resolution::External { package: "os".to_string() }
        );
    }

    #[test]
    fn resolves_declared_module_exactly_and_by_descendant() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with(vec![ModuleConfig::new(DottedPath::parse("app.core"))]);
        let resolver = Resolver::build(&config, dir.path());
        assert_eq!(
            resolver.resolve(&DottedPath::parse("app.core")),
            Resolution::Internal { module: DottedPath::parse("app.core"), exact: true }
        );
        assert_eq!(
            resolver.resolve(&DottedPath::parse("app.core.utils")),
            Resolution::Internal { module: DottedPath::parse("app.core"), exact: false }
        );
    }

    #[test]
    fn resolves_unlisted_top_level_name_as_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with(vec![]);
        let resolver = Resolver::build(&config, dir.path());
        assert_eq!(resolver.resolve(&DottedPath::parse("totally_unheard_of")), Resolution::Unknown);
    }

    #[test]
    fn resolves_sibling_source_directory_as_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("app")).unwrap();
        let config = config_with(vec![]);
        let resolver = Resolver::build(&config, dir.path());
        assert_eq!(resolver.resolve(&DottedPath::parse("app.unmodeled")), Resolution::Root);
    }
}
