use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use rampart_config::{DottedPath, ProjectConfig};
use rampart_resolve::{Resolution, Resolver};

use crate::module_path::module_path_for;

/// The dependency and usage edges of a single module, as the `report`
/// command renders them (SPEC_FULL.md "Supplemented features"). This walks
/// the project exactly as `check_project` does, but collects edges rather
/// than diagnostics -- it never consults `depends_on`/`visibility`/etc, so
/// a module with no declared rules still gets a full report of what it
/// actually imports and who actually imports it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ModuleReport {
    /// Distinct modules `module` imports from, sorted by path.
    pub dependencies: Vec<DottedPath>,
    /// Distinct modules that import from `module`, sorted by path.
    pub usages: Vec<DottedPath>,
}

/// Build the report for `module` by walking every file under the project's
/// source roots and resolving its imports the same way `check_project`
/// does, but without running the rule pipeline.
pub fn report(project: &ProjectConfig, project_dir: &Path, module: &DottedPath) -> ModuleReport {
    let resolver = Resolver::build(project, project_dir);
    let mut dependencies = BTreeSet::new();
    let mut usages = BTreeSet::new();

    for file in discover_files(project, project_dir) {
        let Ok(source) = std::fs::read_to_string(&file) else { continue };
        let source_root = project
            .source_roots
            .iter()
            .map(|r| project_dir.join(r))
            .find(|root| file.starts_with(root))
            .unwrap_or_else(|| project_dir.to_path_buf());
        let Some(own_path) = module_path_for(&source_root, &file) else { continue };
        let Some(importer) = resolver.owning_module(&own_path) else { continue };

        let scan = rampart_scan::scan(
            &source,
            &own_path,
            project.ignore_type_checking_imports,
            project.include_string_imports,
            false,
        );
        for import in &scan.imports {
            let Resolution::Internal { module: target, .. } = resolver.resolve(&import.module_path)
            else {
                continue;
            };
            if target == importer.path {
                continue;
            }
            if importer.path == *module {
                dependencies.insert(target.clone());
            }
            if target == *module {
                usages.insert(importer.path.clone());
            }
        }
    }

    ModuleReport {
        dependencies: dependencies.into_iter().collect(),
        usages: usages.into_iter().collect(),
    }
}

fn discover_files(project: &ProjectConfig, project_dir: &Path) -> Vec<PathBuf> {
    let mut builder = WalkBuilder::new();
    for root in &project.source_roots {
        builder.add(project_dir.join(root));
    }
    builder.respect_gitignore(project.respect_gitignore);
    builder.source_suffixes(["py"]);
    for pattern in &project.exclude {
        builder.exclude(pattern.clone());
    }
    match builder.build() {
        Ok(walk) => walk
            .filter_map(|entry| match entry {
                Ok(e) if e.is_file() => Some(e.path().to_path_buf()),
                _ => None,
            })
            .collect(),
        Err(err) => {
            log::warn!("report: failed to walk source roots: {err}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampart_config::ModuleConfig;
    use std::fs;

    #[test]
    fn collects_dependencies_and_usages() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/a")).unwrap();
        fs::create_dir_all(dir.path().join("src/b")).unwrap();
        fs::write(dir.path().join("src/a/__init__.py"), "import b\n").unwrap();
        fs::write(dir.path().join("src/b/__init__.py"), "x = 1\n").unwrap();

        let mut project = ProjectConfig::default();
        project.source_roots = vec![PathBuf::from("src")];
        project.modules =
            vec![ModuleConfig::new(DottedPath::parse("a")), ModuleConfig::new(DottedPath::parse("b"))];

        let report_a = report(&project, dir.path(), &DottedPath::parse("a"));
        assert_eq!(report_a.dependencies, vec![DottedPath::parse("b")]);
        assert!(report_a.usages.is_empty());

        let report_b = report(&project, dir.path(), &DottedPath::parse("b"));
        assert!(report_b.dependencies.is_empty());
        assert_eq!(report_b.usages, vec![DottedPath::parse("a")]);
    }
}
