use std::path::{Path, PathBuf};

use rayon::prelude::*;

use ignore::WalkBuilder;
use rampart_config::{DottedPath, ProjectConfig};
use rampart_resolve::{Resolution, Resolver};

use crate::cycle::DependencyGraph;
use crate::diagnostic::{sort_and_dedup, Diagnostic, DiagnosticKind, Severity};
use crate::error::CheckError;
use crate::module_path::module_path_for;
use crate::rules::{check_import, RuleContext};
use crate::unused::UsageTracker;

/// Confirm `project_dir` is a readable directory before a check run starts,
/// so the caller can map the failure to exit code 2 rather than
/// discovering it mid-walk as an empty, silently-successful file list.
pub fn validate_project_dir(project_dir: &Path) -> Result<(), CheckError> {
    std::fs::read_dir(project_dir)
        .map(|_| ())
        .map_err(|source| CheckError::ProjectDir { path: project_dir.to_path_buf(), source })
}

/// Options controlling one `check` run, mirroring rampart's CLI flags.
#[derive(Clone, Copy, Debug, Default)]
pub struct CheckOptions {
    /// Limit the run to dependency-list rules only (`--dependencies`).
    pub dependencies_only: bool,
    /// Limit the run to interface-strictness rules only (`--interfaces`).
    pub interfaces_only: bool,
    /// Also report declared dependencies that no import exercised
    /// (`--exact`).
    pub exact: bool,
}

/// One file's scan-and-check result: its diagnostics plus the dependency
/// edges it exercised, reported separately so the caller can fold them into
/// project-wide graph/usage state after the parallel phase.
struct FileResult {
    diagnostics: Vec<Diagnostic>,
    /// Non-deprecated dependency edges exercised by a real import, fed to
    /// the circular-dependency graph.
    edges: Vec<(DottedPath, DottedPath)>,
    /// Every declared dependency edge exercised by a real import
    /// regardless of deprecation, fed to the unused-dependency tracker.
    usage_edges: Vec<(DottedPath, DottedPath)>,
}

/// Run a full check over `project_dir` and return every diagnostic, sorted
/// and deduplicated: resolver construction, file enumeration, per-file
/// import extraction, and rule classification all happen in this one pass.
pub fn check_project(
    project: &ProjectConfig,
    project_dir: &Path,
    options: CheckOptions,
) -> Vec<Diagnostic> {
    let resolver = Resolver::build(project, project_dir);
    let files = discover_files(project, project_dir);

    let results: Vec<FileResult> = files
        .par_iter()
        .map(|file| check_file(project, project_dir, &resolver, file, options))
        .collect();

    let mut diagnostics = Vec::new();
    let mut graph = DependencyGraph::new();
    let mut usage = UsageTracker::new();
    for result in results {
        diagnostics.extend(result.diagnostics);
        for (from, to) in result.edges {
            graph.record_edge(from, to);
        }
        for (from, to) in result.usage_edges {
            usage.record(from, to);
        }
    }

    if project.forbid_circular_dependencies {
        diagnostics.extend(graph.find_cycles());
    }
    if options.exact {
        diagnostics.extend(usage.unused_dependencies(&project.modules));
    }

    sort_and_dedup(diagnostics)
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
                Ok(_) => None,
                Err(err) => {
                    log::warn!("check: error while walking: {err}");
                    None
                }
            })
            .collect(),
        Err(err) => {
            log::warn!("check: failed to walk source roots: {err}");
            Vec::new()
        }
    }
}

fn check_file(
    project: &ProjectConfig,
    project_dir: &Path,
    resolver: &Resolver,
    file: &Path,
    options: CheckOptions,
) -> FileResult {
    let mut diagnostics = Vec::new();
    let mut edges = Vec::new();
    let mut usage_edges = Vec::new();

    let source = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(err) => {
            diagnostics.push(Diagnostic {
                file_path: relative(project_dir, file),
                line_number: 0,
                import_mod_path: DottedPath::empty(),
                severity: Severity::Error,
                kind: DiagnosticKind::Configuration,
                message: format!("could not read file: {err}"),
            });
            return FileResult { diagnostics, edges, usage_edges };
        }
    };

    let source_root = project
        .source_roots
        .iter()
        .map(|r| project_dir.join(r))
        .find(|root| file.starts_with(root))
        .unwrap_or_else(|| project_dir.to_path_buf());

    let Some(own_path) = module_path_for(&source_root, file) else {
        return FileResult { diagnostics, edges, usage_edges };
    };

    let importer = resolver.owning_module(&own_path);
    match importer {
        None => return FileResult { diagnostics, edges, usage_edges },
        Some(m) if m.unchecked => return FileResult { diagnostics, edges, usage_edges },
        Some(_) => {}
    }

    let require_reasons = matches!(
        project.rules.require_ignore_directive_reasons,
        rampart_config::RuleSeverity::Error
    );
    let scan = rampart_scan::scan(
        &source,
        &own_path,
        project.ignore_type_checking_imports,
        project.include_string_imports,
        require_reasons,
    );

    for issue in &scan.issues {
        diagnostics.push(Diagnostic {
            file_path: relative(project_dir, file),
            line_number: issue.line_number,
            import_mod_path: DottedPath::empty(),
            severity: Severity::Error,
            kind: DiagnosticKind::Configuration,
            message: issue.message.clone(),
        });
    }

    let ctx = RuleContext { importer, project, resolver };
    let rel_file = relative(project_dir, file);

    for import in &scan.imports {
        let found = check_import(&rel_file, import, &ctx);
        let found = if options.dependencies_only {
            found.into_iter().filter(|d| d.kind != DiagnosticKind::Interface).collect()
        } else if options.interfaces_only {
            found.into_iter().filter(|d| d.kind == DiagnosticKind::Interface).collect()
        } else {
            found
        };
        diagnostics.extend(found);

        if let (Some(importer), Resolution::Internal { module, .. }) =
            (importer, resolver.resolve(&import.module_path))
        {
            if let Some(edge) = importer.dependency_edge(&module) {
                usage_edges.push((importer.path.clone(), module.clone()));
                if !edge.is_deprecated() {
                    edges.push((importer.path.clone(), module));
                }
            }
        }
    }

    FileResult { diagnostics, edges, usage_edges }
}

fn relative(project_dir: &Path, file: &Path) -> PathBuf {
    file.strip_prefix(project_dir).map(Path::to_path_buf).unwrap_or_else(|_| file.to_path_buf())
}
