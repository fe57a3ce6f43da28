use std::path::Path;

use globset::Glob;
use rampart_config::{DottedPath, ModuleConfig, ProjectConfig, RootModuleTreatment, RuleSeverity};
use rampart_resolve::{Resolution, Resolver};
use rampart_scan::Import;

use crate::diagnostic::{Diagnostic, DiagnosticKind, Severity};

/// Everything the rule pipeline needs beyond the single `(file, Import)`
/// pair it's evaluating: the importer's own module, the project config
/// (for `layers`, root policy, external allowlist), and the resolver (to
/// classify the import's target and consult the interface index).
pub struct RuleContext<'a> {
    /// The module config of the file doing the importing, if any.
    pub importer: Option<&'a ModuleConfig>,
    pub project: &'a ProjectConfig,
    pub resolver: &'a Resolver,
}

/// Apply rules a-h to one import, returning every diagnostic it produces:
/// ordinarily zero or one violation, or one "unused ignore" finding when an
/// attached directive suppressed nothing.
pub fn check_import(
    file: &Path,
    import: &Import,
    ctx: &RuleContext,
) -> Vec<Diagnostic> {
    let Some(importer) = ctx.importer else {
        return Vec::new();
    };
    if importer.unchecked {
        return Vec::new();
    }

    let target_path = &import.module_path;
    let resolution = ctx.resolver.resolve(target_path);

    let verdict = evaluate(importer, target_path, &resolution, ctx);

    if let Some(directive) = &import.ignore {
        let bound = import.bound_name();
        let name = bound.leaf().unwrap_or_default();
        if directive.applies_to(name) {
            // The directive is attached to this import and scoped to it
            // (or unscoped). If there was nothing to suppress, the
            // directive itself is the finding.
            return match verdict {
                Some(_) => Vec::new(),
                None => unused_ignore_diagnostic(file, import, ctx),
            };
        }
    }

    let Some((kind, severity, message)) = verdict else {
        return Vec::new();
    };

    vec![Diagnostic {
        file_path: file.to_path_buf(),
        line_number: import.line_number,
        import_mod_path: target_path.clone(),
        severity,
        kind,
        message,
    }]
}

/// An ignore directive attached to an import that turned out not to
/// violate anything ("When a suppressed diagnostic would not have been
/// produced, an 'unused ignore' diagnostic is emitted per
/// `rules.unused_ignore_directives`.").
fn unused_ignore_diagnostic(file: &Path, import: &Import, ctx: &RuleContext) -> Vec<Diagnostic> {
    let severity = match ctx.project.rules.unused_ignore_directives {
        RuleSeverity::Off => return Vec::new(),
        RuleSeverity::Error => Severity::Error,
        RuleSeverity::Warning => Severity::Warning,
    };
    vec![Diagnostic {
        file_path: file.to_path_buf(),
        line_number: import.line_number,
        import_mod_path: import.module_path.clone(),
        severity,
        kind: DiagnosticKind::Unused,
        message: format!(
            "unused ignore directive: '{}' does not violate any rule",
            import.module_path
        ),
    }]
}

type Verdict = Option<(DiagnosticKind, Severity, String)>;

fn evaluate(
    importer: &ModuleConfig,
    target_path: &DottedPath,
    resolution: &Resolution,
    ctx: &RuleContext,
) -> Verdict {
    match resolution {
        Resolution::Internal { module, exact } => {
            evaluate_internal(importer, target_path, module, *exact, ctx)
        }
        Resolution::External { package } => evaluate_external(importer, package, ctx),
        Resolution::Root => evaluate_root(importer, ctx),
        Resolution::Unknown => None,
    }
}

fn evaluate_internal(
    importer: &ModuleConfig,
    target_path: &DottedPath,
    target_module: &DottedPath,
    exact: bool,
    ctx: &RuleContext,
) -> Verdict {
    let target = ctx.resolver.owning_module(target_module)?;

    // a. Utility bypass.
    if target.utility {
        return None;
    }

    // b. Same-module: the target is `I` itself or a descendant of `I`
    // (ancestor relation *into* `I`'s own tree). A child importing its own
    // declared parent is importing a different declared module and still
    // goes through the rest of the pipeline.
    if importer.path == target.path || importer.path.is_ancestor_of_or_eq(&target.path) {
        return None;
    }

    // c. Visibility.
    if let Some(patterns) = &target.visibility {
        if !patterns.iter().any(|p| dotted_glob_match(p, &importer.path)) {
            return Some((
                DiagnosticKind::Dependency,
                Severity::Error,
                format!(
                    "module '{}' is not permitted to see '{}'",
                    importer.path, target.path
                ),
            ));
        }
    }

    // d. Layer.
    if let (Some(layer_i), Some(layer_t)) = (&importer.layer, &target.layer) {
        if let (Some(idx_i), Some(idx_t)) =
            (layer_index(&ctx.project.layers, layer_i), layer_index(&ctx.project.layers, layer_t))
        {
            let same_layer = idx_i == idx_t;
            if idx_t < idx_i && !(same_layer && importer.depends_on_path(&target.path)) {
                return Some((
                    DiagnosticKind::Dependency,
                    Severity::Error,
                    format!("layer '{layer_t}' is above '{layer_i}'"),
                ));
            }
        }
    }

    // e. Dependency list. `cannot_depend_on` wins regardless of `depends_on`.
    if importer.forbids_path(&target.path) {
        return Some((
            DiagnosticKind::Dependency,
            Severity::Error,
            format!("module '{}' cannot depend on '{}'", importer.path, target.path),
        ));
    }
    if let Some(_allowed) = &importer.depends_on {
        match importer.dependency_edge(&target.path) {
            Some(edge) if edge.is_deprecated() => {
                return Some((
                    DiagnosticKind::Deprecated,
                    Severity::Warning,
                    format!(
                        "module '{}' depends on deprecated edge '{}'",
                        importer.path, target.path
                    ),
                ));
            }
            Some(_) => {}
            None => {
                return Some((
                    DiagnosticKind::Dependency,
                    Severity::Error,
                    format!(
                        "Cannot import '{}'. Module '{}' cannot depend on '{}'.",
                        target_path, importer.path, target.path
                    ),
                ));
            }
        }
    }

    // f. Interface strictness.
    if target.strict && !exact {
        let interfaces = ctx.resolver.interfaces();
        if interfaces.governs(&target.path) {
            let leaf = target_path.leaf().unwrap_or_default();
            if !interfaces.exposes(&target.path, leaf) {
                return Some((
                    DiagnosticKind::Interface,
                    Severity::Error,
                    format!(
                        "'{leaf}' is not exposed by an interface for module '{}'",
                        target.path
                    ),
                ));
            }
        }
    }

    None
}

fn evaluate_external(importer: &ModuleConfig, package: &str, ctx: &RuleContext) -> Verdict {
    if importer.forbids_external_name(package) {
        return Some((
            DiagnosticKind::Dependency,
            Severity::Error,
            format!("module '{}' cannot depend on external package '{package}'", importer.path),
        ));
    }
    if importer.depends_on_external.is_some() {
        return if importer.depends_on_external_name(package) {
            None
        } else {
            Some((
                DiagnosticKind::Dependency,
                Severity::Error,
                format!(
                    "module '{}' does not declare a dependency on external package '{package}'",
                    importer.path
                ),
            ))
        };
    }
    // Neither per-module list is set: defer to the project-wide
    // `external.exclude` allowlist.
    if !external_allowlist_permits(ctx.project, package) {
        return Some((
            DiagnosticKind::Dependency,
            Severity::Error,
            format!("external package '{package}' is excluded by the project's external allowlist"),
        ));
    }
    None
}

fn evaluate_root(importer: &ModuleConfig, ctx: &RuleContext) -> Verdict {
    match ctx.project.root_module_treatment {
        RootModuleTreatment::Ignore => None,
        RootModuleTreatment::Forbid => Some((
            DiagnosticKind::Dependency,
            Severity::Error,
            format!("module '{}' cannot depend on the root module", importer.path),
        )),
        RootModuleTreatment::DependenciesOnly => {
            if importer.depends_on_path(&DottedPath::root_sentinel()) {
                Some((
                    DiagnosticKind::Dependency,
                    Severity::Error,
                    format!(
                        "module '{}' must not declare an explicit dependency on the root module",
                        importer.path
                    ),
                ))
            } else {
                None
            }
        }
        RootModuleTreatment::Allow => {
            if importer.depends_on.is_some() && !importer.depends_on_path(&DottedPath::root_sentinel()) {
                Some((
                    DiagnosticKind::Dependency,
                    Severity::Error,
                    format!(
                        "Cannot import root. Module '{}' cannot depend on '<root>'.",
                        importer.path
                    ),
                ))
            } else {
                None
            }
        }
    }
}

fn layer_index(layers: &[String], name: &str) -> Option<usize> {
    layers.iter().position(|l| l == name)
}

/// Match a `visibility` dotted-path glob pattern (e.g. `"app.*"`) against a
/// dotted module path by treating `.` as the glob's path separator, reusing
/// `globset`'s existing segment-aware `*`/`**` semantics rather than
/// hand-rolling a second glob dialect.
fn dotted_glob_match(pattern: &str, path: &DottedPath) -> bool {
    let pattern = pattern.replace('.', "/");
    let candidate = path.to_string().replace('.', "/");
    match Glob::new(&pattern) {
        Ok(glob) => glob.compile_matcher().is_match(candidate),
        Err(err) => {
            log::warn!("visibility: invalid pattern '{pattern}': {err}");
            false
        }
    }
}

/// Whether an import to external `package` should be allowed given the
/// project-wide `external.exclude` allowlist, consulted only when the
/// importer declares neither `depends_on_external` nor
/// `cannot_depend_on_external`.
pub fn external_allowlist_permits(project: &ProjectConfig, package: &str) -> bool {
    match &project.external.exclude {
        Some(excluded) => !excluded.iter().any(|p| p == package),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampart_config::DependencyEdge;

    fn module(path: &str) -> ModuleConfig {
        ModuleConfig::new(DottedPath::parse(path))
    }

    fn project_with(modules: Vec<ModuleConfig>) -> ProjectConfig {
        let mut p = ProjectConfig::default();
        p.modules = modules;
        p
    }

    #[test]
    fn missing_dependency_is_an_error() {
        let mut a = module("a");
        a.depends_on = Some(vec![]);
        let b = module("b");
        let project = project_with(vec![a.clone(), b.clone()]);
        let dir = tempfile::tempdir().unwrap();
        let resolver = Resolver::build(&project, dir.path());
        let ctx = RuleContext { importer: Some(&a), project: &project, resolver: &resolver };
        let verdict = evaluate(&a, &DottedPath::parse("b"), &Resolution::Internal {
            module: DottedPath::parse("b"),
            exact: true,
        }, &ctx);
        assert!(matches!(verdict, Some((DiagnosticKind::Dependency, Severity::Error, _))));
    }

    #[test]
    fn deprecated_edge_is_a_warning_not_an_error() {
        let mut a = module("a");
        a.depends_on =
            Some(vec![DependencyEdge::Table { path: DottedPath::parse("b"), deprecated: true }]);
        let b = module("b");
        let project = project_with(vec![a.clone(), b.clone()]);
        let dir = tempfile::tempdir().unwrap();
        let resolver = Resolver::build(&project, dir.path());
        let ctx = RuleContext { importer: Some(&a), project: &project, resolver: &resolver };
        let verdict = evaluate(&a, &DottedPath::parse("b"), &Resolution::Internal {
            module: DottedPath::parse("b"),
            exact: true,
        }, &ctx);
        assert!(matches!(verdict, Some((DiagnosticKind::Deprecated, Severity::Warning, _))));
    }

    #[test]
    fn utility_module_bypasses_every_rule() {
        let a = module("a");
        let mut b = module("b");
        b.utility = true;
        let project = project_with(vec![a.clone(), b.clone()]);
        let dir = tempfile::tempdir().unwrap();
        let resolver = Resolver::build(&project, dir.path());
        let ctx = RuleContext { importer: Some(&a), project: &project, resolver: &resolver };
        let verdict = evaluate(&a, &DottedPath::parse("b"), &Resolution::Internal {
            module: DottedPath::parse("b"),
            exact: true,
        }, &ctx);
        assert!(verdict.is_none());
    }

    #[test]
    fn external_falls_back_to_project_allowlist_when_module_declares_neither_list() {
        let a = module("a");
        let mut project = project_with(vec![a.clone()]);
        project.external.exclude = Some(vec!["forbidden_pkg".to_string()]);
        let dir = tempfile::tempdir().unwrap();
        let resolver = Resolver::build(&project, dir.path());
        let ctx = RuleContext { importer: Some(&a), project: &project, resolver: &resolver };
        let verdict = evaluate_external(&a, "forbidden_pkg", &ctx);
        assert!(matches!(verdict, Some((DiagnosticKind::Dependency, Severity::Error, _))));
        let verdict = evaluate_external(&a, "anything_else", &ctx);
        assert!(verdict.is_none());
    }
}
