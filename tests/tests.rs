//! End-to-end scenarios against the full `rampart-config` / `rampart-check`
//! / `rampart-cache` pipeline, one per "Testable properties"
//! literal example.

use std::fs;
use std::path::Path;

use rampart_cache::{Cache, CacheEntry, FingerprintInputs};
use rampart_check::{check_project, CheckOptions, DiagnosticKind, Severity};
use rampart_config::{DependencyEdge, DottedPath, ModuleConfig, ProjectConfig, RuleSeverity};

fn write_file(dir: &Path, rel: &str, contents: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn module(path: &str) -> ModuleConfig {
    ModuleConfig::new(DottedPath::parse(path))
}

fn base_project(modules: Vec<ModuleConfig>) -> ProjectConfig {
    let mut project = ProjectConfig::default();
    project.source_roots = vec![Path::new("src").to_path_buf()];
    project.modules = modules;
    project
}

#[test]
fn scenario_1_simple_violation() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "src/a/x.py", "import b\n");
    write_file(dir.path(), "src/b/__init__.py", "x = 1\n");

    let mut a = module("a");
    a.depends_on = Some(vec![]);
    let project = base_project(vec![a, module("b")]);

    let diagnostics = check_project(&project, dir.path(), CheckOptions::default());
    assert_eq!(diagnostics.len(), 1);
    let d = &diagnostics[0];
    assert_eq!(d.severity, Severity::Error);
    assert_eq!(d.kind, DiagnosticKind::Dependency);
    assert_eq!(d.line_number, 1);
    assert_eq!(d.message, "Cannot import 'b'. Module 'a' cannot depend on 'b'.");
}

#[test]
fn scenario_2_allowed() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "src/a/x.py", "import b\n");
    write_file(dir.path(), "src/b/__init__.py", "x = 1\n");

    let mut a = module("a");
    a.depends_on = Some(vec![DependencyEdge::Bare(DottedPath::parse("b"))]);
    let project = base_project(vec![a, module("b")]);

    let diagnostics = check_project(&project, dir.path(), CheckOptions::default());
    assert!(diagnostics.is_empty());
}

#[test]
fn scenario_3_deprecated_edge() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "src/a/x.py", "import b\n");
    write_file(dir.path(), "src/b/__init__.py", "x = 1\n");

    let mut a = module("a");
    a.depends_on =
        Some(vec![DependencyEdge::Table { path: DottedPath::parse("b"), deprecated: true }]);
    let project = base_project(vec![a, module("b")]);

    let diagnostics = check_project(&project, dir.path(), CheckOptions::default());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::Deprecated);
    assert_eq!(diagnostics[0].severity, Severity::Warning);
}

#[test]
fn scenario_4_strict_interface_miss() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "src/a/x.py", "from b import Internal\n");
    write_file(dir.path(), "src/b/__init__.py", "Internal = object()\nAPI = object()\n");

    let mut b = module("b");
    b.strict = true;
    let mut project = base_project(vec![module("a"), b]);
    project.interfaces = vec![rampart_config::InterfaceConfig {
        expose: vec!["API".to_string()],
        from_modules: vec![DottedPath::parse("b")],
        visibility: None,
        data_types: rampart_config::DataTypes::default(),
    }];

    let diagnostics = check_project(&project, dir.path(), CheckOptions::default());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::Interface);
    assert!(diagnostics[0].message.contains("Internal"));
}

#[test]
fn scenario_5_type_checking_block_is_never_checked() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "src/a/x.py",
        "from typing import TYPE_CHECKING\nif TYPE_CHECKING:\n    import b\n",
    );
    write_file(dir.path(), "src/b/__init__.py", "x = 1\n");

    let mut a = module("a");
    a.depends_on = Some(vec![]);
    let mut project = base_project(vec![a, module("b")]);
    project.ignore_type_checking_imports = true;

    let diagnostics = check_project(&project, dir.path(), CheckOptions::default());
    assert!(diagnostics.is_empty());
}

#[test]
fn scenario_6_cycle() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "src/a/__init__.py", "import b\n");
    write_file(dir.path(), "src/b/__init__.py", "import a\n");

    let mut a = module("a");
    a.depends_on = Some(vec![DependencyEdge::Bare(DottedPath::parse("b"))]);
    let mut b = module("b");
    b.depends_on = Some(vec![DependencyEdge::Bare(DottedPath::parse("a"))]);
    let mut project = base_project(vec![a, b]);
    project.forbid_circular_dependencies = true;

    let diagnostics = check_project(&project, dir.path(), CheckOptions::default());
    let cycle = diagnostics.iter().find(|d| d.message.contains("circular dependency"));
    assert!(cycle.is_some(), "expected a circular dependency diagnostic, got {diagnostics:?}");
    let message = &cycle.unwrap().message;
    // Path-ordered arrow notation (spec §8 scenario 6: "a → b → a"), not an
    // alphabetically sorted list -- tolerate either starting node since
    // Tarjan's component order isn't otherwise meaningful here.
    assert!(
        message.contains("circular dependency: a → b → a")
            || message.contains("circular dependency: b → a → b"),
        "unexpected cycle message: {message}"
    );
}

#[test]
fn scenario_7_cache_replay() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "src/a.py", "x = 1\n");

    let inputs = FingerprintInputs {
        interpreter_version: "3.11.4".to_string(),
        source_files: vec![dir.path().join("src/a.py")],
        dependency_manifest: None,
        file_dependencies: Vec::new(),
        env_dependencies: Vec::new(),
        action: "test".to_string(),
    };
    let fingerprint = rampart_cache::compute(&inputs);
    let cache = Cache::new(dir.path().join(".rampart"));
    assert_eq!(cache.get(&fingerprint).unwrap(), None);

    let entry = CacheEntry { stdout: b"3 passed\n".to_vec(), stderr: Vec::new(), exit_code: 0 };
    cache.put(&fingerprint, &entry).unwrap();

    // A second run with unchanged inputs produces the same fingerprint and
    // replays byte-identical output.
    let replayed = cache.get(&fingerprint).unwrap().unwrap();
    assert_eq!(replayed, entry);

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let code = replayed.replay(true, &mut stdout, &mut stderr);
    assert_eq!(code, 0);
    assert_eq!(String::from_utf8(stdout).unwrap(), "3 passed\n");
    assert!(String::from_utf8(stderr).unwrap().contains("cached results"));
}

#[test]
fn scenario_8_ignore_directive() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "src/a/x.py", "import b  # rampart-ignore(legacy)\n");
    write_file(dir.path(), "src/b/__init__.py", "x = 1\n");

    let mut a = module("a");
    a.depends_on = Some(vec![]);
    let project = base_project(vec![a.clone(), module("b")]);

    let diagnostics = check_project(&project, dir.path(), CheckOptions::default());
    assert!(diagnostics.is_empty());

    // Same import, but now a reason is required and the directive has none.
    write_file(dir.path(), "src/a/x.py", "import b  # rampart-ignore\n");
    let mut project_strict = project.clone();
    project_strict.rules.require_ignore_directive_reasons = RuleSeverity::Error;
    let diagnostics = check_project(&project_strict, dir.path(), CheckOptions::default());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::Configuration);
}

#[test]
fn unused_ignore_directive_is_flagged() {
    let dir = tempfile::tempdir().unwrap();
    // Nothing here would ever violate a rule (no depends_on declared), so
    // the ignore directive suppresses nothing.
    write_file(dir.path(), "src/a/x.py", "import b  # rampart-ignore(no longer needed)\n");
    write_file(dir.path(), "src/b/__init__.py", "x = 1\n");

    let project = base_project(vec![module("a"), module("b")]);
    let diagnostics = check_project(&project, dir.path(), CheckOptions::default());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::Unused);
    assert_eq!(diagnostics[0].severity, Severity::Warning);

    // rules.unused_ignore_directives = "off" silences it entirely.
    let mut project_off = project.clone();
    project_off.rules.unused_ignore_directives = RuleSeverity::Off;
    let diagnostics = check_project(&project_off, dir.path(), CheckOptions::default());
    assert!(diagnostics.is_empty());
}

#[test]
fn sync_removes_unused_and_add_appends_observed() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "src/a/__init__.py", "import c\n");
    write_file(dir.path(), "src/b/__init__.py", "x = 1\n");
    write_file(dir.path(), "src/c/__init__.py", "x = 1\n");

    let mut a = module("a");
    // "b" is declared but never imported; "c" is imported but undeclared.
    a.depends_on = Some(vec![DependencyEdge::Bare(DottedPath::parse("b"))]);
    let project = base_project(vec![a, module("b"), module("c")]);

    let report = rampart_check::report(&project, dir.path(), &DottedPath::parse("a"));
    assert_eq!(report.dependencies, vec![DottedPath::parse("c")]);
}
