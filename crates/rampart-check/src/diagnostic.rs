use std::path::PathBuf;

use rampart_config::DottedPath;

/// How serious a `Diagnostic` is.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum Severity {
    /// A non-fatal observation; doesn't affect the process exit code.
    Warning,
    /// Causes `check` to exit with code 1.
    Error,
}

/// Which family of rule produced a `Diagnostic`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DiagnosticKind {
    /// Config parse failure, unresolved relative import, or schema error.
    Configuration,
    /// A rule from the dependency/visibility/layer/root pipeline.
    Dependency,
    /// An interface-strictness violation.
    Interface,
    /// The rule-matched edge was marked `deprecated: true`.
    Deprecated,
    /// `--exact` unused-dependency or unused-ignore-directive findings.
    Unused,
}

/// One finding against a single `(file, import)` pair, or a project-wide
/// finding (circular dependency, unused dependency) with no particular
/// import line (`Diagnostic`).
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// The file the diagnostic concerns, relative to the project root.
    pub file_path: PathBuf,
    /// 1-based source line, or 0 for project-wide findings with no single
    /// line to point at.
    pub line_number: usize,
    /// The dotted import path this diagnostic concerns, or the empty path
    /// for findings that don't center on one import.
    pub import_mod_path: DottedPath,
    /// Error or warning.
    pub severity: Severity,
    /// Which rule family raised this.
    pub kind: DiagnosticKind,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    /// Render as `<severity> <file>:<line>: <message>`, the `check`
    /// command's textual output line shape.
    pub fn render_line(&self) -> String {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        format!(
            "{severity} {}:{}: {}",
            self.file_path.display(),
            self.line_number,
            self.message
        )
    }
}

/// Sort key: (file path, line number, import path, severity), giving a
/// stable, deterministic ordering. The import path compares by its rendered
/// string, since `DottedPath` itself only implements equality, not order.
fn sort_key(d: &Diagnostic) -> (&PathBuf, usize, String, Severity) {
    (&d.file_path, d.line_number, d.import_mod_path.to_string(), d.severity)
}

/// Sort diagnostics into the canonical order and drop exact duplicates
/// ("Identical diagnostics are deduplicated.").
pub fn sort_and_dedup(mut diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    diagnostics.sort_by(|a, b| {
        sort_key(a).cmp(&sort_key(b))
    });
    diagnostics.dedup_by(|a, b| {
        a.file_path == b.file_path
            && a.line_number == b.line_number
            && a.import_mod_path == b.import_mod_path
            && a.severity == b.severity
            && a.kind == b.kind
            && a.message == b.message
    });
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(file: &str, line: usize, sev: Severity) -> Diagnostic {
        Diagnostic {
            file_path: PathBuf::from(file),
            line_number: line,
            import_mod_path: DottedPath::parse("a.b"),
            severity: sev,
            kind: DiagnosticKind::Dependency,
            message: "x".to_string(),
        }
    }

    #[test]
    fn sorts_by_file_then_line() {
        let sorted = sort_and_dedup(vec![
            diag("b.py", 1, Severity::Error),
            diag("a.py", 5, Severity::Error),
            diag("a.py", 1, Severity::Error),
        ]);
        let files: Vec<_> = sorted.iter().map(|d| (d.file_path.clone(), d.line_number)).collect();
        assert_eq!(
            files,
            vec![
                (PathBuf::from("a.py"), 1),
                (PathBuf::from("a.py"), 5),
                (PathBuf::from("b.py"), 1),
            ]
        );
    }

    #[test]
    fn drops_exact_duplicates() {
        let sorted = sort_and_dedup(vec![
            diag("a.py", 1, Severity::Error),
            diag("a.py", 1, Severity::Error),
        ]);
        assert_eq!(sorted.len(), 1);
    }
}
