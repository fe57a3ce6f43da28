use std::collections::HashSet;
use std::path::PathBuf;

use rampart_config::{DottedPath, ModuleConfig};

use crate::diagnostic::{Diagnostic, DiagnosticKind, Severity};

/// Tracks which declared `depends_on` edges were exercised by at least one
/// real import, across the whole project, so that `--exact` can report the
/// ones that weren't ("Unused-dependency check").
#[derive(Default)]
pub struct UsageTracker {
    exercised: HashSet<(DottedPath, DottedPath)>,
}

impl UsageTracker {
    /// An empty tracker.
    pub fn new() -> UsageTracker {
        UsageTracker::default()
    }

    /// Record that `from` actually imported something from `to`.
    pub fn record(&mut self, from: DottedPath, to: DottedPath) {
        self.exercised.insert((from, to));
    }

    /// Every declared `depends_on` edge across `modules` that was never
    /// exercised, as `Unused` diagnostics with no particular file or line.
    pub fn unused_dependencies(&self, modules: &[ModuleConfig]) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for module in modules {
            let Some(edges) = &module.depends_on else { continue };
            for edge in edges {
                let key = (module.path.clone(), edge.path().clone());
                if !self.exercised.contains(&key) {
                    diagnostics.push(Diagnostic {
                        file_path: PathBuf::new(),
                        line_number: 0,
                        import_mod_path: edge.path().clone(),
                        severity: Severity::Warning,
                        kind: DiagnosticKind::Unused,
                        message: format!(
                            "module '{}' declares a dependency on '{}' that is never used",
                            module.path,
                            edge.path()
                        ),
                    });
                }
            }
        }
        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampart_config::DependencyEdge;

    #[test]
    fn unexercised_edge_is_reported() {
        let mut a = ModuleConfig::new(DottedPath::parse("a"));
        a.depends_on = Some(vec![DependencyEdge::Bare(DottedPath::parse("b"))]);
        let tracker = UsageTracker::new();
        let findings = tracker.unused_dependencies(&[a]);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn exercised_edge_is_not_reported() {
        let mut a = ModuleConfig::new(DottedPath::parse("a"));
        a.depends_on = Some(vec![DependencyEdge::Bare(DottedPath::parse("b"))]);
        let mut tracker = UsageTracker::new();
        tracker.record(DottedPath::parse("a"), DottedPath::parse("b"));
        let findings = tracker.unused_dependencies(&[a]);
        assert!(findings.is_empty());
    }
}
